use crate::error::Error;

// ── GPU-visible structs ───────────────────────────────────────────────────────

/// One corner of the shared unit quad. `unit` doubles as the
/// interpolation factor for the instance's UV rectangle.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub unit: [f32; 2],
}

/// Two counter-clockwise triangles spanning [0,1]².
pub const UNIT_QUAD: [QuadVertex; 6] = [
    QuadVertex { unit: [0.0, 0.0] },
    QuadVertex { unit: [0.0, 1.0] },
    QuadVertex { unit: [1.0, 0.0] },
    QuadVertex { unit: [1.0, 0.0] },
    QuadVertex { unit: [0.0, 1.0] },
    QuadVertex { unit: [1.0, 1.0] },
];

impl QuadVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![
        0 => Float32x2,  // unit
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Per-tile draw state: where the quad goes, which atlas cell it
/// samples, and its two colors. One of these is appended per
/// `render_tile` call and consumed by a single instanced draw.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TileInstance {
    /// Top-left corner in screen pixels.
    pub pos: [f32; 2],
    pub uv_min: [f32; 2],
    pub uv_max: [f32; 2],
    pub fg: [f32; 3],
    pub bg: [f32; 3],
}

impl TileInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        1 => Float32x2,  // pos
        2 => Float32x2,  // uv_min
        3 => Float32x2,  // uv_max
        4 => Float32x3,  // fg
        5 => Float32x3,  // bg
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<TileInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Frame-constant shader inputs: pixel-space projection and tile size.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Globals {
    pub proj: [[f32; 4]; 4],
    pub tile: [f32; 2],
    pub _pad: [f32; 2],
}

impl Globals {
    pub fn new(width: f32, height: f32, tile_w: f32, tile_h: f32) -> Self {
        // Pixel coordinates, origin top-left, y down.
        let proj = glam::Mat4::orthographic_rh(0.0, width, height, 0.0, -1.0, 1.0);
        Self {
            proj: proj.to_cols_array_2d(),
            tile: [tile_w, tile_h],
            _pad: [0.0; 2],
        }
    }
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

pub struct TilePipeline {
    pub render_pipeline: wgpu::RenderPipeline,
    pub globals_bind_group_layout: wgpu::BindGroupLayout,
    pub atlas_bind_group_layout: wgpu::BindGroupLayout,
}

/// Build the tile pipeline. The WGSL module and the pipeline are created
/// under separate validation error scopes so a bad shader surfaces as
/// `ShaderCompile` and a stage/layout mismatch as `ShaderLink`, both
/// fatal at startup.
pub async fn create_tile_pipeline(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
) -> Result<TilePipeline, Error> {
    let compile_scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("tile_shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/tile.wgsl").into()),
    });
    if let Some(e) = compile_scope.pop().await {
        return Err(Error::ShaderCompile { stage: "wgsl module", log: e.to_string() });
    }

    let globals_bind_group_layout =
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

    let atlas_bind_group_layout =
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("atlas_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("tile_pipeline_layout"),
        bind_group_layouts: &[&globals_bind_group_layout, &atlas_bind_group_layout],
        ..Default::default()
    });

    let link_scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("tile_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[QuadVertex::layout(), TileInstance::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });
    if let Some(e) = link_scope.pop().await {
        return Err(Error::ShaderLink { log: e.to_string() });
    }

    Ok(TilePipeline {
        render_pipeline,
        globals_bind_group_layout,
        atlas_bind_group_layout,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn project(g: &Globals, x: f32, y: f32) -> [f32; 2] {
        let m = glam::Mat4::from_cols_array_2d(&g.proj);
        let clip = m * Vec4::new(x, y, 0.0, 1.0);
        [clip.x, clip.y]
    }

    #[test]
    fn projection_maps_origin_to_top_left_clip() {
        let g = Globals::new(1440.0, 800.0, 16.0, 16.0);
        let [x, y] = project(&g, 0.0, 0.0);
        assert!((x + 1.0).abs() < 1e-6, "expected clip x = -1, got {x}");
        assert!((y - 1.0).abs() < 1e-6, "expected clip y = +1, got {y}");
    }

    #[test]
    fn projection_maps_extent_to_bottom_right_clip() {
        let g = Globals::new(1440.0, 800.0, 16.0, 16.0);
        let [x, y] = project(&g, 1440.0, 800.0);
        assert!((x - 1.0).abs() < 1e-6);
        assert!((y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn projection_maps_center_to_clip_origin() {
        let g = Globals::new(800.0, 600.0, 16.0, 16.0);
        let [x, y] = project(&g, 400.0, 300.0);
        assert!(x.abs() < 1e-6 && y.abs() < 1e-6);
    }

    #[test]
    fn instance_stride_matches_attribute_layout() {
        // 2+2+2+3+3 f32s, tightly packed.
        assert_eq!(std::mem::size_of::<TileInstance>(), 48);
        assert_eq!(std::mem::size_of::<QuadVertex>(), 8);
    }

    #[test]
    fn unit_quad_covers_unit_square() {
        for v in UNIT_QUAD {
            assert!(v.unit[0] == 0.0 || v.unit[0] == 1.0);
            assert!(v.unit[1] == 0.0 || v.unit[1] == 1.0);
        }
        let corners: std::collections::HashSet<[u32; 2]> = UNIT_QUAD
            .iter()
            .map(|v| [v.unit[0] as u32, v.unit[1] as u32])
            .collect();
        assert_eq!(corners.len(), 4);
    }
}
