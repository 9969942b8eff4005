pub mod atlas;
pub mod pipeline;
pub mod tiles;

use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use atlas::{Atlas, AtlasLayout, AtlasSource};
use pipeline::{Globals, TileInstance, TilePipeline, create_tile_pipeline};
use tiles::GeometryBuffer;

use crate::error::Error;

/// GPU-side half of the crate: surface, device, pipeline, atlas texture,
/// and the per-frame instance upload. All resources are created before
/// the frame loop starts and never mutated afterwards, except the
/// instance buffer contents and the globals uniform on resize.
pub struct Renderer {
    pub window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    tile_pipeline: TilePipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    atlas_bind_group: wgpu::BindGroup,
    atlas: Atlas,
    geometry: GeometryBuffer,
    /// Persistent instance buffer; reallocated only when the instance
    /// count exceeds current capacity (not every frame).
    instance_buffer: Option<wgpu::Buffer>,
    instance_capacity: u32,
    tile_w: u32,
    tile_h: u32,
}

/// Grow-only capacity policy for the instance buffer.
fn instance_capacity_for(needed: u32) -> u32 {
    needed.next_power_of_two().max(64)
}

impl Renderer {
    pub async fn new(
        window: Arc<Window>,
        atlas_source: &AtlasSource,
        atlas_cols: u32,
        tile_w: u32,
        tile_h: u32,
    ) -> Result<Self, Error> {
        let size = window.inner_size();

        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(Arc::clone(&window))
            .map_err(|e| Error::ContextInit(format!("surface creation: {e}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: Some(&surface),
                ..Default::default()
            })
            .await
            .map_err(|e| Error::ContextInit(format!("no suitable GPU adapter: {e}")))?;

        let info = adapter.get_info();
        log::info!("GPU adapter: {} ({:?}, {:?})", info.name, info.device_type, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .map_err(|e| Error::ContextInit(format!("device creation: {e}")))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps.formats[0];

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let atlas = atlas_source.create(&device, &queue, atlas_cols, tile_w, tile_h)?;
        let tile_pipeline = create_tile_pipeline(&device, format).await?;

        let globals = Globals::new(
            config.width as f32,
            config.height as f32,
            tile_w as f32,
            tile_h as f32,
        );
        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals_buffer"),
            contents: bytemuck::cast_slice(std::slice::from_ref(&globals)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bg"),
            layout: &tile_pipeline.globals_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let atlas_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("atlas_bg"),
            layout: &tile_pipeline.atlas_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&atlas.texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&atlas.sampler),
                },
            ],
        });

        let geometry = GeometryBuffer::new(&device);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            tile_pipeline,
            globals_buffer,
            globals_bind_group,
            atlas_bind_group,
            atlas,
            geometry,
            instance_buffer: None,
            instance_capacity: 0,
            tile_w,
            tile_h,
        })
    }

    /// Grid geometry of the loaded atlas (for UV computation off-GPU).
    pub fn atlas_layout(&self) -> AtlasLayout {
        self.atlas.layout
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);

        // Keep the pixel projection in step with the window size.
        let globals = Globals::new(
            new_size.width as f32,
            new_size.height as f32,
            self.tile_w as f32,
            self.tile_h as f32,
        );
        self.queue.write_buffer(
            &self.globals_buffer,
            0,
            bytemuck::cast_slice(std::slice::from_ref(&globals)),
        );
    }

    /// Render one frame: clear to black, draw every queued tile instance
    /// in call order, present. Instances are uploaded into a persistent
    /// buffer grown in power-of-two steps.
    pub fn render(&mut self, instances: &[TileInstance]) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        if !instances.is_empty() {
            let count = instances.len() as u32;
            if count > self.instance_capacity || self.instance_buffer.is_none() {
                let capacity = instance_capacity_for(count);
                self.instance_buffer = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("tile_instance_buffer"),
                    size: capacity as u64 * std::mem::size_of::<TileInstance>() as u64,
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                }));
                self.instance_capacity = capacity;
            }
            self.queue.write_buffer(
                self.instance_buffer.as_ref().unwrap(),
                0,
                bytemuck::cast_slice(instances),
            );
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: None,
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.0,
                            g: 0.0,
                            b: 0.0,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if !instances.is_empty() {
                if let Some(ibuf) = &self.instance_buffer {
                    let byte_len =
                        (instances.len() * std::mem::size_of::<TileInstance>()) as u64;
                    pass.set_pipeline(&self.tile_pipeline.render_pipeline);
                    pass.set_bind_group(0, &self.globals_bind_group, &[]);
                    pass.set_bind_group(1, &self.atlas_bind_group, &[]);
                    pass.set_vertex_buffer(0, self.geometry.vertex_buffer.slice(..));
                    pass.set_vertex_buffer(1, ibuf.slice(..byte_len));
                    pass.draw(0..6, 0..instances.len() as u32);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::instance_capacity_for;

    #[test]
    fn capacity_has_a_floor() {
        assert_eq!(instance_capacity_for(1), 64);
        assert_eq!(instance_capacity_for(64), 64);
    }

    #[test]
    fn capacity_grows_by_powers_of_two() {
        assert_eq!(instance_capacity_for(65), 128);
        assert_eq!(instance_capacity_for(4500), 8192);
        assert!(instance_capacity_for(4500).is_power_of_two());
    }
}
