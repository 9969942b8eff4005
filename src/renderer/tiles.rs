use crate::renderer::atlas::{AtlasLayout, Glyph};
use crate::renderer::pipeline::{TileInstance, UNIT_QUAD};

use wgpu::util::DeviceExt;

// ── Color ─────────────────────────────────────────────────────────────────────

/// RGB in the 0–1 range. Tiles are opaque; alpha is fixed in the shader.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Color(pub [f32; 3]);

impl Color {
    pub const WHITE: Self = Self([1.0, 1.0, 1.0]);
    pub const BLACK: Self = Self([0.0, 0.0, 0.0]);
    pub const GRAY: Self = Self([0.6, 0.6, 0.6]);
    pub const RED: Self = Self([1.0, 0.0, 0.0]);
    pub const GREEN: Self = Self([0.0, 1.0, 0.0]);
    pub const BLUE: Self = Self([0.0, 0.0, 1.0]);
    pub const YELLOW: Self = Self([1.0, 1.0, 0.0]);
    pub const CYAN: Self = Self([0.0, 1.0, 1.0]);
    pub const MAGENTA: Self = Self([1.0, 0.0, 1.0]);
}

// ── GeometryBuffer ────────────────────────────────────────────────────────────

/// The one unit-quad vertex buffer shared by every tile draw. Created
/// once, never written again.
pub struct GeometryBuffer {
    pub vertex_buffer: wgpu::Buffer,
}

impl GeometryBuffer {
    pub fn new(device: &wgpu::Device) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("unit_quad"),
            contents: bytemuck::cast_slice(&UNIT_QUAD),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self { vertex_buffer }
    }
}

// ── TileRenderer ──────────────────────────────────────────────────────────────

/// Per-frame tile queue. `render_tile` turns a draw request into a
/// `TileInstance`; the GPU draws the accumulated instances in call
/// order, so overlapping tiles composite last-write-wins. Owns no GPU
/// state — the atlas is borrowed per call.
pub struct TileRenderer {
    tile_w: u32,
    tile_h: u32,
    instances: Vec<TileInstance>,
}

impl TileRenderer {
    pub fn new(tile_w: u32, tile_h: u32) -> Self {
        Self { tile_w, tile_h, instances: Vec::new() }
    }

    /// Queue one tile: unit quad placed at `(col * tile_w, row * tile_h)`
    /// pixels, sampling the atlas cell for `glyph`. `inverse` swaps the
    /// foreground and background colors.
    pub fn render_tile(
        &mut self,
        atlas: &AtlasLayout,
        cell: (u32, u32),
        glyph: Glyph,
        fg: Color,
        bg: Color,
        inverse: bool,
    ) {
        let (fg, bg) = if inverse { (bg, fg) } else { (fg, bg) };
        let uv = atlas.cell_uv(glyph);

        self.instances.push(TileInstance {
            pos: [(cell.0 * self.tile_w) as f32, (cell.1 * self.tile_h) as f32],
            uv_min: [uv.u0, uv.v0],
            uv_max: [uv.u1, uv.v1],
            fg: fg.0,
            bg: bg.0,
        });
    }

    /// Reset the queue at the start of a frame.
    pub fn clear(&mut self) {
        self.instances.clear();
    }

    /// Queued instances, in call order.
    pub fn instances(&self) -> &[TileInstance] {
        &self.instances
    }
}
