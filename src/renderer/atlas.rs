use std::path::{Path, PathBuf};

use wgpu::util::DeviceExt;

use crate::error::Error;

/// 8-bit glyph code indexing a cell of the atlas grid, row-major.
pub type Glyph = u8;

/// Normalised texture coordinates bounding one atlas cell.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct UvRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

// ── AtlasLayout ───────────────────────────────────────────────────────────────

/// Grid geometry of an atlas: pure data, no GPU state, so UV math is
/// testable without a device.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AtlasLayout {
    pub cols: u32,
    pub rows: u32,
    pub cell_w: u32,
    pub cell_h: u32,
}

impl AtlasLayout {
    /// Derive the layout from decoded image dimensions. The column count
    /// is caller-supplied; the row count comes from the image height.
    pub fn from_image_dims(img_w: u32, img_h: u32, cols: u32, cell_w: u32, cell_h: u32) -> Self {
        let rows = (img_h / cell_h).max(1);

        if img_w != cols * cell_w || img_h != rows * cell_h {
            log::warn!(
                "atlas is {img_w}x{img_h} px but the grid implies {}x{} — \
                 cells will sample skewed texels",
                cols * cell_w,
                rows * cell_h,
            );
        }
        if cols * rows < Glyph::MAX as u32 + 1 {
            log::warn!(
                "atlas holds {} cells; glyph codes {} and above will sample \
                 outside the image",
                cols * rows,
                cols * rows,
            );
        }

        Self { cols, rows, cell_w, cell_h }
    }

    /// UV rectangle for a glyph code. Total over all 8-bit codes: an
    /// atlas with fewer rows than the code implies yields a rectangle
    /// below the image rather than an error.
    pub fn cell_uv(&self, code: Glyph) -> UvRect {
        let col = code as u32 % self.cols;
        let row = code as u32 / self.cols;

        let u0 = col as f32 / self.cols as f32;
        let v0 = row as f32 / self.rows as f32;

        UvRect {
            u0,
            v0,
            u1: u0 + 1.0 / self.cols as f32,
            v1: v0 + 1.0 / self.rows as f32,
        }
    }
}

// ── AtlasSource ───────────────────────────────────────────────────────────────

/// Where the atlas image comes from: a file on disk or bytes embedded in
/// the binary (the generated default tileset).
#[derive(Clone, Debug)]
pub enum AtlasSource {
    Path(PathBuf),
    Bytes(&'static [u8]),
}

impl AtlasSource {
    pub(crate) fn create(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        cols: u32,
        cell_w: u32,
        cell_h: u32,
    ) -> Result<Atlas, Error> {
        match self {
            AtlasSource::Path(path) => Atlas::load(device, queue, path, cols, cell_w, cell_h),
            AtlasSource::Bytes(bytes) => {
                Atlas::from_bytes(device, queue, bytes, cols, cell_w, cell_h)
            }
        }
    }
}

// ── Atlas ─────────────────────────────────────────────────────────────────────

/// A glyph atlas on the GPU. Created once at startup, immutable after.
pub struct Atlas {
    pub texture_view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub layout: AtlasLayout,
}

impl Atlas {
    /// Load an atlas image from disk and upload it.
    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
        cols: u32,
        cell_w: u32,
        cell_h: u32,
    ) -> Result<Self, Error> {
        let img = image::open(path)
            .map_err(|source| Error::ResourceLoad { path: path.to_path_buf(), source })?
            .to_rgba8();
        log::info!("loaded atlas `{}` ({}x{})", path.display(), img.width(), img.height());
        Ok(Self::from_image(device, queue, &img, cols, cell_w, cell_h))
    }

    /// Upload an atlas from in-memory encoded bytes (the embedded default).
    pub fn from_bytes(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bytes: &[u8],
        cols: u32,
        cell_w: u32,
        cell_h: u32,
    ) -> Result<Self, Error> {
        let img = image::load_from_memory(bytes)
            .map_err(|source| Error::ResourceLoad { path: "<embedded>".into(), source })?
            .to_rgba8();
        Ok(Self::from_image(device, queue, &img, cols, cell_w, cell_h))
    }

    fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        img: &image::RgbaImage,
        cols: u32,
        cell_w: u32,
        cell_h: u32,
    ) -> Self {
        let (img_w, img_h) = img.dimensions();
        let layout = AtlasLayout::from_image_dims(img_w, img_h, cols, cell_w, cell_h);

        let size = wgpu::Extent3d {
            width: img_w,
            height: img_h,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some("atlas"),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            img,
        );

        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self { texture_view, sampler, layout }
    }
}
