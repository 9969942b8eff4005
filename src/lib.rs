pub mod app;
pub mod error;
pub mod input;
pub mod renderer;

pub use app::{AppBuilder, Frame, Scene};
pub use error::Error;
pub use input::InputState;
pub use renderer::Renderer;
pub use renderer::atlas::{Atlas, AtlasLayout, AtlasSource, Glyph, UvRect};
pub use renderer::tiles::{Color, TileRenderer};

/// Built-in 16×16-cell tileset, generated by the build script and
/// embedded at compile time.
pub const DEFAULT_TILESET: &[u8] = include_bytes!("../resources/atlas_16x16.png");
pub const DEFAULT_ATLAS_COLS: u32 = 16;
pub const DEFAULT_TILE_W: u32 = 16;
pub const DEFAULT_TILE_H: u32 = 16;
