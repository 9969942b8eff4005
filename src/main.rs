// Tile demo: draws the currently selected glyph at the origin cell.
// Type a key to change the glyph; Escape or closing the window quits.
// An atlas image path may be given as the first argument; otherwise the
// embedded tileset is used.

use std::path::PathBuf;

use glyphpane::{AppBuilder, AtlasSource, Color, Frame, Scene};

struct GlyphPreview;

impl Scene for GlyphPreview {
    fn frame(&mut self, frame: &mut Frame<'_>) {
        let glyph = frame.input.selected();
        frame.draw_tile((0, 0), glyph, Color::WHITE, Color::BLACK, false);
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let atlas = match std::env::args().nth(1) {
        Some(path) => AtlasSource::Path(PathBuf::from(path)),
        None => AtlasSource::Bytes(glyphpane::DEFAULT_TILESET),
    };

    AppBuilder::new()
        .with_title("glyphpane")
        .with_grid(90, 50)
        .with_tile_size(16, 16)
        .with_atlas(atlas, 16)
        .with_initial_glyph(b'A')
        .run(GlyphPreview)
}
