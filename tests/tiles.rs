use glyphpane::{AtlasLayout, Color, TileRenderer};

fn atlas_16x16() -> AtlasLayout {
    AtlasLayout { cols: 16, rows: 16, cell_w: 16, cell_h: 16 }
}

#[test]
fn tile_lands_at_cell_times_tile_size() {
    let atlas = atlas_16x16();
    let mut tiles = TileRenderer::new(16, 16);
    tiles.render_tile(&atlas, (3, 2), 0, Color::WHITE, Color::BLACK, false);

    let inst = &tiles.instances()[0];
    assert_eq!(inst.pos, [48.0, 32.0]);
}

#[test]
fn instance_uv_matches_atlas_cell() {
    let atlas = atlas_16x16();
    let mut tiles = TileRenderer::new(16, 16);
    tiles.render_tile(&atlas, (0, 0), 42, Color::WHITE, Color::BLACK, false);

    let uv = atlas.cell_uv(42);
    let inst = &tiles.instances()[0];
    assert_eq!(inst.uv_min, [uv.u0, uv.v0]);
    assert_eq!(inst.uv_max, [uv.u1, uv.v1]);
}

#[test]
fn inverse_swaps_foreground_and_background() {
    let atlas = atlas_16x16();
    let fg = Color([0.9, 0.1, 0.2]);
    let bg = Color([0.0, 0.3, 0.6]);

    let mut plain = TileRenderer::new(16, 16);
    plain.render_tile(&atlas, (0, 0), 7, fg, bg, false);
    let mut swapped = TileRenderer::new(16, 16);
    swapped.render_tile(&atlas, (0, 0), 7, fg, bg, true);

    let a = &plain.instances()[0];
    let b = &swapped.instances()[0];
    assert_eq!(a.fg, fg.0);
    assert_eq!(a.bg, bg.0);
    assert_eq!(b.fg, bg.0);
    assert_eq!(b.bg, fg.0);
}

#[test]
fn same_cell_draws_keep_call_order() {
    let atlas = atlas_16x16();
    let mut tiles = TileRenderer::new(16, 16);
    tiles.render_tile(&atlas, (5, 5), 10, Color::WHITE, Color::BLACK, false);
    tiles.render_tile(&atlas, (5, 5), 20, Color::WHITE, Color::BLACK, false);

    // Both draws survive in order; the later one carries the later
    // glyph's UV rectangle, so it wins at raster time.
    let insts = tiles.instances();
    assert_eq!(insts.len(), 2);
    assert_eq!(insts[0].pos, insts[1].pos);
    let first = atlas.cell_uv(10);
    let second = atlas.cell_uv(20);
    assert_eq!(insts[0].uv_min, [first.u0, first.v0]);
    assert_eq!(insts[1].uv_min, [second.u0, second.v0]);
}

#[test]
fn clear_empties_the_queue() {
    let atlas = atlas_16x16();
    let mut tiles = TileRenderer::new(16, 16);
    tiles.render_tile(&atlas, (1, 1), 1, Color::WHITE, Color::BLACK, false);
    assert_eq!(tiles.instances().len(), 1);
    tiles.clear();
    assert!(tiles.instances().is_empty());
}

#[test]
fn glyph_65_at_origin_scenario() {
    // 16×16-cell atlas, glyph 65 = row 4, column 1, colors unswapped.
    let atlas = atlas_16x16();
    let mut tiles = TileRenderer::new(16, 16);
    tiles.render_tile(&atlas, (0, 0), 65, Color([1.0, 1.0, 1.0]), Color([0.0, 0.0, 0.0]), false);

    let inst = &tiles.instances()[0];
    assert_eq!(inst.pos, [0.0, 0.0]);
    assert_eq!(inst.uv_min, [1.0 / 16.0, 4.0 / 16.0]);
    assert_eq!(inst.uv_max, [2.0 / 16.0, 5.0 / 16.0]);
    assert_eq!(inst.fg, [1.0, 1.0, 1.0]);
    assert_eq!(inst.bg, [0.0, 0.0, 0.0]);
}

#[test]
fn rectangular_tiles_scale_each_axis() {
    let atlas = AtlasLayout { cols: 16, rows: 16, cell_w: 16, cell_h: 24 };
    let mut tiles = TileRenderer::new(16, 24);
    tiles.render_tile(&atlas, (2, 3), 0, Color::WHITE, Color::BLACK, false);
    assert_eq!(tiles.instances()[0].pos, [32.0, 72.0]);
}
