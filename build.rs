// Generates the default 16×16-cell tileset the library embeds, so the
// repository does not need a checked-in binary asset. Each cell gets a
// 1 px border plus a 4×4 block pattern unique to its glyph code,
// white-on-transparent (the fragment shader keys coverage off r·a).

use image::{Rgba, RgbaImage};
use std::path::Path;

const ATLAS_COLS: u32 = 16;
const ATLAS_ROWS: u32 = 16;
const CELL: u32 = 16;

const WHITE: Rgba<u8> = Rgba([0xFF, 0xFF, 0xFF, 0xFF]);

/// Per-glyph 16-bit pattern. Multiplication by an odd constant is a
/// bijection on u16, so no two codes share a pattern and none is blank.
fn cell_pattern(code: u32) -> u16 {
    (code as u16 + 1).wrapping_mul(0x9E37)
}

fn draw_cell(img: &mut RgbaImage, cx: u32, cy: u32, code: u32) {
    let x0 = cx * CELL;
    let y0 = cy * CELL;

    // Cell border.
    for i in 0..CELL {
        img.put_pixel(x0 + i, y0, WHITE);
        img.put_pixel(x0 + i, y0 + CELL - 1, WHITE);
        img.put_pixel(x0, y0 + i, WHITE);
        img.put_pixel(x0 + CELL - 1, y0 + i, WHITE);
    }

    // 4×4 grid of 3 px blocks in the 12×12 interior.
    let bits = cell_pattern(code);
    for by in 0..4u32 {
        for bx in 0..4u32 {
            if bits >> (by * 4 + bx) & 1 == 0 {
                continue;
            }
            for dy in 0..3 {
                for dx in 0..3 {
                    img.put_pixel(x0 + 2 + bx * 3 + dx, y0 + 2 + by * 3 + dy, WHITE);
                }
            }
        }
    }
}

fn main() {
    let path = "resources/atlas_16x16.png";
    if !Path::new(path).exists() {
        std::fs::create_dir_all("resources").expect("build: failed to create resources/");
        let mut img = RgbaImage::new(ATLAS_COLS * CELL, ATLAS_ROWS * CELL);
        for code in 0..ATLAS_COLS * ATLAS_ROWS {
            draw_cell(&mut img, code % ATLAS_COLS, code / ATLAS_COLS, code);
        }
        img.save(path)
            .unwrap_or_else(|e| panic!("build: could not save {path}: {e}"));
    }

    println!("cargo:rerun-if-changed=build.rs");
    // Regenerate if the atlas is deleted, or include_bytes! has nothing to embed.
    println!("cargo:rerun-if-changed={path}");
}
