// heatmap.rs
// Visualize a transition model: PNG heatmap and a labelled terminal grid.
// Debugging aid only; nothing here feeds back into the sampler.

use std::fmt::Write as _;
use std::path::Path;

use image::{Rgb, RgbImage};
use log::info;

use crate::alphabet::{self, SIZE};
use crate::error::Result;
use crate::model::TransitionModel;

/// Side of one (from, to) cell in pixels.
pub const CELL: u32 = 16;

/// Width of the label column on the left and height of the label row on top.
pub const MARGIN: u32 = CELL;

const GRID: u32 = CELL * SIZE as u32;
const BAR_GAP: u32 = CELL / 2;

/// Full image size: labels, grid, and a colour bar on the right.
pub const WIDTH: u32 = MARGIN + GRID + BAR_GAP + CELL + BAR_GAP;
pub const HEIGHT: u32 = MARGIN + GRID + MARGIN;

/// Colour stops from low to high probability (viridis endpoints and midpoint).
const RAMP: [[f64; 3]; 3] = [[68.0, 1.0, 84.0], [33.0, 145.0, 140.0], [253.0, 231.0, 37.0]];

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([0, 0, 0]);

/// Glyphs are 3x5 bitmaps drawn at this scale, centred in a cell.
const GLYPH_SCALE: u32 = 2;
const GLYPH_X: u32 = (CELL - 3 * GLYPH_SCALE) / 2;
const GLYPH_Y: u32 = (CELL - 5 * GLYPH_SCALE) / 2;

/// Characters used by the text grid, lightest first.
const SHADES: &[u8] = b" .:-=+*#%@";

/// Render the model as an image: row `i` is source symbol `i`, column `j` is target `j`,
/// colours scaled by the largest cell. Rows and columns are labelled along the top and
/// left edges (space as `_`); the bar on the right runs from the largest value at the top
/// (`1`) to zero at the bottom (`0`).
pub fn render(model: &TransitionModel) -> RgbImage {
    let max = model.max_probability();
    let scale = |p: f64| if max > 0.0 { p / max } else { 0.0 };
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);

    for (from, row) in model.rows().iter().enumerate() {
        for (to, &p) in row.iter().enumerate() {
            let x0 = MARGIN + to as u32 * CELL;
            let y0 = MARGIN + from as u32 * CELL;
            let px = colour(scale(p));
            for y in y0..y0 + CELL {
                for x in x0..x0 + CELL {
                    img.put_pixel(x, y, px);
                }
            }
        }
    }

    for i in 0..SIZE {
        let offset = MARGIN + i as u32 * CELL;
        draw_glyph(&mut img, offset, 0, label(i));
        draw_glyph(&mut img, 0, offset, label(i));
    }

    let bar_x = MARGIN + GRID + BAR_GAP;
    for y in 0..GRID {
        let px = colour(1.0 - y as f64 / (GRID - 1) as f64);
        for x in bar_x..bar_x + CELL {
            img.put_pixel(x, MARGIN + y, px);
        }
    }
    draw_glyph(&mut img, bar_x, 0, '1');
    draw_glyph(&mut img, bar_x, MARGIN + GRID, '0');
    img
}

/// Render and write a PNG.
pub fn save(model: &TransitionModel, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    render(model).save(path)?;
    info!("wrote transition heatmap to {}", path.display());
    Ok(())
}

/// Labelled grid for terminals. Space is labelled `_`.
pub fn render_text(model: &TransitionModel) -> String {
    let max = model.max_probability();
    let mut out = String::with_capacity((SIZE + 3) * (SIZE + 1) * 2);
    out.push_str("  ");
    for to in 0..SIZE {
        out.push(label(to));
    }
    out.push('\n');
    for (from, row) in model.rows().iter().enumerate() {
        let _ = write!(out, "{} ", label(from));
        for &p in row {
            let t = if max > 0.0 { p / max } else { 0.0 };
            let idx = (t * (SHADES.len() - 1) as f64).round() as usize;
            out.push(SHADES[idx.min(SHADES.len() - 1)] as char);
        }
        out.push('\n');
    }
    out
}

/// Axis label for a symbol index.
fn label(i: usize) -> char {
    match alphabet::symbol(i as u8) {
        ' ' => '_',
        c => c,
    }
}

/// Rows of a 3x5 bitmap, most significant of the low three bits on the left.
fn glyph(c: char) -> [u8; 5] {
    match c {
        'a' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'b' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'd' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'f' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'g' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'h' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' => [0b001, 0b001, 0b001, 0b101, 0b010],
        'k' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'n' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'o' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'p' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'q' => [0b010, 0b101, 0b101, 0b110, 0b011],
        'r' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' => [0b011, 0b100, 0b010, 0b001, 0b110],
        't' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'w' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'x' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        _ => [0; 5],
    }
}

/// Draw `c` inside the cell whose top-left corner is `(x0, y0)`.
fn draw_glyph(img: &mut RgbImage, x0: u32, y0: u32, c: char) {
    for (row, bits) in glyph(c).iter().enumerate() {
        for col in 0..3u32 {
            if bits & (0b100 >> col) == 0 {
                continue;
            }
            let x = x0 + GLYPH_X + col * GLYPH_SCALE;
            let y = y0 + GLYPH_Y + row as u32 * GLYPH_SCALE;
            for dy in 0..GLYPH_SCALE {
                for dx in 0..GLYPH_SCALE {
                    img.put_pixel(x + dx, y + dy, INK);
                }
            }
        }
    }
}

/// Piecewise-linear interpolation over [`RAMP`] for `t` in [0, 1].
fn colour(t: f64) -> Rgb<u8> {
    let t = t.clamp(0.0, 1.0) * (RAMP.len() - 1) as f64;
    let lo = (t.floor() as usize).min(RAMP.len() - 2);
    let frac = t - lo as f64;
    let mut px = [0u8; 3];
    for (c, slot) in px.iter_mut().enumerate() {
        let v = RAMP[lo][c] + (RAMP[lo + 1][c] - RAMP[lo][c]) * frac;
        *slot = v.round() as u8;
    }
    Rgb(px)
}
