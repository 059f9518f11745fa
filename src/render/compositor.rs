use rayon::prelude::*;

use crate::foundation::core::{Rgb, clamp_channel};
use crate::world::data::OverlayInfo;

/// Rasterize base palette indices into straight-alpha RGBA8. In-range
/// indices draw at full alpha; anything unmapped comes out fully
/// transparent black.
pub fn rasterize_base(pixels: &[u32], colors: &[Rgb], out: &mut [u8]) {
    out.par_chunks_exact_mut(4)
        .zip(pixels.par_iter())
        .for_each(|(dst, &pixel)| match colors.get(pixel as usize) {
            Some(color) => write_color(dst, color),
            None => dst.copy_from_slice(&[0, 0, 0, 0]),
        });
}

/// Blit an overlay's pixel indices onto the canvas with its top-left at
/// `(base_x, base_y)`. Index 0 is transparent; destination pixels outside
/// the canvas and indices outside the color table are skipped.
pub fn blit_overlay(
    out: &mut [u8],
    canvas_width: u32,
    canvas_height: u32,
    overlay: &OverlayInfo,
    colors: &[Rgb],
    base_x: i64,
    base_y: i64,
) {
    if overlay.width == 0 {
        return;
    }

    let canvas_width = i64::from(canvas_width);
    let canvas_height = i64::from(canvas_height);

    let mut x = base_x;
    let mut y = base_y;
    for &pixel in &overlay.pixels {
        if pixel != 0 && x >= 0 && y >= 0 && x < canvas_width && y < canvas_height {
            if let Some(color) = colors.get(pixel as usize) {
                let p = ((x + y * canvas_width) * 4) as usize;
                write_color(&mut out[p..p + 4], color);
            }
        }

        x += 1;
        if x >= base_x + i64::from(overlay.width) {
            x = base_x;
            y += 1;
        }
    }
}

fn write_color(dst: &mut [u8], color: &Rgb) {
    dst[0] = clamp_channel(color[0]);
    dst[1] = clamp_channel(color[1]);
    dst[2] = clamp_channel(color[2]);
    dst[3] = 255;
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
