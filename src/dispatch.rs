//! Splits the image into column stripes that are shaded independently.

use std::sync::atomic::{AtomicBool, Ordering};

use glam::Vec3A;
use rayon::prelude::*;

/// A stripe of columns `[x_start, x_end)` spanning the full image height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub x_start: u32,
    pub x_end: u32,
    pub height: u32,
}

impl Tile {
    pub fn width(&self) -> u32 {
        self.x_end - self.x_start
    }

    pub fn pixel_count(&self) -> usize {
        self.width() as usize * self.height as usize
    }

    /// Pixel coordinates of the tile, row by row.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.height).flat_map(move |y| (self.x_start..self.x_end).map(move |x| (x, y)))
    }
}

/// Stripes of `blocks_wide` columns, the last one narrower when `width` is not
/// a multiple of it. A tile width of zero is treated as one.
pub fn tiles(width: u32, height: u32, blocks_wide: u32) -> Vec<Tile> {
    let blocks_wide = blocks_wide.max(1);

    (0..width)
        .step_by(blocks_wide as usize)
        .map(|x_start| Tile {
            x_start,
            x_end: (x_start + blocks_wide).min(width),
            height,
        })
        .collect()
}

/// Evaluates `shade(x, y)` for every pixel, tiles running in parallel, and
/// returns the row major image.
///
/// Returns `None` if `cancel` was raised while the frame was in flight; the
/// partial results are dropped.
pub fn dispatch_tiles<F>(
    width: u32,
    height: u32,
    blocks_wide: u32,
    cancel: &AtomicBool,
    shade: F,
) -> Option<Vec<Vec3A>>
where
    F: Fn(u32, u32) -> Vec3A + Sync,
{
    let tile_results: Option<Vec<(Tile, Vec<Vec3A>)>> = tiles(width, height, blocks_wide)
        .into_par_iter()
        .map(|tile| {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }

            let colors: Vec<Vec3A> = tile.pixels().map(|(x, y)| shade(x, y)).collect();
            Some((tile, colors))
        })
        .collect();

    // every tile has finished here, so the frame is complete unless it was abandoned
    if cancel.load(Ordering::Relaxed) {
        return None;
    }

    let mut image = vec![Vec3A::ZERO; width as usize * height as usize];

    for (tile, colors) in tile_results? {
        for ((x, y), color) in tile.pixels().zip(colors) {
            image[(x + y * width) as usize] = color;
        }
    }

    Some(image)
}
