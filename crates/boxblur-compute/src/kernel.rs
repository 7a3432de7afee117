//! Box-blur kernel: the per-pixel unit of work.
//!
//! Each task averages the square neighbourhood of side `2r+1` around one
//! pixel. Neighbours outside the image are left out of both the sum and
//! the count, so windows shrink at edges and corners.

use crate::pixel::{CHANNELS, Rgb8};
use crate::{ComputeError, ComputeResult};

/// Validated parameters of one blur dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlurParams {
    pub width: u32,
    pub height: u32,
    pub radius: u32,
}

impl BlurParams {
    /// Rejects zero dimensions and a zero radius.
    pub fn new(width: u32, height: u32, radius: u32) -> ComputeResult<Self> {
        if width == 0 || height == 0 {
            return Err(ComputeError::InvalidDimensions(width, height));
        }
        if radius == 0 {
            return Err(ComputeError::InvalidRadius(radius));
        }
        Ok(Self { width, height, radius })
    }

    /// Number of tasks (`width * height`).
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Largest in-bounds window any task can see.
    pub fn max_window(&self) -> u64 {
        let side = 2 * self.radius as u64 + 1;
        side.min(self.width as u64) * side.min(self.height as u64)
    }

    /// Radius clipped to the image extent; larger radii select the same windows.
    pub fn effective_radius(&self) -> u32 {
        self.radius.min(self.width.max(self.height))
    }
}

/// Inclusive in-bounds range `[c - r, c + r]` clipped to `[0, len)`.
#[inline]
fn span(c: usize, r: usize, len: usize) -> (usize, usize) {
    (c.saturating_sub(r), c.saturating_add(r).min(len - 1))
}

/// In-bounds window of `(x, y)` as inclusive `(x0, x1, y0, y1)`.
/// Caller guarantees `x < w` and `y < h`.
#[inline]
fn clip_window(w: usize, h: usize, x: usize, y: usize, r: usize) -> (usize, usize, usize, usize) {
    let (x0, x1) = span(x, r, w);
    let (y0, y1) = span(y, r, h);
    (x0, x1, y0, y1)
}

/// Number of in-bounds neighbours (including the pixel itself) of `(x, y)`.
pub fn window_count(width: u32, height: u32, x: u32, y: u32, radius: u32) -> u64 {
    if x >= width || y >= height {
        return 0;
    }
    let (x0, x1, y0, y1) =
        clip_window(width as usize, height as usize, x as usize, y as usize, radius as usize);
    ((x1 - x0 + 1) * (y1 - y0 + 1)) as u64
}

/// Blurred value of the pixel at linear `index`, read from `src`.
///
/// Returns `None` when `index` lies outside `width * height`.
pub fn blur_task(src: &[Rgb8], width: u32, height: u32, index: usize, radius: u32) -> Option<Rgb8> {
    let w = width as usize;
    let h = height as usize;
    if index >= w * h || src.len() < w * h {
        return None;
    }

    let (x, y) = (index % w, index / w);
    let (x0, x1, y0, y1) = clip_window(w, h, x, y, radius as usize);

    let mut sum = [0u64; CHANNELS];
    for ny in y0..=y1 {
        let row = ny * w;
        for px in &src[row + x0..=row + x1] {
            for (acc, &v) in sum.iter_mut().zip(px.0.iter()) {
                *acc += v as u64;
            }
        }
    }

    let count = window_count(width, height, x as u32, y as u32, radius);
    Some(Rgb8(sum.map(|s| (s / count) as u8)))
}
