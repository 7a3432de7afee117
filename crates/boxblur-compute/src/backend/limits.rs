//! Device resource limits.

use crate::kernel::BlurParams;
use crate::{ComputeError, ComputeResult};

/// Resource limits of a compute device.
#[derive(Debug, Clone)]
pub struct DeviceLimits {
    /// Maximum size of one device buffer in bytes.
    pub max_buffer_bytes: u64,
    /// Memory available for staging in bytes.
    pub available_memory: u64,
    /// Largest blur window (pixel count) the accumulator can sum without overflow.
    pub max_window_pixels: u64,
}

impl Default for DeviceLimits {
    fn default() -> Self {
        Self {
            max_buffer_bytes: 128 * 1024 * 1024, // 128 MB
            available_memory: 2 * 1024 * 1024 * 1024, // 2 GB
            max_window_pixels: u64::MAX,
        }
    }
}

impl DeviceLimits {
    /// Check that a dispatch fits, given the device's bytes per stored pixel.
    pub fn check(&self, params: &BlurParams, bytes_per_pixel: u64) -> ComputeResult<()> {
        let bytes = params.pixel_count() as u64 * bytes_per_pixel;
        if bytes > self.max_buffer_bytes {
            return Err(ComputeError::ImageTooLarge {
                width: params.width,
                height: params.height,
                limit: self.max_buffer_bytes,
            });
        }
        let window = params.max_window();
        if window > self.max_window_pixels {
            return Err(ComputeError::WindowTooLarge {
                pixels: window,
                max: self.max_window_pixels,
            });
        }
        Ok(())
    }

    /// Check if the image plus its source snapshot fit in available memory.
    pub fn fits_memory(&self, width: u32, height: u32, bytes_per_pixel: u64) -> bool {
        let bytes = (width as u64) * (height as u64) * bytes_per_pixel * 2;
        bytes <= self.available_memory
    }
}
