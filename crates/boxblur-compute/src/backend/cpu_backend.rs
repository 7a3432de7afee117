//! CPU fallback device using rayon for parallelization.

use rayon::prelude::*;
use tracing::{debug, trace, warn};

use super::{ComputeDevice, DeviceClass, DeviceLimits};
use crate::kernel::{BlurParams, blur_task};
use crate::pixel::{CHANNELS, PixelBuffer};
use crate::{ComputeError, ComputeResult};

/// CPU device: one rayon task per pixel.
pub struct CpuDevice {
    /// Dedicated pool; `None` runs on the global rayon pool.
    pool: Option<rayon::ThreadPool>,
    limits: DeviceLimits,
}

impl CpuDevice {
    /// Device on the global rayon pool.
    pub fn new() -> Self {
        // Get system RAM (fallback to 4GB if detection fails)
        let available = sys_info::mem_info()
            .map(|m| m.avail * 1024)
            .unwrap_or(4 * 1024 * 1024 * 1024);

        Self {
            pool: None,
            limits: DeviceLimits {
                max_buffer_bytes: u64::MAX,
                available_memory: available,
                max_window_pixels: u64::MAX,
            },
        }
    }

    /// Device with its own pool of `threads` workers (0 = global pool).
    pub fn with_threads(threads: usize) -> ComputeResult<Self> {
        let mut device = Self::new();
        if threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("boxblur-cpu-{i}"))
                .build()
                .map_err(|e| ComputeError::NoDevice(format!("cpu thread pool: {e}")))?;
            device.pool = Some(pool);
        }
        Ok(device)
    }

    /// Number of worker lanes.
    pub fn threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }
}

impl Default for CpuDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputeDevice for CpuDevice {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn class(&self) -> DeviceClass {
        DeviceClass::Fallback
    }

    fn description(&self) -> String {
        format!("CPU ({} threads, rayon)", self.threads())
    }

    fn limits(&self) -> &DeviceLimits {
        &self.limits
    }

    fn dispatch_blur(&self, buffer: &mut PixelBuffer<'_>, params: &BlurParams) -> ComputeResult<()> {
        trace!(w = params.width, h = params.height, radius = params.radius, "cpu::dispatch_blur");
        if buffer.width() != params.width || buffer.height() != params.height {
            return Err(ComputeError::InvalidDimensions(buffer.width(), buffer.height()));
        }
        self.limits.check(params, CHANNELS as u64)?;
        if !self.limits.fits_memory(params.width, params.height, CHANNELS as u64) {
            warn!(
                available = self.limits.available_memory,
                "image and source snapshot may not fit in available RAM"
            );
        }

        let (w, h, r) = (params.width, params.height, params.radius);
        let src = buffer.snapshot();
        let dst = buffer.as_pixels_mut();

        let mut run = || {
            dst.par_iter_mut().enumerate().for_each(|(index, px)| {
                if let Some(v) = blur_task(&src, w, h, index, r) {
                    *px = v;
                }
            });
        };

        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }

        debug!(tasks = params.pixel_count(), threads = self.threads(), "cpu dispatch complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::Rgb8;

    #[test]
    fn test_dedicated_pool() {
        let dev = CpuDevice::with_threads(2).unwrap();
        assert_eq!(dev.threads(), 2);
        assert_eq!(dev.class(), DeviceClass::Fallback);
    }

    #[test]
    fn test_dispatch_matches_kernel() {
        let src: Vec<Rgb8> = (0..12u8).map(|i| Rgb8::new(i * 20, 255 - i * 20, i)).collect();
        let mut pixels = src.clone();
        let params = BlurParams::new(4, 3, 1).unwrap();
        let mut buf = PixelBuffer::from_pixels(&mut pixels, 4, 3).unwrap();

        CpuDevice::with_threads(3).unwrap().dispatch_blur(&mut buf, &params).unwrap();

        for (i, px) in pixels.iter().enumerate() {
            assert_eq!(Some(*px), blur_task(&src, 4, 3, i, 1), "pixel {i}");
        }
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut pixels = vec![Rgb8::default(); 4];
        let mut buf = PixelBuffer::from_pixels(&mut pixels, 2, 2).unwrap();
        let params = BlurParams::new(4, 1, 1).unwrap();
        assert!(CpuDevice::new().dispatch_blur(&mut buf, &params).is_err());
    }
}
