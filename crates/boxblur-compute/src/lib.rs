//! Parallel box-blur compute engine.
//!
//! Provides CPU (rayon) and GPU (wgpu) devices for a per-pixel box blur
//! with automatic device selection.
//!
//! # Architecture
//!
//! ```text
//! BlurProcessor (dispatch coordinator)
//!     └── Device (selected once per run)
//!             └── ComputeDevice trait
//!                     ├── CpuDevice  (rayon parallel-for)
//!                     └── WgpuDevice (compute shader, one invocation per pixel)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use boxblur_compute::{BlurProcessor, RgbImage};
//!
//! let proc = BlurProcessor::auto()?;
//! let mut img = RgbImage::from_u8(data, 1920, 1080)?;
//!
//! proc.run_blur(&mut img, 4)?;
//! ```

pub mod backend;
pub mod image;
pub mod kernel;
pub mod pixel;
pub mod processor;
mod shaders;

pub use backend::{
    Backend, BackendInfo, ComputeDevice, CpuDevice, Device, DeviceClass, DeviceLimits,
    describe_backends, detect_backends, select_best_backend, select_device, select_device_with,
};
#[cfg(feature = "wgpu")]
pub use backend::WgpuDevice;
pub use image::RgbImage;
pub use kernel::{BlurParams, blur_task, window_count};
pub use pixel::{PixelBuffer, Rgb8};
pub use processor::{BlurProcessor, ProcessorBuilder, ProcessorConfig};

use thiserror::Error;

/// Compute errors.
#[derive(Error, Debug)]
pub enum ComputeError {
    #[error("No compute device available: {0}")]
    NoDevice(String),

    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("Failed to create device: {0}")]
    DeviceCreation(String),

    #[error("Blur radius must be greater than 0, got {0}")]
    InvalidRadius(u32),

    #[error("Invalid dimensions: {0}x{1}")]
    InvalidDimensions(u32, u32),

    #[error("Buffer size mismatch: expected {expected}, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("Image too large: {width}x{height} exceeds device limit of {limit} bytes")]
    ImageTooLarge { width: u32, height: u32, limit: u64 },

    #[error("Blur window of {pixels} pixels overflows the device accumulator (max {max})")]
    WindowTooLarge { pixels: u64, max: u64 },

    #[error("Compute operation failed: {0}")]
    OperationFailed(String),
}

/// Broad failure class of a [`ComputeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No usable device; not recoverable by the caller.
    Environment,
    /// Bad radius, dimensions or buffer length; the caller may retry with new input.
    InvalidInput,
    /// Submission or execution failed on the device.
    Device,
}

impl ComputeError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoDevice(_) | Self::BackendNotAvailable(_) | Self::DeviceCreation(_) => {
                ErrorKind::Environment
            }
            Self::InvalidRadius(_) | Self::InvalidDimensions(..) | Self::BufferSizeMismatch { .. } => {
                ErrorKind::InvalidInput
            }
            Self::ImageTooLarge { .. } | Self::WindowTooLarge { .. } | Self::OperationFailed(_) => {
                ErrorKind::Device
            }
        }
    }
}

pub type ComputeResult<T> = Result<T, ComputeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(ComputeError::NoDevice("none".into()).kind(), ErrorKind::Environment);
        assert_eq!(ComputeError::InvalidRadius(0).kind(), ErrorKind::InvalidInput);
        assert_eq!(ComputeError::InvalidDimensions(0, 4).kind(), ErrorKind::InvalidInput);
        assert_eq!(ComputeError::OperationFailed("lost".into()).kind(), ErrorKind::Device);
    }
}
