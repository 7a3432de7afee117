//! Device capability abstraction shared by all backends.

use crate::ComputeResult;
use crate::kernel::BlurParams;
use crate::pixel::PixelBuffer;
use super::DeviceLimits;

/// Class of an execution target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    /// Parallel hardware (GPU).
    Accelerated,
    /// General-purpose CPU lanes.
    Fallback,
}

impl DeviceClass {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Accelerated => "accelerated",
            Self::Fallback => "fallback",
        }
    }
}

/// Core compute operations a device must provide.
pub trait ComputeDevice: Send + Sync {
    /// Backend name.
    fn name(&self) -> &'static str;

    /// Device class.
    fn class(&self) -> DeviceClass;

    /// Human-readable description of the bound hardware.
    fn description(&self) -> String;

    /// Device limits.
    fn limits(&self) -> &DeviceLimits;

    /// Run one blur task per pixel of `buffer` and wait for all of them.
    ///
    /// On `Ok`, every pixel of `buffer` holds its blurred value. Each task reads
    /// the pixel values as they were before the dispatch started.
    fn dispatch_blur(&self, buffer: &mut PixelBuffer<'_>, params: &BlurParams) -> ComputeResult<()>;
}
