//! Compute devices for the box blur.
//!
//! Provides CPU (rayon) and wgpu devices with automatic selection.
//!
//! # Architecture
//!
//! ```text
//! Device (closed set, chosen once per run)
//!     +-- CpuDevice  (rayon parallel-for, fallback)
//!     +-- WgpuDevice (Vulkan/Metal/DX12 compute shader, accelerated)
//! ```

mod cpu_backend;
mod detect;
mod device;
mod limits;

#[cfg(feature = "wgpu")]
mod wgpu_backend;

pub use cpu_backend::CpuDevice;
pub use detect::{BackendInfo, choose_backend, describe_backends, detect_backends, select_best_backend};
pub use device::{ComputeDevice, DeviceClass};
pub use limits::DeviceLimits;

#[cfg(feature = "wgpu")]
pub use wgpu_backend::WgpuDevice;

use std::str::FromStr;
use tracing::{info, warn};

use crate::kernel::BlurParams;
use crate::pixel::PixelBuffer;
use crate::{ComputeError, ComputeResult};

/// Available compute backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Auto-select: accelerated if present, else CPU.
    #[default]
    Auto,
    /// CPU backend using rayon for parallelization.
    Cpu,
    /// wgpu backend (Vulkan/Metal/DX12).
    Wgpu,
}

impl Backend {
    /// Check if this backend is available on current system.
    pub fn is_available(&self) -> bool {
        match self {
            Self::Auto => true,
            Self::Cpu => true,
            #[cfg(feature = "wgpu")]
            Self::Wgpu => WgpuDevice::is_available(),
            #[cfg(not(feature = "wgpu"))]
            Self::Wgpu => false,
        }
    }

    /// Get human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Cpu => "cpu",
            Self::Wgpu => "wgpu",
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "cpu" => Ok(Self::Cpu),
            "wgpu" | "gpu" => Ok(Self::Wgpu),
            other => Err(ComputeError::BackendNotAvailable(format!("unknown backend '{other}'"))),
        }
    }
}

/// Selected device, held for the whole run.
pub enum Device {
    Cpu(CpuDevice),
    #[cfg(feature = "wgpu")]
    Wgpu(WgpuDevice),
}

impl ComputeDevice for Device {
    fn name(&self) -> &'static str {
        match self {
            Self::Cpu(d) => d.name(),
            #[cfg(feature = "wgpu")]
            Self::Wgpu(d) => d.name(),
        }
    }

    fn class(&self) -> DeviceClass {
        match self {
            Self::Cpu(d) => d.class(),
            #[cfg(feature = "wgpu")]
            Self::Wgpu(d) => d.class(),
        }
    }

    fn description(&self) -> String {
        match self {
            Self::Cpu(d) => d.description(),
            #[cfg(feature = "wgpu")]
            Self::Wgpu(d) => d.description(),
        }
    }

    fn limits(&self) -> &DeviceLimits {
        match self {
            Self::Cpu(d) => d.limits(),
            #[cfg(feature = "wgpu")]
            Self::Wgpu(d) => d.limits(),
        }
    }

    fn dispatch_blur(&self, buffer: &mut PixelBuffer<'_>, params: &BlurParams) -> ComputeResult<()> {
        match self {
            Self::Cpu(d) => d.dispatch_blur(buffer, params),
            #[cfg(feature = "wgpu")]
            Self::Wgpu(d) => d.dispatch_blur(buffer, params),
        }
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("name", &self.name())
            .field("class", &self.class())
            .finish()
    }
}

/// Select a device: accelerated when one is present, otherwise the CPU.
///
/// Missing acceleration is not an error.
pub fn select_device() -> ComputeResult<Device> {
    select_device_with(Backend::Auto, 0)
}

/// Create the device for `backend`; `threads` sizes the CPU pool (0 = rayon default).
pub fn select_device_with(backend: Backend, threads: usize) -> ComputeResult<Device> {
    match backend {
        Backend::Auto => match select_best_backend() {
            Backend::Wgpu => match select_device_with(Backend::Wgpu, threads) {
                Ok(device) => Ok(device),
                Err(e) => {
                    warn!(error = %e, "accelerated device found but could not be bound, using CPU");
                    select_device_with(Backend::Cpu, threads)
                }
            },
            _ => {
                info!("no accelerated device available, using CPU fallback");
                select_device_with(Backend::Cpu, threads)
            }
        },
        Backend::Cpu => Ok(Device::Cpu(CpuDevice::with_threads(threads)?)),
        Backend::Wgpu => {
            #[cfg(feature = "wgpu")]
            {
                Ok(Device::Wgpu(WgpuDevice::new()?))
            }
            #[cfg(not(feature = "wgpu"))]
            {
                Err(ComputeError::BackendNotAvailable(
                    "wgpu feature not enabled".to_string()
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend() {
        assert_eq!("auto".parse::<Backend>().unwrap(), Backend::Auto);
        assert_eq!("CPU".parse::<Backend>().unwrap(), Backend::Cpu);
        assert_eq!("gpu".parse::<Backend>().unwrap(), Backend::Wgpu);
        assert!("cuda".parse::<Backend>().is_err());
    }

    #[test]
    fn test_select_device_never_fails_without_gpu() {
        let device = select_device().unwrap();
        // Either class is fine; selection itself must succeed.
        assert!(!device.description().is_empty());
    }

    #[test]
    fn test_explicit_cpu() {
        let device = select_device_with(Backend::Cpu, 2).unwrap();
        assert_eq!(device.name(), "cpu");
        assert_eq!(device.class(), DeviceClass::Fallback);
    }
}
