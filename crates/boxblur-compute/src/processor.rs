//! Blur dispatch coordinator.
//!
//! # Configuration
//!
//! Use [`ProcessorBuilder`] for fine-grained control:
//!
//! ```ignore
//! use boxblur_compute::{ProcessorBuilder, Backend};
//!
//! let proc = ProcessorBuilder::new()
//!     .backend(Backend::Cpu)
//!     .threads(8)
//!     .build()?;
//! ```
//!
//! The builder starts from [`ProcessorConfig::from_env`], so `BOXBLUR_BACKEND`
//! and `BOXBLUR_THREADS` apply unless overridden by an explicit call.

use std::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::backend::{Backend, ComputeDevice, Device, select_device_with};
use crate::image::RgbImage;
use crate::kernel::BlurParams;
use crate::pixel::PixelBuffer;
use crate::ComputeResult;

/// Environment variable selecting the backend (`auto`, `cpu`, `wgpu`).
pub const ENV_BACKEND: &str = "BOXBLUR_BACKEND";
/// Environment variable setting the CPU thread count.
pub const ENV_THREADS: &str = "BOXBLUR_THREADS";

// ============================================================================
// Configuration
// ============================================================================

/// Processor configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessorConfig {
    /// Backend to bind.
    pub backend: Backend,
    /// CPU worker threads (0 = rayon default).
    pub threads: usize,
    /// Log per-dispatch timing at info level instead of debug.
    pub verbose: bool,
}

impl ProcessorConfig {
    /// Defaults overridden by `BOXBLUR_BACKEND` / `BOXBLUR_THREADS`.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(value) = lookup(ENV_BACKEND) {
            match value.parse::<Backend>() {
                Ok(backend) => config.backend = backend,
                Err(e) => warn!(var = ENV_BACKEND, error = %e, "ignoring"),
            }
        }
        if let Some(value) = lookup(ENV_THREADS) {
            match value.trim().parse::<usize>() {
                Ok(threads) => config.threads = threads,
                Err(e) => warn!(var = ENV_THREADS, value = %value, error = %e, "ignoring"),
            }
        }
        config
    }
}

/// Builder for [`BlurProcessor`].
#[derive(Debug, Clone)]
pub struct ProcessorBuilder {
    config: ProcessorConfig,
}

impl ProcessorBuilder {
    /// Start from environment-derived defaults.
    pub fn new() -> Self {
        Self { config: ProcessorConfig::from_env() }
    }

    pub fn backend(mut self, backend: Backend) -> Self {
        self.config.backend = backend;
        self
    }

    pub fn threads(mut self, threads: usize) -> Self {
        self.config.threads = threads;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn build(self) -> ComputeResult<BlurProcessor> {
        BlurProcessor::with_config(self.config)
    }
}

impl Default for ProcessorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// BlurProcessor
// ============================================================================

/// Runs box blurs on a device selected once at construction.
pub struct BlurProcessor {
    device: Device,
    config: ProcessorConfig,
}

impl BlurProcessor {
    /// Create processor for `backend`.
    pub fn new(backend: Backend) -> ComputeResult<Self> {
        Self::with_config(ProcessorConfig { backend, ..Default::default() })
    }

    /// Accelerated device if present, else CPU.
    pub fn auto() -> ComputeResult<Self> {
        Self::new(Backend::Auto)
    }

    pub fn with_config(config: ProcessorConfig) -> ComputeResult<Self> {
        let device = select_device_with(config.backend, config.threads)?;
        info!(
            backend = device.name(),
            class = device.class().name(),
            device = %device.description(),
            "compute device selected"
        );
        Ok(Self { device, config })
    }

    /// Name of the bound backend.
    pub fn backend_name(&self) -> &'static str {
        self.device.name()
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Blur `image` in place.
    pub fn run_blur(&self, image: &mut RgbImage, radius: u32) -> ComputeResult<()> {
        let (w, h) = image.dimensions();
        self.blur_in_place(image.data_mut(), w, h, radius)
    }

    /// Blur interleaved 3-channel bytes in place.
    ///
    /// Submits `width * height` tasks and returns once all of them have
    /// finished and their results are in `bytes`. A device failure aborts the
    /// whole call; nothing is retried.
    pub fn blur_in_place(&self, bytes: &mut [u8], width: u32, height: u32, radius: u32) -> ComputeResult<()> {
        trace!(width, height, radius, backend = self.device.name(), "blur_in_place");

        let params = BlurParams::new(width, height, radius)?;
        let mut buffer = PixelBuffer::new(bytes, width, height)?;

        let start = Instant::now();
        self.device.dispatch_blur(&mut buffer, &params)?;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        if self.config.verbose {
            info!(tasks = params.pixel_count(), radius, elapsed_ms, "blur done");
        } else {
            debug!(tasks = params.pixel_count(), radius, elapsed_ms, "blur done");
        }
        Ok(())
    }
}

impl std::fmt::Debug for BlurProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlurProcessor")
            .field("device", &self.device)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_config() {
        let config = ProcessorConfig::from_lookup(lookup(&[(ENV_BACKEND, "cpu"), (ENV_THREADS, "3")]));
        assert_eq!(config.backend, Backend::Cpu);
        assert_eq!(config.threads, 3);
    }

    #[test]
    fn test_env_config_ignores_garbage() {
        let config = ProcessorConfig::from_lookup(lookup(&[(ENV_BACKEND, "quantum"), (ENV_THREADS, "many")]));
        assert_eq!(config, ProcessorConfig::default());
    }

    #[test]
    fn test_builder_overrides() {
        let builder = ProcessorBuilder::new().backend(Backend::Cpu).threads(2).verbose(true);
        assert_eq!(builder.config().backend, Backend::Cpu);
        assert_eq!(builder.config().threads, 2);
        let proc = builder.build().unwrap();
        assert_eq!(proc.backend_name(), "cpu");
    }
}
