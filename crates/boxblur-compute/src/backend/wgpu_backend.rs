//! wgpu device implementation.
//!
//! Runs the box blur as a compute shader with one invocation per pixel.

use std::sync::Arc;
use bytemuck::{Pod, Zeroable};
use tracing::{debug, trace, warn};
use wgpu::util::DeviceExt;

use super::{ComputeDevice, DeviceClass, DeviceLimits};
use crate::kernel::BlurParams;
use crate::pixel::{PixelBuffer, Rgb8};
use crate::shaders;
use crate::{ComputeError, ComputeResult};

/// Invocations per workgroup; must match `@workgroup_size` in the shader.
const WORKGROUP_SIZE: u32 = 256;

/// Bytes per pixel on the device (one packed `u32`).
const DEVICE_PIXEL_BYTES: u64 = 4;

/// Blur uniform: [width, height, radius, invocations per grid row]
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct BlurUniform {
    dims: [u32; 4],
}

/// Ranking of accelerated adapter types; `None` for non-accelerated ones.
fn accelerated_rank(device_type: wgpu::DeviceType) -> Option<u32> {
    match device_type {
        wgpu::DeviceType::DiscreteGpu => Some(3),
        wgpu::DeviceType::IntegratedGpu => Some(2),
        wgpu::DeviceType::VirtualGpu => Some(1),
        wgpu::DeviceType::Cpu | wgpu::DeviceType::Other => None,
    }
}

fn create_instance() -> wgpu::Instance {
    wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    })
}

/// Split `groups` workgroups into a 2D grid no wider than `max_per_dim`.
fn dispatch_grid(groups: u32, max_per_dim: u32) -> (u32, u32) {
    if groups <= max_per_dim {
        (groups.max(1), 1)
    } else {
        (max_per_dim, groups.div_ceil(max_per_dim))
    }
}

/// Capture validation and out-of-memory errors instead of the default panic.
fn push_error_scopes(device: &wgpu::Device) {
    device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    device.push_error_scope(wgpu::ErrorFilter::Validation);
}

/// Pop both scopes pushed by [`push_error_scopes`]; the validation error wins.
async fn pop_error_scopes(device: &wgpu::Device) -> Option<wgpu::Error> {
    let validation = device.pop_error_scope().await;
    let oom = device.pop_error_scope().await;
    validation.or(oom)
}

/// Compile `source` into the blur pipeline.
async fn build_pipeline(device: &wgpu::Device, source: &str) -> ComputeResult<wgpu::ComputePipeline> {
    push_error_scopes(device);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("box_blur"),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some("box_blur_pipeline"),
        layout: None,
        module: &module,
        entry_point: Some("main"),
        compilation_options: Default::default(),
        cache: None,
    });
    match pop_error_scopes(device).await {
        Some(e) => Err(ComputeError::DeviceCreation(format!("blur pipeline: {e}"))),
        None => Ok(pipeline),
    }
}

/// GPU device bound to the best accelerated adapter.
pub struct WgpuDevice {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    pipeline: wgpu::ComputePipeline,
    adapter_info: wgpu::AdapterInfo,
    limits: DeviceLimits,
    max_workgroups_per_dim: u32,
}

impl WgpuDevice {
    /// Info of every accelerated adapter, best first.
    pub fn accelerated_adapters() -> Vec<wgpu::AdapterInfo> {
        let instance = create_instance();
        let mut infos: Vec<wgpu::AdapterInfo> = instance
            .enumerate_adapters(wgpu::Backends::all())
            .into_iter()
            .map(|a| a.get_info())
            .filter(|info| accelerated_rank(info.device_type).is_some())
            .collect();
        infos.sort_by_key(|info| std::cmp::Reverse(accelerated_rank(info.device_type)));
        infos
    }

    /// Check if an accelerated adapter exists.
    pub fn is_available() -> bool {
        !Self::accelerated_adapters().is_empty()
    }

    /// Bind to the best accelerated adapter.
    pub fn new() -> ComputeResult<Self> {
        pollster::block_on(Self::new_async())
    }

    /// Async variant of [`WgpuDevice::new`].
    pub async fn new_async() -> ComputeResult<Self> {
        let instance = create_instance();

        let adapter = instance
            .enumerate_adapters(wgpu::Backends::all())
            .into_iter()
            .filter_map(|a| accelerated_rank(a.get_info().device_type).map(|rank| (rank, a)))
            .max_by_key(|(rank, _)| *rank)
            .map(|(_, a)| a)
            .ok_or_else(|| ComputeError::NoDevice("no accelerated adapter".into()))?;

        let adapter_info = adapter.get_info();
        let adapter_limits = adapter.limits();
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("boxblur_device"),
                required_features: wgpu::Features::empty(),
                required_limits: adapter_limits.clone(),
                memory_hints: wgpu::MemoryHints::Performance,
            }, None)
            .await
            .map_err(|e| ComputeError::DeviceCreation(e.to_string()))?;

        let max_binding = (adapter_limits.max_storage_buffer_binding_size as u64)
            .min(adapter_limits.max_buffer_size);
        let limits = DeviceLimits {
            max_buffer_bytes: max_binding,
            // No portable VRAM query; budget against the largest single allocation.
            available_memory: adapter_limits.max_buffer_size,
            // Shader sums 8-bit channels in u32.
            max_window_pixels: u32::MAX as u64 / 255,
        };

        let pipeline = build_pipeline(&device, shaders::BOX_BLUR).await?;

        debug!(adapter = %adapter_info.name, backend = ?adapter_info.backend, "wgpu device created");

        Ok(Self {
            device: Arc::new(device),
            queue: Arc::new(queue),
            pipeline,
            adapter_info,
            limits,
            max_workgroups_per_dim: adapter_limits.max_compute_workgroups_per_dimension,
        })
    }

    /// Upload, run the pass and copy the result into a mappable staging buffer.
    ///
    /// Every wgpu call here runs inside error scopes, so allocation and
    /// validation failures come back as `OperationFailed`.
    fn submit_blur(&self, packed: &[u32], uniform: &BlurUniform, grid: (u32, u32)) -> ComputeResult<wgpu::Buffer> {
        let size = packed.len() as u64 * DEVICE_PIXEL_BYTES;
        push_error_scopes(&self.device);

        let src_buf = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("src_buffer"),
            contents: bytemuck::cast_slice(packed),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let dst_buf = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("dst_buffer"),
            size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let dims_buf = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("blur_uniform"),
            contents: bytemuck::bytes_of(uniform),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("staging_buffer"),
            size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let layout = self.pipeline.get_bind_group_layout(0);
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("blur_bind_group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: src_buf.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: dst_buf.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: dims_buf.as_entire_binding() },
            ],
        });

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("blur_encoder"),
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("blur_pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(grid.0, grid.1, 1);
        }
        encoder.copy_buffer_to_buffer(&dst_buf, 0, &staging, 0, size);
        self.queue.submit(std::iter::once(encoder.finish()));

        match pollster::block_on(pop_error_scopes(&self.device)) {
            Some(e) => Err(ComputeError::OperationFailed(format!("blur dispatch: {e}"))),
            None => Ok(staging),
        }
    }

    /// Wait for the submitted work and read the staging buffer.
    fn read_back(&self, staging: &wgpu::Buffer) -> ComputeResult<Vec<u32>> {
        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |r| { let _ = tx.send(r); });
        self.device.poll(wgpu::Maintain::Wait);

        rx.recv()
            .map_err(|_| ComputeError::OperationFailed("Map channel closed".into()))?
            .map_err(|e| ComputeError::OperationFailed(format!("Map failed: {e}")))?;

        let data = slice.get_mapped_range();
        let result: Vec<u32> = bytemuck::cast_slice(&data).to_vec();
        drop(data);
        staging.unmap();

        Ok(result)
    }
}

impl ComputeDevice for WgpuDevice {
    fn name(&self) -> &'static str {
        "wgpu"
    }

    fn class(&self) -> DeviceClass {
        DeviceClass::Accelerated
    }

    fn description(&self) -> String {
        format!("{} ({:?}, {:?})", self.adapter_info.name, self.adapter_info.backend, self.adapter_info.device_type)
    }

    fn limits(&self) -> &DeviceLimits {
        &self.limits
    }

    fn dispatch_blur(&self, buffer: &mut PixelBuffer<'_>, params: &BlurParams) -> ComputeResult<()> {
        trace!(w = params.width, h = params.height, radius = params.radius, "wgpu::dispatch_blur");
        if buffer.width() != params.width || buffer.height() != params.height {
            return Err(ComputeError::InvalidDimensions(buffer.width(), buffer.height()));
        }
        self.limits.check(params, DEVICE_PIXEL_BYTES)?;
        if !self.limits.fits_memory(params.width, params.height, DEVICE_PIXEL_BYTES) {
            warn!(
                budget = self.limits.available_memory,
                "source and destination buffers may exceed device memory"
            );
        }

        let total = params.pixel_count();
        let groups = u32::try_from((total as u64).div_ceil(WORKGROUP_SIZE as u64))
            .map_err(|_| ComputeError::ImageTooLarge {
                width: params.width,
                height: params.height,
                limit: self.limits.max_buffer_bytes,
            })?;
        let (gx, gy) = dispatch_grid(groups, self.max_workgroups_per_dim);
        let uniform = BlurUniform {
            dims: [params.width, params.height, params.effective_radius(), gx * WORKGROUP_SIZE],
        };

        let packed: Vec<u32> = buffer.as_pixels().iter().map(|px| px.pack()).collect();
        let staging = self.submit_blur(&packed, &uniform, (gx, gy))?;

        let result = self.read_back(&staging)?;
        if result.len() != total {
            return Err(ComputeError::BufferSizeMismatch { expected: total, actual: result.len() });
        }
        for (px, v) in buffer.as_pixels_mut().iter_mut().zip(result) {
            *px = Rgb8::unpack(v);
        }

        debug!(tasks = total, workgroups = ?(gx, gy), "wgpu dispatch complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_excludes_cpu_adapters() {
        assert!(accelerated_rank(wgpu::DeviceType::Cpu).is_none());
        assert!(accelerated_rank(wgpu::DeviceType::Other).is_none());
        assert!(accelerated_rank(wgpu::DeviceType::DiscreteGpu) > accelerated_rank(wgpu::DeviceType::IntegratedGpu));
    }

    #[test]
    fn test_invalid_shader_is_error_not_panic() {
        let Ok(gpu) = WgpuDevice::new() else {
            eprintln!("no accelerated adapter, skipping");
            return;
        };
        let result = pollster::block_on(build_pipeline(&gpu.device, "fn main( {"));
        assert!(matches!(result, Err(ComputeError::DeviceCreation(_))));

        // Scopes are balanced: the device still builds the real pipeline.
        assert!(pollster::block_on(build_pipeline(&gpu.device, shaders::BOX_BLUR)).is_ok());
    }

    #[test]
    fn test_invalid_submission_is_error_not_panic() {
        let Ok(gpu) = WgpuDevice::new() else {
            eprintln!("no accelerated adapter, skipping");
            return;
        };
        // Zero-sized storage bindings fail bind group validation.
        let uniform = BlurUniform { dims: [0, 0, 1, WORKGROUP_SIZE] };
        let result = gpu.submit_blur(&[], &uniform, (1, 1));
        assert!(matches!(result, Err(ComputeError::OperationFailed(_))));

        // The device stays usable after a captured error.
        let mut pixels = vec![Rgb8::new(30, 60, 90); 16];
        let params = BlurParams::new(4, 4, 1).unwrap();
        let mut buf = PixelBuffer::from_pixels(&mut pixels, 4, 4).unwrap();
        gpu.dispatch_blur(&mut buf, &params).unwrap();
        assert!(pixels.iter().all(|&p| p == Rgb8::new(30, 60, 90)));
    }

    #[test]
    fn test_dispatch_grid() {
        assert_eq!(dispatch_grid(10, 65535), (10, 1));
        assert_eq!(dispatch_grid(0, 65535), (1, 1));
        assert_eq!(dispatch_grid(70000, 65535), (65535, 2));
    }
}
