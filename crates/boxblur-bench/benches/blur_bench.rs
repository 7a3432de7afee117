//! Benchmarks for the box-blur dispatch.
//!
//! Run with: `cargo bench -p boxblur-bench` (add `--features wgpu` for GPU)

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use boxblur_compute::{BlurParams, ComputeDevice, CpuDevice, PixelBuffer, Rgb8, blur_task};

fn noise(len: usize) -> Vec<u8> {
    let mut state = 0x2545_f491_u32;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect()
}

/// Whole-image dispatch on the CPU device for a few sizes and radii.
fn bench_cpu_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_dispatch");
    group.sample_size(20);
    let device = CpuDevice::new();

    for &(w, h) in &[(256u32, 256u32), (1024, 768)] {
        let src = noise((w * h * 3) as usize);
        group.throughput(Throughput::Elements((w * h) as u64));

        for &radius in &[1u32, 4, 16] {
            let params = BlurParams::new(w, h, radius).unwrap();
            group.bench_with_input(
                BenchmarkId::new(format!("r{radius}"), format!("{w}x{h}")),
                &params,
                |b, params| {
                    let mut data = src.clone();
                    b.iter(|| {
                        data.copy_from_slice(&src);
                        let mut buf = PixelBuffer::new(&mut data, w, h).unwrap();
                        device.dispatch_blur(&mut buf, black_box(params)).unwrap();
                    })
                },
            );
        }
    }

    group.finish();
}

/// Thread scaling at a fixed size.
fn bench_cpu_threads(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_threads");
    group.sample_size(20);
    let (w, h, radius) = (512u32, 512u32, 4u32);
    let src = noise((w * h * 3) as usize);
    let params = BlurParams::new(w, h, radius).unwrap();
    group.throughput(Throughput::Elements((w * h) as u64));

    for &threads in &[1usize, 2, 4, 8] {
        let device = CpuDevice::with_threads(threads).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(threads), &params, |b, params| {
            let mut data = src.clone();
            b.iter(|| {
                data.copy_from_slice(&src);
                let mut buf = PixelBuffer::new(&mut data, w, h).unwrap();
                device.dispatch_blur(&mut buf, black_box(params)).unwrap();
            })
        });
    }

    group.finish();
}

/// Single task cost as the window grows.
fn bench_task(c: &mut Criterion) {
    let mut group = c.benchmark_group("task");
    let (w, h) = (128u32, 128u32);
    let pixels: Vec<Rgb8> = noise((w * h * 3) as usize)
        .chunks_exact(3)
        .map(|px| Rgb8::new(px[0], px[1], px[2]))
        .collect();
    let center = (h / 2 * w + w / 2) as usize;

    for &radius in &[1u32, 8, 32] {
        group.bench_with_input(BenchmarkId::from_parameter(radius), &radius, |b, &r| {
            b.iter(|| blur_task(&pixels, w, h, black_box(center), r))
        });
    }

    group.finish();
}

#[cfg(feature = "wgpu")]
fn bench_gpu_dispatch(c: &mut Criterion) {
    use boxblur_compute::WgpuDevice;

    let Ok(device) = WgpuDevice::new() else {
        eprintln!("no accelerated adapter, skipping gpu_dispatch");
        return;
    };

    let mut group = c.benchmark_group("gpu_dispatch");
    group.sample_size(10);
    let (w, h) = (1024u32, 768u32);
    let src = noise((w * h * 3) as usize);
    group.throughput(Throughput::Elements((w * h) as u64));

    for &radius in &[1u32, 4, 16] {
        let params = BlurParams::new(w, h, radius).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(radius), &params, |b, params| {
            let mut data = src.clone();
            b.iter(|| {
                data.copy_from_slice(&src);
                let mut buf = PixelBuffer::new(&mut data, w, h).unwrap();
                device.dispatch_blur(&mut buf, black_box(params)).unwrap();
            })
        });
    }

    group.finish();
}

#[cfg(not(feature = "wgpu"))]
fn bench_gpu_dispatch(_c: &mut Criterion) {}

criterion_group!(
    benches,
    bench_cpu_dispatch,
    bench_cpu_threads,
    bench_task,
    bench_gpu_dispatch,
);
criterion_main!(benches);
