//! WGSL shader sources for GPU compute pipelines.
//! These are used by the wgpu backend when the `wgpu` feature is enabled.

#![allow(dead_code)] // Shaders used by wgpu backend

/// Box blur, one invocation per pixel.
///
/// Pixels are packed one per `u32` (channel 0 in the low byte). Reads come
/// from `src`, writes go to `dst`, so invocations never observe each other.
/// The grid may be 2D; `dims.w` is the number of invocations per grid row.
pub const BOX_BLUR: &str = r#"
@group(0) @binding(0) var<storage, read> src: array<u32>;
@group(0) @binding(1) var<storage, read_write> dst: array<u32>;
@group(0) @binding(2) var<uniform> dims: vec4<u32>;  // w, h, radius, row stride

@compute @workgroup_size(256)
fn main(@builtin(global_invocation_id) id: vec3<u32>) {
    let w = dims.x;
    let h = dims.y;
    let r = dims.z;
    let index = id.y * dims.w + id.x;
    if index >= w * h { return; }

    let x = index % w;
    let y = index / w;

    // In-bounds window only: edges and corners shrink the count.
    let x0 = select(0u, x - r, x >= r);
    let x1 = min(x + r, w - 1u);
    let y0 = select(0u, y - r, y >= r);
    let y1 = min(y + r, h - 1u);

    var sum = vec3<u32>(0u, 0u, 0u);
    for (var ny = y0; ny <= y1; ny = ny + 1u) {
        let row = ny * w;
        for (var nx = x0; nx <= x1; nx = nx + 1u) {
            let p = src[row + nx];
            sum = sum + vec3<u32>(p & 0xffu, (p >> 8u) & 0xffu, (p >> 16u) & 0xffu);
        }
    }

    let count = (x1 - x0 + 1u) * (y1 - y0 + 1u);
    let avg = sum / vec3<u32>(count);
    dst[index] = avg.x | (avg.y << 8u) | (avg.z << 16u);
}
"#;
