//! Pixel type and the host/device shared pixel buffer.

use bytemuck::{Pod, Zeroable};

use crate::{ComputeError, ComputeResult};

/// Number of interleaved channels per pixel.
pub const CHANNELS: usize = 3;

/// One 8-bit, 3-channel pixel.
///
/// Layout matches three consecutive bytes of an interleaved image, so a
/// `&mut [u8]` of length `n * 3` can be viewed as `&mut [Rgb8]` of length `n`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Rgb8(pub [u8; CHANNELS]);

impl Rgb8 {
    pub const fn new(c0: u8, c1: u8, c2: u8) -> Self {
        Self([c0, c1, c2])
    }

    /// Pack into the low 24 bits of a `u32` (channel 0 in the lowest byte).
    #[inline]
    pub fn pack(self) -> u32 {
        let [a, b, c] = self.0;
        (a as u32) | ((b as u32) << 8) | ((c as u32) << 16)
    }

    /// Inverse of [`Rgb8::pack`]; the top byte is ignored.
    #[inline]
    pub fn unpack(v: u32) -> Self {
        Self([v as u8, (v >> 8) as u8, (v >> 16) as u8])
    }
}

/// Mutable view over a caller-owned interleaved pixel sequence.
///
/// Wraps the bytes without copying. The view holds the only mutable borrow of
/// the storage, so at most one dispatch can write through it at a time, and
/// every write is visible in the caller's slice once the view is dropped.
pub struct PixelBuffer<'a> {
    pixels: &'a mut [Rgb8],
    width: u32,
    height: u32,
}

impl<'a> PixelBuffer<'a> {
    /// Reinterpret `bytes` as `width * height` pixels.
    pub fn new(bytes: &'a mut [u8], width: u32, height: u32) -> ComputeResult<Self> {
        if width == 0 || height == 0 {
            return Err(ComputeError::InvalidDimensions(width, height));
        }
        let expected = (width as usize) * (height as usize) * CHANNELS;
        if bytes.len() != expected {
            return Err(ComputeError::BufferSizeMismatch {
                expected,
                actual: bytes.len(),
            });
        }
        let pixels: &'a mut [Rgb8] = bytemuck::try_cast_slice_mut(bytes)
            .map_err(|e| ComputeError::OperationFailed(format!("pixel view: {e}")))?;
        Ok(Self { pixels, width, height })
    }

    /// Wrap an already typed pixel slice.
    pub fn from_pixels(pixels: &'a mut [Rgb8], width: u32, height: u32) -> ComputeResult<Self> {
        if width == 0 || height == 0 {
            return Err(ComputeError::InvalidDimensions(width, height));
        }
        let expected = (width as usize) * (height as usize);
        if pixels.len() != expected {
            return Err(ComputeError::BufferSizeMismatch {
                expected: expected * CHANNELS,
                actual: pixels.len() * CHANNELS,
            });
        }
        Ok(Self { pixels, width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_pixels(&self) -> &[Rgb8] {
        &*self.pixels
    }

    pub fn as_pixels_mut(&mut self) -> &mut [Rgb8] {
        &mut *self.pixels
    }

    /// Copy of the current pixel values, used as the read-only source of a dispatch.
    pub fn snapshot(&self) -> Vec<Rgb8> {
        self.pixels.to_vec()
    }
}

impl std::fmt::Debug for PixelBuffer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pixels", &self.pixels.len())
            .finish()
    }
}
