//! Host-side RGB image.

use crate::pixel::{CHANNELS, Rgb8};
use crate::{ComputeError, ComputeResult};

/// 8-bit, 3-channel interleaved image in row-major order.
///
/// Always non-empty with `data.len() == width * height * 3`.
#[derive(Clone, PartialEq, Eq)]
pub struct RgbImage {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl RgbImage {
    /// Create from interleaved u8 data.
    pub fn from_u8(data: Vec<u8>, width: u32, height: u32) -> ComputeResult<Self> {
        if width == 0 || height == 0 {
            return Err(ComputeError::InvalidDimensions(width, height));
        }
        let expected = (width as usize) * (height as usize) * CHANNELS;
        if data.len() != expected {
            return Err(ComputeError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { data, width, height })
    }

    /// Create from a pixel list.
    pub fn from_pixels(pixels: &[Rgb8], width: u32, height: u32) -> ComputeResult<Self> {
        Self::from_u8(bytemuck::cast_slice(pixels).to_vec(), width, height)
    }

    /// Image filled with one colour.
    pub fn filled(width: u32, height: u32, color: Rgb8) -> ComputeResult<Self> {
        let count = (width as usize) * (height as usize);
        Self::from_u8(color.0.repeat(count), width, height)
    }

    /// Create black image.
    pub fn new(width: u32, height: u32) -> ComputeResult<Self> {
        Self::filled(width, height, Rgb8::default())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Interleaved bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable interleaved bytes.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Typed pixel view.
    pub fn pixels(&self) -> &[Rgb8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels().get((y as usize) * (self.width as usize) + x as usize).copied()
    }

    /// Image dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Pixel count.
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Size in bytes.
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

impl std::fmt::Debug for RgbImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RgbImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("size_bytes", &self.size_bytes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_u8_checks_len() {
        assert!(RgbImage::from_u8(vec![0; 12], 2, 2).is_ok());
        assert!(matches!(
            RgbImage::from_u8(vec![0; 11], 2, 2),
            Err(ComputeError::BufferSizeMismatch { expected: 12, actual: 11 })
        ));
    }

    #[test]
    fn test_filled_rejects_empty() {
        assert!(matches!(
            RgbImage::filled(0, 3, Rgb8::new(1, 2, 3)),
            Err(ComputeError::InvalidDimensions(0, 3))
        ));
        assert!(RgbImage::new(2, 0).is_err());

        let img = RgbImage::filled(2, 3, Rgb8::new(1, 2, 3)).unwrap();
        assert_eq!(img.dimensions(), (2, 3));
        assert_eq!(img.size_bytes(), 2 * 3 * CHANNELS);
        assert!(img.pixels().iter().all(|&p| p == Rgb8::new(1, 2, 3)));
    }

    #[test]
    fn test_pixel_lookup() {
        let img = RgbImage::from_pixels(
            &[Rgb8::new(1, 1, 1), Rgb8::new(2, 2, 2), Rgb8::new(3, 3, 3)],
            3,
            1,
        )
        .unwrap();
        assert_eq!(img.pixel(2, 0), Some(Rgb8::new(3, 3, 3)));
        assert_eq!(img.pixel(3, 0), None);
    }
}
