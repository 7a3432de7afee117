//! JPEG format support.
//!
//! Decoding goes through `jpeg-decoder` and accepts RGB, grayscale, 16-bit
//! grayscale and CMYK input; everything is converted to 8-bit RGB.
//! Encoding uses `jpeg-encoder` with a configurable quality.

use crate::{IoError, IoResult, RgbImage};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Default encoder quality (1-100).
pub const DEFAULT_QUALITY: u8 = 90;

/// Reads a JPEG file.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<RgbImage> {
    let file = File::open(path.as_ref())?;
    let mut decoder = jpeg_decoder::Decoder::new(BufReader::new(file));
    let pixels = decoder
        .decode()
        .map_err(|e| IoError::DecodeError(e.to_string()))?;
    let info = decoder
        .info()
        .ok_or_else(|| IoError::DecodeError("missing JPEG info".into()))?;

    let rgb: Vec<u8> = match info.pixel_format {
        jpeg_decoder::PixelFormat::RGB24 => pixels,
        jpeg_decoder::PixelFormat::L8 => pixels.iter().flat_map(|&g| [g, g, g]).collect(),
        jpeg_decoder::PixelFormat::L16 => pixels
            .chunks_exact(2)
            .flat_map(|l16| {
                let g = l16[0]; // High byte
                [g, g, g]
            })
            .collect(),
        jpeg_decoder::PixelFormat::CMYK32 => pixels
            .chunks_exact(4)
            .flat_map(|cmyk| {
                let c = cmyk[0] as f32 / 255.0;
                let m = cmyk[1] as f32 / 255.0;
                let y = cmyk[2] as f32 / 255.0;
                let k = cmyk[3] as f32 / 255.0;
                [
                    ((1.0 - c) * (1.0 - k) * 255.0) as u8,
                    ((1.0 - m) * (1.0 - k) * 255.0) as u8,
                    ((1.0 - y) * (1.0 - k) * 255.0) as u8,
                ]
            })
            .collect(),
    };

    RgbImage::from_u8(rgb, info.width as u32, info.height as u32)
        .map_err(|e| IoError::DimensionMismatch(e.to_string()))
}

/// Writes a JPEG file with [`DEFAULT_QUALITY`].
pub fn write<P: AsRef<Path>>(path: P, image: &RgbImage) -> IoResult<()> {
    write_with_quality(path, image, DEFAULT_QUALITY)
}

/// Writes a JPEG file with the given quality (clamped to 1-100).
pub fn write_with_quality<P: AsRef<Path>>(path: P, image: &RgbImage, quality: u8) -> IoResult<()> {
    let data = encode(image, quality)?;
    std::fs::write(path.as_ref(), data)?;
    Ok(())
}

/// Encodes to an in-memory JPEG stream.
pub fn encode(image: &RgbImage, quality: u8) -> IoResult<Vec<u8>> {
    use jpeg_encoder::{ColorType, Encoder};

    let width = u16::try_from(image.width())
        .map_err(|_| IoError::EncodeError(format!("width {} exceeds JPEG limit", image.width())))?;
    let height = u16::try_from(image.height())
        .map_err(|_| IoError::EncodeError(format!("height {} exceeds JPEG limit", image.height())))?;

    let mut buffer = Vec::new();
    let encoder = Encoder::new(&mut buffer, quality.clamp(1, 100));
    encoder
        .encode(image.data(), width, height, ColorType::Rgb)
        .map_err(|e: jpeg_encoder::EncodingError| IoError::EncodeError(e.to_string()))?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxblur_compute::Rgb8;

    #[test]
    fn test_roundtrip_flat_color() {
        // Flat colour survives JPEG within a small tolerance.
        let image = RgbImage::filled(24, 16, Rgb8::new(200, 120, 40)).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flat.jpg");
        write_with_quality(&path, &image, 95).unwrap();
        let loaded = read(&path).unwrap();

        assert_eq!(loaded.dimensions(), (24, 16));
        for (a, b) in loaded.data().iter().zip(image.data()) {
            assert!((*a as i32 - *b as i32).abs() <= 4, "{a} vs {b}");
        }
    }

    #[test]
    fn test_encode_rejects_oversize() {
        let image = RgbImage::new(70000, 1).unwrap();
        assert!(matches!(encode(&image, 90), Err(IoError::EncodeError(_))));
    }
}
