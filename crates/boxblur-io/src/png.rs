//! PNG format support.
//!
//! Every input is reduced to 8-bit RGB: palettes and low bit depths are
//! expanded, 16-bit samples keep their high byte, grayscale is replicated
//! and alpha is dropped.

use crate::{IoError, IoResult, RgbImage};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Reads a PNG file from the given path.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<RgbImage> {
    let file = File::open(path.as_ref())?;
    let mut decoder = png::Decoder::new(BufReader::new(file));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;

    let buf_size = reader.output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("cannot determine output buffer size".into()))?;
    let mut buf = vec![0u8; buf_size];
    let info = reader.next_frame(&mut buf)
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;
    let samples = &buf[..info.buffer_size()];

    let rgb: Vec<u8> = match (info.color_type, info.bit_depth) {
        (png::ColorType::Rgb, png::BitDepth::Eight) => samples.to_vec(),
        (png::ColorType::Rgba, png::BitDepth::Eight) => samples
            .chunks_exact(4)
            .flat_map(|p| [p[0], p[1], p[2]])
            .collect(),
        (png::ColorType::Grayscale, png::BitDepth::Eight) => samples
            .iter()
            .flat_map(|&g| [g, g, g])
            .collect(),
        (png::ColorType::GrayscaleAlpha, png::BitDepth::Eight) => samples
            .chunks_exact(2)
            .flat_map(|ga| [ga[0], ga[0], ga[0]])
            .collect(),
        (color_type, bit_depth) => {
            return Err(IoError::UnsupportedBitDepth(
                format!("{:?} {:?}", color_type, bit_depth)
            ));
        }
    };

    RgbImage::from_u8(rgb, info.width, info.height)
        .map_err(|e| IoError::DimensionMismatch(e.to_string()))
}

/// Writes an 8-bit RGB PNG.
pub fn write<P: AsRef<Path>>(path: P, image: &RgbImage) -> IoResult<()> {
    let file = File::create(path.as_ref())?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::default());

    let mut png_writer = encoder.write_header()
        .map_err(|e| IoError::EncodeError(e.to_string()))?;
    png_writer.write_image_data(image.data())
        .map_err(|e| IoError::EncodeError(e.to_string()))?;
    png_writer.finish()
        .map_err(|e| IoError::EncodeError(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_rgb() {
        let width = 32;
        let height = 16;
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                data.push((x * 8) as u8);
                data.push((y * 16) as u8);
                data.push(128);
            }
        }
        let image = RgbImage::from_u8(data, width, height).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgb.png");
        write(&path, &image).expect("Failed to write PNG");
        let loaded = read(&path).expect("Failed to read PNG");

        assert_eq!(loaded, image);
    }

    #[test]
    fn test_rgba_drops_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgba.png");
        {
            let file = File::create(&path).unwrap();
            let mut encoder = png::Encoder::new(BufWriter::new(file), 2, 1);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut w = encoder.write_header().unwrap();
            w.write_image_data(&[1, 2, 3, 255, 4, 5, 6, 0]).unwrap();
        }

        let loaded = read(&path).unwrap();
        assert_eq!(loaded.data(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_grayscale_expands() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        {
            let file = File::create(&path).unwrap();
            let mut encoder = png::Encoder::new(BufWriter::new(file), 2, 1);
            encoder.set_color(png::ColorType::Grayscale);
            encoder.set_depth(png::BitDepth::Eight);
            let mut w = encoder.write_header().unwrap();
            w.write_image_data(&[10, 200]).unwrap();
        }

        let loaded = read(&path).unwrap();
        assert_eq!(loaded.data(), &[10, 10, 10, 200, 200, 200]);
    }
}
