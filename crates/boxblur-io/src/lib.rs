//! Image I/O for the boxblur engine.
//!
//! Decodes PNG and JPEG files into [`RgbImage`] (8-bit, 3 channels) and
//! encodes blurred images back. The format is chosen from the file
//! extension; anything other than `.png`, `.jpg` or `.jpeg` is rejected
//! before any decoding happens.
//!
//! # Example
//!
//! ```rust,ignore
//! let image = boxblur_io::read("photo.jpg")?;
//! boxblur_io::write("photo_blurred.jpg", &image)?;
//! ```

pub mod jpeg;
pub mod png;

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};

pub use boxblur_compute::RgbImage;

/// Output name used when the user gives none.
pub const DEFAULT_OUTPUT_NAME: &str = "blurred_image";

/// I/O operation error.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Input file does not exist.
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Unsupported format.
    #[error("unsupported format: {0} (supported: .jpg, .jpeg, .png)")]
    UnsupportedFormat(String),

    /// Decoding error.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Encoding error.
    #[error("encode error: {0}")]
    EncodeError(String),

    /// Unsupported bit depth or colour type.
    #[error("unsupported bit depth: {0}")]
    UnsupportedBitDepth(String),

    /// Decoded data does not match the header.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),
}

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;

/// Supported raster formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Png,
    Jpeg,
}

impl Format {
    /// Format from a file extension (without the dot, case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    /// Format from a path's extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> IoResult<Self> {
        let path = path.as_ref();
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| IoError::UnsupportedFormat(path.display().to_string()))
    }

    /// Canonical extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

/// Check that `path` has a supported extension and exists.
pub fn validate_input<P: AsRef<Path>>(path: P) -> IoResult<Format> {
    let path = path.as_ref();
    let format = Format::from_path(path)?;
    if !path.is_file() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    Ok(format)
}

/// Reads a PNG or JPEG file.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<RgbImage> {
    let path = path.as_ref();
    trace!(path = %path.display(), "read");
    let format = validate_input(path)?;
    let image = match format {
        Format::Png => png::read(path)?,
        Format::Jpeg => jpeg::read(path)?,
    };
    debug!(path = %path.display(), w = image.width(), h = image.height(), ?format, "decoded");
    Ok(image)
}

/// Writes an image, choosing the encoder from the extension.
pub fn write<P: AsRef<Path>>(path: P, image: &RgbImage) -> IoResult<()> {
    let path = path.as_ref();
    trace!(path = %path.display(), "write");
    match Format::from_path(path)? {
        Format::Png => png::write(path, image),
        Format::Jpeg => jpeg::write(path, image),
    }
}

/// Resolve the output file name.
///
/// An empty `name` becomes [`DEFAULT_OUTPUT_NAME`]. Names without a supported
/// extension get the input file's extension appended.
pub fn output_path<P: AsRef<Path>>(name: &str, input: P) -> PathBuf {
    let name = name.trim();
    let name = if name.is_empty() { DEFAULT_OUTPUT_NAME } else { name };
    if Format::from_path(name).is_ok() {
        return PathBuf::from(name);
    }
    let ext = input
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| Format::from_extension(e).is_some())
        .unwrap_or("png");
    PathBuf::from(format!("{name}.{ext}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(Format::from_path("a.PNG").unwrap(), Format::Png);
        assert_eq!(Format::from_path("dir/b.jpeg").unwrap(), Format::Jpeg);
        assert_eq!(Format::from_path("c.jpg").unwrap(), Format::Jpeg);
        assert!(matches!(Format::from_path("d.bmp"), Err(IoError::UnsupportedFormat(_))));
        assert!(Format::from_path("noext").is_err());
    }

    #[test]
    fn test_output_path() {
        assert_eq!(output_path("", "in.jpg"), PathBuf::from("blurred_image.jpg"));
        assert_eq!(output_path("  ", "in.png"), PathBuf::from("blurred_image.png"));
        assert_eq!(output_path("soft", "in.png"), PathBuf::from("soft.png"));
        assert_eq!(output_path("soft.jpg", "in.png"), PathBuf::from("soft.jpg"));
        assert_eq!(output_path("soft.v2", "in.JPG"), PathBuf::from("soft.v2.JPG"));
    }

    #[test]
    fn test_io_error_printed_once() {
        let err = IoError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.to_string(), "gone");
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn test_missing_file() {
        let err = validate_input("definitely/not/here.png").unwrap_err();
        assert!(matches!(err, IoError::NotFound(_)));
    }

    #[test]
    fn test_extension_checked_before_existence() {
        let err = validate_input("definitely/not/here.gif").unwrap_err();
        assert!(matches!(err, IoError::UnsupportedFormat(_)));
    }
}
