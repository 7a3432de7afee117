//! Command implementations

pub mod blur;
pub mod devices;

use anyhow::{Context, Result};
use boxblur_compute::RgbImage;
use boxblur_io::IoError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Input file missing, unreadable or of an unsupported format.
pub const EXIT_FILE: u8 = 1;
/// Radius missing, non-numeric or not positive.
pub const EXIT_RADIUS: u8 = 2;
/// Everything else.
pub const EXIT_OTHER: u8 = 3;

/// Bad value supplied by the user.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("invalid blur radius '{0}': must be a whole number greater than 0")]
    InvalidRadius(String),
}

/// Writing the result failed. Not an input problem.
#[derive(Debug, Error)]
#[error("Failed to save: {}", path.display())]
pub struct SaveError {
    path: PathBuf,
    #[source]
    source: IoError,
}

/// Process exit code for a failed run.
///
/// Only errors raised while reading the input count as file errors.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if cause.downcast_ref::<SaveError>().is_some() {
            return EXIT_OTHER;
        }
        if cause.downcast_ref::<UsageError>().is_some() {
            return EXIT_RADIUS;
        }
        if cause.downcast_ref::<IoError>().is_some() {
            return EXIT_FILE;
        }
    }
    EXIT_OTHER
}

/// Load image from file.
pub fn load_image(path: &Path) -> Result<RgbImage> {
    boxblur_io::read(path).with_context(|| format!("Failed to load: {}", path.display()))
}

/// Save image to file.
pub fn save_image(path: &Path, image: &RgbImage) -> Result<()> {
    boxblur_io::write(path, image).map_err(|source| {
        SaveError {
            path: path.to_path_buf(),
            source,
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_exit_codes() {
        let radius = anyhow::Error::new(UsageError::InvalidRadius("x".into()));
        assert_eq!(exit_code(&radius), EXIT_RADIUS);

        let missing = anyhow::Error::new(IoError::NotFound(PathBuf::from("a.png")))
            .context("Failed to load: a.png");
        assert_eq!(exit_code(&missing), EXIT_FILE);

        let save = anyhow::Error::new(SaveError {
            path: PathBuf::from("out.png"),
            source: IoError::NotFound(PathBuf::from("out.png")),
        });
        assert_eq!(exit_code(&save), EXIT_OTHER);

        assert_eq!(exit_code(&anyhow!("device lost")), EXIT_OTHER);
    }
}
