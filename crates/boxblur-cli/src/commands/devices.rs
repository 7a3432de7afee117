//! List compute devices.

use anyhow::Result;
use boxblur_compute::{describe_backends, select_best_backend};

pub fn run() -> Result<()> {
    println!("Compute backends:");
    print!("{}", describe_backends());
    println!("Selected: {}", select_best_backend().name());
    Ok(())
}
