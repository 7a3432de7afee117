//! Interactive blur command.
//!
//! Flags given on the command line skip the matching prompt.

use anyhow::Result;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, info, trace};

use boxblur_compute::ProcessorBuilder;
use boxblur_io::{DEFAULT_OUTPUT_NAME, output_path, validate_input};

use super::{UsageError, load_image, save_image};
use crate::BlurArgs;
use crate::prompt::Prompter;

/// Parse a user-supplied radius. Must be a whole number greater than 0.
pub fn parse_radius(text: &str) -> Result<u32, UsageError> {
    let text = text.trim();
    match text.parse::<i64>() {
        Ok(r) if r > 0 => u32::try_from(r).map_err(|_| UsageError::InvalidRadius(text.to_string())),
        _ => Err(UsageError::InvalidRadius(text.to_string())),
    }
}

/// Run the blur flow. Returns the path written.
pub fn run<R: BufRead, W: Write>(
    args: &BlurArgs,
    prompter: &mut Prompter<R, W>,
    verbose: u8,
) -> Result<PathBuf> {
    let input = match &args.input {
        Some(path) => path.clone(),
        None => PathBuf::from(prompter.ask(
            "Please insert the FULL filename of the image you want to blur (.jpg OR .png) --> ",
        )?),
    };
    trace!(input = %input.display(), "blur");

    validate_input(&input)?;
    let mut image = load_image(&input)?;
    prompter.say("Input image read successfully!")?;
    prompter.say(&format!(
        "Image width: {}px, Image height: {}px",
        image.width(),
        image.height()
    ))?;

    let radius_text = match &args.radius {
        Some(r) => r.clone(),
        None => prompter.ask("Enter blur radius --> ")?,
    };
    let radius = parse_radius(&radius_text)?;

    let mut builder = ProcessorBuilder::new().verbose(verbose > 0);
    if let Some(backend) = args.backend {
        builder = builder.backend(backend);
    }
    if let Some(threads) = args.threads {
        builder = builder.threads(threads);
    }
    let processor = builder.build()?;
    debug!(backend = processor.backend_name(), radius, "processor ready");

    processor.run_blur(&mut image, radius)?;
    prompter.say(&format!("Blur of radius {} done!", radius))?;

    let name = match &args.output {
        Some(name) => name.clone(),
        None => prompter.ask("Please name the result blurred image --> ")?,
    };
    if name.trim().is_empty() {
        prompter.say(&format!(
            "Name invalid, using filename '{}' instead",
            DEFAULT_OUTPUT_NAME
        ))?;
    }
    let output = output_path(&name, &input);

    save_image(&output, &image)?;
    info!(output = %output.display(), "saved");
    prompter.say(&format!("Saved {}", output.display()))?;

    Ok(output)
}
