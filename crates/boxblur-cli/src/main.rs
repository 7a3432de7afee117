//! boxblur - box-blur an image on the GPU or CPU
//!
//! Every value not given on the command line is asked for interactively.

use anyhow::Result;
use clap::{Args, Parser};
use std::path::PathBuf;
use std::process::ExitCode;

use boxblur_compute::Backend;

mod commands;
mod logging;
mod prompt;

#[derive(Parser)]
#[command(name = "boxblur")]
#[command(author, version, about = "Box-blur an image on the GPU or CPU")]
#[command(long_about = "
Applies a box (averaging) blur to a PNG or JPEG image. Each output pixel is
the mean of the in-bounds pixels within RADIUS of it. The blur runs on a GPU
when one is available and falls back to CPU threads otherwise.

Missing arguments are prompted for on stdin.

Examples:
  boxblur                                 # fully interactive
  boxblur photo.jpg -r 4 -o soft          # writes soft.jpg
  boxblur photo.png -r 2 -o out.png --backend cpu -j 8
  boxblur --list-devices
")]
struct Cli {
    #[command(flatten)]
    blur: BlurArgs,

    /// Print detected compute devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Also append logs to this file
    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
struct BlurArgs {
    /// Input image (.jpg, .jpeg, .png)
    input: Option<PathBuf>,

    /// Blur radius in pixels (> 0)
    #[arg(short, long, allow_hyphen_values = true)]
    radius: Option<String>,

    /// Output name; the input's extension is added when missing
    #[arg(short, long)]
    output: Option<String>,

    /// Compute backend: auto, cpu, wgpu
    #[arg(short, long)]
    backend: Option<Backend>,

    /// Number of CPU threads (0 = auto)
    #[arg(short = 'j', long)]
    threads: Option<usize>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match logging::init(cli.verbose, cli.log.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("ERROR: {e:#}");
            return ExitCode::from(commands::EXIT_OTHER);
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {e:#}");
            ExitCode::from(commands::exit_code(&e))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if cli.list_devices {
        return commands::devices::run();
    }

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut prompter = prompt::Prompter::new(stdin.lock(), stdout.lock());
    commands::blur::run(&cli.blur, &mut prompter, cli.verbose).map(|_| ())
}
