//! Line-oriented stdin prompts.

use anyhow::{Context, Result, bail};
use std::io::{BufRead, Write};

/// Asks questions on `output` and reads answers from `input`.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `question` and return the trimmed answer line.
    pub fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).context("Failed to read from stdin")?;
        if read == 0 {
            bail!("unexpected end of input while waiting for an answer");
        }
        Ok(line.trim().to_string())
    }

    /// Print a full line.
    pub fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{message}")?;
        Ok(())
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }
}
