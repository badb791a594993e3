//! Per-file outcomes and run totals

use std::fmt;
use std::path::{Path, PathBuf};

use crate::convert::{remove_white_background, Conversion, ConvertError};
use crate::tolerance::Tolerance;

/// Result of one file job. Failures are kept, not propagated.
#[derive(Debug)]
pub struct Outcome {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub result: Result<Conversion, ConvertError>,
}

impl Outcome {
    /// Run one conversion and capture its result.
    pub fn convert(source: &Path, destination: &Path, tolerance: Tolerance) -> Self {
        Self {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            result: remove_white_background(source, destination, tolerance),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            Ok(_) => write!(
                f,
                "Processed: {} -> {}",
                self.source.display(),
                self.destination.display()
            ),
            Err(e) => write!(f, "Error processing {}: {}", self.source.display(), e),
        }
    }
}

/// Running tally of a batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Print the console line for `outcome` and count it.
    pub fn record(&mut self, outcome: &Outcome) {
        println!("{}", outcome);
        match &outcome.result {
            Ok(conversion) => {
                self.processed += 1;
                log::debug!(
                    "{} background pixels cleared in {}",
                    conversion.cleared,
                    outcome.destination.display()
                );
            }
            Err(_) => self.failed += 1,
        }
    }

    /// Count a guarded job whose input was absent.
    pub fn skip(&mut self, path: &Path) {
        log::debug!("Skipping {}: not found", path.display());
        self.skipped += 1;
    }

    pub fn total(&self) -> usize {
        self.processed + self.failed + self.skipped
    }

    pub fn log_summary(&self) {
        if self.failed > 0 {
            log::warn!(
                "{} files: {} processed, {} failed, {} skipped",
                self.total(),
                self.processed,
                self.failed,
                self.skipped
            );
        } else {
            log::info!(
                "{} files: {} processed, {} skipped",
                self.total(),
                self.processed,
                self.skipped
            );
        }
    }
}
