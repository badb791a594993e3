//! Runs the configured directory and file jobs in order

use std::fs;
use std::path::{Path, PathBuf};

use glob::{glob, Pattern};
use whiteout_core::{BatchReport, ConvertError, Outcome, Tolerance};

use crate::config::{Config, DirectoryJob, FileJob};

/// Process every directory job, then every file job. A failing file is
/// reported and the run moves on; nothing here aborts the batch.
pub fn run(config: &Config) -> BatchReport {
    let tolerance = config.tolerance();
    let mut report = BatchReport::new();

    log::info!(
        "Processing assets in {} (tolerance {})",
        config.root.display(),
        tolerance
    );

    for job in &config.directories {
        process_directory(config, job, tolerance, &mut report);
    }

    for job in &config.files {
        process_file(config, job, tolerance, &mut report);
    }

    report.log_summary();
    report
}

fn process_directory(
    config: &Config,
    job: &DirectoryJob,
    tolerance: Tolerance,
    report: &mut BatchReport,
) {
    let dir = config.source_path(&job.path);
    if !dir.is_dir() {
        log::debug!("Skipping {}: not a directory", dir.display());
        return;
    }

    for path in matching_files(&dir, &job.extension) {
        let Some(name) = path.file_name() else {
            continue;
        };
        let destination = config.output_path(&job.path.join(name));
        convert(&path, &destination, tolerance, report);
    }
}

fn process_file(config: &Config, job: &FileJob, tolerance: Tolerance, report: &mut BatchReport) {
    let source = config.source_path(&job.source);
    if job.skip_missing && !source.exists() {
        report.skip(&source);
        return;
    }

    if let Some(line) = job.announcement() {
        println!("{}", line);
    }

    let destination = config.output_path(job.destination());
    convert(&source, &destination, tolerance, report);
}

fn convert(source: &Path, destination: &Path, tolerance: Tolerance, report: &mut BatchReport) {
    let outcome = match ensure_parent(destination) {
        Ok(()) => Outcome::convert(source, destination, tolerance),
        Err(e) => Outcome {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            result: Err(e),
        },
    };
    report.record(&outcome);
}

/// Output roots may not mirror the input tree yet.
fn ensure_parent(destination: &Path) -> Result<(), ConvertError> {
    match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            fs::create_dir_all(parent).map_err(|source| ConvertError::Write {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

/// Files directly inside `dir` named `*.<extension>`, sorted by name.
fn matching_files(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let pattern = format!(
        "{}/*.{}",
        Pattern::escape(&dir.to_string_lossy()),
        Pattern::escape(extension)
    );

    let entries = match glob(&pattern) {
        Ok(entries) => entries,
        Err(e) => {
            log::error!("Bad file pattern {}: {}", pattern, e);
            return Vec::new();
        }
    };

    entries
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("Unreadable entry: {}", e);
                None
            }
        })
        .collect()
}
