//! # whiteout-core
//!
//! Turns near-white backgrounds of raster assets into transparency.
//!
//! ## Features
//! - Per-pixel whiteness test with a configurable tolerance
//! - PNG and JPEG input, RGBA PNG output
//! - In-place conversion with staged writes (a failed save never truncates the original)
//! - Per-file outcomes that never abort a batch
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use whiteout_core::{BatchReport, Outcome, Tolerance};
//!
//! let mut report = BatchReport::new();
//! let logo = Path::new("assets/logo.jpg");
//! report.record(&Outcome::convert(logo, Path::new("assets/logo.png"), Tolerance::default()));
//! report.log_summary();
//! ```

pub mod convert;
pub mod report;
mod save;
mod tolerance;

pub use convert::{
    clear_white, is_background, load_rgba, remove_white_background, Conversion, ConvertError,
    TRANSPARENT_WHITE,
};
pub use report::{BatchReport, Outcome};
pub use save::save_png_atomic;
pub use tolerance::Tolerance;

#[cfg(test)]
pub(crate) mod test_util {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static NEXT: AtomicUsize = AtomicUsize::new(0);

    /// Fresh empty directory for one test.
    pub fn scratch_dir(name: &str) -> PathBuf {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = std::env::temp_dir().join(format!(
            "whiteout-core-{}-{}-{}",
            name,
            std::process::id(),
            NEXT.fetch_add(1, Ordering::Relaxed)
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}
