//! Near-white to transparent conversion

use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use thiserror::Error;

use crate::save::save_png_atomic;
use crate::tolerance::Tolerance;

/// Replacement for every background pixel: fully transparent white.
pub const TRANSPARENT_WHITE: Rgba<u8> = Rgba([255, 255, 255, 0]);

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("failed to encode PNG {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ConvertError {
    /// The file the failure concerns.
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. }
            | Self::Decode { path, .. }
            | Self::Encode { path, .. }
            | Self::Write { path, .. } => path,
        }
    }
}

/// Summary of one successful conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
    pub width: u32,
    pub height: u32,
    /// Pixels classified as background (including ones already transparent white).
    pub cleared: usize,
}

/// Whether a pixel is treated as background. Alpha is not consulted.
pub fn is_background(pixel: &Rgba<u8>, tolerance: Tolerance) -> bool {
    let [r, g, b, _] = pixel.0;
    tolerance.is_white(r, g, b)
}

/// Replace every background pixel with [`TRANSPARENT_WHITE`] in place.
///
/// All other pixels keep their original value, alpha included. Returns the
/// number of pixels replaced.
pub fn clear_white(img: &mut RgbaImage, tolerance: Tolerance) -> usize {
    let mut cleared = 0;
    for pixel in img.pixels_mut() {
        if is_background(pixel, tolerance) {
            *pixel = TRANSPARENT_WHITE;
            cleared += 1;
        }
    }
    cleared
}

/// Load any supported raster file as RGBA8.
///
/// The format is sniffed from the file contents, falling back to the
/// extension, so a mislabelled file still decodes.
pub fn load_rgba(path: &Path) -> Result<RgbaImage, ConvertError> {
    let io_err = |source| ConvertError::Io {
        path: path.to_path_buf(),
        source,
    };
    let reader = image::io::Reader::open(path)
        .map_err(io_err)?
        .with_guessed_format()
        .map_err(io_err)?;
    let img = reader.decode().map_err(|source| ConvertError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.into_rgba8())
}

/// Load `source`, clear its near-white pixels and save the result to
/// `destination` as an RGBA PNG.
///
/// The destination is always written as PNG whatever its extension, so a
/// JPEG source with a `.png` destination is converted and cleared in one
/// call. `source` and `destination` may be the same path; the destination
/// is only replaced once the new PNG is fully written.
pub fn remove_white_background(
    source: &Path,
    destination: &Path,
    tolerance: Tolerance,
) -> Result<Conversion, ConvertError> {
    let mut img = load_rgba(source)?;
    let (width, height) = img.dimensions();

    let cleared = clear_white(&mut img, tolerance);
    log::debug!(
        "{}: {}x{}, {} background pixels at tolerance {}",
        source.display(),
        width,
        height,
        cleared,
        tolerance
    );

    save_png_atomic(&img, destination)?;

    Ok(Conversion {
        width,
        height,
        cleared,
    })
}
