//! Staged PNG output: a failed save never truncates the destination

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, ImageError, RgbaImage};

use crate::convert::ConvertError;

/// Sibling path the PNG is staged at before it replaces `destination`.
fn staging_path(destination: &Path) -> io::Result<PathBuf> {
    let name = destination.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "destination has no file name")
    })?;
    let mut staged = std::ffi::OsString::from(".");
    staged.push(name);
    staged.push(".whiteout.tmp");
    Ok(destination.with_file_name(staged))
}

/// Encode `img` as RGBA PNG into `staged` and flush it to disk.
fn write_staged(img: &RgbaImage, staged: &Path) -> Result<(), ImageError> {
    let mut writer = BufWriter::new(File::create(staged)?);
    let (width, height) = img.dimensions();
    PngEncoder::new(&mut writer).write_image(img.as_raw(), width, height, ColorType::Rgba8)?;
    writer.flush()?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(())
}

/// Write `img` as PNG to `destination`, replacing any existing file only
/// after the new one is complete.
///
/// The image is encoded to a hidden file next to the destination, synced, and
/// renamed into place. The rename replaces the destination entry itself: a
/// symlink at `destination` becomes a regular file and the new file gets
/// default permissions. On failure the staging file is removed and the
/// destination is left as it was.
pub fn save_png_atomic(img: &RgbaImage, destination: &Path) -> Result<(), ConvertError> {
    let staged = staging_path(destination).map_err(|source| ConvertError::Write {
        path: destination.to_path_buf(),
        source,
    })?;

    if let Err(err) = write_staged(img, &staged) {
        discard(&staged);
        return Err(match err {
            ImageError::IoError(source) => ConvertError::Write {
                path: destination.to_path_buf(),
                source,
            },
            source => ConvertError::Encode {
                path: destination.to_path_buf(),
                source,
            },
        });
    }

    if let Err(source) = fs::rename(&staged, destination) {
        discard(&staged);
        return Err(ConvertError::Write {
            path: destination.to_path_buf(),
            source,
        });
    }

    Ok(())
}

fn discard(staged: &Path) {
    if let Err(e) = fs::remove_file(staged) {
        if e.kind() != io::ErrorKind::NotFound {
            log::warn!("Could not remove {}: {}", staged.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::scratch_dir;
    use image::Rgba;

    #[test]
    fn test_staging_path_is_hidden_sibling() {
        let staged = staging_path(Path::new("assets/houses/barn.png")).unwrap();
        assert_eq!(staged, Path::new("assets/houses/.barn.png.whiteout.tmp"));
        assert!(staging_path(Path::new("/")).is_err());
    }

    #[test]
    fn test_replaces_existing_file() {
        let dir = scratch_dir("save_replace");
        let path = dir.join("plot.png");
        fs::write(&path, b"old contents").unwrap();

        let img = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 4]));
        save_png_atomic(&img, &path).unwrap();

        let back = image::open(&path).unwrap().into_rgba8();
        assert_eq!(back, img);
        assert!(!dir.join(".plot.png.whiteout.tmp").exists());
    }

    #[test]
    fn test_failed_save_keeps_destination() {
        let dir = scratch_dir("save_failure");
        let destination = dir.join("plot.png");
        fs::write(&destination, b"keep me").unwrap();

        // A directory squatting on the staging path makes the write fail.
        fs::create_dir(dir.join(".plot.png.whiteout.tmp")).unwrap();

        let img = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        let err = save_png_atomic(&img, &destination).unwrap_err();
        assert_eq!(err.path(), destination.as_path());
        assert_eq!(fs::read(&destination).unwrap(), b"keep me");
    }

    #[test]
    fn test_staged_output_is_rgba_png() {
        let dir = scratch_dir("save_format");
        let path = dir.join("logo.png");
        let img = RgbaImage::from_pixel(3, 1, Rgba([255, 255, 255, 0]));
        save_png_atomic(&img, &path).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Png);
        let back = image::load_from_memory(&bytes).unwrap();
        assert_eq!(back.color(), ColorType::Rgba8);
        assert_eq!(back.into_rgba8(), img);
    }

    #[test]
    fn test_missing_parent_directory_fails() {
        let dir = scratch_dir("save_no_parent");
        let destination = dir.join("nowhere").join("logo.png");

        let img = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        let err = save_png_atomic(&img, &destination).unwrap_err();
        assert!(matches!(err, ConvertError::Write { .. }));
        assert!(!destination.exists());
    }
}
