//! Persisting images with a matching file extension

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::error::Result;
use crate::format::ImageFormat;

/// Append `.{extension}` unless `path` already ends with exactly that suffix.
///
/// The comparison is case-sensitive, and a path no longer than the suffix
/// always gets it appended.
pub fn with_format_suffix(path: &Path, format: ImageFormat) -> PathBuf {
    let suffix = format!(".{}", format.extension());
    let raw = path.as_os_str().as_encoded_bytes();
    if raw.len() > suffix.len() && raw.ends_with(suffix.as_bytes()) {
        return path.to_path_buf();
    }
    let mut name = OsString::from(path.as_os_str());
    name.push(&suffix);
    PathBuf::from(name)
}

/// Encode `image` as `format` and write it next to a corrected file name.
///
/// Returns the path that was actually written.
pub fn save_image(
    image: &DynamicImage,
    path: impl AsRef<Path>,
    format: ImageFormat,
) -> Result<PathBuf> {
    let path = with_format_suffix(path.as_ref(), format);

    // Encoders only accept the color types they can represent
    let converted = match format {
        ImageFormat::Jpeg => Some(DynamicImage::ImageRgb8(image.to_rgb8())),
        ImageFormat::Gif | ImageFormat::Ico => Some(DynamicImage::ImageRgba8(image.to_rgba8())),
        ImageFormat::Png | ImageFormat::Bmp | ImageFormat::Tiff => None,
    };
    let to_write = converted.as_ref().unwrap_or(image);

    if let Err(err) = to_write.save_with_format(&path, format.encoder_format()) {
        log::error!("Failed to save image to {}: {}", path.display(), err);
        return Err(err.into());
    }
    log::debug!(
        "Saved {}x{} image to {}",
        image.width(),
        image.height(),
        path.display()
    );
    Ok(path)
}
