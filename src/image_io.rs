//! Reading and writing raster images through the [`image`] crate.

use crate::{Error, Result};

use std::path::Path;

use image::{ImageError, RgbImage};

/// Opens the image at `path`, guessing its format from the file extension,
/// and converts it to 8-bit RGB. Any alpha channel is dropped.
///
/// # Errors
/// - [`Error::Io`] if the file cannot be read.
/// - [`Error::Unsupported`] if the format is unknown or was not compiled in.
/// - [`Error::CorruptData`] if the file cannot be decoded.
pub fn read_rgb_image(path: impl AsRef<Path>) -> Result<RgbImage> {
    image::open(path)
        .map(image::DynamicImage::into_rgb8)
        .map_err(|e| image_error(e, "reading the image"))
}

/// Saves `image` at `path` in the format given by the file extension.
///
/// # Errors
/// - [`Error::Io`] if the file cannot be written.
/// - [`Error::Unsupported`] if the format is unknown or was not compiled in.
pub fn write_rgb_image(path: impl AsRef<Path>, image: &RgbImage) -> Result<()> {
    image
        .save(path)
        .map_err(|e| image_error(e, "writing the image"))
}

/// Maps an [`ImageError`] onto the crate's error type.
fn image_error(err: ImageError, context: &'static str) -> Error {
    match err {
        ImageError::IoError(source) => Error::io(source, context),
        ImageError::Decoding(e) => Error::CorruptData(e.to_string()),
        ImageError::Limits(e) => Error::InvalidInput(e.to_string()),
        ImageError::Parameter(e) => Error::InvalidInput(e.to_string()),
        ImageError::Unsupported(e) => Error::Unsupported(e.to_string()),
        ImageError::Encoding(e) => Error::Unsupported(e.to_string()),
        #[allow(unreachable_patterns)]
        other => Error::Unsupported(other.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("kmeg-{}-{name}", std::process::id()))
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let image = RgbImage::new(1, 1);
        let path = temp_path("image.not-a-format");
        assert!(matches!(write_rgb_image(&path, &image), Err(Error::Unsupported(_))));
        assert!(matches!(read_rgb_image(&path), Err(Error::Unsupported(_) | Error::Io { .. })));
    }

    #[test]
    fn missing_file_is_io() {
        let path = temp_path("missing.png");
        assert!(matches!(read_rgb_image(path), Err(Error::Io { .. })));
    }

    #[test]
    fn png_round_trip() {
        let image = RgbImage::from_fn(3, 2, |x, y| image::Rgb([x as u8 * 50, y as u8 * 90, 7]));
        let path = temp_path("round-trip.png");
        write_rgb_image(&path, &image).unwrap();
        let read = read_rgb_image(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(read, image);
    }
}
