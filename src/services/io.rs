//! Image I/O operations service
//!
//! Reading inputs, decoding and encoding images, and writing outputs so that a
//! failed run never leaves a partial file behind.

use crate::error::{BgRemovalError, Result};
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::{Cursor, Write};
use std::path::Path;
use tracing::debug;

/// Service for handling image file input/output operations
pub struct ImageIOService;

impl ImageIOService {
    /// Read the raw bytes of an input image
    ///
    /// # Errors
    /// - [`BgRemovalError::MissingInput`] if the path does not exist
    /// - [`BgRemovalError::Io`] if it cannot be read
    pub fn read_input<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(BgRemovalError::MissingInput(path_ref.to_path_buf()));
        }

        let data = std::fs::read(path_ref)
            .map_err(|e| BgRemovalError::file_io_error("read image file", path_ref, &e))?;
        debug!(path = %path_ref.display(), bytes = data.len(), "Read input image");
        Ok(data)
    }

    /// Decode an image from memory using content-based format detection
    pub fn decode(image_bytes: &[u8]) -> Result<DynamicImage> {
        let format = image::guess_format(image_bytes).map_err(|e| {
            BgRemovalError::processing(format!(
                "Unrecognized image data ({} bytes): {}",
                image_bytes.len(),
                e
            ))
        })?;

        let image = image::load_from_memory_with_format(image_bytes, format)?;
        debug!(
            ?format,
            width = image.width(),
            height = image.height(),
            color = ?image.color(),
            "Decoded image"
        );
        Ok(image)
    }

    /// Encode an RGBA image as PNG, preserving the alpha channel
    pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Png)?;
        Ok(buffer.into_inner())
    }

    /// Write `data` to `path` through a temporary file in the same directory.
    ///
    /// The destination only appears once the bytes are fully written; on error
    /// the temporary file is removed and any existing destination is untouched.
    /// The parent directory must already exist.
    pub fn write_output<P: AsRef<Path>>(path: P, data: &[u8]) -> Result<()> {
        let path_ref = path.as_ref();

        let parent = match path_ref.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = tempfile::Builder::new()
            .prefix(".remove-bg-")
            .suffix(".tmp")
            .tempfile_in(parent)
            .map_err(|e| BgRemovalError::file_io_error("create temporary file in", parent, &e))?;

        temp.write_all(data)
            .and_then(|()| temp.flush())
            .map_err(|e| BgRemovalError::file_io_error("write output", path_ref, &e))?;

        temp.persist(path_ref)
            .map_err(|e| BgRemovalError::file_io_error("persist output", path_ref, &e.error))?;

        debug!(path = %path_ref.display(), bytes = data.len(), "Wrote output image");
        Ok(())
    }
}
