//! # overlay-io
//!
//! Reads images into planar `f32` buffers and writes them back.
//!
//! Any format the `image` crate is built with can be read (BMP and PNG are
//! enabled). Every image is converted to 8-bit RGB on load, so grayscale and
//! alpha inputs become three color channels, and intensities land in
//! `[0, 255]`. On write, samples are rounded and clamped back to `u8`; the
//! output format follows the file extension.
//!
//! # Example
//!
//! ```rust,ignore
//! use overlay_io::{read, write};
//!
//! let image = read("bailarina.bmp")?;
//! println!("{}x{} ({} pixels)", image.width, image.height, image.pixel_count());
//! write("copy.png", &image)?;
//! ```

#![warn(missing_docs)]

use std::path::{Path, PathBuf};

use image::RgbImage;
use overlay_core::PlanarBuffer;
use thiserror::Error;
use tracing::debug;

/// Errors from image decoding and encoding.
#[derive(Debug, Error)]
pub enum IoError {
    /// The file could not be decoded.
    #[error("failed to read {}: {source}", path.display())]
    Decode {
        /// File that failed
        path: PathBuf,
        /// Underlying codec error
        source: image::ImageError,
    },

    /// The file could not be encoded or written.
    #[error("failed to write {}: {source}", path.display())]
    Encode {
        /// File that failed
        path: PathBuf,
        /// Underlying codec error
        source: image::ImageError,
    },

    /// Width and height do not match the buffer's pixel count.
    #[error("{width}x{height} image cannot hold {pixel_count} pixels")]
    DimensionMismatch {
        /// Declared width
        width: u32,
        /// Declared height
        height: u32,
        /// Pixels in the buffer
        pixel_count: usize,
    },

    /// Buffer conversion failed.
    #[error(transparent)]
    Buffer(#[from] overlay_core::Error),
}

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;

/// A planar RGB image with its dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarImage {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Channel data, row-major within each channel
    pub buffer: PlanarBuffer,
}

impl PlanarImage {
    /// Wraps a buffer, checking that `width * height` matches its pixel count.
    pub fn new(width: u32, height: u32, buffer: PlanarBuffer) -> IoResult<Self> {
        if (width as usize) * (height as usize) != buffer.pixel_count() {
            return Err(IoError::DimensionMismatch {
                width,
                height,
                pixel_count: buffer.pixel_count(),
            });
        }
        Ok(Self { width, height, buffer })
    }

    /// Zero-filled image.
    pub fn black(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            buffer: PlanarBuffer::new(width as usize * height as usize),
        }
    }

    /// Number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.buffer.pixel_count()
    }

    /// Returns `true` if both images have the same width and height.
    pub fn same_size(&self, other: &PlanarImage) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Builds a planar image from an 8-bit RGB image.
    pub fn from_rgb8(rgb: &RgbImage) -> IoResult<Self> {
        let samples: Vec<f32> = rgb.as_raw().iter().map(|&v| f32::from(v)).collect();
        let buffer = PlanarBuffer::from_interleaved_rgb(&samples)?;
        Self::new(rgb.width(), rgb.height(), buffer)
    }

    /// Converts to an 8-bit RGB image, rounding and clamping each sample.
    ///
    /// Fails with [`IoError::DimensionMismatch`] if `width` and `height` no
    /// longer match the buffer.
    pub fn to_rgb8(&self) -> IoResult<RgbImage> {
        let mismatch = || IoError::DimensionMismatch {
            width: self.width,
            height: self.height,
            pixel_count: self.pixel_count(),
        };
        // `from_raw` accepts oversized buffers, so compare exactly first.
        if (self.width as usize) * (self.height as usize) != self.pixel_count() {
            return Err(mismatch());
        }

        let raw: Vec<u8> = self
            .buffer
            .to_interleaved_rgb()
            .into_iter()
            .map(|v| v.round().clamp(0.0, 255.0) as u8)
            .collect();
        RgbImage::from_raw(self.width, self.height, raw).ok_or_else(mismatch)
    }
}

/// Reads an image file into a planar buffer.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<PlanarImage> {
    let path = path.as_ref();
    let decoded = image::open(path).map_err(|source| IoError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let image = PlanarImage::from_rgb8(&decoded.to_rgb8())?;
    debug!(path = %path.display(), width = image.width, height = image.height, "read image");
    Ok(image)
}

/// Writes a planar image; the format is chosen from the file extension.
pub fn write<P: AsRef<Path>>(path: P, image: &PlanarImage) -> IoResult<()> {
    let path = path.as_ref();
    image.to_rgb8()?.save(path).map_err(|source| IoError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), width = image.width, height = image.height, "wrote image");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use overlay_core::Channel;
    use tempfile::tempdir;

    fn gradient(width: u32, height: u32) -> PlanarImage {
        let n = (width * height) as usize;
        let r: Vec<f32> = (0..n).map(|i| (i % 256) as f32).collect();
        let g: Vec<f32> = (0..n).map(|i| ((i * 3) % 256) as f32).collect();
        let b: Vec<f32> = (0..n).map(|i| (255 - i % 256) as f32).collect();
        PlanarImage::new(width, height, PlanarBuffer::from_channels(r, g, b).unwrap()).unwrap()
    }

    #[test]
    fn test_roundtrip_bmp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bmp");
        let image = gradient(17, 9);

        write(&path, &image).unwrap();
        let loaded = read(&path).unwrap();

        assert_eq!(loaded, image);
    }

    #[test]
    fn test_roundtrip_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.png");
        let image = gradient(32, 32);

        write(&path, &image).unwrap();
        let loaded = read(&path).unwrap();

        assert!(loaded.same_size(&image));
        assert_eq!(loaded.buffer, image.buffer);
    }

    #[test]
    fn test_write_rounds_and_clamps() {
        let buffer = PlanarBuffer::from_channels(
            vec![-20.0, 41.33],
            vec![300.0, 41.6],
            vec![127.5, 0.4],
        )
        .unwrap();
        let image = PlanarImage::new(2, 1, buffer).unwrap();
        let rgb = image.to_rgb8().unwrap();

        assert_eq!(rgb.get_pixel(0, 0).0, [0, 255, 128]);
        assert_eq!(rgb.get_pixel(1, 0).0, [41, 42, 0]);
    }

    #[test]
    fn test_planar_layout_from_rgb8() {
        let rgb = RgbImage::from_raw(2, 1, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let image = PlanarImage::from_rgb8(&rgb).unwrap();
        assert_eq!(image.buffer.channel(Channel::R), &[1.0, 4.0]);
        assert_eq!(image.buffer.channel(Channel::G), &[2.0, 5.0]);
        assert_eq!(image.buffer.channel(Channel::B), &[3.0, 6.0]);
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = PlanarImage::new(3, 3, PlanarBuffer::new(8)).unwrap_err();
        assert!(matches!(err, IoError::DimensionMismatch { pixel_count: 8, .. }));
    }

    #[test]
    fn test_write_rejects_inconsistent_dimensions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.bmp");
        let mut image = PlanarImage::new(2, 1, PlanarBuffer::filled(2, [200.0; 3])).unwrap();
        image.width = 3;

        let err = write(&path, &image).unwrap_err();
        assert!(matches!(
            err,
            IoError::DimensionMismatch { width: 3, height: 1, pixel_count: 2 }
        ));
        assert!(!path.exists());

        image.width = 1;
        assert!(matches!(
            image.to_rgb8(),
            Err(IoError::DimensionMismatch { width: 1, height: 1, pixel_count: 2 })
        ));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempdir().unwrap();
        let err = read(dir.path().join("missing.bmp")).unwrap_err();
        assert!(matches!(err, IoError::Decode { .. }));
        assert!(err.to_string().contains("missing.bmp"));
    }
}
