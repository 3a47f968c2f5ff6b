use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};
use log::debug;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("the pixel buffer holds {actual} bytes, but {width}x{height} rgba needs {expected}")]
    BufferSize {
        width: u32,
        height: u32,
        expected: u128,
        actual: usize,
    },
    #[error("the signature width must be a positive number of centimetres, got {0}")]
    Width(f32),
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// A freehand signature as captured by the drawing canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureImage {
    pixels: RgbaImage,
    background: Rgba<u8>,
    /// The width of the signature in cm, by default `3.8cm`.
    width: f32,
}

impl SignatureImage {
    pub const DEFAULT_WIDTH: f32 = 3.8;
    pub const WHITE: Rgba<u8> = Rgba([0xFF, 0xFF, 0xFF, 0xFF]);

    #[must_use]
    pub fn new(pixels: RgbaImage) -> Self {
        Self {
            pixels,
            background: Self::WHITE,
            width: Self::DEFAULT_WIDTH,
        }
    }

    /// Wraps a raw rgba buffer, four bytes per pixel, row by row.
    pub fn from_rgba(width: u32, height: u32, buffer: Vec<u8>) -> Result<Self, SignatureError> {
        let expected = u128::from(width) * u128::from(height) * 4;
        let actual = buffer.len();
        let error = SignatureError::BufferSize {
            width,
            height,
            expected,
            actual,
        };

        if expected != actual as u128 {
            return Err(error);
        }

        RgbaImage::from_raw(width, height, buffer)
            .map(Self::new)
            .ok_or(error)
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, SignatureError> {
        debug!("loading signature from: {}", path.as_ref().display());
        Ok(Self::new(image::open(path)?.to_rgba8()))
    }

    pub fn with_width(mut self, width: f32) -> Result<Self, SignatureError> {
        if !width.is_finite() || width <= 0.0 {
            return Err(SignatureError::Width(width));
        }

        self.width = width;
        Ok(self)
    }

    #[must_use]
    pub fn with_background(mut self, background: Rgba<u8>) -> Self {
        self.background = background;
        self
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Returns `true` if nothing has been drawn.
    ///
    /// Pixels in the background colour and fully transparent pixels count as
    /// untouched canvas.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.pixels
            .pixels()
            .all(|pixel| *pixel == self.background || pixel.0[3] == 0)
    }

    pub fn to_png(&self) -> Result<Vec<u8>, SignatureError> {
        let mut buffer = Vec::new();
        self.pixels
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
        Ok(buffer)
    }
}
