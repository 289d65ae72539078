//! Packed byte images.
//!
//! [`PackedImage`] stores 8-bit samples interleaved per pixel (`HWC`), the
//! way decoded PNG/JPEG data arrives. It is the second of the two image
//! encodings accepted at the functional boundary; the other is [`Grid`].
//!
//! ```rust
//! use visaug_core::{PackedImage, PixelMode};
//!
//! let img = PackedImage::new(2, 1, PixelMode::Rgb, vec![255, 0, 0, 0, 255, 0]).unwrap();
//! assert_eq!(img.pixel(1, 0), &[0, 255, 0]);
//!
//! let grid = img.to_grid();
//! assert_eq!(grid.shape().dims(), vec![3, 1, 2]);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::grid::{Grid, GridData, Shape};

/// Channel layout of a packed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelMode {
    /// Single luminance channel.
    L,
    /// Red, green, blue.
    Rgb,
    /// Red, green, blue, alpha.
    Rgba,
}

impl PixelMode {
    /// Number of interleaved channels.
    pub const fn channels(self) -> usize {
        match self {
            Self::L => 1,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }

    /// Mode for a channel count.
    pub fn from_channels(channels: usize) -> Result<Self> {
        match channels {
            1 => Ok(Self::L),
            3 => Ok(Self::Rgb),
            4 => Ok(Self::Rgba),
            n => Err(Error::ShapeMismatch(format!(
                "packed images hold 1, 3 or 4 channels, got {n}"
            ))),
        }
    }
}

impl fmt::Display for PixelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::L => "L",
            Self::Rgb => "RGB",
            Self::Rgba => "RGBA",
        };
        f.write_str(name)
    }
}

/// Interleaved 8-bit image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedImage {
    width: usize,
    height: usize,
    mode: PixelMode,
    data: Vec<u8>,
}

impl PackedImage {
    /// Creates an image from interleaved bytes.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for a zero dimension,
    /// [`Error::ShapeMismatch`] if `data` has the wrong length.
    pub fn new(width: usize, height: usize, mode: PixelMode, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidArgument(format!(
                "packed image must be at least 1x1, got {width}x{height}"
            )));
        }
        let expected = width * height * mode.channels();
        if data.len() != expected {
            return Err(Error::ShapeMismatch(format!(
                "expected {expected} bytes for {width}x{height} {mode}, got {}",
                data.len()
            )));
        }
        Ok(Self { width, height, mode, data })
    }

    /// Image filled with one value per channel.
    pub fn filled(width: usize, height: usize, mode: PixelMode, value: &[u8]) -> Result<Self> {
        if value.len() != mode.channels() {
            return Err(Error::ShapeMismatch(format!(
                "{mode} needs {} values, got {}",
                mode.channels(),
                value.len()
            )));
        }
        let data = value.iter().copied().cycle().take(width * height * mode.channels()).collect();
        Self::new(width, height, mode, data)
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Channel layout.
    #[inline]
    pub fn mode(&self) -> PixelMode {
        self.mode
    }

    /// Number of channels.
    #[inline]
    pub fn channels(&self) -> usize {
        self.mode.channels()
    }

    /// Interleaved bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the image, returning its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Samples of pixel `(x, y)`.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let c = self.channels();
        let start = (y * self.width + x) * c;
        &self.data[start..start + c]
    }

    /// Planar `u8` grid with shape `(C, H, W)`.
    pub fn to_grid(&self) -> Grid {
        let c = self.channels();
        let plane = self.width * self.height;
        let mut planar = vec![0u8; self.data.len()];
        for (i, px) in self.data.chunks_exact(c).enumerate() {
            for (ch, &v) in px.iter().enumerate() {
                planar[ch * plane + i] = v;
            }
        }
        Grid::from_parts(Shape::image(c, self.height, self.width), GridData::U8(planar))
    }

    /// Packs an unbatched `u8` grid with 1, 3 or 4 channels.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] for a non-`u8` grid, [`Error::ShapeMismatch`]
    /// for batched grids or unsupported channel counts.
    pub fn from_grid(grid: &Grid) -> Result<Self> {
        if grid.is_batched() {
            return Err(Error::ShapeMismatch("cannot pack a batched grid".into()));
        }
        let Some(planar) = grid.as_slice::<u8>() else {
            return Err(Error::TypeMismatch(format!(
                "packed images store {}, got {}",
                DType::U8,
                grid.dtype()
            )));
        };
        let mode = PixelMode::from_channels(grid.channels())?;
        let c = mode.channels();
        let plane = grid.height() * grid.width();
        let mut data = vec![0u8; planar.len()];
        for ch in 0..c {
            for i in 0..plane {
                data[i * c + ch] = planar[ch * plane + i];
            }
        }
        Self::new(grid.width(), grid.height(), mode, data)
    }
}
