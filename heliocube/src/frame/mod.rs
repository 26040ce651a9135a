//! The single-frame interface consumed by [`FrameCollection`](crate::FrameCollection).
//!
//! Any image type can join a cube by implementing [`Frame`]: pixel access,
//! header access, and a factory for building a new frame from parts. The
//! geometric transforms (submap, superpixel, resample) have default
//! implementations on top of those three methods.

mod image_frame;
pub(crate) mod transform;

use std::fmt;
use std::ops::Range;

use chrono::{DateTime, Utc};
use common::Buffer2;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::Result;
use crate::meta::{Meta, KEY_COLOR_MAP};

pub use image_frame::ImageFrame;

/// Pixel dimensions of a frame, x (columns) first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Shape {
    pub width: usize,
    pub height: usize,
}

impl Shape {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Coordinate increment per pixel along x and y (`cdelt1`, `cdelt2`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub x: f64,
    pub y: f64,
}

impl Scale {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Missing keys default to one unit per pixel.
    pub fn from_meta(meta: &Meta) -> Self {
        Self {
            x: meta.get_f64("cdelt1").unwrap_or(1.0),
            y: meta.get_f64("cdelt2").unwrap_or(1.0),
        }
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

/// Coordinate units along x and y (`cunit1`, `cunit2`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Units {
    pub x: String,
    pub y: String,
}

impl Units {
    pub fn from_meta(meta: &Meta) -> Self {
        Self {
            x: meta.get_str("cunit1").unwrap_or("arcsec").to_string(),
            y: meta.get_str("cunit2").unwrap_or("arcsec").to_string(),
        }
    }
}

/// Axis types (`ctype1`, `ctype2`), e.g. `HPLN-TAN` / `HPLT-TAN`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateSystem {
    pub x: String,
    pub y: String,
}

impl CoordinateSystem {
    pub fn from_meta(meta: &Meta) -> Self {
        Self {
            x: meta.get_str("ctype1").unwrap_or("HPLN-TAN").to_string(),
            y: meta.get_str("ctype2").unwrap_or("HPLT-TAN").to_string(),
        }
    }

    pub fn is_heliographic_x(&self) -> bool {
        self.x.starts_with("HG")
    }

    pub fn is_heliographic_y(&self) -> bool {
        self.y.starts_with("HG")
    }
}

/// How pixels inside a superpixel block are combined.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SuperpixelMethod {
    #[default]
    Sum,
    Average,
}

/// Interpolation used when resampling to new dimensions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResampleMethod {
    Nearest,
    #[default]
    Linear,
}

/// Capability interface of a 2-D image with a header.
///
/// Transforms never modify `self`; they build a new frame through
/// [`Frame::from_parts`].
pub trait Frame: Sized + Send + Sync {
    fn data(&self) -> &Buffer2<f64>;

    fn meta(&self) -> &Meta;

    /// Factory used for every derived frame.
    fn from_parts(data: Buffer2<f64>, meta: Meta) -> Self;

    fn shape(&self) -> Shape {
        let (width, height) = self.data().dimensions();
        Shape::new(width, height)
    }

    fn scale(&self) -> Scale {
        Scale::from_meta(self.meta())
    }

    fn date(&self) -> Option<DateTime<Utc>> {
        self.meta().date_obs()
    }

    fn units(&self) -> Units {
        Units::from_meta(self.meta())
    }

    fn coordinate_system(&self) -> CoordinateSystem {
        CoordinateSystem::from_meta(self.meta())
    }

    /// Color map name used when rendering, `gray` unless the header names one.
    fn color_map(&self) -> String {
        self.meta().get_str(KEY_COLOR_MAP).unwrap_or("gray").to_string()
    }

    /// Pixel-space cut-out `xs` (columns) by `ys` (rows).
    fn submap(&self, xs: Range<usize>, ys: Range<usize>) -> Result<Self> {
        let (data, meta) = transform::submap(self.data(), self.meta(), xs, ys)?;
        Ok(Self::from_parts(data, meta))
    }

    /// Combines `block`-sized pixel groups into single pixels.
    fn superpixel(&self, block: Shape, method: SuperpixelMethod) -> Result<Self> {
        let (data, meta) = transform::superpixel(self.data(), self.meta(), block, method)?;
        Ok(Self::from_parts(data, meta))
    }

    /// Resamples to `target` dimensions.
    fn resample(&self, target: Shape, method: ResampleMethod) -> Result<Self> {
        let (data, meta) = transform::resample(self.data(), self.meta(), target, method)?;
        Ok(Self::from_parts(data, meta))
    }
}
