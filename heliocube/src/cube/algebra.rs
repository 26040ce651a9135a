//! Derived-cube algebra: running and base differences, frame-axis reductions.

use std::str::FromStr;

use common::Buffer2;
use strum_macros::{Display, EnumString};

use crate::cube::{FrameCollection, Volume};
use crate::error::{Error, Result};
use crate::frame::{Frame, Shape};

/// Value produced by a reduction callback.
#[derive(Debug, Clone, PartialEq)]
pub enum ReductionOutput {
    Scalar(f64),
    Image(Buffer2<f64>),
}

impl From<f64> for ReductionOutput {
    fn from(value: f64) -> Self {
        ReductionOutput::Scalar(value)
    }
}

impl From<Buffer2<f64>> for ReductionOutput {
    fn from(image: Buffer2<f64>) -> Self {
        ReductionOutput::Image(image)
    }
}

impl ReductionOutput {
    /// A scalar becomes a 1x1 image.
    pub fn into_image(self) -> Buffer2<f64> {
        match self {
            ReductionOutput::Scalar(value) => Buffer2::new(1, 1, vec![value]),
            ReductionOutput::Image(image) => image,
        }
    }
}

/// Per-pixel reductions along the frame axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Reduction {
    Mean,
    Std,
    Min,
    Max,
}

impl Reduction {
    pub fn apply(self, volume: &Volume) -> Buffer2<f64> {
        match self {
            Reduction::Mean => volume.mean(),
            Reduction::Std => volume.std(),
            Reduction::Min => volume.min(),
            Reduction::Max => volume.max(),
        }
    }
}

/// Which frame of a difference pair donates its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "lowercase")]
pub enum MetaChoice {
    /// The later frame, `i + offset`.
    #[default]
    Ahead,
    /// The earlier frame, `i`.
    Behind,
}

impl FromStr for MetaChoice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ahead" => Ok(MetaChoice::Ahead),
            "behind" => Ok(MetaChoice::Behind),
            other => Err(Error::invalid_argument(
                "metadata_choice",
                other,
                "expected 'ahead' or 'behind'",
            )),
        }
    }
}

/// Reference subtracted by [`FrameCollection::base_difference`].
pub enum Base<'a, F> {
    /// A frame of the cube itself.
    Index(usize),
    /// Any frame, which must match the cube's shape.
    Frame(&'a F),
}

impl<F: Frame> FrameCollection<F> {
    /// Runs `reduction` over the stacked volume and wraps its result in a
    /// single frame carrying the header of `frame_for_metadata`.
    pub fn apply_reduction<R>(
        &self,
        reduction: impl FnOnce(&Volume) -> R,
        frame_for_metadata: usize,
    ) -> Result<F>
    where
        R: Into<ReductionOutput>,
    {
        let meta = self
            .meta
            .get(frame_for_metadata)
            .ok_or(Error::IndexOutOfRange {
                index: frame_for_metadata,
                len: self.len(),
            })?
            .clone();

        let volume = self.materialize_as_volume()?;
        let image = reduction(&volume).into().into_image();

        tracing::debug!(
            frames = self.len(),
            output = %Shape::new(image.width(), image.height()),
            frame_for_metadata,
            "Applied reduction"
        );

        Ok(F::from_parts(image, meta))
    }

    /// Frame-axis reduction keeping the header of frame 0.
    pub fn reduce(&self, reduction: Reduction) -> Result<F> {
        self.apply_reduction(|volume| reduction.apply(volume), 0)
    }

    pub fn mean(&self) -> Result<F> {
        self.reduce(Reduction::Mean)
    }

    /// Population standard deviation per pixel.
    pub fn std(&self) -> Result<F> {
        self.reduce(Reduction::Std)
    }

    pub fn min(&self) -> Result<F> {
        self.reduce(Reduction::Min)
    }

    pub fn max(&self) -> Result<F> {
        self.reduce(Reduction::Max)
    }

    /// Differences `frame[i + offset] - frame[i]`, one per valid `i`.
    pub fn running_difference(&self, offset: usize, choice: MetaChoice) -> Result<Self> {
        if offset == 0 || offset >= self.len() {
            return Err(Error::invalid_argument(
                "offset",
                offset,
                format!("must be in 1..{} for a cube of {} frames", self.len(), self.len()),
            ));
        }
        self.ensure_same_shape()?;

        let frames = (0..self.len() - offset)
            .map(|i| {
                let behind = self.at(i);
                let ahead = self.at(i + offset);
                let data = ahead.data().zip_map(behind.data(), |a, b| a - b);
                let meta = match choice {
                    MetaChoice::Ahead => &self.meta[i + offset],
                    MetaChoice::Behind => &self.meta[i],
                };
                F::from_parts(data, meta.clone())
            })
            .collect::<Vec<_>>();

        tracing::debug!(offset, %choice, frames = frames.len(), "Computed running difference");

        Self::from_ordered(frames)
    }

    /// Subtracts `base` from every frame, dividing by it when `fractional`.
    ///
    /// Division follows IEEE semantics, so zero base pixels produce
    /// infinities or NaN.
    pub fn base_difference(&self, base: Base<'_, F>, fractional: bool) -> Result<Self> {
        self.ensure_same_shape()?;

        let base = match base {
            Base::Index(index) => self.frame(index)?,
            Base::Frame(frame) => {
                let expected = self.dimensions();
                if frame.shape() != expected {
                    return Err(Error::ShapeMismatch {
                        index: None,
                        expected,
                        actual: frame.shape(),
                    });
                }
                frame
            }
        };
        let base_data = base.data();

        let frames = self
            .iter()
            .zip(&self.meta)
            .map(|(frame, meta)| {
                let data = if fractional {
                    frame.data().zip_map(base_data, |v, b| (v - b) / b)
                } else {
                    frame.data().zip_map(base_data, |v, b| v - b)
                };
                F::from_parts(data, meta.clone())
            })
            .collect::<Vec<_>>();

        tracing::debug!(frames = frames.len(), fractional, "Computed base difference");

        Self::from_ordered(frames)
    }

    fn at(&self, index: usize) -> &F {
        &self.arena[self.indices[index]]
    }
}
