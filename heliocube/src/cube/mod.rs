//! Time-ordered, shape-homogeneous collections of frames.
//!
//! Frames live in a shared arena (`Arc<[F]>`); a [`FrameCollection`] is an
//! index list into that arena plus index-aligned header snapshots. Slicing a
//! collection reuses the arena, so the slice aliases the parent's frames.
//! Every derivation (differences, reductions, per-frame transforms) builds
//! fresh frames in a new arena.

mod algebra;
mod summary;
mod volume;


use std::fmt;
use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::frame::{Frame, ResampleMethod, Scale, Shape, SuperpixelMethod, Units};
use crate::meta::{Meta, MetaValue, Quantity, KEY_EXPOSURE_TIME};

pub use algebra::{Base, MetaChoice, Reduction, ReductionOutput};
pub use summary::CubeSummary;
pub use volume::Volume;

/// Ordering applied to frames when a collection is built.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SortBy {
    /// Capture time (`date-obs`), oldest first.
    #[default]
    Date,
    /// Keep the caller's order.
    Insertion,
    /// Ascending by a header value, see [`MetaValue::sort_cmp`].
    MetaKey(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CubeOptions {
    pub sort_by: SortBy,
    /// Derotation is not implemented; the flag is accepted and logged only.
    pub derotate: bool,
}

/// Either every frame agreed on a value, or the full per-frame list.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValues<T> {
    Collapsed(T),
    PerFrame(Vec<T>),
}

impl<T: PartialEq> MetaValues<T> {
    /// Collapses `values` when all entries are equal.
    ///
    /// # Panics
    ///
    /// Panics if `values` is empty.
    pub fn from_values(mut values: Vec<T>) -> Self {
        assert!(!values.is_empty(), "no values to collapse");
        if values.iter().all(|v| *v == values[0]) {
            MetaValues::Collapsed(values.swap_remove(0))
        } else {
            MetaValues::PerFrame(values)
        }
    }
}

impl<T> MetaValues<T> {
    pub fn collapsed(&self) -> Option<&T> {
        match self {
            MetaValues::Collapsed(value) => Some(value),
            MetaValues::PerFrame(_) => None,
        }
    }

    pub fn as_slice(&self) -> &[T] {
        match self {
            MetaValues::Collapsed(value) => std::slice::from_ref(value),
            MetaValues::PerFrame(values) => values,
        }
    }

    fn try_map<U>(self, mut f: impl FnMut(usize, T) -> Result<U>) -> Result<MetaValues<U>> {
        Ok(match self {
            MetaValues::Collapsed(value) => MetaValues::Collapsed(f(0, value)?),
            MetaValues::PerFrame(values) => MetaValues::PerFrame(
                values
                    .into_iter()
                    .enumerate()
                    .map(|(index, value)| f(index, value))
                    .collect::<Result<_>>()?,
            ),
        })
    }
}

/// Index accepted by [`FrameCollection::select`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CubeIndex {
    Single(usize),
    Range(Range<usize>),
    Indices(Vec<usize>),
}

impl From<usize> for CubeIndex {
    fn from(index: usize) -> Self {
        CubeIndex::Single(index)
    }
}

impl From<Range<usize>> for CubeIndex {
    fn from(range: Range<usize>) -> Self {
        CubeIndex::Range(range)
    }
}

impl From<Vec<usize>> for CubeIndex {
    fn from(indices: Vec<usize>) -> Self {
        CubeIndex::Indices(indices)
    }
}

impl From<&[usize]> for CubeIndex {
    fn from(indices: &[usize]) -> Self {
        CubeIndex::Indices(indices.to_vec())
    }
}

/// Result of [`FrameCollection::select`]: a scalar index yields a frame,
/// anything else a collection.
pub enum Selection<'a, F> {
    Frame(&'a F),
    Cube(FrameCollection<F>),
}

impl<'a, F> Selection<'a, F> {
    pub fn into_frame(self) -> Option<&'a F> {
        match self {
            Selection::Frame(frame) => Some(frame),
            Selection::Cube(_) => None,
        }
    }

    pub fn into_cube(self) -> Option<FrameCollection<F>> {
        match self {
            Selection::Frame(_) => None,
            Selection::Cube(cube) => Some(cube),
        }
    }
}

/// A series of spatially aligned frames of identical shape and scale.
pub struct FrameCollection<F> {
    arena: Arc<[F]>,
    indices: Vec<usize>,
    meta: Vec<Meta>,
}

impl<F> Clone for FrameCollection<F> {
    fn clone(&self) -> Self {
        Self {
            arena: Arc::clone(&self.arena),
            indices: self.indices.clone(),
            meta: self.meta.clone(),
        }
    }
}

impl<F: Frame> fmt::Debug for FrameCollection<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameCollection")
            .field("frames", &self.len())
            .field("dimensions", &self.dimensions())
            .field("scale", &self.scale())
            .finish()
    }
}

impl<F: Frame> FrameCollection<F> {
    /// Builds a collection sorted by capture time.
    pub fn new(frames: impl IntoIterator<Item = F>) -> Result<Self> {
        Self::with_options(frames, CubeOptions::default())
    }

    pub fn with_options(frames: impl IntoIterator<Item = F>, options: CubeOptions) -> Result<Self> {
        let frames: Vec<F> = frames.into_iter().collect();
        if frames.is_empty() {
            return Err(Error::Construction("no frames supplied".to_string()));
        }

        let frames = sort_frames(frames, &options.sort_by)?;
        validate_homogeneous(&frames)?;

        if options.derotate {
            tracing::warn!("Derotation requested but not implemented; frames are left unchanged");
        }

        tracing::debug!(
            frames = frames.len(),
            sort_by = ?options.sort_by,
            "Constructed frame collection"
        );

        Ok(Self::from_arena(Arc::from(frames), None))
    }

    /// Rebuilds from frames that are already in order, re-validating homogeneity.
    pub(crate) fn from_ordered(frames: Vec<F>) -> Result<Self> {
        Self::with_options(
            frames,
            CubeOptions {
                sort_by: SortBy::Insertion,
                derotate: false,
            },
        )
    }

    fn from_arena(arena: Arc<[F]>, indices: Option<Vec<usize>>) -> Self {
        let indices = indices.unwrap_or_else(|| (0..arena.len()).collect());
        let meta = indices.iter().map(|&i| arena[i].meta().clone()).collect();
        Self {
            arena,
            indices,
            meta,
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&F> {
        self.indices.get(index).map(|&slot| &self.arena[slot])
    }

    pub fn frame(&self, index: usize) -> Result<&F> {
        self.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.len(),
        })
    }

    pub fn first(&self) -> &F {
        &self.arena[self.indices[0]]
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &F> + '_ {
        self.indices.iter().map(|&slot| &self.arena[slot])
    }

    pub fn select(&self, index: impl Into<CubeIndex>) -> Result<Selection<'_, F>> {
        match index.into() {
            CubeIndex::Single(index) => self.frame(index).map(Selection::Frame),
            CubeIndex::Range(range) => self.slice(range).map(Selection::Cube),
            CubeIndex::Indices(indices) => self.pick(&indices).map(Selection::Cube),
        }
    }

    /// Sub-collection sharing this collection's frames.
    pub fn slice(&self, range: Range<usize>) -> Result<Self> {
        if range.end > self.len() {
            return Err(Error::IndexOutOfRange {
                index: range.end,
                len: self.len(),
            });
        }
        if range.start >= range.end {
            return Err(Error::Construction(format!(
                "slice {range:?} selects no frames"
            )));
        }

        Ok(Self {
            arena: Arc::clone(&self.arena),
            indices: self.indices[range.clone()].to_vec(),
            meta: self.meta[range].to_vec(),
        })
    }

    /// Sub-collection of the given positions, in the given order.
    pub fn pick(&self, positions: &[usize]) -> Result<Self> {
        if positions.is_empty() {
            return Err(Error::Construction("index list selects no frames".to_string()));
        }
        let mut indices = Vec::with_capacity(positions.len());
        let mut meta = Vec::with_capacity(positions.len());
        for &position in positions {
            let slot = *self.indices.get(position).ok_or(Error::IndexOutOfRange {
                index: position,
                len: self.len(),
            })?;
            indices.push(slot);
            meta.push(self.meta[position].clone());
        }

        Ok(Self {
            arena: Arc::clone(&self.arena),
            indices,
            meta,
        })
    }

    /// True when both collections view the same frame arena.
    pub fn shares_frames_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.arena, &other.arena)
    }

    /// Copies the viewed frames into an arena owned by the result alone.
    pub fn detach(&self) -> Self
    where
        F: Clone,
    {
        let frames: Vec<F> = self.iter().cloned().collect();
        Self::from_arena(Arc::from(frames), None)
    }

    pub fn instrument(&self) -> String {
        self.meta[0].instrument()
    }

    pub fn observatory(&self) -> String {
        self.meta[0].observatory()
    }

    pub fn detector(&self) -> String {
        self.meta[0].detector()
    }

    pub fn wavelength(&self) -> Quantity {
        self.meta[0].wavelength()
    }

    /// Measured quantity, which for imaging instruments is the wavelength.
    pub fn measurement(&self) -> Quantity {
        self.wavelength()
    }

    pub fn dimensions(&self) -> Shape {
        self.first().shape()
    }

    pub fn scale(&self) -> Scale {
        self.first().scale()
    }

    pub fn units(&self) -> Units {
        self.first().units()
    }

    /// Capture time of every frame in collection order.
    pub fn timestamps(&self) -> Vec<Option<DateTime<Utc>>> {
        self.iter().map(Frame::date).collect()
    }

    /// Header snapshots, index-aligned with the frames.
    pub fn all_meta(&self) -> &[Meta] {
        &self.meta
    }

    /// Values of `key` across frames, collapsed when identical.
    pub fn metadata_values(&self, key: &str) -> Result<MetaValues<MetaValue>> {
        let values = self
            .meta
            .iter()
            .enumerate()
            .map(|(index, meta)| {
                meta.get(key).cloned().ok_or_else(|| Error::MissingMetadata {
                    key: key.to_string(),
                    index,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(MetaValues::from_values(values))
    }

    /// Exposure time (`exptime`, seconds) per frame, collapsed when identical.
    pub fn exposure_time(&self) -> Result<MetaValues<Duration>> {
        self.metadata_values(KEY_EXPOSURE_TIME)?
            .try_map(|index, value| {
                value
                    .as_f64()
                    .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
                    .ok_or_else(|| {
                        Error::invalid_argument(
                            KEY_EXPOSURE_TIME,
                            &value,
                            format!("frame {index} does not hold a non-negative number of seconds"),
                        )
                    })
            })
    }

    pub fn all_same_shape(&self) -> bool {
        let expected = self.dimensions();
        self.iter().all(|frame| frame.shape() == expected)
    }

    /// Call-time shape check; frames may hold interior state that changed since construction.
    pub(crate) fn ensure_same_shape(&self) -> Result<()> {
        let expected = self.dimensions();
        match self.iter().position(|frame| frame.shape() != expected) {
            None => Ok(()),
            Some(index) => Err(Error::ShapeMismatch {
                index: Some(index),
                expected,
                actual: self.iter().nth(index).map(Frame::shape).unwrap_or_default(),
            }),
        }
    }

    /// Stacks every frame into a (row, column, frame) volume.
    pub fn materialize_as_volume(&self) -> Result<Volume> {
        self.ensure_same_shape()?;
        let planes: Vec<_> = self.iter().map(Frame::data).collect();
        Ok(Volume::stack(&planes))
    }

    pub fn submap(&self, xs: Range<usize>, ys: Range<usize>) -> Result<Self> {
        self.map_frames(|frame| frame.submap(xs.clone(), ys.clone()))
    }

    /// Submap of the frames in `frames`.
    pub fn subcube(
        &self,
        xs: Range<usize>,
        ys: Range<usize>,
        frames: Range<usize>,
    ) -> Result<Self> {
        self.slice(frames)?.submap(xs, ys)
    }

    pub fn superpixel(&self, block: Shape, method: SuperpixelMethod) -> Result<Self> {
        self.map_frames(|frame| frame.superpixel(block, method))
    }

    pub fn resample(&self, target: Shape, method: ResampleMethod) -> Result<Self> {
        self.map_frames(|frame| frame.resample(target, method))
    }

    fn map_frames(&self, f: impl Fn(&F) -> Result<F>) -> Result<Self> {
        let frames = self.iter().map(f).collect::<Result<Vec<_>>>()?;
        Self::from_ordered(frames)
    }
}

fn sort_frames<F: Frame>(frames: Vec<F>, sort_by: &SortBy) -> Result<Vec<F>> {
    match sort_by {
        SortBy::Insertion => Ok(frames),
        SortBy::Date => {
            let mut keyed = frames
                .into_iter()
                .enumerate()
                .map(|(index, frame)| match frame.date() {
                    Some(date) => Ok((date, frame)),
                    None => Err(Error::Construction(format!(
                        "frame {index} has no parseable 'date-obs' to sort by"
                    ))),
                })
                .collect::<Result<Vec<_>>>()?;
            keyed.sort_by_key(|(date, _)| *date);
            Ok(keyed.into_iter().map(|(_, frame)| frame).collect())
        }
        SortBy::MetaKey(key) => {
            let mut keyed = frames
                .into_iter()
                .enumerate()
                .map(|(index, frame)| match frame.meta().get(key) {
                    Some(value) => Ok((value.clone(), frame)),
                    None => Err(Error::Construction(format!(
                        "frame {index} has no '{key}' to sort by"
                    ))),
                })
                .collect::<Result<Vec<_>>>()?;
            keyed.sort_by(|(a, _), (b, _)| a.sort_cmp(b));
            Ok(keyed.into_iter().map(|(_, frame)| frame).collect())
        }
    }
}

fn validate_homogeneous<F: Frame>(frames: &[F]) -> Result<()> {
    let expected_shape = frames[0].shape();
    let expected_scale = frames[0].scale();

    for (index, frame) in frames.iter().enumerate().skip(1) {
        let shape = frame.shape();
        if shape != expected_shape {
            return Err(Error::ShapeMismatch {
                index: Some(index),
                expected: expected_shape,
                actual: shape,
            });
        }
        let scale = frame.scale();
        if scale != expected_scale {
            return Err(Error::ScaleMismatch {
                index,
                expected: expected_scale,
                actual: scale,
            });
        }
    }
    Ok(())
}
