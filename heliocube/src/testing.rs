//! Synthetic frames and cubes for unit tests.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use common::Buffer2;

use crate::cube::FrameCollection;
use crate::frame::{Frame, ImageFrame};
use crate::meta::Meta;

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub(crate) fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2011, 6, 7, 6, 33, 2).unwrap()
}

/// Header of an AIA 171 frame taken `index` cadences (12 s) after [`start_time`].
pub(crate) fn sample_meta(index: usize) -> Meta {
    let date = start_time() + TimeDelta::seconds(12 * index as i64);
    Meta::new()
        .with("date-obs", date.format("%Y-%m-%dT%H:%M:%S%.3f").to_string())
        .with("obsrvtry", "SDO")
        .with("telescop", "SDO/AIA")
        .with("instrume", "AIA_3")
        .with("detector", "AIA")
        .with("wavelnth", 171)
        .with("waveunit", "angstrom")
        .with("exptime", 2.0)
        .with("cdelt1", 0.6)
        .with("cdelt2", 0.6)
        .with("cunit1", "arcsec")
        .with("cunit2", "arcsec")
        .with("crpix1", 512.5)
        .with("crpix2", 512.5)
}

/// Frame `index` of a sample sequence: pixel `(x, y)` holds `x + y * width + 100 * index`.
pub(crate) fn sample_frame(index: usize, width: usize, height: usize) -> ImageFrame {
    let data = Buffer2::from_fn(width, height, |x, y| (x + y * width + 100 * index) as f64);
    ImageFrame::new(data, sample_meta(index))
}

pub(crate) fn sample_frames(count: usize, width: usize, height: usize) -> Vec<ImageFrame> {
    (0..count).map(|i| sample_frame(i, width, height)).collect()
}

pub(crate) fn sample_cube(count: usize, width: usize, height: usize) -> FrameCollection<ImageFrame> {
    FrameCollection::new(sample_frames(count, width, height)).unwrap()
}

/// Frame whose pixels can be swapped for a narrower buffer after it joined a cube.
pub(crate) struct ShiftingFrame {
    data: Buffer2<f64>,
    narrowed: Buffer2<f64>,
    shifted: AtomicBool,
    meta: Meta,
}

impl ShiftingFrame {
    pub(crate) fn shift(&self) {
        self.shifted.store(true, Ordering::Relaxed);
    }
}

impl Frame for ShiftingFrame {
    fn data(&self) -> &Buffer2<f64> {
        if self.shifted.load(Ordering::Relaxed) {
            &self.narrowed
        } else {
            &self.data
        }
    }

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn from_parts(data: Buffer2<f64>, meta: Meta) -> Self {
        let narrowed = Buffer2::new_filled(data.width().saturating_sub(1), data.height(), 0.0);
        Self {
            data,
            narrowed,
            shifted: AtomicBool::new(false),
            meta,
        }
    }
}

pub(crate) fn shifting_cube(count: usize, width: usize, height: usize) -> FrameCollection<ShiftingFrame> {
    let frames = sample_frames(count, width, height)
        .into_iter()
        .map(|frame| ShiftingFrame::from_parts(frame.data().clone(), frame.meta().clone()));
    FrameCollection::new(frames).unwrap()
}
