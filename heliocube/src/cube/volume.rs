use common::Buffer2;
use rayon::prelude::*;

/// Frames stacked into one 3-D array with axis order (row, column, frame).
///
/// The frame axis is innermost, so the time series of one pixel is a
/// contiguous slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
    frames: usize,
}

impl Volume {
    /// Stacks equally sized planes in order.
    ///
    /// # Panics
    ///
    /// Panics if `planes` is empty or the planes differ in size.
    pub(crate) fn stack(planes: &[&Buffer2<f64>]) -> Self {
        assert!(!planes.is_empty(), "cannot stack zero planes");
        let (cols, rows) = planes[0].dimensions();
        let frames = planes.len();

        let mut data = vec![0.0; rows * cols * frames];
        for (frame, plane) in planes.iter().enumerate() {
            assert_eq!(plane.dimensions(), (cols, rows), "plane size mismatch");
            for (pixel, &value) in plane.iter().enumerate() {
                data[pixel * frames + frame] = value;
            }
        }

        Self {
            data,
            rows,
            cols,
            frames,
        }
    }

    /// `(rows, cols, frames)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.rows, self.cols, self.frames)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize, frame: usize) -> f64 {
        debug_assert!(row < self.rows && col < self.cols && frame < self.frames);
        self.data[(row * self.cols + col) * self.frames + frame]
    }

    /// Values of one pixel across all frames.
    #[inline]
    pub fn pixel_series(&self, row: usize, col: usize) -> &[f64] {
        let start = (row * self.cols + col) * self.frames;
        &self.data[start..start + self.frames]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Copies one frame back out as a 2-D plane.
    pub fn plane(&self, frame: usize) -> Buffer2<f64> {
        assert!(frame < self.frames, "frame {frame} out of range");
        Buffer2::from_fn(self.cols, self.rows, |x, y| self.get(y, x, frame))
    }

    /// Collapses the frame axis with `f`, one call per pixel, in parallel.
    pub fn reduce_frames<F>(&self, f: F) -> Buffer2<f64>
    where
        F: Fn(&[f64]) -> f64 + Sync + Send,
    {
        let pixels: Vec<f64> = self.data.par_chunks_exact(self.frames).map(f).collect();
        Buffer2::new(self.cols, self.rows, pixels)
    }

    pub fn mean(&self) -> Buffer2<f64> {
        self.reduce_frames(mean)
    }

    /// Population standard deviation along the frame axis.
    pub fn std(&self) -> Buffer2<f64> {
        self.reduce_frames(|series| {
            let m = mean(series);
            let variance =
                series.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / series.len() as f64;
            variance.sqrt()
        })
    }

    pub fn min(&self) -> Buffer2<f64> {
        self.reduce_frames(|series| series.iter().copied().fold(f64::INFINITY, f64::min))
    }

    pub fn max(&self) -> Buffer2<f64> {
        self.reduce_frames(|series| series.iter().copied().fold(f64::NEG_INFINITY, f64::max))
    }

    /// Sum of every element.
    pub fn sum(&self) -> f64 {
        self.data.par_iter().sum()
    }
}

#[inline]
fn mean(series: &[f64]) -> f64 {
    series.iter().sum::<f64>() / series.len() as f64
}
