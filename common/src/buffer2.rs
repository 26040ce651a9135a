use std::ops::{Deref, Index, IndexMut, Range};
use std::slice;

/// Row-major 2-D buffer. `x` indexes columns, `y` indexes rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Buffer2<T> {
    pixels: Vec<T>,
    width: usize,
    height: usize,
}

impl<T> Buffer2<T> {
    pub fn new(width: usize, height: usize, pixels: Vec<T>) -> Self {
        assert_eq!(
            pixels.len(),
            width * height,
            "pixels length must equal width * height"
        );
        Self {
            pixels,
            width,
            height,
        }
    }

    /// Builds a buffer by evaluating `f(x, y)` for every pixel in row-major order.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            pixels,
            width,
            height,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> &T {
        debug_assert!(x < self.width && y < self.height);
        &self.pixels[y * self.width + x]
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        debug_assert!(x < self.width && y < self.height);
        &mut self.pixels[y * self.width + x]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn pixels(&self) -> &[T] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [T] {
        &mut self.pixels
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        debug_assert!(y < self.height);
        &self.pixels[y * self.width..(y + 1) * self.width]
    }

    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.pixels
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.pixels.iter()
    }

    /// Applies `f` to every pixel, keeping the geometry.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Buffer2<U> {
        Buffer2 {
            pixels: self.pixels.iter().map(f).collect(),
            width: self.width,
            height: self.height,
        }
    }

    /// Combines two equally sized buffers pixel by pixel.
    ///
    /// # Panics
    ///
    /// Panics if the buffers differ in width or height.
    pub fn zip_map<U, V>(&self, other: &Buffer2<U>, mut f: impl FnMut(&T, &U) -> V) -> Buffer2<V> {
        assert_eq!(self.width, other.width, "width mismatch");
        assert_eq!(self.height, other.height, "height mismatch");
        Buffer2 {
            pixels: self
                .pixels
                .iter()
                .zip(other.pixels.iter())
                .map(|(a, b)| f(a, b))
                .collect(),
            width: self.width,
            height: self.height,
        }
    }
}

impl<T: Clone> Buffer2<T> {
    pub fn new_filled(width: usize, height: usize, value: T) -> Self {
        Self {
            pixels: vec![value; width * height],
            width,
            height,
        }
    }

    /// Copies the rectangle `xs` x `ys` into a new buffer.
    ///
    /// # Panics
    ///
    /// Panics if either range is empty or reaches past the buffer edge.
    pub fn crop(&self, xs: Range<usize>, ys: Range<usize>) -> Self {
        assert!(
            xs.start < xs.end && xs.end <= self.width,
            "crop columns {:?} outside 0..{}",
            xs,
            self.width
        );
        assert!(
            ys.start < ys.end && ys.end <= self.height,
            "crop rows {:?} outside 0..{}",
            ys,
            self.height
        );

        let width = xs.len();
        let height = ys.len();
        let mut pixels = Vec::with_capacity(width * height);
        for y in ys {
            pixels.extend_from_slice(&self.row(y)[xs.clone()]);
        }
        Self {
            pixels,
            width,
            height,
        }
    }
}

impl Buffer2<f64> {
    /// Minimum and maximum over finite values, `None` if there are none.
    pub fn finite_min_max(&self) -> Option<(f64, f64)> {
        self.pixels
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

impl<T> Index<(usize, usize)> for Buffer2<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        &self.pixels[y * self.width + x]
    }
}

impl<T> IndexMut<(usize, usize)> for Buffer2<T> {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut Self::Output {
        &mut self.pixels[y * self.width + x]
    }
}

impl<T> Deref for Buffer2<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.pixels
    }
}

impl<'a, T> IntoIterator for &'a Buffer2<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.pixels.iter()
    }
}

impl<T> From<Buffer2<T>> for Vec<T> {
    #[inline]
    fn from(buffer: Buffer2<T>) -> Self {
        buffer.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stores_dimensions() {
        let buf = Buffer2::new(3, 2, vec![10, 20, 30, 40, 50, 60]);
        assert_eq!(buf.dimensions(), (3, 2));
        assert_eq!(buf.len(), 6);
        assert!(!buf.is_empty());
    }

    #[test]
    #[should_panic(expected = "pixels length must equal width * height")]
    fn test_new_panics_on_size_mismatch() {
        Buffer2::new(3, 2, vec![1, 2, 3]);
    }

    #[test]
    fn test_from_fn_is_row_major() {
        let buf = Buffer2::from_fn(3, 2, |x, y| x + 10 * y);
        assert_eq!(buf.pixels(), &[0, 1, 2, 10, 11, 12]);
        assert_eq!(buf[(2, 1)], 12);
        assert_eq!(*buf.get(1, 0), 1);
    }

    #[test]
    fn test_row() {
        let buf = Buffer2::from_fn(4, 3, |x, y| x + 4 * y);
        assert_eq!(buf.row(1), &[4, 5, 6, 7]);
    }

    #[test]
    fn test_crop_copies_rectangle() {
        // 4x3:
        //  0  1  2  3
        //  4  5  6  7
        //  8  9 10 11
        let buf = Buffer2::from_fn(4, 3, |x, y| x + 4 * y);
        let cropped = buf.crop(1..3, 1..3);
        assert_eq!(cropped.dimensions(), (2, 2));
        assert_eq!(cropped.pixels(), &[5, 6, 9, 10]);
    }

    #[test]
    #[should_panic(expected = "crop columns")]
    fn test_crop_panics_past_edge() {
        let buf = Buffer2::new_filled(2, 2, 0u8);
        buf.crop(1..3, 0..1);
    }

    #[test]
    fn test_map_and_zip_map() {
        let a = Buffer2::new(2, 2, vec![1.0, 2.0, 3.0, 4.0]);
        let b = a.map(|v| v * 10.0);
        let diff = b.zip_map(&a, |x, y| x - y);
        assert_eq!(diff.pixels(), &[9.0, 18.0, 27.0, 36.0]);
    }

    #[test]
    #[should_panic(expected = "height mismatch")]
    fn test_zip_map_panics_on_geometry_mismatch() {
        let a = Buffer2::new_filled(2, 2, 0.0);
        let b = Buffer2::new_filled(2, 3, 0.0);
        a.zip_map(&b, |x, y| x + y);
    }

    #[test]
    fn test_finite_min_max_skips_nan_and_inf() {
        let buf = Buffer2::new(2, 2, vec![f64::NAN, -2.0, f64::INFINITY, 5.0]);
        assert_eq!(buf.finite_min_max(), Some((-2.0, 5.0)));

        let empty = Buffer2::new(1, 1, vec![f64::NAN]);
        assert_eq!(empty.finite_min_max(), None);
    }

    #[test]
    fn test_index_mut_tuple() {
        let mut buf = Buffer2::new(2, 2, vec![1, 2, 3, 4]);
        buf[(1, 1)] = 77;
        *buf.get_mut(0, 1) = 55;
        assert_eq!(buf.into_vec(), vec![1, 2, 55, 77]);
    }
}
