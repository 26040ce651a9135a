use common::Buffer2;

use crate::frame::Frame;
use crate::meta::Meta;

/// In-memory frame: a pixel buffer plus its header.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFrame {
    data: Buffer2<f64>,
    meta: Meta,
}

impl ImageFrame {
    pub fn new(data: Buffer2<f64>, meta: Meta) -> Self {
        Self { data, meta }
    }

    /// Frame of `width` x `height` pixels all set to `value`.
    pub fn filled(width: usize, height: usize, value: f64, meta: Meta) -> Self {
        Self::new(Buffer2::new_filled(width, height, value), meta)
    }

    pub fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    pub fn into_parts(self) -> (Buffer2<f64>, Meta) {
        (self.data, self.meta)
    }
}

impl Frame for ImageFrame {
    fn data(&self) -> &Buffer2<f64> {
        &self.data
    }

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn from_parts(data: Buffer2<f64>, meta: Meta) -> Self {
        Self::new(data, meta)
    }
}
