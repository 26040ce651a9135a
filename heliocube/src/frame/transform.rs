//! Pixel-level implementations behind the default [`Frame`](super::Frame) transforms.
//!
//! Each function returns fresh pixel data and an updated copy of the header;
//! the inputs are never touched. Reference pixels (`crpix1/2`) follow the
//! FITS convention of 1-based pixel centres.

use std::ops::Range;

use common::Buffer2;

use crate::error::{Error, Result};
use crate::frame::{ResampleMethod, Shape, SuperpixelMethod};
use crate::meta::Meta;

pub(crate) fn submap(
    data: &Buffer2<f64>,
    meta: &Meta,
    xs: Range<usize>,
    ys: Range<usize>,
) -> Result<(Buffer2<f64>, Meta)> {
    check_range("x_range", &xs, data.width())?;
    check_range("y_range", &ys, data.height())?;

    let cropped = data.crop(xs.clone(), ys.clone());

    let mut meta = meta.clone();
    if let Some(crpix) = meta.get_f64("crpix1") {
        meta.insert("crpix1", crpix - xs.start as f64);
    }
    if let Some(crpix) = meta.get_f64("crpix2") {
        meta.insert("crpix2", crpix - ys.start as f64);
    }
    update_axis_lengths(&mut meta, cropped.width(), cropped.height());

    Ok((cropped, meta))
}

pub(crate) fn superpixel(
    data: &Buffer2<f64>,
    meta: &Meta,
    block: Shape,
    method: SuperpixelMethod,
) -> Result<(Buffer2<f64>, Meta)> {
    if block.width == 0 || block.height == 0 {
        return Err(Error::invalid_argument(
            "dimensions",
            block,
            "superpixel block must be at least 1x1",
        ));
    }
    let (width, height) = data.dimensions();
    if width % block.width != 0 || height % block.height != 0 {
        return Err(Error::invalid_argument(
            "dimensions",
            block,
            format!("superpixel block must evenly divide the {width}x{height} frame"),
        ));
    }

    let divisor = match method {
        SuperpixelMethod::Sum => 1.0,
        SuperpixelMethod::Average => block.pixel_count() as f64,
    };

    let combined = Buffer2::from_fn(width / block.width, height / block.height, |x, y| {
        let columns = x * block.width..(x + 1) * block.width;
        let total: f64 = (y * block.height..(y + 1) * block.height)
            .map(|row| data.row(row)[columns.clone()].iter().sum::<f64>())
            .sum();
        total / divisor
    });

    let mut meta = meta.clone();
    rescale_axis(&mut meta, 1, block.width as f64);
    rescale_axis(&mut meta, 2, block.height as f64);
    update_axis_lengths(&mut meta, combined.width(), combined.height());

    Ok((combined, meta))
}

pub(crate) fn resample(
    data: &Buffer2<f64>,
    meta: &Meta,
    target: Shape,
    method: ResampleMethod,
) -> Result<(Buffer2<f64>, Meta)> {
    if target.width == 0 || target.height == 0 {
        return Err(Error::invalid_argument(
            "dimensions",
            target,
            "resample target must be at least 1x1",
        ));
    }

    let (width, height) = data.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::invalid_argument(
            "dimensions",
            Shape::new(width, height),
            "cannot resample an empty frame",
        ));
    }
    let fx = width as f64 / target.width as f64;
    let fy = height as f64 / target.height as f64;

    let resampled = Buffer2::from_fn(target.width, target.height, |x, y| {
        // Align pixel centres of the output grid with the input grid.
        let sx = (x as f64 + 0.5) * fx - 0.5;
        let sy = (y as f64 + 0.5) * fy - 0.5;
        match method {
            ResampleMethod::Nearest => sample_nearest(data, sx, sy),
            ResampleMethod::Linear => sample_linear(data, sx, sy),
        }
    });

    let mut meta = meta.clone();
    rescale_axis(&mut meta, 1, fx);
    rescale_axis(&mut meta, 2, fy);
    update_axis_lengths(&mut meta, target.width, target.height);

    Ok((resampled, meta))
}

fn check_range(name: &'static str, range: &Range<usize>, len: usize) -> Result<()> {
    if range.start >= range.end || range.end > len {
        return Err(Error::invalid_argument(
            name,
            format!("{range:?}"),
            format!("must be a non-empty range within 0..{len}"),
        ));
    }
    Ok(())
}

/// Multiplies `cdeltN` by `factor` and moves `crpixN` onto the coarser grid.
fn rescale_axis(meta: &mut Meta, axis: u8, factor: f64) {
    let cdelt = format!("cdelt{axis}");
    let crpix = format!("crpix{axis}");

    let scale = meta.get_f64(&cdelt).unwrap_or(1.0);
    meta.insert(&cdelt, scale * factor);
    if let Some(reference) = meta.get_f64(&crpix) {
        meta.insert(&crpix, (reference - 0.5) / factor + 0.5);
    }
}

fn update_axis_lengths(meta: &mut Meta, width: usize, height: usize) {
    if meta.contains_key("naxis1") {
        meta.insert("naxis1", width as i64);
    }
    if meta.contains_key("naxis2") {
        meta.insert("naxis2", height as i64);
    }
}

#[inline]
fn sample_nearest(data: &Buffer2<f64>, sx: f64, sy: f64) -> f64 {
    let x = (sx.round().max(0.0) as usize).min(data.width() - 1);
    let y = (sy.round().max(0.0) as usize).min(data.height() - 1);
    data[(x, y)]
}

/// Bilinear sample with edge clamping.
#[inline]
fn sample_linear(data: &Buffer2<f64>, sx: f64, sy: f64) -> f64 {
    let (width, height) = data.dimensions();
    let sx = sx.clamp(0.0, (width - 1) as f64);
    let sy = sy.clamp(0.0, (height - 1) as f64);

    let x0 = sx.floor() as usize;
    let y0 = sy.floor() as usize;
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);
    let tx = sx - x0 as f64;
    let ty = sy - y0 as f64;

    let top = data[(x0, y0)] * (1.0 - tx) + data[(x1, y0)] * tx;
    let bottom = data[(x0, y1)] * (1.0 - tx) + data[(x1, y1)] * tx;
    top * (1.0 - ty) + bottom * ty
}
