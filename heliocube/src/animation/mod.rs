//! Pull-based animation of a [`FrameCollection`].
//!
//! The animator prepares one [`RenderedFrame`] per call and hands it to an
//! external [`RenderBackend`]; it never draws anything itself. Overlay
//! artifacts produced for frame `i` stay alive until frame `i + 1` (or any
//! other frame) is rendered, then they are removed.

use std::fmt;
use std::time::Duration;

use common::Buffer2;
use serde::{Deserialize, Serialize};

use crate::config::DisplayConfig;
use crate::cube::FrameCollection;
use crate::error::{Error, Result};
use crate::frame::{Frame, ResampleMethod, Shape};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimatorConfig {
    /// Fraction of the frame dimensions `[x, y]` to resample to before playback.
    pub resample: Option<[f64; 2]>,
    /// Add a title and axis labels to rendered frames.
    pub annotate: bool,
    pub interval_ms: u64,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            resample: None,
            annotate: true,
            interval_ms: 200,
        }
    }
}

impl AnimatorConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(fraction) = self.resample {
            if !fraction.iter().all(|f| f.is_finite() && *f > 0.0) {
                return Err(Error::Config(format!(
                    "animation.resample must be two positive fractions, got {fraction:?}"
                )));
            }
        }
        Ok(())
    }
}

/// Something drawn on top of a frame that can be taken off again.
pub trait OverlayArtifact {
    fn remove(&mut self);
}

/// Produces overlay artifacts for a frame and its index.
pub type Overlay<'a, F> = Box<dyn FnMut(&F, usize) -> Vec<Box<dyn OverlayArtifact>> + 'a>;

/// The drawing side of an animation, e.g. a plotting window or an encoder.
pub trait RenderBackend {
    type Drawable;

    fn draw(&mut self, frame: &RenderedFrame) -> Self::Drawable;
}

/// Everything a backend needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFrame {
    pub index: usize,
    pub image: Buffer2<f64>,
    /// Empty when annotation is off.
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub color_map: String,
    /// Finite min/max of `image`, `None` if it holds no finite values.
    pub norm_range: Option<(f64, f64)>,
}

pub struct CubeAnimator<'a, F: Frame> {
    cube: FrameCollection<F>,
    config: AnimatorConfig,
    display: DisplayConfig,
    overlay: Option<Overlay<'a, F>>,
    artifacts: Vec<Box<dyn OverlayArtifact>>,
}

impl<'a, F: Frame> CubeAnimator<'a, F> {
    /// Prepares `cube` for playback, resampling every frame up front when configured.
    pub fn new(
        cube: &FrameCollection<F>,
        config: AnimatorConfig,
        display: DisplayConfig,
    ) -> Result<Self> {
        let cube = match config.resample {
            None => cube.clone(),
            Some(fraction) => {
                cube.ensure_same_shape()?;
                let target = scaled_shape(cube.dimensions(), fraction)?;
                tracing::debug!(from = %cube.dimensions(), to = %target, "Resampling cube for animation");
                cube.resample(target, ResampleMethod::Linear)?
            }
        };

        Ok(Self {
            cube,
            config,
            display,
            overlay: None,
            artifacts: Vec::new(),
        })
    }

    pub fn with_overlay(
        mut self,
        overlay: impl FnMut(&F, usize) -> Vec<Box<dyn OverlayArtifact>> + 'a,
    ) -> Self {
        self.overlay = Some(Box::new(overlay));
        self
    }

    pub fn frame_count(&self) -> usize {
        self.cube.len()
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.config.interval_ms)
    }

    /// Frames being animated, after any resampling.
    pub fn cube(&self) -> &FrameCollection<F> {
        &self.cube
    }

    /// Builds frame `index`, replacing the previous frame's overlays.
    pub fn render(&mut self, index: usize) -> Result<RenderedFrame> {
        let frame = self.cube.frame(index)?;

        remove_all(&mut self.artifacts);

        let image = frame.data().clone();
        let norm_range = image.finite_min_max();
        let (title, x_label, y_label) = if self.config.annotate {
            let (x_label, y_label) = axis_labels(frame);
            (frame_name(frame, &self.display), x_label, y_label)
        } else {
            Default::default()
        };

        let rendered = RenderedFrame {
            index,
            image,
            title,
            x_label,
            y_label,
            color_map: frame.color_map(),
            norm_range,
        };

        if let Some(overlay) = self.overlay.as_mut() {
            self.artifacts = overlay(frame, index);
        }

        Ok(rendered)
    }

    pub fn render_with<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        index: usize,
    ) -> Result<B::Drawable> {
        let rendered = self.render(index)?;
        Ok(backend.draw(&rendered))
    }

    /// Renders every frame in order.
    pub fn play<B: RenderBackend>(&mut self, backend: &mut B) -> Result<Vec<B::Drawable>> {
        (0..self.frame_count())
            .map(|index| self.render_with(backend, index))
            .collect()
    }

    /// Removes every outstanding overlay artifact.
    pub fn clear_overlays(&mut self) {
        remove_all(&mut self.artifacts);
    }
}

impl<F: Frame> Drop for CubeAnimator<'_, F> {
    fn drop(&mut self) {
        self.clear_overlays();
    }
}

impl<F: Frame> fmt::Debug for CubeAnimator<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CubeAnimator")
            .field("cube", &self.cube)
            .field("config", &self.config)
            .field("overlay", &self.overlay.is_some())
            .field("artifacts", &self.artifacts.len())
            .finish()
    }
}

fn remove_all(artifacts: &mut Vec<Box<dyn OverlayArtifact>>) {
    for mut artifact in artifacts.drain(..) {
        artifact.remove();
    }
}

fn scaled_shape(shape: Shape, fraction: [f64; 2]) -> Result<Shape> {
    if !fraction.iter().all(|f| f.is_finite() && *f > 0.0) {
        return Err(Error::invalid_argument(
            "resample",
            format!("{fraction:?}"),
            "fractions must be positive",
        ));
    }
    let scale = |len: usize, f: f64| ((len as f64 * f).round() as usize).max(1);
    Ok(Shape::new(
        scale(shape.width, fraction[0]),
        scale(shape.height, fraction[1]),
    ))
}

/// `"{observatory} {instrument} {measurement} {date}"`
pub fn frame_name<F: Frame>(frame: &F, display: &DisplayConfig) -> String {
    let meta = frame.meta();
    let date = frame
        .date()
        .map(|date| display.format_time(&date))
        .unwrap_or_default();

    [
        meta.observatory(),
        meta.instrument(),
        meta.wavelength().to_string(),
        date,
    ]
    .into_iter()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
}

fn axis_labels<F: Frame>(frame: &F) -> (String, String) {
    let system = frame.coordinate_system();
    let units = frame.units();

    let x = if system.is_heliographic_x() {
        "Longitude"
    } else {
        "X-position"
    };
    let y = if system.is_heliographic_y() {
        "Latitude"
    } else {
        "Y-position"
    };

    (format!("{x} [{}]", units.x), format!("{y} [{}]", units.y))
}

#[cfg(test)]
mod tests;
