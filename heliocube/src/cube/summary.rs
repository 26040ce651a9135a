use std::fmt;

use crate::config::DisplayConfig;
use crate::cube::FrameCollection;
use crate::frame::{Frame, Scale, Shape};
use crate::meta::Quantity;

/// Human-readable description of a cube, see [`FrameCollection::summary`].
#[derive(Debug, Clone, PartialEq)]
pub struct CubeSummary {
    pub observatory: String,
    pub instrument: String,
    pub detector: String,
    pub measurement: Quantity,
    pub wavelength: Quantity,
    pub first_observation: Option<String>,
    pub last_observation: Option<String>,
    pub frames: usize,
    pub dimensions: Shape,
    pub scale: Scale,
}

impl fmt::Display for CubeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unknown = "unknown".to_string();
        writeln!(f, "FrameCollection")?;
        writeln!(f, "---------------")?;
        writeln!(f, "Observatory:\t {}", self.observatory)?;
        writeln!(f, "Instrument:\t {}", self.instrument)?;
        writeln!(f, "Detector:\t {}", self.detector)?;
        writeln!(f, "Measurement:\t {}", self.measurement)?;
        writeln!(f, "Wavelength:\t {}", self.wavelength)?;
        writeln!(
            f,
            "Observation Date:\t {} - {}",
            self.first_observation.as_ref().unwrap_or(&unknown),
            self.last_observation.as_ref().unwrap_or(&unknown)
        )?;
        writeln!(f, "Frames:\t\t {}", self.frames)?;
        writeln!(f, "Dimension:\t {}", self.dimensions)?;
        write!(f, "Scale:\t\t {}", self.scale)
    }
}

impl<F: Frame> FrameCollection<F> {
    /// Summary with observation times formatted by `display`.
    pub fn summary(&self, display: &DisplayConfig) -> CubeSummary {
        let timestamps = self.timestamps();
        let format = |index: usize| timestamps[index].as_ref().map(|t| display.format_time(t));

        CubeSummary {
            observatory: self.observatory(),
            instrument: self.instrument(),
            detector: self.detector(),
            measurement: self.measurement(),
            wavelength: self.wavelength(),
            first_observation: format(0),
            last_observation: format(self.len() - 1),
            frames: self.len(),
            dimensions: self.dimensions(),
            scale: self.scale(),
        }
    }
}
