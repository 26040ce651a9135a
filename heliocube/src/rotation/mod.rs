//! Solar differential rotation.
//!
//! Angular velocity follows `ω(φ) = A + B sin²φ + C sin⁴φ` for latitude `φ`,
//! with coefficients from one of several published fits ([`RotationLaw`]).
//! [`DifferentialRotation::project_coordinate`] uses the model to move a
//! helioprojective position between two observation times.

pub mod ephemeris;
mod geometry;


use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::Result;

pub use geometry::{Heliographic, Helioprojective, Observer};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Earth's mean orbital motion, subtracted for synodic rates. Degrees per day.
pub const EARTH_ORBITAL_RATE: f64 = 0.9856;

/// Published fits of the solar angular velocity profile.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum RotationLaw {
    /// Howard et al. (1990), small magnetic features.
    #[default]
    Howard,
    /// Snodgrass & Ulrich (1990), photospheric spectroscopy.
    Snodgrass,
    /// Allen, Astrophysical Quantities, sunspots.
    Allen,
}

impl RotationLaw {
    /// `[A, B, C]` in degrees per day.
    pub fn coefficients(self) -> [f64; 3] {
        // micro-radians per second to degrees per day
        let urad = 1e-6 * SECONDS_PER_DAY * 180.0 / std::f64::consts::PI;
        match self {
            RotationLaw::Howard => [2.894 * urad, -0.428 * urad, -0.370 * urad],
            RotationLaw::Snodgrass => [2.851 * urad, -0.343 * urad, -0.474 * urad],
            RotationLaw::Allen => [14.44, -3.0, 0.0],
        }
    }
}

/// Whether rates are measured against the stars or as seen from Earth.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum RotationFrame {
    #[default]
    Sidereal,
    Synodic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DifferentialRotation {
    pub law: RotationLaw,
    pub frame: RotationFrame,
}

impl DifferentialRotation {
    pub const fn new(law: RotationLaw, frame: RotationFrame) -> Self {
        Self { law, frame }
    }

    /// Angular velocity at `latitude` (degrees), degrees per day.
    ///
    /// `latitude` must lie in [-90, 90].
    pub fn angular_velocity(&self, latitude: f64) -> f64 {
        debug_assert!(
            (-90.0..=90.0).contains(&latitude),
            "latitude {latitude} outside [-90, 90]"
        );

        let [a, b, c] = self.law.coefficients();
        let sin2 = latitude.to_radians().sin().powi(2);
        let rate = a + b * sin2 + c * sin2 * sin2;

        match self.frame {
            RotationFrame::Sidereal => rate,
            RotationFrame::Synodic => rate - EARTH_ORBITAL_RATE,
        }
    }

    /// Longitude swept at `latitude` during `duration`, degrees.
    ///
    /// Negative durations rotate backward in time.
    pub fn rotation_rate(&self, duration: TimeDelta, latitude: f64) -> f64 {
        self.angular_velocity(latitude) * days(duration)
    }

    /// Time for one full turn at `latitude`, days.
    pub fn rotation_period(&self, latitude: f64) -> f64 {
        360.0 / self.angular_velocity(latitude)
    }

    /// Position at `to` of the surface feature seen at `hpc` at `from`.
    ///
    /// Both epochs use an Earth observer. Stonyhurst longitude is measured
    /// from the observer's meridian, so the feature always advances at the
    /// synodic rate of `self.law` whatever `self.frame` is. Fails with a
    /// geometry error when `hpc` is off the disk or the rotated feature has
    /// left the visible hemisphere.
    pub fn project_coordinate(
        &self,
        hpc: Helioprojective,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Helioprojective> {
        let start = Observer::earth(from);
        let end = Observer::earth(to);
        let observed = Self::new(self.law, RotationFrame::Synodic);

        let point = geometry::hpc_to_heliocentric(hpc, &start)?;
        let mut position = geometry::heliocentric_to_heliographic(point, start.b0);
        position.longitude += observed.rotation_rate(to - from, position.latitude);

        let moved = geometry::heliographic_to_heliocentric(position, end.b0);
        let projected = geometry::heliocentric_to_hpc(moved, &end)?;

        tracing::trace!(%hpc, %projected, law = %self.law, frame = %self.frame, "Projected coordinate");

        Ok(projected)
    }
}

fn days(duration: TimeDelta) -> f64 {
    duration.num_milliseconds() as f64 / (SECONDS_PER_DAY * 1000.0)
}

/// Sidereal rotation under the Howard law, degrees.
pub fn diff_rot(duration: TimeDelta, latitude: f64) -> f64 {
    DifferentialRotation::default().rotation_rate(duration, latitude)
}

/// Synodic Howard-law projection of `hpc` from `from` to `to`.
pub fn rot_hpc(
    hpc: Helioprojective,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Helioprojective> {
    DifferentialRotation::new(RotationLaw::Howard, RotationFrame::Synodic)
        .project_coordinate(hpc, from, to)
}
