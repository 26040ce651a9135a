//! Coordinate frames used by rotation projection.
//!
//! Heliocentric cartesian: origin at the solar centre, +z toward the
//! observer, +y toward solar north projected on the sky plane, +x west.
//! Helioprojective angles are in arcseconds, heliographic ones in degrees.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::rotation::ephemeris::{b0_angle, sun_earth_distance, SOLAR_RADIUS_M};

/// Observer-centred angular position, arcseconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Helioprojective {
    pub x: f64,
    pub y: f64,
}

impl Helioprojective {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Helioprojective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}\", {:.2}\")", self.x, self.y)
    }
}

/// Stonyhurst heliographic position, degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Heliographic {
    pub longitude: f64,
    pub latitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Heliocentric {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Where the Sun is seen from at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observer {
    /// Heliographic latitude of the disk centre, degrees.
    pub b0: f64,
    /// Sun-observer distance, metres.
    pub distance: f64,
}

impl Observer {
    /// Earth as observer at `epoch`.
    pub fn earth(epoch: DateTime<Utc>) -> Self {
        Self {
            b0: b0_angle(epoch),
            distance: sun_earth_distance(epoch),
        }
    }
}

fn arcsec_to_rad(value: f64) -> f64 {
    (value / 3600.0).to_radians()
}

fn rad_to_arcsec(value: f64) -> f64 {
    value.to_degrees() * 3600.0
}

/// Intersects the line of sight with the solar sphere, taking the near side.
pub(crate) fn hpc_to_heliocentric(hpc: Helioprojective, observer: &Observer) -> Result<Heliocentric> {
    let (sin_x, cos_x) = arcsec_to_rad(hpc.x).sin_cos();
    let (sin_y, cos_y) = arcsec_to_rad(hpc.y).sin_cos();
    let d = observer.distance;

    let q = d * cos_y * cos_x;
    let discriminant = q * q - d * d + SOLAR_RADIUS_M * SOLAR_RADIUS_M;
    if discriminant < 0.0 {
        return Err(Error::Geometry(format!("{hpc} is off the solar disk")));
    }
    let along = q - discriminant.sqrt();

    Ok(Heliocentric {
        x: along * cos_y * sin_x,
        y: along * sin_y,
        z: d - along * cos_y * cos_x,
    })
}

pub(crate) fn heliocentric_to_hpc(
    point: Heliocentric,
    observer: &Observer,
) -> Result<Helioprojective> {
    let d = observer.distance;
    // A sphere point faces the observer when the tangent plane separates them.
    if point.z <= SOLAR_RADIUS_M * SOLAR_RADIUS_M / d {
        return Err(Error::Geometry(
            "point is behind the solar limb".to_string(),
        ));
    }

    let depth = d - point.z;
    let range = (point.x * point.x + point.y * point.y + depth * depth).sqrt();
    Ok(Helioprojective {
        x: rad_to_arcsec(point.x.atan2(depth)),
        y: rad_to_arcsec((point.y / range).asin()),
    })
}

pub(crate) fn heliocentric_to_heliographic(point: Heliocentric, b0: f64) -> Heliographic {
    let (sin_b, cos_b) = b0.to_radians().sin_cos();
    let radius = (point.x * point.x + point.y * point.y + point.z * point.z).sqrt();

    let longitude = point.x.atan2(point.z * cos_b - point.y * sin_b);
    let latitude = ((point.y * cos_b + point.z * sin_b) / radius).clamp(-1.0, 1.0).asin();

    Heliographic {
        longitude: longitude.to_degrees(),
        latitude: latitude.to_degrees(),
    }
}

pub(crate) fn heliographic_to_heliocentric(position: Heliographic, b0: f64) -> Heliocentric {
    let (sin_b, cos_b) = b0.to_radians().sin_cos();
    let (sin_lon, cos_lon) = position.longitude.to_radians().sin_cos();
    let (sin_lat, cos_lat) = position.latitude.to_radians().sin_cos();
    let r = SOLAR_RADIUS_M;

    Heliocentric {
        x: r * cos_lat * sin_lon,
        y: r * (sin_lat * cos_b - cos_lat * cos_lon * sin_b),
        z: r * (sin_lat * sin_b + cos_lat * cos_lon * cos_b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OBSERVER: Observer = Observer {
        b0: 0.0,
        distance: 1.495_978_707e11,
    };

    #[test]
    fn test_disk_centre_maps_to_sub_observer_point() {
        let point = hpc_to_heliocentric(Helioprojective::new(0.0, 0.0), &OBSERVER).unwrap();
        assert!(point.x.abs() < 1e-3);
        assert!(point.y.abs() < 1e-3);
        assert!((point.z - SOLAR_RADIUS_M).abs() < 1.0);

        let position = heliocentric_to_heliographic(point, OBSERVER.b0);
        assert!(position.longitude.abs() < 1e-9);
        assert!(position.latitude.abs() < 1e-9);
    }

    #[test]
    fn test_off_disk_is_geometry_error() {
        let result = hpc_to_heliocentric(Helioprojective::new(1200.0, 0.0), &OBSERVER);
        assert!(matches!(result, Err(Error::Geometry(_))));
    }

    #[test]
    fn test_far_side_is_geometry_error() {
        let far = heliographic_to_heliocentric(
            Heliographic {
                longitude: 120.0,
                latitude: 10.0,
            },
            0.0,
        );
        assert!(matches!(
            heliocentric_to_hpc(far, &OBSERVER),
            Err(Error::Geometry(_))
        ));
    }

    #[test]
    fn test_heliographic_round_trip_with_tilt() {
        let b0 = 6.5;
        let original = Heliographic {
            longitude: -35.0,
            latitude: 22.0,
        };
        let back = heliocentric_to_heliographic(heliographic_to_heliocentric(original, b0), b0);
        assert!((back.longitude - original.longitude).abs() < 1e-9);
        assert!((back.latitude - original.latitude).abs() < 1e-9);
    }

    #[test]
    fn test_positive_b0_moves_equator_south_on_disk() {
        let observer = Observer { b0: 7.0, ..OBSERVER };
        let equator = heliographic_to_heliocentric(Heliographic::default(), observer.b0);
        let hpc = heliocentric_to_hpc(equator, &observer).unwrap();
        assert!(hpc.x.abs() < 1e-6);
        assert!(hpc.y < -100.0);
    }
}
