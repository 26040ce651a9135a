//! Low-precision solar ephemeris (Meeus, Astronomical Algorithms, ch. 25 and 29).
//!
//! Accurate to roughly 0.01 degrees in B0 and 1e-4 AU in distance, which is
//! well inside what differential rotation itself can resolve.

use chrono::{DateTime, Utc};

/// Photospheric solar radius.
pub const SOLAR_RADIUS_M: f64 = 6.955_08e8;
pub const ASTRONOMICAL_UNIT_M: f64 = 1.495_978_707e11;

const J2000_JD: f64 = 2_451_545.0;
const UNIX_EPOCH_JD: f64 = 2_440_587.5;
const MS_PER_DAY: f64 = 86_400_000.0;
const DAYS_PER_CENTURY: f64 = 36_525.0;

/// Inclination of the solar equator to the ecliptic, degrees.
const SOLAR_EQUATOR_INCLINATION: f64 = 7.25;

/// Julian date of a UTC instant. The UTC/TT offset is ignored.
pub fn julian_date(epoch: DateTime<Utc>) -> f64 {
    UNIX_EPOCH_JD + epoch.timestamp_millis() as f64 / MS_PER_DAY
}

fn julian_centuries(jd: f64) -> f64 {
    (jd - J2000_JD) / DAYS_PER_CENTURY
}

struct SunPosition {
    /// Apparent ecliptic longitude, degrees.
    longitude: f64,
    distance_au: f64,
}

fn sun_position(jd: f64) -> SunPosition {
    let t = julian_centuries(jd);

    let mean_longitude = 280.46646 + 36_000.769_83 * t + 0.000_303_2 * t * t;
    let mean_anomaly = 357.529_11 + 35_999.050_29 * t - 0.000_153_7 * t * t;
    let eccentricity = 0.016_708_634 - 0.000_042_037 * t - 0.000_000_126_7 * t * t;

    let m = mean_anomaly.to_radians();
    let center = (1.914_602 - 0.004_817 * t - 0.000_014 * t * t) * m.sin()
        + (0.019_993 - 0.000_101 * t) * (2.0 * m).sin()
        + 0.000_289 * (3.0 * m).sin();

    let true_longitude = mean_longitude + center;
    let true_anomaly = (mean_anomaly + center).to_radians();
    let distance_au = 1.000_001_018 * (1.0 - eccentricity * eccentricity)
        / (1.0 + eccentricity * true_anomaly.cos());

    let omega = (125.04 - 1_934.136 * t).to_radians();
    let longitude = true_longitude - 0.005_69 - 0.004_78 * omega.sin();

    SunPosition {
        longitude,
        distance_au,
    }
}

/// Sun-observer distance for an Earth-based observer, metres.
pub fn sun_earth_distance(epoch: DateTime<Utc>) -> f64 {
    sun_position(julian_date(epoch)).distance_au * ASTRONOMICAL_UNIT_M
}

/// Heliographic latitude of the disk centre seen from Earth, degrees.
pub fn b0_angle(epoch: DateTime<Utc>) -> f64 {
    let jd = julian_date(epoch);
    let node = 73.6667 + 1.395_833_3 * (jd - 2_396_758.0) / DAYS_PER_CENTURY;
    let longitude = sun_position(jd).longitude;

    let sin_b0 =
        (longitude - node).to_radians().sin() * SOLAR_EQUATOR_INCLINATION.to_radians().sin();
    sin_b0.asin().to_degrees()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_julian_date_of_j2000() {
        let j2000 = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert!((julian_date(j2000) - J2000_JD).abs() < 1e-9);
        assert!((julian_date(utc(1970, 1, 1)) - UNIX_EPOCH_JD).abs() < 1e-9);
    }

    #[test]
    fn test_b0_extremes_and_crossings() {
        // B0 peaks near +7.25 in early September and -7.25 in early March.
        assert!(b0_angle(utc(2020, 9, 8)) > 7.0);
        assert!(b0_angle(utc(2020, 3, 7)) < -7.0);
        // ...and crosses zero in early June and December.
        assert!(b0_angle(utc(2020, 6, 6)).abs() < 1.0);
        assert!(b0_angle(utc(2020, 12, 7)).abs() < 1.0);
    }

    #[test]
    fn test_distance_at_perihelion_and_aphelion() {
        let perihelion = sun_earth_distance(utc(2021, 1, 2)) / ASTRONOMICAL_UNIT_M;
        let aphelion = sun_earth_distance(utc(2021, 7, 5)) / ASTRONOMICAL_UNIT_M;
        assert!((perihelion - 0.9833).abs() < 1e-3, "perihelion {perihelion}");
        assert!((aphelion - 1.0167).abs() < 1e-3, "aphelion {aphelion}");
    }
}
