//! Frame header metadata.
//!
//! Keys follow FITS header conventions but are stored lower-case, so
//! `"DATE-OBS"` and `"date-obs"` address the same entry.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

pub const KEY_DATE_OBS: &str = "date-obs";
pub const KEY_INSTRUMENT: &str = "instrume";
pub const KEY_TELESCOPE: &str = "telescop";
pub const KEY_OBSERVATORY: &str = "obsrvtry";
pub const KEY_DETECTOR: &str = "detector";
pub const KEY_WAVELENGTH: &str = "wavelnth";
pub const KEY_WAVE_UNIT: &str = "waveunit";
pub const KEY_EXPOSURE_TIME: &str = "exptime";
pub const KEY_COLOR_MAP: &str = "cmap";

/// A scalar header value.
///
/// Equality is numeric across `Int` and `Float`, so `Int(2) == Float(2.0)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl MetaValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetaValue::Int(v) => Some(*v as f64),
            MetaValue::Float(v) => Some(*v),
            MetaValue::Bool(_) | MetaValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Total order used when sorting frames by a header key.
    ///
    /// Numbers compare numerically (ints and floats mix), text lexicographically.
    /// Values of different kinds order as bool < number < text.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (MetaValue::Bool(a), MetaValue::Bool(b)) => a.cmp(b),
            (MetaValue::Text(a), MetaValue::Text(b)) => a.cmp(b),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                _ => self.kind_rank().cmp(&other.kind_rank()),
            },
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            MetaValue::Bool(_) => 0,
            MetaValue::Int(_) | MetaValue::Float(_) => 1,
            MetaValue::Text(_) => 2,
        }
    }
}

impl PartialEq for MetaValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (MetaValue::Bool(a), MetaValue::Bool(b)) => a == b,
            (MetaValue::Text(a), MetaValue::Text(b)) => a == b,
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Bool(v) => write!(f, "{v}"),
            MetaValue::Int(v) => write!(f, "{v}"),
            MetaValue::Float(v) => write!(f, "{v}"),
            MetaValue::Text(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        MetaValue::Bool(value)
    }
}

impl From<i64> for MetaValue {
    fn from(value: i64) -> Self {
        MetaValue::Int(value)
    }
}

impl From<i32> for MetaValue {
    fn from(value: i32) -> Self {
        MetaValue::Int(value.into())
    }
}

impl From<f64> for MetaValue {
    fn from(value: f64) -> Self {
        MetaValue::Float(value)
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::Text(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        MetaValue::Text(value)
    }
}

/// A numeric value with a unit label, e.g. a wavelength of `171 angstrom`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    pub unit: String,
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.is_empty() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{} {}", self.value, self.unit)
        }
    }
}

/// Header of a single frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meta {
    entries: BTreeMap<String, MetaValue>,
}

impl Meta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<MetaValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<MetaValue>) -> Option<MetaValue> {
        self.entries.insert(key.to_ascii_lowercase(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<MetaValue> {
        self.entries.remove(&key.to_ascii_lowercase())
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries.get(&key.to_ascii_lowercase())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(MetaValue::as_str)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(MetaValue::as_f64)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Capture time from `date-obs`, if present and parseable.
    pub fn date_obs(&self) -> Option<DateTime<Utc>> {
        self.get_str(KEY_DATE_OBS).and_then(parse_timestamp)
    }

    pub fn instrument(&self) -> String {
        self.get_str(KEY_INSTRUMENT).unwrap_or("").replace('_', " ")
    }

    /// `obsrvtry`, falling back to `telescop`.
    pub fn observatory(&self) -> String {
        self.get_str(KEY_OBSERVATORY)
            .or_else(|| self.get_str(KEY_TELESCOPE))
            .unwrap_or("")
            .replace('_', " ")
    }

    pub fn detector(&self) -> String {
        self.get_str(KEY_DETECTOR).unwrap_or("").to_string()
    }

    pub fn wavelength(&self) -> Quantity {
        Quantity {
            value: self.get_f64(KEY_WAVELENGTH).unwrap_or(0.0),
            unit: self.get_str(KEY_WAVE_UNIT).unwrap_or("").to_string(),
        }
    }
}

impl<K: AsRef<str>, V: Into<MetaValue>> FromIterator<(K, V)> for Meta {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut meta = Meta::new();
        for (key, value) in iter {
            meta.insert(key.as_ref(), value);
        }
        meta
    }
}

/// Parses an ISO-8601 timestamp. Values without an offset are taken as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(time) = DateTime::parse_from_rfc3339(text) {
        return Some(time.with_timezone(&Utc));
    }

    let naive = text.trim_end_matches('Z');
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(naive, format).ok())
        .map(|time| time.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    #[test]
    fn test_keys_are_case_insensitive() {
        let meta = Meta::new().with("INSTRUME", "AIA_3");
        assert_eq!(meta.get_str("instrume"), Some("AIA_3"));
        assert!(meta.contains_key("Instrume"));
    }

    #[test]
    fn test_instrument_replaces_underscores() {
        let meta = Meta::new().with("instrume", "AIA_3");
        assert_eq!(meta.instrument(), "AIA 3");
    }

    #[test]
    fn test_observatory_falls_back_to_telescope() {
        let meta = Meta::new().with("telescop", "SDO/AIA");
        assert_eq!(meta.observatory(), "SDO/AIA");

        let meta = meta.with("obsrvtry", "Solar_Dynamics_Observatory");
        assert_eq!(meta.observatory(), "Solar Dynamics Observatory");
    }

    #[test]
    fn test_missing_accessors_default_to_empty() {
        let meta = Meta::new();
        assert_eq!(meta.instrument(), "");
        assert_eq!(meta.detector(), "");
        assert_eq!(
            meta.wavelength(),
            Quantity {
                value: 0.0,
                unit: String::new()
            }
        );
    }

    #[test]
    fn test_wavelength_reads_int_value() {
        let meta = Meta::new().with("wavelnth", 171).with("waveunit", "angstrom");
        let wave = meta.wavelength();
        assert_eq!(wave.value, 171.0);
        assert_eq!(wave.to_string(), "171 angstrom");
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let t = parse_timestamp("2011-06-07T06:33:02.770").unwrap();
        assert_eq!((t.year(), t.month(), t.day()), (2011, 6, 7));
        assert_eq!((t.hour(), t.minute(), t.second()), (6, 33, 2));

        assert!(parse_timestamp("2011-06-07T06:33:02Z").is_some());
        assert!(parse_timestamp("2011-06-07 06:33:02").is_some());
        assert!(parse_timestamp("2011-06-07T06:33:02+02:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_sort_cmp_mixes_ints_and_floats() {
        assert_eq!(
            MetaValue::Int(2).sort_cmp(&MetaValue::Float(1.5)),
            Ordering::Greater
        );
        assert_eq!(
            MetaValue::from("a").sort_cmp(&MetaValue::from("b")),
            Ordering::Less
        );
        assert_eq!(
            MetaValue::Float(100.0).sort_cmp(&MetaValue::from("a")),
            Ordering::Less
        );
    }

    #[test]
    fn test_numeric_values_compare_across_kinds() {
        assert_eq!(MetaValue::Int(2), MetaValue::Float(2.0));
        assert_ne!(MetaValue::Int(2), MetaValue::Float(2.5));
        assert_ne!(MetaValue::from("2"), MetaValue::Int(2));
        assert_ne!(MetaValue::Bool(true), MetaValue::Int(1));
    }

    #[test]
    fn test_meta_from_iterator() {
        let meta: Meta = [("exptime", 2.0), ("cdelt1", 0.6)].into_iter().collect();
        assert_eq!(meta.len(), 2);
        assert_eq!(meta.get_f64("EXPTIME"), Some(2.0));
    }
}
