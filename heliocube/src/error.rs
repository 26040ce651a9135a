//! Error types for cube construction, cube algebra and rotation projection.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::frame::{Scale, Shape};

/// Errors surfaced by cube operations and coordinate projection.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Shape mismatch for {}: expected {expected}, got {actual}", frame_label(.index))]
    ShapeMismatch {
        /// Offending frame in the cube, `None` for a frame outside it (e.g. a base frame).
        index: Option<usize>,
        expected: Shape,
        actual: Shape,
    },

    #[error("Scale mismatch for frame {index}: expected {expected}, got {actual}")]
    ScaleMismatch {
        index: usize,
        expected: Scale,
        actual: Scale,
    },

    #[error("Invalid value '{value}' for '{name}': {reason}")]
    InvalidArgument {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Index {index} out of range for cube of {len} frames")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Metadata key '{key}' missing from frame {index}")]
    MissingMetadata { key: String, index: usize },

    #[error("Coordinate geometry error: {0}")]
    Geometry(String),

    #[error("Cannot construct cube: {0}")]
    Construction(String),

    #[error("Failed to read config file '{path}': {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid_argument(
        name: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidArgument {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

fn frame_label(index: &Option<usize>) -> String {
    match index {
        Some(index) => format!("frame {index}"),
        None => "external frame".to_string(),
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}
