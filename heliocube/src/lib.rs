//! Heliocube - time-ordered solar image cubes and differential rotation.
//!
//! This library provides:
//! - [`FrameCollection`], a shape-homogeneous, time-sorted series of frames
//!   with running/base differences and frame-axis reductions
//! - Derived views (submap, superpixel, resample, subcube)
//! - A solar differential rotation model that moves helioprojective
//!   coordinates between two epochs
//! - [`CubeAnimator`], which prepares cube frames for an external renderer
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use heliocube::{FrameCollection, ImageFrame, MetaChoice};
//!
//! let cube = FrameCollection::new(frames)?;
//! let diff = cube.running_difference(1, MetaChoice::Ahead)?;
//! let average = cube.mean()?;
//! println!("{}", cube.summary(&Default::default()));
//! ```

pub mod animation;
pub mod config;
pub mod cube;
pub mod error;
pub mod frame;
pub mod meta;
pub mod rotation;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Frames and headers
// ============================================================================

pub use frame::{
    CoordinateSystem, Frame, ImageFrame, ResampleMethod, Scale, Shape, SuperpixelMethod, Units,
};
pub use meta::{Meta, MetaValue, Quantity};

// ============================================================================
// Cubes
// ============================================================================

pub use cube::{
    Base, CubeIndex, CubeOptions, CubeSummary, FrameCollection, MetaChoice, MetaValues,
    Reduction, ReductionOutput, Selection, SortBy, Volume,
};

// ============================================================================
// Differential rotation
// ============================================================================

pub use rotation::{
    diff_rot, rot_hpc, DifferentialRotation, Heliographic, Helioprojective, Observer,
    RotationFrame, RotationLaw,
};

// ============================================================================
// Animation and configuration
// ============================================================================

pub use animation::{
    AnimatorConfig, CubeAnimator, OverlayArtifact, RenderBackend, RenderedFrame,
};
pub use config::{Config, DisplayConfig};
pub use error::{Error, Result};
