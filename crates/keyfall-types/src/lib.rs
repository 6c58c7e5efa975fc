//! Shared value types.
//!
//! This module provides:
//! - [`MidiNumber`], [`PitchClass`]: validated note numbers and pitch spelling
//! - [`KeyIdentifier`], [`LaneIdentifier`]: the key and lane naming convention
//! - [`Rgba`], [`Vec2`]: key colors and playfield geometry

pub mod color;
pub mod error;
pub mod geometry;
pub mod midi_number;
pub mod naming;
pub mod pitch;

pub use color::Rgba;
pub use error::IdentifierError;
pub use geometry::Vec2;
pub use midi_number::MidiNumber;
pub use naming::{KeyColor, KeyIdentifier, LaneIdentifier, sharp_to_flat};
pub use pitch::PitchClass;
