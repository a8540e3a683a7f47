//! Spatial audio module

pub mod gain;

pub use gain::{gain, Axis, Falloff, Position};
