//! Melody generation.
//!
//! [`MelodyGenerator`] runs the sampling loop; the [`pipeline`] module
//! chains generation, decoding and score writing.

pub mod generator;
pub mod pipeline;

pub use generator::MelodyGenerator;
pub use pipeline::{compose, compose_with_progress, request_rng, Composition};
