//! Core types for melodygen.
//!
//! This module re-exports all the core data types used throughout the crate:
//! - [`Vocabulary`]: Bidirectional token/id table for the sequence model
//! - [`MusicalEvent`]: A decoded note or rest with its duration
//! - [`MelodyRequest`]: Parameters for one generate-and-save run

mod event;
mod request;
mod vocabulary;

// Re-export all types at the module level
pub use event::{total_duration, MusicalEvent};
pub use request::{
    MelodyRequest, DEFAULT_FORMAT, DEFAULT_NUM_STEPS, DEFAULT_OUTPUT_FILE, DEFAULT_SEED,
    DEFAULT_STEP_DURATION, DEFAULT_TEMPERATURE,
};
pub use vocabulary::{Vocabulary, HOLD_TOKEN, REST_TOKEN, TERMINATOR_TOKEN};
