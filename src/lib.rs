//! melodygen: seeded melody generation with ONNX sequence models.
//!
//! This library samples a melody token by token from an exported sequence
//! model conditioned on a seed phrase, then decodes the tokens into notes and
//! rests and writes them as a MIDI score.
//!
//! # Modules
//!
//! - [`types`]: Core data types (Vocabulary, MusicalEvent, MelodyRequest)
//! - [`models`]: Model variants, ONNX scoring and temperature sampling
//! - [`generation`]: The autoregressive generator and end-to-end pipeline
//! - [`score`]: Melody decoding and MIDI/JSON writers
//! - [`config`]: Runtime configuration (GeneratorConfig)
//! - [`error`]: Error types and codes (MelodyError, ErrorCode)
//!
//! # Example
//!
//! ```rust,ignore
//! use melodygen::{GeneratorConfig, MelodyGenerator};
//! use rand::SeedableRng;
//!
//! let config = GeneratorConfig::from_env();
//! let mut generator = MelodyGenerator::load(&config, "model3")?;
//!
//! let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(42);
//! let melody = generator.generate("67 _ 67 _ 65 64 _", 500, 64, 0.3, &mut rng)?;
//!
//! melodygen::score::save_melody(&melody, 0.25, "midi", "generated_melody.mid".as_ref())?;
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod models;
pub mod score;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use config::GeneratorConfig;
pub use error::{ErrorCode, MelodyError, Result};
pub use generation::{compose, Composition, MelodyGenerator};
pub use models::{ModelVariant, ScoringModel};
pub use score::{decode_melody, save_melody};
pub use types::{MelodyRequest, MusicalEvent, Vocabulary};
