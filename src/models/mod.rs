//! Sequence model components.
//!
//! - [`ModelVariant`](backend::ModelVariant): The three selectable model variants
//! - [`ScoringModel`](scorer::ScoringModel): Context window to per-token scores
//! - [`OnnxScorer`](scorer::OnnxScorer): ONNX Runtime implementation
//! - [`Logits`](logits::Logits): Temperature sampling over scores

pub mod backend;
pub mod loader;
pub mod logits;
pub mod scorer;

// Re-export commonly used types
pub use backend::ModelVariant;
pub use loader::{available_variants, check_model, load_model, weights_path, LoadedModel};
pub use logits::{reweight_with_temperature, Logits, EPSILON};
pub use scorer::{one_hot, OnnxScorer, ScoringModel, LOGITS_OUTPUT};
