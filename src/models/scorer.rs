//! Sequence model scoring.
//!
//! A scoring model maps a context window of token ids to one unnormalized
//! score per vocabulary id. The ONNX implementation serves all three model
//! variants.

use std::path::Path;

use ort::session::Session;
use ort::value::{DynValue, Tensor};

use crate::error::{MelodyError, Result};

use super::backend::ModelVariant;
use super::logits::Logits;

/// Name of the score output in exported models.
pub const LOGITS_OUTPUT: &str = "logits";

/// Scores a context window over the vocabulary.
///
/// `score` takes `&mut self`: one model instance serves one generation at a
/// time.
pub trait ScoringModel: Send {
    /// Number of vocabulary ids the model scores.
    fn vocab_size(&self) -> usize;

    /// Returns one unnormalized score per vocabulary id.
    ///
    /// Ids at or beyond `vocab_size` (the unknown-token sentinel) contribute
    /// no input signal.
    fn score(&mut self, context: &[usize]) -> Result<Logits>;
}

/// One-hot encodes a context as a row-major `[context.len(), vocab_size]` buffer.
///
/// Out-of-range ids produce an all-zero row.
pub fn one_hot(context: &[usize], vocab_size: usize) -> Vec<f32> {
    let mut data = vec![0.0f32; context.len() * vocab_size];
    for (row, &id) in context.iter().enumerate() {
        if id < vocab_size {
            data[row * vocab_size + id] = 1.0;
        }
    }
    data
}

/// ONNX Runtime scoring model for one variant.
pub struct OnnxScorer {
    session: Session,
    variant: ModelVariant,
    vocab_size: usize,
}

impl std::fmt::Debug for OnnxScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxScorer")
            .field("variant", &self.variant)
            .field("vocab_size", &self.vocab_size)
            .finish()
    }
}

impl OnnxScorer {
    /// Loads the weights file for `variant` and checks it scores `vocab_size` ids.
    ///
    /// The model must take a one-hot `[1, window, vocab_size]` f32 input and
    /// produce a `logits` output ending in `vocab_size` scores.
    pub fn load(
        weights_path: &Path,
        variant: ModelVariant,
        vocab_size: usize,
        threads: Option<u32>,
    ) -> Result<Self> {
        if !weights_path.exists() {
            return Err(MelodyError::model_not_found(weights_path));
        }

        let mut builder = Session::builder()
            .map_err(|e| MelodyError::model_load_failed(format!("Failed to create session: {}", e)))?;

        if let Some(threads) = threads {
            builder = builder.with_intra_threads(threads as usize).map_err(|e| {
                MelodyError::model_load_failed(format!("Failed to set intra-op threads: {}", e))
            })?;
        }

        let session = builder.commit_from_file(weights_path).map_err(|e| {
            MelodyError::model_load_failed(format!(
                "Failed to load {}: {}",
                weights_path.display(),
                e
            ))
        })?;

        let mut scorer = Self {
            session,
            variant,
            vocab_size,
        };

        // A one-step call catches weights exported for a different vocabulary.
        scorer.score(&[0]).map_err(|e| {
            MelodyError::model_load_failed(format!(
                "{} is incompatible with a vocabulary of {} tokens: {}",
                weights_path.display(),
                vocab_size,
                e.message
            ))
        })?;

        Ok(scorer)
    }

}

impl ScoringModel for OnnxScorer {
    fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    fn score(&mut self, context: &[usize]) -> Result<Logits> {
        if context.is_empty() {
            return Err(MelodyError::inference_failed("Context window is empty"));
        }

        let data = one_hot(context, self.vocab_size);
        let input = Tensor::from_array(([1usize, context.len(), self.vocab_size], data))
            .map_err(|e| {
                MelodyError::inference_failed(format!("Failed to create input tensor: {}", e))
            })?;

        let mut outputs = self.session.run(ort::inputs![input]).map_err(|e| {
            MelodyError::inference_failed(format!("{} inference failed: {}", self.variant, e))
        })?;

        let logits: DynValue = outputs.remove(LOGITS_OUTPUT).ok_or_else(|| {
            MelodyError::inference_failed(format!("{} not found in output", LOGITS_OUTPUT))
        })?;

        Logits::from_dyn_value(&logits, self.vocab_size)
    }
}
