//! Logits processing for sequence model output.
//!
//! Converts raw per-token scores into a sampling distribution using the
//! two-stage temperature law and draws token ids from it.

use std::fmt::{Debug, Formatter};
use std::ops::Deref;

use half::f16;
use ndarray::Array1;
use ort::value::DynValue;
use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::Rng;

use crate::error::{MelodyError, Result};

/// Guards `ln(0)` when reweighting probabilities.
pub const EPSILON: f32 = 1e-10;

/// Unnormalized scores, one per vocabulary id.
#[derive(Clone, PartialEq)]
pub struct Logits(Array1<f32>);

impl Deref for Logits {
    type Target = Array1<f32>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Debug for Logits {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Logits({})", self.0.len())
    }
}

impl From<Vec<f32>> for Logits {
    fn from(scores: Vec<f32>) -> Self {
        Self(Array1::from_vec(scores))
    }
}

impl Logits {
    /// Creates Logits from a model output, supporting both f32 and f16.
    ///
    /// The output may be `[batch, vocab]` or `[batch, seq, vocab]`; the last
    /// `vocab_size` values are the scores for the next token.
    pub fn from_dyn_value(value: &DynValue, vocab_size: usize) -> Result<Self> {
        let data: Vec<f32> = if let Ok((_, data)) = value.try_extract_tensor::<f32>() {
            data.to_vec()
        } else if let Ok((_, data)) = value.try_extract_tensor::<f16>() {
            data.iter().map(|e| f32::from(*e)).collect()
        } else {
            return Err(MelodyError::inference_failed("Logits must be f32 or f16"));
        };

        if vocab_size == 0 || data.len() < vocab_size || data.len() % vocab_size != 0 {
            return Err(MelodyError::inference_failed(format!(
                "Model output has {} values, expected a multiple of vocabulary size {}",
                data.len(),
                vocab_size
            )));
        }

        let last = data[data.len() - vocab_size..].to_vec();
        Ok(Self::from(last))
    }

    /// Returns the id with the highest score.
    pub fn argmax(&self) -> Option<usize> {
        self.0
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f32)>, (i, &v)| match best {
                Some((_, bv)) if bv >= v => best,
                _ => Some((i, v)),
            })
            .map(|(i, _)| i)
    }

    /// Softmax of `scores / temperature`.
    ///
    /// Scores are shifted by their maximum before dividing so that the best
    /// score maps to 0 even when the temperature is vanishingly small.
    pub fn softmax_with_temperature(&self, temperature: f32) -> Array1<f32> {
        let max = self.0.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        let scaled = if max.is_finite() {
            self.0.mapv(|v| (v - max) / temperature)
        } else {
            self.0.mapv(|v| v / temperature)
        };
        normalize_exp(scaled)
    }

    /// Full sampling distribution: temperature softmax followed by the
    /// log-space temperature reweighting.
    pub fn sampling_distribution(&self, temperature: f32) -> Array1<f32> {
        let probabilities = self.softmax_with_temperature(temperature);
        reweight_with_temperature(&probabilities, temperature)
    }

    /// Draws one id from the sampling distribution.
    ///
    /// Falls back to the highest-scoring id when the distribution cannot be
    /// represented in f32, which is the limit the temperature law tends to.
    pub fn sample<R: Rng + ?Sized>(&self, temperature: f32, rng: &mut R) -> Result<usize> {
        let distribution = self.sampling_distribution(temperature);
        if !distribution.iter().all(|p| p.is_finite()) {
            return self
                .argmax()
                .ok_or_else(|| MelodyError::inference_failed("Model returned no scores"));
        }
        let weighted = WeightedIndex::new(distribution.iter().copied()).map_err(|e| {
            MelodyError::inference_failed(format!("Degenerate sampling distribution: {}", e))
        })?;
        Ok(weighted.sample(rng))
    }
}

/// Reweights a probability vector: `exp(ln(p + EPSILON) / temperature)`,
/// renormalized to sum to 1.
pub fn reweight_with_temperature(probabilities: &Array1<f32>, temperature: f32) -> Array1<f32> {
    let log_weights = probabilities.mapv(|p| (p + EPSILON).ln() / temperature);
    normalize_exp(log_weights)
}

/// Exponentiates and normalizes log-weights, subtracting the max first.
///
/// An infinite maximum puts all mass evenly on the entries that reach it.
fn normalize_exp(log_weights: Array1<f32>) -> Array1<f32> {
    let max = log_weights.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
    if max.is_infinite() {
        let hits = log_weights.mapv(|v| if v == max { 1.0 } else { 0.0 });
        let count = hits.sum();
        return hits / count;
    }
    let exp = log_weights.mapv(|v| (v - max).exp());
    let sum = exp.sum();
    exp / sum
}
