//! Model variant selection.
//!
//! The three exported sequence models share one scoring interface and
//! differ only in their weights file and hidden width.

use serde::{Deserialize, Serialize};

use crate::error::{MelodyError, Result};

/// Available sequence model variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModelVariant {
    /// Single-layer GRU ("model1").
    #[default]
    Gru,

    /// LSTM ("model2").
    Lstm,

    /// Variational recurrent model ("model3"), twice the base hidden width.
    Vae,
}

impl ModelVariant {
    /// All variants in selector order.
    pub const ALL: [ModelVariant; 3] = [ModelVariant::Gru, ModelVariant::Lstm, ModelVariant::Vae];

    /// Returns the selector string of the variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelVariant::Gru => "model1",
            ModelVariant::Lstm => "model2",
            ModelVariant::Vae => "model3",
        }
    }

    /// Parses a variant from a selector string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "model1" | "gru" => Some(ModelVariant::Gru),
            "model2" | "lstm" => Some(ModelVariant::Lstm),
            "model3" | "vae" => Some(ModelVariant::Vae),
            _ => None,
        }
    }

    /// Parses a variant, failing with a CONFIG_ERROR for unknown selectors.
    pub fn from_selector(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| MelodyError::unknown_variant(s))
    }

    /// Returns the weights file name inside the model directory.
    pub fn weights_file(&self) -> &'static str {
        match self {
            ModelVariant::Gru => "model.onnx",
            ModelVariant::Lstm => "model_lstm.onnx",
            ModelVariant::Vae => "model_vae.onnx",
        }
    }

    /// Returns the hidden width the variant was trained with.
    pub fn hidden_width(&self, base_hidden_size: usize) -> usize {
        match self {
            ModelVariant::Gru | ModelVariant::Lstm => base_hidden_size,
            ModelVariant::Vae => base_hidden_size * 2,
        }
    }
}

impl std::fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
