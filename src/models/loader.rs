//! Model loader for the exported melody models.
//!
//! Resolves the variant's files from the configuration and loads the
//! vocabulary and scoring session.

use std::path::{Path, PathBuf};

use crate::config::GeneratorConfig;
use crate::error::{MelodyError, Result};
use crate::types::Vocabulary;

use super::backend::ModelVariant;
use super::scorer::OnnxScorer;

/// A vocabulary and the scoring model trained on it.
#[derive(Debug)]
pub struct LoadedModel {
    /// Token/id table.
    pub vocabulary: Vocabulary,
    /// Scoring session for the selected variant.
    pub scorer: OnnxScorer,
}

/// Returns the weights path for a variant inside a model directory.
pub fn weights_path(model_dir: &Path, variant: ModelVariant) -> PathBuf {
    model_dir.join(variant.weights_file())
}

/// Checks that the vocabulary and the variant's weights exist.
///
/// Returns Ok(()) if both files exist, or a LOAD_ERROR naming the first missing one.
pub fn check_model(config: &GeneratorConfig, variant: ModelVariant) -> Result<()> {
    let mapping = config.effective_mapping_path();
    if !mapping.exists() {
        return Err(MelodyError::vocabulary_not_found(&mapping));
    }

    let weights = weights_path(&config.effective_model_dir(), variant);
    if !weights.exists() {
        return Err(MelodyError::model_not_found(&weights));
    }

    Ok(())
}

/// Lists which variants have weights in the model directory.
pub fn available_variants(model_dir: &Path) -> Vec<ModelVariant> {
    ModelVariant::ALL
        .into_iter()
        .filter(|v| weights_path(model_dir, *v).exists())
        .collect()
}

/// Loads the vocabulary and the scoring session for a variant.
pub fn load_model(config: &GeneratorConfig, variant: ModelVariant) -> Result<LoadedModel> {
    check_model(config, variant)?;
    let weights = weights_path(&config.effective_model_dir(), variant);

    let mapping = config.effective_mapping_path();
    log::info!("Loading vocabulary from {}", mapping.display());
    let vocabulary = Vocabulary::load(&mapping)?;

    let hidden_width = variant.hidden_width(config.hidden_size);
    log::info!(
        "Loading {} (hidden width {}) from {}",
        variant,
        hidden_width,
        weights.display()
    );
    let scorer = OnnxScorer::load(&weights, variant, vocabulary.len(), config.threads)?;

    log::info!("Model loaded ({} tokens).", vocabulary.len());

    Ok(LoadedModel { vocabulary, scorer })
}
