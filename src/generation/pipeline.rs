//! Generation pipeline.
//!
//! Runs a [`MelodyRequest`] end to end: sample a melody, decode it into
//! events and write the score.

use std::path::PathBuf;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::Result;
use crate::score::save_melody_with_tempo;
use crate::types::{MelodyRequest, MusicalEvent};

use super::generator::MelodyGenerator;

/// Result of a completed request.
#[derive(Debug, Clone)]
pub struct Composition {
    /// Generated tokens, seed included.
    pub melody: Vec<String>,
    /// Decoded events as written to the score.
    pub events: Vec<MusicalEvent>,
    /// Path the score was written to.
    pub output: PathBuf,
}

/// Builds the sampling RNG for a request.
///
/// A fixed seed gives reproducible melodies; otherwise the RNG is seeded
/// from OS entropy.
pub fn request_rng(rng_seed: Option<u64>) -> ChaCha8Rng {
    match rng_seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Generates, decodes and saves a melody for a request.
pub fn compose(
    generator: &mut MelodyGenerator,
    request: &MelodyRequest,
    tempo_bpm: u32,
) -> Result<Composition> {
    compose_with_progress(generator, request, tempo_bpm, |_, _| {})
}

/// Like [`compose`], reporting (steps done, step budget) during sampling.
pub fn compose_with_progress<F>(
    generator: &mut MelodyGenerator,
    request: &MelodyRequest,
    tempo_bpm: u32,
    on_progress: F,
) -> Result<Composition>
where
    F: Fn(usize, usize),
{
    request.validate(generator.sequence_length())?;

    let mut rng = request_rng(request.rng_seed);
    let window = request.effective_window(generator.sequence_length());

    let melody = generator.generate_with_progress(
        &request.seed,
        request.num_steps,
        window,
        request.temperature,
        &mut rng,
        on_progress,
    )?;

    let events = save_melody_with_tempo(
        &melody,
        request.step_duration,
        &request.format,
        &request.output,
        tempo_bpm,
    )?;

    Ok(Composition {
        melody,
        events,
        output: request.output.clone(),
    })
}
