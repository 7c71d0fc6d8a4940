//! Autoregressive melody generator.
//!
//! Primes a context with start symbols and the seed, then repeatedly scores
//! the trailing window, samples the next token and appends it until the step
//! budget runs out or the terminator is drawn.

use rand::Rng;

use crate::config::GeneratorConfig;
use crate::error::{MelodyError, Result};
use crate::models::{load_model, ModelVariant, ScoringModel};
use crate::types::{Vocabulary, TERMINATOR_TOKEN};

/// Melody generator owning a scoring model and its vocabulary.
pub struct MelodyGenerator {
    scorer: Box<dyn ScoringModel>,
    vocabulary: Vocabulary,
    sequence_length: usize,
}

impl std::fmt::Debug for MelodyGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MelodyGenerator")
            .field("vocab_size", &self.vocabulary.len())
            .field("sequence_length", &self.sequence_length)
            .finish()
    }
}

impl MelodyGenerator {
    /// Creates a generator from an already-loaded scoring model.
    ///
    /// Fails if the model and vocabulary disagree on size or the sequence
    /// length is zero.
    pub fn new(
        scorer: Box<dyn ScoringModel>,
        vocabulary: Vocabulary,
        sequence_length: usize,
    ) -> Result<Self> {
        if scorer.vocab_size() != vocabulary.len() {
            return Err(MelodyError::model_load_failed(format!(
                "model scores {} tokens but the vocabulary has {}",
                scorer.vocab_size(),
                vocabulary.len()
            )));
        }
        if sequence_length == 0 {
            return Err(MelodyError::invalid_config("sequence_length must be > 0"));
        }

        Ok(Self {
            scorer,
            vocabulary,
            sequence_length,
        })
    }

    /// Loads the vocabulary and the weights for the selected variant.
    ///
    /// `variant` is a selector string such as `model1`, `model2` or `model3`.
    pub fn load(config: &GeneratorConfig, variant: &str) -> Result<Self> {
        if let Some(reason) = config.validate() {
            return Err(MelodyError::invalid_config(reason));
        }

        let variant = ModelVariant::from_selector(variant)?;
        let loaded = load_model(config, variant)?;

        Self::new(
            Box::new(loaded.scorer),
            loaded.vocabulary,
            config.sequence_length,
        )
    }

    /// Returns the vocabulary.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Returns the trained context length.
    pub fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    /// Generates a melody continuing `seed`.
    ///
    /// The returned melody starts with the seed tokens as given, followed by
    /// at most `num_steps` sampled tokens. It never contains the start
    /// padding or the terminator.
    pub fn generate<R: Rng + ?Sized>(
        &mut self,
        seed: &str,
        num_steps: usize,
        window_size: usize,
        temperature: f32,
        rng: &mut R,
    ) -> Result<Vec<String>> {
        self.generate_with_progress(seed, num_steps, window_size, temperature, rng, |_, _| {})
    }

    /// Generates a melody, reporting (steps done, step budget) after each step.
    pub fn generate_with_progress<R, F>(
        &mut self,
        seed: &str,
        num_steps: usize,
        window_size: usize,
        temperature: f32,
        rng: &mut R,
        on_progress: F,
    ) -> Result<Vec<String>>
    where
        R: Rng + ?Sized,
        F: Fn(usize, usize),
    {
        if !(temperature.is_finite() && temperature > 0.0) {
            return Err(MelodyError::invalid_temperature(temperature));
        }
        if window_size == 0 || window_size > self.sequence_length {
            return Err(MelodyError::invalid_window(window_size, self.sequence_length));
        }

        log::info!("Seed: \"{}\"", seed);
        let seed_tokens: Vec<&str> = seed.split_whitespace().collect();
        let mut melody: Vec<String> = seed_tokens.iter().map(|t| t.to_string()).collect();

        for token in seed_tokens.iter().filter(|t| !self.vocabulary.contains(t)) {
            log::warn!("Seed token '{}' is not in the vocabulary", token);
        }

        let start_id = self.vocabulary.id(TERMINATOR_TOKEN);
        let mut context: Vec<usize> = std::iter::repeat(start_id)
            .take(self.sequence_length)
            .chain(self.vocabulary.encode(&seed_tokens))
            .collect();
        log::debug!("Processed seed: {:?}", context);

        for step in 0..num_steps {
            let window_start = context.len().saturating_sub(window_size);
            let logits = self.scorer.score(&context[window_start..])?;
            if logits.len() != self.vocabulary.len() {
                return Err(MelodyError::inference_failed(format!(
                    "model returned {} scores for a vocabulary of {}",
                    logits.len(),
                    self.vocabulary.len()
                )));
            }

            let id = logits.sample(temperature, rng)?;
            context.push(id);
            if context.len() > self.sequence_length {
                let excess = context.len() - self.sequence_length;
                context.drain(..excess);
            }

            on_progress(step + 1, num_steps);

            let symbol = self.vocabulary.token(id).ok_or_else(|| {
                MelodyError::inference_failed(format!("sampled id {} has no token", id))
            })?;
            log::debug!("Generated symbol: {}", symbol);

            if symbol == TERMINATOR_TOKEN {
                break;
            }
            melody.push(symbol.to_string());
        }

        log::info!("Final melody: {}", melody.join(" "));
        Ok(melody)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::models::Logits;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    const TOKENS: [&str; 5] = ["/", "r", "_", "60", "62"];

    fn vocabulary() -> Vocabulary {
        let mapping: HashMap<String, usize> = TOKENS
            .iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i))
            .collect();
        Vocabulary::from_mapping(mapping).unwrap()
    }

    /// Always returns the same scores and records every context it sees.
    struct FixedScorer {
        scores: Vec<f32>,
        seen: Arc<Mutex<Vec<Vec<usize>>>>,
    }

    impl ScoringModel for FixedScorer {
        fn vocab_size(&self) -> usize {
            self.scores.len()
        }

        fn score(&mut self, context: &[usize]) -> Result<Logits> {
            self.seen.lock().unwrap().push(context.to_vec());
            Ok(Logits::from(self.scores.clone()))
        }
    }

    fn generator(scores: Vec<f32>, sequence_length: usize) -> (MelodyGenerator, Arc<Mutex<Vec<Vec<usize>>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let scorer = FixedScorer {
            scores,
            seen: Arc::clone(&seen),
        };
        let generator = MelodyGenerator::new(Box::new(scorer), vocabulary(), sequence_length).unwrap();
        (generator, seen)
    }

    /// Heavily favors token "60", never the terminator.
    fn favor_60() -> Vec<f32> {
        vec![-50.0, 0.0, 0.0, 10.0, 0.0]
    }

    #[test]
    fn zero_steps_returns_seed_without_scoring() {
        let (mut generator, seen) = generator(favor_60(), 8);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let melody = generator.generate("60 _ 60 _", 0, 8, 1.0, &mut rng).unwrap();
        assert_eq!(melody, vec!["60", "_", "60", "_"]);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn respects_step_budget() {
        let (mut generator, seen) = generator(favor_60(), 8);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let melody = generator.generate("62", 5, 4, 1.0, &mut rng).unwrap();
        assert_eq!(melody.len(), 1 + 5);
        assert_eq!(melody[0], "62");
        assert_eq!(seen.lock().unwrap().len(), 5);
        assert!(melody.iter().all(|t| t != TERMINATOR_TOKEN));
    }

    #[test]
    fn stops_at_terminator_and_excludes_it() {
        let (mut generator, seen) = generator(vec![50.0, 0.0, 0.0, 0.0, 0.0], 8);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let melody = generator.generate("60 _", 100, 8, 1.0, &mut rng).unwrap();
        assert_eq!(melody, vec!["60", "_"]);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn low_temperature_is_greedy() {
        let (mut generator, _) = generator(vec![-1.0, 0.5, 1.0, 2.0, 1.9], 8);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let melody = generator.generate("", 20, 8, 0.01, &mut rng).unwrap();
        assert_eq!(melody.len(), 20);
        assert!(melody.iter().all(|t| t == "60"));
    }

    #[test]
    fn fixed_rng_seed_is_reproducible() {
        let scores = vec![-5.0, 1.0, 1.2, 0.8, 1.1];
        let run = |seed| {
            let (mut generator, _) = generator(scores.clone(), 8);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            generator.generate("60", 30, 8, 1.0, &mut rng).unwrap()
        };
        assert_eq!(run(99), run(99));
    }

    #[test]
    fn context_is_primed_and_windowed() {
        let (mut generator, seen) = generator(favor_60(), 6);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        generator.generate("62 _", 3, 4, 0.01, &mut rng).unwrap();

        let seen = seen.lock().unwrap();
        // Padding "/" (id 0) then seed ids, trailing 4 only.
        assert_eq!(seen[0], vec![0, 0, 4, 2]);
        assert_eq!(seen[1], vec![0, 4, 2, 3]);
        assert_eq!(seen[2], vec![4, 2, 3, 3]);
        assert!(seen.iter().all(|c| c.len() == 4));
    }

    #[test]
    fn unmapped_seed_token_becomes_sentinel() {
        let (mut generator, seen) = generator(favor_60(), 4);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let melody = generator.generate("60 xyz", 1, 4, 1.0, &mut rng).unwrap();

        assert_eq!(&melody[..2], &["60".to_string(), "xyz".to_string()]);
        let sentinel = generator.vocabulary().unknown_id();
        assert_eq!(seen.lock().unwrap()[0], vec![0, 0, 3, sentinel]);
    }

    #[test]
    fn progress_reports_each_step() {
        let (mut generator, _) = generator(favor_60(), 8);
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let calls = Mutex::new(Vec::new());
        generator
            .generate_with_progress("60", 3, 8, 1.0, &mut rng, |done, total| {
                calls.lock().unwrap().push((done, total));
            })
            .unwrap();
        assert_eq!(calls.into_inner().unwrap(), vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn rejects_non_positive_temperature() {
        let (mut generator, _) = generator(favor_60(), 8);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for temperature in [0.0, -1.0, f32::NAN] {
            let err = generator
                .generate("60", 1, 8, temperature, &mut rng)
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::ConfigError);
        }
    }

    #[test]
    fn rejects_window_outside_sequence_length() {
        let (mut generator, _) = generator(favor_60(), 8);
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let err = generator.generate("60", 1, 9, 1.0, &mut rng).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);
        let err = generator.generate("60", 1, 0, 1.0, &mut rng).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);
    }

    #[test]
    fn rejects_vocabulary_size_mismatch() {
        let scorer = FixedScorer {
            scores: vec![0.0; 3],
            seen: Arc::new(Mutex::new(Vec::new())),
        };
        let err = MelodyGenerator::new(Box::new(scorer), vocabulary(), 8).unwrap_err();
        assert_eq!(err.code, ErrorCode::LoadError);
    }

    #[test]
    fn load_rejects_unknown_variant() {
        let err = MelodyGenerator::load(&GeneratorConfig::default(), "model9").unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);
    }

    #[test]
    fn load_without_files_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = GeneratorConfig {
            model_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let err = MelodyGenerator::load(&config, "model3").unwrap_err();
        assert_eq!(err.code, ErrorCode::LoadError);
    }
}
