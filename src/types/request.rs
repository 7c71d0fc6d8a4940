//! MelodyRequest type describing one generate-and-save run.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{MelodyError, Result};

/// Seed phrase used when the caller does not supply one.
pub const DEFAULT_SEED: &str = "67 _ 67 _ 67 _ _ 65 64 _ 64 _ 64 _ _";

/// Default upper bound on generated tokens.
pub const DEFAULT_NUM_STEPS: usize = 500;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Default quarter-length of one melody step (a sixteenth note).
pub const DEFAULT_STEP_DURATION: f64 = 0.25;

/// Default score format.
pub const DEFAULT_FORMAT: &str = "midi";

/// Default score file name.
pub const DEFAULT_OUTPUT_FILE: &str = "generated_melody.mid";

/// A request to generate a melody and write it as a score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MelodyRequest {
    /// Whitespace-delimited seed tokens (may be empty).
    pub seed: String,

    /// Upper bound on generated tokens.
    pub num_steps: usize,

    /// Context window size. None uses the model's sequence length.
    pub window_size: Option<usize>,

    /// Sampling temperature (> 0).
    pub temperature: f32,

    /// Quarter-length of one melody step (> 0).
    pub step_duration: f64,

    /// Output format name ("midi" or "json").
    pub format: String,

    /// Output file path.
    pub output: PathBuf,

    /// Random seed for reproducible sampling. None draws from OS entropy.
    pub rng_seed: Option<u64>,
}

impl Default for MelodyRequest {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED.to_string(),
            num_steps: DEFAULT_NUM_STEPS,
            window_size: None,
            temperature: DEFAULT_TEMPERATURE,
            step_duration: DEFAULT_STEP_DURATION,
            format: DEFAULT_FORMAT.to_string(),
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
            rng_seed: None,
        }
    }
}

impl MelodyRequest {
    /// Creates a request for the given seed with default settings.
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            ..Default::default()
        }
    }

    /// Returns the window size to use for a model with the given sequence length.
    pub fn effective_window(&self, sequence_length: usize) -> usize {
        self.window_size.unwrap_or(sequence_length)
    }

    /// Validates request parameters against the model's sequence length.
    pub fn validate(&self, sequence_length: usize) -> Result<()> {
        if !(self.temperature.is_finite() && self.temperature > 0.0) {
            return Err(MelodyError::invalid_temperature(self.temperature));
        }

        let window = self.effective_window(sequence_length);
        if window == 0 || window > sequence_length {
            return Err(MelodyError::invalid_window(window, sequence_length));
        }

        if !(self.step_duration.is_finite() && self.step_duration > 0.0) {
            return Err(MelodyError::invalid_step_duration(self.step_duration));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn defaults_match_reference_run() {
        let request = MelodyRequest::default();
        assert_eq!(request.seed, DEFAULT_SEED);
        assert_eq!(request.num_steps, 500);
        assert_eq!(request.temperature, 0.3);
        assert_eq!(request.step_duration, 0.25);
        assert_eq!(request.format, "midi");
        assert_eq!(request.output, PathBuf::from("generated_melody.mid"));
    }

    #[test]
    fn window_defaults_to_sequence_length() {
        let request = MelodyRequest::new("60 _");
        assert_eq!(request.effective_window(64), 64);

        let request = MelodyRequest {
            window_size: Some(16),
            ..MelodyRequest::new("60 _")
        };
        assert_eq!(request.effective_window(64), 16);
    }

    #[test]
    fn validation() {
        let request = MelodyRequest::new("60");
        assert!(request.validate(64).is_ok());

        let hot = MelodyRequest {
            temperature: 0.0,
            ..request.clone()
        };
        assert_eq!(hot.validate(64).unwrap_err().code, ErrorCode::ConfigError);

        let wide = MelodyRequest {
            window_size: Some(65),
            ..request.clone()
        };
        assert_eq!(wide.validate(64).unwrap_err().code, ErrorCode::ConfigError);

        let empty_window = MelodyRequest {
            window_size: Some(0),
            ..request.clone()
        };
        assert!(empty_window.validate(64).is_err());

        let no_step = MelodyRequest {
            step_duration: -0.25,
            ..request
        };
        assert_eq!(no_step.validate(64).unwrap_err().code, ErrorCode::ConfigError);
    }
}
