//! Generator configuration module.
//!
//! Model location, vocabulary mapping path, trained sequence length and the
//! model's base hidden width, read from the environment with defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::ModelVariant;
use crate::score::midi::MIN_TEMPO_BPM;

/// Default trained context length of the exported models.
pub const DEFAULT_SEQUENCE_LENGTH: usize = 64;

/// Default base hidden width of the exported models.
pub const DEFAULT_HIDDEN_SIZE: usize = 128;

/// Default tempo for written scores.
pub const DEFAULT_TEMPO_BPM: u32 = 120;

/// File name of the vocabulary mapping inside the model directory.
pub const MAPPING_FILE: &str = "mapping.json";

/// Runtime configuration for loading and running a generator.
///
/// Built from defaults, then environment variables, then command-line overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Directory containing the exported `.onnx` files.
    /// If None, uses the platform-specific default data location.
    pub model_dir: Option<PathBuf>,

    /// Path to the `token -> id` JSON mapping.
    /// If None, uses `mapping.json` inside the model directory.
    pub mapping_path: Option<PathBuf>,

    /// Context length the models were trained with. Also the length of the
    /// start-symbol padding and the upper bound on the window size.
    pub sequence_length: usize,

    /// Base hidden width of the models.
    pub hidden_size: usize,

    /// Number of threads for intra-op parallelism in ONNX Runtime.
    /// If None, uses ONNX Runtime's default.
    pub threads: Option<u32>,

    /// Model variant used when none is selected explicitly.
    pub default_variant: ModelVariant,

    /// Tempo written into MIDI scores.
    pub tempo_bpm: u32,
}

impl GeneratorConfig {
    /// Creates a GeneratorConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a GeneratorConfig from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `MELODYGEN_MODEL_DIR` - Directory with the `.onnx` files
    /// - `MELODYGEN_MAPPING_PATH` - Vocabulary mapping file
    /// - `MELODYGEN_SEQUENCE_LENGTH` - Trained context length
    /// - `MELODYGEN_HIDDEN_SIZE` - Base hidden width
    /// - `MELODYGEN_THREADS` - Intra-op thread count
    /// - `MELODYGEN_MODEL` - Default variant (model1, model2, model3)
    /// - `MELODYGEN_TEMPO` - Score tempo in BPM
    ///
    /// Falls back to defaults for unset or unparsable variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("MELODYGEN_MODEL_DIR") {
            config.model_dir = Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var("MELODYGEN_MAPPING_PATH") {
            config.mapping_path = Some(PathBuf::from(path));
        }

        if let Ok(len_str) = std::env::var("MELODYGEN_SEQUENCE_LENGTH") {
            if let Ok(len) = len_str.parse::<usize>() {
                if len > 0 {
                    config.sequence_length = len;
                }
            }
        }

        if let Ok(size_str) = std::env::var("MELODYGEN_HIDDEN_SIZE") {
            if let Ok(size) = size_str.parse::<usize>() {
                if size > 0 {
                    config.hidden_size = size;
                }
            }
        }

        if let Ok(threads_str) = std::env::var("MELODYGEN_THREADS") {
            if let Ok(threads) = threads_str.parse::<u32>() {
                if threads > 0 {
                    config.threads = Some(threads);
                }
            }
        }

        if let Ok(variant_str) = std::env::var("MELODYGEN_MODEL") {
            if let Some(variant) = ModelVariant::parse(&variant_str) {
                config.default_variant = variant;
            }
        }

        if let Ok(tempo_str) = std::env::var("MELODYGEN_TEMPO") {
            if let Ok(tempo) = tempo_str.parse::<u32>() {
                if tempo > 0 {
                    config.tempo_bpm = tempo;
                }
            }
        }

        config
    }

    /// Returns the effective model directory, using platform defaults if not specified.
    pub fn effective_model_dir(&self) -> PathBuf {
        if let Some(ref path) = self.model_dir {
            path.clone()
        } else {
            default_model_dir()
        }
    }

    /// Returns the effective mapping path, defaulting to the model directory.
    pub fn effective_mapping_path(&self) -> PathBuf {
        if let Some(ref path) = self.mapping_path {
            path.clone()
        } else {
            self.effective_model_dir().join(MAPPING_FILE)
        }
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails, None otherwise.
    pub fn validate(&self) -> Option<String> {
        if self.sequence_length == 0 {
            return Some("sequence_length must be > 0".to_string());
        }

        if self.hidden_size == 0 {
            return Some("hidden_size must be > 0".to_string());
        }

        if let Some(threads) = self.threads {
            if threads == 0 {
                return Some("threads must be > 0".to_string());
            }
            if threads > 256 {
                return Some(format!("threads too high: {} (max 256)", threads));
            }
        }

        if self.tempo_bpm < MIN_TEMPO_BPM || self.tempo_bpm > 400 {
            return Some(format!(
                "tempo must be between {} and 400 BPM, got {}",
                MIN_TEMPO_BPM, self.tempo_bpm
            ));
        }

        None
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model_dir: None,
            mapping_path: None,
            sequence_length: DEFAULT_SEQUENCE_LENGTH,
            hidden_size: DEFAULT_HIDDEN_SIZE,
            threads: None,
            default_variant: ModelVariant::default(),
            tempo_bpm: DEFAULT_TEMPO_BPM,
        }
    }
}

/// Returns the platform-specific default model storage path.
///
/// Uses the `directories` crate to find appropriate locations:
/// - macOS: ~/Library/Application Support/melodygen/models
/// - Linux: ~/.local/share/melodygen/models
/// - Windows: C:\Users\<user>\AppData\Roaming\melodygen\data\models
fn default_model_dir() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "melodygen") {
        proj_dirs.data_dir().join("models")
    } else {
        // Fallback to current directory
        PathBuf::from("./models")
    }
}
