//! Error types for melodygen.
//!
//! Defines the error codes and the error type used throughout the crate for
//! consistent error handling and reporting.

use std::fmt;
use std::path::Path;

/// Error codes identifying the class of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Invalid caller-supplied setting.
    /// Trigger: unknown model variant, non-positive temperature, window size
    /// outside 1..=sequence length, non-positive step duration.
    ConfigError,

    /// Failed to load a persisted resource.
    /// Trigger: missing or corrupt weights file, missing or malformed vocabulary.
    LoadError,

    /// A melody token could not be turned into a musical event.
    /// Trigger: token that is neither "r", "_" nor an integer MIDI pitch.
    DecodeError,

    /// Failed to persist a score.
    /// Trigger: unwritable destination or unsupported output format.
    IoError,

    /// Model scoring failed during generation.
    /// Trigger: tensor creation failure, session run failure, malformed output.
    InferenceFailed,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::LoadError => "LOAD_ERROR",
            ErrorCode::DecodeError => "DECODE_ERROR",
            ErrorCode::IoError => "IO_ERROR",
            ErrorCode::InferenceFailed => "INFERENCE_FAILED",
        }
    }

    /// Returns a human-readable description of the error.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::ConfigError => "Invalid generation or model configuration",
            ErrorCode::LoadError => "Failed to load model weights or vocabulary",
            ErrorCode::DecodeError => "Melody contains a token that is not a note, rest or hold",
            ErrorCode::IoError => "Failed to write the score file",
            ErrorCode::InferenceFailed => "Model scoring failed during generation",
        }
    }

    /// Returns a recovery hint suggesting how to resolve this error.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCode::ConfigError => {
                "Use one of model1/model2/model3, a temperature above 0, \
                 and a window size between 1 and the model's sequence length"
            }
            ErrorCode::LoadError => {
                "Check --model-dir and --mapping point at the exported .onnx files and \
                 mapping.json, and that the model was exported for this vocabulary"
            }
            ErrorCode::DecodeError => {
                "Seed and vocabulary tokens must be MIDI pitches (0-127), \"r\" or \"_\""
            }
            ErrorCode::IoError => {
                "Check the output directory exists and is writable, \
                 and use --format midi or --format json"
            }
            ErrorCode::InferenceFailed => {
                "Verify the model takes a one-hot [1, window, vocab] input, \
                 or try a smaller window"
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for melodygen operations.
#[derive(Debug)]
pub struct MelodyError {
    /// The error code identifying the type of error.
    pub code: ErrorCode,
    /// Human-readable error message with context.
    pub message: String,
    /// Optional underlying cause of the error.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl MelodyError {
    /// Creates a new MelodyError with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new MelodyError with an underlying cause.
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a CONFIG_ERROR for an unrecognized model variant selector.
    pub fn unknown_variant(selector: &str) -> Self {
        Self::new(
            ErrorCode::ConfigError,
            format!(
                "Invalid model type '{}' (expected model1, model2 or model3)",
                selector
            ),
        )
    }

    /// Creates a CONFIG_ERROR for a temperature that is not a positive number.
    pub fn invalid_temperature(temperature: f32) -> Self {
        Self::new(
            ErrorCode::ConfigError,
            format!("Invalid temperature: {} (must be > 0)", temperature),
        )
    }

    /// Creates a CONFIG_ERROR for a window size outside 1..=sequence_length.
    pub fn invalid_window(window_size: usize, sequence_length: usize) -> Self {
        Self::new(
            ErrorCode::ConfigError,
            format!(
                "Invalid window size: {} (must be between 1 and {})",
                window_size, sequence_length
            ),
        )
    }

    /// Creates a CONFIG_ERROR for a step duration that is not a positive number.
    pub fn invalid_step_duration(step_duration: f64) -> Self {
        Self::new(
            ErrorCode::ConfigError,
            format!("Invalid step duration: {} (must be > 0)", step_duration),
        )
    }

    /// Creates a CONFIG_ERROR from a configuration validation message.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ConfigError,
            format!("Invalid configuration: {}", reason.into()),
        )
    }

    /// Creates a LOAD_ERROR for a weights file that does not exist.
    pub fn model_not_found(path: &Path) -> Self {
        Self::new(
            ErrorCode::LoadError,
            format!("Model weights not found at: {}", path.display()),
        )
    }

    /// Creates a LOAD_ERROR for a weights file that could not be loaded.
    pub fn model_load_failed(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::LoadError,
            format!("Failed to load model: {}", reason.into()),
        )
    }

    /// Creates a LOAD_ERROR for a vocabulary mapping that does not exist.
    pub fn vocabulary_not_found(path: &Path) -> Self {
        Self::new(
            ErrorCode::LoadError,
            format!("Vocabulary mapping not found at: {}", path.display()),
        )
    }

    /// Creates a LOAD_ERROR for a vocabulary mapping that is malformed.
    pub fn vocabulary_invalid(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::LoadError,
            format!("Invalid vocabulary mapping: {}", reason.into()),
        )
    }

    /// Creates a DECODE_ERROR for a token that is not a valid pitch.
    pub fn invalid_pitch(token: &str, position: usize) -> Self {
        Self::new(
            ErrorCode::DecodeError,
            format!(
                "Token '{}' at position {} is not a MIDI pitch (0-127), rest or hold",
                token, position
            ),
        )
    }

    /// Creates an IO_ERROR for an output format the writers do not support.
    pub fn unsupported_format(format: &str) -> Self {
        Self::new(
            ErrorCode::IoError,
            format!("Unsupported output format: '{}'", format),
        )
    }

    /// Creates an IO_ERROR for a score file that could not be written.
    pub fn write_failed(
        path: &Path,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::with_source(
            ErrorCode::IoError,
            format!("Failed to write score to {}", path.display()),
            source,
        )
    }

    /// Creates an INFERENCE_FAILED error.
    pub fn inference_failed(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InferenceFailed,
            format!("Inference failed: {}", reason.into()),
        )
    }
}

impl fmt::Display for MelodyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}. Recovery: {}",
            self.code,
            self.message,
            self.code.recovery_hint()
        )
    }
}

impl std::error::Error for MelodyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Result type alias using MelodyError.
pub type Result<T> = std::result::Result<T, MelodyError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::path::PathBuf;

    #[test]
    fn error_code_as_str() {
        assert_eq!(ErrorCode::ConfigError.as_str(), "CONFIG_ERROR");
        assert_eq!(ErrorCode::LoadError.as_str(), "LOAD_ERROR");
        assert_eq!(ErrorCode::DecodeError.as_str(), "DECODE_ERROR");
        assert_eq!(ErrorCode::IoError.as_str(), "IO_ERROR");
        assert_eq!(ErrorCode::InferenceFailed.as_str(), "INFERENCE_FAILED");
    }

    #[test]
    fn error_code_recovery_hints_not_empty() {
        for code in [
            ErrorCode::ConfigError,
            ErrorCode::LoadError,
            ErrorCode::DecodeError,
            ErrorCode::IoError,
            ErrorCode::InferenceFailed,
        ] {
            assert!(!code.recovery_hint().is_empty());
            assert!(!code.description().is_empty());
        }
    }

    #[test]
    fn melody_error_display() {
        let err = MelodyError::invalid_window(128, 64);
        assert_eq!(err.code, ErrorCode::ConfigError);
        assert!(err.to_string().contains("CONFIG_ERROR"));
        assert!(err.to_string().contains("128"));
        assert!(err.to_string().contains("Recovery:"));
    }

    #[test]
    fn load_errors_name_the_path() {
        let err = MelodyError::model_not_found(&PathBuf::from("/models/model_vae.onnx"));
        assert_eq!(err.code, ErrorCode::LoadError);
        assert!(err.message.contains("/models/model_vae.onnx"));
    }

    #[test]
    fn write_failed_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = MelodyError::write_failed(&PathBuf::from("out.mid"), io);
        assert_eq!(err.code, ErrorCode::IoError);
        assert!(err.source().is_some());
    }
}
