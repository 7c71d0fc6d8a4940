//! CLI argument parser.
//!
//! Provides the command-line interface for generating a melody from a seed
//! phrase and writing it as a score.

use std::path::PathBuf;

use clap::Parser;

use crate::config::GeneratorConfig;
use crate::types::{
    MelodyRequest, DEFAULT_FORMAT, DEFAULT_NUM_STEPS, DEFAULT_OUTPUT_FILE, DEFAULT_SEED,
    DEFAULT_STEP_DURATION, DEFAULT_TEMPERATURE,
};

/// melodygen: seeded melody generation with ONNX sequence models
#[derive(Parser, Debug)]
#[command(name = "melodygen")]
#[command(about = "Generate a melody from a seed phrase and save it as MIDI")]
#[command(version)]
pub struct Cli {
    /// Seed phrase: whitespace-separated MIDI pitches, "r" (rest) and "_" (hold)
    #[arg(long, default_value = DEFAULT_SEED)]
    pub seed: String,

    /// Maximum number of tokens to generate
    #[arg(short = 'n', long, default_value_t = DEFAULT_NUM_STEPS)]
    pub steps: usize,

    /// Context window size (defaults to the model's sequence length)
    #[arg(short, long)]
    pub window: Option<usize>,

    /// Sampling temperature (> 0; lower is more conservative)
    #[arg(short, long, default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f32,

    /// Model variant: model1 (GRU), model2 (LSTM) or model3 (VAE)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Directory containing the exported .onnx files
    #[arg(long)]
    pub model_dir: Option<PathBuf>,

    /// Vocabulary mapping JSON (defaults to mapping.json in the model directory)
    #[arg(long)]
    pub mapping: Option<PathBuf>,

    /// Output score path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format: midi or json
    #[arg(short, long, default_value = DEFAULT_FORMAT)]
    pub format: String,

    /// Quarter-length of one melody step
    #[arg(long, default_value_t = DEFAULT_STEP_DURATION)]
    pub step_duration: f64,

    /// Random seed for reproducible sampling
    #[arg(long)]
    pub rng_seed: Option<u64>,

    /// Context length the model was trained with
    #[arg(long)]
    pub sequence_length: Option<usize>,

    /// Base hidden width of the model
    #[arg(long)]
    pub hidden_size: Option<usize>,

    /// Intra-op threads for ONNX Runtime
    #[arg(long)]
    pub threads: Option<u32>,

    /// Tempo of the written score in BPM
    #[arg(long)]
    pub tempo: Option<u32>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Returns the effective output path.
    ///
    /// Defaults to "generated_melody.mid" in the current directory if not specified.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE))
    }

    /// Returns the variant selector, falling back to the configured default.
    pub fn model_selector(&self, config: &GeneratorConfig) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| config.default_variant.as_str().to_string())
    }

    /// Applies command-line overrides on top of a configuration.
    pub fn apply_to(&self, config: &mut GeneratorConfig) {
        if let Some(ref dir) = self.model_dir {
            config.model_dir = Some(dir.clone());
        }
        if let Some(ref mapping) = self.mapping {
            config.mapping_path = Some(mapping.clone());
        }
        if let Some(len) = self.sequence_length {
            config.sequence_length = len;
        }
        if let Some(size) = self.hidden_size {
            config.hidden_size = size;
        }
        if let Some(threads) = self.threads {
            config.threads = Some(threads);
        }
        if let Some(tempo) = self.tempo {
            config.tempo_bpm = tempo;
        }
    }

    /// Builds the generation request described by the arguments.
    pub fn request(&self) -> MelodyRequest {
        MelodyRequest {
            seed: self.seed.clone(),
            num_steps: self.steps,
            window_size: self.window,
            temperature: self.temperature,
            step_duration: self.step_duration,
            format: self.format.clone(),
            output: self.output_path(),
            rng_seed: self.rng_seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModelVariant;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("melodygen").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_match_reference_run() {
        let cli = parse(&[]);
        assert_eq!(cli.seed, DEFAULT_SEED);
        assert_eq!(cli.steps, 500);
        assert_eq!(cli.temperature, 0.3);
        assert_eq!(cli.format, "midi");
        assert_eq!(cli.output_path(), PathBuf::from("generated_melody.mid"));
        assert!(cli.window.is_none());
    }

    #[test]
    fn request_from_args() {
        let cli = parse(&[
            "--seed", "60 _ 62", "-n", "32", "-w", "16", "-t", "0.8", "--rng-seed", "7", "-o",
            "out.json", "-f", "json",
        ]);
        let request = cli.request();
        assert_eq!(request.seed, "60 _ 62");
        assert_eq!(request.num_steps, 32);
        assert_eq!(request.window_size, Some(16));
        assert_eq!(request.temperature, 0.8);
        assert_eq!(request.rng_seed, Some(7));
        assert_eq!(request.output, PathBuf::from("out.json"));
        assert_eq!(request.format, "json");
    }

    #[test]
    fn overrides_apply_to_config() {
        let cli = parse(&[
            "--model-dir", "/srv/models", "--sequence-length", "32", "--threads", "2", "--tempo",
            "90",
        ]);
        let mut config = GeneratorConfig::default();
        cli.apply_to(&mut config);
        assert_eq!(config.model_dir, Some(PathBuf::from("/srv/models")));
        assert_eq!(config.sequence_length, 32);
        assert_eq!(config.threads, Some(2));
        assert_eq!(config.tempo_bpm, 90);
        assert_eq!(config.hidden_size, 128);
    }

    #[test]
    fn model_selector_falls_back_to_config() {
        let config = GeneratorConfig {
            default_variant: ModelVariant::Vae,
            ..Default::default()
        };
        assert_eq!(parse(&[]).model_selector(&config), "model3");
        assert_eq!(parse(&["-m", "model2"]).model_selector(&config), "model2");
    }

    #[test]
    fn unknown_selector_passes_through_for_validation() {
        let cli = parse(&["--model", "model7"]);
        assert_eq!(cli.model_selector(&GeneratorConfig::default()), "model7");
    }
}
