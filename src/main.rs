//! melodygen: generate a melody from a seed phrase and save it as a score.

use std::time::Instant;

use anyhow::{bail, Context};

use melodygen::cli::Cli;
use melodygen::config::GeneratorConfig;
use melodygen::generation::{compose_with_progress, MelodyGenerator};
use melodygen::models::available_variants;
use melodygen::types::total_duration;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    let mut config = GeneratorConfig::from_env();
    cli.apply_to(&mut config);
    if let Some(reason) = config.validate() {
        bail!("invalid configuration: {}", reason);
    }

    let selector = cli.model_selector(&config);
    let request = cli.request();

    log::info!("Model: {} ({})", selector, config.effective_model_dir().display());
    log::info!(
        "Steps: {}, window: {}, temperature: {}",
        request.num_steps,
        request.effective_window(config.sequence_length),
        request.temperature
    );
    if let Some(seed) = request.rng_seed {
        log::info!("RNG seed: {}", seed);
    }

    let available = available_variants(&config.effective_model_dir());
    if available.is_empty() {
        log::warn!(
            "No model weights found in {}",
            config.effective_model_dir().display()
        );
    } else {
        let names: Vec<&str> = available.iter().map(|v| v.as_str()).collect();
        log::debug!("Available variants: {}", names.join(", "));
    }

    let mut generator = MelodyGenerator::load(&config, &selector)
        .with_context(|| format!("loading model {}", selector))?;

    let start_time = Instant::now();
    let composition = compose_with_progress(&mut generator, &request, config.tempo_bpm, |done, total| {
        if done % 100 == 0 || done == total {
            log::debug!("Progress: {}/{} steps", done, total);
        }
    })
    .with_context(|| format!("composing {}", request.output.display()))?;

    log::info!(
        "Generated {} tokens, {} events ({:.2} quarter notes) in {:.2}s",
        composition.melody.len(),
        composition.events.len(),
        total_duration(&composition.events),
        start_time.elapsed().as_secs_f32()
    );

    Ok(())
}
