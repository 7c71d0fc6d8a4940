//! Score output.
//!
//! Decodes melodies into events and writes them as a MIDI file or a JSON
//! event listing.

pub mod decode;
pub mod midi;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::config::DEFAULT_TEMPO_BPM;
use crate::error::{MelodyError, Result};
use crate::types::MusicalEvent;

pub use decode::decode_melody;
pub use midi::{events_to_smf, write_midi, write_midi_to_buffer, MIN_TEMPO_BPM, TICKS_PER_QUARTER};

/// Supported score formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreFormat {
    /// Standard MIDI file.
    Midi,
    /// JSON listing of the decoded events.
    Json,
}

impl ScoreFormat {
    /// Parses a format name, failing with an IO_ERROR for unsupported formats.
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "midi" | "mid" => Ok(ScoreFormat::Midi),
            "json" => Ok(ScoreFormat::Json),
            _ => Err(MelodyError::unsupported_format(s)),
        }
    }
}

#[derive(Serialize)]
struct JsonScore<'a> {
    tempo_bpm: u32,
    events: &'a [MusicalEvent],
}

/// Writes events as a pretty-printed JSON document.
pub fn write_json(events: &[MusicalEvent], path: &Path, tempo_bpm: u32) -> Result<()> {
    let file = File::create(path).map_err(|e| MelodyError::write_failed(path, e))?;
    write_json_to(BufWriter::new(file), events, tempo_bpm)
        .map_err(|e| MelodyError::write_failed(path, e))
}

/// Serializes the JSON score into `writer` and flushes it.
fn write_json_to<W: Write>(
    mut writer: W,
    events: &[MusicalEvent],
    tempo_bpm: u32,
) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, &JsonScore { tempo_bpm, events })?;
    writer.flush()
}

/// Decodes a melody and writes it at the default tempo.
///
/// Returns the decoded events.
pub fn save_melody<S: AsRef<str>>(
    melody: &[S],
    step_duration: f64,
    format: &str,
    path: &Path,
) -> Result<Vec<MusicalEvent>> {
    save_melody_with_tempo(melody, step_duration, format, path, DEFAULT_TEMPO_BPM)
}

/// Decodes a melody and writes it in `format` to `path`.
pub fn save_melody_with_tempo<S: AsRef<str>>(
    melody: &[S],
    step_duration: f64,
    format: &str,
    path: &Path,
    tempo_bpm: u32,
) -> Result<Vec<MusicalEvent>> {
    let format = ScoreFormat::parse(format)?;
    let events = decode_melody(melody, step_duration)?;

    match format {
        ScoreFormat::Midi => write_midi(&events, path, tempo_bpm)?,
        ScoreFormat::Json => write_json(&events, path, tempo_bpm)?,
    }

    log::info!("Melody saved to {}", path.display());
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use tempfile::tempdir;

    const MELODY: [&str; 6] = ["60", "_", "62", "r", "_", "_"];

    #[test]
    fn format_parsing() {
        assert_eq!(ScoreFormat::parse("midi").unwrap(), ScoreFormat::Midi);
        assert_eq!(ScoreFormat::parse("MID").unwrap(), ScoreFormat::Midi);
        assert_eq!(ScoreFormat::parse("json").unwrap(), ScoreFormat::Json);

        let err = ScoreFormat::parse("musicxml").unwrap_err();
        assert_eq!(err.code, ErrorCode::IoError);
        assert!(err.message.contains("musicxml"));
    }

    #[test]
    fn saves_midi() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("generated_melody.mid");
        let events = save_melody(&MELODY, 0.25, "midi", &path).unwrap();
        assert_eq!(events.len(), 3);

        let bytes = std::fs::read(&path).unwrap();
        assert!(midly::Smf::parse(&bytes).is_ok());
    }

    #[test]
    fn saves_json_listing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("melody.json");
        save_melody_with_tempo(&MELODY, 0.25, "json", &path, 90).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["tempo_bpm"], 90);
        assert_eq!(value["events"].as_array().unwrap().len(), 3);
        assert_eq!(value["events"][2]["kind"], "rest");
        assert_eq!(value["events"][2]["duration"], 0.75);
    }

    #[test]
    fn unsupported_format_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("melody.xml");
        let err = save_melody(&MELODY, 0.25, "musicxml", &path).unwrap_err();
        assert_eq!(err.code, ErrorCode::IoError);
        assert!(!path.exists());
    }

    #[test]
    fn decode_error_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("melody.mid");
        let err = save_melody(&["60", "x"], 0.25, "midi", &path).unwrap_err();
        assert_eq!(err.code, ErrorCode::DecodeError);
        assert!(!path.exists());
    }

    #[test]
    fn unwritable_json_path_is_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no").join("melody.json");
        let err = save_melody(&MELODY, 0.25, "json", &path).unwrap_err();
        assert_eq!(err.code, ErrorCode::IoError);
    }

    /// Accepts writes but fails to flush, like a full disk.
    struct FailingFlush(Vec<u8>);

    impl Write for FailingFlush {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "no space left"))
        }
    }

    #[test]
    fn failed_json_flush_is_reported() {
        let events = decode_melody(&MELODY, 0.25).unwrap();
        let buffered = BufWriter::new(FailingFlush(Vec::new()));
        let err = write_json_to(buffered, &events, 120).unwrap_err();
        assert!(err.to_string().contains("no space left"));
    }
}
