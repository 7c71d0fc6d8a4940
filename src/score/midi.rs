//! MIDI output from decoded melodies.
//!
//! Converts a monophonic event stream into a Standard MIDI File (format 0,
//! one track). Event boundaries are computed from cumulative quarter-lengths
//! and rounded once, so long melodies do not drift.

use std::path::Path;

use midly::{
    num::{u15, u24, u28, u4, u7},
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
};

use crate::error::{ErrorCode, MelodyError, Result};
use crate::types::MusicalEvent;

/// Ticks per quarter note in MIDI output.
pub const TICKS_PER_QUARTER: u16 = 480;

/// Note-on velocity for generated notes.
const VELOCITY: u8 = 90;

/// MIDI channel used for the melody.
const CHANNEL: u8 = 0;

/// Slowest tempo whose microseconds per quarter fit a 24-bit tempo event.
pub const MIN_TEMPO_BPM: u32 = 4;

/// Convert events to MIDI and write to a file.
pub fn write_midi(events: &[MusicalEvent], path: &Path, tempo_bpm: u32) -> Result<()> {
    let buf = write_midi_to_buffer(events, tempo_bpm)?;
    std::fs::write(path, &buf).map_err(|e| MelodyError::write_failed(path, e))
}

/// Convert events to MIDI file bytes.
pub fn write_midi_to_buffer(events: &[MusicalEvent], tempo_bpm: u32) -> Result<Vec<u8>> {
    let smf = events_to_smf(events, tempo_bpm)?;
    let mut buf = Vec::new();
    smf.write_std(&mut buf)
        .map_err(|e| MelodyError::with_source(ErrorCode::IoError, "Failed to encode MIDI", e))?;
    Ok(buf)
}

/// Convert events to an in-memory SMF.
///
/// Fails with CONFIG_ERROR when the tempo does not fit a MIDI tempo event and
/// with IO_ERROR when a position exceeds the largest MIDI delta time.
pub fn events_to_smf(events: &[MusicalEvent], tempo_bpm: u32) -> Result<Smf<'static>> {
    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    let mut track: Track<'static> = Vec::new();
    let tempo = u24::try_from(60_000_000 / tempo_bpm.max(1)).ok_or_else(|| {
        MelodyError::invalid_config(format!(
            "tempo {} BPM cannot be written to MIDI (minimum {})",
            tempo_bpm, MIN_TEMPO_BPM
        ))
    })?;
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(tempo)),
    });

    let channel = u4::new(CHANNEL);
    let mut elapsed_quarters = 0.0f64;
    let mut last_event_tick: u32 = 0;

    for event in events {
        let start_tick = quarters_to_ticks(elapsed_quarters)?;
        elapsed_quarters += event.duration();
        let end_tick = quarters_to_ticks(elapsed_quarters)?;

        // Rests only advance time; the gap lands on the next event's delta.
        let MusicalEvent::Note { pitch, .. } = *event else {
            continue;
        };

        track.push(TrackEvent {
            delta: delta(start_tick - last_event_tick)?,
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn {
                    key: u7::new(pitch),
                    vel: u7::new(VELOCITY),
                },
            },
        });
        track.push(TrackEvent {
            delta: delta(end_tick - start_tick)?,
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOff {
                    key: u7::new(pitch),
                    vel: u7::new(0),
                },
            },
        });
        last_event_tick = end_tick;
    }

    // A trailing rest is kept as the delta before end of track.
    let total_tick = quarters_to_ticks(elapsed_quarters)?;
    track.push(TrackEvent {
        delta: delta(total_tick - last_event_tick)?,
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    smf.tracks.push(track);
    Ok(smf)
}

/// Absolute tick for a quarter-length offset. Every tick must fit a delta.
fn quarters_to_ticks(quarters: f64) -> Result<u32> {
    let ticks = (quarters * TICKS_PER_QUARTER as f64).round();
    if !ticks.is_finite() || ticks < 0.0 || ticks > u28::max_value().as_int() as f64 {
        return Err(too_long(quarters));
    }
    Ok(ticks as u32)
}

fn delta(ticks: u32) -> Result<u28> {
    u28::try_from(ticks).ok_or_else(|| too_long(ticks as f64 / TICKS_PER_QUARTER as f64))
}

fn too_long(quarters: f64) -> MelodyError {
    MelodyError::new(
        ErrorCode::IoError,
        format!(
            "Melody position {} quarter notes exceeds the MIDI time range",
            quarters
        ),
    )
}
