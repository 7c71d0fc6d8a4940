//! Run-length decoding of melody tokens into musical events.
//!
//! Each non-hold token opens a run; every following `"_"` extends it by one
//! step. A run's event is emitted when the next run opens or the melody ends.

use crate::error::{MelodyError, Result};
use crate::types::{MusicalEvent, HOLD_TOKEN, REST_TOKEN};

/// Highest valid MIDI note number.
const MAX_PITCH: u8 = 127;

/// Decodes a melody into notes and rests.
///
/// The first token always opens a run, even when it is `"_"`; such a leading
/// hold has no pitch to sustain and decodes to a rest. The summed duration of
/// the result is `melody.len() * step_duration`.
pub fn decode_melody<S: AsRef<str>>(melody: &[S], step_duration: f64) -> Result<Vec<MusicalEvent>> {
    if !(step_duration.is_finite() && step_duration > 0.0) {
        return Err(MelodyError::invalid_step_duration(step_duration));
    }

    let mut events = Vec::new();
    // (symbol, position of the symbol, steps in the run)
    let mut open: Option<(&str, usize, u32)> = None;

    for (position, token) in melody.iter().enumerate() {
        let token = token.as_ref();
        if token == HOLD_TOKEN {
            if let Some((_, _, steps)) = open.as_mut() {
                *steps += 1;
                continue;
            }
        }

        if let Some((symbol, start, steps)) = open.take() {
            events.push(run_event(symbol, start, steps, step_duration)?);
        }
        open = Some((token, position, 1));
    }

    if let Some((symbol, start, steps)) = open {
        events.push(run_event(symbol, start, steps, step_duration)?);
    }

    Ok(events)
}

fn run_event(symbol: &str, position: usize, steps: u32, step_duration: f64) -> Result<MusicalEvent> {
    let duration = step_duration * steps as f64;

    if symbol == REST_TOKEN || symbol == HOLD_TOKEN {
        return Ok(MusicalEvent::Rest { duration });
    }

    let pitch = symbol
        .parse::<u8>()
        .ok()
        .filter(|p| *p <= MAX_PITCH)
        .ok_or_else(|| MelodyError::invalid_pitch(symbol, position))?;

    Ok(MusicalEvent::Note { pitch, duration })
}
