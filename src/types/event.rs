//! MusicalEvent type produced by melody decoding.

use serde::{Deserialize, Serialize};

/// A single timed note or rest.
///
/// Durations are quarter-lengths: a multiple of the decoding step duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MusicalEvent {
    /// A sounding MIDI pitch.
    Note {
        /// MIDI note number (0-127).
        pitch: u8,
        /// Length in quarter notes.
        duration: f64,
    },
    /// Silence.
    Rest {
        /// Length in quarter notes.
        duration: f64,
    },
}

impl MusicalEvent {
    /// Returns the event length in quarter notes.
    pub fn duration(&self) -> f64 {
        match self {
            MusicalEvent::Note { duration, .. } | MusicalEvent::Rest { duration } => *duration,
        }
    }

    /// Returns the pitch, or None for a rest.
    pub fn pitch(&self) -> Option<u8> {
        match self {
            MusicalEvent::Note { pitch, .. } => Some(*pitch),
            MusicalEvent::Rest { .. } => None,
        }
    }

    /// Returns true if this is a rest.
    pub fn is_rest(&self) -> bool {
        matches!(self, MusicalEvent::Rest { .. })
    }
}

/// Sums the durations of a sequence of events.
pub fn total_duration(events: &[MusicalEvent]) -> f64 {
    events.iter().map(MusicalEvent::duration).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let note = MusicalEvent::Note {
            pitch: 60,
            duration: 0.5,
        };
        let rest = MusicalEvent::Rest { duration: 0.75 };

        assert_eq!(note.pitch(), Some(60));
        assert_eq!(rest.pitch(), None);
        assert!(rest.is_rest());
        assert!(!note.is_rest());
        assert_eq!(total_duration(&[note, rest]), 1.25);
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_string(&MusicalEvent::Rest { duration: 0.25 }).unwrap();
        assert_eq!(json, r#"{"kind":"rest","duration":0.25}"#);

        let note: MusicalEvent =
            serde_json::from_str(r#"{"kind":"note","pitch":62,"duration":1.0}"#).unwrap();
        assert_eq!(note.pitch(), Some(62));
    }
}
