//! Vocabulary type mapping melody tokens to model ids.
//!
//! The mapping resource is a JSON object of `token -> id` pairs. Ids must be
//! dense (`0..V`) and unique so that the inverse table can be built once at
//! load time.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{MelodyError, Result};

/// Token marking a rest.
pub const REST_TOKEN: &str = "r";

/// Token extending the previous event by one step.
pub const HOLD_TOKEN: &str = "_";

/// Token terminating a melody. Also used as the start-padding symbol.
pub const TERMINATOR_TOKEN: &str = "/";

/// Bidirectional token/id table.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    token_to_id: HashMap<String, usize>,
    id_to_token: Vec<String>,
}

impl Vocabulary {
    /// Builds a vocabulary from a `token -> id` mapping.
    ///
    /// Fails if the mapping is empty or its ids are not exactly `0..len`.
    pub fn from_mapping(mapping: HashMap<String, usize>) -> Result<Self> {
        if mapping.is_empty() {
            return Err(MelodyError::vocabulary_invalid("mapping is empty"));
        }

        let size = mapping.len();
        let mut id_to_token: Vec<Option<String>> = vec![None; size];

        for (token, &id) in &mapping {
            let slot = id_to_token.get_mut(id).ok_or_else(|| {
                MelodyError::vocabulary_invalid(format!(
                    "id {} for token '{}' is outside 0..{}",
                    id, token, size
                ))
            })?;
            if let Some(existing) = slot {
                return Err(MelodyError::vocabulary_invalid(format!(
                    "id {} is assigned to both '{}' and '{}'",
                    id, existing, token
                )));
            }
            *slot = Some(token.clone());
        }

        // Every slot is filled: `size` distinct ids in 0..size.
        let id_to_token = id_to_token.into_iter().flatten().collect();

        Ok(Self {
            token_to_id: mapping,
            id_to_token,
        })
    }

    /// Loads a vocabulary from a JSON mapping file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MelodyError::vocabulary_not_found(path));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            MelodyError::vocabulary_invalid(format!("failed to read {}: {}", path.display(), e))
        })?;

        let mapping: HashMap<String, usize> = serde_json::from_str(&content).map_err(|e| {
            MelodyError::vocabulary_invalid(format!("failed to parse {}: {}", path.display(), e))
        })?;

        Self::from_mapping(mapping)
    }

    /// Number of real tokens in the vocabulary.
    pub fn len(&self) -> usize {
        self.id_to_token.len()
    }

    /// Returns true if the vocabulary has no tokens.
    pub fn is_empty(&self) -> bool {
        self.id_to_token.is_empty()
    }

    /// Sentinel id for tokens outside the vocabulary.
    ///
    /// One past the last real id; it one-hot encodes to an all-zero row.
    pub fn unknown_id(&self) -> usize {
        self.id_to_token.len()
    }

    /// Looks up a token's id, returning the sentinel for unknown tokens.
    pub fn id(&self, token: &str) -> usize {
        self.token_to_id
            .get(token)
            .copied()
            .unwrap_or_else(|| self.unknown_id())
    }

    /// Returns true if the token has an id of its own.
    pub fn contains(&self, token: &str) -> bool {
        self.token_to_id.contains_key(token)
    }

    /// Looks up the token for an id.
    pub fn token(&self, id: usize) -> Option<&str> {
        self.id_to_token.get(id).map(String::as_str)
    }

    /// Maps a sequence of tokens to ids.
    pub fn encode<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<usize> {
        tokens.iter().map(|t| self.id(t.as_ref())).collect()
    }
}
