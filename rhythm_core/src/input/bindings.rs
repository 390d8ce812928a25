use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::input::events::{InputEvent, KeyPress};

/// Lane → key mapping. Index `i` holds the key for lane `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyBindings {
    keys: Vec<char>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            keys: vec!['a', 's', ';', '\''],
        }
    }
}

impl KeyBindings {
    pub fn new(keys: Vec<char>) -> Self {
        Self {
            keys: keys.into_iter().map(|k| k.to_ascii_lowercase()).collect(),
        }
    }

    pub fn lane_count(&self) -> usize {
        self.keys.len()
    }

    pub fn keys(&self) -> &[char] {
        &self.keys
    }

    pub fn lane_for(&self, key: char) -> Option<usize> {
        let key = key.to_ascii_lowercase();
        self.keys.iter().position(|&k| k == key)
    }

    pub fn key_for(&self, lane: usize) -> Option<char> {
        self.keys.get(lane).copied()
    }

    pub fn set_binding(&mut self, lane: usize, key: char) -> Result<(), ConfigError> {
        let key = key.to_ascii_lowercase();
        if lane >= self.keys.len() {
            return Err(ConfigError::UnboundLane { lane });
        }
        if let Some(other) = self.lane_for(key) {
            if other != lane {
                return Err(ConfigError::DuplicateBinding { key });
            }
        }
        self.keys[lane] = key;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, key) in self.keys.iter().enumerate() {
            if self.keys[..i].contains(key) {
                return Err(ConfigError::DuplicateBinding { key: *key });
            }
        }
        Ok(())
    }

    /// Maps a key-down event to a lane press. Releases and unbound keys yield `None`.
    pub fn translate(&self, event: &InputEvent) -> Option<KeyPress> {
        if !event.pressed {
            return None;
        }
        let lane = self.lane_for(event.key)?;
        Some(KeyPress {
            lane,
            time: event.timestamp,
        })
    }
}
