use std::{fs, path::Path};

use anyhow::Context;
use beatmap_schema::DEFAULT_LANE_COUNT;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gameplay::{HealthSettings, JudgeWindows};
use crate::input::KeyBindings;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("lane count must be at least 1")]
    ZeroLanes,
    #[error(
        "judge windows must be finite, positive and ascending \
         (perfect={perfect}, great={great}, miss={miss})"
    )]
    InvalidWindows { perfect: f64, great: f64, miss: f64 },
    #[error("lead time must be finite and non-negative, got {0}")]
    InvalidLeadTime(f64),
    #[error("invalid health settings: {0}")]
    InvalidHealth(String),
    #[error("{bindings} key bindings for {lane_count} lanes")]
    BindingCountMismatch { bindings: usize, lane_count: usize },
    #[error("key {key:?} is bound to more than one lane")]
    DuplicateBinding { key: char },
    #[error("lane {lane} is not bound")]
    UnboundLane { lane: usize },
    #[error("chart has {chart} lanes but config has {config}")]
    LaneCountMismatch { chart: usize, config: usize },
}

/// How the session decides that the song has finished playing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompletionPolicy {
    /// Audio was playing, is now stopped, and the playback head rewound to near zero.
    StoppedNearZero { epsilon: f64 },
    /// Audio is stopped and elapsed song time reached the clip duration.
    /// Falls back to `StoppedNearZero` when the clip duration is unknown.
    ClipDuration { epsilon: f64 },
}

impl Default for CompletionPolicy {
    fn default() -> Self {
        CompletionPolicy::ClipDuration { epsilon: 0.05 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub lane_count: usize,
    /// Seconds before its target time that an event becomes active.
    pub lead_time: f64,
    /// Global audio offset in seconds, subtracted from the song position.
    pub offset: f64,
    pub judge: JudgeWindows,
    pub health: HealthSettings,
    pub completion: CompletionPolicy,
    /// End the session as failed when health reaches zero.
    pub fail_on_depletion: bool,
    pub key_bindings: KeyBindings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            lane_count: DEFAULT_LANE_COUNT,
            lead_time: 1.5,
            offset: 0.0,
            judge: JudgeWindows::default(),
            health: HealthSettings::default(),
            completion: CompletionPolicy::default(),
            fail_on_depletion: true,
            key_bindings: KeyBindings::default(),
        }
    }
}

impl GameConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let src = fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        Self::from_json_str(&src).with_context(|| format!("invalid config: {}", path.display()))
    }

    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: GameConfig = serde_json::from_str(json).context("failed to parse config json")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lane_count == 0 {
            return Err(ConfigError::ZeroLanes);
        }
        if !self.judge.is_valid() {
            return Err(ConfigError::InvalidWindows {
                perfect: self.judge.perfect_ms,
                great: self.judge.great_ms,
                miss: self.judge.miss_ms,
            });
        }
        if !self.lead_time.is_finite() || self.lead_time < 0.0 {
            return Err(ConfigError::InvalidLeadTime(self.lead_time));
        }
        let h = &self.health;
        if !(0.0..=100.0).contains(&h.initial) {
            return Err(ConfigError::InvalidHealth(format!(
                "initial health {} outside [0, 100]",
                h.initial
            )));
        }
        let amounts = [h.perfect_gain, h.great_gain, h.miss_penalty];
        if amounts.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ConfigError::InvalidHealth(
                "gains and penalty must be finite and non-negative".to_string(),
            ));
        }
        if self.key_bindings.lane_count() != self.lane_count {
            return Err(ConfigError::BindingCountMismatch {
                bindings: self.key_bindings.lane_count(),
                lane_count: self.lane_count,
            });
        }
        self.key_bindings.validate()
    }
}
