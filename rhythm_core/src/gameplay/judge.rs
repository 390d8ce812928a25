use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chart::{ChartEvent, Outcome};

/// Absorbs f64 noise from subtracting second-based timestamps near a window edge.
const WINDOW_EPSILON_MS: f64 = 1e-6;

/// Judgement windows in milliseconds (half-width).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JudgeWindows {
    pub perfect_ms: f64,
    pub great_ms: f64,
    pub miss_ms: f64,
}

impl Default for JudgeWindows {
    fn default() -> Self {
        Self {
            perfect_ms: 50.0,
            great_ms: 100.0,
            miss_ms: 150.0,
        }
    }
}

impl JudgeWindows {
    pub fn miss_seconds(&self) -> f64 {
        self.miss_ms / 1000.0
    }

    /// Windows must be finite, positive and ascending.
    pub fn is_valid(&self) -> bool {
        let finite = [self.perfect_ms, self.great_ms, self.miss_ms]
            .iter()
            .all(|w| w.is_finite());
        finite
            && self.perfect_ms > 0.0
            && self.perfect_ms <= self.great_ms
            && self.great_ms <= self.miss_ms
    }

    /// Classifies a signed timing error in seconds.
    pub fn classify(&self, error: f64) -> Outcome {
        let error_ms = (error * 1000.0).abs();
        if error_ms <= self.perfect_ms + WINDOW_EPSILON_MS {
            Outcome::Perfect
        } else if error_ms <= self.great_ms + WINDOW_EPSILON_MS {
            Outcome::Great
        } else {
            Outcome::Miss
        }
    }
}

/// A chart event that has been spawned and is waiting to be judged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveEvent {
    /// Index into the chart; stable identity for removal.
    pub index: usize,
    pub lane: usize,
    pub target_time: f64,
    pub spawned_at: f64,
}

impl ActiveEvent {
    pub fn new(index: usize, event: &ChartEvent, spawned_at: f64) -> Self {
        Self {
            index,
            lane: event.lane,
            target_time: event.target_time,
            spawned_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JudgeCause {
    /// Matched by a key press.
    Hit,
    /// Passed the miss window without a press.
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Judgement {
    pub index: usize,
    pub lane: usize,
    pub outcome: Outcome,
    /// Signed timing error in seconds, negative = early.
    pub error: f64,
    pub cause: JudgeCause,
}

/// Active events keyed by chart index.
///
/// Iteration is in ascending index order so expiry emits outcomes reproducibly.
#[derive(Debug, Clone, Default)]
pub struct ActiveSet {
    events: BTreeMap<usize, ActiveEvent>,
}

impl ActiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the index is already active.
    pub fn insert(&mut self, event: ActiveEvent) -> bool {
        if self.events.contains_key(&event.index) {
            return false;
        }
        self.events.insert(event.index, event);
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<ActiveEvent> {
        self.events.remove(&index)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.events.contains_key(&index)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveEvent> {
        self.events.values()
    }

    pub fn in_lane(&self, lane: usize) -> impl Iterator<Item = &ActiveEvent> {
        self.events.values().filter(move |e| e.lane == lane)
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = ActiveEvent> + '_ {
        std::mem::take(&mut self.events).into_values()
    }
}

/// Matches key presses against active events and expires events that pass the miss window.
#[derive(Debug, Clone, Default)]
pub struct JudgeMachine {
    pub windows: JudgeWindows,
    active: ActiveSet,
}

impl JudgeMachine {
    pub fn new(windows: JudgeWindows) -> Self {
        Self {
            windows,
            active: ActiveSet::new(),
        }
    }

    pub fn active(&self) -> &ActiveSet {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut ActiveSet {
        &mut self.active
    }

    pub fn on_key_press(&mut self, lane: usize, position: f64) -> Option<Judgement> {
        // Nearest in time wins; equidistant candidates fall back to the earlier
        // target time, then the lower chart index.
        let candidate = self
            .active
            .in_lane(lane)
            .min_by(|a, b| {
                let da = (position - a.target_time).abs();
                let db = (position - b.target_time).abs();
                da.total_cmp(&db)
                    .then(a.target_time.total_cmp(&b.target_time))
                    .then(a.index.cmp(&b.index))
            })
            .copied();

        let Some(candidate) = candidate else {
            debug!(lane, position, "press with no active event in lane");
            return None;
        };

        if position < candidate.target_time - self.windows.miss_seconds() {
            debug!(
                lane,
                position,
                target = candidate.target_time,
                "press before earliest window; ignored"
            );
            return None;
        }

        let error = position - candidate.target_time;
        let outcome = self.windows.classify(error);
        self.active.remove(candidate.index);

        Some(Judgement {
            index: candidate.index,
            lane,
            outcome,
            error,
            cause: JudgeCause::Hit,
        })
    }

    /// Expires every active event whose miss window has passed.
    pub fn tick(&mut self, position: f64) -> Vec<Judgement> {
        let miss_window = self.windows.miss_seconds();
        let expired: Vec<ActiveEvent> = self
            .active
            .iter()
            .filter(|e| position - e.target_time > miss_window)
            .copied()
            .collect();

        expired
            .into_iter()
            .filter_map(|e| self.active.remove(e.index))
            .map(|e| Judgement {
                index: e.index,
                lane: e.lane,
                outcome: Outcome::Miss,
                error: position - e.target_time,
                cause: JudgeCause::Expired,
            })
            .collect()
    }

    /// Resolves every remaining active event as a Miss.
    pub fn expire_all(&mut self, position: f64) -> Vec<Judgement> {
        self.active
            .drain()
            .map(|e| Judgement {
                index: e.index,
                lane: e.lane,
                outcome: Outcome::Miss,
                error: position - e.target_time,
                cause: JudgeCause::Expired,
            })
            .collect()
    }
}
