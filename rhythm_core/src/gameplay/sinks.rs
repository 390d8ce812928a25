use beatmap_schema::{OutcomeCounts, Rank, ScoreRecord};
use serde::{Deserialize, Serialize};

use crate::chart::Outcome;

pub const MAX_SCORE: f64 = 1_000_000.0;
pub const MAX_HEALTH: f64 = 100.0;

/// A reducer over the outcome stream.
pub trait OutcomeSink {
    fn apply(&mut self, outcome: Outcome);
}

#[derive(Debug, Clone, Default)]
pub struct ScoreSink {
    perfect_value: f64,
    total: f64,
}

impl ScoreSink {
    pub fn new(total_notes: usize) -> Self {
        let perfect_value = if total_notes > 0 {
            MAX_SCORE / total_notes as f64
        } else {
            0.0
        };
        Self {
            perfect_value,
            total: 0.0,
        }
    }

    pub fn perfect_value(&self) -> f64 {
        self.perfect_value
    }

    /// Display score. Accumulated as f64 and rounded only here, so an all-Perfect run
    /// lands on exactly `MAX_SCORE`.
    pub fn score(&self) -> u64 {
        self.total.round() as u64
    }

    pub fn raw(&self) -> f64 {
        self.total
    }
}

impl OutcomeSink for ScoreSink {
    fn apply(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Perfect => self.total += self.perfect_value,
            Outcome::Great => self.total += self.perfect_value * 0.8,
            Outcome::Miss => {}
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ComboSink {
    pub combo: u32,
    pub max_combo: u32,
}

impl OutcomeSink for ComboSink {
    fn apply(&mut self, outcome: Outcome) {
        if outcome.breaks_combo() {
            self.combo = 0;
        } else {
            self.combo += 1;
            self.max_combo = self.max_combo.max(self.combo);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AccuracySink {
    counts: OutcomeCounts,
}

impl AccuracySink {
    pub fn counts(&self) -> OutcomeCounts {
        self.counts
    }

    pub fn judged(&self) -> u32 {
        self.counts.judged()
    }

    /// Weighted accuracy in percent. Reports 100 before anything is judged.
    pub fn accuracy(&self) -> f64 {
        let judged = self.counts.judged();
        if judged == 0 {
            return 100.0;
        }
        let weight = self.counts.perfect as f64 * Outcome::Perfect.weight()
            + self.counts.great as f64 * Outcome::Great.weight();
        weight * 100.0 / judged as f64
    }
}

impl OutcomeSink for AccuracySink {
    fn apply(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Perfect => self.counts.perfect += 1,
            Outcome::Great => self.counts.great += 1,
            Outcome::Miss => self.counts.miss += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthSettings {
    pub initial: f64,
    pub perfect_gain: f64,
    pub great_gain: f64,
    pub miss_penalty: f64,
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            initial: MAX_HEALTH,
            perfect_gain: 2.0,
            great_gain: 1.0,
            miss_penalty: 10.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HealthSink {
    settings: HealthSettings,
    health: f64,
}

impl HealthSink {
    pub fn new(settings: HealthSettings) -> Self {
        Self {
            health: settings.initial.clamp(0.0, MAX_HEALTH),
            settings,
        }
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn is_depleted(&self) -> bool {
        self.health <= 0.0
    }
}

impl Default for HealthSink {
    fn default() -> Self {
        Self::new(HealthSettings::default())
    }
}

impl OutcomeSink for HealthSink {
    fn apply(&mut self, outcome: Outcome) {
        let delta = match outcome {
            Outcome::Perfect => self.settings.perfect_gain,
            Outcome::Great => self.settings.great_gain,
            Outcome::Miss => -self.settings.miss_penalty,
        };
        self.health = (self.health + delta).clamp(0.0, MAX_HEALTH);
    }
}

/// All progression sinks, fed in lockstep.
#[derive(Debug, Clone)]
pub struct Scoreboard {
    pub score: ScoreSink,
    pub combo: ComboSink,
    pub accuracy: AccuracySink,
    pub health: HealthSink,
}

impl Scoreboard {
    pub fn new(total_notes: usize, health: HealthSettings) -> Self {
        Self {
            score: ScoreSink::new(total_notes),
            combo: ComboSink::default(),
            accuracy: AccuracySink::default(),
            health: HealthSink::new(health),
        }
    }

    pub fn record(&self) -> ScoreRecord {
        let accuracy = self.accuracy.accuracy();
        ScoreRecord {
            score: self.score.score(),
            accuracy,
            rank: Rank::from_accuracy(accuracy),
            max_combo: self.combo.max_combo,
            counts: self.accuracy.counts(),
        }
    }
}

impl OutcomeSink for Scoreboard {
    fn apply(&mut self, outcome: Outcome) {
        self.score.apply(outcome);
        self.combo.apply(outcome);
        self.accuracy.apply(outcome);
        self.health.apply(outcome);
    }
}
