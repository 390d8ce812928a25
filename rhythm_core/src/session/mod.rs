pub mod store;

use beatmap_schema::ScoreRecord;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::audio::AudioPlayback;
use crate::chart::{Chart, Outcome};
use crate::config::{CompletionPolicy, ConfigError, GameConfig};
use crate::gameplay::{
    ActiveEvent, JudgeCause, JudgeMachine, Judgement, OutcomeSink, Scoreboard, SpawnScheduler,
};
use crate::input::events::InputEvent;
use crate::input::InputQueue;
use crate::time::Clock;

pub use self::store::{MemoryScoreStore, ScoreStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The song played to the end.
    Completed,
    /// Health reached zero.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    Playing,
    Paused,
    Ended(EndReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    AudioNotLoaded,
    ChartEmpty,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error("lane {lane} out of range (lane count {lane_count})")]
    LaneOutOfRange { lane: usize, lane_count: usize },
    #[error("invalid playback rate {0}")]
    InvalidRate(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Started,
    Spawned(ActiveEvent),
    Judged(Judgement),
    Ended {
        reason: EndReason,
        record: ScoreRecord,
        new_high_score: bool,
    },
}

/// Values for the score/combo/accuracy/health displays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hud {
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    pub accuracy: f64,
    pub health: f64,
    /// Most recent judgement; a new one replaces it.
    pub last_judgement: Option<Judgement>,
}

/// Drives one play session: start gating, pause/resume, the per-tick pipeline,
/// end-of-song detection and the high-score hand-off.
pub struct Session<A: AudioPlayback> {
    config: GameConfig,
    chart: Chart,
    audio: A,
    clock: Clock,
    spawner: SpawnScheduler,
    judge: JudgeMachine,
    scoreboard: Scoreboard,
    state: SessionState,
    start_requested: bool,
    /// Set once the device reports playback after the last play command.
    seen_playing: bool,
    previous_high_score: u64,
    store: Option<Box<dyn ScoreStore>>,
    last_judgement: Option<Judgement>,
    final_record: Option<ScoreRecord>,
}

impl<A: AudioPlayback> Session<A> {
    pub fn new(config: GameConfig, chart: Chart, audio: A) -> Result<Self, ConfigError> {
        config.validate()?;
        if chart.lane_count() != config.lane_count {
            return Err(ConfigError::LaneCountMismatch {
                chart: chart.lane_count(),
                config: config.lane_count,
            });
        }

        Ok(Self {
            clock: Clock::new(config.offset),
            judge: JudgeMachine::new(config.judge),
            scoreboard: Scoreboard::new(chart.len(), config.health),
            spawner: SpawnScheduler::new(),
            state: SessionState::NotStarted,
            start_requested: false,
            seen_playing: false,
            previous_high_score: 0,
            store: None,
            last_judgement: None,
            final_record: None,
            config,
            chart,
            audio,
        })
    }

    /// Score to beat before the persistence collaborator is invoked.
    pub fn with_high_score(mut self, score: u64) -> Self {
        self.previous_high_score = score;
        self
    }

    pub fn with_store(mut self, store: impl ScoreStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn judge(&self) -> &JudgeMachine {
        &self.judge
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    pub fn final_record(&self) -> Option<&ScoreRecord> {
        self.final_record.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, SessionState::Ended(_))
    }

    pub fn readiness(&self) -> Readiness {
        if !self.audio.is_loaded() {
            Readiness::AudioNotLoaded
        } else if self.chart.is_empty() {
            Readiness::ChartEmpty
        } else {
            Readiness::Ready
        }
    }

    /// Requests the start of play. Playback begins on the first tick at which the
    /// session is ready.
    pub fn start(&mut self) {
        if self.state == SessionState::NotStarted {
            self.start_requested = true;
        }
    }

    pub fn pause(&mut self) -> bool {
        if self.state != SessionState::Playing {
            return false;
        }
        let now = self.audio.dsp_time();
        self.audio.pause();
        self.clock.pause(now);
        self.state = SessionState::Paused;
        info!(position = self.clock.position(), "session paused");
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state != SessionState::Paused {
            return false;
        }
        let now = self.audio.dsp_time();
        self.clock.resume(now);
        self.audio.play();
        self.seen_playing = false;
        self.state = SessionState::Playing;
        info!(position = self.clock.position(), "session resumed");
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        match self.state {
            SessionState::Playing => self.pause(),
            SessionState::Paused => self.resume(),
            _ => false,
        }
    }

    pub fn set_rate(&mut self, rate: f64) -> Result<(), SessionError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(SessionError::InvalidRate(rate));
        }
        let now = self.audio.dsp_time();
        self.clock.set_rate(rate, now);
        self.audio.set_rate(rate);
        Ok(())
    }

    /// Runs one simulation step: clock refresh, spawning, miss expiry, then end checks.
    pub fn tick(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        match self.state {
            SessionState::NotStarted => {
                if !self.start_requested || !self.try_begin(&mut events) {
                    return events;
                }
            }
            SessionState::Paused | SessionState::Ended(_) => return events,
            SessionState::Playing => {}
        }

        let now = self.audio.dsp_time();
        self.clock.update(now);
        let position = self.clock.position();
        if !self.seen_playing && self.audio.is_playing() {
            self.seen_playing = true;
        }

        let spawned = self.spawner.tick(
            &self.chart,
            position,
            self.config.lead_time,
            self.judge.active_mut(),
        );
        events.extend(spawned.into_iter().map(SessionEvent::Spawned));

        for judgement in self.judge.tick(position) {
            self.apply(judgement);
            events.push(SessionEvent::Judged(judgement));
        }

        if self.config.fail_on_depletion && self.scoreboard.health.is_depleted() {
            self.finish(EndReason::Failed, &mut events);
        } else if self.playback_completed(now) {
            self.flush_unresolved(position, &mut events);
            self.finish(EndReason::Completed, &mut events);
        }

        events
    }

    /// Judges a press at the current song position.
    pub fn press(&mut self, lane: usize) -> Result<Option<Judgement>, SessionError> {
        let now = self.audio.dsp_time();
        let time = self.clock.position().max(self.clock.position_at(now));
        self.press_at(lane, time)
    }

    /// Judges a press stamped with the song position at which it happened.
    pub fn press_at(&mut self, lane: usize, time: f64) -> Result<Option<Judgement>, SessionError> {
        let lane_count = self.chart.lane_count();
        if lane >= lane_count {
            warn!(lane, lane_count, "rejected press on unknown lane");
            return Err(SessionError::LaneOutOfRange { lane, lane_count });
        }
        if self.state != SessionState::Playing {
            debug!(lane, state = ?self.state, "press ignored outside play");
            return Ok(None);
        }

        let judgement = self.judge.on_key_press(lane, time);
        if let Some(judgement) = judgement {
            self.apply(judgement);
        }
        Ok(judgement)
    }

    /// Maps a raw key event through the configured bindings and judges it.
    pub fn handle_input(&mut self, event: &InputEvent) -> Option<Judgement> {
        let press = self.config.key_bindings.translate(event)?;
        self.press_at(press.lane, press.time).ok().flatten()
    }

    /// Judges every queued press, in arrival order.
    pub fn drain_input(&mut self, queue: &InputQueue) -> Vec<Judgement> {
        let mut judgements = Vec::new();
        while let Some(press) = queue.pop() {
            if let Ok(Some(judgement)) = self.press_at(press.lane, press.time) {
                judgements.push(judgement);
            }
        }
        judgements
    }

    pub fn hud(&self) -> Hud {
        Hud {
            score: self.scoreboard.score.score(),
            combo: self.scoreboard.combo.combo,
            max_combo: self.scoreboard.combo.max_combo,
            accuracy: self.scoreboard.accuracy.accuracy(),
            health: self.scoreboard.health.health(),
            last_judgement: self.last_judgement,
        }
    }

    fn try_begin(&mut self, events: &mut Vec<SessionEvent>) -> bool {
        match self.readiness() {
            Readiness::Ready => {}
            not_ready => {
                debug!(?not_ready, "start requested but session not ready");
                return false;
            }
        }

        let now = self.audio.dsp_time();
        self.clock.start(now);
        self.audio.play();
        self.seen_playing = false;
        self.state = SessionState::Playing;
        self.start_requested = false;
        info!(notes = self.chart.len(), "session started");
        events.push(SessionEvent::Started);
        true
    }

    fn apply(&mut self, judgement: Judgement) {
        self.scoreboard.apply(judgement.outcome);
        self.last_judgement = Some(judgement);
        debug!(
            index = judgement.index,
            lane = judgement.lane,
            outcome = ?judgement.outcome,
            error_ms = judgement.error * 1000.0,
            "judged"
        );
    }

    /// A stopped head near zero only counts as the end once playback has been observed;
    /// devices may apply `play` a callback late.
    fn playback_completed(&self, now: f64) -> bool {
        if self.audio.is_playing() {
            return false;
        }
        let rewound = |epsilon: f64| self.seen_playing && self.audio.position() < epsilon;
        match self.config.completion {
            CompletionPolicy::StoppedNearZero { epsilon } => rewound(epsilon),
            CompletionPolicy::ClipDuration { epsilon } => match self.audio.duration() {
                Some(duration) => self.clock.playback_time_at(now) >= duration - epsilon,
                None => rewound(epsilon),
            },
        }
    }

    /// Resolves events still pending when the song ends as Misses.
    fn flush_unresolved(&mut self, position: f64, events: &mut Vec<SessionEvent>) {
        let mut flushed = self.judge.expire_all(position);
        for index in self.spawner.take_remaining(&self.chart) {
            if let Some(event) = self.chart.get(index) {
                flushed.push(Judgement {
                    index,
                    lane: event.lane,
                    outcome: Outcome::Miss,
                    error: position - event.target_time,
                    cause: JudgeCause::Expired,
                });
            }
        }
        if !flushed.is_empty() {
            warn!(count = flushed.len(), "song ended with unresolved events");
        }
        for judgement in flushed {
            self.apply(judgement);
            events.push(SessionEvent::Judged(judgement));
        }
    }

    fn finish(&mut self, reason: EndReason, events: &mut Vec<SessionEvent>) {
        if reason == EndReason::Failed {
            let now = self.audio.dsp_time();
            self.audio.pause();
            self.clock.pause(now);
        }
        self.state = SessionState::Ended(reason);

        let record = self.scoreboard.record();
        let new_high_score = record.score > self.previous_high_score;
        if new_high_score {
            info!(
                score = record.score,
                previous = self.previous_high_score,
                "new high score"
            );
            if let Some(store) = self.store.as_mut() {
                if let Err(err) = store.save(&record) {
                    warn!(error = %err, "failed to persist score");
                }
            }
        } else {
            info!(
                score = record.score,
                high_score = self.previous_high_score,
                "no new high score"
            );
        }

        info!(
            ?reason,
            score = record.score,
            accuracy = record.accuracy,
            rank = %record.rank,
            "session ended"
        );
        self.final_record = Some(record.clone());
        events.push(SessionEvent::Ended {
            reason,
            record,
            new_high_score,
        });
    }
}
