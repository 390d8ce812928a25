use tracing::{debug, warn};

/// Song-position clock derived from the audio device's DSP time.
///
/// `position = (dsp_now - start_reference) * rate + anchor - offset`, frozen while paused.
/// Resuming shifts `start_reference` forward by the pause duration, so the position
/// continues from where it stopped.
#[derive(Debug, Clone)]
pub struct Clock {
    offset: f64,
    rate: f64,
    start_reference: f64,
    /// Playback time accumulated before the last rate change.
    anchor: f64,
    pause_started_at: Option<f64>,
    running: bool,
    last_position: f64,
}

impl Clock {
    pub fn new(offset: f64) -> Self {
        Self {
            offset,
            rate: 1.0,
            start_reference: 0.0,
            anchor: 0.0,
            pause_started_at: None,
            running: false,
            last_position: 0.0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.pause_started_at.is_some()
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn start(&mut self, dsp_now: f64) {
        self.start_reference = dsp_now;
        self.anchor = 0.0;
        self.pause_started_at = None;
        self.running = true;
        self.last_position = self.position_at(dsp_now);
        debug!(dsp_now, "clock started");
    }

    pub fn pause(&mut self, dsp_now: f64) {
        if !self.running || self.pause_started_at.is_some() {
            return;
        }
        self.last_position = self.last_position.max(self.position_at(dsp_now));
        self.pause_started_at = Some(dsp_now);
    }

    pub fn resume(&mut self, dsp_now: f64) {
        if let Some(paused_at) = self.pause_started_at.take() {
            self.start_reference += dsp_now - paused_at;
        }
    }

    /// Changes the playback rate without moving the current position.
    pub fn set_rate(&mut self, rate: f64, dsp_now: f64) {
        if !rate.is_finite() || rate <= 0.0 {
            warn!(rate, "ignoring invalid playback rate");
            return;
        }
        if self.running {
            let effective_now = self.pause_started_at.unwrap_or(dsp_now);
            self.anchor = self.playback_time_at(dsp_now);
            self.start_reference = effective_now;
        }
        self.rate = rate;
    }

    /// Refreshes the cached position. Called once per tick.
    pub fn update(&mut self, dsp_now: f64) {
        if !self.running || self.pause_started_at.is_some() {
            return;
        }
        // Device clocks can report a slightly stale value between buffer callbacks.
        self.last_position = self.last_position.max(self.position_at(dsp_now));
    }

    /// Position cached by the last `update`.
    pub fn position(&self) -> f64 {
        self.last_position
    }

    pub fn position_at(&self, dsp_now: f64) -> f64 {
        if !self.running {
            return 0.0;
        }
        self.playback_time_at(dsp_now) - self.offset
    }

    /// Elapsed song time without the global offset applied.
    pub fn playback_time_at(&self, dsp_now: f64) -> f64 {
        if !self.running {
            return 0.0;
        }
        let effective_now = self.pause_started_at.unwrap_or(dsp_now);
        self.anchor + (effective_now - self.start_reference) * self.rate
    }

    pub fn position_in_beats(&self, bpm: f64) -> f64 {
        if bpm <= 0.0 {
            return 0.0;
        }
        self.last_position / (60.0 / bpm)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(0.0)
    }
}
