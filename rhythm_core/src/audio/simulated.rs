use std::fmt;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use atomic_float::AtomicF64;

use crate::audio::AudioPlayback;

/// Shared device clock. The audio thread advances it; readers only load.
#[derive(Clone)]
pub struct DspClock(Arc<AtomicF64>);

impl DspClock {
    pub fn new() -> Self {
        Self(Arc::new(AtomicF64::new(0.0)))
    }

    pub fn now(&self) -> f64 {
        self.0.load(Ordering::Acquire)
    }

    pub fn set(&self, seconds: f64) {
        self.0.store(seconds, Ordering::Release);
    }

    pub fn advance(&self, seconds: f64) {
        self.set(self.now() + seconds);
    }
}

impl Default for DspClock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DspClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DspClock").field(&self.now()).finish()
    }
}

/// Deterministic software playback of a clip of known length.
///
/// The head advances with the DSP clock while playing. When it reaches the end of the clip
/// playback stops and the head rewinds to zero.
#[derive(Debug, Clone)]
pub struct SimulatedPlayback {
    clock: DspClock,
    duration: Option<f64>,
    head: f64,
    playing: bool,
    rate: f64,
    settled_at: f64,
}

impl SimulatedPlayback {
    pub fn new(clock: DspClock) -> Self {
        let settled_at = clock.now();
        Self {
            clock,
            duration: None,
            head: 0.0,
            playing: false,
            rate: 1.0,
            settled_at,
        }
    }

    /// Creates a playback with a clip of `duration` seconds already loaded.
    pub fn with_clip(clock: DspClock, duration: f64) -> Self {
        let mut playback = Self::new(clock);
        playback.load(duration);
        playback
    }

    pub fn load(&mut self, duration: f64) {
        self.settle();
        self.duration = Some(duration.max(0.0));
        self.head = 0.0;
        self.playing = false;
    }

    pub fn unload(&mut self) {
        self.settle();
        self.duration = None;
        self.head = 0.0;
        self.playing = false;
    }

    pub fn dsp_clock(&self) -> DspClock {
        self.clock.clone()
    }

    /// Advances the shared DSP clock.
    pub fn advance(&self, seconds: f64) {
        self.clock.advance(seconds);
    }

    fn state_at(&self, now: f64) -> (f64, bool) {
        if !self.playing {
            return (self.head, false);
        }
        let head = self.head + (now - self.settled_at) * self.rate;
        match self.duration {
            Some(duration) if head >= duration => (0.0, false),
            _ => (head, true),
        }
    }

    fn settle(&mut self) {
        let now = self.clock.now();
        let (head, playing) = self.state_at(now);
        self.head = head;
        self.playing = playing;
        self.settled_at = now;
    }
}

impl AudioPlayback for SimulatedPlayback {
    fn is_loaded(&self) -> bool {
        self.duration.is_some()
    }

    fn is_playing(&self) -> bool {
        self.state_at(self.clock.now()).1
    }

    fn position(&self) -> f64 {
        self.state_at(self.clock.now()).0
    }

    fn dsp_time(&self) -> f64 {
        self.clock.now()
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn play(&mut self) {
        self.settle();
        if self.duration.is_some() {
            self.playing = true;
        }
    }

    fn pause(&mut self) {
        self.settle();
        self.playing = false;
    }

    fn set_position(&mut self, seconds: f64) {
        self.settle();
        let max = self.duration.unwrap_or(f64::MAX);
        self.head = seconds.clamp(0.0, max);
    }

    fn set_rate(&mut self, rate: f64) {
        if !rate.is_finite() || rate <= 0.0 {
            return;
        }
        self.settle();
        self.rate = rate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_follows_dsp_clock_while_playing() {
        let clock = DspClock::new();
        let mut audio = SimulatedPlayback::with_clip(clock.clone(), 10.0);
        assert!(audio.is_loaded());
        assert!(!audio.is_playing());

        audio.play();
        clock.advance(1.5);
        assert!((audio.position() - 1.5).abs() < 1e-9);

        audio.pause();
        clock.advance(3.0);
        assert!((audio.position() - 1.5).abs() < 1e-9);
        assert!(!audio.is_playing());

        audio.play();
        clock.advance(0.5);
        assert!((audio.position() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn completion_stops_and_rewinds() {
        let clock = DspClock::new();
        let mut audio = SimulatedPlayback::with_clip(clock.clone(), 2.0);
        audio.play();
        clock.advance(2.5);
        assert!(!audio.is_playing());
        assert_eq!(audio.position(), 0.0);
    }

    #[test]
    fn rate_scales_head_speed() {
        let clock = DspClock::new();
        let mut audio = SimulatedPlayback::with_clip(clock.clone(), 10.0);
        audio.play();
        clock.advance(1.0);
        audio.set_rate(1.5);
        clock.advance(1.0);
        assert!((audio.position() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn seek_is_clamped_to_clip() {
        let clock = DspClock::new();
        let mut audio = SimulatedPlayback::with_clip(clock.clone(), 4.0);
        audio.set_position(2.5);
        audio.play();
        clock.advance(0.5);
        assert!((audio.position() - 3.0).abs() < 1e-9);

        audio.set_position(-1.0);
        assert_eq!(audio.position(), 0.0);
    }

    #[test]
    fn unloaded_playback_never_plays() {
        let clock = DspClock::new();
        let mut audio = SimulatedPlayback::new(clock.clone());
        audio.play();
        clock.advance(1.0);
        assert!(!audio.is_loaded());
        assert!(!audio.is_playing());
        assert_eq!(audio.duration(), None);
    }
}
