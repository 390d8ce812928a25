pub mod simulated;

pub use simulated::{DspClock, SimulatedPlayback};

/// The audio subsystem as seen by the timing core.
///
/// Commands are fire-and-forget; the core never waits on completion.
pub trait AudioPlayback {
    /// Whether a clip is loaded and playable.
    fn is_loaded(&self) -> bool;
    fn is_playing(&self) -> bool;
    /// Playback head within the clip, in seconds.
    fn position(&self) -> f64;
    /// Monotonic device clock, in seconds. Keeps running while playback is paused.
    fn dsp_time(&self) -> f64;
    /// Clip length in seconds, if known.
    fn duration(&self) -> Option<f64>;
    /// Starts playback, or continues from the paused head.
    fn play(&mut self);
    fn pause(&mut self);
    fn set_position(&mut self, seconds: f64);
    fn set_rate(&mut self, rate: f64);
}
