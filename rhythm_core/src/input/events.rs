/// Raw key transition from the platform input layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputEvent {
    /// Song position (seconds) when the event occurred.
    pub timestamp: f64,
    pub key: char,
    pub pressed: bool,
}

/// A lane press, ready for judgement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyPress {
    pub lane: usize,
    /// Song position (seconds) of the press.
    pub time: f64,
}
