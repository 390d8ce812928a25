pub mod bindings;
pub mod events;

use self::events::KeyPress;
use crossbeam_channel::{unbounded, Receiver, Sender};

pub use self::bindings::KeyBindings;

/// Lane presses flowing from the input source to the judgement engine.
pub struct InputQueue {
    sender: Sender<KeyPress>,
    receiver: Receiver<KeyPress>,
}

impl InputQueue {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// Safe to call from the input thread while the tick loop drains.
    pub fn push(&self, press: KeyPress) {
        let _ = self.sender.send(press);
    }

    /// Non-blocking.
    pub fn pop(&self) -> Option<KeyPress> {
        self.receiver.try_recv().ok()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Producer handle for an input thread.
    pub fn sender(&self) -> Sender<KeyPress> {
        self.sender.clone()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
