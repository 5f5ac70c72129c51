//! Input routing
//!
//! Keyboard, click, and press-and-hold gestures collapse into two actions:
//! jump and duck. A short press is a jump; holding past the threshold ducks
//! until release.

pub use crate::sim::Action;
use crate::sim::TickInput;

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    ArrowUp,
    ArrowDown,
    Other,
}

impl Key {
    /// Map a DOM `KeyboardEvent.code`
    pub fn from_code(code: &str) -> Self {
        match code {
            "Space" => Key::Space,
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            _ => Key::Other,
        }
    }
}

/// Default press-and-hold threshold
pub const HOLD_TO_DUCK_MS: f64 = 200.0;

/// State of the single tracked pointer
#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    None,
    /// Down, waiting to see if it becomes a hold
    Pressed { deadline_ms: f64 },
    /// Hold fired; ducking until release
    Holding,
}

/// Normalizes raw input into an ordered queue of actions for the next tick
#[derive(Debug, Clone)]
pub struct InputRouter {
    hold_ms: f64,
    gesture: Gesture,
    pending: Vec<Action>,
}

impl Default for InputRouter {
    fn default() -> Self {
        Self::new(HOLD_TO_DUCK_MS)
    }
}

impl InputRouter {
    pub fn new(hold_ms: f64) -> Self {
        Self {
            hold_ms,
            gesture: Gesture::None,
            pending: Vec::new(),
        }
    }

    pub fn set_hold_threshold(&mut self, hold_ms: f64) {
        self.hold_ms = hold_ms;
    }

    /// Returns true if the key was consumed (caller should prevent default)
    pub fn key_down(&mut self, key: Key) -> bool {
        match key {
            Key::Space | Key::ArrowUp => {
                self.pending.push(Action::Jump);
                true
            }
            Key::ArrowDown => {
                self.pending.push(Action::Duck(true));
                true
            }
            Key::Other => false,
        }
    }

    /// Returns true if the key was consumed
    pub fn key_up(&mut self, key: Key) -> bool {
        match key {
            Key::ArrowDown => {
                self.pending.push(Action::Duck(false));
                true
            }
            Key::Space | Key::ArrowUp => true,
            Key::Other => false,
        }
    }

    /// Pointer pressed; arms the hold timer
    ///
    /// A hold whose release was never reported ends here first.
    pub fn pointer_down(&mut self, now_ms: f64) {
        if self.gesture == Gesture::Holding {
            self.pending.push(Action::Duck(false));
        }
        self.gesture = Gesture::Pressed {
            deadline_ms: now_ms + self.hold_ms,
        };
    }

    /// Pointer released: a tap jumps, a hold stops ducking
    pub fn pointer_up(&mut self, now_ms: f64) {
        self.poll(now_ms);
        match self.gesture {
            Gesture::Pressed { .. } => self.pending.push(Action::Jump),
            Gesture::Holding => self.pending.push(Action::Duck(false)),
            Gesture::None => {}
        }
        self.gesture = Gesture::None;
    }

    /// Pointer cancelled by the host; never counts as a tap
    pub fn pointer_cancel(&mut self) {
        if self.gesture == Gesture::Holding {
            self.pending.push(Action::Duck(false));
        }
        self.gesture = Gesture::None;
    }

    /// Fire the hold timer if its deadline has passed
    pub fn poll(&mut self, now_ms: f64) {
        if let Gesture::Pressed { deadline_ms } = self.gesture {
            if now_ms >= deadline_ms {
                self.gesture = Gesture::Holding;
                self.pending.push(Action::Duck(true));
            }
        }
    }

    /// Whether a press is waiting on the hold timer
    pub fn hold_armed(&self) -> bool {
        matches!(self.gesture, Gesture::Pressed { .. })
    }

    /// Drain queued actions in arrival order
    pub fn drain(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.pending)
    }

    /// Poll the hold timer and hand queued actions to one tick, in order
    pub fn take_tick_input(&mut self, now_ms: f64) -> TickInput {
        self.poll(now_ms);
        TickInput {
            actions: self.drain(),
            now_ms,
        }
    }

    /// Drop queued actions and any armed hold timer
    pub fn reset(&mut self) {
        self.gesture = Gesture::None;
        self.pending.clear();
    }
}
