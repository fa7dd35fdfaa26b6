//! Keyboard sampling and compass heading detection
//!
//! Arrow keys and WASD map to one of four headings. A heading is reported for
//! sending only on the frame its key goes down, so the outbound message rate
//! follows direction changes rather than the frame rate.

use macroquad::prelude::{is_key_down, KeyCode};

/// Compass heading; degrees follow screen space (0 = +x, clockwise, +y down).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    Up,
    Right,
    Down,
    Left,
}

impl Heading {
    pub const ALL: [Heading; 4] = [Heading::Up, Heading::Right, Heading::Down, Heading::Left];

    pub fn degrees(self) -> f32 {
        match self {
            Heading::Right => 0.0,
            Heading::Down => 90.0,
            Heading::Left => 180.0,
            Heading::Up => 270.0,
        }
    }

    /// Unit step in world space.
    pub fn unit(self) -> (f32, f32) {
        match self {
            Heading::Right => (1.0, 0.0),
            Heading::Down => (0.0, 1.0),
            Heading::Left => (-1.0, 0.0),
            Heading::Up => (0.0, -1.0),
        }
    }
}

/// Snapshot of the movement keys for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    pub up: bool,
    pub right: bool,
    pub down: bool,
    pub left: bool,
}

impl KeyState {
    /// Reads the current keyboard state (both WASD and arrow keys)
    pub fn sample() -> Self {
        Self {
            up: is_key_down(KeyCode::W) || is_key_down(KeyCode::Up),
            right: is_key_down(KeyCode::D) || is_key_down(KeyCode::Right),
            down: is_key_down(KeyCode::S) || is_key_down(KeyCode::Down),
            left: is_key_down(KeyCode::A) || is_key_down(KeyCode::Left),
        }
    }

    pub fn is_down(&self, heading: Heading) -> bool {
        match heading {
            Heading::Up => self.up,
            Heading::Right => self.right,
            Heading::Down => self.down,
            Heading::Left => self.left,
        }
    }
}

/// Tracks key transitions and the heading used for local prediction
#[derive(Debug, Default)]
pub struct InputSampler {
    previous: KeyState,
    active: Option<Heading>,
}

impl InputSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one frame of key state. Returns the heading to send when a
    /// direction key went down this frame.
    pub fn update(&mut self, keys: KeyState) -> Option<Heading> {
        // Edge detection: current && !previous
        let pressed = Heading::ALL
            .into_iter()
            .filter(|&heading| keys.is_down(heading) && !self.previous.is_down(heading))
            .last();
        self.previous = keys;

        self.active = match (pressed, self.active) {
            (Some(heading), _) => Some(heading),
            (None, Some(active)) if keys.is_down(active) => Some(active),
            _ => Heading::ALL.into_iter().find(|&heading| keys.is_down(heading)),
        };

        pressed
    }

    /// Heading of the most recently pressed key that is still held
    pub fn active_heading(&self) -> Option<Heading> {
        self.active
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
