//! Client-side world entities built from server snapshots

use shared::{display_name, Position, Rgb, SnakeData, DEFAULT_SNAKE_LENGTH, FOOD_VALUE};
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    pub id: String,
    pub name: String,
    pub position: Position,
    /// Heading in degrees, 0 = +x, clockwise
    pub direction: f32,
    /// World units per second
    pub speed: f32,
    /// Head-first trail; never empty
    pub body: VecDeque<Position>,
    pub length: u32,
    pub is_dead: bool,
    pub score: u32,
    pub is_bot: bool,
    pub color: Rgb,
}

impl Snake {
    /// Builds a snake from a server snapshot, filling in the defaults the
    /// server may leave out (name, length, body).
    pub fn from_data(data: SnakeData) -> Self {
        let name = display_name(data.name.as_deref()).to_owned();
        let length = if data.length == 0 {
            DEFAULT_SNAKE_LENGTH
        } else {
            data.length
        };
        let body = if data.body.is_empty() {
            VecDeque::from([data.position])
        } else {
            data.body.into_iter().collect()
        };

        Self {
            id: data.id,
            name,
            position: data.position,
            direction: data.direction,
            speed: data.speed,
            body,
            length,
            is_dead: data.is_dead,
            score: data.score,
            is_bot: data.is_bot,
            color: data.color,
        }
    }

    /// Replaces every field with the snapshot's values. Updates are full
    /// snapshots, never diffs, so nothing from the previous state survives.
    pub fn apply_update(&mut self, data: SnakeData) {
        *self = Snake::from_data(data);
    }

    /// Moves the head to `position`, records it as the newest body segment and
    /// drops the oldest segments beyond `length`.
    pub fn push_head(&mut self, position: Position) {
        self.position = position;
        self.body.push_front(position);

        let max_len = self.length.max(1) as usize;
        while self.body.len() > max_len {
            self.body.pop_back();
        }
    }

    pub fn head(&self) -> Position {
        self.body.front().copied().unwrap_or(self.position)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Food {
    pub position: Position,
    pub value: u32,
    pub color: Rgb,
}

impl Food {
    pub fn new(position: Position, color: Rgb) -> Self {
        Self {
            position,
            value: FOOD_VALUE,
            color,
        }
    }
}
