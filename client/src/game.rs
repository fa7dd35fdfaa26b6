use crate::input::Heading;
use crate::world::World;
use log::debug;
use shared::Position;
use std::cmp::Ordering;
use std::time::{Duration, Instant};

const MIN_ZOOM: f32 = 0.5;
const MAX_ZOOM: f32 = 1.5;
const ZOOM_MIN_LENGTH: f32 = 10.0;
const ZOOM_MAX_LENGTH: f32 = 100.0;

/// Measures elapsed time between frames, capped so a long stall (window
/// hidden, debugger break) does not teleport the local player.
#[derive(Debug)]
pub struct FrameClock {
    last: Option<Instant>,
    max_delta: Duration,
}

impl FrameClock {
    pub fn new(max_delta: Duration) -> Self {
        Self {
            last: None,
            max_delta,
        }
    }

    /// Seconds since the previous tick; 0 on the first tick.
    pub fn tick(&mut self, now: Instant) -> f32 {
        let elapsed = self
            .last
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or_default();
        self.last = Some(now);

        if elapsed > self.max_delta {
            debug!(
                "Large frame delta ({:.3}s), capping to {:.3}s",
                elapsed.as_secs_f32(),
                self.max_delta.as_secs_f32()
            );
            return self.max_delta.as_secs_f32();
        }
        elapsed.as_secs_f32()
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Advances the local player along `heading` between server updates.
///
/// The next `UpdateSnake` for the player overwrites whatever this predicted.
/// Returns whether the head moved.
pub fn predict_player(
    world: &mut World,
    heading: Option<Heading>,
    dt: f32,
    bounds: (f32, f32),
) -> bool {
    let (Some(heading), Some(player)) = (heading, world.player_mut()) else {
        return false;
    };

    let step = player.speed * dt;
    let (dx, dy) = heading.unit();
    let next = Position::new(
        (player.position.x + dx * step).clamp(0.0, bounds.0),
        (player.position.y + dy * step).clamp(0.0, bounds.1),
    );

    if next == player.position {
        return false;
    }
    player.push_head(next);
    true
}

/// Camera centred on the local player, zoomed out as the player grows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub center: Position,
    pub zoom: f32,
    pub viewport: (f32, f32),
}

impl Camera {
    pub fn new(viewport: (f32, f32)) -> Self {
        Self {
            center: Position::default(),
            zoom: MAX_ZOOM,
            viewport,
        }
    }

    /// Re-centres on the player; keeps the last centre when there is none.
    pub fn follow(&mut self, world: &World) {
        if let Some(player) = world.player() {
            self.center = player.position;
            self.zoom = zoom_for_length(player.length);
        }
    }

    pub fn world_to_screen(&self, position: Position) -> (f32, f32) {
        (
            (position.x - self.center.x) * self.zoom + self.viewport.0 / 2.0,
            (position.y - self.center.y) * self.zoom + self.viewport.1 / 2.0,
        )
    }

    /// Top-left and bottom-right corners of the visible world rectangle
    pub fn visible_world(&self) -> (Position, Position) {
        let half_w = self.viewport.0 / 2.0 / self.zoom;
        let half_h = self.viewport.1 / 2.0 / self.zoom;
        (
            Position::new(self.center.x - half_w, self.center.y - half_h),
            Position::new(self.center.x + half_w, self.center.y + half_h),
        )
    }
}

/// Zoom factor: fully zoomed in at the starting length, fully out at `ZOOM_MAX_LENGTH`.
pub fn zoom_for_length(length: u32) -> f32 {
    let normalized =
        ((length as f32 - ZOOM_MIN_LENGTH) / (ZOOM_MAX_LENGTH - ZOOM_MIN_LENGTH)).clamp(0.0, 1.0);
    MAX_ZOOM - normalized * (MAX_ZOOM - MIN_ZOOM)
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
    pub is_player: bool,
}

/// Live snakes ranked by score, ties broken by name.
pub fn leaderboard(world: &World, limit: usize) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = world
        .snakes()
        .filter(|snake| !snake.is_dead)
        .map(|snake| LeaderboardEntry {
            name: snake.name.clone(),
            score: snake.score,
            is_player: world.is_player(&snake.id),
        })
        .collect();

    entries.sort_by(|a, b| match b.score.cmp(&a.score) {
        Ordering::Equal => a.name.cmp(&b.name),
        other => other,
    });
    entries.truncate(limit);
    entries
}

/// Per-frame local state: frame timing, prediction and camera
pub struct LocalGame {
    clock: FrameClock,
    camera: Camera,
    bounds: (f32, f32),
}

impl LocalGame {
    pub fn new(viewport: (f32, f32), bounds: (f32, f32), max_delta: Duration) -> Self {
        Self {
            clock: FrameClock::new(max_delta),
            camera: Camera::new(viewport),
            bounds,
        }
    }

    /// Runs one tick of local prediction and moves the camera. Returns the
    /// elapsed seconds used for the tick.
    pub fn update(&mut self, world: &mut World, heading: Option<Heading>, now: Instant) -> f32 {
        let dt = self.clock.tick(now);
        predict_player(world, heading, dt, self.bounds);
        self.camera.follow(world);
        dt
    }

    pub fn set_viewport(&mut self, viewport: (f32, f32)) {
        self.camera.viewport = viewport;
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn reset(&mut self) {
        self.clock.reset();
        self.camera = Camera::new(self.camera.viewport);
    }
}
