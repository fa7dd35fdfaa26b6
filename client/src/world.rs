//! Locally cached world state
//!
//! The store owns every entity. The local player is tracked by id only, so
//! there is exactly one copy of the player's snake: the entry in `snakes`.
//! Every operation that removes a snake also clears a matching player id.

use crate::entity::{Food, Snake};
use log::debug;
use shared::{Position, Rgb, SnakeData};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Result of an insert-or-update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
}

#[derive(Debug, Default)]
pub struct World {
    snakes: HashMap<String, Snake>,
    foods: Vec<Food>,
    player_id: Option<String>,
    epoch: u64,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snakes(&self) -> impl Iterator<Item = &Snake> {
        self.snakes.values()
    }

    pub fn snake(&self, id: &str) -> Option<&Snake> {
        self.snakes.get(id)
    }

    pub fn snake_count(&self) -> usize {
        self.snakes.len()
    }

    pub fn foods(&self) -> &[Food] {
        &self.foods
    }

    pub fn player_id(&self) -> Option<&str> {
        self.player_id.as_deref()
    }

    pub fn is_player(&self, id: &str) -> bool {
        self.player_id.as_deref() == Some(id)
    }

    pub fn player(&self) -> Option<&Snake> {
        self.player_id.as_ref().and_then(|id| self.snakes.get(id))
    }

    pub fn player_mut(&mut self) -> Option<&mut Snake> {
        let id = self.player_id.as_ref()?;
        self.snakes.get_mut(id)
    }

    /// Counter bumped on every reset; async work tagged with an older epoch is stale.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Registers the locally controlled snake: inserts it and points the player id at it.
    pub fn init_player(&mut self, data: SnakeData) -> &Snake {
        let id = data.id.clone();
        self.player_id = Some(id.clone());
        match self.snakes.entry(id) {
            Entry::Occupied(entry) => {
                let snake = entry.into_mut();
                snake.apply_update(data);
                snake
            }
            Entry::Vacant(entry) => entry.insert(Snake::from_data(data)),
        }
    }

    /// Inserts a snake, overwriting any existing entry with the same id.
    pub fn insert_snake(&mut self, data: SnakeData) {
        let snake = Snake::from_data(data);
        self.snakes.insert(snake.id.clone(), snake);
    }

    /// Full-replaces a known snake, or inserts it when the update outran its creation event.
    pub fn upsert_snake(&mut self, data: SnakeData) -> Upsert {
        match self.snakes.get_mut(&data.id) {
            Some(snake) => {
                snake.apply_update(data);
                Upsert::Updated
            }
            None => {
                debug!("Update for unknown snake {}, inserting", data.id);
                self.insert_snake(data);
                Upsert::Inserted
            }
        }
    }

    /// Removes a snake; unknown ids are a no-op.
    pub fn remove_snake(&mut self, id: &str) -> Option<Snake> {
        let removed = self.snakes.remove(id);
        if removed.is_some() && self.is_player(id) {
            self.player_id = None;
        }
        removed
    }

    /// Appends one food per position, all sharing `color`.
    pub fn spawn_foods(&mut self, positions: &[Position], color: Rgb) -> usize {
        self.foods
            .extend(positions.iter().map(|&position| Food::new(position, color)));
        positions.len()
    }

    /// Removes every food at exactly `position`.
    ///
    /// Matching is exact `f32` equality on both axes; the server echoes back the
    /// coordinates it spawned, so no tolerance is applied.
    pub fn remove_food_at(&mut self, position: Position) -> usize {
        let before = self.foods.len();
        self.foods.retain(|food| food.position != position);
        before - self.foods.len()
    }

    /// Drops every entity and the player id, and starts a new epoch.
    pub fn clear(&mut self) {
        self.snakes.clear();
        self.foods.clear();
        self.player_id = None;
        self.epoch = self.epoch.wrapping_add(1);
    }

    pub fn is_empty(&self) -> bool {
        self.snakes.is_empty() && self.foods.is_empty() && self.player_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::tests::snake_data;

    #[test]
    fn test_init_player_populates_map_and_alias() {
        let mut world = World::new();
        world.init_player(snake_data("p1"));

        assert_eq!(world.snake_count(), 1);
        assert_eq!(world.player_id(), Some("p1"));
        assert_eq!(world.player().map(|p| p.id.as_str()), Some("p1"));
    }

    #[test]
    fn test_player_alias_shares_the_map_entry() {
        let mut world = World::new();
        world.init_player(snake_data("p1"));

        if let Some(player) = world.player_mut() {
            player.score = 7;
        }
        assert_eq!(world.snake("p1").map(|s| s.score), Some(7));
    }

    #[test]
    fn test_remove_player_clears_alias() {
        let mut world = World::new();
        world.init_player(snake_data("p1"));
        world.insert_snake(snake_data("p2"));

        assert!(world.remove_snake("p1").is_some());
        assert!(world.snake("p1").is_none());
        assert!(world.player_id().is_none());
        assert!(world.player().is_none());
        assert_eq!(world.snake_count(), 1);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut world = World::new();
        world.init_player(snake_data("p1"));

        assert!(world.remove_snake("ghost").is_none());
        assert_eq!(world.player_id(), Some("p1"));
        assert_eq!(world.snake_count(), 1);
    }

    #[test]
    fn test_upsert_updates_or_inserts() {
        let mut world = World::new();
        assert_eq!(world.upsert_snake(snake_data("p2")), Upsert::Inserted);

        let mut update = snake_data("p2");
        update.score = 42;
        assert_eq!(world.upsert_snake(update), Upsert::Updated);
        assert_eq!(world.snake("p2").map(|s| s.score), Some(42));
        assert_eq!(world.snake_count(), 1);
    }

    #[test]
    fn test_spawn_and_remove_food_exact_match() {
        let mut world = World::new();
        let added = world.spawn_foods(
            &[
                Position::new(1.0, 1.0),
                Position::new(2.0, 2.0),
                Position::new(2.0001, 2.0),
            ],
            Rgb(255, 0, 0),
        );
        assert_eq!(added, 3);
        assert!(world.foods().iter().all(|f| f.color == Rgb(255, 0, 0)));

        assert_eq!(world.remove_food_at(Position::new(2.0, 2.0)), 1);
        assert_eq!(world.foods().len(), 2);
        assert!(world
            .foods()
            .iter()
            .any(|f| f.position == Position::new(2.0001, 2.0)));
    }

    #[test]
    fn test_clear_resets_everything_and_bumps_epoch() {
        let mut world = World::new();
        world.init_player(snake_data("p1"));
        world.insert_snake(snake_data("p2"));
        world.spawn_foods(&[Position::new(3.0, 3.0)], Rgb(0, 0, 255));
        let epoch = world.epoch();

        world.clear();

        assert!(world.is_empty());
        assert_eq!(world.snake_count(), 0);
        assert!(world.foods().is_empty());
        assert!(world.player().is_none());
        assert_eq!(world.epoch(), epoch + 1);
    }
}
