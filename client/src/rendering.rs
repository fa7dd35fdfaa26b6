use crate::entity::{Food, Snake};
use crate::game::{leaderboard, Camera};
use crate::network::ConnectionState;
use crate::world::World;
use macroquad::prelude::*;
use shared::Rgb;

const SEGMENT_SIZE: f32 = 10.0;
const FOOD_SIZE: f32 = 5.0;
const LEADERBOARD_SIZE: usize = 10;

#[derive(Debug, Clone, Copy)]
pub struct HudInfo {
    pub state: ConnectionState,
    pub live: bool,
}

/// Decodes an image file into a texture. Failure leaves the caller on the flat fill.
pub fn texture_from_bytes(bytes: &[u8]) -> Result<Texture2D, Box<dyn std::error::Error>> {
    let image = Image::from_file_with_format(bytes, None).map_err(|e| format!("{:?}", e))?;
    Ok(Texture2D::from_image(&image))
}

fn rgb(color: Rgb) -> Color {
    Color::from_rgba(color.0, color.1, color.2, 255)
}

pub struct Renderer {
    background: Option<Texture2D>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer { background: None }
    }

    pub fn set_background(&mut self, texture: Option<Texture2D>) {
        self.background = texture;
    }

    pub fn render_game(&mut self, world: &World, camera: &Camera, hud: HudInfo) {
        self.draw_background(camera);

        for food in world.foods() {
            self.draw_food(food, camera);
        }

        for snake in world.snakes() {
            self.draw_snake(snake, camera, world.is_player(&snake.id));
        }

        self.draw_hud(world, hud);
    }

    fn draw_background(&mut self, camera: &Camera) {
        clear_background(BLACK);

        let Some(texture) = &self.background else {
            return;
        };

        let tile_w = texture.width() * camera.zoom;
        let tile_h = texture.height() * camera.zoom;
        if tile_w < 1.0 || tile_h < 1.0 {
            return;
        }

        // Anchor the pattern to world origin so it scrolls with the camera
        let (origin_x, origin_y) = camera.world_to_screen(shared::Position::new(0.0, 0.0));
        let start_x = origin_x.rem_euclid(tile_w) - tile_w;
        let start_y = origin_y.rem_euclid(tile_h) - tile_h;

        let mut y = start_y;
        while y < camera.viewport.1 {
            let mut x = start_x;
            while x < camera.viewport.0 {
                draw_texture_ex(
                    texture,
                    x,
                    y,
                    WHITE,
                    DrawTextureParams {
                        dest_size: Some(vec2(tile_w, tile_h)),
                        ..Default::default()
                    },
                );
                x += tile_w;
            }
            y += tile_h;
        }
    }

    fn draw_food(&mut self, food: &Food, camera: &Camera) {
        let (x, y) = camera.world_to_screen(food.position);
        let size = FOOD_SIZE * camera.zoom;
        draw_rectangle(x, y, size, size, rgb(food.color));
    }

    fn draw_snake(&mut self, snake: &Snake, camera: &Camera, is_local_player: bool) {
        let size = SEGMENT_SIZE * camera.zoom;
        let color = rgb(snake.color);

        for segment in snake.body.iter().rev() {
            let (x, y) = camera.world_to_screen(*segment);
            draw_rectangle(x - size / 2.0, y - size / 2.0, size, size, color);
        }

        let (hx, hy) = camera.world_to_screen(snake.head());
        if is_local_player {
            draw_rectangle_lines(hx - size / 2.0, hy - size / 2.0, size, size, 2.0, WHITE);
        }

        let label = if snake.is_bot {
            format!("{} [bot]", snake.name)
        } else {
            snake.name.clone()
        };
        let dims = measure_text(&label, None, 14, 1.0);
        draw_text(&label, hx - dims.width / 2.0, hy - size, 14.0, WHITE);
    }

    fn draw_hud(&mut self, world: &World, hud: HudInfo) {
        let y_start = 10.0;

        let connection_color = match hud.state {
            ConnectionState::Joined if hud.live => GREEN,
            ConnectionState::Joined | ConnectionState::Connecting => YELLOW,
            ConnectionState::Idle | ConnectionState::Disconnected => RED,
        };
        draw_rectangle(10.0, y_start, 8.0, 8.0, connection_color);
        draw_text("CON", 22.0, y_start + 8.0, 14.0, WHITE);

        let player_text = format!("{} players", world.snake_count());
        draw_text(&player_text, 10.0, y_start + 26.0, 14.0, WHITE);
        let food_text = format!("{} food", world.foods().len());
        draw_text(&food_text, 10.0, y_start + 42.0, 14.0, WHITE);

        match world.player() {
            Some(player) => {
                let score_text = format!("Score: {}", player.score);
                draw_text(&score_text, 10.0, y_start + 62.0, 18.0, WHITE);
            }
            None if hud.state == ConnectionState::Connecting => {
                self.draw_centered("Connecting...", screen_height() / 2.0, 28.0, WHITE);
            }
            None => {}
        }

        let x = screen_width() - 200.0;
        draw_text("Leaderboard", x, y_start + 8.0, 18.0, WHITE);
        for (i, entry) in leaderboard(world, LEADERBOARD_SIZE).iter().enumerate() {
            let color = if entry.is_player { GREEN } else { LIGHTGRAY };
            let line = format!("{}. {} - {}", i + 1, entry.name, entry.score);
            draw_text(&line, x, y_start + 28.0 + i as f32 * 16.0, 14.0, color);
        }
    }

    pub fn render_menu(&mut self, name: &str, status: Option<&str>) {
        clear_background(Color::from_rgba(17, 24, 39, 255));

        let mid = screen_height() / 2.0;
        self.draw_centered("SNAKE ARENA", mid - 80.0, 48.0, WHITE);
        self.draw_centered("Type your name and press Enter", mid - 30.0, 20.0, LIGHTGRAY);

        let field = if name.is_empty() { "_" } else { name };
        self.draw_centered(field, mid + 10.0, 32.0, GREEN);

        if let Some(status) = status {
            self.draw_centered(status, mid + 60.0, 18.0, Color::from_rgba(255, 68, 68, 255));
        }
    }

    pub fn draw_notifications<'a>(&mut self, notifications: impl Iterator<Item = &'a str>) {
        let mut y = screen_height() - 20.0;
        let lines: Vec<&str> = notifications.collect();
        for line in lines.iter().rev() {
            draw_text(line, 10.0, y, 16.0, YELLOW);
            y -= 18.0;
        }
    }

    fn draw_centered(&mut self, text: &str, y: f32, size: f32, color: Color) {
        let dims = measure_text(text, None, size as u16, 1.0);
        draw_text(text, (screen_width() - dims.width) / 2.0, y, size, color);
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
