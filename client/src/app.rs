//! Frame loop wiring the connection, world, input, prediction and drawing together

use crate::assets::AssetLoader;
use crate::config::ClientConfig;
use crate::game::LocalGame;
use crate::input::{InputSampler, KeyState};
use crate::network::{ConnectionManager, SessionEvent};
use crate::rendering::{texture_from_bytes, HudInfo, Renderer};
use crate::ui::{MenuInput, Screen, UiShell};
use crate::world::World;
use log::{error, info};
use macroquad::prelude::*;
use shared::{ClientMessage, WORLD_HEIGHT, WORLD_WIDTH};
use std::time::Instant;
use tokio::runtime::Handle;

pub struct App {
    config: ClientConfig,
    world: World,
    connection: ConnectionManager,
    input: InputSampler,
    game: LocalGame,
    assets: AssetLoader,
    renderer: Renderer,
    ui: UiShell,
    /// Set once the settle delay after joining has elapsed
    live: bool,
}

impl App {
    pub fn new(config: ClientConfig, runtime: Handle) -> Self {
        let (width, height) = config.window_size;
        let connection =
            ConnectionManager::new(&config.server_url, config.settle_delay, runtime.clone());

        Self {
            world: World::new(),
            connection,
            input: InputSampler::new(),
            game: LocalGame::new(
                (width as f32, height as f32),
                (WORLD_WIDTH, WORLD_HEIGHT),
                config.max_frame_delta,
            ),
            assets: AssetLoader::new(runtime),
            renderer: Renderer::new(),
            ui: UiShell::new(config.name.clone()),
            live: false,
            config,
        }
    }

    pub async fn run(&mut self) {
        info!("Controls: arrows/WASD to steer, Esc to leave");

        loop {
            let now = Instant::now();

            for event in self.connection.poll(&mut self.world, now) {
                self.handle_session_event(event, now);
            }

            match self.ui.screen() {
                Screen::Menu => self.menu_frame(),
                Screen::Playing => self.game_frame(now),
            }

            self.renderer.draw_notifications(self.ui.notifications(now));

            next_frame().await;
        }
    }

    fn handle_session_event(&mut self, event: SessionEvent, now: Instant) {
        match event {
            SessionEvent::Ready => {
                self.live = true;
                self.input.reset();
                self.game.reset();
                self.assets
                    .request(self.config.background.clone(), self.world.epoch());
            }
            SessionEvent::Notification(notification) => {
                info!("{}", notification);
                self.ui.notify(notification.to_string(), now);
            }
            SessionEvent::Disconnected { reason } => self.end_session(reason),
        }
    }

    fn end_session(&mut self, reason: Option<String>) {
        self.live = false;
        self.input.reset();
        self.game.reset();
        self.renderer.set_background(None);
        self.ui.return_to_menu(reason);
        self.connection.acknowledge_disconnect();
    }

    fn menu_frame(&mut self) {
        let mut typed = Vec::new();
        while let Some(c) = get_char_pressed() {
            typed.push(c);
        }

        let input = MenuInput {
            typed,
            backspace: is_key_pressed(KeyCode::Backspace),
            submit: is_key_pressed(KeyCode::Enter) || is_key_pressed(KeyCode::KpEnter),
        };

        if let Some(name) = self.ui.update_menu(input) {
            self.connection.connect(Some(name));
        }

        self.renderer
            .render_menu(self.ui.name_input(), self.ui.status());
    }

    fn game_frame(&mut self, now: Instant) {
        if is_key_pressed(KeyCode::Escape) {
            if let Some(SessionEvent::Disconnected { reason }) =
                self.connection.disconnect(&mut self.world)
            {
                self.end_session(reason);
            }
            return;
        }

        self.game.set_viewport((screen_width(), screen_height()));

        if self.live {
            if let Some(heading) = self.input.update(KeyState::sample()) {
                self.connection
                    .send(ClientMessage::MoveSnake(heading.degrees()));
            }
            self.game
                .update(&mut self.world, self.input.active_heading(), now);
        }

        if let Some(bytes) = self.assets.poll(self.world.epoch()) {
            match texture_from_bytes(&bytes) {
                Ok(texture) => self.renderer.set_background(Some(texture)),
                Err(e) => error!("Background image could not be decoded: {}", e),
            }
        }

        let hud = HudInfo {
            state: self.connection.state(),
            live: self.live,
        };
        self.renderer
            .render_game(&self.world, self.game.camera(), hud);
    }
}
