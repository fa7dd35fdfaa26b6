//! # Snake Arena Client Library
//!
//! Client-side implementation of the multiplayer snake arena. The server owns the
//! simulation; this crate keeps a local copy of the world in step with the stream
//! of server events, predicts the local player's movement between updates, and
//! forwards steering input upstream.
//!
//! ## Architecture Overview
//!
//! Everything that touches the world runs on the macroquad frame thread. A tokio
//! runtime hosts the WebSocket task and file reads; they talk to the frame thread
//! over channels that are drained once per frame, so each frame draws a consistent
//! snapshot and inbound events are applied strictly in delivery order.
//!
//! ```text
//! keys -> InputSampler -> ConnectionManager::send -> socket task -> server
//! server -> socket task -> ConnectionManager::poll -> World -> Renderer
//! ```
//!
//! ### Local Prediction
//! Between server updates the local player's head is advanced along the held
//! heading. There is no reconciliation: the next `UpdateSnake` for the player
//! simply overwrites the predicted state.
//!
//! ### Session Lifecycle
//! `Idle -> Connecting -> Joined -> Disconnected -> Idle`. A dropped connection ends the
//! session, empties the world and returns to the start screen. There is no
//! automatic reconnect.
//!
//! ## Module Organization
//!
//! - `world`: entity store with the local player tracked by id
//! - `entity`: snakes and food built from server snapshots
//! - `network`: connection state machine, inbound dispatch, socket task
//! - `input`: key-down edge detection into compass headings
//! - `game`: frame clock, prediction, camera, leaderboard
//! - `assets`: background image loading guarded by session epoch
//! - `rendering`: macroquad drawing of the world, HUD and start screen
//! - `ui`: start screen state and notification toasts
//! - `config`: command line options
//! - `app`: the frame loop

pub mod app;
pub mod assets;
pub mod config;
pub mod entity;
pub mod game;
pub mod input;
pub mod network;
pub mod rendering;
pub mod ui;
pub mod world;
