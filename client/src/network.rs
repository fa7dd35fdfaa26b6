//! Connection manager: owns the WebSocket session and applies server events to the world
//!
//! The socket itself lives in a task on the tokio runtime. Everything it
//! receives is queued and drained by [`ConnectionManager::poll`] on the frame
//! thread, which is the only place the [`World`] is mutated.

use crate::world::World;
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use shared::{
    decode_server, display_name, encode_client, ClientMessage, FoodEatenData, FoodSpawnedData,
    ServerMessage, SnakeRef, PROTOCOL_VERSION,
};
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Joined,
    Disconnected,
}

/// What the transport task reports back to the frame thread
#[derive(Debug)]
pub enum TransportEvent {
    Opened,
    Frame(String),
    Closed(Option<String>),
}

/// Commands for the transport task
#[derive(Debug)]
pub enum Outbound {
    Text(String),
    Close,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("transport task is gone")]
    ChannelClosed,
}

/// User-facing notices raised by inbound events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    PlayerJoined { name: String },
    PlayerLeft { id: String },
    SnakeDied { id: String },
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::PlayerJoined { name } => write!(f, "{} joined the game.", name),
            Notification::PlayerLeft { .. } => write!(f, "A player left the game."),
            Notification::SnakeDied { id } => write!(f, "Snake {} has died.", id),
        }
    }
}

/// Session-level signals for the game loop and UI shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The settle delay after joining has passed; input and prediction may start.
    Ready,
    Notification(Notification),
    /// The session is over and the world has been reset.
    Disconnected { reason: Option<String> },
}

struct Link {
    outbound: UnboundedSender<Outbound>,
    inbound: UnboundedReceiver<TransportEvent>,
}

pub struct ConnectionManager {
    url: String,
    settle_delay: Duration,
    runtime: Handle,
    state: ConnectionState,
    link: Option<Link>,
    identity: Option<String>,
    ready_at: Option<Instant>,
}

impl ConnectionManager {
    pub fn new(url: &str, settle_delay: Duration, runtime: Handle) -> Self {
        Self {
            url: url.to_string(),
            settle_delay,
            runtime,
            state: ConnectionState::Idle,
            link: None,
            identity: None,
            ready_at: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Joined && self.link.is_some()
    }

    /// Opens the transport and joins as `identity` once it is up.
    ///
    /// Only one attempt runs at a time: returns `false` without doing anything
    /// while a connection is pending or open.
    pub fn connect(&mut self, identity: Option<String>) -> bool {
        if matches!(
            self.state,
            ConnectionState::Connecting | ConnectionState::Joined
        ) {
            debug!("Connect ignored, already {:?}", self.state);
            return false;
        }

        info!(
            "Connecting to {} (protocol v{})",
            self.url, PROTOCOL_VERSION
        );

        let (outbound_tx, outbound_rx) = unbounded_channel();
        let (inbound_tx, inbound_rx) = unbounded_channel();
        self.runtime
            .spawn(run_transport(self.url.clone(), outbound_rx, inbound_tx));

        self.attach(Link {
            outbound: outbound_tx,
            inbound: inbound_rx,
        });
        self.identity = identity;
        true
    }

    fn attach(&mut self, link: Link) {
        self.link = Some(link);
        self.state = ConnectionState::Connecting;
        self.ready_at = None;
    }

    /// Transmits an intent. Dropped silently when the transport is not open.
    pub fn send(&mut self, intent: ClientMessage) -> bool {
        let Some(link) = self.link.as_ref().filter(|_| self.state == ConnectionState::Joined)
        else {
            debug!("Dropping {:?}: transport not open", intent);
            return false;
        };

        match encode_client(&intent) {
            Ok(text) => link.outbound.send(Outbound::Text(text)).is_ok(),
            Err(e) => {
                warn!("Failed to encode {:?}: {}", intent, e);
                false
            }
        }
    }

    /// Closes the session locally. The world is reset the same way as on a remote close.
    pub fn disconnect(&mut self, world: &mut World) -> Option<SessionEvent> {
        let link = self.link.take()?;
        let _ = link.outbound.send(Outbound::Close);
        Some(self.teardown(world, Some("closed locally".to_string())))
    }

    /// Moves a finished session back to `Idle` once the UI is back on the
    /// start screen. Returns `false` unless the state was `Disconnected`.
    pub fn acknowledge_disconnect(&mut self) -> bool {
        if self.state != ConnectionState::Disconnected {
            return false;
        }
        self.state = ConnectionState::Idle;
        true
    }

    /// Drains everything the transport delivered since the last call, in
    /// delivery order, applying each event to `world`.
    pub fn poll(&mut self, world: &mut World, now: Instant) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        while let Some(link) = self.link.as_mut() {
            let event = match link.inbound.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    TransportEvent::Closed(Some(TransportError::ChannelClosed.to_string()))
                }
            };

            match event {
                TransportEvent::Opened => self.on_open(now),
                TransportEvent::Frame(text) => {
                    if let Some(event) = self.on_frame(world, &text) {
                        events.push(event);
                    }
                }
                TransportEvent::Closed(reason) => {
                    self.link = None;
                    events.push(self.teardown(world, reason));
                }
            }
        }

        if let Some(ready_at) = self.ready_at {
            if now >= ready_at {
                self.ready_at = None;
                events.push(SessionEvent::Ready);
            }
        }

        events
    }

    fn on_open(&mut self, now: Instant) {
        info!("Connected to server");
        self.state = ConnectionState::Joined;

        let name = display_name(self.identity.as_deref()).to_string();
        self.send(ClientMessage::JoinGame(Some(name)));
        self.ready_at = Some(now + self.settle_delay);
    }

    fn on_frame(&mut self, world: &mut World, text: &str) -> Option<SessionEvent> {
        match decode_server(text) {
            Ok(message) => apply_server_message(world, message).map(SessionEvent::Notification),
            Err(e) if e.is_unknown_tag() => {
                warn!("Unhandled server message: {}", e);
                None
            }
            Err(e) => {
                warn!("Discarding server message: {}", e);
                None
            }
        }
    }

    fn teardown(&mut self, world: &mut World, reason: Option<String>) -> SessionEvent {
        match &reason {
            Some(reason) => info!("Disconnected from server: {}", reason),
            None => info!("Disconnected from server"),
        }

        self.state = ConnectionState::Disconnected;
        self.ready_at = None;
        world.clear();
        SessionEvent::Disconnected { reason }
    }
}

/// Routes one inbound event to its world mutation.
///
/// Every branch is total: references to unknown ids fall back to an insert
/// (updates) or a no-op (removals).
pub fn apply_server_message(world: &mut World, message: ServerMessage) -> Option<Notification> {
    match message {
        ServerMessage::PlayerInit(data) => {
            let player = world.init_player(data);
            info!("Player {} initialized ({})", player.name, player.id);
            None
        }
        ServerMessage::PlayerJoined(data) => {
            // The server echoes our own join back to us
            if world.is_player(&data.id) {
                return None;
            }
            let name = display_name(data.name.as_deref()).to_string();
            world.insert_snake(data);
            Some(Notification::PlayerJoined { name })
        }
        ServerMessage::PlayerLeft(SnakeRef { id }) => world
            .remove_snake(&id)
            .map(|_| Notification::PlayerLeft { id }),
        ServerMessage::UpdateSnake(data) => {
            world.upsert_snake(data);
            None
        }
        ServerMessage::FoodEaten(FoodEatenData { position }) => {
            world.remove_food_at(position);
            None
        }
        ServerMessage::SnakeDied(SnakeRef { id }) => world
            .remove_snake(&id)
            .map(|_| Notification::SnakeDied { id }),
        ServerMessage::FoodSpawned(FoodSpawnedData { positions, color }) => {
            world.spawn_foods(&positions, color);
            None
        }
    }
}

async fn run_transport(
    url: String,
    mut outbound: UnboundedReceiver<Outbound>,
    inbound: UnboundedSender<TransportEvent>,
) {
    let stream = match connect_async(url.as_str()).await {
        Ok((stream, _)) => stream,
        Err(e) => {
            let _ = inbound.send(TransportEvent::Closed(Some(
                TransportError::from(e).to_string(),
            )));
            return;
        }
    };

    if inbound.send(TransportEvent::Opened).is_err() {
        return;
    }

    let (mut sink, mut source) = stream.split();

    let reason = loop {
        tokio::select! {
            command = outbound.recv() => match command {
                Some(Outbound::Text(text)) => {
                    if let Err(e) = sink.send(Message::Text(text)).await {
                        break Some(TransportError::from(e).to_string());
                    }
                }
                Some(Outbound::Close) | None => {
                    let _ = sink.send(Message::Close(None)).await;
                    break None;
                }
            },

            frame = source.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if inbound.send(TransportEvent::Frame(text)).is_err() {
                        break None;
                    }
                }
                Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                    Ok(text) => {
                        if inbound.send(TransportEvent::Frame(text)).is_err() {
                            break None;
                        }
                    }
                    Err(_) => warn!("Discarding non-UTF-8 binary frame"),
                },
                Some(Ok(Message::Close(frame))) => {
                    break frame.map(|frame| frame.reason.into_owned()).filter(|r| !r.is_empty());
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => break Some(TransportError::from(e).to_string()),
                None => break None,
            },
        }
    };

    let _ = inbound.send(TransportEvent::Closed(reason));
}
