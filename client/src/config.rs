use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// WebSocket URL of the game server
    #[arg(short = 's', long, default_value = "ws://127.0.0.1:9001")]
    pub server: String,

    /// Name prefilled on the start screen
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// Window width
    #[arg(short = 'w', long, default_value = "1280")]
    pub width: usize,

    /// Window height (no short flag to avoid conflict with --help)
    #[arg(long, default_value = "720")]
    pub height: usize,

    /// Background image tiled behind the world
    #[arg(short = 'b', long, default_value = "assets/bg.jpg")]
    pub background: PathBuf,

    /// Delay between joining and starting input/prediction, in milliseconds
    #[arg(long, default_value = "100")]
    pub settle_ms: u64,

    /// Upper bound on a single frame's elapsed time, in milliseconds
    #[arg(long, default_value = "100")]
    pub max_frame_ms: u64,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    pub name: Option<String>,
    pub window_size: (usize, usize),
    pub background: PathBuf,
    pub settle_delay: Duration,
    pub max_frame_delta: Duration,
}

impl From<Args> for ClientConfig {
    fn from(args: Args) -> Self {
        Self {
            server_url: args.server,
            name: args.name,
            window_size: (args.width, args.height),
            background: args.background,
            settle_delay: Duration::from_millis(args.settle_ms),
            max_frame_delta: Duration::from_millis(args.max_frame_ms.max(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from(Args::parse_from(["client"]));
        assert_eq!(config.server_url, "ws://127.0.0.1:9001");
        assert_eq!(config.name, None);
        assert_eq!(config.window_size, (1280, 720));
        assert_eq!(config.settle_delay, Duration::from_millis(100));
        assert_eq!(config.max_frame_delta, Duration::from_millis(100));
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from(Args::parse_from([
            "client",
            "-s",
            "ws://example.test:1234",
            "--name",
            "alice",
            "--settle-ms",
            "0",
            "--max-frame-ms",
            "0",
        ]));
        assert_eq!(config.server_url, "ws://example.test:1234");
        assert_eq!(config.name.as_deref(), Some("alice"));
        assert_eq!(config.settle_delay, Duration::ZERO);
        assert_eq!(config.max_frame_delta, Duration::from_millis(1));
    }
}
