use clap::Parser;
use client::app::App;
use client::config::{Args, ClientConfig};
use log::{error, info};
use macroquad::prelude::*;

fn window_conf() -> Conf {
    let args = Args::parse();
    Conf {
        window_title: "Snake Arena".to_owned(),
        window_width: args.width as i32,
        window_height: args.height as i32,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let config = ClientConfig::from(Args::parse());

    // I/O only; the world is mutated on this thread
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start tokio runtime: {}", e);
            return;
        }
    };

    info!("Starting client...");
    info!("Server: {}", config.server_url);

    let mut app = App::new(config, runtime.handle().clone());
    app.run().await;
}
