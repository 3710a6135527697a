//! DoodleRush game server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin doodlerush-server
//! cargo run --bin doodlerush-server -- --host 0.0.0.0 --port 3000 --config doodlerush.toml
//! ```

use std::{collections::HashMap, path::PathBuf, sync::Arc};

use clap::Parser;
use doodlerush_server::{
    config::GameConfig, infrastructure::message_pusher::WebSocketMessagePusher, ui::AppState,
    ui::Server,
};
use doodlerush_shared::{logger::setup_logger, time::SystemClock};
use tokio::sync::Mutex;

#[derive(Parser, Debug)]
#[command(name = "doodlerush-server")]
#[command(about = "Real-time drawing-and-guessing game server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Game settings (TOML). Built-in defaults are used when omitted
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // 1. Load configuration
    let config = match &args.config {
        Some(path) => match GameConfig::load(path) {
            Ok(config) => {
                tracing::info!("Loaded game settings from {}", path.display());
                config
            }
            Err(e) => {
                tracing::error!("Invalid configuration: {}", e);
                std::process::exit(1);
            }
        },
        None => GameConfig::default(),
    };

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher_clients = Arc::new(Mutex::new(HashMap::new()));
    let message_pusher = Arc::new(WebSocketMessagePusher::new(message_pusher_clients));

    // 3. Wire Repository / Timers / UseCases
    let state = AppState::in_memory(config, message_pusher, Arc::new(SystemClock));

    // 4. Create and run the server
    let server = Server::new(state);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
