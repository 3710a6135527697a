//! DoodleRush server: HTTP / WebSocket entry points.

mod handler;
mod server;
mod signal;
pub mod state;

pub use handler::handle_client_text;
pub use server::Server;
pub use state::AppState;
