//! Request handlers.

mod command;
mod http;
mod websocket;

pub use command::handle_client_text;
pub use http::{get_room_detail, get_rooms, get_stats, health_check};
pub use websocket::websocket_handler;
