pub mod app_state;
pub mod game;
pub mod ws_socket;
