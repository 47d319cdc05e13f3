pub mod border;
pub mod cli;
pub mod config;
pub mod db;
pub mod dqn;
pub mod error;
pub mod event_loop;
pub mod food;
pub mod game;
pub mod game_input;
pub mod log;
pub mod network;
pub mod play;
pub mod replay_buffer;
pub mod snake;
pub mod train;
pub mod utils;

pub use error::{Result, SnakeError};
