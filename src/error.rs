use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong outside of normal game-over states.
/// Collisions and an exhausted step budget are not errors: they end an episode.
#[derive(Error, Debug)]
pub enum SnakeError {
    #[error("invalid action encoding {0:?}: expected exactly one of [1,0,0], [0,1,0], [0,0,1]")]
    InvalidAction(Vec<u8>),

    #[error("board saturated: no free cell for food ({cells} cells, snake length {snake_len})")]
    BoardSaturated { cells: usize, snake_len: usize },

    #[error("checkpoint I/O failed for {}: {source}", .path.display())]
    CheckpointIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("checkpoint {} is malformed: {source}", .path.display())]
    CheckpointFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("checkpoint shape {found:?} does not match network shape {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize, usize),
        found: (usize, usize, usize),
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("stats database error: {0}")]
    Stats(#[from] rusqlite::Error),

    #[error("display error: {0}")]
    Display(String),
}

pub type Result<T> = std::result::Result<T, SnakeError>;
