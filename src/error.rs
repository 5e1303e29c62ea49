//! The crate-level error composing every subsystem's error type, returned
//! by `server.rs`'s top-level entry points. Grounded on the teacher's
//! per-module `thiserror` pattern, just one level up.

use crate::channel::{AppError, ChannelError};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),
    #[error("app error: {0}")]
    App(#[from] AppError),
}
