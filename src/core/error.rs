//! Error types for core module
//!
//! Covers settings persistence and the local command line front end.

use chess_engine::ChessEngineError;
use thiserror::Error;

/// Errors that can occur in the core module
#[derive(Error, Debug)]
pub enum CoreError {
    /// Settings file or terminal I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings serialization/deserialization error
    #[error("Settings serialization error: {0}")]
    SettingsSerialization(#[from] serde_json::Error),

    /// Typed move could not be read as two squares
    #[error("Expected a move like \"e2 e4\", got {input:?}")]
    MoveSyntax { input: String },

    #[error(transparent)]
    Engine(#[from] ChessEngineError),
}

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;
