//! Networked play against a session server

pub mod authority;
pub mod client;
pub mod error;

pub use authority::NetworkAuthority;
pub use client::MultiplayerSession;
pub use error::NetworkError;
