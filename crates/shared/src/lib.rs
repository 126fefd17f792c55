//! Wire contract between chess participants and the session server

pub mod error;
pub mod log;
pub mod protocol;

pub use error::ProtocolError;
pub use log::EventLog;
