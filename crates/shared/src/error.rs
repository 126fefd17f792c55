use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Frame codec error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("Unknown skill level: {0:?}")]
    UnknownSkillLevel(String),
}
