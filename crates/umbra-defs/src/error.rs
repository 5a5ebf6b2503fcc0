use thiserror::Error;

#[derive(Debug, Error)]
pub enum DefsError {
    #[error("failed to read definitions: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid definition file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: u32 },

    #[error("{kind} {id}: {reason}")]
    Invalid {
        kind: &'static str,
        id: u32,
        reason: String,
    },
}
