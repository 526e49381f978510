//! Crate-wide error types.

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Chat transport failures.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The inbound stream was already taken by a previous `start` call.
    #[error("transport inbound stream already taken")]
    AlreadyStarted,

    #[error("irc error: {0}")]
    Irc(#[from] irc::error::Error),
}
