use std::fmt;
use std::io;

use crate::mux::SpriteHandle;

/// Errors surfaced by the multiplexer and its startup collaborators.
///
/// None of these are retried. Startup errors are fatal to the caller.
#[derive(Debug)]
pub enum MuxError {
    /// Every record in the pool is live.
    PoolExhausted,

    /// `release` was called on a handle that is not the tail of the active
    /// list. The handle must be moved off-screen first.
    ReleaseNotTail(SpriteHandle),

    /// The handle was released and is no longer in the active list.
    StaleHandle(SpriteHandle),

    /// The sprite sheet has no image at this index.
    UnknownGraphic(usize),

    /// The sprite sheet is malformed.
    AssetLoad(String),

    /// Reading the sprite sheet failed.
    Io(io::Error),
}

impl fmt::Display for MuxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MuxError::PoolExhausted => write!(f, "sprite pool exhausted"),
            MuxError::ReleaseNotTail(handle) => {
                write!(f, "sprite {} is not at the tail of the active list", handle)
            }
            MuxError::StaleHandle(handle) => write!(f, "sprite {} is not live", handle),
            MuxError::UnknownGraphic(index) => {
                write!(f, "sprite sheet has no image {}", index)
            }
            MuxError::AssetLoad(msg) => write!(f, "sprite sheet rejected: {}", msg),
            MuxError::Io(e) => write!(f, "sprite sheet unreadable: {}", e),
        }
    }
}

impl std::error::Error for MuxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MuxError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for MuxError {
    fn from(e: io::Error) -> Self {
        MuxError::Io(e)
    }
}
