use thiserror::Error;

use crate::common::types::ChannelId;
use crate::sources::ResolveError;
use crate::voice::TransportError;

/// Errors surfaced through the command API.
///
/// Lookup and transport failures pass through from the collaborator seams;
/// the remaining variants are command-surface rejections.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Volume outside 1..=100. Rejected before any state is touched.
    #[error("volume must be between 1 and 100, got {0}")]
    InvalidVolume(i64),

    /// A transport command was issued for a channel with no live session.
    #[error("no active player for channel {0}")]
    NoActiveSession(ChannelId),

    /// The session entered teardown; its queue no longer accepts tracks.
    #[error("player for channel {0} is shutting down")]
    SessionClosed(ChannelId),
}
