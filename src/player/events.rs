use serde::Serialize;

use crate::common::types::ChannelId;
use crate::player::track::Track;

/// Events emitted by session loops.
///
/// Delivered over the manager's event channel; the dispatch layer turns them
/// into channel announcements ("Now Playing", per-track error notices, and
/// so on).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlayerEvent {
    #[serde(rename = "TrackStartEvent")]
    TrackStart {
        #[serde(rename = "channelId")]
        channel_id: ChannelId,
        track: Track,
    },

    #[serde(rename = "TrackEndEvent")]
    TrackEnd {
        #[serde(rename = "channelId")]
        channel_id: ChannelId,
        track: Track,
        reason: EndReason,
    },

    /// A track was dropped because its stream could not be resolved or the
    /// transport refused it. The rest of the queue is unaffected.
    #[serde(rename = "TrackErrorEvent")]
    TrackError {
        #[serde(rename = "channelId")]
        channel_id: ChannelId,
        track: Track,
        message: String,
    },

    #[serde(rename = "PlayerDestroyedEvent")]
    Destroyed {
        #[serde(rename = "channelId")]
        channel_id: ChannelId,
        reason: DestroyReason,
    },
}

/// Why a track stopped playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EndReason {
    /// The transport reached the end of the stream.
    Finished,
    /// A skip command cut it short.
    Skipped,
    /// The session was stopped or destroyed while it played.
    Stopped,
}

/// Why a session tore itself down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DestroyReason {
    /// Explicit stop/leave, or destroyed through the manager.
    Stopped,
    /// Empty queue and no activity for the idle window.
    IdleTimeout,
}
