use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::oneshot;

use crate::common::types::ChannelId;
use crate::sources::ResolvedStream;

/// Voice connection failures.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("failed to connect to channel {channel_id}: {message}")]
    Connect {
        channel_id: ChannelId,
        message: String,
    },

    #[error("playback failed: {0}")]
    Playback(String),
}

/// Handle to one in-flight track on a connection.
///
/// `finished` fires when the transport reaches the natural end of the
/// stream. The playback loop awaits it instead of being called back from the
/// transport's own context, so completion never mutates loop state
/// re-entrantly. A dropped sender counts as completion.
pub struct TrackHandle {
    pub finished: oneshot::Receiver<()>,
}

/// Connects to voice channels.
///
/// Implemented by the embedding bot's voice layer (gateway handshake, codec
/// negotiation and the rest live behind this seam).
#[async_trait]
pub trait VoiceTransport: Send + Sync {
    async fn connect(
        &self,
        channel_id: &ChannelId,
    ) -> Result<Box<dyn VoiceConnection>, TransportError>;
}

/// An established voice connection, owned exclusively by one session's loop.
#[async_trait]
pub trait VoiceConnection: Send {
    /// Start playing a resolved stream at the given volume (0.01..=1.00).
    async fn play(
        &mut self,
        stream: ResolvedStream,
        volume: f32,
    ) -> Result<TrackHandle, TransportError>;

    async fn pause(&mut self);

    async fn resume(&mut self);

    /// Stop the current track. The transport signals the track's
    /// [`TrackHandle`] as part of stopping.
    async fn stop(&mut self);

    /// Apply a new volume to the active stream.
    async fn set_volume(&mut self, volume: f32);

    async fn disconnect(&mut self);
}
