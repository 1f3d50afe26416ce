//! Per-channel audio playback scheduling.
//!
//! One [`SessionManager`] owns every active channel's playback session. Each
//! session runs its own tokio task that drains a FIFO track queue, resolves
//! the short-lived stream reference for each track right before playing it,
//! drives the voice transport, and tears itself down after a configurable
//! idle window.
//!
//! Metadata/stream lookup ([`MediaResolver`]) and the voice connection
//! ([`VoiceTransport`]) are trait seams implemented by the embedding bot.

pub mod common;
pub mod configs;
pub mod player;
pub mod sources;
pub mod voice;

pub use common::errors::PlayerError;
pub use common::types::{ChannelId, UserId};
pub use configs::Config;
pub use player::events::{DestroyReason, EndReason, PlayerEvent};
pub use player::manager::SessionManager;
pub use player::queue::TrackQueue;
pub use player::session::{Session, SessionState};
pub use player::track::Track;
pub use sources::{MediaResolver, ResolveError, ResolvedStream, TrackInfo};
pub use voice::{TrackHandle, TransportError, VoiceConnection, VoiceTransport};
