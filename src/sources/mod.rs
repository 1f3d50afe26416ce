use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lookup failures from the media catalogue.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// The search query matched nothing.
    #[error("no results for {0:?}")]
    NotFound(String),

    /// The canonical reference exists but no playable stream could be
    /// produced for it right now.
    #[error("stream unavailable for {url}: {message}")]
    Unavailable { url: String, message: String },
}

/// Metadata for a media item, as returned by a fast catalogue lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInfo {
    pub title: String,
    /// Stable reference to the media item (e.g. its page URL). Used later
    /// for stream resolution.
    pub canonical_url: String,
    pub thumbnail_url: Option<String>,
}

/// A playable stream reference.
///
/// Stream URLs expire, so a resolved stream is handed to the transport at
/// most once and never cached across playback attempts.
#[derive(Debug, Clone)]
pub struct ResolvedStream {
    pub url: String,
    pub resolved_at: Instant,
    /// How long the provider claims the URL stays valid, when known.
    pub expiry_hint: Option<Duration>,
}

/// Resolves user queries to track metadata and canonical references to
/// short-lived playable streams.
///
/// Implemented by the embedding bot on top of whatever extraction backend it
/// uses. `resolve_metadata` is expected to be fast; `resolve_stream` may take
/// seconds and is called by the playback loop immediately before each play.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    async fn resolve_metadata(&self, query: &str) -> Result<TrackInfo, ResolveError>;

    async fn resolve_stream(&self, canonical_url: &str) -> Result<ResolvedStream, ResolveError>;
}
