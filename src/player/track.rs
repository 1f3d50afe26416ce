use serde::Serialize;

use crate::common::types::UserId;
use crate::sources::{ResolvedStream, TrackInfo};

/// One requested media item.
///
/// Everything except `resolved` is fixed at enqueue time. `resolved` is
/// filled in by the playback loop right before the track is handed to the
/// transport and is valid for that single attempt only.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub title: String,
    /// The query the requester typed, kept for display.
    pub source_query: String,
    pub canonical_url: String,
    pub thumbnail_url: Option<String>,
    pub requester: UserId,
    #[serde(skip)]
    pub(crate) resolved: Option<ResolvedStream>,
}

impl Track {
    pub fn new(info: TrackInfo, source_query: impl Into<String>, requester: UserId) -> Self {
        Self {
            title: info.title,
            source_query: source_query.into(),
            canonical_url: info.canonical_url,
            thumbnail_url: info.thumbnail_url,
            requester,
            resolved: None,
        }
    }
}
