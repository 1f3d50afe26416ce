use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::info;

use crate::common::errors::PlayerError;
use crate::common::types::{ChannelId, UserId};
use crate::configs::PlayerConfig;
use crate::player::events::PlayerEvent;
use crate::player::playback;
use crate::player::session::{Command, Session};
use crate::player::track::Track;
use crate::sources::MediaResolver;
use crate::voice::VoiceTransport;

pub(crate) struct ManagerInner {
    pub(crate) sessions: DashMap<ChannelId, Arc<Session>>,
    resolver: Arc<dyn MediaResolver>,
    transport: Arc<dyn VoiceTransport>,
    config: PlayerConfig,
    events_tx: flume::Sender<PlayerEvent>,
    events_rx: flume::Receiver<PlayerEvent>,
}

impl Drop for ManagerInner {
    fn drop(&mut self) {
        for item in self.sessions.iter() {
            item.value().close();
        }
        self.sessions.clear();
    }
}

/// Registry of per-channel playback sessions.
///
/// One session per channel, created on demand and removed by its own loop on
/// teardown. Cheap to clone; clones share the registry. This is also the
/// command surface the dispatch layer calls into, one method per user
/// command.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<ManagerInner>,
}

impl SessionManager {
    pub fn new(
        config: PlayerConfig,
        resolver: Arc<dyn MediaResolver>,
        transport: Arc<dyn VoiceTransport>,
    ) -> Self {
        let (events_tx, events_rx) = flume::unbounded();
        Self {
            inner: Arc::new(ManagerInner {
                sessions: DashMap::new(),
                resolver,
                transport,
                config,
                events_tx,
                events_rx,
            }),
        }
    }

    /// Receiver for the loops' events (track start/end/error, teardown).
    pub fn events(&self) -> flume::Receiver<PlayerEvent> {
        self.inner.events_rx.clone()
    }

    /// The channel's session, or a freshly started one. Concurrent calls for
    /// one channel observe exactly one creation and one loop.
    pub fn get_or_create(&self, channel_id: &ChannelId) -> Arc<Session> {
        match self.inner.sessions.entry(channel_id.clone()) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                let (session, commands) =
                    Session::new(channel_id.clone(), self.inner.config.default_volume());
                let session = Arc::new(session);
                entry.insert(session.clone());

                tokio::spawn(playback::run(
                    session.clone(),
                    Arc::downgrade(&self.inner),
                    self.inner.resolver.clone(),
                    self.inner.transport.clone(),
                    self.inner.config.clone(),
                    self.inner.events_tx.clone(),
                    commands,
                ));
                info!("[{}] created playback session", channel_id);
                session
            }
        }
    }

    /// Non-creating lookup.
    pub fn get(&self, channel_id: &ChannelId) -> Option<Arc<Session>> {
        self.inner
            .sessions
            .get(channel_id)
            .map(|entry| entry.value().clone())
    }

    /// Cancel the channel's session. A no-op when there is none; the loop
    /// releases the transport and removes the entry on its way out.
    pub fn destroy(&self, channel_id: &ChannelId) {
        if let Some(session) = self.get(channel_id) {
            session.close();
        }
    }

    /// Look up `query`, append the resulting track to the channel's queue,
    /// and return it.
    ///
    /// Metadata failures surface to the caller with every queue untouched.
    /// If the session is tearing down at push time the dead entry is dropped
    /// and the push retried against a fresh session, so an enqueue is never
    /// silently swallowed by a dying session.
    pub async fn enqueue(
        &self,
        channel_id: &ChannelId,
        query: &str,
        requester: UserId,
    ) -> Result<Track, PlayerError> {
        let info = self.inner.resolver.resolve_metadata(query).await?;
        let track = Track::new(info, query, requester);

        loop {
            let session = self.get_or_create(channel_id);
            match session.enqueue(track.clone()) {
                Ok(()) => return Ok(track),
                Err(_) => {
                    self.inner
                        .sessions
                        .remove_if(channel_id, |_, live| Arc::ptr_eq(live, &session));
                }
            }
        }
    }

    pub fn pause(&self, channel_id: &ChannelId) -> Result<(), PlayerError> {
        self.command(channel_id, Command::Pause)
    }

    pub fn resume(&self, channel_id: &ChannelId) -> Result<(), PlayerError> {
        self.command(channel_id, Command::Resume)
    }

    /// Cut the current track short; the loop moves on to the next one.
    pub fn skip(&self, channel_id: &ChannelId) -> Result<(), PlayerError> {
        self.command(channel_id, Command::Skip)
    }

    /// Stop playback and destroy the channel's session. Idempotent: absent
    /// and already-stopping sessions are fine.
    pub fn stop(&self, channel_id: &ChannelId) {
        if let Some(session) = self.get(channel_id) {
            session.command(Command::Stop);
        }
    }

    /// Set the session's volume from a percentage in 1..=100. Applies live
    /// when a track is playing and becomes the default for later tracks.
    pub fn set_volume(&self, channel_id: &ChannelId, percent: i64) -> Result<(), PlayerError> {
        let volume = volume_from_percent(percent).ok_or(PlayerError::InvalidVolume(percent))?;
        self.command(channel_id, Command::SetVolume(volume))
    }

    /// Up to `n` queued tracks, head first. Empty when the channel has no
    /// session.
    pub fn list_queue(&self, channel_id: &ChannelId, n: usize) -> Vec<Track> {
        self.get(channel_id)
            .map(|session| session.upcoming(n))
            .unwrap_or_default()
    }

    /// The channel's current track, if one is playing or paused.
    pub fn now_playing(&self, channel_id: &ChannelId) -> Option<Track> {
        self.get(channel_id).and_then(|session| session.now_playing())
    }

    fn command(&self, channel_id: &ChannelId, command: Command) -> Result<(), PlayerError> {
        let session = self
            .get(channel_id)
            .ok_or_else(|| PlayerError::NoActiveSession(channel_id.clone()))?;
        session.command(command);
        Ok(())
    }
}

/// Map a user-facing percentage to the internal [0.01, 1.00] scale.
fn volume_from_percent(percent: i64) -> Option<f32> {
    if (1..=100).contains(&percent) {
        Some(percent as f32 / 100.0)
    } else {
        None
    }
}
