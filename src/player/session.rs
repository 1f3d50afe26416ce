use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::common::errors::PlayerError;
use crate::common::types::ChannelId;
use crate::player::queue::TrackQueue;
use crate::player::track::Track;

/// Where a session's loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    /// Waiting for the queue; the idle countdown runs here.
    Idle,
    /// Resolving the head track's stream reference.
    Resolving,
    Playing,
    Paused,
    /// Terminal. The loop is releasing its resources.
    Draining,
}

/// Commands delivered to a session's loop.
///
/// Everything the loop's state depends on goes through this one channel, so
/// concurrent callers serialize against the loop's own transitions.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Command {
    Pause,
    Resume,
    Skip,
    Stop,
    /// Volume as a fraction in [0.01, 1.00], already validated.
    SetVolume(f32),
}

/// Shared handle to one channel's playback session.
///
/// The manager owns the only long-lived reference; the loop task holds its
/// own and removes the map entry on the way out. `state`, `current` and
/// `volume` are written exclusively by the loop; everyone else reads.
pub struct Session {
    pub channel_id: ChannelId,
    pub(crate) queue: TrackQueue,
    commands: mpsc::UnboundedSender<Command>,
    state: Mutex<SessionState>,
    current: Mutex<Option<Track>>,
    volume: Mutex<f32>,
    cancel: CancellationToken,
}

impl Session {
    pub(crate) fn new(
        channel_id: ChannelId,
        volume: f32,
    ) -> (Self, mpsc::UnboundedReceiver<Command>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Self {
            channel_id,
            queue: TrackQueue::new(),
            commands: tx,
            state: Mutex::new(SessionState::Idle),
            current: Mutex::new(None),
            volume: Mutex::new(volume),
            cancel: CancellationToken::new(),
        };
        (session, rx)
    }

    /// Append a track for playback.
    ///
    /// Fails once the session entered teardown; callers are expected to
    /// obtain a fresh session from the manager and retry.
    pub fn enqueue(&self, track: Track) -> Result<(), PlayerError> {
        self.queue
            .push(track)
            .map_err(|_| PlayerError::SessionClosed(self.channel_id.clone()))
    }

    /// Send a command to the loop. A no-op if the loop is already gone.
    pub(crate) fn command(&self, command: Command) {
        let _ = self.commands.send(command);
    }

    /// Cancel the loop. Safe to call any number of times.
    pub(crate) fn close(&self) {
        self.cancel.cancel();
    }

    pub(crate) fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    /// The track currently playing (or paused), if any.
    pub fn now_playing(&self) -> Option<Track> {
        self.current.lock().clone()
    }

    /// Snapshot of up to `n` pending tracks, head first.
    pub fn upcoming(&self, n: usize) -> Vec<Track> {
        self.queue.peek(n)
    }

    /// Session volume as a fraction in [0.01, 1.00].
    pub fn volume(&self) -> f32 {
        *self.volume.lock()
    }

    pub(crate) fn set_state(&self, state: SessionState) {
        *self.state.lock() = state;
    }

    pub(crate) fn set_current(&self, track: Option<Track>) {
        *self.current.lock() = track;
    }

    pub(crate) fn store_volume(&self, volume: f32) {
        *self.volume.lock() = volume;
    }
}
