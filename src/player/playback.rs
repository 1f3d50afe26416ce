use std::future::Future;
use std::sync::{Arc, Weak};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::configs::PlayerConfig;
use crate::player::events::{DestroyReason, EndReason, PlayerEvent};
use crate::player::manager::ManagerInner;
use crate::player::session::{Command, Session, SessionState};
use crate::player::track::Track;
use crate::sources::MediaResolver;
use crate::voice::{VoiceConnection, VoiceTransport};

/// Outcome of awaiting a collaborator call from inside the loop.
enum Step<T> {
    Ready(T),
    /// A skip arrived; the current track is abandoned.
    Skipped,
    /// A stop arrived or the session was cancelled.
    Stopped,
}

/// Body of one session's playback task.
///
/// Runs until an explicit stop, cancellation through the manager, or the
/// idle timeout, then releases the transport connection and removes the
/// session from the registry. The loop is the only writer of the session's
/// state, current track and volume.
pub(crate) async fn run(
    session: Arc<Session>,
    manager: Weak<ManagerInner>,
    resolver: Arc<dyn MediaResolver>,
    transport: Arc<dyn VoiceTransport>,
    config: PlayerConfig,
    events: flume::Sender<PlayerEvent>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    let mut connection: Option<Box<dyn VoiceConnection>> = None;
    let reason = drive(
        &session,
        &resolver,
        &transport,
        &config,
        &events,
        &mut commands,
        &mut connection,
    )
    .await;
    teardown(&session, &manager, &events, connection, reason).await;
}

async fn drive(
    session: &Arc<Session>,
    resolver: &Arc<dyn MediaResolver>,
    transport: &Arc<dyn VoiceTransport>,
    config: &PlayerConfig,
    events: &flume::Sender<PlayerEvent>,
    commands: &mut mpsc::UnboundedReceiver<Command>,
    connection: &mut Option<Box<dyn VoiceConnection>>,
) -> DestroyReason {
    let cancel = session.cancel_token();

    loop {
        session.set_state(SessionState::Idle);

        let track = tokio::select! {
            _ = cancel.cancelled() => return DestroyReason::Stopped,
            cmd = commands.recv() => {
                match cmd {
                    None | Some(Command::Stop) => return DestroyReason::Stopped,
                    Some(Command::SetVolume(volume)) => session.store_volume(volume),
                    // Nothing to act on while idle, but any command counts
                    // as activity and restarts the idle countdown.
                    Some(Command::Pause | Command::Resume | Command::Skip) => {}
                }
                continue;
            }
            track = session.queue.pop() => match track {
                Some(track) => track,
                None => return DestroyReason::Stopped,
            },
            _ = tokio::time::sleep(config.idle_timeout()) => {
                debug!(
                    "[{}] idle for {}s, shutting down",
                    session.channel_id, config.idle_timeout_secs
                );
                return DestroyReason::IdleTimeout;
            }
        };

        if let Some(reason) =
            play_track(session, resolver, transport, events, commands, connection, track).await
        {
            return reason;
        }
    }
}

/// Resolve one track's stream and see it through to the end.
///
/// Returns `Some` when the session should tear down, `None` when the loop
/// should move on to the next queued track. A track whose resolution or
/// playback fails is discarded on its own; it never takes the session or the
/// rest of the queue with it.
async fn play_track(
    session: &Arc<Session>,
    resolver: &Arc<dyn MediaResolver>,
    transport: &Arc<dyn VoiceTransport>,
    events: &flume::Sender<PlayerEvent>,
    commands: &mut mpsc::UnboundedReceiver<Command>,
    connection: &mut Option<Box<dyn VoiceConnection>>,
    mut track: Track,
) -> Option<DestroyReason> {
    session.set_state(SessionState::Resolving);
    debug!("[{}] resolving stream for {:?}", session.channel_id, track.title);

    // Stream URLs expire, so resolution happens here and nowhere earlier.
    let stream = {
        let fut = resolver.resolve_stream(&track.canonical_url);
        match interruptible(session, commands, fut).await {
            Step::Ready(Ok(stream)) => stream,
            Step::Ready(Err(e)) => {
                warn!("[{}] dropping {:?}: {}", session.channel_id, track.title, e);
                let _ = events.send(PlayerEvent::TrackError {
                    channel_id: session.channel_id.clone(),
                    message: e.to_string(),
                    track,
                });
                return None;
            }
            Step::Skipped => return None,
            Step::Stopped => return Some(DestroyReason::Stopped),
        }
    };
    track.resolved = Some(stream.clone());

    // The first play of a session establishes the voice connection; it is
    // kept for the session's lifetime and released in teardown.
    if connection.is_none() {
        let fut = transport.connect(&session.channel_id);
        match interruptible(session, commands, fut).await {
            Step::Ready(Ok(conn)) => *connection = Some(conn),
            Step::Ready(Err(e)) => {
                warn!("[{}] transport connect failed: {}", session.channel_id, e);
                let _ = events.send(PlayerEvent::TrackError {
                    channel_id: session.channel_id.clone(),
                    message: e.to_string(),
                    track,
                });
                return None;
            }
            Step::Skipped => return None,
            Step::Stopped => return Some(DestroyReason::Stopped),
        }
    }
    let conn = match connection.as_mut() {
        Some(conn) => conn,
        None => return None,
    };

    let handle = match conn.play(stream, session.volume()).await {
        Ok(handle) => handle,
        Err(e) => {
            warn!("[{}] play failed for {:?}: {}", session.channel_id, track.title, e);
            let _ = events.send(PlayerEvent::TrackError {
                channel_id: session.channel_id.clone(),
                message: e.to_string(),
                track,
            });
            return None;
        }
    };

    session.set_current(Some(track.clone()));
    session.set_state(SessionState::Playing);
    info!(
        "[{}] now playing {:?} (requested by {})",
        session.channel_id, track.title, track.requester
    );
    let _ = events.send(PlayerEvent::TrackStart {
        channel_id: session.channel_id.clone(),
        track: track.clone(),
    });

    let cancel = session.cancel_token();
    let mut finished = handle.finished;

    let (end, destroy) = loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                conn.stop().await;
                break (EndReason::Stopped, Some(DestroyReason::Stopped));
            }
            _ = &mut finished => break (EndReason::Finished, None),
            cmd = commands.recv() => match cmd {
                None | Some(Command::Stop) => {
                    conn.stop().await;
                    break (EndReason::Stopped, Some(DestroyReason::Stopped));
                }
                Some(Command::Skip) => {
                    conn.stop().await;
                    break (EndReason::Skipped, None);
                }
                Some(Command::Pause) => {
                    if session.state() == SessionState::Playing {
                        conn.pause().await;
                        session.set_state(SessionState::Paused);
                    }
                }
                Some(Command::Resume) => {
                    if session.state() == SessionState::Paused {
                        conn.resume().await;
                        session.set_state(SessionState::Playing);
                    }
                }
                Some(Command::SetVolume(volume)) => {
                    session.store_volume(volume);
                    conn.set_volume(volume).await;
                }
            },
        }
    };

    session.set_current(None);
    let _ = events.send(PlayerEvent::TrackEnd {
        channel_id: session.channel_id.clone(),
        track,
        reason: end,
    });
    destroy
}

/// Await a resolver/transport call while staying responsive to commands.
///
/// Skip and stop abandon the call; volume updates are absorbed; pause and
/// resume have nothing to act on yet and fall through.
async fn interruptible<T>(
    session: &Session,
    commands: &mut mpsc::UnboundedReceiver<Command>,
    fut: impl Future<Output = T>,
) -> Step<T> {
    let cancel = session.cancel_token();
    tokio::pin!(fut);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return Step::Stopped,
            cmd = commands.recv() => match cmd {
                None | Some(Command::Stop) => return Step::Stopped,
                Some(Command::Skip) => return Step::Skipped,
                Some(Command::SetVolume(volume)) => session.store_volume(volume),
                Some(Command::Pause | Command::Resume) => {}
            },
            value = &mut fut => return Step::Ready(value),
        }
    }
}

/// Every exit path funnels through here: close the queue against late
/// enqueues, release the transport, drop the registry entry, tell the world.
async fn teardown(
    session: &Arc<Session>,
    manager: &Weak<ManagerInner>,
    events: &flume::Sender<PlayerEvent>,
    connection: Option<Box<dyn VoiceConnection>>,
    reason: DestroyReason,
) {
    session.set_state(SessionState::Draining);
    session.close();
    session.queue.close();
    session.queue.clear();
    session.set_current(None);

    if let Some(mut conn) = connection {
        conn.disconnect().await;
    }

    if let Some(manager) = manager.upgrade() {
        manager
            .sessions
            .remove_if(&session.channel_id, |_, live| Arc::ptr_eq(live, session));
    }

    let _ = events.send(PlayerEvent::Destroyed {
        channel_id: session.channel_id.clone(),
        reason,
    });
    info!("[{}] player destroyed ({:?})", session.channel_id, reason);
}
