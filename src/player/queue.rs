use std::collections::VecDeque;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::Notify;

use crate::player::track::Track;

/// Push attempted against a queue whose session is tearing down.
#[derive(Debug, Error)]
#[error("queue is closed")]
pub struct QueueClosed;

struct QueueInner {
    items: VecDeque<Track>,
    closed: bool,
}

/// FIFO track queue for one session.
///
/// Pushes come from arbitrary command contexts and never block. The single
/// consumer is the session's playback loop, which awaits `pop` (cancellable
/// from its `select!`). Once closed, every later push fails; close wins over
/// any concurrent push, which is what keeps teardown race-free against
/// enqueue.
pub struct TrackQueue {
    inner: Mutex<QueueInner>,
    notify: Notify,
}

impl TrackQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                items: VecDeque::new(),
                closed: false,
            }),
            notify: Notify::new(),
        }
    }

    /// Append a track to the tail. Never blocks.
    pub fn push(&self, track: Track) -> Result<(), QueueClosed> {
        {
            let mut inner = self.inner.lock();
            if inner.closed {
                return Err(QueueClosed);
            }
            inner.items.push_back(track);
        }
        self.notify.notify_one();
        Ok(())
    }

    /// Wait for the head track. Returns `None` once the queue is closed and
    /// drained.
    pub async fn pop(&self) -> Option<Track> {
        loop {
            {
                let mut inner = self.inner.lock();
                if let Some(track) = inner.items.pop_front() {
                    return Some(track);
                }
                if inner.closed {
                    return None;
                }
            }
            self.notify.notified().await;
        }
    }

    /// Snapshot of up to `n` pending tracks, head first. Does not consume.
    pub fn peek(&self, n: usize) -> Vec<Track> {
        let inner = self.inner.lock();
        inner.items.iter().take(n).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }

    /// Reject all future pushes and wake the consumer.
    pub fn close(&self) {
        self.inner.lock().closed = true;
        self.notify.notify_one();
    }

    pub fn clear(&self) {
        self.inner.lock().items.clear();
    }
}

impl Default for TrackQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::TrackInfo;

    fn track(title: &str) -> Track {
        Track::new(
            TrackInfo {
                title: title.to_string(),
                canonical_url: format!("https://media.example/{title}"),
                thumbnail_url: None,
            },
            title,
            1,
        )
    }

    #[tokio::test]
    async fn test_pop_preserves_insertion_order() {
        let queue = TrackQueue::new();
        queue.push(track("a")).unwrap();
        queue.push(track("b")).unwrap();
        queue.push(track("c")).unwrap();

        assert_eq!(queue.pop().await.unwrap().title, "a");
        assert_eq!(queue.pop().await.unwrap().title, "b");
        assert_eq!(queue.pop().await.unwrap().title, "c");
    }

    #[tokio::test]
    async fn test_pop_waits_for_push() {
        let queue = std::sync::Arc::new(TrackQueue::new());

        let consumer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.pop().await })
        };
        tokio::task::yield_now().await;

        queue.push(track("late")).unwrap();
        let popped = consumer.await.unwrap();
        assert_eq!(popped.unwrap().title, "late");
    }

    #[tokio::test]
    async fn test_peek_does_not_consume() {
        let queue = TrackQueue::new();
        queue.push(track("a")).unwrap();
        queue.push(track("b")).unwrap();

        let head: Vec<String> = queue.peek(5).into_iter().map(|t| t.title).collect();
        assert_eq!(head, ["a", "b"]);
        assert_eq!(queue.len(), 2);

        // A second peek sees the same order.
        let again: Vec<String> = queue.peek(1).into_iter().map(|t| t.title).collect();
        assert_eq!(again, ["a"]);
    }

    #[tokio::test]
    async fn test_push_after_close_fails() {
        let queue = TrackQueue::new();
        queue.close();
        assert!(queue.push(track("too late")).is_err());
    }

    #[tokio::test]
    async fn test_pop_returns_none_when_closed_and_empty() {
        let queue = TrackQueue::new();
        queue.push(track("last")).unwrap();
        queue.close();

        // Items already queued still drain before the end marker.
        assert_eq!(queue.pop().await.unwrap().title, "last");
        assert!(queue.pop().await.is_none());
    }
}
