//! Live-update stream: one server-sent-event connection per viewer.
//!
//! A connection is `OPEN` from the moment it subscribes to the registry's
//! notifier until the peer goes away (the response body is dropped) or the
//! server shuts down. Leaving `OPEN` always unsubscribes before the channel is
//! closed, on every exit path, because both happen in [`LiveConnection::close`]
//! which `Drop` calls.

use std::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::response::sse::Event;
use fluxradar_store::{Notifier, Subscription};
use futures::Stream;
use tokio::sync::{mpsc, watch};
use tracing::debug;

/// The only message type sent on the stream.
pub const UPDATE: &str = "update";

static NEXT_CONN: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    Open,
    Closed,
}

pub struct LiveConnection {
    id: u64,
    subscription: Option<Subscription>,
    rx: mpsc::Receiver<()>,
    shutdown: watch::Receiver<bool>,
}

impl LiveConnection {
    /// Subscribe to `notifier`. Publishes that arrive while a frame is still
    /// pending collapse into that frame, so a slow reader holds at most one.
    pub fn open(notifier: &Notifier, shutdown: watch::Receiver<bool>) -> Self {
        let id = NEXT_CONN.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(1);
        let subscription = notifier.subscribe(move || {
            // Full: a frame is already pending. Closed: the connection is closing.
            let _ = tx.try_send(());
        });
        metrics::increment_gauge!("live_connections", 1.0);
        debug!(conn = id, "live update connection opened");
        Self { id, subscription: Some(subscription), rx, shutdown }
    }

    pub fn state(&self) -> ConnState {
        if self.subscription.is_some() { ConnState::Open } else { ConnState::Closed }
    }

    /// Unsubscribe, then close the queue. Idempotent.
    pub fn close(&mut self) {
        if let Some(sub) = self.subscription.take() {
            sub.unsubscribe();
            self.rx.close();
            metrics::decrement_gauge!("live_connections", 1.0);
            debug!(conn = self.id, "live update connection closed");
        }
    }

    /// Wait for the next notification. `None` once the connection is closed or
    /// the server is shutting down.
    pub async fn next_update(&mut self) -> Option<()> {
        if self.state() == ConnState::Closed || *self.shutdown.borrow() {
            self.close();
            return None;
        }
        tokio::select! {
            msg = self.rx.recv() => msg,
            _ = self.shutdown.changed() => {
                self.close();
                None
            }
        }
    }

    /// SSE event stream, one `data: update` frame per delivered signal. Dropping the
    /// stream (peer disconnect) drops the connection and so unsubscribes.
    pub fn into_event_stream(self) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static {
        futures::stream::unfold(self, |mut conn| async move {
            conn.next_update().await?;
            Some((Ok(Event::default().data(UPDATE)), conn))
        })
    }
}

impl Drop for LiveConnection {
    fn drop(&mut self) { self.close(); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn frame_per_publish_and_unsubscribe_on_drop() {
        let notifier = Notifier::new();
        let (_tx, rx) = watch::channel(false);
        let conn = LiveConnection::open(&notifier, rx);
        assert_eq!(notifier.subscriber_count(), 1);

        let mut stream = Box::pin(conn.into_event_stream());
        notifier.publish();
        assert!(stream.next().await.is_some());
        notifier.publish();
        assert!(stream.next().await.is_some());

        drop(stream);
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn pending_updates_coalesce_for_slow_reader() {
        let notifier = Notifier::new();
        let (_tx, rx) = watch::channel(false);
        let mut conn = LiveConnection::open(&notifier, rx);
        for _ in 0..5 {
            notifier.publish();
        }
        assert_eq!(conn.next_update().await, Some(()));
        let more = tokio::time::timeout(std::time::Duration::from_millis(50), conn.next_update()).await;
        assert!(more.is_err(), "expected a single coalesced frame");

        notifier.publish();
        assert_eq!(conn.next_update().await, Some(()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn shutdown_ends_stream() {
        let notifier = Notifier::new();
        let (tx, rx) = watch::channel(false);
        let mut conn = LiveConnection::open(&notifier, rx);
        tx.send_replace(true);
        assert_eq!(conn.next_update().await, None);
        assert_eq!(conn.state(), ConnState::Closed);
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[test]
    fn close_is_idempotent() {
        let notifier = Notifier::new();
        let (_tx, rx) = watch::channel(false);
        let mut conn = LiveConnection::open(&notifier, rx);
        conn.close();
        conn.close();
        assert_eq!(conn.state(), ConnState::Closed);
        assert_eq!(notifier.subscriber_count(), 0);
    }
}
