//! Adapts a connection's event receiver into an SSE body.

use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::response::sse::Event;
use futures_util::{Stream, StreamExt};
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::domain::VoteEvent;
use crate::service::{VoteService, VoteSubscription};

/// Body of one vote-updates response.
///
/// Dropping the stream (client gone, server shutting down) unregisters
/// the connection from the broadcaster.
#[derive(Debug)]
pub struct VoteStream {
    inner: UnboundedReceiverStream<VoteEvent>,
    connection_id: String,
    service: Arc<VoteService>,
}

impl VoteStream {
    /// Wraps an open subscription.
    #[must_use]
    pub fn new(subscription: VoteSubscription, service: Arc<VoteService>) -> Self {
        Self {
            inner: UnboundedReceiverStream::new(subscription.receiver),
            connection_id: subscription.connection_id,
            service,
        }
    }

    /// Id of the underlying connection.
    #[must_use]
    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }
}

impl Stream for VoteStream {
    type Item = Result<Event, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner
            .poll_next_unpin(cx)
            .map(|next| next.map(|event| Ok(to_sse_event(&event))))
    }
}

impl Drop for VoteStream {
    fn drop(&mut self) {
        self.service.unsubscribe(&self.connection_id);
        tracing::debug!(connection_id = %self.connection_id, "vote stream closed");
    }
}

/// Encodes `event` as an unnamed `data:` frame carrying its JSON. Events
/// with an id also set the SSE `id:` field.
pub fn to_sse_event(event: &VoteEvent) -> Event {
    let frame = match Event::default().json_data(event) {
        Ok(frame) => frame,
        Err(err) => {
            tracing::error!(error = %err, "failed to encode vote event");
            return Event::default().comment("encode error");
        }
    };
    match event.event_id() {
        Some(id) => frame.id(id.to_string()),
        None => frame,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::config::RateLimitConfig;
    use crate::domain::{RateLimiter, VoteBroadcaster};
    use crate::persistence::memory::MemoryStore;

    fn service() -> Arc<VoteService> {
        Arc::new(VoteService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(RateLimiter::new(RateLimitConfig::new(10, 60))),
            Arc::new(VoteBroadcaster::new()),
        ))
    }

    #[tokio::test]
    async fn yields_connected_then_snapshot() {
        let service = service();
        let subscription = service.subscribe(0).await;
        let mut stream = VoteStream::new(subscription, Arc::clone(&service));

        let Some(Ok(_connected)) = stream.next().await else {
            panic!("expected connected frame");
        };
        let Some(Ok(_snapshot)) = stream.next().await else {
            panic!("expected snapshot frame");
        };
        assert_eq!(service.broadcaster().connection_count(), 1);
    }

    #[tokio::test]
    async fn drop_unregisters_connection() {
        let service = service();
        let subscription = service.subscribe(0).await;
        let stream = VoteStream::new(subscription, Arc::clone(&service));
        assert_eq!(service.broadcaster().connection_count(), 1);
        drop(stream);
        assert_eq!(service.broadcaster().connection_count(), 0);
    }
}
