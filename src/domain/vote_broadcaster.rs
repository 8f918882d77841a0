//! Process-local fan-out of vote events to open streams.
//!
//! [`VoteBroadcaster`] keeps one unbounded channel sender per open
//! connection. A broadcast enqueues the same event on every sender; a
//! sender whose receiver is gone (transport closed) fails the write and is
//! pruned right there. Connections are also removed explicitly when the
//! stream is dropped.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::mpsc;

use super::vote_event::{ConnectionId, VoteEvent};
use super::IdeaId;

/// Receiving half handed to the stream of one connection.
pub type VoteEventReceiver = mpsc::UnboundedReceiver<VoteEvent>;

#[derive(Debug)]
struct Subscriber {
    sender: mpsc::UnboundedSender<VoteEvent>,
    last_event_id: u64,
}

/// Registry of live vote-update connections.
///
/// Owned by the composition root and shared through `Arc`; tests build
/// their own instance.
#[derive(Debug, Default)]
pub struct VoteBroadcaster {
    connections: DashMap<ConnectionId, Subscriber>,
    event_counter: AtomicU64,
}

impl VoteBroadcaster {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new connection with its `connected` acknowledgement
    /// and a `vote_counts` snapshot already queued.
    ///
    /// Both events are enqueued before the connection becomes visible to
    /// [`broadcast_vote_update`](Self::broadcast_vote_update), so every
    /// update it later receives is ordered after the snapshot and carries
    /// a higher event id.
    ///
    /// `last_event_id` is the id the client claims to have seen last. It
    /// is recorded for diagnostics only; nothing is replayed.
    pub fn subscribe(
        &self,
        last_event_id: u64,
        vote_counts: impl IntoIterator<Item = (IdeaId, i64)>,
    ) -> (ConnectionId, VoteEventReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let connection_id = format!("conn-{}", uuid::Uuid::new_v4().simple());
        let _ = sender.send(VoteEvent::Connected {
            connection_id: connection_id.clone(),
        });
        let _ = sender.send(VoteEvent::VoteCounts {
            vote_counts: vote_counts.into_iter().collect(),
            event_id: self.next_event_id(),
        });
        self.connections.insert(
            connection_id.clone(),
            Subscriber {
                sender,
                last_event_id,
            },
        );
        tracing::debug!(%connection_id, last_event_id, "vote stream subscribed");
        (connection_id, receiver)
    }

    /// Removes a connection. Unknown ids are ignored.
    pub fn unsubscribe(&self, connection_id: &str) {
        if self.connections.remove(connection_id).is_some() {
            tracing::debug!(%connection_id, "vote stream unsubscribed");
        }
    }

    /// Publishes a count change to every connection.
    ///
    /// Returns the number of connections that accepted the event.
    pub fn broadcast_vote_update(&self, idea_id: &IdeaId, vote_count: i64) -> usize {
        let event = VoteEvent::VoteUpdate {
            idea_id: idea_id.clone(),
            vote_count,
            event_id: self.next_event_id(),
        };

        let mut delivered = 0usize;
        let mut closed = Vec::new();
        for mut entry in self.connections.iter_mut() {
            if deliver(entry.value_mut(), event.clone()) {
                delivered += 1;
            } else {
                closed.push(entry.key().clone());
            }
        }
        for connection_id in &closed {
            self.unsubscribe(connection_id);
        }
        if !closed.is_empty() {
            tracing::debug!(pruned = closed.len(), "pruned closed vote streams");
        }
        delivered
    }

    /// Returns the current number of registered connections.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Returns the id of the last event enqueued for a connection.
    #[must_use]
    pub fn last_event_id(&self, connection_id: &str) -> Option<u64> {
        self.connections
            .get(connection_id)
            .map(|subscriber| subscriber.last_event_id)
    }

    fn next_event_id(&self) -> u64 {
        self.event_counter.fetch_add(1, Ordering::Relaxed) + 1
    }
}

fn deliver(subscriber: &mut Subscriber, event: VoteEvent) -> bool {
    let event_id = event.event_id();
    if subscriber.sender.send(event).is_err() {
        return false;
    }
    if let Some(id) = event_id {
        subscriber.last_event_id = id;
    }
    true
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn expect_event(rx: &mut VoteEventReceiver) -> VoteEvent {
        let Ok(event) = rx.try_recv() else {
            panic!("expected a queued event");
        };
        event
    }

    fn subscribe_drained(broadcaster: &VoteBroadcaster) -> (ConnectionId, VoteEventReceiver) {
        let (id, mut rx) = broadcaster.subscribe(0, Vec::new());
        let _ = expect_event(&mut rx);
        let _ = expect_event(&mut rx);
        (id, rx)
    }

    #[test]
    fn subscribe_sends_connected_then_snapshot() {
        let broadcaster = VoteBroadcaster::new();
        let idea = IdeaId::from("idea-1");
        let (id, mut rx) = broadcaster.subscribe(0, vec![(idea.clone(), 3)]);
        assert_eq!(
            expect_event(&mut rx),
            VoteEvent::Connected { connection_id: id }
        );
        let VoteEvent::VoteCounts { vote_counts, .. } = expect_event(&mut rx) else {
            panic!("expected snapshot after connected");
        };
        assert_eq!(vote_counts.get(&idea), Some(&3));
        assert!(rx.try_recv().is_err());
        assert_eq!(broadcaster.connection_count(), 1);
    }

    #[test]
    fn updates_after_subscribe_follow_the_snapshot() {
        let broadcaster = VoteBroadcaster::new();
        let idea = IdeaId::from("idea-1");
        let (_other, _rx_other) = subscribe_drained(&broadcaster);
        broadcaster.broadcast_vote_update(&idea, 1);

        let (_id, mut rx) = broadcaster.subscribe(0, vec![(idea.clone(), 1)]);
        broadcaster.broadcast_vote_update(&idea, 2);

        let _ = expect_event(&mut rx);
        let snapshot = expect_event(&mut rx);
        let update = expect_event(&mut rx);
        assert!(matches!(snapshot, VoteEvent::VoteCounts { .. }));
        assert!(matches!(update, VoteEvent::VoteUpdate { vote_count: 2, .. }));
        let (Some(snapshot_id), Some(update_id)) = (snapshot.event_id(), update.event_id())
        else {
            panic!("snapshot and update carry event ids");
        };
        assert!(update_id > snapshot_id);
    }

    #[test]
    fn broadcast_without_connections_returns_zero() {
        let broadcaster = VoteBroadcaster::new();
        assert_eq!(broadcaster.broadcast_vote_update(&IdeaId::from("idea-1"), 1), 0);
    }

    #[test]
    fn every_connection_receives_the_same_update() {
        let broadcaster = VoteBroadcaster::new();
        let (_a, mut rx_a) = subscribe_drained(&broadcaster);
        let (_b, mut rx_b) = subscribe_drained(&broadcaster);

        let idea = IdeaId::from("idea-1");
        assert_eq!(broadcaster.broadcast_vote_update(&idea, 4), 2);

        let a = expect_event(&mut rx_a);
        let b = expect_event(&mut rx_b);
        assert_eq!(a, b);
        assert!(matches!(a, VoteEvent::VoteUpdate { vote_count: 4, .. }));
    }

    #[test]
    fn closed_connections_are_pruned_on_write() {
        let broadcaster = VoteBroadcaster::new();
        let (_kept, _rx_kept) = broadcaster.subscribe(0, Vec::new());
        let (_gone, rx_gone) = broadcaster.subscribe(0, Vec::new());
        drop(rx_gone);
        assert_eq!(broadcaster.connection_count(), 2);

        assert_eq!(broadcaster.broadcast_vote_update(&IdeaId::from("idea-1"), 1), 1);
        assert_eq!(broadcaster.connection_count(), 1);
    }

    #[test]
    fn event_ids_strictly_increase() {
        let broadcaster = VoteBroadcaster::new();
        let (id, mut rx) = broadcaster.subscribe(0, Vec::new());
        let _ = expect_event(&mut rx);

        broadcaster.broadcast_vote_update(&IdeaId::from("idea-1"), 1);
        broadcaster.broadcast_vote_update(&IdeaId::from("idea-1"), 2);

        let ids: Vec<u64> = (0..3)
            .filter_map(|_| expect_event(&mut rx).event_id())
            .collect();
        assert_eq!(ids.len(), 3);
        assert!(ids.windows(2).all(|w| w.first() < w.last()));
        assert_eq!(broadcaster.last_event_id(&id), ids.last().copied());
    }

    #[test]
    fn last_event_id_is_recorded_not_replayed() {
        let broadcaster = VoteBroadcaster::new();
        let (id, mut rx) = broadcaster.subscribe(41, Vec::new());
        assert_eq!(broadcaster.last_event_id(&id), Some(41));
        let _ = expect_event(&mut rx);
        let _ = expect_event(&mut rx);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn unsubscribe_removes_connection() {
        let broadcaster = VoteBroadcaster::new();
        let (id, _rx) = broadcaster.subscribe(0, Vec::new());
        broadcaster.unsubscribe(&id);
        assert_eq!(broadcaster.connection_count(), 0);
        assert_eq!(broadcaster.last_event_id(&id), None);
    }
}
