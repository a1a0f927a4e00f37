//! Transport boundary: the pub/sub gateway is an external collaborator,
//! so the engine only owns bounded channels at its edge. Inbound
//! messages are pushed by transport threads and drained at tick start;
//! outbound messages are published on the tick thread.
//!
//! Outbound delivery uses a `watch` channel per player rather than an
//! mpsc queue: a `watch` only ever holds the latest value, so a slow
//! subscriber misses superseded ticks instead of the queue filling up —
//! freshness over completeness.

use std::collections::HashMap;

use tokio::sync::{mpsc, watch};
use uuid::Uuid;

use crate::messages::{JoinGameMsg, OutboundMessage, UpdatePositionMsg};

/// Inbound channel pair drained by the input ingestor (C5).
pub struct Inbound {
    pub join_rx: mpsc::Receiver<JoinGameMsg>,
    pub update_rx: mpsc::Receiver<UpdatePositionMsg>,
}

/// Senders handed to the transport layer; the engine keeps the
/// receivers.
pub struct InboundHandles {
    pub join_tx: mpsc::Sender<JoinGameMsg>,
    pub update_tx: mpsc::Sender<UpdatePositionMsg>,
}

/// Default inbound queue depth for the bounded channels at the transport
/// boundary.
pub const INBOUND_QUEUE_CAPACITY: usize = 1024;

pub fn inbound_channel() -> (InboundHandles, Inbound) {
    let (join_tx, join_rx) = mpsc::channel(INBOUND_QUEUE_CAPACITY);
    let (update_tx, update_rx) = mpsc::channel(INBOUND_QUEUE_CAPACITY);
    (
        InboundHandles { join_tx, update_tx },
        Inbound { join_rx, update_rx },
    )
}

/// Per-player outbound mailboxes, keyed by player UUID. One `watch`
/// slot per player; registering a player hands back the receiver half
/// for the transport to subscribe to.
#[derive(Default)]
pub struct OutboundBus {
    senders: HashMap<Uuid, watch::Sender<Option<OutboundMessage>>>,
}

impl OutboundBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, player_id: Uuid) -> watch::Receiver<Option<OutboundMessage>> {
        let (tx, rx) = watch::channel(None);
        self.senders.insert(player_id, tx);
        rx
    }

    pub fn unregister(&mut self, player_id: &Uuid) {
        self.senders.remove(player_id);
    }

    /// Publish to topic `player:{uuid}`. Best-effort: if nobody is
    /// subscribed (or the receiver was dropped), the send is silently
    /// skipped.
    pub fn publish(&self, player_id: Uuid, message: OutboundMessage) {
        if let Some(tx) = self.senders.get(&player_id) {
            let _ = tx.send(Some(message));
        }
    }
}
