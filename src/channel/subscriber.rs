//! Subscriber identity and the non-blocking `Write` contract fan-out calls
//! into. Grounded on `av.WriteCloser` plus the design note (spec §9):
//! "allocate a `uint64` id at subscribe time and use a two-way map" — a
//! `SubscriberId` is the map key, decoupled from the writer object itself.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::errors::{ChannelError, ChannelErrorValue};
use super::packet::Packet;
use super::queue::PacketQueue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

static NEXT_SUBSCRIBER_ID: AtomicU64 = AtomicU64::new(1);

impl SubscriberId {
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_SUBSCRIBER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Anything a Channel can fan packets out to: the RTMP play path, the
/// HTTP-FLV writer, or the HLS `Source`. `write` must never block (spec
/// §4.5/§5); implementations enqueue to their own bounded queue.
pub trait Subscriber: Send + Sync {
    fn write(&self, packet: &Packet) -> Result<(), ChannelError>;
    fn close(&self);
    fn is_closed(&self) -> bool;
}

/// The common subscriber shape used by RTMP players and the HTTP-FLV
/// writer: a private bounded queue drained by a separate writer task.
pub struct QueueSubscriber {
    queue: Arc<PacketQueue>,
}

impl QueueSubscriber {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: Arc::new(PacketQueue::new(capacity)),
        }
    }

    #[must_use]
    pub fn queue(&self) -> Arc<PacketQueue> {
        self.queue.clone()
    }
}

impl Subscriber for QueueSubscriber {
    fn write(&self, packet: &Packet) -> Result<(), ChannelError> {
        if self.queue.is_closed() {
            return Err(ChannelErrorValue::Closed.into());
        }
        self.queue.push(packet.shallow_clone());
        Ok(())
    }

    fn close(&self) {
        self.queue.close();
    }

    fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }
}
