//! A bounded packet queue with the slow-consumer drop policy from spec §5:
//! enqueue never blocks; on overflow it drops up to `drop_batch` packets
//! from the head and retries until a slot is free or the queue drains
//! entirely. Dequeue blocks until a packet is available or the queue is
//! closed, giving subscriber writer tasks their cancellation signal.
//!
//! This replaces the teacher's Go-channel-based `av.DropPacket`, which
//! relies on a Go channel being readable from the writer side; Rust's
//! `mpsc` does not allow that, so the drop policy is implemented directly
//! over a `VecDeque` guarded by a `parking_lot::Mutex`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::Notify;

use super::packet::Packet;

pub const DEFAULT_DROP_BATCH: usize = 128;

#[derive(Debug, Default)]
pub struct QueueStats {
    pub forwarded: AtomicU64,
    pub dropped: AtomicU64,
}

pub struct PacketQueue {
    inner: Mutex<VecDeque<Packet>>,
    capacity: usize,
    drop_batch: usize,
    notify: Notify,
    closed: AtomicBool,
    pub stats: QueueStats,
}

impl PacketQueue {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_drop_batch(capacity, DEFAULT_DROP_BATCH)
    }

    #[must_use]
    pub fn with_drop_batch(capacity: usize, drop_batch: usize) -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
            drop_batch,
            notify: Notify::new(),
            closed: AtomicBool::new(false),
            stats: QueueStats::default(),
        }
    }

    /// Non-blocking enqueue. Returns `false` if the queue is closed.
    pub fn push(&self, packet: Packet) -> bool {
        if self.closed.load(Ordering::Acquire) {
            return false;
        }
        {
            let mut guard = self.inner.lock();
            while guard.len() >= self.capacity && !guard.is_empty() {
                let drop_n = self.drop_batch.min(guard.len());
                for _ in 0..drop_n {
                    guard.pop_front();
                }
                self.stats.dropped.fetch_add(drop_n as u64, Ordering::Relaxed);
            }
            guard.push_back(packet);
        }
        self.stats.forwarded.fetch_add(1, Ordering::Relaxed);
        self.notify.notify_one();
        true
    }

    /// Blocks until a packet is available or the queue is closed and
    /// drained, mirroring "channel-close on the inbound queue serves as
    /// the cancellation signal" (spec §5).
    pub async fn pop(&self) -> Option<Packet> {
        loop {
            {
                let mut guard = self.inner.lock();
                if let Some(p) = guard.pop_front() {
                    return Some(p);
                }
                if self.closed.load(Ordering::Acquire) {
                    return None;
                }
            }
            self.notify.notified().await;
        }
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::packet::{Packet, PacketHeader, PacketKind};
    use bytes::Bytes;

    fn pkt(ts: u32) -> Packet {
        Packet {
            kind: PacketKind::Video,
            timestamp: ts,
            stream_id: 1,
            header: PacketHeader::None,
            data: Bytes::new(),
        }
    }

    #[test]
    fn drop_safety_queue_stays_within_capacity() {
        let q = PacketQueue::new(8);
        for i in 0..1000u32 {
            q.push(pkt(i));
        }
        assert!(q.len() <= 8);
        assert!(q.stats.dropped.load(Ordering::Relaxed) > 0);
    }

    #[tokio::test]
    async fn pop_returns_none_after_close_and_drain() {
        let q = PacketQueue::new(4);
        q.push(pkt(1));
        q.close();
        assert!(q.pop().await.is_some());
        assert!(q.pop().await.is_none());
    }

    #[test]
    fn push_after_close_is_rejected() {
        let q = PacketQueue::new(4);
        q.close();
        assert!(!q.push(pkt(1)));
    }
}
