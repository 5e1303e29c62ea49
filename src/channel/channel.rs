//! The per-stream-name publish/subscribe hub. Grounded on `server/channel.go`:
//! a single publisher loop reads packets, writes them into the Cache, then
//! fans each packet out to every subscriber directly from the reader task —
//! no actor, no broadcast channel, no transceiver event loop. A late-joining
//! subscriber gets the cache replay on its first fan-out pass instead of a
//! live packet.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use futures::{Stream, StreamExt};

use crate::hls::source::Source;

use super::cache::Cache;
use super::errors::{ChannelError, ChannelErrorValue};
use super::packet::Packet;
use super::subscriber::{Subscriber, SubscriberId};

struct SubscriberEntry {
    subscriber: Arc<dyn Subscriber>,
    inited: AtomicBool,
}

/// A single named stream: one publisher at a time, any number of
/// subscribers. Subscribers may attach and detach at any point during or
/// between publications (spec §4.5/§7).
pub struct Channel {
    name: String,
    in_publication: AtomicBool,
    closed: AtomicBool,
    subscribers: DashMap<SubscriberId, Arc<SubscriberEntry>>,
    gop_max_packets: usize,
    hls_source: OnceLock<Arc<Source>>,
}

impl Channel {
    #[must_use]
    pub fn new(name: impl Into<String>, gop_max_packets: usize) -> Self {
        Self {
            name: name.into(),
            in_publication: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            subscribers: DashMap::new(),
            gop_max_packets,
            hls_source: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_in_publication(&self) -> bool {
        self.in_publication.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Lazily creates the channel's HLS segmenter, registers it as a
    /// subscriber, and spawns its segmenter task — at most once per
    /// channel (spec §4.3 "optional HLS subscriber handle", grounded on
    /// `server/channel.go`'s `hlsOnce`/`InitHlsPlayer`). Repeated calls
    /// return the same handle.
    pub fn init_hls_player(&self) -> Result<Arc<Source>, ChannelError> {
        if self.is_closed() {
            return Err(ChannelErrorValue::Closed.into());
        }
        let mut created = false;
        let source = self
            .hls_source
            .get_or_init(|| {
                created = true;
                Source::new()
            })
            .clone();
        if created {
            self.add_subscriber(SubscriberId::next(), source.clone())?;
            tokio::spawn(source.clone().run());
        }
        Ok(source)
    }

    #[must_use]
    pub fn hls_source(&self) -> Option<Arc<Source>> {
        self.hls_source.get().cloned()
    }

    #[must_use]
    pub fn is_hls_initialized(&self) -> bool {
        self.hls_source.get().is_some()
    }

    /// Synchronously claims publisher exclusivity without running the
    /// publication loop. Callers that must know the claim's outcome before
    /// replying to the publisher (spec §4.3/§8 scenario 5: exactly one
    /// publisher gets `NetStream.Publish.Start`) should call this directly
    /// instead of `push_start`, then drive the stream with
    /// `run_claimed_publication` once the claim is known to have won.
    pub fn try_claim_publication(&self) -> Result<(), ChannelError> {
        if self.is_closed() {
            return Err(ChannelErrorValue::Closed.into());
        }
        if self
            .in_publication
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ChannelErrorValue::AlreadyInPublication.into());
        }
        Ok(())
    }

    /// Drains `pusher` until it ends or the channel closes, and releases
    /// publisher exclusivity on the way out. The caller must already hold
    /// the claim, e.g. via a prior successful `try_claim_publication` call —
    /// a stream ending (network drop, explicit unpublish) always frees the
    /// slot for the next publisher (spec §4.5 step 3/§7).
    pub async fn run_claimed_publication<S>(&self, pusher: S) -> Result<(), ChannelError>
    where
        S: Stream<Item = Packet> + Unpin,
    {
        let result = self.run_publication(pusher).await;
        self.in_publication.store(false, Ordering::Release);
        result
    }

    /// Claims publisher exclusivity, drains `pusher` until it ends or the
    /// channel closes, and releases exclusivity on the way out — a stream
    /// ending (network drop, explicit unpublish) always frees the slot for
    /// the next publisher (spec §4.5 step 3/§7).
    pub async fn push_start<S>(&self, pusher: S) -> Result<(), ChannelError>
    where
        S: Stream<Item = Packet> + Unpin,
    {
        self.try_claim_publication()?;
        self.run_claimed_publication(pusher).await
    }

    async fn run_publication<S>(&self, mut pusher: S) -> Result<(), ChannelError>
    where
        S: Stream<Item = Packet> + Unpin,
    {
        let cache = Cache::new(self.gop_max_packets);

        while let Some(packet) = pusher.next().await {
            if self.is_closed() {
                return Ok(());
            }
            cache.write(&packet);
            self.fan_out(&cache, &packet);
        }
        Ok(())
    }

    fn fan_out(&self, cache: &Cache, packet: &Packet) {
        let snapshot: Vec<(SubscriberId, Arc<SubscriberEntry>)> = self
            .subscribers
            .iter()
            .map(|e| (*e.key(), e.value().clone()))
            .collect();

        let mut failed = Vec::new();
        for (id, entry) in snapshot {
            let result = if entry.inited.swap(true, Ordering::AcqRel) {
                entry.subscriber.write(packet)
            } else {
                cache.send(entry.subscriber.as_ref())
            };
            if result.is_err() {
                failed.push(id);
            }
        }
        for id in failed {
            self.remove_subscriber(id);
        }
    }

    /// Attaches a new subscriber. It receives the cache replay on the next
    /// packet the publisher forwards, not synchronously here, matching the
    /// source's `Inited()` lazy-catch-up semantics.
    pub fn add_subscriber(&self, id: SubscriberId, subscriber: Arc<dyn Subscriber>) -> Result<(), ChannelError> {
        if self.is_closed() {
            return Err(ChannelErrorValue::Closed.into());
        }
        if self.subscribers.contains_key(&id) {
            return Err(ChannelErrorValue::SubscriberExists.into());
        }
        self.subscribers.insert(
            id,
            Arc::new(SubscriberEntry {
                subscriber,
                inited: AtomicBool::new(false),
            }),
        );
        Ok(())
    }

    pub fn remove_subscriber(&self, id: SubscriberId) {
        if let Some((_, entry)) = self.subscribers.remove(&id) {
            entry.subscriber.close();
        }
    }

    /// Idempotent: closing an already-closed channel is a no-op, matching
    /// `Channel.Close` returning `ErrClosed` on a second call discarded by
    /// every caller in the source (spec §7/§8).
    pub fn close(&self) {
        if self
            .closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        for entry in &self.subscribers {
            entry.value().subscriber.close();
        }
        self.subscribers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::packet::{PacketHeader, PacketKind};
    use bytes::Bytes;
    use futures::stream;
    use parking_lot::Mutex;

    fn pkt(ts: u32) -> Packet {
        Packet {
            kind: PacketKind::Video,
            timestamp: ts,
            stream_id: 1,
            header: PacketHeader::None,
            data: Bytes::new(),
        }
    }

    struct Recorder(Mutex<Vec<u32>>);
    impl Subscriber for Recorder {
        fn write(&self, p: &Packet) -> Result<(), ChannelError> {
            self.0.lock().push(p.timestamp);
            Ok(())
        }
        fn close(&self) {}
        fn is_closed(&self) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn second_publisher_is_rejected_while_first_is_active() {
        let channel = Arc::new(Channel::new("live", 1024));
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<Packet>();
        let stream = tokio_stream::wrappers::UnboundedReceiverStream::new(rx);

        let ch = channel.clone();
        let handle = tokio::spawn(async move { ch.push_start(stream).await });

        tokio::task::yield_now().await;
        assert!(channel.is_in_publication());
        let err = channel.push_start(stream::empty()).await.unwrap_err();
        assert!(matches!(err.value, ChannelErrorValue::AlreadyInPublication));

        drop(tx);
        handle.await.unwrap().unwrap();
        assert!(!channel.is_in_publication());
    }

    #[tokio::test]
    async fn subscriber_receives_live_packets_after_catching_up() {
        let channel = Channel::new("live", 1024);
        let rec = Arc::new(Recorder(Mutex::new(Vec::new())));
        channel.add_subscriber(SubscriberId::next(), rec.clone()).unwrap();

        let packets = vec![pkt(1), pkt(2), pkt(3)];
        channel.push_start(stream::iter(packets)).await.unwrap();

        assert_eq!(rec.0.lock().clone(), vec![2, 3]);
    }
}
