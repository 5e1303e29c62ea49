//! HTTP-FLV: a `Subscriber` that muxes packets into FLV tags and forwards
//! them over a bounded channel consumed by the HTTP response body (spec
//! §4.7). Grounded on `av.WriteCloser` plus this crate's own
//! `channel::QueueSubscriber`, replacing the teacher's `streamhub`
//! frame-receiver subscription with a direct `Channel::add_subscriber` call.

pub mod handlers;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::channel::errors::{ChannelError, ChannelErrorValue};
use crate::channel::packet::Packet;
use crate::channel::subscriber::Subscriber;
use crate::flv::muxer::FlvMuxer;

/// Subscriber queue depth for the HTTP response channel (spec §4.7).
pub const FLV_RESPONSE_CHANNEL_CAPACITY: usize = 1024;

/// Fans packets from a `Channel` into FLV tags pushed onto an
/// `mpsc::Sender` that an axum streaming body drains. `write` never blocks:
/// a full channel (a client too slow to keep up) drops the frame instead of
/// backing up the publisher's fan-out loop.
pub struct HttpFlvSubscriber {
    muxer: Mutex<FlvMuxer>,
    sender: mpsc::Sender<Bytes>,
    closed: AtomicBool,
}

impl HttpFlvSubscriber {
    #[must_use]
    pub fn new(sender: mpsc::Sender<Bytes>) -> Self {
        Self {
            muxer: Mutex::new(FlvMuxer::new()),
            sender,
            closed: AtomicBool::new(false),
        }
    }
}

impl Subscriber for HttpFlvSubscriber {
    fn write(&self, packet: &Packet) -> Result<(), ChannelError> {
        if self.is_closed() {
            return Err(ChannelErrorValue::Closed.into());
        }

        let bytes = self
            .muxer
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .mux(packet)
            .map_err(|_| ChannelErrorValue::Closed)?;

        match self.sender.try_send(bytes) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("http-flv response channel full, dropping frame");
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(ChannelErrorValue::Closed.into()),
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire) || self.sender.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::packet::{PacketHeader, PacketKind};

    fn pkt() -> Packet {
        Packet {
            kind: PacketKind::Video,
            timestamp: 0,
            stream_id: 1,
            header: PacketHeader::None,
            data: Bytes::from_static(b"x"),
        }
    }

    #[tokio::test]
    async fn first_write_carries_the_flv_header() {
        let (tx, mut rx) = mpsc::channel(4);
        let sub = HttpFlvSubscriber::new(tx);
        sub.write(&pkt()).unwrap();
        let sent = rx.recv().await.unwrap();
        assert!(sent.starts_with(&crate::flv::muxer::FLV_HEADER));
    }

    #[tokio::test]
    async fn closed_receiver_reports_subscriber_closed() {
        let (tx, rx) = mpsc::channel(4);
        drop(rx);
        let sub = HttpFlvSubscriber::new(tx);
        assert!(sub.write(&pkt()).is_err());
    }

    #[test]
    fn close_marks_subscriber_closed() {
        let (tx, _rx) = mpsc::channel(4);
        let sub = HttpFlvSubscriber::new(tx);
        sub.close();
        assert!(sub.is_closed());
    }
}
