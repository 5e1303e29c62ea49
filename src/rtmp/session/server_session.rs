//! Per-connection RTMP state machine: handshake, then a chunk-read loop
//! that drives `connect`/`createStream`/`publish`/`play` into the shared
//! `channel::App` registry (spec §4.2/§4.5/§4.8). Grounded on
//! `session/server_session.go`, replacing its `streamhub` event-channel
//! plumbing with direct `Channel::push_start`/`Channel::add_subscriber`
//! calls — this crate's fan-out hub needs no actor indirection.

use std::sync::Arc;

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::amf0::value::Amf0Value;
use crate::channel::{App, Channel, Packet, QueueSubscriber, Subscriber, SubscriberId};
use crate::flv::demuxer::FlvDemuxer;

use super::super::auth::AuthCallback;
use super::super::chunk::define::{CSID_AUDIO, CSID_COMMAND, CSID_PROTOCOL_CONTROL, CSID_VIDEO};
use super::super::chunk::errors::UnpackErrorValue;
use super::super::chunk::packetizer::ChunkPacketizer;
use super::super::chunk::unpacketizer::{ChunkUnpacketizer, UnpackResult};
use super::super::handshake;
use super::super::messages::{self, define::msg_type_id, RtmpMessage};
use super::super::netconnection::{NetConnectionReader, NetConnectionWriter};
use super::super::protocol_control_messages::ControlMessagesWriter;
use super::super::user_control_messages::EventMessagesWriter;
use super::errors::{SessionError, SessionErrorValue};

const READ_CHUNK_SIZE: usize = 4096;
const DEFAULT_WINDOW_ACK_SIZE: u32 = 5_000_000;
const DEFAULT_PEER_BANDWIDTH: u32 = 5_000_000;
const STREAM_ID: u32 = 1;

struct PublishState {
    channel: Arc<Channel>,
    tx: mpsc::UnboundedSender<Packet>,
    app_name: String,
    stream_name: String,
}

struct PlayState {
    channel: Arc<Channel>,
    subscriber_id: SubscriberId,
    app_name: String,
    stream_name: String,
}

pub struct ServerSession {
    app: Arc<App>,
    auth: Option<Arc<dyn AuthCallback>>,
    unpacketizer: ChunkUnpacketizer,
    packetizer: ChunkPacketizer,
    conn_reader: NetConnectionReader,
    conn_writer: NetConnectionWriter,
    control_writer: ControlMessagesWriter,
    event_writer: EventMessagesWriter,
    demuxer: FlvDemuxer,
    write_half: Arc<Mutex<OwnedWriteHalf>>,
    publish: Option<PublishState>,
    play: Option<PlayState>,
    app_name: String,
    /// Bytes read from the socket since the last `Acknowledgement` we sent
    /// (spec §4.1: ack the peer once the received-byte count crosses the
    /// window we declared in `connect`'s reply).
    bytes_received: u32,
    bytes_received_at_last_ack: u32,
    window_ack_size: u32,
}

impl ServerSession {
    pub async fn run(tcp_stream: TcpStream, app: Arc<App>, auth: Option<Arc<dyn AuthCallback>>) -> Result<(), SessionError> {
        let mut stream = tcp_stream;
        handshake::perform_server_handshake(&mut stream).await?;

        let (mut read_half, write_half) = stream.into_split();
        let mut session = Self {
            app,
            auth,
            unpacketizer: ChunkUnpacketizer::new(),
            packetizer: ChunkPacketizer::default(),
            conn_reader: NetConnectionReader::new(),
            conn_writer: NetConnectionWriter::new(),
            control_writer: ControlMessagesWriter::new(),
            event_writer: EventMessagesWriter::new(),
            demuxer: FlvDemuxer::new(),
            write_half: Arc::new(Mutex::new(write_half)),
            publish: None,
            play: None,
            app_name: String::new(),
            bytes_received: 0,
            bytes_received_at_last_ack: 0,
            window_ack_size: DEFAULT_WINDOW_ACK_SIZE,
        };

        let result = session.read_loop(&mut read_half).await;
        session.teardown().await;
        result
    }

    async fn read_loop(&mut self, read_half: &mut tokio::net::tcp::OwnedReadHalf) -> Result<(), SessionError> {
        let mut buf = vec![0u8; READ_CHUNK_SIZE];
        loop {
            let n = read_half.read(&mut buf).await.map_err(|e| {
                SessionError::from(crate::bytesio::bytesio_errors::BytesIOError::from(e))
            })?;
            if n == 0 {
                return Ok(());
            }
            self.bytes_received = self.bytes_received.wrapping_add(n as u32);
            if self.bytes_received.wrapping_sub(self.bytes_received_at_last_ack) >= self.window_ack_size {
                self.bytes_received_at_last_ack = self.bytes_received;
                let ack = self.control_writer.write_acknowledgement(self.bytes_received)?;
                self.write_message(CSID_PROTOCOL_CONTROL, msg_type_id::ACKNOWLEDGEMENT, &ack).await?;
            }
            self.unpacketizer.extend_data(&buf[..n]).map_err(SessionError::from)?;

            loop {
                match self.unpacketizer.read_chunk() {
                    Ok(UnpackResult::ChunkInfo(chunk)) => {
                        let message = messages::classify(chunk)?;
                        self.handle_message(message).await?;
                    }
                    Ok(_) => continue,
                    Err(err) if matches!(err.value, UnpackErrorValue::CannotParse) => {
                        return Err(err.into());
                    }
                    Err(_) => break,
                }
            }
        }
    }

    async fn handle_message(&mut self, message: RtmpMessage) -> Result<(), SessionError> {
        match message {
            RtmpMessage::SetChunkSize(size) => {
                self.unpacketizer.update_max_chunk_size(size as usize);
            }
            RtmpMessage::Amf0Command { timestamp: _, payload } => {
                self.handle_command(payload).await?;
            }
            RtmpMessage::Amf0Data { timestamp, payload } => {
                if let Some(publish) = &self.publish {
                    let packet = self.demuxer.demux_metadata(timestamp, payload);
                    let _ = publish.tx.send(packet);
                }
            }
            RtmpMessage::Audio { timestamp, payload } => {
                if let Some(publish) = &self.publish {
                    match self.demuxer.demux_audio(timestamp, payload, false) {
                        Ok(packet) => {
                            let _ = publish.tx.send(packet);
                        }
                        Err(err) => tracing::warn!("dropping unparsable audio packet: {err}"),
                    }
                }
            }
            RtmpMessage::Video { timestamp, payload } => {
                if let Some(publish) = &self.publish {
                    match self.demuxer.demux_video(timestamp, payload, false) {
                        Ok(packet) => {
                            let _ = publish.tx.send(packet);
                        }
                        Err(err) => tracing::debug!("dropping video packet: {err}"),
                    }
                }
            }
            RtmpMessage::WindowAckSize(size) => {
                self.window_ack_size = size;
            }
            RtmpMessage::SetPeerBandwidth { .. } | RtmpMessage::Acknowledgement(_) => {}
            RtmpMessage::Unknown { msg_type_id } => {
                tracing::trace!("ignoring unhandled rtmp message type {msg_type_id}");
            }
        }
        Ok(())
    }

    async fn handle_command(&mut self, payload: Bytes) -> Result<(), SessionError> {
        let (name, transaction_id, args) = self.conn_reader.read_command(payload)?;

        match name.as_str() {
            "connect" => self.on_connect(transaction_id, &args).await,
            "createStream" => self.on_create_stream(transaction_id).await,
            "publish" => self.on_publish(&args).await,
            "play" => self.on_play(&args).await,
            "deleteStream" | "closeStream" | "FCUnpublish" => {
                self.stop_publish().await;
                self.stop_play().await;
                Ok(())
            }
            _ => {
                tracing::trace!("ignoring rtmp command: {name}");
                Ok(())
            }
        }
    }

    async fn on_connect(&mut self, transaction_id: f64, args: &[Amf0Value]) -> Result<(), SessionError> {
        self.app_name = args
            .first()
            .and_then(Amf0Value::as_object)
            .and_then(|o| o.get("app"))
            .and_then(Amf0Value::as_str)
            .ok_or(SessionErrorValue::NoAppName)?
            .to_string();

        self.write_message(
            CSID_PROTOCOL_CONTROL,
            msg_type_id::WIN_ACK_SIZE,
            &self.control_writer.write_window_ack_size(DEFAULT_WINDOW_ACK_SIZE)?,
        )
        .await?;
        self.write_message(
            CSID_PROTOCOL_CONTROL,
            msg_type_id::SET_PEER_BANDWIDTH,
            &self.control_writer.write_set_peer_bandwidth(DEFAULT_PEER_BANDWIDTH, 2)?,
        )
        .await?;
        self.write_message(
            CSID_COMMAND,
            msg_type_id::COMMAND_AMF0,
            &self.conn_writer.write_connect_response(transaction_id)?,
        )
        .await
    }

    async fn on_create_stream(&mut self, transaction_id: f64) -> Result<(), SessionError> {
        self.write_message(
            CSID_COMMAND,
            msg_type_id::COMMAND_AMF0,
            &self.conn_writer.write_create_stream_response(transaction_id, f64::from(STREAM_ID))?,
        )
        .await
    }

    async fn on_publish(&mut self, args: &[Amf0Value]) -> Result<(), SessionError> {
        let stream_name = args
            .get(1)
            .and_then(Amf0Value::as_str)
            .ok_or(SessionErrorValue::NoStreamName)?
            .to_string();

        if let Some(auth) = &self.auth {
            auth.on_publish(&self.app_name, &stream_name, None)
                .await
                .map_err(|e| SessionErrorValue::AuthFailed(e.to_string()))?;
        }

        let full_name = format!("{}/{}", self.app_name, stream_name);
        let channel = self.app.get_or_new_channel(&full_name);

        // Claim publisher exclusivity synchronously, before replying, so a
        // losing concurrent publisher never hears `Publish.Start` (spec §4.3,
        // §8 scenario 5).
        if let Err(err) = channel.try_claim_publication() {
            self.write_message(
                CSID_COMMAND,
                msg_type_id::COMMAND_AMF0,
                &self
                    .conn_writer
                    .write_on_status("error", "NetStream.Publish.BadName", "stream name already in use")?,
            )
            .await?;
            return Err(err.into());
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let driven_channel = channel.clone();
        tokio::spawn(async move {
            let stream = UnboundedReceiverStream::new(rx);
            if let Err(err) = driven_channel.run_claimed_publication(stream).await {
                tracing::warn!("publication ended: {err}");
            }
        });

        self.publish = Some(PublishState {
            channel,
            tx,
            app_name: self.app_name.clone(),
            stream_name,
        });

        self.write_message(
            CSID_COMMAND,
            msg_type_id::COMMAND_AMF0,
            &self.conn_writer.write_on_status("status", "NetStream.Publish.Start", "publishing")?,
        )
        .await
    }

    async fn on_play(&mut self, args: &[Amf0Value]) -> Result<(), SessionError> {
        let stream_name = args
            .get(1)
            .and_then(Amf0Value::as_str)
            .ok_or(SessionErrorValue::NoStreamName)?
            .to_string();

        if let Some(auth) = &self.auth {
            auth.on_play(&self.app_name, &stream_name, None)
                .await
                .map_err(|e| SessionErrorValue::AuthFailed(e.to_string()))?;
        }

        let full_name = format!("{}/{}", self.app_name, stream_name);
        let channel = self.app.get_or_new_channel(&full_name);

        let subscriber_id = SubscriberId::next();
        let subscriber = Arc::new(QueueSubscriber::new(crate::config::RTMP_PLAY_QUEUE_CAPACITY));
        let queue = subscriber.queue();
        channel.add_subscriber(subscriber_id, subscriber)?;

        self.play = Some(PlayState {
            channel,
            subscriber_id,
            app_name: self.app_name.clone(),
            stream_name,
        });

        let write_half = self.write_half.clone();
        let packetizer = ChunkPacketizer::default();
        tokio::spawn(async move {
            while let Some(packet) = queue.pop().await {
                let (csid, type_id) = match packet.kind {
                    crate::channel::packet::PacketKind::Audio => (CSID_AUDIO, msg_type_id::AUDIO),
                    crate::channel::packet::PacketKind::Video => (CSID_VIDEO, msg_type_id::VIDEO),
                    crate::channel::packet::PacketKind::Metadata => (CSID_COMMAND, msg_type_id::DATA_AMF0),
                };
                let Ok(bytes) = packetizer.write_message(csid, packet.timestamp, type_id, STREAM_ID, &packet.data) else {
                    break;
                };
                let mut guard = write_half.lock().await;
                if guard.write_all(&bytes).await.is_err() {
                    break;
                }
            }
        });

        // The `play` transition emits StreamBegin + StreamIsRecorded user
        // control events, then four onStatus messages in order (spec §4.3).
        self.write_message(
            CSID_PROTOCOL_CONTROL,
            msg_type_id::USER_CONTROL_EVENT,
            &self.event_writer.write_stream_begin(STREAM_ID)?,
        )
        .await?;
        self.write_message(
            CSID_PROTOCOL_CONTROL,
            msg_type_id::USER_CONTROL_EVENT,
            &self.event_writer.write_stream_is_recorded(STREAM_ID)?,
        )
        .await?;

        for (code, description) in [
            ("NetStream.Play.Reset", "playback reset"),
            ("NetStream.Play.Start", "playing"),
            ("NetStream.Data.Start", "data start"),
            ("NetStream.Play.PublishNotify", "publish notify"),
        ] {
            self.write_message(
                CSID_COMMAND,
                msg_type_id::COMMAND_AMF0,
                &self.conn_writer.write_on_status("status", code, description)?,
            )
            .await?;
        }

        Ok(())
    }

    async fn write_message(&self, csid: u32, msg_type_id: u8, payload: &[u8]) -> Result<(), SessionError> {
        let bytes = self.packetizer.write_message(csid, 0, msg_type_id, STREAM_ID, payload)?;
        let mut guard = self.write_half.lock().await;
        guard
            .write_all(&bytes)
            .await
            .map_err(|e| SessionError::from(crate::bytesio::bytesio_errors::BytesIOError::from(e)))
    }

    async fn stop_publish(&mut self) {
        if let Some(publish) = self.publish.take() {
            drop(publish.tx);
            drop(publish.channel);
            if let Some(auth) = &self.auth {
                auth.on_unpublish(&publish.app_name, &publish.stream_name, None).await;
            }
        }
    }

    async fn stop_play(&mut self) {
        if let Some(play) = self.play.take() {
            play.channel.remove_subscriber(play.subscriber_id);
            if let Some(auth) = &self.auth {
                auth.on_unplay(&play.app_name, &play.stream_name, None).await;
            }
        }
    }

    async fn teardown(&mut self) {
        self.stop_publish().await;
        self.stop_play().await;
    }
}
