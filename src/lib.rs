//! A live media streaming engine: RTMP ingest, per-channel fan-out with a
//! GOP cache, and live transcontainerization into HLS and HTTP-FLV.
//!
//! This crate owns the protocol machinery and the publisher/subscriber
//! registry (`App`/`Channel`); it does not bundle an HTTP router, CORS, or
//! TLS setup — `hls::handlers` and `httpflv::handlers` are axum handler
//! functions meant to be mounted by a host application's own router.

pub mod aac;
pub mod amf0;
pub mod bytesio;
pub mod channel;
pub mod codec;
pub mod config;
pub mod error;
pub mod flv;
pub mod h264;
pub mod hls;
pub mod httpflv;
pub mod mpegts;
pub mod rtmp;
pub mod timestamp;

pub use channel::App;
pub use config::EngineConfig;
pub use error::EngineError;
pub use rtmp::RtmpServer;
