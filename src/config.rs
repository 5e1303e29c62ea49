//! Engine-wide defaults (spec §6). Grounded on `configure/config.go`'s flat
//! `Config` struct; this crate has no config-file loader of its own (the
//! host application owns deployment configuration), so `EngineConfig` is
//! just the struct plus `Default`.

/// Subscriber queue depth for the HTTP-FLV writer path (spec §4.7).
pub const HTTP_FLV_QUEUE_CAPACITY: usize = 1024;
/// Subscriber queue depth for an RTMP play session.
pub const RTMP_PLAY_QUEUE_CAPACITY: usize = 1024;
/// Subscriber queue depth feeding the HLS segmenter (spec §4.3).
pub const HLS_QUEUE_CAPACITY: usize = 512;
/// Packets dropped from the head of a full subscriber queue per overflow
/// (spec §5).
pub const DROP_BATCH_SIZE: usize = 128;

/// Engine-wide tunables handed to `RtmpServer`/`HttpServer` at startup.
/// Grounded on `configure/config.go`; fields not yet wired into this crate
/// (storage backend, statistics) were dropped as out of scope rather than
/// ported unused.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Read-buffer size for each RTMP connection's socket reads.
    pub conn_buffer_size: usize,
    /// Whether a channel lazily starts an HLS segmenter on first publish.
    pub init_hls_player: bool,
    /// Target duration of one HLS segment.
    pub hls_segment_duration_ms: u32,
    /// Rolling HLS segment cache capacity (spec §9.1).
    pub hls_segment_cache_capacity: usize,
    /// Max packets retained per GOP cache for late-joining subscribers.
    pub gop_max_packets: usize,
    /// Max concurrent RTMP connections accepted.
    pub max_rtmp_connections: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            conn_buffer_size: 4096,
            init_hls_player: true,
            hls_segment_duration_ms: 3000,
            hls_segment_cache_capacity: 5,
            gop_max_packets: 1024,
            max_rtmp_connections: 1000,
        }
    }
}
