//! HTTP handlers for the `.m3u8`/`.ts` endpoints (spec §6). URL routing
//! itself — mapping `/<app>/<channel>...` onto these handlers — is an
//! external collaborator (spec §1); these functions only need the channel
//! name and, for segments, the stripped TS name.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::channel::App;

use super::playlist;

pub const M3U8_CONTENT_TYPE: &str = "application/x-mpegURL";
pub const TS_CONTENT_TYPE: &str = "video/mp2ts";

/// `GET /<app>/<stream>/index.m3u8`: the current playlist, or 404 if no
/// HLS subscriber has been initialized for the channel (spec §6).
pub async fn serve_playlist(
    State(app): State<Arc<App>>,
    Path((app_name, stream_name)): Path<(String, String)>,
) -> Response {
    let channel_name = format!("{app_name}/{stream_name}");
    let Ok(channel) = app.get_channel(&channel_name) else {
        return (StatusCode::NOT_FOUND, "channel not found").into_response();
    };
    let Some(source) = channel.hls_source() else {
        return (StatusCode::NOT_FOUND, "hls player not initialized").into_response();
    };

    let cache = source.segment_cache();
    let body = playlist::generate(&cache, |name| format!("{name}.ts"));
    ([(header::CONTENT_TYPE, M3U8_CONTENT_TYPE)], body).into_response()
}

/// `GET /<app>/<stream>/<ts-name>.ts`: the cached segment bytes, or 404
/// if the channel, HLS source, or named segment doesn't exist.
pub async fn serve_segment(
    State(app): State<Arc<App>>,
    Path((app_name, stream_name, segment_filename)): Path<(String, String, String)>,
) -> Response {
    let channel_name = format!("{app_name}/{stream_name}");

    let Ok(channel) = app.get_channel(&channel_name) else {
        return (StatusCode::NOT_FOUND, "channel not found").into_response();
    };
    let Some(source) = channel.hls_source() else {
        return (StatusCode::NOT_FOUND, "hls player not initialized").into_response();
    };

    match source.segment_cache().get(&segment_filename) {
        Some(segment) => ([(header::CONTENT_TYPE, TS_CONTENT_TYPE)], segment.data).into_response(),
        None => (StatusCode::NOT_FOUND, "segment not found").into_response(),
    }
}
