//! HTTP handler for the `.flv` progressive-download endpoint (spec §4.7).
//! Grounded on `hls::handlers`'s extractor/`State<Arc<App>>` shape, with the
//! stream name recovered from a single `<stream>.flv` path segment the way
//! the teacher's HLS server strips `.ts` off a combined segment filename.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::channel::{App, SubscriberId};

use super::{HttpFlvSubscriber, FLV_RESPONSE_CHANNEL_CAPACITY};

pub const FLV_CONTENT_TYPE: &str = "video/x-flv";

/// `GET /<app>/<stream>.flv`: registers a fresh `HttpFlvSubscriber` on the
/// named channel and streams its output as the response body. 404s if the
/// channel doesn't exist or isn't currently being published to.
pub async fn serve_flv(State(app): State<Arc<App>>, Path((app_name, file_name)): Path<(String, String)>) -> Response {
    let Some(stream_name) = file_name.strip_suffix(".flv") else {
        return (StatusCode::NOT_FOUND, "not an flv request").into_response();
    };
    let channel_name = format!("{app_name}/{stream_name}");

    let Ok(channel) = app.get_channel(&channel_name) else {
        return (StatusCode::NOT_FOUND, "channel not found").into_response();
    };

    let (tx, rx) = mpsc::channel(FLV_RESPONSE_CHANNEL_CAPACITY);
    let subscriber = Arc::new(HttpFlvSubscriber::new(tx));
    if channel.add_subscriber(SubscriberId::next(), subscriber).is_err() {
        return (StatusCode::NOT_FOUND, "channel closed").into_response();
    }

    let stream = ReceiverStream::new(rx).map(Ok::<_, std::io::Error>);
    let body = Body::from_stream(stream);

    ([(header::CONTENT_TYPE, FLV_CONTENT_TYPE)], body).into_response()
}
