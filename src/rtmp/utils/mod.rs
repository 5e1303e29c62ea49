//! RTMP URL parsing: `rtmp://host[:port]/app/stream[?query]` into its
//! `(app, stream, query)` parts. Grounded on `utils/rtmp_url_parse.go`.

pub mod errors;

use errors::{RtmpUrlParseError, RtmpUrlParseErrorValue};

pub struct RtmpUrlParts {
    pub app_name: String,
    pub stream_name: String,
    pub query: Option<String>,
}

pub fn parse(url: &str) -> Result<RtmpUrlParts, RtmpUrlParseError> {
    let without_scheme = url
        .strip_prefix("rtmp://")
        .ok_or(RtmpUrlParseErrorValue::Notvalid)?;

    let path_start = without_scheme.find('/').ok_or(RtmpUrlParseErrorValue::Notvalid)?;
    let path = &without_scheme[path_start + 1..];

    let (path, query) = match path.split_once('?') {
        Some((p, q)) => (p, Some(q.to_string())),
        None => (path, None),
    };

    let mut parts = path.splitn(2, '/');
    let app_name = parts.next().filter(|s| !s.is_empty()).ok_or(RtmpUrlParseErrorValue::Notvalid)?;
    let stream_name = parts.next().filter(|s| !s.is_empty()).ok_or(RtmpUrlParseErrorValue::Notvalid)?;

    Ok(RtmpUrlParts {
        app_name: app_name.to_string(),
        stream_name: stream_name.to_string(),
        query,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_app_and_stream_name() {
        let parts = parse("rtmp://localhost/live/stream1").unwrap();
        assert_eq!(parts.app_name, "live");
        assert_eq!(parts.stream_name, "stream1");
        assert!(parts.query.is_none());
    }

    #[test]
    fn parses_query_string() {
        let parts = parse("rtmp://localhost/live/stream1?token=abc").unwrap();
        assert_eq!(parts.stream_name, "stream1");
        assert_eq!(parts.query.as_deref(), Some("token=abc"));
    }

    #[test]
    fn rejects_missing_stream_name() {
        assert!(parse("rtmp://localhost/live").is_err());
    }
}
