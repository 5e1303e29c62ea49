//! M3U8 playlist generation. Grounded on `protocol/hls/cache.go`'s
//! `GenM3U8File`, with the segment-count ambiguity resolved per
//! SPEC_FULL.md §9.1: emit every segment currently in the rolling cache
//! (bounded by its configured capacity) rather than a hardcoded 3.

use std::fmt::Write as _;

use super::segment_cache::SegmentCache;

/// Renders the current playlist body, calling `ts_path` to turn each
/// stripped segment name into the path a client requests.
#[must_use]
pub fn generate(cache: &SegmentCache, ts_path: impl Fn(&str) -> String) -> String {
    let segments = cache.all();

    let mut max_duration_ms: i64 = 0;
    let mut first_sequence: i64 = 0;
    let mut body = String::new();

    for (i, segment) in segments.iter().enumerate() {
        if segment.duration_ms > max_duration_ms {
            max_duration_ms = segment.duration_ms;
        }
        if i == 0 {
            first_sequence = segment.sequence;
        }
        let _ = write!(
            body,
            "#EXTINF:{:.3},\n{}\n",
            segment.duration_ms as f64 / 1000.0,
            ts_path(&segment.name)
        );
    }

    let target_duration = max_duration_ms / 1000 + 1;
    let mut out = String::with_capacity(body.len() + 256);
    let _ = write!(
        out,
        "#EXTM3U\n#EXT-X-VERSION:3\n#EXT-X-ALLOW-CACHE:NO\n#EXT-X-TARGETDURATION:{target_duration}\n#EXT-X-MEDIA-SEQUENCE:{first_sequence}\n\n"
    );
    out.push_str(&body);
    out
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::super::segment_cache::Segment;
    use super::*;

    #[test]
    fn playlist_lists_every_cached_segment_up_to_capacity() {
        let cache = SegmentCache::with_capacity(5);
        for i in 1..=5 {
            cache.push(Segment::new(format!("{i}.ts"), i, 3000, Bytes::new()));
        }

        let playlist = generate(&cache, |name| format!("{name}.ts"));
        assert_eq!(playlist.matches("#EXTINF").count(), 5);
        assert!(playlist.contains("#EXT-X-MEDIA-SEQUENCE:1"));
        assert!(playlist.contains("#EXT-X-TARGETDURATION:4"));
    }

    #[test]
    fn empty_cache_yields_header_only_playlist() {
        let cache = SegmentCache::new();
        let playlist = generate(&cache, |name| format!("{name}.ts"));
        assert!(playlist.starts_with("#EXTM3U"));
        assert_eq!(playlist.matches("#EXTINF").count(), 0);
    }
}
