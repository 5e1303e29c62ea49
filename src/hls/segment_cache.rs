//! Rolling TS segment cache. Grounded on `protocol/hls/{cache.go,item.go}`:
//! a fixed-capacity ring (`maxTSCacheNum` = 5, spec §6 "HLS segment cache
//! size") of named segments, evicting the oldest on overflow and answering
//! lookups by name with the `.ts` suffix stripped.

use std::collections::VecDeque;

use bytes::Bytes;
use parking_lot::RwLock;

const DEFAULT_MAX_SEGMENTS: usize = 5;

#[derive(Debug, Clone)]
pub struct Segment {
    pub name: String,
    pub sequence: i64,
    pub duration_ms: i64,
    pub data: Bytes,
}

impl Segment {
    #[must_use]
    pub fn new(name: impl Into<String>, sequence: i64, duration_ms: i64, data: Bytes) -> Self {
        let mut name = name.into();
        if let Some(stripped) = name.strip_suffix(".ts") {
            name = stripped.to_string();
        }
        Self {
            name,
            sequence,
            duration_ms,
            data,
        }
    }
}

pub struct SegmentCache {
    max: usize,
    segments: RwLock<VecDeque<Segment>>,
}

impl SegmentCache {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_SEGMENTS)
    }

    #[must_use]
    pub fn with_capacity(max: usize) -> Self {
        Self {
            max,
            segments: RwLock::new(VecDeque::with_capacity(max)),
        }
    }

    pub fn push(&self, segment: Segment) {
        let mut segments = self.segments.write();
        if segments.len() == self.max {
            segments.pop_front();
        }
        segments.push_back(segment);
    }

    #[must_use]
    pub fn all(&self) -> Vec<Segment> {
        self.segments.read().iter().cloned().collect()
    }

    /// Looks up a segment by name, with or without a `.ts` suffix.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Segment> {
        let name = name.strip_suffix(".ts").unwrap_or(name);
        self.segments.read().iter().find(|s| s.name == name).cloned()
    }
}

impl Default for SegmentCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_past_capacity() {
        let cache = SegmentCache::with_capacity(2);
        cache.push(Segment::new("a.ts", 1, 3000, Bytes::from_static(b"a")));
        cache.push(Segment::new("b.ts", 2, 3000, Bytes::from_static(b"b")));
        cache.push(Segment::new("c.ts", 3, 3000, Bytes::from_static(b"c")));

        let all = cache.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "b");
        assert_eq!(all[1].name, "c");
        assert!(cache.get("a").is_none());
    }

    #[test]
    fn get_strips_ts_suffix_on_both_sides() {
        let cache = SegmentCache::new();
        cache.push(Segment::new("12345.ts", 1, 3000, Bytes::from_static(b"x")));
        assert!(cache.get("12345").is_some());
        assert!(cache.get("12345.ts").is_some());
        assert!(cache.get("99999").is_none());
    }
}
