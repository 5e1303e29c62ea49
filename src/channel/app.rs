//! Channel registry keyed by stream name, one per RTMP "app". Grounded on
//! `server/app.go`'s `GetOrNewChannel`/`GetChannel`, swapping the upstream
//! named-mutex-guarded map for a `dashmap` (spec §4.8: concurrent lookup and
//! creation without a global lock).

use std::sync::Arc;

use dashmap::DashMap;

use super::channel::Channel;
use super::errors::{AppError, AppErrorValue};

pub struct App {
    channels: DashMap<String, Arc<Channel>>,
    gop_max_packets: usize,
}

impl App {
    #[must_use]
    pub fn new(gop_max_packets: usize) -> Self {
        Self {
            channels: DashMap::new(),
            gop_max_packets,
        }
    }

    /// Returns the existing channel for `name`, creating one on first use.
    #[must_use]
    pub fn get_or_new_channel(&self, name: &str) -> Arc<Channel> {
        self.channels
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Channel::new(name, self.gop_max_packets)))
            .clone()
    }

    pub fn get_channel(&self, name: &str) -> Result<Arc<Channel>, AppError> {
        self.channels
            .get(name)
            .map(|c| c.clone())
            .ok_or_else(|| AppErrorValue::ChannelNotFound(name.to_string()).into())
    }

    /// Drops a closed channel from the registry so a future publish to the
    /// same name starts fresh instead of resurrecting stale subscribers.
    pub fn remove_channel(&self, name: &str) {
        self.channels.remove(name);
    }

    #[must_use]
    pub fn channel_names(&self) -> Vec<String> {
        self.channels.iter().map(|e| e.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_new_channel_returns_same_instance_for_same_name() {
        let app = App::new(1024);
        let a = app.get_or_new_channel("live/stream1");
        let b = app.get_or_new_channel("live/stream1");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn get_channel_errors_when_absent() {
        let app = App::new(1024);
        let err = app.get_channel("missing").unwrap_err();
        assert!(matches!(err.value, AppErrorValue::ChannelNotFound(_)));
    }
}
