#[derive(Debug, thiserror::Error)]
pub enum ChannelErrorValue {
    #[error("pusher already in publication")]
    AlreadyInPublication,
    #[error("pusher not in publication")]
    NotInPublication,
    #[error("channel closed")]
    Closed,
    #[error("subscriber already exists")]
    SubscriberExists,
    #[error("hls player not initialized")]
    HlsPlayerNotInit,
}

#[derive(Debug, thiserror::Error)]
#[error("{value}")]
pub struct ChannelError {
    pub value: ChannelErrorValue,
}

impl From<ChannelErrorValue> for ChannelError {
    fn from(value: ChannelErrorValue) -> Self {
        Self { value }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppErrorValue {
    #[error("channel not found: {0}")]
    ChannelNotFound(String),
    #[error("channel already exists: {0}")]
    ChannelAlreadyExists(String),
}

#[derive(Debug, thiserror::Error)]
#[error("{value}")]
pub struct AppError {
    pub value: AppErrorValue,
}

impl From<AppErrorValue> for AppError {
    fn from(value: AppErrorValue) -> Self {
        Self { value }
    }
}
