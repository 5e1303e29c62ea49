use {
    crate::rtmp::{
        chunk::errors::{PackError, UnpackError},
        handshake::errors::HandshakeError,
        messages::errors::MessageError,
        netconnection::errors::NetConnectionError,
        netstream::errors::NetStreamError,
        protocol_control_messages::errors::ControlMessagesError,
        user_control_messages::errors::EventMessagesError,
    },
    crate::amf0::errors::Amf0WriteError,
    crate::bytesio::bytesio_errors::BytesIOError,
    crate::channel::ChannelError,
};

#[derive(Debug, thiserror::Error)]
#[error("{value}")]
pub struct SessionError {
    pub value: SessionErrorValue,
}

impl From<SessionErrorValue> for SessionError {
    fn from(value: SessionErrorValue) -> Self {
        Self { value }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionErrorValue {
    #[error("amf0 write error: {0}")]
    Amf0WriteError(#[source] Amf0WriteError),
    #[error("unpack error: {0}")]
    UnpackError(#[source] UnpackError),
    #[error("pack error: {0}")]
    PackError(#[source] PackError),
    #[error("message error: {0}")]
    MessageError(#[source] MessageError),
    #[error("control message error: {0}")]
    ControlMessagesError(#[source] ControlMessagesError),
    #[error("net connection error: {0}")]
    NetConnectionError(#[source] NetConnectionError),
    #[error("net stream error: {0}")]
    NetStreamError(#[source] NetStreamError),
    #[error("event messages error: {0}")]
    EventMessagesError(#[source] EventMessagesError),
    #[error("net io error: {0}")]
    BytesIOError(#[source] BytesIOError),
    #[error("handshake error: {0}")]
    HandshakeError(#[source] HandshakeError),
    #[error("channel error: {0}")]
    ChannelError(#[source] ChannelError),

    #[error("no app name in connect command")]
    NoAppName,
    #[error("no stream name in publish/play command")]
    NoStreamName,
    #[error("auth failed: {0}")]
    AuthFailed(String),
    #[error("session finished")]
    Finish,
}

impl From<Amf0WriteError> for SessionError {
    fn from(error: Amf0WriteError) -> Self {
        Self {
            value: SessionErrorValue::Amf0WriteError(error),
        }
    }
}

impl From<UnpackError> for SessionError {
    fn from(error: UnpackError) -> Self {
        Self {
            value: SessionErrorValue::UnpackError(error),
        }
    }
}

impl From<PackError> for SessionError {
    fn from(error: PackError) -> Self {
        Self {
            value: SessionErrorValue::PackError(error),
        }
    }
}

impl From<MessageError> for SessionError {
    fn from(error: MessageError) -> Self {
        Self {
            value: SessionErrorValue::MessageError(error),
        }
    }
}

impl From<ControlMessagesError> for SessionError {
    fn from(error: ControlMessagesError) -> Self {
        Self {
            value: SessionErrorValue::ControlMessagesError(error),
        }
    }
}

impl From<NetConnectionError> for SessionError {
    fn from(error: NetConnectionError) -> Self {
        Self {
            value: SessionErrorValue::NetConnectionError(error),
        }
    }
}

impl From<NetStreamError> for SessionError {
    fn from(error: NetStreamError) -> Self {
        Self {
            value: SessionErrorValue::NetStreamError(error),
        }
    }
}

impl From<EventMessagesError> for SessionError {
    fn from(error: EventMessagesError) -> Self {
        Self {
            value: SessionErrorValue::EventMessagesError(error),
        }
    }
}

impl From<BytesIOError> for SessionError {
    fn from(error: BytesIOError) -> Self {
        Self {
            value: SessionErrorValue::BytesIOError(error),
        }
    }
}

impl From<HandshakeError> for SessionError {
    fn from(error: HandshakeError) -> Self {
        Self {
            value: SessionErrorValue::HandshakeError(error),
        }
    }
}

impl From<ChannelError> for SessionError {
    fn from(error: ChannelError) -> Self {
        Self {
            value: SessionErrorValue::ChannelError(error),
        }
    }
}
