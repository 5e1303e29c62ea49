pub mod app;
pub mod cache;
pub mod channel;
pub mod errors;
pub mod packet;
pub mod queue;
pub mod subscriber;

pub use app::App;
pub use cache::Cache;
pub use channel::Channel;
pub use errors::{AppError, AppErrorValue, ChannelError, ChannelErrorValue};
pub use packet::{Packet, PacketHeader, PacketKind};
pub use queue::PacketQueue;
pub use subscriber::{QueueSubscriber, Subscriber, SubscriberId};
