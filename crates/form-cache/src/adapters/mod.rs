//! Adapters Layer
//!
//! - `ChannelUpstream` - `UpstreamSender` over a tokio mpsc channel
//! - `SharedFormCache` - `FormCache` behind a mutex for sessions whose send and
//!   receive paths run on different tasks

pub mod channel;
pub mod shared;

pub use channel::ChannelUpstream;
pub use shared::SharedFormCache;
