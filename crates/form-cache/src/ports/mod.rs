//! Ports Layer
//!
//! - `UpstreamSender` - Driven port delivering request packets to the client

pub mod outbound;

pub use outbound::UpstreamSender;
