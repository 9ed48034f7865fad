//! Outbound Ports (Driven Ports)
//!
//! The cache never owns the connection; it only hands finished request
//! packets to whatever writes to the client.

use crate::domain::FormRequestPacket;
use crate::error::TransportError;

/// Upstream transport (Driven Port)
///
/// Must not block indefinitely. Failures are returned to the caller of the
/// cache operation unchanged; the cache does not retry.
pub trait UpstreamSender: Send + Sync {
    /// Send a form request packet to the client
    fn send_upstream(&self, packet: FormRequestPacket) -> Result<(), TransportError>;
}
