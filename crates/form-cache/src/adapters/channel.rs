//! Channel-backed upstream transport.
//!
//! The session's writer task owns the receiving half and serializes packets
//! onto the connection.

use crate::domain::FormRequestPacket;
use crate::error::TransportError;
use crate::ports::UpstreamSender;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::warn;

/// `UpstreamSender` writing into a bounded mpsc channel without blocking
#[derive(Debug, Clone)]
pub struct ChannelUpstream {
    tx: mpsc::Sender<FormRequestPacket>,
}

impl ChannelUpstream {
    pub fn new(tx: mpsc::Sender<FormRequestPacket>) -> Self {
        Self { tx }
    }

    /// Create a sender together with the writer's receiving half
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<FormRequestPacket>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }
}

impl UpstreamSender for ChannelUpstream {
    fn send_upstream(&self, packet: FormRequestPacket) -> Result<(), TransportError> {
        self.tx.try_send(packet).map_err(|e| match e {
            TrySendError::Full(packet) => {
                warn!(request_id = %packet.form_id, "Upstream channel full, form request not sent");
                TransportError::Backpressure
            }
            TrySendError::Closed(_) => TransportError::ChannelClosed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FormCache, ModalForm, RequestId};
    use std::sync::Arc;

    fn packet(id: u32) -> FormRequestPacket {
        FormRequestPacket {
            form_id: RequestId::new(id).unwrap(),
            form_data: "{}".to_string(),
        }
    }

    #[tokio::test]
    async fn test_packets_reach_writer() {
        let (upstream, mut rx) = ChannelUpstream::channel(4);
        let mut cache = FormCache::new(Arc::new(upstream));

        let form = ModalForm::new("Hi", "", "Ok", "Cancel");
        let id = cache.display(form).unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.form_id, id);
        assert!(received.form_data.contains("\"modal\""));
    }

    #[tokio::test]
    async fn test_full_channel_reports_backpressure() {
        let (upstream, _rx) = ChannelUpstream::channel(1);
        upstream.send_upstream(packet(1)).unwrap();
        assert_eq!(
            upstream.send_upstream(packet(2)),
            Err(TransportError::Backpressure)
        );
    }

    #[tokio::test]
    async fn test_closed_channel() {
        let (upstream, rx) = ChannelUpstream::channel(1);
        drop(rx);
        assert_eq!(
            upstream.send_upstream(packet(1)),
            Err(TransportError::ChannelClosed)
        );
    }
}
