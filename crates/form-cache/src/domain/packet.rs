//! Form packets exchanged with the client.

use crate::domain::RequestId;
use serde::{Deserialize, Serialize};

/// Outbound request asking the client to show a form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRequestPacket {
    pub form_id: RequestId,
    /// Form JSON
    pub form_data: String,
}

/// Inbound reply as decoded by the transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormResponsePacket {
    /// Raw id, unchecked
    pub form_id: u32,
    /// Reply JSON. Absent when the client dismissed the form.
    #[serde(default)]
    pub form_data: Option<String>,
}

impl FormResponsePacket {
    pub fn new(form_id: u32, form_data: impl Into<String>) -> Self {
        Self {
            form_id,
            form_data: Some(form_data.into()),
        }
    }

    /// Reply to a dismissed form
    pub fn closed(form_id: u32) -> Self {
        Self {
            form_id,
            form_data: None,
        }
    }

    /// Id of the request this answers; `None` for id zero
    pub fn request_id(&self) -> Option<RequestId> {
        RequestId::new(self.form_id)
    }

    /// Reply payload, `null` when absent
    pub fn raw_response(&self) -> &str {
        self.form_data.as_deref().unwrap_or("null")
    }
}
