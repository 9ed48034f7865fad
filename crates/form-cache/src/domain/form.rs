//! Form contract and the type-erased pending record.
//!
//! A form owns its own serialization and knows how to turn the client's raw
//! reply into a typed response. The cache never looks inside either.

use crate::domain::RequestId;
use crate::error::{FormError, FormResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of form, as announced in the `type` field of the form JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormType {
    /// Two-button dialog
    Modal,
    /// Button list
    #[serde(rename = "form")]
    Simple,
}

impl FormType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormType::Modal => "modal",
            FormType::Simple => "form",
        }
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured UI request that can be shown to the client.
pub trait Form: Send + 'static {
    /// Typed response produced from the client's reply
    type Response: Send + 'static;

    /// Form kind (for logging and introspection)
    fn form_type(&self) -> FormType;

    /// JSON payload carried in the request packet
    fn json_data(&self) -> FormResult<String>;

    /// Parse the client's raw reply against this form's schema.
    ///
    /// `id` is only used to label errors.
    fn parse_response(&self, id: RequestId, raw: &str) -> FormResult<Self::Response>;
}

/// Single-shot callback receiving a form's typed response.
pub trait FormListener<R>: Send {
    fn on_response(self: Box<Self>, response: R);
}

impl<R, F> FormListener<R> for F
where
    F: FnOnce(R) + Send,
{
    fn on_response(self: Box<Self>, response: R) {
        (*self)(response)
    }
}

/// Boxed listener for a form's response type
pub type BoxedListener<F> = Box<dyn FormListener<<F as Form>::Response>>;

/// Read-only view of a pending form, with its listener erased.
pub trait PendingForm: Send {
    fn form_type(&self) -> FormType;

    fn json_data(&self) -> FormResult<String>;

    fn has_listener(&self) -> bool;

    /// Drop the listener unfired. Returns true if there was one.
    fn abandon_listener(&mut self) -> bool;

    /// Parse `raw` and hand the result to the listener.
    ///
    /// Consumes the record: on a parse error the listener is dropped unfired.
    /// Does nothing beyond parsing when no listener is attached.
    fn complete(self: Box<Self>, id: RequestId, raw: &str) -> FormResult<()>;
}

/// A form together with its optional listener.
pub(crate) struct Pending<F: Form> {
    form: F,
    listener: Option<BoxedListener<F>>,
}

impl<F: Form> Pending<F> {
    pub(crate) fn new(form: F, listener: Option<BoxedListener<F>>) -> Self {
        Self { form, listener }
    }
}

impl<F: Form> PendingForm for Pending<F> {
    fn form_type(&self) -> FormType {
        self.form.form_type()
    }

    fn json_data(&self) -> FormResult<String> {
        self.form.json_data()
    }

    fn has_listener(&self) -> bool {
        self.listener.is_some()
    }

    fn abandon_listener(&mut self) -> bool {
        self.listener.take().is_some()
    }

    fn complete(self: Box<Self>, id: RequestId, raw: &str) -> FormResult<()> {
        let Pending { form, listener } = *self;
        let response = form.parse_response(id, raw)?;
        if let Some(listener) = listener {
            listener.on_response(response);
        }
        Ok(())
    }
}

/// Shorthand for a malformed reply error
pub(crate) fn malformed(id: RequestId, reason: impl Into<String>) -> FormError {
    FormError::MalformedResponse {
        id,
        reason: reason.into(),
    }
}
