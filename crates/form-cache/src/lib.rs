//! # Form Cache
//!
//! Per-session correlation of form requests with client replies for the
//! proxy's upstream (client-facing) connection.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        PROXY SESSION                         │
//! │                                                              │
//! │   display*(form, listener?)          FormResponsePacket      │
//! │            │                                  │              │
//! │            ▼                                  ▼              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │                     FormCache                          │  │
//! │  │   RequestId ──► { form, listener? }                    │  │
//! │  │   allocate ─ send ─ record        claim ─ parse ─ fire │  │
//! │  └─────────┬──────────────────────────────────────────────┘  │
//! │            │ FormRequestPacket                               │
//! │            ▼                                                 │
//! │     UpstreamSender (port) ──► ChannelUpstream (adapter)      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **Domain Layer** (`domain/`): `FormCache`, `RequestId`, the `Form`
//!   contract, built-in windows, packets and configuration
//! - **Ports Layer** (`ports/`): `UpstreamSender`
//! - **Adapters Layer** (`adapters/`): `ChannelUpstream`, `SharedFormCache`
//!
//! ## Invariants
//!
//! - A listener only ever exists together with its pending form
//! - The allocator never returns an id that is still pending
//! - A record is removed before its listener runs, so each id resolves at most once
//!
//! ## Usage
//!
//! ```ignore
//! use form_cache::{ChannelUpstream, FormCache, ModalForm, ModalResponse};
//! use std::sync::Arc;
//!
//! let (upstream, writer_rx) = ChannelUpstream::channel(64);
//! let mut forms = FormCache::new(Arc::new(upstream));
//!
//! let form = ModalForm::new("Teleport", "Accept request?", "Accept", "Deny");
//! forms.display_with(form, |response| {
//!     if response == ModalResponse::Accepted { /* ... */ }
//! })?;
//!
//! // later, on the inbound path
//! forms.handle_response_packet(&packet)?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;

// Re-exports for public API
pub use adapters::{ChannelUpstream, SharedFormCache};
pub use domain::{
    ButtonImage, Form, FormButton, FormCache, FormCacheConfig, FormListener, FormRequestPacket,
    FormResponsePacket, FormType, ModalForm, ModalResponse, OrphanPolicy, PendingForm, RequestId,
    SimpleForm, SimpleResponse,
};
pub use error::{ConfigError, FormError, FormResult, TransportError};
pub use metrics::{FormCacheMetrics, MetricsSnapshot};
pub use ports::UpstreamSender;
