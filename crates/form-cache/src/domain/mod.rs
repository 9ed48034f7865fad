//! Domain Layer
//!
//! - `RequestId`: correlation key
//! - `Form` / `FormListener`: what gets shown and who hears the answer
//! - `FormCache`: the per-session correlation table
//! - `ModalForm`, `SimpleForm`: built-in Bedrock windows
//! - Request/response packets and configuration
//!
//! No I/O and no async code; the transport is reached through `ports`.

pub mod cache;
pub mod config;
pub mod form;
pub mod packet;
pub mod request_id;
pub mod windows;

pub use cache::FormCache;
pub use config::{FormCacheConfig, OrphanPolicy};
pub use form::{BoxedListener, Form, FormListener, FormType, PendingForm};
pub use packet::{FormRequestPacket, FormResponsePacket};
pub use request_id::RequestId;
pub use windows::{ButtonImage, FormButton, ModalForm, ModalResponse, SimpleForm, SimpleResponse};
