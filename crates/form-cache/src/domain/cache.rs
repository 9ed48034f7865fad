//! Form cache - correlation of form requests with client replies.
//!
//! Flow:
//! 1. Session calls `display*()`; the cache picks (or is given) an id, sends a
//!    `FormRequestPacket` upstream and records the form with its listener
//! 2. The client answers at some later point with the same id
//! 3. Session calls `resolve()`; the cache removes the record, parses the reply
//!    against the form and fires the listener
//!
//! Each id holds a single record `{form, listener?}`, so a listener can never
//! exist without its form. The record leaves the table before the listener
//! runs; a second reply for the same id finds nothing.
//!
//! The cache is not synchronized. Keep it on the session's event path or wrap
//! it in [`SharedFormCache`](crate::adapters::SharedFormCache).

use crate::domain::config::{FormCacheConfig, OrphanPolicy};
use crate::domain::form::{BoxedListener, Form, Pending, PendingForm};
use crate::domain::packet::{FormRequestPacket, FormResponsePacket};
use crate::domain::RequestId;
use crate::error::{ConfigError, FormError, FormResult};
use crate::metrics::FormCacheMetrics;
use crate::ports::UpstreamSender;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of looking up a reply's id
pub(crate) enum Claim {
    /// No pending form
    Unmatched,
    /// Form pending but nobody is listening
    NoListener,
    /// Record removed from the table, ready to complete
    Ready(Box<dyn PendingForm>),
}

/// Per-session form correlation table
pub struct FormCache {
    /// Map of form id to pending form and listener
    forms: HashMap<RequestId, Box<dyn PendingForm>>,
    /// Last id handed out by the allocator
    last_id: Option<RequestId>,
    /// Transport for request packets
    sender: Arc<dyn UpstreamSender>,
    config: FormCacheConfig,
    metrics: Arc<FormCacheMetrics>,
}

impl FormCache {
    /// Create a cache with default configuration
    pub fn new(sender: Arc<dyn UpstreamSender>) -> Self {
        Self {
            forms: HashMap::new(),
            last_id: None,
            sender,
            config: FormCacheConfig::default(),
            metrics: Arc::new(FormCacheMetrics::new()),
        }
    }

    /// Create a cache with custom configuration
    pub fn with_config(
        config: FormCacheConfig,
        sender: Arc<dyn UpstreamSender>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(sender)
        })
    }

    /// Next id not currently pending.
    ///
    /// Ids count up from 1 and wrap from `u32::MAX` back to 1.
    pub fn allocate_id(&mut self) -> FormResult<RequestId> {
        if let Some(max) = self.config.max_pending {
            if self.forms.len() >= max {
                return Err(FormError::CapacityExceeded { max });
            }
        }

        // At most `len` probes can collide
        let pending = self.forms.len();
        let forms = &self.forms;
        let probes = pending.saturating_add(1).min(ID_SPACE);
        probe_free_id(&mut self.last_id, probes, |id| forms.contains_key(id)).ok_or_else(|| {
            warn!(pending, "Form id space exhausted");
            FormError::IdSpaceExhausted
        })
    }

    /// Record a form under a fresh id without sending it.
    ///
    /// The caller sends the request through its own path using the returned id.
    pub fn track<F: Form>(&mut self, form: F) -> FormResult<RequestId> {
        let id = self.allocate_id()?;
        self.forms.insert(id, Box::new(Pending::new(form, None)));
        Ok(id)
    }

    /// Record a form under `id` without sending it, replacing any previous
    /// record (and its listener) for that id.
    pub fn track_at<F: Form>(&mut self, id: RequestId, form: F) -> FormResult<()> {
        self.ensure_capacity(id)?;
        if let Some(mut previous) = self.forms.insert(id, Box::new(Pending::new(form, None))) {
            abandon_listener(&self.metrics, id, &mut *previous);
        }
        Ok(())
    }

    /// Show a form under a fresh id, without listener
    pub fn display<F: Form>(&mut self, form: F) -> FormResult<RequestId> {
        let id = self.allocate_id()?;
        self.show(id, form, None)?;
        Ok(id)
    }

    /// Show a form under a fresh id; `listener` receives the reply
    pub fn display_with<F, L>(&mut self, form: F, listener: L) -> FormResult<RequestId>
    where
        F: Form,
        L: FnOnce(F::Response) + Send + 'static,
    {
        let id = self.allocate_id()?;
        self.show(id, form, Some(Box::new(listener)))?;
        Ok(id)
    }

    /// Show a form under a caller-chosen id, without listener
    pub fn display_at<F: Form>(&mut self, id: RequestId, form: F) -> FormResult<()> {
        self.show(id, form, None)
    }

    /// Show a form under a caller-chosen id; `listener` receives the reply.
    ///
    /// A listener still waiting on `id` is dropped unfired.
    pub fn display_at_with<F, L>(&mut self, id: RequestId, form: F, listener: L) -> FormResult<()>
    where
        F: Form,
        L: FnOnce(F::Response) + Send + 'static,
    {
        self.show(id, form, Some(Box::new(listener)))
    }

    fn show<F: Form>(
        &mut self,
        id: RequestId,
        form: F,
        listener: Option<BoxedListener<F>>,
    ) -> FormResult<()> {
        self.ensure_capacity(id)?;

        if let Some(previous) = self.forms.get_mut(&id) {
            abandon_listener(&self.metrics, id, &mut **previous);
        }

        let packet = FormRequestPacket {
            form_id: id,
            form_data: form.json_data()?,
        };
        self.sender.send_upstream(packet)?;
        FormCacheMetrics::incr(&self.metrics.displayed);

        debug!(
            request_id = %id,
            form_type = %form.form_type(),
            with_listener = listener.is_some(),
            "Displayed form"
        );

        self.forms.insert(id, Box::new(Pending::new(form, listener)));
        Ok(())
    }

    /// Send the request for an already pending form again.
    ///
    /// Returns false without sending when `id` is not pending.
    pub fn resend(&self, id: RequestId) -> FormResult<bool> {
        let Some(pending) = self.forms.get(&id) else {
            debug!(request_id = %id, "Resend for unknown form id ignored");
            return Ok(false);
        };

        let packet = FormRequestPacket {
            form_id: id,
            form_data: pending.json_data()?,
        };
        self.sender.send_upstream(packet)?;
        FormCacheMetrics::incr(&self.metrics.resent);

        debug!(request_id = %id, "Resent form");
        Ok(true)
    }

    /// Match a client reply to its pending form and fire the listener.
    ///
    /// Returns `Ok(true)` if the listener ran, `Ok(false)` if no form with a
    /// listener is pending for `id`. A reply that fails to parse still consumes
    /// the record and is reported as `FormError::MalformedResponse`.
    pub fn resolve(&mut self, id: RequestId, raw: &str) -> FormResult<bool> {
        match self.claim(id) {
            Claim::Ready(pending) => deliver(&self.metrics, id, pending, raw),
            Claim::Unmatched | Claim::NoListener => Ok(false),
        }
    }

    /// Resolve from a decoded response packet
    pub fn handle_response_packet(&mut self, packet: &FormResponsePacket) -> FormResult<bool> {
        match packet.request_id() {
            Some(id) => self.resolve(id, packet.raw_response()),
            None => {
                FormCacheMetrics::incr(&self.metrics.unmatched);
                warn!("Form response with id 0 ignored");
                Ok(false)
            }
        }
    }

    /// Remove the record for `id` if a reply for it can be delivered.
    pub(crate) fn claim(&mut self, id: RequestId) -> Claim {
        let entry = match self.forms.entry(id) {
            Entry::Occupied(entry) => entry,
            Entry::Vacant(_) => {
                FormCacheMetrics::incr(&self.metrics.unmatched);
                warn!(request_id = %id, "Response for unknown or expired form id");
                return Claim::Unmatched;
            }
        };

        if !entry.get().has_listener() {
            FormCacheMetrics::incr(&self.metrics.missing_listener);
            let evict = self.config.orphan_policy == OrphanPolicy::Evict;
            if evict {
                entry.remove();
                FormCacheMetrics::incr(&self.metrics.evicted);
            }
            debug!(request_id = %id, evicted = evict, "Response for form without listener");
            return Claim::NoListener;
        }

        Claim::Ready(entry.remove())
    }

    /// Remove every pending form that has no listener. Returns the number removed.
    pub fn evict_orphans(&mut self) -> usize {
        let before = self.forms.len();
        self.forms.retain(|_, pending| pending.has_listener());
        let removed = before - self.forms.len();
        if removed > 0 {
            FormCacheMetrics::add(&self.metrics.evicted, removed);
            debug!(removed = removed, "Evicted orphaned forms");
        }
        removed
    }

    /// Forget the form pending under `id`; its listener is dropped unfired
    pub fn discard(&mut self, id: RequestId) -> bool {
        if self.forms.remove(&id).is_some() {
            FormCacheMetrics::incr(&self.metrics.evicted);
            true
        } else {
            false
        }
    }

    /// Drop all pending forms (session teardown). Returns the number dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.forms.len();
        self.forms.clear();
        if dropped > 0 {
            debug!(dropped = dropped, "Cleared pending forms");
        }
        dropped
    }

    /// Pending forms, in no particular order
    pub fn forms(&self) -> impl Iterator<Item = (RequestId, &dyn PendingForm)> + '_ {
        self.forms
            .iter()
            .map(|(id, pending)| -> (RequestId, &dyn PendingForm) { (*id, &**pending) })
    }

    /// Pending form for `id`
    pub fn form(&self, id: RequestId) -> Option<&dyn PendingForm> {
        self.forms.get(&id).map(|pending| -> &dyn PendingForm { &**pending })
    }

    /// Check if a form is pending under `id`
    pub fn contains(&self, id: RequestId) -> bool {
        self.forms.contains_key(&id)
    }

    /// Check if a listener is waiting on `id`
    pub fn has_listener(&self, id: RequestId) -> bool {
        self.forms.get(&id).is_some_and(|pending| pending.has_listener())
    }

    /// Number of pending forms
    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    pub fn config(&self) -> &FormCacheConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<FormCacheMetrics> {
        &self.metrics
    }

    fn ensure_capacity(&self, id: RequestId) -> FormResult<()> {
        match self.config.max_pending {
            Some(max) if !self.forms.contains_key(&id) && self.forms.len() >= max => {
                Err(FormError::CapacityExceeded { max })
            }
            _ => Ok(()),
        }
    }
}

/// Number of distinct wire ids (zero is never used)
const ID_SPACE: usize = u32::MAX as usize;

/// Walk ids after `last` until one is not taken, giving up after `probes`.
fn probe_free_id(
    last: &mut Option<RequestId>,
    probes: usize,
    is_taken: impl Fn(&RequestId) -> bool,
) -> Option<RequestId> {
    for _ in 0..probes {
        let next = match *last {
            None => RequestId::MIN,
            Some(previous) => {
                if previous == RequestId::MAX {
                    warn!("Form id counter wrapped around");
                }
                previous.wrapping_next()
            }
        };
        *last = Some(next);

        if !is_taken(&next) {
            return Some(next);
        }
    }
    None
}

fn abandon_listener(metrics: &FormCacheMetrics, id: RequestId, previous: &mut dyn PendingForm) {
    if previous.abandon_listener() {
        FormCacheMetrics::incr(&metrics.abandoned_listeners);
        warn!(request_id = %id, "Abandoned listener of replaced form");
    }
}

/// Parse the reply and fire the listener of a claimed record
pub(crate) fn deliver(
    metrics: &FormCacheMetrics,
    id: RequestId,
    pending: Box<dyn PendingForm>,
    raw: &str,
) -> FormResult<bool> {
    let form_type = pending.form_type();
    match pending.complete(id, raw) {
        Ok(()) => {
            FormCacheMetrics::incr(&metrics.resolved);
            debug!(request_id = %id, form_type = %form_type, "Resolved form");
            Ok(true)
        }
        Err(e) => {
            FormCacheMetrics::incr(&metrics.malformed);
            warn!(
                request_id = %id,
                form_type = %form_type,
                error = %e,
                "Discarded form after malformed response"
            );
            Err(e)
        }
    }
}
