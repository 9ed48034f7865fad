//! Mutex-guarded form cache shared between a session's tasks.
//!
//! Every operation holds the lock only for the table update. `resolve` takes
//! the record out under the lock and runs the listener after releasing it, so
//! listeners may use the cache again (to show a follow-up form, say).

use crate::domain::cache::{deliver, Claim};
use crate::domain::{Form, FormCache, FormResponsePacket, RequestId};
use crate::error::FormResult;
use crate::metrics::{FormCacheMetrics, MetricsSnapshot};
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable handle to a session's [`FormCache`]
#[derive(Clone)]
pub struct SharedFormCache {
    inner: Arc<Mutex<FormCache>>,
    metrics: Arc<FormCacheMetrics>,
}

impl SharedFormCache {
    pub fn new(cache: FormCache) -> Self {
        let metrics = cache.metrics().clone();
        Self {
            inner: Arc::new(Mutex::new(cache)),
            metrics,
        }
    }

    pub fn track<F: Form>(&self, form: F) -> FormResult<RequestId> {
        self.inner.lock().track(form)
    }

    pub fn track_at<F: Form>(&self, id: RequestId, form: F) -> FormResult<()> {
        self.inner.lock().track_at(id, form)
    }

    pub fn display<F: Form>(&self, form: F) -> FormResult<RequestId> {
        self.inner.lock().display(form)
    }

    pub fn display_with<F, L>(&self, form: F, listener: L) -> FormResult<RequestId>
    where
        F: Form,
        L: FnOnce(F::Response) + Send + 'static,
    {
        self.inner.lock().display_with(form, listener)
    }

    pub fn display_at<F: Form>(&self, id: RequestId, form: F) -> FormResult<()> {
        self.inner.lock().display_at(id, form)
    }

    pub fn display_at_with<F, L>(&self, id: RequestId, form: F, listener: L) -> FormResult<()>
    where
        F: Form,
        L: FnOnce(F::Response) + Send + 'static,
    {
        self.inner.lock().display_at_with(id, form, listener)
    }

    pub fn resend(&self, id: RequestId) -> FormResult<bool> {
        self.inner.lock().resend(id)
    }

    /// See [`FormCache::resolve`]. The listener runs without the lock held.
    pub fn resolve(&self, id: RequestId, raw: &str) -> FormResult<bool> {
        let claim = self.inner.lock().claim(id);
        match claim {
            Claim::Ready(pending) => deliver(&self.metrics, id, pending, raw),
            Claim::Unmatched | Claim::NoListener => Ok(false),
        }
    }

    pub fn handle_response_packet(&self, packet: &FormResponsePacket) -> FormResult<bool> {
        match packet.request_id() {
            Some(id) => self.resolve(id, packet.raw_response()),
            None => self.inner.lock().handle_response_packet(packet),
        }
    }

    pub fn evict_orphans(&self) -> usize {
        self.inner.lock().evict_orphans()
    }

    pub fn discard(&self, id: RequestId) -> bool {
        self.inner.lock().discard(id)
    }

    pub fn clear(&self) -> usize {
        self.inner.lock().clear()
    }

    pub fn contains(&self, id: RequestId) -> bool {
        self.inner.lock().contains(id)
    }

    pub fn has_listener(&self, id: RequestId) -> bool {
        self.inner.lock().has_listener(id)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Inspect the pending table under the lock
    pub fn inspect<R>(&self, f: impl FnOnce(&FormCache) -> R) -> R {
        let guard = self.inner.lock();
        f(&*guard)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ChannelUpstream;
    use crate::domain::{FormRequestPacket, ModalForm, ModalResponse};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc::Receiver;

    fn shared() -> (SharedFormCache, Receiver<FormRequestPacket>) {
        let (upstream, rx) = ChannelUpstream::channel(16);
        (SharedFormCache::new(FormCache::new(Arc::new(upstream))), rx)
    }

    fn modal() -> ModalForm {
        ModalForm::new("Teleport", "Accept request?", "Accept", "Deny")
    }

    #[test]
    fn test_listener_can_reenter_cache() {
        let (cache, _rx) = shared();
        let handle = cache.clone();
        let first = cache
            .display_with(modal(), move |response| {
                if response == ModalResponse::Accepted {
                    handle.display(modal()).unwrap();
                }
            })
            .unwrap();

        assert!(cache.resolve(first, "true").unwrap());
        assert_eq!(cache.len(), 1);
        assert!(!cache.contains(first));
    }

    #[test]
    fn test_metrics_shared_with_inner_cache() {
        let (cache, _rx) = shared();
        let id = cache.display_with(modal(), |_| {}).unwrap();
        cache.resolve(id, "false").unwrap();
        cache.resolve(id, "false").unwrap();

        let snapshot = cache.metrics();
        assert_eq!(snapshot.displayed, 1);
        assert_eq!(snapshot.resolved, 1);
        assert_eq!(snapshot.unmatched, 1);
        assert_eq!(cache.inspect(|inner| inner.metrics().snapshot()), snapshot);
    }

    #[tokio::test]
    async fn test_concurrent_replies_fire_once() {
        let (cache, _rx) = shared();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let id = cache
            .display_with(modal(), move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            tasks.push(tokio::spawn(async move { cache.resolve(id, "true").unwrap() }));
        }

        let mut delivered = 0;
        for task in tasks {
            if task.await.unwrap() {
                delivered += 1;
            }
        }

        assert_eq!(delivered, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
