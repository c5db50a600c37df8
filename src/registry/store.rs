//! Endpoint registry implementation
//!
//! The central table the dispatcher consults on every engine callback. It
//! also issues identifiers so that allocation and insertion happen under the
//! same lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::DEFAULT_ID_BASE;
use crate::endpoint::{BusEndpoint, StreamEndpoint};

use super::entry::Endpoint;
use super::id::EndpointId;

/// Central registry for all live endpoints
///
/// A single `Mutex` guards the identifier counter and the map. It is held
/// only for the duration of one map operation; callers clone the endpoint
/// `Arc` out of the table before touching any queue.
pub struct EndpointRegistry {
    inner: Mutex<RegistryInner>,
}

struct RegistryInner {
    base: u64,
    last_id: u64,
    endpoints: HashMap<EndpointId, Endpoint>,
}

impl RegistryInner {
    fn next_id(&mut self) -> EndpointId {
        let mut wraps = 0;
        loop {
            self.last_id = match self.last_id.checked_add(1) {
                Some(next) => next,
                None => {
                    wraps += 1;
                    assert!(wraps < 2, "endpoint identifier space exhausted");
                    self.base.saturating_add(1)
                }
            };
            let id = EndpointId::new(self.last_id);
            // Only reachable after wrapping: never reissue a live identifier
            if !self.endpoints.contains_key(&id) {
                return id;
            }
        }
    }

    fn insert(&mut self, id: EndpointId, endpoint: Endpoint) {
        if let Some(existing) = self.endpoints.get(&id) {
            panic!(
                "endpoint {} registered twice (existing {}, new {})",
                id,
                existing.kind(),
                endpoint.kind()
            );
        }
        self.endpoints.insert(id, endpoint);
    }
}

impl EndpointRegistry {
    /// Create a registry issuing identifiers above the default base
    pub fn new() -> Self {
        Self::with_base(DEFAULT_ID_BASE)
    }

    /// Create a registry issuing identifiers above `base`
    pub fn with_base(base: u64) -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                base,
                last_id: base,
                endpoints: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        // Every mutation is a single map call, so a poisoned table is still consistent
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issue the next identifier
    pub fn next_id(&self) -> EndpointId {
        self.lock().next_id()
    }

    /// Insert an endpoint under `id`
    ///
    /// # Panics
    ///
    /// Panics if `id` is already registered. Identifiers come from
    /// [`next_id`](Self::next_id), so a duplicate is a programming error; the
    /// existing entry is left untouched.
    pub fn register(&self, id: EndpointId, endpoint: Endpoint) {
        let kind = endpoint.kind();
        self.lock().insert(id, endpoint);
        tracing::debug!(endpoint = %id, kind = kind, "Endpoint registered");
    }

    /// Allocate an identifier and register a new stream endpoint under it
    pub fn create_stream(&self, capacity: usize) -> Arc<StreamEndpoint> {
        let stream = {
            let mut inner = self.lock();
            let id = inner.next_id();
            let stream = Arc::new(StreamEndpoint::new(id, capacity));
            inner.insert(id, Endpoint::Stream(Arc::clone(&stream)));
            stream
        };
        tracing::debug!(endpoint = %stream.id(), kind = "stream", "Endpoint registered");
        stream
    }

    /// Allocate an identifier and register a new bus endpoint under it
    pub fn create_bus(&self, capacity: usize) -> Arc<BusEndpoint> {
        let bus = {
            let mut inner = self.lock();
            let id = inner.next_id();
            let bus = Arc::new(BusEndpoint::new(id, capacity));
            inner.insert(id, Endpoint::Bus(Arc::clone(&bus)));
            bus
        };
        tracing::debug!(endpoint = %bus.id(), kind = "bus", "Endpoint registered");
        bus
    }

    /// Look up any endpoint
    pub fn lookup(&self, id: EndpointId) -> Option<Endpoint> {
        self.lock().endpoints.get(&id).cloned()
    }

    /// Look up a stream endpoint; a bus registered under `id` is not a match
    pub fn lookup_stream(&self, id: EndpointId) -> Option<Arc<StreamEndpoint>> {
        self.lock()
            .endpoints
            .get(&id)
            .and_then(Endpoint::as_stream)
            .cloned()
    }

    /// Look up a bus endpoint; a stream registered under `id` is not a match
    pub fn lookup_bus(&self, id: EndpointId) -> Option<Arc<BusEndpoint>> {
        self.lock()
            .endpoints
            .get(&id)
            .and_then(Endpoint::as_bus)
            .cloned()
    }

    /// Remove `id` from the registry
    ///
    /// Removing an identifier that is not registered is a no-op.
    pub fn deregister(&self, id: EndpointId) -> Option<Endpoint> {
        let removed = self.lock().endpoints.remove(&id);
        if let Some(ref endpoint) = removed {
            tracing::debug!(endpoint = %id, kind = endpoint.kind(), "Endpoint deregistered");
        }
        removed
    }

    /// Check whether `id` is registered
    pub fn contains(&self, id: EndpointId) -> bool {
        self.lock().endpoints.contains_key(&id)
    }

    /// Number of registered endpoints
    pub fn len(&self) -> usize {
        self.lock().endpoints.len()
    }

    /// Check whether no endpoint is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EndpointRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::thread;

    use super::*;

    #[test]
    fn test_ids_start_above_base() {
        let registry = EndpointRegistry::new();

        assert_eq!(registry.next_id(), EndpointId::new(10_001));
        assert_eq!(registry.next_id(), EndpointId::new(10_002));

        let registry = EndpointRegistry::with_base(7);
        assert_eq!(registry.next_id(), EndpointId::new(8));
    }

    #[test]
    fn test_ids_unique_under_concurrency() {
        let registry = Arc::new(EndpointRegistry::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    (0..200)
                        .map(|_| registry.create_stream(1).id())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {}", id);
            }
        }
        assert_eq!(seen.len(), 1600);
        assert_eq!(registry.len(), 1600);
    }

    #[test]
    fn test_lookup_by_kind() {
        let registry = EndpointRegistry::new();
        let stream = registry.create_stream(4);
        let bus = registry.create_bus(4);

        assert!(registry.lookup_stream(stream.id()).is_some());
        assert!(registry.lookup_bus(bus.id()).is_some());

        // Kinds do not alias each other
        assert!(registry.lookup_bus(stream.id()).is_none());
        assert!(registry.lookup_stream(bus.id()).is_none());

        let endpoint = registry.lookup(bus.id()).unwrap();
        assert_eq!(endpoint.kind(), "bus");
        assert_eq!(endpoint.id(), bus.id());
    }

    #[test]
    fn test_deregister_is_idempotent() {
        let registry = EndpointRegistry::new();
        let stream = registry.create_stream(4);
        let other = registry.create_stream(4);

        assert!(registry.deregister(stream.id()).is_some());
        assert!(registry.deregister(stream.id()).is_none());
        assert!(registry.deregister(EndpointId::new(99_999)).is_none());

        // Other endpoints keep their visibility
        assert!(registry.contains(other.id()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn test_duplicate_register_panics() {
        let registry = EndpointRegistry::new();
        let id = registry.next_id();

        registry.register(id, Endpoint::Stream(Arc::new(StreamEndpoint::new(id, 1))));
        registry.register(id, Endpoint::Bus(Arc::new(BusEndpoint::new(id, 1))));
    }

    #[test]
    fn test_duplicate_register_keeps_existing() {
        let registry = Arc::new(EndpointRegistry::new());
        let id = registry.next_id();
        registry.register(id, Endpoint::Stream(Arc::new(StreamEndpoint::new(id, 1))));

        let clone = Arc::clone(&registry);
        let result = thread::spawn(move || {
            clone.register(id, Endpoint::Bus(Arc::new(BusEndpoint::new(id, 1))));
        })
        .join();

        assert!(result.is_err());
        // The table survives the poisoned lock with the original entry
        assert_eq!(registry.lookup(id).unwrap().kind(), "stream");
    }

    #[test]
    fn test_wrapped_generator_skips_live_ids() {
        let registry = EndpointRegistry::with_base(u64::MAX - 2);
        let first = registry.create_stream(1);
        assert_eq!(first.id(), EndpointId::new(u64::MAX - 1));
        let last = registry.create_stream(1);
        assert_eq!(last.id(), EndpointId::new(u64::MAX));
        registry.deregister(last.id());

        // Counter wraps back to base + 1, which is still live, and moves on
        assert_eq!(registry.next_id(), EndpointId::new(u64::MAX));
    }
}
