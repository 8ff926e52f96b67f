//! Identity-keyed store of live handlers.

use std::sync::Arc;

use dashmap::DashMap;

use crate::handlers::handler::Handler;
use crate::observability::metrics;

/// Makes in-flight handlers reachable by id.
///
/// Shared by the dispatch path (add/remove) and the control API (get/list).
/// Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    inner: Arc<DashMap<String, Arc<Handler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under its id.
    ///
    /// A handler already stored under the same id is replaced; it stays
    /// replaced even when its owner later calls `remove_handler`.
    pub fn add(&self, handler: Arc<Handler>) {
        let id = handler.id.clone();
        match self.inner.insert(id, handler) {
            None => metrics::record_handler_registered(),
            Some(previous) => {
                tracing::warn!(handler_id = %previous.id, "Handler id reused while still registered");
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<Handler>> {
        self.inner.get(id).map(|r| r.value().clone())
    }

    /// Deregister whatever handler is stored under `id`.
    pub fn remove(&self, id: &str) -> Option<Arc<Handler>> {
        let removed = self.inner.remove(id).map(|(_, h)| h);
        if removed.is_some() {
            metrics::record_handler_deregistered();
        }
        removed
    }

    /// Deregister `handler`, but only if it is still the entry for its id.
    pub fn remove_handler(&self, handler: &Arc<Handler>) -> bool {
        let removed = self
            .inner
            .remove_if(handler.id.as_str(), |_, stored| Arc::ptr_eq(stored, handler))
            .is_some();
        if removed {
            metrics::record_handler_deregistered();
        }
        removed
    }

    /// Ids of all live handlers, in no particular order.
    pub fn list_ids(&self) -> Vec<String> {
        self.inner.iter().map(|r| r.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
