//! Directory of running fake services.
//!
//! Lets tests and tooling find a running service by id. The directory is
//! owned by the caller and handed to each service at start-up.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use url::Url;

/// Error type for directory operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    #[error("a fake service with id {0:?} is already running")]
    DuplicateId(String),
}

/// A running service as seen by the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEntry {
    pub service_id: String,
    pub base_url: Url,
}

/// Shared id → service mapping. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct ServiceDirectory {
    inner: Arc<DashMap<String, ServiceEntry>>,
}

impl ServiceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a running service. Ids must be unique among running services.
    pub fn register(&self, service_id: &str, base_url: Url) -> Result<(), DirectoryError> {
        match self.inner.entry(service_id.to_string()) {
            Entry::Occupied(_) => Err(DirectoryError::DuplicateId(service_id.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(ServiceEntry {
                    service_id: service_id.to_string(),
                    base_url,
                });
                tracing::debug!(service_id, "Service registered in directory");
                Ok(())
            }
        }
    }

    /// Forget a service. Returns its entry if it was registered.
    pub fn unregister(&self, service_id: &str) -> Option<ServiceEntry> {
        let removed = self.inner.remove(service_id).map(|(_, entry)| entry);
        if removed.is_some() {
            tracing::debug!(service_id, "Service removed from directory");
        }
        removed
    }

    pub fn get(&self, service_id: &str) -> Option<ServiceEntry> {
        self.inner.get(service_id).map(|entry| entry.value().clone())
    }

    /// Ids of all running services, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.inner.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
