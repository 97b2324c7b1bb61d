//! Ordered, append-only registry of handler registrations.
//!
//! # Responsibilities
//! - Append registrations atomically, in call order
//! - Hand out ordered snapshots for dispatch
//! - Report registrations that were never matched
//!
//! # Design Decisions
//! - Backed by `ArcSwap<Vec<_>>`: appends use read-copy-update, readers
//!   take a lock-free snapshot that later appends never modify
//! - Entries are `Arc` so a snapshot shares the matched flags with the live registry

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::handler::registration::{HandlerRegistration, Predicate, Responder};

/// Ordered view of the registry at one point in time.
pub type Snapshot = Arc<Vec<Arc<HandlerRegistration>>>;

/// Error returned by [`HandlerRegistry::register`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A required part of the registration was missing.
    #[error("invalid argument: {0} is required")]
    InvalidArgument(&'static str),
}

/// Caller-side handle onto one registration.
#[derive(Debug, Clone)]
pub struct RegistrationHandle {
    registration: Arc<HandlerRegistration>,
}

impl RegistrationHandle {
    pub fn index(&self) -> usize {
        self.registration.index()
    }

    pub fn description(&self) -> &str {
        self.registration.description()
    }

    /// Whether any request has matched this registration yet.
    pub fn is_matched(&self) -> bool {
        self.registration.is_matched()
    }
}

/// Concurrency-safe, append-only collection of registrations.
#[derive(Debug)]
pub struct HandlerRegistry {
    entries: ArcSwap<Vec<Arc<HandlerRegistration>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            entries: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Append a registration after every existing one.
    ///
    /// Fails with [`RegistryError::InvalidArgument`] when the predicate or
    /// the responder is missing.
    pub fn register(
        &self,
        predicate: Option<Predicate>,
        responder: Option<Responder>,
        description: impl Into<String>,
    ) -> Result<RegistrationHandle, RegistryError> {
        let predicate = predicate.ok_or(RegistryError::InvalidArgument("predicate"))?;
        let responder = responder.ok_or(RegistryError::InvalidArgument("responder"))?;
        Ok(self.append(predicate, responder, description.into()))
    }

    pub(crate) fn append(
        &self,
        predicate: Predicate,
        responder: Responder,
        description: String,
    ) -> RegistrationHandle {
        // The closure may run more than once under contention; only the
        // winning attempt is published.
        let previous = self.entries.rcu(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.push(Arc::new(HandlerRegistration::new(
                current.len(),
                predicate.clone(),
                responder.clone(),
                description.clone(),
            )));
            next
        });

        let index = previous.len();
        let registration = self.entries.load()[index].clone();

        tracing::info!(
            index,
            condition = %registration.description(),
            "Setting up condition"
        );

        RegistrationHandle { registration }
    }

    /// Registrations in evaluation order, as of now.
    pub fn snapshot_ordered(&self) -> Snapshot {
        self.entries.load_full()
    }

    /// Registrations never matched by any request, in registration order.
    pub fn unused(&self) -> Vec<Arc<HandlerRegistration>> {
        self.entries
            .load()
            .iter()
            .filter(|r| !r.is_matched())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::registration::{predicate, responder};

    fn always() -> Predicate {
        predicate(|_| true)
    }

    fn noop() -> Responder {
        responder(|_sink| async { Ok(()) })
    }

    #[test]
    fn test_register_preserves_order() {
        let registry = HandlerRegistry::new();
        for name in ["first", "second", "third"] {
            registry.register(Some(always()), Some(noop()), name).unwrap();
        }

        let snapshot = registry.snapshot_ordered();
        let names: Vec<_> = snapshot.iter().map(|r| r.description()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
        let indices: Vec<_> = snapshot.iter().map(|r| r.index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_register_rejects_missing_parts() {
        let registry = HandlerRegistry::new();

        let err = registry.register(None, Some(noop()), "x").unwrap_err();
        assert_eq!(err, RegistryError::InvalidArgument("predicate"));

        let err = registry.register(Some(always()), None, "x").unwrap_err();
        assert_eq!(err, RegistryError::InvalidArgument("responder"));

        assert!(registry.is_empty());
    }

    #[test]
    fn test_snapshot_ignores_later_registrations() {
        let registry = HandlerRegistry::new();
        registry.register(Some(always()), Some(noop()), "a").unwrap();

        let snapshot = registry.snapshot_ordered();
        registry.register(Some(always()), Some(noop()), "b").unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_unused_filters_matched() {
        let registry = HandlerRegistry::new();
        let a = registry.register(Some(always()), Some(noop()), "a").unwrap();
        registry.register(Some(always()), Some(noop()), "b").unwrap();
        registry.register(Some(always()), Some(noop()), "c").unwrap();

        registry.snapshot_ordered()[1].mark_matched();

        let unused: Vec<_> = registry
            .unused()
            .iter()
            .map(|r| r.description().to_string())
            .collect();
        assert_eq!(unused, vec!["a", "c"]);
        assert!(!a.is_matched());
    }

    #[test]
    fn test_handle_observes_matched_flag() {
        let registry = HandlerRegistry::new();
        let handle = registry.register(Some(always()), Some(noop()), "a").unwrap();

        assert_eq!(handle.index(), 0);
        assert_eq!(handle.description(), "a");
        assert!(!handle.is_matched());

        registry.snapshot_ordered()[0].mark_matched();
        assert!(handle.is_matched());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_register_keeps_every_entry() {
        let registry = Arc::new(HandlerRegistry::new());

        let mut tasks = Vec::new();
        for task in 0..16 {
            let registry = registry.clone();
            tasks.push(tokio::spawn(async move {
                for n in 0..25 {
                    registry
                        .register(Some(always()), Some(noop()), format!("{task}-{n}"))
                        .unwrap();
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let snapshot = registry.snapshot_ordered();
        assert_eq!(snapshot.len(), 16 * 25);

        let mut seen: Vec<_> = snapshot.iter().map(|r| r.description().to_string()).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 16 * 25);

        for (position, registration) in snapshot.iter().enumerate() {
            assert_eq!(registration.index(), position);
        }
    }
}
