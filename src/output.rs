// Copyright 2025 Cowboy AI, LLC.

//! Deferred output values
//!
//! Some resource attributes (a load balancer's DNS name, a repository URL)
//! only exist after the reconciliation engine has provisioned the resource.
//! [`Output<T>`] models such an attribute as a single-assignment deferred
//! value: unresolved at construction time, composable with pure combinators,
//! and resolved exactly once by the engine.
//!
//! # Functor Laws
//!
//! `map` must satisfy the Functor laws:
//!
//! 1. **Identity**: `output.map(|x| x)` resolves to the same value
//! 2. **Composition**: `output.map(f).map(g)` equals `output.map(|x| g(f(x)))`
//!
//! # Example
//!
//! ```rust
//! use infra_topology::output::Output;
//!
//! let (dns_name, resolver) = Output::<String>::pending();
//! let url = dns_name.concat("http://");
//!
//! assert_eq!(url.get(), None);
//! resolver.resolve("lb-123.elb.amazonaws.com".to_string()).unwrap();
//! assert_eq!(url.get().as_deref(), Some("http://lb-123.elb.amazonaws.com"));
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};
use thiserror::Error;

/// Error raised when a deferred value is assigned twice
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OutputError {
    #[error("Output is already resolved")]
    AlreadyResolved,
}

type Waiter<T> = Box<dyn FnOnce(&T) + Send>;

struct Inner<T> {
    cell: OnceLock<T>,
    waiters: Mutex<Vec<Waiter<T>>>,
}

impl<T> Inner<T> {
    fn new() -> Self {
        Self {
            cell: OnceLock::new(),
            waiters: Mutex::new(Vec::new()),
        }
    }
}

/// Single-assignment deferred value
///
/// Cloning an `Output` shares the underlying cell; all clones observe the
/// same resolution. Combinators never block: they register a continuation
/// that runs when the source resolves.
pub struct Output<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Output<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Output<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Output<{}>({})",
            std::any::type_name::<T>(),
            if self.inner.cell.get().is_some() {
                "resolved"
            } else {
                "pending"
            }
        )
    }
}

/// Write side of a pending [`Output`]
///
/// Held by whoever completes the value, typically the topology's pending
/// output registry acting for the reconciliation engine.
pub struct Resolver<T> {
    inner: Arc<Inner<T>>,
}

impl<T> fmt::Debug for Resolver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Resolver<{}>", std::any::type_name::<T>())
    }
}

impl<T: Clone + Send + Sync + 'static> Output<T> {
    /// Create an already-resolved output
    pub fn resolved(value: T) -> Self {
        let inner = Inner::new();
        // Freshly created cell, set cannot fail
        let _ = inner.cell.set(value);
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Create an unresolved output together with its write handle
    pub fn pending() -> (Self, Resolver<T>) {
        let inner = Arc::new(Inner::new());
        (
            Self {
                inner: Arc::clone(&inner),
            },
            Resolver { inner },
        )
    }

    /// Whether the value has been assigned
    pub fn is_resolved(&self) -> bool {
        self.inner.cell.get().is_some()
    }

    /// Get the value, if resolved
    pub fn get(&self) -> Option<T> {
        self.inner.cell.get().cloned()
    }

    /// Run a continuation when the value resolves
    ///
    /// Runs immediately if the value is already present.
    fn subscribe<F>(&self, f: F)
    where
        F: FnOnce(&T) + Send + 'static,
    {
        // The lock orders subscription against resolution so a continuation
        // is never dropped.
        let mut waiters = self
            .inner
            .waiters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(value) = self.inner.cell.get() {
            drop(waiters);
            f(value);
        } else {
            waiters.push(Box::new(f));
        }
    }

    /// Apply a pure function, producing a new deferred output
    ///
    /// The derived output resolves when this one does. No blocking occurs.
    pub fn map<U, F>(&self, f: F) -> Output<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(&T) -> U + Send + 'static,
    {
        let (mapped, resolver) = Output::pending();
        self.subscribe(move |value| {
            let _ = resolver.resolve(f(value));
        });
        mapped
    }
}

impl Output<String> {
    /// Prefix-concatenate a string onto a deferred string value
    ///
    /// Mirrors composing `"http://"` with a DNS name known only after
    /// provisioning.
    pub fn concat(&self, prefix: impl Into<String>) -> Output<String> {
        let prefix = prefix.into();
        self.map(move |value| format!("{}{}", prefix, value))
    }
}

impl<T: Clone + Send + Sync + 'static> Resolver<T> {
    /// Assign the value, waking all derived outputs
    ///
    /// Fails if the value was already assigned.
    pub fn resolve(&self, value: T) -> Result<(), OutputError> {
        let mut waiters = self
            .inner
            .waiters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if self.inner.cell.set(value).is_err() {
            return Err(OutputError::AlreadyResolved);
        }

        let pending = std::mem::take(&mut *waiters);
        drop(waiters);

        // Cell was just set above
        if let Some(value) = self.inner.cell.get() {
            for waiter in pending {
                waiter(value);
            }
        }
        Ok(())
    }
}
