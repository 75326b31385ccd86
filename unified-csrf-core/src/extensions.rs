//! Typed request extensions.
//!
//! A middleware attaches request-scoped state here so that the handler and
//! the response side of the same middleware can reach it later. Values sit
//! behind `Arc`: a middleware that keeps its own handle sees every write made
//! further down the chain.
//!
//! ```rust
//! use std::sync::{Arc, OnceLock};
//! use unified_csrf_core::Extensions;
//!
//! let slot = Arc::new(OnceLock::<String>::new());
//! let mut ext = Extensions::new();
//! ext.insert_arc(slot.clone());
//!
//! ext.get::<OnceLock<String>>().unwrap().set("minted".into()).unwrap();
//! assert_eq!(slot.get().map(String::as_str), Some("minted"));
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type Entry = Arc<dyn Any + Send + Sync>;

/// One value per type, keyed by `TypeId`
#[derive(Clone, Default)]
pub struct Extensions {
    entries: HashMap<TypeId, Entry>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, replacing any previous value of the same type
    pub fn insert<T: Send + Sync + 'static>(&mut self, value: T) {
        self.insert_arc(Arc::new(value));
    }

    /// Store a shared value; the caller keeps its own handle
    pub fn insert_arc<T: Send + Sync + 'static>(&mut self, value: Arc<T>) {
        self.entries.insert(TypeId::of::<T>(), value as Entry);
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.entries.get(&TypeId::of::<T>())?.downcast_ref::<T>()
    }

    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }
}

impl fmt::Debug for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extensions")
            .field("entries", &self.entries.len())
            .finish()
    }
}
