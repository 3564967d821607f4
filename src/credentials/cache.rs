// ABOUTME: Single-flight caches for credential lookups.
// ABOUTME: The first caller for a key computes the value; concurrent callers wait and share it.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::cloud::AccountInfo;

/// Map of lazily computed values with at most one computation in flight per key.
///
/// Failed computations are not stored: the next caller for that key retries.
/// Successful values are never invalidated for the lifetime of the cache.
pub struct SingleFlightCache<K, V> {
    cells: Mutex<HashMap<K, Arc<OnceCell<V>>>>,
}

impl<K, V> SingleFlightCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            cells: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get_or_try_init<F, Fut, E>(&self, key: &K, init: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let cell = {
            let mut cells = self.cells.lock();
            cells.entry(key.clone()).or_default().clone()
        };
        cell.get_or_try_init(init).await.cloned()
    }

    /// Value for `key` if it has already been computed.
    pub fn get(&self, key: &K) -> Option<V> {
        let cells = self.cells.lock();
        cells.get(key).and_then(|cell| cell.get().cloned())
    }

    /// Number of keys that hold a computed value.
    pub fn len(&self) -> usize {
        self.cells
            .lock()
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> Default for SingleFlightCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// What the ambient-account lookup concluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultAccount {
    Known(AccountInfo),
    /// The lookup failed with a non-fatal error; treated as "no ambient account".
    Unknown,
}

impl DefaultAccount {
    pub fn info(&self) -> Option<&AccountInfo> {
        match self {
            DefaultAccount::Known(info) => Some(info),
            DefaultAccount::Unknown => None,
        }
    }
}

/// Single-entry cache for the ambient account.
///
/// States: unresolved (empty cell), resolving (a caller is inside the
/// initializer, others wait), resolved to `Known`, or resolved to `Unknown`.
#[derive(Default)]
pub struct DefaultAccountCache {
    cell: OnceCell<DefaultAccount>,
}

impl DefaultAccountCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_try_init<F, Fut, E>(&self, init: F) -> Result<DefaultAccount, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<DefaultAccount, E>>,
    {
        self.cell.get_or_try_init(init).await.cloned()
    }

    pub fn get(&self) -> Option<&DefaultAccount> {
        self.cell.get()
    }
}
