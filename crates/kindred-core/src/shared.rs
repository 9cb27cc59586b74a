//! Lock-guarded registry for callers that share one tree across threads

use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};
use crate::tree::FamilyTree;

/// A [`FamilyTree`] behind a single coarse-grained lock.
///
/// Mutations hold the write lock for the whole operation, so the cycle check
/// and the edge insertion of `add_parent_child` can never interleave with
/// another writer. Queries share the read lock and never observe a
/// half-applied edge.
#[derive(Debug, Clone, Default)]
pub struct SharedFamilyTree {
    inner: Arc<RwLock<FamilyTree>>,
}

impl SharedFamilyTree {
    pub fn new(tree: FamilyTree) -> Self {
        Self {
            inner: Arc::new(RwLock::new(tree)),
        }
    }

    /// Run a read-only operation under the shared lock
    pub fn read<T>(&self, f: impl FnOnce(&FamilyTree) -> Result<T>) -> Result<T> {
        let tree = self
            .inner
            .read()
            .map_err(|e| Error::Internal(format!("Lock error: {}", e)))?;
        f(&tree)
    }

    /// Run a mutating operation under the exclusive lock
    pub fn write<T>(&self, f: impl FnOnce(&mut FamilyTree) -> Result<T>) -> Result<T> {
        let mut tree = self
            .inner
            .write()
            .map_err(|e| Error::Internal(format!("Lock error: {}", e)))?;
        f(&mut tree)
    }
}
