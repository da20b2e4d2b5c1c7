use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::DocError;
use crate::ops::apply_ops;
use crate::traits::{DocStore, Document, FieldOp};

/// MemoryStore is a DocStore backed by an in-process map.
///
/// Every call takes the write or read lock for its whole duration, which
/// gives the same per-document atomicity the trait promises. Used in tests
/// and as the reference implementation for field-op semantics.
pub struct MemoryStore {
    docs: RwLock<BTreeMap<String, Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(BTreeMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DocStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Document>, DocError> {
        let docs = self.docs.read().map_err(poisoned)?;
        Ok(docs.get(key).cloned())
    }

    async fn create(&self, key: &str, doc: Document) -> Result<(), DocError> {
        let mut docs = self.docs.write().map_err(poisoned)?;
        if docs.contains_key(key) {
            return Err(DocError::Conflict(key.to_string()));
        }
        docs.insert(key.to_string(), doc);
        Ok(())
    }

    async fn put(&self, key: &str, doc: Document) -> Result<(), DocError> {
        let mut docs = self.docs.write().map_err(poisoned)?;
        docs.insert(key.to_string(), doc);
        Ok(())
    }

    async fn apply(&self, key: &str, ops: Vec<FieldOp>) -> Result<(), DocError> {
        let mut docs = self.docs.write().map_err(poisoned)?;
        let doc = docs
            .get(key)
            .ok_or_else(|| DocError::NotFound(key.to_string()))?;
        // Mutate a copy: a failed op mid-batch must leave the stored
        // document untouched.
        let mut updated = doc.clone();
        apply_ops(&mut updated, &ops)?;
        docs.insert(key.to_string(), updated);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), DocError> {
        let mut docs = self.docs.write().map_err(poisoned)?;
        docs.remove(key);
        Ok(())
    }

    async fn delete_many(&self, keys: &[String]) -> Result<(), DocError> {
        let mut docs = self.docs.write().map_err(poisoned)?;
        for key in keys {
            docs.remove(key);
        }
        Ok(())
    }

    async fn scan(&self, prefix: &str) -> Result<Vec<(String, Document)>, DocError> {
        let docs = self.docs.read().map_err(poisoned)?;
        let mut results = Vec::new();
        for (key, doc) in docs.range(prefix.to_string()..) {
            if !key.starts_with(prefix) {
                break;
            }
            results.push((key.clone(), doc.clone()));
        }
        Ok(results)
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> DocError {
    DocError::Storage("store lock poisoned".into())
}
