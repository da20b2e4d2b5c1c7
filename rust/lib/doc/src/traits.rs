use serde_json::Value;

use crate::error::DocError;

/// A stored document. Always a JSON object at the top level.
pub type Document = Value;

/// An atomic sub-operation on a single field of one document.
///
/// These are the only mutation primitives the store guarantees to apply
/// correctly under concurrent callers. There are no cross-document
/// transactions; safety of compound operations comes from every `FieldOp`
/// being idempotent or commutative.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOp {
    /// Add a value to an array field, treating it as a set.
    /// Adding an existing member is a no-op.
    AddToSet(String, Value),

    /// Remove all equal members from an array field.
    /// Removing an absent member is a no-op.
    RemoveFromSet(String, Value),

    /// Add a signed delta to an integer field. Missing fields start at 0.
    /// No floor is enforced; counters may go negative under races.
    Increment(String, i64),

    /// Replace the field value. `null` is allowed.
    Set(String, Value),

    /// Set the field to the store's current time (RFC 3339).
    TimestampNow(String),
}

impl FieldOp {
    /// Field name this op targets.
    pub fn field(&self) -> &str {
        match self {
            FieldOp::AddToSet(f, _)
            | FieldOp::RemoveFromSet(f, _)
            | FieldOp::Increment(f, _)
            | FieldOp::Set(f, _)
            | FieldOp::TimestampNow(f) => f,
        }
    }
}

/// DocStore provides a keyed document storage interface with per-document
/// atomic field operations.
///
/// Keys follow a namespaced convention: `users:42`, `tweets:abc`,
/// `bookmarks:42:abc`. Each call is atomic for the one document it touches;
/// nothing is atomic across documents.
#[async_trait::async_trait]
pub trait DocStore: Send + Sync {
    /// Get a document. Returns None if the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<Document>, DocError>;

    /// Create a document. Returns `DocError::Conflict` if the key exists.
    async fn create(&self, key: &str, doc: Document) -> Result<(), DocError>;

    /// Create or replace a document (upsert).
    async fn put(&self, key: &str, doc: Document) -> Result<(), DocError>;

    /// Apply a batch of field operations to one document atomically.
    /// Returns `DocError::NotFound` if the document is absent.
    async fn apply(&self, key: &str, ops: Vec<FieldOp>) -> Result<(), DocError>;

    /// Delete a document. Absent keys are a no-op.
    async fn delete(&self, key: &str) -> Result<(), DocError>;

    /// Delete several documents in one call. Absent keys are skipped.
    /// This is a batching convenience, not a transaction.
    async fn delete_many(&self, keys: &[String]) -> Result<(), DocError>;

    /// Scan all documents whose key matches a prefix. Returns sorted
    /// (key, document) pairs.
    async fn scan(&self, prefix: &str) -> Result<Vec<(String, Document)>, DocError>;
}
