//! Document store abstraction with per-document atomic field operations.
//!
//! The store offers single-document atomic writes plus a narrow set of
//! atomic sub-operations (add-to-set, remove-from-set, increment, set,
//! timestamp-now) and deliberately nothing more: no cross-document
//! transactions, no locks, no version checks. Compound operations built on
//! top stay safe because every sub-operation is idempotent or commutative.

pub mod error;
pub mod memory;
pub mod ops;
pub mod redb;
pub mod traits;

pub use error::DocError;
pub use memory::MemoryStore;
pub use redb::RedbStore;
pub use traits::{DocStore, Document, FieldOp};
