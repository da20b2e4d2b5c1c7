use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableTable, TableDefinition};
use tracing::info;

use crate::error::DocError;
use crate::ops::apply_ops;
use crate::traits::{DocStore, Document, FieldOp};

const TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("docs");

/// RedbStore is a DocStore backed by redb — a pure-Rust embedded key-value
/// database. Documents are stored as serialized JSON; `apply` loads,
/// mutates and rewrites the document inside a single write transaction,
/// which is what makes the field-op batch atomic per document.
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create a redb database at the given path.
    pub fn open(path: &Path) -> Result<Self, DocError> {
        let db = Database::create(path).map_err(storage)?;

        // Ensure the table exists by doing a write transaction.
        let write_txn = db.begin_write().map_err(storage)?;
        {
            let _table = write_txn.open_table(TABLE).map_err(storage)?;
        }
        write_txn.commit().map_err(storage)?;

        info!(path = %path.display(), "document store opened");
        Ok(Self { db: Arc::new(db) })
    }

    fn read_doc(&self, key: &str) -> Result<Option<Document>, DocError> {
        let read_txn = self.db.begin_read().map_err(storage)?;
        let table = read_txn.open_table(TABLE).map_err(storage)?;

        match table.get(key) {
            Ok(Some(val)) => Ok(Some(decode(val.value())?)),
            Ok(None) => Ok(None),
            Err(e) => Err(storage(e)),
        }
    }

    fn write_doc(&self, key: &str, doc: &Document, create_only: bool) -> Result<(), DocError> {
        let bytes = encode(doc)?;
        let write_txn = self.db.begin_write().map_err(storage)?;
        {
            let mut table = write_txn.open_table(TABLE).map_err(storage)?;
            if create_only {
                let exists = table.get(key).map_err(storage)?.is_some();
                if exists {
                    return Err(DocError::Conflict(key.to_string()));
                }
            }
            table.insert(key, bytes.as_slice()).map_err(storage)?;
        }
        write_txn.commit().map_err(storage)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl DocStore for RedbStore {
    async fn get(&self, key: &str) -> Result<Option<Document>, DocError> {
        self.read_doc(key)
    }

    async fn create(&self, key: &str, doc: Document) -> Result<(), DocError> {
        self.write_doc(key, &doc, true)
    }

    async fn put(&self, key: &str, doc: Document) -> Result<(), DocError> {
        self.write_doc(key, &doc, false)
    }

    async fn apply(&self, key: &str, ops: Vec<FieldOp>) -> Result<(), DocError> {
        let write_txn = self.db.begin_write().map_err(storage)?;
        {
            let mut table = write_txn.open_table(TABLE).map_err(storage)?;

            let current = {
                let guard = table.get(key).map_err(storage)?;
                match guard {
                    Some(val) => val.value().to_vec(),
                    None => return Err(DocError::NotFound(key.to_string())),
                }
            };

            let mut doc = decode(&current)?;
            apply_ops(&mut doc, &ops)?;
            let bytes = encode(&doc)?;
            table.insert(key, bytes.as_slice()).map_err(storage)?;
        }
        write_txn.commit().map_err(storage)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), DocError> {
        let write_txn = self.db.begin_write().map_err(storage)?;
        {
            let mut table = write_txn.open_table(TABLE).map_err(storage)?;
            table.remove(key).map_err(storage)?;
        }
        write_txn.commit().map_err(storage)?;
        Ok(())
    }

    async fn delete_many(&self, keys: &[String]) -> Result<(), DocError> {
        let write_txn = self.db.begin_write().map_err(storage)?;
        {
            let mut table = write_txn.open_table(TABLE).map_err(storage)?;
            for key in keys {
                table.remove(key.as_str()).map_err(storage)?;
            }
        }
        write_txn.commit().map_err(storage)?;
        Ok(())
    }

    async fn scan(&self, prefix: &str) -> Result<Vec<(String, Document)>, DocError> {
        let read_txn = self.db.begin_read().map_err(storage)?;
        let table = read_txn.open_table(TABLE).map_err(storage)?;

        let mut results = Vec::new();
        let iter = table.range(prefix..).map_err(storage)?;

        for entry in iter {
            let entry = entry.map_err(storage)?;
            let key = entry.0.value().to_string();
            if !key.starts_with(prefix) {
                break;
            }
            results.push((key, decode(entry.1.value())?));
        }

        Ok(results)
    }
}

fn storage<E: std::fmt::Display>(e: E) -> DocError {
    DocError::Storage(e.to_string())
}

fn encode(doc: &Document) -> Result<Vec<u8>, DocError> {
    serde_json::to_vec(doc).map_err(|e| DocError::Serialization(e.to_string()))
}

fn decode(bytes: &[u8]) -> Result<Document, DocError> {
    serde_json::from_slice(bytes).map_err(|e| DocError::Serialization(e.to_string()))
}
