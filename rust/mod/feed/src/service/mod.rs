pub mod counter;
pub mod delete;
pub mod profile;
pub mod relation;
pub mod timeline;
pub mod upload;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

use chirp_blob::{AssetError, AssetStore, FileStore};
use chirp_core::{ServiceConfig, ServiceError};
use chirp_doc::{DocError, DocStore, FieldOp, RedbStore};

use crate::keys::fields;

/// Feed service error type.
///
/// Compound operations fan out several atomic single-document writes; the
/// store offers no cross-document transactions, so a failed half is never
/// rolled back. `Partial` reports exactly that: some writes landed, some
/// did not, and the divergence stands until a retry converges it.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("write rejected: {0}")]
    Write(String),

    #[error("{failed}/{total} writes failed: {detail}")]
    Partial {
        failed: usize,
        total: usize,
        detail: String,
    },

    #[error("asset storage: {0}")]
    Asset(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl From<DocError> for FeedError {
    fn from(e: DocError) -> Self {
        match e {
            DocError::NotFound(key) => FeedError::NotFound(key),
            DocError::Conflict(key) => FeedError::Write(format!("already exists: {key}")),
            DocError::Storage(m) => FeedError::Write(m),
            DocError::Serialization(m) => FeedError::Internal(m),
        }
    }
}

impl From<AssetError> for FeedError {
    fn from(e: AssetError) -> Self {
        FeedError::Asset(e.to_string())
    }
}

impl From<FeedError> for ServiceError {
    fn from(e: FeedError) -> Self {
        match e {
            FeedError::NotFound(m) => ServiceError::NotFound(m),
            FeedError::Write(m) => ServiceError::Storage(m),
            e @ FeedError::Partial { .. } => ServiceError::PartialWrite(e.to_string()),
            FeedError::Asset(m) => ServiceError::Storage(m),
            FeedError::Internal(m) => ServiceError::Internal(m),
        }
    }
}

/// Set mutation direction. A closed variant instead of a string argument,
/// so dispatch is exhaustive at compile time.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum SetOp {
    Add,
    Remove,
}

impl SetOp {
    /// The atomic field op this direction maps to.
    pub(crate) fn field_op(self, field: &str, value: serde_json::Value) -> FieldOp {
        match self {
            SetOp::Add => FieldOp::AddToSet(field.to_string(), value),
            SetOp::Remove => FieldOp::RemoveFromSet(field.to_string(), value),
        }
    }
}

/// Counter adjustment direction.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Direction {
    Increment,
    Decrement,
}

impl Direction {
    /// +1 or -1.
    pub fn delta(self) -> i64 {
        match self {
            Direction::Increment => 1,
            Direction::Decrement => -1,
        }
    }
}

/// Outcome of the one counter path that tolerates a missing target.
///
/// `ParentMissing` makes the suppressed "parent tweet already deleted" race
/// visible to callers instead of hiding it in a blanket catch.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[must_use]
pub enum CounterOutcome {
    Applied,
    ParentMissing,
}

/// Configuration for the feed service.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Asset key prefix for uploaded images.
    pub image_prefix: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            image_prefix: "images".to_string(),
        }
    }
}

/// The feed service. Holds storage backends and configuration.
///
/// All auth/session state enters through explicit parameters (acting user
/// id and the like); nothing is read from ambient state.
pub struct FeedService {
    pub(crate) docs: Arc<dyn DocStore>,
    pub(crate) assets: Arc<dyn AssetStore>,
    pub(crate) config: FeedConfig,
}

impl FeedService {
    /// Create a feed service over the given storage backends.
    pub fn new(docs: Arc<dyn DocStore>, assets: Arc<dyn AssetStore>, config: FeedConfig) -> Self {
        Self {
            docs,
            assets,
            config,
        }
    }

    /// Open a feed service with the default embedded backends resolved from
    /// host configuration: redb documents, filesystem assets.
    pub fn open(service_config: &ServiceConfig, config: FeedConfig) -> Result<Self, FeedError> {
        let docs = RedbStore::open(&service_config.resolve_db_path())?;
        let assets = FileStore::open(&service_config.resolve_asset_dir())?;
        Ok(Self::new(Arc::new(docs), Arc::new(assets), config))
    }

    /// An `updatedAt` refresh, paired with every document mutation.
    pub(crate) fn touch() -> FieldOp {
        FieldOp::TimestampNow(fields::UPDATED_AT.to_string())
    }

    /// Decode a stored document into a model type.
    pub(crate) fn parse<T: DeserializeOwned>(
        key: &str,
        doc: chirp_doc::Document,
    ) -> Result<T, FeedError> {
        serde_json::from_value(doc)
            .map_err(|e| FeedError::Internal(format!("corrupt document {key}: {e}")))
    }
}

/// Aggregate the per-write outcomes of one fan-out operation.
///
/// All writes succeeded → Ok. All failed → the first error, converted.
/// Mixed → `Partial`, naming the writes that failed; the succeeded writes
/// stay applied.
pub(crate) fn settle(
    op: &'static str,
    outcomes: Vec<(&'static str, Result<(), DocError>)>,
) -> Result<(), FeedError> {
    let total = outcomes.len();
    let mut failures: Vec<(&'static str, DocError)> = Vec::new();
    for (name, outcome) in outcomes {
        if let Err(e) = outcome {
            failures.push((name, e));
        }
    }

    if failures.is_empty() {
        return Ok(());
    }

    if failures.len() == total {
        warn!(op, "all constituent writes failed");
        if let Some((_, first)) = failures.into_iter().next() {
            return Err(first.into());
        }
        return Err(FeedError::Internal("empty fan-out".into()));
    }

    let failed = failures.len();
    let detail = failures
        .iter()
        .map(|(name, e)| format!("{name}: {e}"))
        .collect::<Vec<_>>()
        .join("; ");
    warn!(op, failed, total, %detail, "partial fan-out failure, no rollback");
    Err(FeedError::Partial {
        failed,
        total,
        detail,
    })
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;
    use crate::keys::{tweet_key, user_key};
    use crate::model::{Tweet, User};
    use chirp_doc::MemoryStore;

    /// Feed service over in-memory documents and a temp-dir asset store.
    /// The TempDir must outlive the service.
    pub(crate) fn memory_service() -> (FeedService, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let docs = Arc::new(MemoryStore::new());
        let assets = Arc::new(FileStore::open(tmp.path()).unwrap());
        (
            FeedService::new(docs, assets, FeedConfig::default()),
            tmp,
        )
    }

    pub(crate) async fn seed_user(svc: &FeedService, id: &str) -> User {
        let user = User::new(id, format!("User {id}"), id);
        svc.docs
            .put(&user_key(id), serde_json::to_value(&user).unwrap())
            .await
            .unwrap();
        user
    }

    pub(crate) async fn seed_tweet(svc: &FeedService, id: &str, author: &str) -> Tweet {
        let tweet = Tweet::new(id, author);
        svc.docs
            .put(&tweet_key(id), serde_json::to_value(&tweet).unwrap())
            .await
            .unwrap();
        tweet
    }

    pub(crate) async fn get_user(svc: &FeedService, id: &str) -> User {
        let doc = svc.docs.get(&user_key(id)).await.unwrap().unwrap();
        serde_json::from_value(doc).unwrap()
    }

    pub(crate) async fn get_tweet(svc: &FeedService, id: &str) -> Tweet {
        let doc = svc.docs.get(&tweet_key(id)).await.unwrap().unwrap();
        serde_json::from_value(doc).unwrap()
    }
}
