use serde::{Deserialize, Serialize};

/// A bookmark document, keyed per user by tweet id.
///
/// Re-bookmarking an already bookmarked tweet overwrites the record and
/// refreshes `createdAt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    /// The bookmarked tweet id.
    pub id: String,

    /// RFC 3339 bookmark timestamp.
    pub created_at: String,
}
