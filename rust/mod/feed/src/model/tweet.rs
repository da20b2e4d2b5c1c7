use serde::{Deserialize, Serialize};

/// An uploaded image attachment: the id the client assigned to the file,
/// the resolved asset locator, and the original file name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    pub id: String,
    pub src: String,
    pub alt: String,
}

/// A tweet document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    /// Unique identifier.
    pub id: String,

    /// Authoring user id.
    pub created_by: String,

    /// Text content. Null for image-only tweets.
    #[serde(default)]
    pub text: Option<String>,

    /// Image attachments, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageData>>,

    /// Parent tweet id. Null for root tweets. A deleted parent leaves this
    /// dangling; orphaned replies are an accepted state.
    #[serde(default)]
    pub parent: Option<String>,

    /// Ids of users who liked this tweet. Set semantics.
    #[serde(default)]
    pub user_likes: Vec<String>,

    /// Ids of users who retweeted this tweet. Set semantics.
    #[serde(default)]
    pub user_retweets: Vec<String>,

    /// Denormalized reply count. Never mutated once the tweet is deleted;
    /// may go negative under races, never clamped.
    #[serde(default)]
    pub user_replies: i64,

    /// RFC 3339 creation timestamp. Immutable once set.
    pub created_at: String,

    /// RFC 3339 last update timestamp. Null until first mutation.
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Tweet {
    /// New root tweet with empty interaction sets.
    pub fn new(id: impl Into<String>, created_by: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_by: created_by.into(),
            text: None,
            images: None,
            parent: None,
            user_likes: Vec::new(),
            user_retweets: Vec::new(),
            user_replies: 0,
            created_at: chirp_core::now_rfc3339(),
            updated_at: None,
        }
    }
}
