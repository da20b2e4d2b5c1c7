use serde::{Deserialize, Serialize};

/// A user identity document.
///
/// `following`/`followers` are denormalized id sets kept pairwise consistent
/// by the relationship mutator; `totalTweets`/`totalPhotos` are denormalized
/// counters. None of these are enforced by the store — consistency is a
/// design intent maintained by fan-out writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Unique handle.
    pub username: String,

    /// Profile bio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    /// Avatar locator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,

    /// Cover photo locator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_photo_url: Option<String>,

    /// Ids of users this user follows. Set semantics, order irrelevant.
    #[serde(default)]
    pub following: Vec<String>,

    /// Ids of users following this user. Set semantics, order irrelevant.
    #[serde(default)]
    pub followers: Vec<String>,

    /// Denormalized count of authored tweets. May drift from the stats
    /// document under partial failure; never clamped.
    #[serde(default)]
    pub total_tweets: i64,

    /// Denormalized count of uploaded photos.
    #[serde(default)]
    pub total_photos: i64,

    /// Id of the pinned tweet, if any.
    #[serde(default)]
    pub pinned_tweet: Option<String>,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp. Null until first mutation.
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl User {
    /// New user with empty relationship sets and zeroed counters.
    pub fn new(id: impl Into<String>, name: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            username: username.into(),
            bio: None,
            photo_url: None,
            cover_photo_url: None,
            following: Vec::new(),
            followers: Vec::new(),
            total_tweets: 0,
            total_photos: 0,
            pinned_tweet: None,
            created_at: chirp_core::now_rfc3339(),
            updated_at: None,
        }
    }
}
