//! Document keys and field names.
//!
//! Keys follow the store's namespaced convention; field names are the
//! camelCase names used inside stored documents (they must match the
//! serde-renamed model fields exactly).

/// Key of a user document.
pub fn user_key(user_id: &str) -> String {
    format!("users:{user_id}")
}

/// Key of a tweet document.
pub fn tweet_key(tweet_id: &str) -> String {
    format!("tweets:{tweet_id}")
}

/// Key of a user's stats document (1:1 with the user, created lazily).
pub fn stats_key(user_id: &str) -> String {
    format!("stats:{user_id}")
}

/// Key of one bookmark, scoped per user and keyed by tweet.
pub fn bookmark_key(user_id: &str, tweet_id: &str) -> String {
    format!("bookmarks:{user_id}:{tweet_id}")
}

/// Scan prefix covering all of a user's bookmarks.
pub fn bookmark_prefix(user_id: &str) -> String {
    format!("bookmarks:{user_id}:")
}

/// Prefix covering all user documents.
pub const USERS_PREFIX: &str = "users:";

/// Prefix covering all tweet documents.
pub const TWEETS_PREFIX: &str = "tweets:";

/// Asset key for an uploaded image: `{prefix}/{userId}/{fileName}`.
///
/// Content-addressed by name, not hash — the same name under the same user
/// always maps to the same locator.
pub fn image_key(prefix: &str, user_id: &str, file_name: &str) -> String {
    format!("{prefix}/{user_id}/{file_name}")
}

/// Field names inside stored documents.
pub mod fields {
    pub const FOLLOWING: &str = "following";
    pub const FOLLOWERS: &str = "followers";
    pub const TOTAL_TWEETS: &str = "totalTweets";
    pub const TOTAL_PHOTOS: &str = "totalPhotos";
    pub const PINNED_TWEET: &str = "pinnedTweet";
    pub const USER_LIKES: &str = "userLikes";
    pub const USER_RETWEETS: &str = "userRetweets";
    pub const USER_REPLIES: &str = "userReplies";
    pub const STATS_TWEETS: &str = "tweets";
    pub const STATS_LIKES: &str = "likes";
    pub const USERNAME: &str = "username";
    pub const UPDATED_AT: &str = "updatedAt";
}
