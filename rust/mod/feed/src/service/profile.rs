//! User profile maintenance and store-wide reads.

use serde_json::json;

use chirp_core::merge_patch;
use chirp_doc::FieldOp;

use crate::keys::{TWEETS_PREFIX, USERS_PREFIX, fields, user_key};
use crate::model::User;
use crate::service::{FeedError, FeedService};

impl FeedService {
    /// Load one user.
    pub async fn get_user(&self, user_id: &str) -> Result<User, FeedError> {
        let key = user_key(user_id);
        match self.docs.get(&key).await? {
            Some(doc) => Self::parse(&key, doc),
            None => Err(FeedError::NotFound(format!("user {user_id}"))),
        }
    }

    /// Update a user's editable profile data with JSON merge-patch.
    ///
    /// `id` and `createdAt` are pinned to their current values; `updatedAt`
    /// is refreshed.
    pub async fn update_user(
        &self,
        user_id: &str,
        patch: serde_json::Value,
    ) -> Result<User, FeedError> {
        let key = user_key(user_id);
        let mut base = match self.docs.get(&key).await? {
            Some(doc) => doc,
            None => return Err(FeedError::NotFound(format!("user {user_id}"))),
        };

        let current: User = Self::parse(&key, base.clone())?;
        merge_patch(&mut base, &patch);
        base["id"] = json!(current.id);
        base["createdAt"] = json!(current.created_at);
        base["updatedAt"] = json!(chirp_core::now_rfc3339());

        let updated: User = Self::parse(&key, base.clone())?;
        self.docs.put(&key, base).await?;
        Ok(updated)
    }

    /// Change a user's handle. `None` refreshes `updatedAt` only.
    pub async fn update_username(
        &self,
        user_id: &str,
        username: Option<&str>,
    ) -> Result<(), FeedError> {
        let mut ops = Vec::with_capacity(2);
        if let Some(username) = username {
            ops.push(FieldOp::Set(fields::USERNAME.to_string(), json!(username)));
        }
        ops.push(Self::touch());
        self.docs.apply(&user_key(user_id), ops).await?;
        Ok(())
    }

    /// Whether no user currently holds this handle.
    pub async fn username_available(&self, username: &str) -> Result<bool, FeedError> {
        let entries = self.docs.scan(USERS_PREFIX).await?;
        for (key, doc) in entries {
            let user: User = Self::parse(&key, doc)?;
            if user.username == username {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Store-wide tweet count.
    pub async fn total_tweet_count(&self) -> Result<usize, FeedError> {
        Ok(self.docs.scan(TWEETS_PREFIX).await?.len())
    }
}
