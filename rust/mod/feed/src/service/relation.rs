//! Relationship mutations: follow, like, retweet, bookmark, pin.
//!
//! Every operation is a bounded set of atomic single-document writes fired
//! concurrently. The pair is not jointly atomic — a crash between halves
//! leaves them transiently inconsistent, which is accepted because every
//! half is idempotent and a retry converges.

use serde_json::json;
use tracing::debug;

use chirp_doc::{DocError, FieldOp};

use crate::keys::{bookmark_key, bookmark_prefix, fields, stats_key, tweet_key, user_key};
use crate::model::{Bookmark, UserStats};
use crate::service::{FeedError, FeedService, SetOp, settle};

impl FeedService {
    // ── Follow ──────────────────────────────────────────────────────

    /// Add `target` to the actor's following set and the actor to the
    /// target's followers set.
    pub async fn follow(&self, actor: &str, target: &str) -> Result<(), FeedError> {
        self.apply_follow(SetOp::Add, actor, target).await
    }

    /// Reverse of [`follow`](Self::follow). Removing an absent member is a
    /// no-op on both sides.
    pub async fn unfollow(&self, actor: &str, target: &str) -> Result<(), FeedError> {
        self.apply_follow(SetOp::Remove, actor, target).await
    }

    async fn apply_follow(&self, op: SetOp, actor: &str, target: &str) -> Result<(), FeedError> {
        let actor_key = user_key(actor);
        let target_key = user_key(target);
        let (following, followers) = tokio::join!(
            self.docs.apply(
                &actor_key,
                vec![op.field_op(fields::FOLLOWING, json!(target)), Self::touch()],
            ),
            self.docs.apply(
                &target_key,
                vec![op.field_op(fields::FOLLOWERS, json!(actor)), Self::touch()],
            ),
        );
        settle(
            "follow",
            vec![("actor.following", following), ("target.followers", followers)],
        )
    }

    // ── Like ────────────────────────────────────────────────────────

    /// Add the actor to the tweet's likes and the tweet to the actor's
    /// liked-tweets stats.
    pub async fn like(&self, actor: &str, tweet_id: &str) -> Result<(), FeedError> {
        self.apply_like(SetOp::Add, actor, tweet_id).await
    }

    pub async fn unlike(&self, actor: &str, tweet_id: &str) -> Result<(), FeedError> {
        self.apply_like(SetOp::Remove, actor, tweet_id).await
    }

    async fn apply_like(&self, op: SetOp, actor: &str, tweet_id: &str) -> Result<(), FeedError> {
        let key = tweet_key(tweet_id);
        let (tweet, stats) = tokio::join!(
            self.docs.apply(
                &key,
                vec![op.field_op(fields::USER_LIKES, json!(actor)), Self::touch()],
            ),
            self.apply_stats(actor, op.field_op(fields::STATS_LIKES, json!(tweet_id))),
        );
        settle("like", vec![("tweet.userLikes", tweet), ("stats.likes", stats)])
    }

    // ── Retweet ─────────────────────────────────────────────────────

    /// Add the actor to the tweet's retweets and the tweet to the actor's
    /// stats tweet set (so it surfaces in their timeline).
    pub async fn retweet(&self, actor: &str, tweet_id: &str) -> Result<(), FeedError> {
        self.apply_retweet(SetOp::Add, actor, tweet_id).await
    }

    pub async fn unretweet(&self, actor: &str, tweet_id: &str) -> Result<(), FeedError> {
        self.apply_retweet(SetOp::Remove, actor, tweet_id).await
    }

    async fn apply_retweet(&self, op: SetOp, actor: &str, tweet_id: &str) -> Result<(), FeedError> {
        let key = tweet_key(tweet_id);
        let (tweet, stats) = tokio::join!(
            self.docs.apply(
                &key,
                vec![op.field_op(fields::USER_RETWEETS, json!(actor)), Self::touch()],
            ),
            self.apply_stats(actor, op.field_op(fields::STATS_TWEETS, json!(tweet_id))),
        );
        settle(
            "retweet",
            vec![("tweet.userRetweets", tweet), ("stats.tweets", stats)],
        )
    }

    // ── Bookmark ────────────────────────────────────────────────────

    /// Bookmark a tweet for the actor. Re-bookmarking overwrites the record
    /// and refreshes its timestamp.
    pub async fn bookmark(&self, actor: &str, tweet_id: &str) -> Result<(), FeedError> {
        let record = Bookmark {
            id: tweet_id.to_string(),
            created_at: chirp_core::now_rfc3339(),
        };
        let doc = serde_json::to_value(&record)
            .map_err(|e| FeedError::Internal(e.to_string()))?;
        self.docs.put(&bookmark_key(actor, tweet_id), doc).await?;
        Ok(())
    }

    /// Remove a bookmark. Absent bookmarks are a no-op.
    pub async fn unbookmark(&self, actor: &str, tweet_id: &str) -> Result<(), FeedError> {
        self.docs.delete(&bookmark_key(actor, tweet_id)).await?;
        Ok(())
    }

    /// Delete all of the actor's bookmarks in one batch.
    pub async fn clear_bookmarks(&self, actor: &str) -> Result<(), FeedError> {
        let entries = self.docs.scan(&bookmark_prefix(actor)).await?;
        let keys: Vec<String> = entries.into_iter().map(|(key, _)| key).collect();
        debug!(actor, count = keys.len(), "clearing bookmarks");
        self.docs.delete_many(&keys).await?;
        Ok(())
    }

    // ── Pin ─────────────────────────────────────────────────────────

    /// Pin a tweet to the actor's profile, replacing any previous pin.
    pub async fn pin(&self, actor: &str, tweet_id: &str) -> Result<(), FeedError> {
        self.docs
            .apply(
                &user_key(actor),
                vec![
                    FieldOp::Set(fields::PINNED_TWEET.to_string(), json!(tweet_id)),
                    Self::touch(),
                ],
            )
            .await?;
        Ok(())
    }

    /// Clear the actor's pinned tweet.
    pub async fn unpin(&self, actor: &str) -> Result<(), FeedError> {
        self.docs
            .apply(
                &user_key(actor),
                vec![
                    FieldOp::Set(fields::PINNED_TWEET.to_string(), serde_json::Value::Null),
                    Self::touch(),
                ],
            )
            .await?;
        Ok(())
    }

    // ── Stats writes ────────────────────────────────────────────────

    /// Apply one field op (plus timestamp) to the actor's stats document,
    /// creating it lazily on first use. A create/create race falls back to
    /// the apply, so concurrent first writes both land.
    pub(crate) async fn apply_stats(&self, user_id: &str, op: FieldOp) -> Result<(), DocError> {
        let key = stats_key(user_id);
        let ops = vec![op.clone(), Self::touch()];

        match self.docs.apply(&key, ops.clone()).await {
            Err(DocError::NotFound(_)) => {
                debug!(user_id, "creating stats document lazily");
                let doc = serde_json::to_value(UserStats::new())
                    .map_err(|e| DocError::Serialization(e.to_string()))?;
                match self.docs.create(&key, doc).await {
                    Ok(()) | Err(DocError::Conflict(_)) => {}
                    Err(e) => return Err(e),
                }
                self.docs.apply(&key, ops).await
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::keys::{bookmark_prefix, stats_key};
    use crate::model::UserStats;
    use crate::service::FeedError;
    use crate::service::testutil::*;

    #[tokio::test]
    async fn follow_unfollow_round_trip() {
        let (svc, _tmp) = memory_service();
        seed_user(&svc, "u1").await;
        seed_user(&svc, "u2").await;

        svc.follow("u1", "u2").await.unwrap();
        let u1 = get_user(&svc, "u1").await;
        let u2 = get_user(&svc, "u2").await;
        assert_eq!(u1.following, vec!["u2"]);
        assert_eq!(u2.followers, vec!["u1"]);
        assert!(u1.updated_at.is_some());

        svc.unfollow("u1", "u2").await.unwrap();
        let u1 = get_user(&svc, "u1").await;
        let u2 = get_user(&svc, "u2").await;
        assert!(u1.following.is_empty());
        assert!(u2.followers.is_empty());
    }

    #[tokio::test]
    async fn follow_missing_target_surfaces_failure() {
        let (svc, _tmp) = memory_service();
        seed_user(&svc, "u1").await;

        // One half fails (target absent), the other landed: partial failure,
        // and the succeeded half is not rolled back.
        let err = svc.follow("u1", "ghost").await.unwrap_err();
        assert!(matches!(err, FeedError::Partial { failed: 1, total: 2, .. }));
        let u1 = get_user(&svc, "u1").await;
        assert_eq!(u1.following, vec!["ghost"]);
    }

    #[tokio::test]
    async fn like_unlike_restores_both_documents() {
        let (svc, _tmp) = memory_service();
        seed_user(&svc, "u1").await;
        seed_tweet(&svc, "t1", "u2").await;

        svc.like("u1", "t1").await.unwrap();
        let tweet = get_tweet(&svc, "t1").await;
        assert_eq!(tweet.user_likes, vec!["u1"]);
        let stats_doc = svc.docs.get(&stats_key("u1")).await.unwrap().unwrap();
        let stats: UserStats = serde_json::from_value(stats_doc).unwrap();
        assert_eq!(stats.likes, vec!["t1"]);

        svc.unlike("u1", "t1").await.unwrap();
        let tweet = get_tweet(&svc, "t1").await;
        assert!(tweet.user_likes.is_empty());
        let stats_doc = svc.docs.get(&stats_key("u1")).await.unwrap().unwrap();
        let stats: UserStats = serde_json::from_value(stats_doc).unwrap();
        assert!(stats.likes.is_empty());
    }

    #[tokio::test]
    async fn duplicate_like_is_a_set_noop() {
        let (svc, _tmp) = memory_service();
        seed_user(&svc, "u1").await;
        seed_tweet(&svc, "t1", "u2").await;

        svc.like("u1", "t1").await.unwrap();
        svc.like("u1", "t1").await.unwrap();

        let tweet = get_tweet(&svc, "t1").await;
        assert_eq!(tweet.user_likes, vec!["u1"]);
    }

    #[tokio::test]
    async fn retweet_tracks_both_sides() {
        let (svc, _tmp) = memory_service();
        seed_user(&svc, "u1").await;
        seed_tweet(&svc, "t1", "u2").await;

        svc.retweet("u1", "t1").await.unwrap();
        let tweet = get_tweet(&svc, "t1").await;
        assert_eq!(tweet.user_retweets, vec!["u1"]);
        let stats_doc = svc.docs.get(&stats_key("u1")).await.unwrap().unwrap();
        let stats: UserStats = serde_json::from_value(stats_doc).unwrap();
        assert_eq!(stats.tweets, vec!["t1"]);

        svc.unretweet("u1", "t1").await.unwrap();
        let tweet = get_tweet(&svc, "t1").await;
        assert!(tweet.user_retweets.is_empty());
    }

    #[tokio::test]
    async fn bookmark_lifecycle_and_clear_all() {
        let (svc, _tmp) = memory_service();
        seed_tweet(&svc, "t1", "u2").await;
        seed_tweet(&svc, "t2", "u2").await;

        svc.bookmark("u1", "t1").await.unwrap();
        svc.bookmark("u1", "t2").await.unwrap();
        assert_eq!(svc.docs.scan(&bookmark_prefix("u1")).await.unwrap().len(), 2);

        svc.unbookmark("u1", "t1").await.unwrap();
        assert_eq!(svc.docs.scan(&bookmark_prefix("u1")).await.unwrap().len(), 1);

        // Clearing is per user; another user's bookmarks are untouched.
        svc.bookmark("u9", "t1").await.unwrap();
        svc.clear_bookmarks("u1").await.unwrap();
        assert!(svc.docs.scan(&bookmark_prefix("u1")).await.unwrap().is_empty());
        assert_eq!(svc.docs.scan(&bookmark_prefix("u9")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn pin_replaces_and_unpin_clears() {
        let (svc, _tmp) = memory_service();
        seed_user(&svc, "u1").await;

        svc.pin("u1", "t1").await.unwrap();
        assert_eq!(get_user(&svc, "u1").await.pinned_tweet.as_deref(), Some("t1"));

        svc.pin("u1", "t2").await.unwrap();
        assert_eq!(get_user(&svc, "u1").await.pinned_tweet.as_deref(), Some("t2"));

        svc.unpin("u1").await.unwrap();
        assert!(get_user(&svc, "u1").await.pinned_tweet.is_none());
    }

    #[tokio::test]
    async fn stats_document_is_created_lazily() {
        let (svc, _tmp) = memory_service();
        seed_tweet(&svc, "t1", "u2").await;

        assert!(svc.docs.get(&stats_key("u1")).await.unwrap().is_none());
        svc.like("u1", "t1").await.unwrap();
        assert!(svc.docs.get(&stats_key("u1")).await.unwrap().is_some());
    }
}
