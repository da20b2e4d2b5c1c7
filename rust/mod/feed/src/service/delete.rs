//! Tweet deletion and its cascading side effects.

use tracing::{debug, warn};

use crate::keys::tweet_key;
use crate::service::{CounterOutcome, Direction, FeedError, FeedService};

/// Everything `delete_tweet` needs to know about the tweet being removed.
/// Passed explicitly by the caller (who already has the tweet rendered);
/// the delete path does not re-read the document.
#[derive(Debug, Clone)]
pub struct DeleteTweet {
    /// Id of the tweet to delete.
    pub tweet_id: String,

    /// Id of the tweet's author, whose counters are decremented. Admins may
    /// delete other users' tweets, so this is not necessarily the actor.
    pub owner_id: String,

    /// Whether the tweet carried image attachments.
    pub has_images: bool,

    /// Parent tweet id when deleting a reply.
    pub parent_id: Option<String>,
}

impl FeedService {
    /// Delete a tweet and fan out the bookkeeping.
    ///
    /// The primary document delete must succeed; the side effects (owner
    /// tweet counter, owner photo counter when images were attached, parent
    /// reply counter for replies) then fire concurrently. A parent that is
    /// already gone is an expected race and is discarded; any other
    /// side-effect failure surfaces as an aggregate error, without undoing
    /// the delete. Replies of the deleted tweet are left orphaned.
    pub async fn delete_tweet(&self, req: DeleteTweet) -> Result<(), FeedError> {
        self.docs.delete(&tweet_key(&req.tweet_id)).await?;
        debug!(tweet_id = %req.tweet_id, "tweet deleted, fanning out side effects");

        let tweets = self.adjust_total_tweets(Direction::Decrement, &req.owner_id);
        let photos = async {
            if req.has_images {
                self.adjust_total_photos(Direction::Decrement, &req.owner_id).await
            } else {
                Ok(())
            }
        };
        let replies = async {
            match &req.parent_id {
                Some(parent_id) => {
                    match self.adjust_reply_count(Direction::Decrement, parent_id).await? {
                        CounterOutcome::ParentMissing => {
                            debug!(parent_id, "parent already deleted, reply count untouched");
                        }
                        CounterOutcome::Applied => {}
                    }
                    Ok(())
                }
                None => Ok(()),
            }
        };

        let (tweets, photos, replies) = tokio::join!(tweets, photos, replies);

        // Only side effects that actually fired count toward the total.
        let mut outcomes: Vec<(&str, Result<(), FeedError>)> =
            vec![("owner.totalTweets", tweets)];
        if req.has_images {
            outcomes.push(("owner.totalPhotos", photos));
        }
        if req.parent_id.is_some() {
            outcomes.push(("parent.userReplies", replies));
        }

        let total = outcomes.len();
        let mut failures: Vec<(&str, FeedError)> = Vec::new();
        for (name, outcome) in outcomes {
            if let Err(e) = outcome {
                failures.push((name, e));
            }
        }

        if failures.is_empty() {
            return Ok(());
        }

        let failed = failures.len();
        let detail = failures
            .iter()
            .map(|(name, e)| format!("{name}: {e}"))
            .collect::<Vec<_>>()
            .join("; ");
        warn!(
            tweet_id = %req.tweet_id,
            failed,
            total,
            %detail,
            "tweet deleted but side effects failed, no rollback"
        );
        Err(FeedError::Partial {
            failed,
            total,
            detail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::DeleteTweet;
    use crate::keys::tweet_key;
    use crate::service::testutil::*;
    use crate::service::{Direction, FeedError};

    fn req(tweet_id: &str, owner_id: &str) -> DeleteTweet {
        DeleteTweet {
            tweet_id: tweet_id.to_string(),
            owner_id: owner_id.to_string(),
            has_images: false,
            parent_id: None,
        }
    }

    #[tokio::test]
    async fn delete_decrements_owner_counter() {
        let (svc, _tmp) = memory_service();
        seed_user(&svc, "u1").await;
        seed_tweet(&svc, "t1", "u1").await;
        svc.adjust_total_tweets(Direction::Increment, "u1").await.unwrap();

        svc.delete_tweet(req("t1", "u1")).await.unwrap();

        assert!(svc.docs.get(&tweet_key("t1")).await.unwrap().is_none());
        assert_eq!(get_user(&svc, "u1").await.total_tweets, 0);
    }

    #[tokio::test]
    async fn delete_with_images_also_decrements_photos() {
        let (svc, _tmp) = memory_service();
        seed_user(&svc, "u1").await;
        seed_tweet(&svc, "t1", "u1").await;

        let mut request = req("t1", "u1");
        request.has_images = true;
        svc.delete_tweet(request).await.unwrap();

        let user = get_user(&svc, "u1").await;
        assert_eq!(user.total_tweets, -1);
        assert_eq!(user.total_photos, -1);
    }

    #[tokio::test]
    async fn reply_delete_decrements_parent_reply_count() {
        let (svc, _tmp) = memory_service();
        seed_user(&svc, "u1").await;
        seed_tweet(&svc, "parent", "u2").await;
        seed_tweet(&svc, "reply", "u1").await;

        let mut request = req("reply", "u1");
        request.parent_id = Some("parent".to_string());
        svc.delete_tweet(request).await.unwrap();

        assert_eq!(get_tweet(&svc, "parent").await.user_replies, -1);
    }

    #[tokio::test]
    async fn missing_parent_does_not_raise() {
        let (svc, _tmp) = memory_service();
        seed_user(&svc, "u1").await;
        seed_tweet(&svc, "reply", "u1").await;

        let mut request = req("reply", "u1");
        request.parent_id = Some("already-gone".to_string());
        // The suppressed NotFound path: deletion completes cleanly.
        svc.delete_tweet(request).await.unwrap();
    }

    #[tokio::test]
    async fn failing_owner_counter_does_raise() {
        let (svc, _tmp) = memory_service();
        seed_tweet(&svc, "t1", "ghost").await;

        // Owner document is missing, so the counter decrement fails — and
        // unlike the parent reply counter, that failure surfaces. No images
        // and no parent means only one side effect was attempted, and the
        // totals say so.
        let err = svc.delete_tweet(req("t1", "ghost")).await.unwrap_err();
        assert!(matches!(err, FeedError::Partial { failed: 1, total: 1, .. }));

        // The primary delete is not rolled back.
        assert!(svc.docs.get(&tweet_key("t1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleting_a_missing_tweet_is_a_noop_delete() {
        let (svc, _tmp) = memory_service();
        seed_user(&svc, "u1").await;

        // Document deletes are idempotent; side effects still run.
        svc.delete_tweet(req("never-existed", "u1")).await.unwrap();
        assert_eq!(get_user(&svc, "u1").await.total_tweets, -1);
    }
}
