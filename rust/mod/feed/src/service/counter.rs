//! Denormalized counter adjustments.
//!
//! Counters are plain integer fields bumped with the store's atomic
//! increment. No floor is enforced: racing decrements can take a counter
//! negative, and that is left standing rather than corrected.

use tracing::debug;

use chirp_doc::{DocError, FieldOp};

use crate::keys::{fields, tweet_key, user_key};
use crate::service::{CounterOutcome, Direction, FeedError, FeedService};

impl FeedService {
    /// Adjust a user's authored-tweet counter by ±1.
    pub async fn adjust_total_tweets(
        &self,
        direction: Direction,
        user_id: &str,
    ) -> Result<(), FeedError> {
        self.adjust_user_counter(fields::TOTAL_TWEETS, direction, user_id)
            .await
    }

    /// Adjust a user's uploaded-photo counter by ±1.
    pub async fn adjust_total_photos(
        &self,
        direction: Direction,
        user_id: &str,
    ) -> Result<(), FeedError> {
        self.adjust_user_counter(fields::TOTAL_PHOTOS, direction, user_id)
            .await
    }

    async fn adjust_user_counter(
        &self,
        field: &str,
        direction: Direction,
        user_id: &str,
    ) -> Result<(), FeedError> {
        self.docs
            .apply(
                &user_key(user_id),
                vec![
                    FieldOp::Increment(field.to_string(), direction.delta()),
                    Self::touch(),
                ],
            )
            .await?;
        Ok(())
    }

    /// Adjust a tweet's reply counter by ±1.
    ///
    /// This is the single counter path that tolerates a missing target:
    /// decrementing after the parent tweet was concurrently deleted is an
    /// expected race, reported as [`CounterOutcome::ParentMissing`] rather
    /// than an error. Any other failure still propagates.
    pub async fn adjust_reply_count(
        &self,
        direction: Direction,
        tweet_id: &str,
    ) -> Result<CounterOutcome, FeedError> {
        let outcome = self
            .docs
            .apply(
                &tweet_key(tweet_id),
                vec![
                    FieldOp::Increment(fields::USER_REPLIES.to_string(), direction.delta()),
                    Self::touch(),
                ],
            )
            .await;

        match outcome {
            Ok(()) => Ok(CounterOutcome::Applied),
            Err(DocError::NotFound(_)) => {
                debug!(tweet_id, "reply counter target already deleted");
                Ok(CounterOutcome::ParentMissing)
            }
            Err(e) => Err(e.into()),
        }
    }
}
