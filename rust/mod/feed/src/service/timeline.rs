//! Feed assembly: merging independently-fetched result sets and the
//! profile read path built on top.

use std::collections::BTreeSet;

use futures::future::join_all;

use crate::keys::{TWEETS_PREFIX, stats_key, tweet_key};
use crate::model::{Tweet, UserStats};
use crate::service::{FeedError, FeedService};

/// Merge two independently-fetched, internally-sorted tweet sequences into
/// one deduplicated, newest-first timeline.
///
/// `None` on both sides means "no data yet" and propagates as `None` so the
/// caller can show a loading state instead of an empty feed. One missing
/// side is treated as empty. A tweet present in both sequences appears once,
/// keeping the `authored` copy. Ties on `createdAt` keep the concatenated
/// input order (authored before reposted; the sort is stable).
pub fn merge_feeds(
    authored: Option<Vec<Tweet>>,
    reposted: Option<Vec<Tweet>>,
) -> Option<Vec<Tweet>> {
    if authored.is_none() && reposted.is_none() {
        return None;
    }

    let mut merged = authored.unwrap_or_default();
    merged.extend(reposted.unwrap_or_default());

    let mut seen = BTreeSet::new();
    merged.retain(|tweet| seen.insert(tweet.id.clone()));

    merged.sort_by(|a, b| b.created_at.as_str().cmp(a.created_at.as_str()));
    Some(merged)
}

impl FeedService {
    /// Load one tweet.
    pub async fn get_tweet(&self, tweet_id: &str) -> Result<Tweet, FeedError> {
        let key = tweet_key(tweet_id);
        match self.docs.get(&key).await? {
            Some(doc) => Self::parse(&key, doc),
            None => Err(FeedError::NotFound(format!("tweet {tweet_id}"))),
        }
    }

    /// Root tweets authored by a user, newest first.
    pub async fn user_tweets(&self, user_id: &str) -> Result<Vec<Tweet>, FeedError> {
        let mut tweets = self.all_tweets().await?;
        tweets.retain(|t| t.created_by == user_id && t.parent.is_none());
        tweets.sort_by(|a, b| b.created_at.as_str().cmp(a.created_at.as_str()));
        Ok(tweets)
    }

    /// Tweets surfaced on a user's profile through their stats tweet set
    /// (retweets), newest first. Ids whose tweet has since been deleted are
    /// dropped silently.
    pub async fn user_retweets(&self, user_id: &str) -> Result<Vec<Tweet>, FeedError> {
        let key = stats_key(user_id);
        let stats: UserStats = match self.docs.get(&key).await? {
            Some(doc) => Self::parse(&key, doc)?,
            None => return Ok(Vec::new()),
        };

        let keys: Vec<String> = stats.tweets.iter().map(|id| tweet_key(id)).collect();
        let lookups = keys.iter().map(|key| self.docs.get(key));
        let mut tweets = Vec::new();
        for (key, doc) in keys.iter().zip(join_all(lookups).await) {
            if let Some(doc) = doc? {
                tweets.push(Self::parse::<Tweet>(key, doc)?);
            }
        }

        tweets.sort_by(|a, b| b.created_at.as_str().cmp(a.created_at.as_str()));
        Ok(tweets)
    }

    /// A user's profile timeline: authored tweets merged with retweets,
    /// deduplicated, newest first.
    pub async fn user_timeline(&self, user_id: &str) -> Result<Vec<Tweet>, FeedError> {
        let (authored, reposted) = tokio::join!(
            self.user_tweets(user_id),
            self.user_retweets(user_id),
        );
        Ok(merge_feeds(Some(authored?), Some(reposted?)).unwrap_or_default())
    }

    /// Replies to a tweet, oldest first.
    pub async fn tweet_replies(&self, tweet_id: &str) -> Result<Vec<Tweet>, FeedError> {
        let mut tweets = self.all_tweets().await?;
        tweets.retain(|t| t.parent.as_deref() == Some(tweet_id));
        tweets.sort_by(|a, b| a.created_at.as_str().cmp(b.created_at.as_str()));
        Ok(tweets)
    }

    async fn all_tweets(&self) -> Result<Vec<Tweet>, FeedError> {
        let entries = self.docs.scan(TWEETS_PREFIX).await?;
        entries
            .into_iter()
            .map(|(key, doc)| Self::parse(&key, doc))
            .collect()
    }
}
