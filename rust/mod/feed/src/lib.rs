//! Feed module — denormalized relationship and counter consistency over a
//! document store with single-document atomic writes.
//!
//! # Resources
//!
//! - **User** — identity with denormalized follow sets and counters
//! - **Tweet** — content with like/retweet sets and a reply counter
//! - **UserStats** — per-user interaction side record, created lazily
//! - **Bookmark** — per-user record keyed by tweet
//!
//! # Design
//!
//! The store offers per-document atomicity and nothing across documents.
//! Compound operations (follow, like, retweet, tweet deletion) fan out
//! several atomic writes concurrently and aggregate the outcomes; a failed
//! half is surfaced, never rolled back — every half is idempotent, so a
//! caller retry converges. The one deliberately suppressed failure is the
//! reply-counter decrement against a parent tweet that was concurrently
//! deleted.
//!
//! # Usage
//!
//! ```ignore
//! use chirp_feed::{FeedConfig, FeedService};
//!
//! let svc = FeedService::open(&service_config, FeedConfig::default())?;
//! svc.follow(&actor_id, &target_id).await?;
//! let timeline = svc.user_timeline(&actor_id).await?;
//! ```

pub mod keys;
pub mod model;
pub mod service;

pub use model::{Bookmark, ImageData, Tweet, User, UserStats};
pub use service::delete::DeleteTweet;
pub use service::timeline::merge_feeds;
pub use service::upload::UploadFile;
pub use service::{CounterOutcome, Direction, FeedConfig, FeedError, FeedService};
