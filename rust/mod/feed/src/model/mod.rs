pub mod bookmark;
pub mod stats;
pub mod tweet;
pub mod user;

pub use bookmark::Bookmark;
pub use stats::UserStats;
pub use tweet::{ImageData, Tweet};
pub use user::User;
