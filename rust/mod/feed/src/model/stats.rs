use serde::{Deserialize, Serialize};

/// Per-user side record of tweet interactions. Exists 1:1 with a user but
/// is created lazily on the first stats write.
///
/// `tweets` holds ids the user authored or retweeted; `likes` holds ids the
/// user liked. Both mirror sets on the tweet documents themselves and are
/// kept consistent by paired fan-out writes, not by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    #[serde(default)]
    pub tweets: Vec<String>,

    #[serde(default)]
    pub likes: Vec<String>,

    #[serde(default)]
    pub updated_at: Option<String>,
}

impl UserStats {
    pub fn new() -> Self {
        Self {
            tweets: Vec::new(),
            likes: Vec::new(),
            updated_at: None,
        }
    }
}

impl Default for UserStats {
    fn default() -> Self {
        Self::new()
    }
}
