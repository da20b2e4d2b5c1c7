use crate::error::AssetError;

/// Metadata for a stored asset.
#[derive(Debug, Clone)]
pub struct AssetMeta {
    pub key: String,
    pub size: u64,
}

/// AssetStore provides storage for uploaded binary assets (images, media
/// attachments) addressed by name, not by content hash.
///
/// Keys are path-like strings: `images/42/photo.png`. Uploading to an
/// existing key replaces the asset at the same locator — last writer for a
/// name wins. The default implementation (`FileStore`) maps keys to local
/// filesystem paths; can be swapped for S3/OSS backends by implementing
/// this trait.
#[async_trait::async_trait]
pub trait AssetStore: Send + Sync {
    /// Resolve the stable locator for a key, if the asset exists.
    ///
    /// The locator is whatever string clients can fetch the asset from
    /// (a URL, a path). Locators are stable: re-uploading the same key
    /// yields the same locator.
    async fn resolve(&self, key: &str) -> Result<Option<String>, AssetError>;

    /// Store an asset. Overwrites if the key already exists.
    async fn upload(&self, key: &str, payload: &[u8]) -> Result<(), AssetError>;

    /// Delete an asset. No-op if the key does not exist.
    async fn delete(&self, key: &str) -> Result<(), AssetError>;

    /// List assets matching a key prefix. Returns metadata sorted by key.
    async fn list(&self, prefix: &str) -> Result<Vec<AssetMeta>, AssetError>;
}
