use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::AssetError;
use crate::traits::{AssetMeta, AssetStore};

/// FileStore is an AssetStore implementation backed by the local filesystem.
///
/// Keys are mapped to paths under `base_dir`:
///   key "images/42/photo.png" → `{base_dir}/images/42/photo.png`
///
/// The locator for a stored asset is its absolute path as a string. Parent
/// directories are created automatically on `upload`.
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Create a new FileStore rooted at `base_dir`.
    /// The directory is created if it doesn't exist.
    pub fn open(base_dir: &Path) -> Result<Self, AssetError> {
        fs::create_dir_all(base_dir).map_err(|e| AssetError::Io(e.to_string()))?;
        Ok(Self {
            base_dir: base_dir.to_path_buf(),
        })
    }

    /// Resolve a key to a filesystem path. Rejects keys that escape base_dir.
    fn path_for(&self, key: &str) -> Result<PathBuf, AssetError> {
        if key.is_empty() {
            return Err(AssetError::Io("empty asset key".into()));
        }

        let rel = Path::new(key);
        for component in rel.components() {
            match component {
                Component::Normal(_) => {}
                // `..`, leading `/`, `.` and drive prefixes all escape or
                // alias paths under base_dir.
                _ => {
                    return Err(AssetError::Io(format!("invalid asset key: {key:?}")));
                }
            }
        }

        Ok(self.base_dir.join(rel))
    }
}

#[async_trait::async_trait]
impl AssetStore for FileStore {
    async fn resolve(&self, key: &str) -> Result<Option<String>, AssetError> {
        let path = self.path_for(key)?;
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(path.to_string_lossy().into_owned()))
    }

    async fn upload(&self, key: &str, payload: &[u8]) -> Result<(), AssetError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| AssetError::Io(e.to_string()))?;
        }
        fs::write(&path, payload).map_err(|e| AssetError::Io(e.to_string()))?;
        debug!(key, size = payload.len(), "asset written");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), AssetError> {
        let path = self.path_for(key)?;
        if path.is_file() {
            fs::remove_file(&path).map_err(|e| AssetError::Io(e.to_string()))?;
        }
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<AssetMeta>, AssetError> {
        let mut results = Vec::new();
        walk_dir(&self.base_dir, &self.base_dir, prefix, &mut results)?;
        results.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(results)
    }
}

/// Recursively walk a directory, collecting assets whose keys match prefix.
fn walk_dir(
    base_dir: &Path,
    dir: &Path,
    prefix: &str,
    results: &mut Vec<AssetMeta>,
) -> Result<(), AssetError> {
    if !dir.is_dir() {
        return Ok(());
    }

    let entries = fs::read_dir(dir).map_err(|e| AssetError::Io(e.to_string()))?;
    for entry in entries {
        let entry = entry.map_err(|e| AssetError::Io(e.to_string()))?;
        let path = entry.path();

        if path.is_dir() {
            walk_dir(base_dir, &path, prefix, results)?;
        } else if path.is_file() {
            // Convert path back to key (relative to base_dir).
            if let Ok(rel) = path.strip_prefix(base_dir) {
                let key = rel.to_string_lossy().to_string();
                if key.starts_with(prefix) {
                    let meta = entry.metadata().map_err(|e| AssetError::Io(e.to_string()))?;
                    results.push(AssetMeta {
                        key,
                        size: meta.len(),
                    });
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> (FileStore, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        (FileStore::open(tmp.path()).unwrap(), tmp)
    }

    #[tokio::test]
    async fn resolve_misses_then_hits_after_upload() {
        let (store, _tmp) = test_store();

        assert!(store.resolve("images/u1/photo.png").await.unwrap().is_none());

        store.upload("images/u1/photo.png", b"png-bytes").await.unwrap();
        let locator = store.resolve("images/u1/photo.png").await.unwrap().unwrap();
        assert!(locator.ends_with("images/u1/photo.png"));
    }

    #[tokio::test]
    async fn locator_is_stable_across_overwrites() {
        let (store, _tmp) = test_store();

        store.upload("images/u1/a.png", b"one").await.unwrap();
        let first = store.resolve("images/u1/a.png").await.unwrap().unwrap();

        store.upload("images/u1/a.png", b"two").await.unwrap();
        let second = store.resolve("images/u1/a.png").await.unwrap().unwrap();

        assert_eq!(first, second);
        assert_eq!(fs::read(&second).unwrap(), b"two");
    }

    #[tokio::test]
    async fn rejects_traversal_keys() {
        let (store, _tmp) = test_store();
        assert!(store.upload("../escape.png", b"x").await.is_err());
        assert!(store.upload("/abs.png", b"x").await.is_err());
        assert!(store.resolve("a/../../b").await.is_err());
    }

    #[tokio::test]
    async fn list_by_prefix() {
        let (store, _tmp) = test_store();
        store.upload("images/u1/a.png", b"a").await.unwrap();
        store.upload("images/u1/b.png", b"bb").await.unwrap();
        store.upload("images/u2/c.png", b"ccc").await.unwrap();

        let assets = store.list("images/u1/").await.unwrap();
        let keys: Vec<&str> = assets.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, vec!["images/u1/a.png", "images/u1/b.png"]);
        assert_eq!(assets[1].size, 2);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (store, _tmp) = test_store();
        store.upload("images/u1/a.png", b"a").await.unwrap();
        store.delete("images/u1/a.png").await.unwrap();
        store.delete("images/u1/a.png").await.unwrap();
        assert!(store.resolve("images/u1/a.png").await.unwrap().is_none());
    }
}
