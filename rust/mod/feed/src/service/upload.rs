//! Idempotent image uploads.
//!
//! Assets are addressed by `(owner, fileName)`, so re-submitting the same
//! attachment resolves the existing locator instead of transferring the
//! payload again. Two concurrent first uploads of the same name both
//! transfer; they land on the same key and the last writer wins, which is
//! acceptable because file names are client-generated per attachment.

use futures::future::join_all;
use tracing::debug;

use crate::keys::image_key;
use crate::model::ImageData;
use crate::service::{FeedError, FeedService};

/// One file handed to the upload path: the client-assigned id, the file
/// name, and the raw payload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub id: String,
    pub name: String,
    pub payload: Vec<u8>,
}

impl FeedService {
    /// Ensure a file is uploaded and return its locator triple.
    ///
    /// Resolve first; on a hit the payload is not transferred at all. On a
    /// miss, upload and resolve again.
    pub async fn ensure_uploaded(
        &self,
        owner_id: &str,
        file_id: &str,
        file_name: &str,
        payload: &[u8],
    ) -> Result<ImageData, FeedError> {
        let key = image_key(&self.config.image_prefix, owner_id, file_name);

        if let Some(src) = self.assets.resolve(&key).await? {
            debug!(%key, "asset already uploaded, reusing locator");
            return Ok(ImageData {
                id: file_id.to_string(),
                src,
                alt: file_name.to_string(),
            });
        }

        self.assets.upload(&key, payload).await?;
        match self.assets.resolve(&key).await? {
            Some(src) => Ok(ImageData {
                id: file_id.to_string(),
                src,
                alt: file_name.to_string(),
            }),
            None => Err(FeedError::Internal(format!(
                "uploaded asset did not resolve: {key}"
            ))),
        }
    }

    /// Upload a batch of attachments concurrently.
    ///
    /// Returns `None` for an empty batch, mirroring "nothing attached" for
    /// callers that distinguish it from an empty preview list.
    pub async fn upload_images(
        &self,
        owner_id: &str,
        files: &[UploadFile],
    ) -> Result<Option<Vec<ImageData>>, FeedError> {
        if files.is_empty() {
            return Ok(None);
        }

        let uploads = files
            .iter()
            .map(|f| self.ensure_uploaded(owner_id, &f.id, &f.name, &f.payload));
        let previews: Result<Vec<ImageData>, FeedError> =
            join_all(uploads).await.into_iter().collect();

        previews.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::UploadFile;
    use crate::keys::image_key;
    use crate::service::testutil::*;

    #[tokio::test]
    async fn second_upload_of_same_name_reuses_locator() {
        let (svc, _tmp) = memory_service();

        let first = svc
            .ensure_uploaded("u1", "f1", "photo.png", b"original")
            .await
            .unwrap();
        // Different payload, same name: the existing asset wins and no new
        // transfer happens.
        let second = svc
            .ensure_uploaded("u1", "f1", "photo.png", b"replacement")
            .await
            .unwrap();

        assert_eq!(first.src, second.src);
        assert_eq!(std::fs::read(&second.src).unwrap(), b"original");
    }

    #[tokio::test]
    async fn same_name_different_owner_is_a_different_asset() {
        let (svc, _tmp) = memory_service();

        let a = svc.ensure_uploaded("u1", "f1", "photo.png", b"a").await.unwrap();
        let b = svc.ensure_uploaded("u2", "f1", "photo.png", b"b").await.unwrap();
        assert_ne!(a.src, b.src);
    }

    #[tokio::test]
    async fn concurrent_uploads_converge_on_one_locator() {
        let (svc, _tmp) = memory_service();

        // Both callers may observe a miss and both may upload; either way
        // each receives a valid locator for the same key afterward.
        let (a, b) = tokio::join!(
            svc.ensure_uploaded("u1", "f1", "photo.png", b"one"),
            svc.ensure_uploaded("u1", "f2", "photo.png", b"two"),
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.src, b.src);
        assert!(std::fs::metadata(&a.src).is_ok());
    }

    #[tokio::test]
    async fn empty_batch_is_none() {
        let (svc, _tmp) = memory_service();
        assert!(svc.upload_images("u1", &[]).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn batch_uploads_every_file() {
        let (svc, _tmp) = memory_service();

        let files = vec![
            UploadFile { id: "f1".into(), name: "a.png".into(), payload: b"a".to_vec() },
            UploadFile { id: "f2".into(), name: "b.png".into(), payload: b"bb".to_vec() },
        ];
        let previews = svc.upload_images("u1", &files).await.unwrap().unwrap();

        assert_eq!(previews.len(), 2);
        assert_eq!(previews[0].id, "f1");
        assert_eq!(previews[0].alt, "a.png");
        assert!(previews[0].src.ends_with(&image_key("images", "u1", "a.png")));
    }
}
