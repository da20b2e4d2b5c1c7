//! Asset storage abstraction for uploaded media.
//!
//! Assets are addressed by name (`images/{userId}/{fileName}`), not by
//! content hash: re-uploading the same name replaces the asset at the same
//! locator. This is the idempotency contract the upload deduplication path
//! relies on.

pub mod error;
pub mod file;
pub mod traits;

pub use error::AssetError;
pub use file::FileStore;
pub use traits::{AssetMeta, AssetStore};
