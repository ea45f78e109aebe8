mod error;

pub mod filesystem;

pub use error::StorageError;
pub use filesystem::{StagedUpload, StoredUpload, UploadStore};
