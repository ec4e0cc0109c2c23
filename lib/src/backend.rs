//! The hosted backend, seen as the handful of capabilities the storefront
//! consumes. Implementations live outside this crate (the HTTP client) or in
//! `test_helpers` (in-memory fakes).

use crate::asset::Asset;
use crate::record::{AppListing, AppRecord, Query};

quick_error! {
    #[derive(Debug, Clone, PartialEq)]
    pub enum BackendError {
        Rejected(status: u16, message: String) {
            display("{} (status {})", message, status)
        }
        Transport(message: String) {
            display("{}", message)
        }
        Decode(message: String) {
            display("malformed response: {}", message)
        }
        Unexpected(message: String) {
            display("{}", message)
        }
    }
}

pub trait RecordStore {
    fn query_apps(&self, query: &Query) -> Result<Vec<AppListing>, BackendError>;

    fn insert_app(&self, record: &AppRecord) -> Result<(), BackendError>;
}

pub trait BlobStore {
    /// Stores `asset` at `path`. Paths are chosen by the caller and must be
    /// unique, the store does not guard against overwrites.
    fn upload(&self, bucket: &str, path: &str, asset: &Asset) -> Result<(), BackendError>;

    /// Derives the public URL of a stored blob. Never touches the network.
    fn public_url(&self, bucket: &str, path: &str) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buckets {
    pub files: String,
    pub images: String,
}

impl Default for Buckets {
    fn default() -> Self {
        Buckets {
            files: "apk-files".to_string(),
            images: "app-images".to_string(),
        }
    }
}
