//! In-memory stand-ins for the hosted backend, shared by the tests of this
//! crate and of the client.

use std::cell::RefCell;

use crate::asset::{Asset, AssetSet};
use crate::auth::{Identity, Session};
use crate::backend::{BackendError, BlobStore, RecordStore};
use crate::record::{AppListing, AppRecord, Direction, Query};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Query(Query),
    Upload(String, String),
    Insert(String),
}

pub fn public_url(bucket: &str, path: &str) -> String {
    format!("https://cdn.test/{}/{}", bucket, path)
}

/// Records every call, keeps what was stored, and fails on request.
#[derive(Default)]
pub struct FakeBackend {
    calls: RefCell<Vec<Call>>,
    stored: RefCell<Vec<(String, String)>>,
    inserted: RefCell<Vec<AppRecord>>,
    listings: RefCell<Vec<AppListing>>,
    fail_upload: RefCell<Option<String>>,
    fail_insert: RefCell<Option<BackendError>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        FakeBackend::default()
    }

    pub fn with_listings(listings: Vec<AppListing>) -> Self {
        let backend = FakeBackend::new();
        *backend.listings.borrow_mut() = listings;
        backend
    }

    /// Rejects every upload whose path contains `needle`.
    pub fn fail_uploads_matching(&self, needle: &str) {
        *self.fail_upload.borrow_mut() = Some(needle.to_string());
    }

    pub fn fail_inserts(&self, err: BackendError) {
        *self.fail_insert.borrow_mut() = Some(err);
    }

    pub fn stop_failing(&self) {
        *self.fail_upload.borrow_mut() = None;
        *self.fail_insert.borrow_mut() = None;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Every attempted upload as `(bucket, path)`, failed ones included.
    pub fn uploads(&self) -> Vec<(String, String)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match *call {
                Call::Upload(ref bucket, ref path) => Some((bucket.clone(), path.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn stored(&self) -> Vec<(String, String)> {
        self.stored.borrow().clone()
    }

    pub fn inserted(&self) -> Vec<AppRecord> {
        self.inserted.borrow().clone()
    }
}

impl BlobStore for FakeBackend {
    fn upload(&self, bucket: &str, path: &str, _asset: &Asset) -> Result<(), BackendError> {
        self.calls
            .borrow_mut()
            .push(Call::Upload(bucket.to_string(), path.to_string()));
        if let Some(ref needle) = *self.fail_upload.borrow() {
            if path.contains(needle.as_str()) {
                return Err(BackendError::Rejected(400, format!("upload of {} refused", path)));
            }
        }
        self.stored
            .borrow_mut()
            .push((bucket.to_string(), path.to_string()));
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        public_url(bucket, path)
    }
}

impl RecordStore for FakeBackend {
    fn query_apps(&self, query: &Query) -> Result<Vec<AppListing>, BackendError> {
        self.calls.borrow_mut().push(Call::Query(query.clone()));
        let mut found: Vec<AppListing> = self
            .listings
            .borrow()
            .iter()
            .filter(|listing| {
                query
                    .filters
                    .iter()
                    .all(|&(ref field, ref value)| field_value(listing, field) == *value)
            })
            .cloned()
            .collect();
        if let Some((ref field, direction)) = query.order {
            found.sort_by(|a, b| {
                let ordering = compare_field(a, b, field);
                match direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
        }
        if let Some(limit) = query.limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    fn insert_app(&self, record: &AppRecord) -> Result<(), BackendError> {
        self.calls.borrow_mut().push(Call::Insert(record.id.clone()));
        if let Some(ref err) = *self.fail_insert.borrow() {
            return Err(err.clone());
        }
        self.inserted.borrow_mut().push(record.clone());
        Ok(())
    }
}

fn field_value(listing: &AppListing, field: &str) -> String {
    match field {
        "id" => listing.record.id.clone(),
        "category" => listing.record.category.clone(),
        "developer_id" => listing.record.developer_id.clone(),
        "name" => listing.record.name.clone(),
        _ => String::new(),
    }
}

fn compare_field(a: &AppListing, b: &AppListing, field: &str) -> std::cmp::Ordering {
    match field {
        "downloads" => a.downloads.cmp(&b.downloads),
        "rating" => a
            .rating
            .partial_cmp(&b.rating)
            .unwrap_or(std::cmp::Ordering::Equal),
        "created_at" => a.created_at.cmp(&b.created_at),
        _ => field_value(a, field).cmp(&field_value(b, field)),
    }
}

pub fn signed_in(id: &str) -> Session {
    Session::with_identity(Some(Identity::new(id)))
}

pub fn apk(name: &str) -> Asset {
    Asset::new(name, b"PK\x03\x04".to_vec())
}

pub fn png(name: &str) -> Asset {
    Asset::new(name, b"\x89PNG\r\n".to_vec())
}

/// A complete submission: `demo.apk`, `icon.png` and `screenshots` PNGs.
pub fn full_assets(screenshots: usize) -> AssetSet {
    let mut assets = AssetSet::new();
    assets
        .select_package(apk("demo.apk"))
        .expect("apk accepted");
    assets.select_icon(png("icon.png")).expect("icon accepted");
    assets.add_screenshots((1..=screenshots).map(|i| png(&format!("shot{}.png", i))));
    assets
}

pub fn listing(id: &str, name: &str, category: &str, downloads: u64, rating: f32) -> AppListing {
    AppListing {
        record: AppRecord {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            developer_name: format!("{} Labs", name),
            ..AppRecord::default()
        },
        downloads,
        rating,
        size_bytes: None,
        created_at: None,
    }
}
