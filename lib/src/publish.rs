//! The app publishing workflow.
//!
//! A submission is checked locally (package, icon, at least one screenshot,
//! a signed in user) and then pushed through a fixed list of steps: pick a
//! fresh id, upload the APK, upload the icon, upload the screenshots one by
//! one, resolve public URLs, insert the record. The first failing step ends
//! the attempt. Blobs stored by earlier steps are left where they are, and a
//! retry starts over with a new id.

use std::fmt;

use chrono::Utc;
use data_encoding::HEXLOWER;
use rand::prelude::random;

use crate::asset::{Asset, AssetSet};
use crate::auth::{Identity, IdentityProvider};
use crate::backend::{BackendError, BlobStore, Buckets, RecordStore};
use crate::draft::{Draft, FormFields, Scratch};
use crate::error::Error;
use crate::progress::{Progress, ProgressSink};
use crate::record::AppRecord;

pub const GENERIC_FAILURE: &str = "Error uploading app. Please try again.";

quick_error! {
    #[derive(Debug)]
    pub enum PublishError {
        MissingPackage {
            display("Please upload an APK file")
        }
        MissingIcon {
            display("Please upload an app icon")
        }
        MissingScreenshots {
            display("Please upload at least one screenshot")
        }
        Step(step: Step, err: BackendError) {
            cause(err)
            display("Error {}: {}", step, err)
        }
        Unexpected(err: String) {
            display("{}", GENERIC_FAILURE)
        }
        Draft(err: Error) {
            cause(err)
            display("Unable to save your draft, nothing was uploaded: {}", err)
            from()
        }
    }
}

impl PublishError {
    pub fn is_validation(&self) -> bool {
        match *self {
            PublishError::MissingPackage
            | PublishError::MissingIcon
            | PublishError::MissingScreenshots => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Published(String),
    /// No signed in user. The draft was saved and the caller should send
    /// the user to log in, then run the workflow again.
    AuthenticationRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    GenerateId,
    UploadPackage,
    UploadIcon,
    UploadScreenshots,
    ResolveUrls,
    InsertRecord,
}

pub const STEPS: [Step; 6] = [
    Step::GenerateId,
    Step::UploadPackage,
    Step::UploadIcon,
    Step::UploadScreenshots,
    Step::ResolveUrls,
    Step::InsertRecord,
];

impl Step {
    pub fn label(self) -> &'static str {
        match self {
            Step::GenerateId => "Preparing upload",
            Step::UploadPackage => "Uploading APK",
            Step::UploadIcon => "Uploading icon",
            Step::UploadScreenshots => "Uploading screenshots",
            Step::ResolveUrls => "Resolving public URLs",
            Step::InsertRecord => "Creating app record",
        }
    }

    fn percent_on_start(self) -> Option<u8> {
        match self {
            Step::InsertRecord => Some(80),
            _ => None,
        }
    }

    fn percent_on_finish(self) -> Option<u8> {
        match self {
            Step::UploadPackage => Some(20),
            Step::UploadIcon => Some(40),
            Step::UploadScreenshots => Some(60),
            Step::InsertRecord => Some(100),
            _ => None,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match *self {
            Step::GenerateId => "generating app id",
            Step::UploadPackage => "uploading APK",
            Step::UploadIcon => "uploading icon",
            Step::UploadScreenshots => "uploading screenshots",
            Step::ResolveUrls => "resolving public URLs",
            Step::InsertRecord => "creating app record",
        };
        write!(f, "{}", text)
    }
}

/// A random version 4 UUID in its usual text form.
pub fn generate_app_id() -> String {
    let mut bytes = random::<[u8; 16]>();
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    let hex = HEXLOWER.encode(&bytes);
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

/// Lower-cases a file name and turns every run of whitespace into one `-`.
pub fn normalize_file_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

fn extension_or_png(asset: &Asset) -> String {
    asset.extension().unwrap_or_else(|| "png".to_string())
}

pub fn package_path(app_id: &str, package: &Asset) -> String {
    format!("{}/{}", app_id, normalize_file_name(&package.file_name))
}

pub fn icon_path(app_id: &str, icon: &Asset, millis: i64) -> String {
    format!("{}/icon-{}.{}", app_id, millis, extension_or_png(icon))
}

pub fn screenshot_path(app_id: &str, index: usize, screenshot: &Asset) -> String {
    format!("{}/screenshot-{}.{}", app_id, index, extension_or_png(screenshot))
}

/// Inputs that passed the local checks.
struct Submission<'s> {
    form: &'s FormFields,
    package: &'s Asset,
    icon: &'s Asset,
    screenshots: &'s [Asset],
    identity: Identity,
}

/// What the steps have produced so far in one attempt.
#[derive(Default)]
struct Attempt {
    app_id: String,
    package_path: String,
    icon_path: String,
    screenshot_paths: Vec<String>,
    apk_file_url: String,
    icon_url: String,
    screenshot_urls: Vec<String>,
}

pub struct Publisher<'a> {
    records: &'a dyn RecordStore,
    blobs: &'a dyn BlobStore,
    identity: &'a dyn IdentityProvider,
    scratch: &'a dyn Scratch,
    buckets: Buckets,
}

impl<'a> Publisher<'a> {
    pub fn new(
        records: &'a dyn RecordStore,
        blobs: &'a dyn BlobStore,
        identity: &'a dyn IdentityProvider,
        scratch: &'a dyn Scratch,
    ) -> Self {
        Publisher {
            records,
            blobs,
            identity,
            scratch,
            buckets: Buckets::default(),
        }
    }

    pub fn with_buckets(self, buckets: Buckets) -> Self {
        Publisher { buckets, ..self }
    }

    /// Runs one submission attempt. Every state change is reported to
    /// `sink`; a failure is reported there as well as returned.
    pub fn publish(
        &self,
        form: &FormFields,
        assets: &AssetSet,
        sink: &mut dyn ProgressSink,
    ) -> Result<Outcome, PublishError> {
        let mut progress = Progress::default();
        match self.attempt(form, assets, &mut progress, sink) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                warn!(error = %err, step = %progress.step, "publish.failed");
                progress.error = Some(err.to_string());
                sink.report(&progress);
                Err(err)
            }
        }
    }

    fn attempt(
        &self,
        form: &FormFields,
        assets: &AssetSet,
        progress: &mut Progress,
        sink: &mut dyn ProgressSink,
    ) -> Result<Outcome, PublishError> {
        let package = assets.package().ok_or(PublishError::MissingPackage)?;
        let icon = assets.icon().ok_or(PublishError::MissingIcon)?;
        if assets.screenshots().is_empty() {
            return Err(PublishError::MissingScreenshots);
        }
        let identity = match self.identity.current() {
            Some(identity) => identity,
            None => {
                info!("publish.suspended: not signed in");
                self.scratch.save(&Draft::capture(form, assets))?;
                return Ok(Outcome::AuthenticationRequired);
            }
        };

        let submission = Submission {
            form,
            package,
            icon,
            screenshots: assets.screenshots(),
            identity,
        };
        let mut attempt = Attempt::default();
        for &step in STEPS.iter() {
            progress.step = step.label().to_string();
            if let Some(percent) = step.percent_on_start() {
                progress.percent = percent;
            }
            sink.report(progress);
            debug!(step = ?step, "publish.step.start");
            self.run_step(step, &submission, &mut attempt)
                .map_err(|err| match err {
                    BackendError::Unexpected(message) => PublishError::Unexpected(message),
                    err => PublishError::Step(step, err),
                })?;
            if let Some(percent) = step.percent_on_finish() {
                progress.percent = percent;
                sink.report(progress);
            }
            debug!(step = ?step, percent = progress.percent, "publish.step.done");
        }

        info!(app_id = %attempt.app_id, "publish.done");
        progress.step = "Published".to_string();
        progress.record_id = Some(attempt.app_id.clone());
        sink.report(progress);
        Ok(Outcome::Published(attempt.app_id))
    }

    fn run_step(
        &self,
        step: Step,
        submission: &Submission<'_>,
        attempt: &mut Attempt,
    ) -> Result<(), BackendError> {
        match step {
            Step::GenerateId => {
                attempt.app_id = generate_app_id();
            }
            Step::UploadPackage => {
                let path = package_path(&attempt.app_id, submission.package);
                self.blobs
                    .upload(&self.buckets.files, &path, submission.package)?;
                attempt.package_path = path;
            }
            Step::UploadIcon => {
                let path = icon_path(
                    &attempt.app_id,
                    submission.icon,
                    Utc::now().timestamp_millis(),
                );
                self.blobs.upload(&self.buckets.images, &path, submission.icon)?;
                attempt.icon_path = path;
            }
            Step::UploadScreenshots => {
                for (offset, screenshot) in submission.screenshots.iter().enumerate() {
                    let path = screenshot_path(&attempt.app_id, offset + 1, screenshot);
                    self.blobs.upload(&self.buckets.images, &path, screenshot)?;
                    attempt.screenshot_paths.push(path);
                }
            }
            Step::ResolveUrls => {
                attempt.apk_file_url = self
                    .blobs
                    .public_url(&self.buckets.files, &attempt.package_path);
                attempt.icon_url = self.blobs.public_url(&self.buckets.images, &attempt.icon_path);
                attempt.screenshot_urls = attempt
                    .screenshot_paths
                    .iter()
                    .map(|path| self.blobs.public_url(&self.buckets.images, path))
                    .collect();
            }
            Step::InsertRecord => {
                self.records.insert_app(&build_record(submission, attempt))?;
            }
        }
        Ok(())
    }
}

fn build_record(submission: &Submission<'_>, attempt: &Attempt) -> AppRecord {
    let form = submission.form;
    let website = form.website.trim();
    AppRecord {
        id: attempt.app_id.clone(),
        name: form.app_name.clone(),
        description: form.description.clone(),
        category: form.category.clone(),
        version: form.version.clone(),
        developer_id: submission.identity.id.clone(),
        apk_file_url: attempt.apk_file_url.clone(),
        icon_url: attempt.icon_url.clone(),
        banner_url: attempt.screenshot_urls.first().cloned().unwrap_or_default(),
        screenshot_urls: attempt.screenshot_urls.clone(),
        developer_name: form.developer_name.clone(),
        developer_email: form.email.clone(),
        website: if website.is_empty() {
            None
        } else {
            Some(website.to_string())
        },
        min_android_version: form.min_android_version.clone(),
        features: form.feature_list(),
        whats_new: form.whats_new.clone(),
    }
}
