use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use glob::glob;

use apkshelf_lib::asset::{Asset, AssetSet, MAX_SCREENSHOTS};
use apkshelf_lib::catalog::{is_known_category, ANDROID_VERSIONS};
use apkshelf_lib::draft::{Draft, FileScratch, FormFields, Scratch};
use apkshelf_lib::progress::ProgressSink;
use apkshelf_lib::publish::{Outcome, Publisher};

use crate::command::show::print_detail;
use crate::config::get_config;
use crate::error::Error;
use crate::path::draft_file;
use crate::registry::Registry;
use crate::session::open_session;
use crate::ui::{self, StepBar};

pub const USAGE: &str = "Publish an app to the store.

Usage:
    apkshelf publish [options] [--screenshot=<path>...] [--feature=<text>...]

Options:
    --apk=<path>             The APK file to publish.
    --icon=<path>            App icon image.
    --screenshot=<path>      Screenshot image, or a glob pattern. Up to 5.
    --name=<name>            App name.
    --developer=<name>       Developer name.
    --email=<email>          Developer contact email.
    --website=<url>          Developer website.
    --category=<category>    Store category, see `apkshelf browse --categories`.
    --description=<text>     What the app does.
    --app-version=<version>  Version string, 1.0.0 if never given.
    --min-android=<version>  Lowest supported Android version, 7.0 if never given.
    --feature=<text>         One key feature. May be repeated.
    --whats-new=<text>       Release notes for this version.
    --discard-draft          Forget any saved submission and start over.
    -q, --quiet              Only print the new app's id.
    -h, --help               Display this message.

Anything not given on the command line is taken from the saved draft, if
there is one. Unfinished submissions are saved as a draft.
";

const DETAIL_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Default, Deserialize)]
pub struct Args {
    flag_apk: Option<String>,
    flag_icon: Option<String>,
    flag_screenshot: Vec<String>,
    flag_name: Option<String>,
    flag_developer: Option<String>,
    flag_email: Option<String>,
    flag_website: Option<String>,
    flag_category: Option<String>,
    flag_description: Option<String>,
    flag_app_version: Option<String>,
    flag_min_android: Option<String>,
    flag_feature: Vec<String>,
    flag_whats_new: Option<String>,
    flag_discard_draft: bool,
    flag_quiet: bool,
}

fn set(field: &mut String, value: &Option<String>) {
    if let Some(ref value) = *value {
        *field = value.clone();
    }
}

impl Args {
    /// Flags win over `base`, which is the draft or the defaults.
    pub fn fields(&self, base: FormFields) -> FormFields {
        let mut fields = base;
        set(&mut fields.app_name, &self.flag_name);
        set(&mut fields.developer_name, &self.flag_developer);
        set(&mut fields.email, &self.flag_email);
        set(&mut fields.website, &self.flag_website);
        set(&mut fields.category, &self.flag_category);
        set(&mut fields.description, &self.flag_description);
        set(&mut fields.version, &self.flag_app_version);
        set(&mut fields.min_android_version, &self.flag_min_android);
        set(&mut fields.whats_new, &self.flag_whats_new);
        if !self.flag_feature.is_empty() {
            fields.features = self.flag_feature.join("\n");
        }
        fields
    }

    /// Package, icon and screenshot paths: flags first, then the draft.
    pub fn files(&self, draft: &Draft) -> Result<Files, Error> {
        let package = self.flag_apk.as_ref().map(PathBuf::from).or_else(|| draft.package.clone());
        let icon = self.flag_icon.as_ref().map(PathBuf::from).or_else(|| draft.icon.clone());
        let screenshots = if self.flag_screenshot.is_empty() {
            draft.screenshots.clone()
        } else {
            expand_patterns(&self.flag_screenshot)?
        };
        Ok((package, icon, screenshots))
    }
}

type Files = (Option<PathBuf>, Option<PathBuf>, Vec<PathBuf>);

/// Expands glob patterns in order, each one's matches sorted. A pattern
/// that matches nothing is kept as a plain path.
pub fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>, Error> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let mut matches: Vec<PathBuf> = glob(pattern)?.filter_map(|entry| entry.ok()).collect();
        if matches.is_empty() {
            paths.push(PathBuf::from(pattern));
        } else {
            matches.sort();
            paths.extend(matches);
        }
    }
    Ok(paths)
}

fn load(path: &Path) -> Result<Asset, failure::Error> {
    Asset::from_path(path).map_err(|err| format_err!("unable to read {}: {}", path.display(), err))
}

/// Reads the chosen files and picks them the way the upload form would:
/// a rejected file is reported through `warn` and left out.
pub fn select_assets(
    package: Option<&Path>,
    icon: Option<&Path>,
    screenshots: &[PathBuf],
    warn: &mut dyn FnMut(String),
) -> Result<AssetSet, failure::Error> {
    let mut assets = AssetSet::new();
    if let Some(path) = package {
        if let Err(err) = assets.select_package(load(path)?) {
            warn(format!("{}: {}", err, path.display()));
        }
    }
    if let Some(path) = icon {
        if let Err(err) = assets.select_icon(load(path)?) {
            warn(format!("{}: {}", err, path.display()));
        }
    }
    let mut batch = Vec::new();
    for path in screenshots {
        let asset = load(path)?;
        if asset.is_image() {
            batch.push(asset);
        } else {
            warn(format!("Skipping {}, it is not an image", path.display()));
        }
    }
    if let Some(err) = assets.add_screenshots(batch).overflow {
        warn(format!("{}, keeping the first {}", err, MAX_SCREENSHOTS));
    }
    Ok(assets)
}

/// Runs one attempt. A published app clears the draft; anything short of
/// that leaves the submission in the draft for the next try.
pub fn submit(
    publisher: &Publisher<'_>,
    scratch: &dyn Scratch,
    fields: &FormFields,
    assets: &AssetSet,
    sink: &mut dyn ProgressSink,
) -> Result<Outcome, failure::Error> {
    match publisher.publish(fields, assets, sink) {
        Ok(Outcome::Published(id)) => {
            scratch.take()?;
            Ok(Outcome::Published(id))
        }
        Ok(Outcome::AuthenticationRequired) => Ok(Outcome::AuthenticationRequired),
        Err(err) => {
            scratch.save(&Draft::capture(fields, assets))?;
            Err(err.into())
        }
    }
}

pub fn execute(args: Args) -> Result<(), failure::Error> {
    let config = get_config()?.effective();
    let registry = Registry::from_config(&config)?.quiet(args.flag_quiet);
    let scratch = FileScratch::new(draft_file()?);

    let draft = if args.flag_discard_draft {
        scratch.take()?;
        None
    } else {
        scratch.peek()?
    };
    if draft.is_some() && !args.flag_quiet {
        println!("Picking up your saved draft.");
    }
    let draft = draft.unwrap_or_default();

    let fields = args.fields(draft.fields.clone());
    if !fields.category.is_empty() && !is_known_category(&fields.category) {
        ui::warn(&format!("{:?} is not one of the store categories", fields.category));
    }
    if !ANDROID_VERSIONS.contains(&fields.min_android_version.as_str()) {
        ui::warn(&format!(
            "Android {} is not one of {}",
            fields.min_android_version,
            ANDROID_VERSIONS.join(", ")
        ));
    }
    let (package, icon, screenshots) = args.files(&draft)?;
    let assets = select_assets(
        package.as_deref(),
        icon.as_deref(),
        &screenshots,
        &mut |message| ui::warn(&message),
    )?;

    let session = open_session(&config);
    let publisher = Publisher::new(&registry, &registry, &session, &scratch)
        .with_buckets(config.backend.buckets());
    let mut bar = StepBar::new(args.flag_quiet);

    match submit(&publisher, &scratch, &fields, &assets, &mut bar)? {
        Outcome::Published(id) => {
            if args.flag_quiet {
                println!("{}", id);
                return Ok(());
            }
            println!("App published successfully!\n");
            thread::sleep(DETAIL_DELAY);
            print_detail(&registry, &id)
        }
        Outcome::AuthenticationRequired => {
            println!(
                "Please sign in to publish your app. Your submission has been saved as a draft.\n\
                 Run `apkshelf login <email>`, then `apkshelf publish` to finish."
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use apkshelf_lib::auth::Session;
    use apkshelf_lib::backend::BackendError;
    use apkshelf_lib::draft::MemoryScratch;
    use apkshelf_lib::progress::ProgressLog;
    use apkshelf_lib::test_helpers::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn write(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, data).unwrap();
        path
    }

    #[test]
    fn flags_override_draft() {
        let base = FormFields {
            app_name: "Old Name".to_string(),
            category: "Games".to_string(),
            features: "Old feature".to_string(),
            ..FormFields::default()
        };
        let args = Args {
            flag_name: Some("New Name".to_string()),
            flag_feature: vec!["Fast".to_string(), "Offline".to_string()],
            ..Args::default()
        };
        let fields = args.fields(base);
        assert_eq!(fields.app_name, "New Name");
        assert_eq!(fields.category, "Games");
        assert_eq!(fields.feature_list(), vec!["Fast", "Offline"]);
        assert_eq!(fields.version, "1.0.0");
    }

    #[test]
    fn files_fall_back_to_draft() {
        let draft = Draft {
            package: Some(PathBuf::from("old.apk")),
            icon: Some(PathBuf::from("icon.png")),
            screenshots: vec![PathBuf::from("a.png")],
            ..Draft::default()
        };
        let args = Args {
            flag_apk: Some("new.apk".to_string()),
            ..Args::default()
        };
        let (package, icon, screenshots) = args.files(&draft).unwrap();
        assert_eq!(package, Some(PathBuf::from("new.apk")));
        assert_eq!(icon, Some(PathBuf::from("icon.png")));
        assert_eq!(screenshots, vec![PathBuf::from("a.png")]);
    }

    #[test]
    fn patterns_expand_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "shot2.png", b"2");
        write(dir.path(), "shot1.png", b"1");
        let pattern = dir.path().join("shot*.png").to_string_lossy().into_owned();
        let missing = dir.path().join("nope.png").to_string_lossy().into_owned();
        let paths = expand_patterns(&[pattern, missing.clone()]).unwrap();
        assert_eq!(
            paths,
            vec![
                dir.path().join("shot1.png"),
                dir.path().join("shot2.png"),
                PathBuf::from(missing),
            ]
        );
    }

    #[test]
    fn rejected_files_are_reported_and_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let package = write(dir.path(), "demo.zip", b"PK");
        let icon = write(dir.path(), "icon.png", b"\x89PNG");
        let notes = write(dir.path(), "notes.txt", b"hi");
        let shot = write(dir.path(), "shot.jpg", b"\xff\xd8");

        let mut warnings = Vec::new();
        let assets = select_assets(
            Some(&package),
            Some(&icon),
            &[notes, shot.clone()],
            &mut |message| warnings.push(message),
        )
        .unwrap();

        assert!(assets.package().is_none());
        assert_eq!(assets.icon().map(|a| a.file_name.as_str()), Some("icon.png"));
        assert_eq!(assets.screenshots().len(), 1);
        assert_eq!(assets.screenshots()[0].source, Some(shot));
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].starts_with("Please upload a valid APK file"));
    }

    #[test]
    fn unreadable_files_fail() {
        let mut warnings = Vec::new();
        let result = select_assets(
            Some(Path::new("/definitely/not/here.apk")),
            None,
            &[],
            &mut |message| warnings.push(message),
        );
        assert!(result.is_err());
    }

    #[test]
    fn sixth_screenshot_is_dropped_with_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let package = write(dir.path(), "demo.apk", b"PK");
        let icon = write(dir.path(), "icon.png", b"\x89PNG");
        let shots: Vec<PathBuf> = (1..=6)
            .map(|i| write(dir.path(), &format!("shot{}.png", i), b"\x89PNG"))
            .collect();

        let mut warnings = Vec::new();
        let assets = select_assets(Some(&package), Some(&icon), &shots, &mut |message| {
            warnings.push(message)
        })
        .unwrap();
        assert_eq!(assets.screenshots().len(), MAX_SCREENSHOTS);
        assert_eq!(
            warnings,
            vec!["You can upload a maximum of 5 screenshots, keeping the first 5".to_string()]
        );

        let backend = FakeBackend::new();
        let session = Session::new();
        let scratch = MemoryScratch::new();
        let publisher = Publisher::new(&backend, &backend, &session, &scratch);
        let mut log = ProgressLog::default();
        let fields = FormFields::default();
        submit(&publisher, &scratch, &fields, &assets, &mut log).unwrap();
        let draft = scratch.peek().unwrap().unwrap();
        assert_eq!(draft.screenshots, shots[..MAX_SCREENSHOTS].to_vec());
    }

    fn local_assets(dir: &Path) -> AssetSet {
        let package = write(dir, "demo.apk", b"PK");
        let icon = write(dir, "icon.png", b"\x89PNG");
        let shot = write(dir, "shot.png", b"\x89PNG");
        let mut warnings = Vec::new();
        select_assets(Some(&package), Some(&icon), &[shot], &mut |m| warnings.push(m)).unwrap()
    }

    #[test]
    fn failed_attempt_is_kept_as_draft() {
        let dir = tempfile::tempdir().unwrap();
        let assets = local_assets(dir.path());
        let fields = FormFields {
            app_name: "Demo".to_string(),
            ..FormFields::default()
        };
        let backend = FakeBackend::new();
        backend.fail_inserts(BackendError::Rejected(409, "duplicate".to_string()));
        let session = signed_in("u1");
        let scratch = MemoryScratch::new();
        let publisher = Publisher::new(&backend, &backend, &session, &scratch);

        let mut log = ProgressLog::default();
        assert!(submit(&publisher, &scratch, &fields, &assets, &mut log).is_err());
        let draft = scratch.peek().unwrap().unwrap();
        assert_eq!(draft.fields, fields);
        assert_eq!(draft.package, Some(dir.path().join("demo.apk")));

        backend.stop_failing();
        let outcome = submit(&publisher, &scratch, &fields, &assets, &mut log).unwrap();
        assert_matches!(outcome, Outcome::Published(_));
        assert_eq!(scratch.peek().unwrap(), None);
    }

    #[test]
    fn signed_out_submission_waits_in_draft() {
        let dir = tempfile::tempdir().unwrap();
        let assets = local_assets(dir.path());
        let backend = FakeBackend::new();
        let session = Session::new();
        let scratch = MemoryScratch::new();
        let publisher = Publisher::new(&backend, &backend, &session, &scratch);

        let mut log = ProgressLog::default();
        let outcome = submit(&publisher, &scratch, &FormFields::default(), &assets, &mut log).unwrap();
        assert_eq!(outcome, Outcome::AuthenticationRequired);
        assert!(backend.calls().is_empty());
        assert_eq!(scratch.peek().unwrap().map(|d| d.screenshots.len()), Some(1));
    }
}
