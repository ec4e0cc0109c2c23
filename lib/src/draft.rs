use std::cell::RefCell;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rmp_serde::{decode, encode};

use crate::asset::AssetSet;
use crate::error::Error;

pub const DEFAULT_VERSION: &str = "1.0.0";
pub const DEFAULT_MIN_ANDROID_VERSION: &str = "7.0";

/// The metadata half of the upload form.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FormFields {
    pub app_name: String,
    pub developer_name: String,
    pub email: String,
    pub website: String,
    pub category: String,
    pub description: String,
    pub version: String,
    pub min_android_version: String,
    pub features: String,
    pub whats_new: String,
}

impl Default for FormFields {
    fn default() -> Self {
        FormFields {
            app_name: String::new(),
            developer_name: String::new(),
            email: String::new(),
            website: String::new(),
            category: String::new(),
            description: String::new(),
            version: DEFAULT_VERSION.to_string(),
            min_android_version: DEFAULT_MIN_ANDROID_VERSION.to_string(),
            features: String::new(),
            whats_new: String::new(),
        }
    }
}

impl FormFields {
    /// Features are entered one per line; blank lines are ignored.
    pub fn feature_list(&self) -> Vec<String> {
        self.features
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Everything needed to put the form back the way the user left it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Draft {
    pub fields: FormFields,
    pub package: Option<PathBuf>,
    pub icon: Option<PathBuf>,
    pub screenshots: Vec<PathBuf>,
}

impl Draft {
    pub fn capture(fields: &FormFields, assets: &AssetSet) -> Draft {
        Draft {
            fields: fields.clone(),
            package: assets.package().and_then(|a| a.source.clone()),
            icon: assets.icon().and_then(|a| a.source.clone()),
            screenshots: assets
                .screenshots()
                .iter()
                .filter_map(|a| a.source.clone())
                .collect(),
        }
    }
}

/// Durable client-side scratch area holding at most one draft.
pub trait Scratch {
    fn save(&self, draft: &Draft) -> Result<(), Error>;

    /// Removes and returns the stored draft, if any.
    fn take(&self) -> Result<Option<Draft>, Error>;

    fn peek(&self) -> Result<Option<Draft>, Error>;
}

#[derive(Default)]
pub struct MemoryScratch {
    draft: RefCell<Option<Draft>>,
}

impl MemoryScratch {
    pub fn new() -> Self {
        MemoryScratch::default()
    }
}

impl Scratch for MemoryScratch {
    fn save(&self, draft: &Draft) -> Result<(), Error> {
        *self.draft.borrow_mut() = Some(draft.clone());
        Ok(())
    }

    fn take(&self) -> Result<Option<Draft>, Error> {
        Ok(self.draft.borrow_mut().take())
    }

    fn peek(&self) -> Result<Option<Draft>, Error> {
        Ok(self.draft.borrow().clone())
    }
}

/// Draft kept in a MessagePack file.
pub struct FileScratch {
    path: PathBuf,
}

impl FileScratch {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        FileScratch { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Scratch for FileScratch {
    fn save(&self, draft: &Draft) -> Result<(), Error> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, encode::to_vec_named(draft)?)?;
        debug!(path = ?self.path, "draft.saved");
        Ok(())
    }

    fn take(&self) -> Result<Option<Draft>, Error> {
        let draft = self.peek()?;
        if draft.is_some() {
            fs::remove_file(&self.path)?;
        }
        Ok(draft)
    }

    fn peek(&self) -> Result<Option<Draft>, Error> {
        match File::open(&self.path) {
            Ok(file) => Ok(Some(decode::from_read(file)?)),
            Err(ref err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::from(err)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn draft() -> Draft {
        Draft {
            fields: FormFields {
                app_name: "Demo".to_string(),
                category: "Utilities".to_string(),
                features: "Fast\n\n  Offline  \n".to_string(),
                ..FormFields::default()
            },
            package: Some(PathBuf::from("build/demo.apk")),
            icon: Some(PathBuf::from("art/icon.png")),
            screenshots: vec![PathBuf::from("art/1.png"), PathBuf::from("art/2.png")],
        }
    }

    #[test]
    fn form_defaults() {
        let fields = FormFields::default();
        assert_eq!(fields.version, "1.0.0");
        assert_eq!(fields.min_android_version, "7.0");
    }

    #[test]
    fn feature_list_skips_blank_lines() {
        assert_eq!(draft().fields.feature_list(), vec!["Fast", "Offline"]);
    }

    #[test]
    fn memory_scratch_take_empties() {
        let scratch = MemoryScratch::new();
        scratch.save(&draft()).unwrap();
        assert_eq!(scratch.peek().unwrap(), Some(draft()));
        assert_eq!(scratch.take().unwrap(), Some(draft()));
        assert_eq!(scratch.take().unwrap(), None);
    }

    #[test]
    fn file_scratch_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("draft.msgpack");
        FileScratch::new(&path).save(&draft()).unwrap();

        let reopened = FileScratch::new(&path);
        assert_eq!(reopened.peek().unwrap(), Some(draft()));
        assert_eq!(reopened.take().unwrap(), Some(draft()));
        assert!(!path.exists());
        assert_eq!(reopened.take().unwrap(), None);
    }

    #[test]
    fn file_scratch_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draft.msgpack");
        fs::write(&path, b"\xc1\xc1\xc1").unwrap();
        assert_matches!(FileScratch::new(&path).peek(), Err(Error::FromRMP(_)));
    }
}
