use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use mime::{self, Mime};

pub const MAX_SCREENSHOTS: usize = 5;

const APK_MIME: &str = "application/vnd.android.package-archive";

quick_error! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum SelectionError {
        NotAnApk(file_name: String) {
            display("Please upload a valid APK file")
        }
        NotAnImage(file_name: String) {
            display("Please upload a valid image file")
        }
        TooManyScreenshots(held: usize, offered: usize) {
            display("You can upload a maximum of {} screenshots", MAX_SCREENSHOTS)
        }
    }
}

/// A local file picked by the user, held in memory until submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub file_name: String,
    pub mime: Mime,
    pub data: Vec<u8>,
    pub source: Option<PathBuf>,
}

impl Asset {
    pub fn new<S: Into<String>>(file_name: S, data: Vec<u8>) -> Asset {
        let file_name = file_name.into();
        Asset {
            mime: mime_for(&file_name),
            file_name,
            data,
            source: None,
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> io::Result<Asset> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "not a file path"))?;
        let data = fs::read(path)?;
        Ok(Asset {
            source: Some(path.to_path_buf()),
            ..Asset::new(file_name, data)
        })
    }

    /// Lower-cased extension without the dot, if the file name has one.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .filter(|ext| !ext.is_empty())
    }

    pub fn is_image(&self) -> bool {
        self.mime.type_() == mime::IMAGE
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Best guess at a MIME type from the file extension, the same way a
/// browser file picker would label the file.
pub fn mime_for(file_name: &str) -> Mime {
    let ext = Path::new(file_name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => mime::IMAGE_PNG,
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "gif" => mime::IMAGE_GIF,
        "bmp" => mime::IMAGE_BMP,
        "svg" => mime::IMAGE_SVG,
        "webp" => "image/webp".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        "apk" => APK_MIME.parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

/// What came of adding a batch of screenshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotBatch {
    pub added: usize,
    /// Set when the batch did not fit under the cap.
    pub overflow: Option<SelectionError>,
}

/// The files making up one submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetSet {
    package: Option<Asset>,
    icon: Option<Asset>,
    screenshots: Vec<Asset>,
}

impl AssetSet {
    pub fn new() -> Self {
        AssetSet::default()
    }

    pub fn package(&self) -> Option<&Asset> {
        self.package.as_ref()
    }

    pub fn icon(&self) -> Option<&Asset> {
        self.icon.as_ref()
    }

    pub fn screenshots(&self) -> &[Asset] {
        &self.screenshots
    }

    pub fn select_package(&mut self, asset: Asset) -> Result<(), SelectionError> {
        if !asset.file_name.ends_with(".apk") {
            return Err(SelectionError::NotAnApk(asset.file_name));
        }
        self.package = Some(asset);
        Ok(())
    }

    pub fn select_icon(&mut self, asset: Asset) -> Result<(), SelectionError> {
        if !asset.is_image() {
            return Err(SelectionError::NotAnImage(asset.file_name));
        }
        self.icon = Some(asset);
        Ok(())
    }

    /// Adds a batch of screenshots. Non-image files are dropped from the
    /// batch and the set keeps at most `MAX_SCREENSHOTS`: images past the
    /// cap are left out and reported through `ScreenshotBatch::overflow`.
    pub fn add_screenshots<I>(&mut self, batch: I) -> ScreenshotBatch
    where
        I: IntoIterator<Item = Asset>,
    {
        let held = self.screenshots.len();
        let images: Vec<Asset> = batch.into_iter().filter(Asset::is_image).collect();
        let offered = images.len();
        let room = MAX_SCREENSHOTS.saturating_sub(held);
        self.screenshots.extend(images.into_iter().take(room));
        let added = self.screenshots.len() - held;
        ScreenshotBatch {
            added,
            overflow: if offered > added {
                Some(SelectionError::TooManyScreenshots(held, offered))
            } else {
                None
            },
        }
    }

    pub fn remove_screenshot(&mut self, index: usize) -> Option<Asset> {
        if index < self.screenshots.len() {
            Some(self.screenshots.remove(index))
        } else {
            None
        }
    }

    pub fn clear_package(&mut self) -> Option<Asset> {
        self.package.take()
    }

    pub fn clear_icon(&mut self) -> Option<Asset> {
        self.icon.take()
    }

    pub fn clear(&mut self) {
        *self = AssetSet::default();
    }
}
