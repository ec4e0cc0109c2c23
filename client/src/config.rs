use std::fs::{create_dir_all, File};
use std::io::{ErrorKind, Read, Write};
use std::path::Path;

use apkshelf_lib::auth::Identity;
use apkshelf_lib::backend::Buckets;

use crate::error::Error;
use crate::path::config_file;

pub const URL_ENV: &str = "APKSHELF_URL";
pub const ANON_KEY_ENV: &str = "APKSHELF_ANON_KEY";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default)]
    pub auth: Auth,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Backend {
    pub url: String,
    pub anon_key: String,
    pub files_bucket: String,
    pub images_bucket: String,
    pub apps_table: String,
}

impl Default for Backend {
    fn default() -> Self {
        let buckets = Buckets::default();
        Backend {
            url: String::new(),
            anon_key: String::new(),
            files_bucket: buckets.files,
            images_bucket: buckets.images,
            apps_table: "apps".to_string(),
        }
    }
}

impl Backend {
    pub fn buckets(&self) -> Buckets {
        Buckets {
            files: self.files_bucket.clone(),
            images: self.images_bucket.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Auth {
    pub access_token: Option<String>,
    pub user_id: Option<String>,
    pub email: Option<String>,
}

impl Auth {
    pub fn identity(&self) -> Option<Identity> {
        self.user_id.as_ref().map(|id| Identity {
            id: id.clone(),
            email: self.email.clone(),
            access_token: self.access_token.clone(),
        })
    }

    pub fn from_identity(identity: Option<&Identity>) -> Auth {
        match identity {
            Some(identity) => Auth {
                access_token: identity.access_token.clone(),
                user_id: Some(identity.id.clone()),
                email: identity.email.clone(),
            },
            None => Auth::default(),
        }
    }
}

impl Config {
    /// The configuration with `APKSHELF_URL` and `APKSHELF_ANON_KEY`
    /// applied on top. Overrides are never written back to disk.
    pub fn effective(self) -> Config {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(URL_ENV).filter(|v| !v.is_empty()) {
            self.backend.url = url;
        }
        if let Some(key) = lookup(ANON_KEY_ENV).filter(|v| !v.is_empty()) {
            self.backend.anon_key = key;
        }
        self
    }

    pub fn check_backend(&self) -> Result<(), Error> {
        if self.backend.url.is_empty() {
            return Err(Error::Custom(format!(
                "No backend configured. Set {} or add `url` to the [backend] table of your config.",
                URL_ENV
            )));
        }
        if self.backend.anon_key.is_empty() {
            return Err(Error::Custom(format!(
                "No API key configured. Set {} or add `anon_key` to the [backend] table of your config.",
                ANON_KEY_ENV
            )));
        }
        Ok(())
    }
}

fn read_config<R>(r: &mut R) -> Result<Config, Error>
where
    R: Read,
{
    let mut data = String::new();
    r.read_to_string(&mut data)?;
    Ok(toml::from_str(&data)?)
}

pub fn load_config(path: &Path) -> Result<Config, Error> {
    match File::open(path) {
        Err(ref err) if err.kind() == ErrorKind::NotFound => Ok(Config::default()),
        Err(err) => Err(err.into()),
        Ok(mut file) => read_config(&mut file),
    }
}

pub fn save_config(path: &Path, config: &Config) -> Result<(), Error> {
    if let Some(dir) = path.parent() {
        create_dir_all(dir)?;
    }
    let data = toml::to_string(config)?;
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    Ok(())
}

pub fn get_config() -> Result<Config, Error> {
    load_config(&config_file()?)
}

pub fn write_config(config: &Config) -> Result<(), Error> {
    save_config(&config_file()?, config)
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.backend.files_bucket, "apk-files");
        assert_eq!(config.backend.images_bucket, "app-images");
        assert_eq!(config.backend.apps_table, "apps");
    }

    #[test]
    fn partial_tables_fill_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            [backend]
            url = "https://shelf.example.co"
            anon_key = "anon"
            "#,
        )
        .unwrap();
        assert_eq!(config.backend.url, "https://shelf.example.co");
        assert_eq!(config.backend.images_bucket, "app-images");
        assert_eq!(config.auth, Auth::default());
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.backend.url = "https://shelf.example.co".to_string();
        config.auth = Auth {
            access_token: Some("jwt".to_string()),
            user_id: Some("u1".to_string()),
            email: Some("dev@example.com".to_string()),
        };
        save_config(&path, &config).unwrap();
        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn env_overrides_backend() {
        let mut config = Config::default();
        config.backend.url = "https://from-file".to_string();
        config.backend.anon_key = "file-key".to_string();
        let config = config.with_overrides(|key| match key {
            URL_ENV => Some("https://from-env".to_string()),
            ANON_KEY_ENV => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.backend.url, "https://from-env");
        assert_eq!(config.backend.anon_key, "file-key");
    }

    #[test]
    fn check_backend_wants_url_and_key() {
        let mut config = Config::default();
        assert_matches!(config.check_backend(), Err(Error::Custom(_)));
        config.backend.url = "https://shelf.example.co".to_string();
        assert_matches!(config.check_backend(), Err(Error::Custom(_)));
        config.backend.anon_key = "anon".to_string();
        assert_matches!(config.check_backend(), Ok(()));
    }

    #[test]
    fn identity_needs_user_id() {
        let auth = Auth {
            access_token: Some("jwt".to_string()),
            ..Auth::default()
        };
        assert_eq!(auth.identity(), None);

        let identity = Identity {
            id: "u1".to_string(),
            email: Some("dev@example.com".to_string()),
            access_token: Some("jwt".to_string()),
        };
        let auth = Auth::from_identity(Some(&identity));
        assert_eq!(auth.identity(), Some(identity));
        assert_eq!(Auth::from_identity(None), Auth::default());
    }
}
