use std::path::PathBuf;

use dirs::home_dir;

use crate::error::Error;

pub fn config_path() -> Result<PathBuf, Error> {
    let mut p = home_dir().ok_or(Error::Message("unable to find user home directory!"))?;
    p.push(".apkshelf");
    Ok(p)
}

pub fn config_file() -> Result<PathBuf, Error> {
    Ok(config_path()?.join("config.toml"))
}

/// Where an unfinished submission waits for the next `publish`.
pub fn draft_file() -> Result<PathBuf, Error> {
    Ok(config_path()?.join("draft.msgpack"))
}
