use apkshelf_lib::catalog;

use crate::config::get_config;
use crate::registry::Registry;
use crate::render;

pub const USAGE: &str = "Featured, popular and recently added apps.

Usage:
    apkshelf home [options]

Options:
    -h, --help     Display this message.
";

#[derive(Debug, Deserialize)]
pub struct Args {}

pub fn execute(_: Args) -> Result<(), failure::Error> {
    let registry = Registry::from_config(&get_config()?.effective())?;
    let page = catalog::home(&registry)?;
    print!("{}", render::home(&page));
    Ok(())
}
