use apkshelf_lib::backend::RecordStore;
use apkshelf_lib::catalog::find_app;

use crate::config::get_config;
use crate::registry::Registry;
use crate::render;

pub const USAGE: &str = "Show the details of one app.

Usage:
    apkshelf show [options] <id>

Options:
    -h, --help     Display this message.
";

#[derive(Debug, Deserialize)]
pub struct Args {
    arg_id: String,
}

#[derive(Debug, Fail)]
#[fail(display = "App not found: {}", _0)]
pub struct NotFound(pub String);

pub fn print_detail(store: &dyn RecordStore, id: &str) -> Result<(), failure::Error> {
    let app = find_app(store, id)?.ok_or_else(|| NotFound(id.to_string()))?;
    print!("{}", render::detail(&app));
    Ok(())
}

pub fn execute(args: Args) -> Result<(), failure::Error> {
    let registry = Registry::from_config(&get_config()?.effective())?;
    print_detail(&registry, &args.arg_id)
}
