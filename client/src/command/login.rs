use apkshelf_lib::draft::{FileScratch, Scratch};

use crate::config::get_config;
use crate::path::{config_file, draft_file};
use crate::registry::Registry;
use crate::session::{open_session, persist_to};
use crate::ui::read_password;

pub const USAGE: &str = "Sign in to your account.

Usage:
    apkshelf login [options] <email>

Options:
    -h, --help     Display this message.

The password is read from APKSHELF_PASSWORD, or asked for.
";

#[derive(Debug, Deserialize)]
pub struct Args {
    arg_email: String,
}

pub fn execute(args: Args) -> Result<(), failure::Error> {
    let config = get_config()?.effective();
    let registry = Registry::from_config(&config)?.with_token(None);
    let password = read_password("Password: ")?;

    let identity = registry.sign_in(&args.arg_email, &password)?;
    let session = open_session(&config);
    persist_to(&session, config_file()?);
    info!(user = %identity.id, "login.done");
    println!("Signed in as {}.", identity);
    session.sign_in(identity);

    if FileScratch::new(draft_file()?).peek()?.is_some() {
        println!("You have an unfinished submission. Run `apkshelf publish` to pick it up.");
    }
    Ok(())
}
