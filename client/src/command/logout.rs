use apkshelf_lib::auth::IdentityProvider;

use crate::config::get_config;
use crate::path::config_file;
use crate::session::{open_session, persist_to};

pub const USAGE: &str = "Sign out.

Usage:
    apkshelf logout [options]

Options:
    -h, --help     Display this message.
";

#[derive(Debug, Deserialize)]
pub struct Args {}

pub fn execute(_: Args) -> Result<(), failure::Error> {
    let session = open_session(&get_config()?);
    match session.current() {
        Some(identity) => {
            persist_to(&session, config_file()?);
            session.sign_out();
            println!("Signed out {}.", identity);
        }
        None => println!("You are not signed in."),
    }
    Ok(())
}
