use crate::config::get_config;
use crate::path::config_file;
use crate::registry::Registry;
use crate::session::{open_session, persist_to};
use crate::ui::read_password;

pub const USAGE: &str = "Create a developer account.

Usage:
    apkshelf register [options] --name=<name> <email>

Options:
    --name=<name>  Your name, shown to other users.
    -h, --help     Display this message.

The password is read from APKSHELF_PASSWORD, or asked for.
";

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct Args {
    arg_email: String,
    flag_name: String,
}

pub fn check_password(password: &str) -> Result<(), failure::Error> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        bail!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        );
    }
    Ok(())
}

pub fn execute(args: Args) -> Result<(), failure::Error> {
    let config = get_config()?.effective();
    let registry = Registry::from_config(&config)?.with_token(None);
    if args.flag_name.trim().is_empty() {
        bail!("Please tell us your name");
    }
    let password = read_password("Choose a password: ")?;
    check_password(&password)?;

    match registry.sign_up(&args.arg_email, &password, args.flag_name.trim())? {
        Some(identity) => {
            let session = open_session(&config);
            persist_to(&session, config_file()?);
            println!("Welcome, {}! You are signed in.", args.flag_name.trim());
            session.sign_in(identity);
        }
        None => println!(
            "Check {} for a confirmation link, then run `apkshelf login {}`.",
            args.arg_email, args.arg_email
        ),
    }
    Ok(())
}
