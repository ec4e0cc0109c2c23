#[macro_use]
extern crate failure;
#[macro_use]
extern crate failure_derive;
extern crate apkshelf_lib;
extern crate console;
extern crate dirs;
extern crate docopt;
extern crate dotenv;
extern crate glob;
#[macro_use]
extern crate im;
extern crate indicatif;
#[macro_use]
extern crate quick_error;
extern crate reqwest;
extern crate serde;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate serde_json;
extern crate toml;
#[macro_use]
extern crate tracing;
extern crate tracing_subscriber;
extern crate url;
#[cfg(test)]
#[macro_use]
extern crate matches;
#[cfg(test)]
extern crate tempfile;

mod config;
mod error;
mod io;
mod logging;
mod path;
mod registry;
mod render;
mod session;
mod ui;

use docopt::Docopt;
use serde::de::Deserialize;
use std::process;

const USAGE: &str = "Browse and publish Android apps.

Usage:
    apkshelf <command> [<args>...]
    apkshelf [options]

Options:
    -h, --help     Display this message.
    -v, --version  Print version info.

Commands:
    login       Sign in to your account.
    register    Create a developer account.
    logout      Sign out.
    home        Featured, popular and recent apps.
    browse      List apps by category, with sorting and search.
    show        Details of one app.
    download    Download an app's APK.
    publish     Upload an app to the store.

Logging goes to stderr and is controlled by APKSHELF_LOG (default: warn).
";

#[derive(Debug, Deserialize)]
struct Args {
    arg_command: String,
    arg_args: Vec<String>,
}

type Result = std::result::Result<(), failure::Error>;

macro_rules! each_subcommand {
    ($mac:ident) => {
        $mac!(login);
        $mac!(register);
        $mac!(logout);
        $mac!(home);
        $mac!(browse);
        $mac!(show);
        $mac!(download);
        $mac!(publish);
    };
}

mod command;

fn run_builtin_command<'de, Flags: Deserialize<'de>>(
    exec: fn(Flags) -> Result,
    usage: &str,
) -> Result {
    let docopt = Docopt::new(usage)?.help(true);
    docopt
        .deserialize()
        .map_err(|e| e.exit())
        .and_then(|opts| exec(opts))
}

fn attempt_builtin_command(cmd: &str) -> Option<Result> {
    macro_rules! cmd {
        ($name:ident) => {
            if cmd == stringify!($name).replace("_", "-") {
                return Some(run_builtin_command(
                    command::$name::execute,
                    command::$name::USAGE,
                ));
            }
        };
    }
    each_subcommand!(cmd);
    None
}

fn main() {
    dotenv::dotenv().ok();
    if let Err(err) = logging::init_logging() {
        eprintln!("{}: {}", ui::error_label(), err);
    }

    let args: Args = Docopt::new(USAGE)
        .map(|d| d.options_first(true))
        .map(|d| d.help(true))
        .map(|d| d.version(Some(env!("CARGO_PKG_VERSION").to_string())))
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());
    if args.arg_command.is_empty() {
        print!("{}", USAGE);
        process::exit(1)
    }
    let result = attempt_builtin_command(&args.arg_command).unwrap_or_else(|| {
        Err(format_err!(
            "no such command `{}`, see `apkshelf --help`",
            args.arg_command
        ))
    });
    match result {
        Ok(_) => process::exit(0),
        Err(e) => {
            eprintln!("{}: {}", ui::error_label(), e);
            process::exit(1)
        }
    }
}
