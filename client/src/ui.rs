use std::env;

use console::{Style, Term};
use indicatif::{ProgressBar, ProgressStyle};

use apkshelf_lib::progress::{Progress, ProgressSink};

use crate::error::Error;

pub const PASSWORD_ENV: &str = "APKSHELF_PASSWORD";

pub fn make_progress(msg: &str, len: u64, quiet: bool) -> ProgressBar {
    let bar = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(len)
    };
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{msg} {bar:40} {percent:>3}% {bytes:>8}/{total_bytes} {eta:>6} left")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.set_message(msg.to_string());
    bar
}

/// Shows the publish steps as a single percentage bar.
pub struct StepBar {
    bar: ProgressBar,
}

impl StepBar {
    pub fn new(quiet: bool) -> StepBar {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(100)
        };
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{bar:40.green} {pos:>3}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        StepBar { bar }
    }
}

impl ProgressSink for StepBar {
    fn report(&mut self, progress: &Progress) {
        self.bar.set_position(u64::from(progress.percent));
        if progress.is_failed() {
            self.bar.abandon_with_message(progress.step.clone());
        } else if progress.record_id.is_some() {
            self.bar.finish_and_clear();
        } else {
            self.bar.set_message(progress.step.clone());
        }
    }
}

pub fn error_label() -> String {
    Style::new().red().bold().apply_to("ERROR").to_string()
}

pub fn warn(message: &str) {
    eprintln!(
        "{}: {}",
        Style::new().yellow().bold().apply_to("WARNING"),
        message
    );
}

/// The password from `APKSHELF_PASSWORD`, or typed in without echo.
pub fn read_password(prompt: &str) -> Result<String, Error> {
    if let Ok(password) = env::var(PASSWORD_ENV) {
        return Ok(password);
    }
    let term = Term::stderr();
    term.write_str(prompt)?;
    Ok(term.read_secure_line()?)
}
