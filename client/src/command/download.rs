use std::path::PathBuf;

use apkshelf_lib::catalog::find_app;
use apkshelf_lib::format::format_size;
use apkshelf_lib::record::AppRecord;

use crate::command::show::NotFound;
use crate::config::get_config;
use crate::registry::Registry;

pub const USAGE: &str = "Download an app's APK.

Usage:
    apkshelf download [options] <id>

Options:
    -o, --output=<path>  Where to write the APK.
    -q, --quiet          Don't show a progress bar.
    -h, --help           Display this message.
";

#[derive(Debug, Deserialize)]
pub struct Args {
    arg_id: String,
    flag_output: Option<String>,
    flag_quiet: bool,
}

/// The stored file name, which is the last segment of the APK URL.
pub fn default_output(record: &AppRecord) -> PathBuf {
    let name = record
        .apk_file_url
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}.apk", record.id));
    PathBuf::from(name)
}

pub fn execute(args: Args) -> Result<(), failure::Error> {
    let registry = Registry::from_config(&get_config()?.effective())?.quiet(args.flag_quiet);
    let app = find_app(&registry, &args.arg_id)?.ok_or_else(|| NotFound(args.arg_id.clone()))?;
    if app.record.apk_file_url.is_empty() {
        bail!("{} has no APK to download", app.record.name);
    }
    let dest = args
        .flag_output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_output(&app.record));
    let size = registry.download(&app.record.apk_file_url, &dest)?;
    if !args.flag_quiet {
        println!(
            "Saved {} {} to {} ({}).",
            app.record.name,
            app.record.version,
            dest.display(),
            format_size(size)
        );
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn output_named_after_stored_file() {
        let record = AppRecord {
            id: "a1".to_string(),
            apk_file_url: "https://cdn.test/apk-files/a1/fitness-tracker.apk".to_string(),
            ..AppRecord::default()
        };
        assert_eq!(default_output(&record), PathBuf::from("fitness-tracker.apk"));

        let record = AppRecord {
            id: "a1".to_string(),
            apk_file_url: "https://cdn.test/apk-files/a1/".to_string(),
            ..AppRecord::default()
        };
        assert_eq!(default_output(&record), PathBuf::from("a1.apk"));
    }
}
