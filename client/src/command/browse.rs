use apkshelf_lib::catalog::{self, BrowseOptions, SortOption, ALL_CATEGORIES, CATEGORIES};

use crate::config::get_config;
use crate::registry::Registry;
use crate::render;

pub const USAGE: &str = "List apps, optionally by category, sorted and searched.

Usage:
    apkshelf browse [options]

Options:
    -c, --category=<name>  Only show apps in this category.
    -s, --sort=<order>     popular, newest, rating or downloads [default: popular].
    --search=<term>        Only show apps whose name or developer matches.
    -n, --limit=<count>    Show at most this many apps.
    --categories           List the categories and exit.
    -h, --help             Display this message.
";

#[derive(Debug, Deserialize)]
pub struct Args {
    flag_category: Option<String>,
    flag_sort: String,
    flag_search: Option<String>,
    flag_limit: Option<usize>,
    flag_categories: bool,
}

impl Args {
    fn options(&self) -> Result<BrowseOptions, failure::Error> {
        if let Some(ref category) = self.flag_category {
            if category != ALL_CATEGORIES && !catalog::is_known_category(category) {
                bail!(
                    "unknown category {:?}, see `apkshelf browse --categories`",
                    category
                );
            }
        }
        Ok(BrowseOptions {
            category: self.flag_category.clone(),
            sort: self.flag_sort.parse::<SortOption>()?,
            search: self.flag_search.clone(),
            limit: self.flag_limit,
        })
    }
}

pub fn execute(args: Args) -> Result<(), failure::Error> {
    if args.flag_categories {
        println!("{}", ALL_CATEGORIES);
        for category in CATEGORIES.iter() {
            println!("{}", category);
        }
        return Ok(());
    }
    let options = args.options()?;
    let registry = Registry::from_config(&get_config()?.effective())?;
    let apps = catalog::browse(&registry, &options)?;
    println!(
        "{} ({})\n",
        options.category.as_ref().map_or(ALL_CATEGORIES, String::as_str),
        options.sort.label()
    );
    print!("{}", render::cards(&apps));
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(category: Option<&str>, sort: &str) -> Args {
        Args {
            flag_category: category.map(str::to_string),
            flag_sort: sort.to_string(),
            flag_search: None,
            flag_limit: None,
            flag_categories: false,
        }
    }

    #[test]
    fn builds_options() {
        let options = args(Some("Games"), "newest").options().unwrap();
        assert_eq!(options.category, Some("Games".to_string()));
        assert_eq!(options.sort, SortOption::Newest);
        assert!(args(Some(ALL_CATEGORIES), "popular").options().is_ok());
    }

    #[test]
    fn refuses_unknown_values() {
        assert!(args(Some("Weather"), "popular").options().is_err());
        assert!(args(None, "cheapest").options().is_err());
    }
}
