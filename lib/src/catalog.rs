use std::fmt;
use std::str::FromStr;

use crate::backend::{BackendError, RecordStore};
use crate::record::{AppListing, Direction, Query};

pub const ALL_CATEGORIES: &str = "All Categories";

pub const CATEGORIES: [&str; 13] = [
    "Games",
    "Social",
    "Productivity",
    "Entertainment",
    "Photo & Video",
    "Education",
    "Health & Fitness",
    "Food & Drink",
    "Business",
    "Utilities",
    "Travel",
    "Music",
    "Finance",
];

pub const ANDROID_VERSIONS: [&str; 9] = [
    "5.0", "6.0", "7.0", "8.0", "9.0", "10.0", "11.0", "12.0", "13.0",
];

const HOME_SECTION_SIZE: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOption {
    Popular,
    Newest,
    Rating,
    Downloads,
}

impl SortOption {
    pub fn all() -> [SortOption; 4] {
        [
            SortOption::Popular,
            SortOption::Newest,
            SortOption::Rating,
            SortOption::Downloads,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOption::Popular => "Most Popular",
            SortOption::Newest => "Newest First",
            SortOption::Rating => "Highest Rated",
            SortOption::Downloads => "Most Downloads",
        }
    }

    fn ordering(self) -> (&'static str, Direction) {
        match self {
            SortOption::Popular | SortOption::Downloads => ("downloads", Direction::Descending),
            SortOption::Newest => ("created_at", Direction::Descending),
            SortOption::Rating => ("rating", Direction::Descending),
        }
    }
}

impl Default for SortOption {
    fn default() -> Self {
        SortOption::Popular
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match *self {
            SortOption::Popular => "popular",
            SortOption::Newest => "newest",
            SortOption::Rating => "rating",
            SortOption::Downloads => "downloads",
        };
        write!(f, "{}", value)
    }
}

quick_error! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum CatalogError {
        UnknownSort(value: String) {
            display("unknown sort option {:?}, expected one of popular, newest, rating, downloads", value)
        }
    }
}

impl FromStr for SortOption {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "popular" => Ok(SortOption::Popular),
            "newest" => Ok(SortOption::Newest),
            "rating" => Ok(SortOption::Rating),
            "downloads" => Ok(SortOption::Downloads),
            other => Err(CatalogError::UnknownSort(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrowseOptions {
    pub category: Option<String>,
    pub sort: SortOption,
    pub search: Option<String>,
    pub limit: Option<usize>,
}

impl BrowseOptions {
    pub fn to_query(&self) -> Query {
        let mut query = Query::new();
        if let Some(ref category) = self.category {
            if category != ALL_CATEGORIES {
                query = query.eq("category", category.as_str());
            }
        }
        let (field, direction) = self.sort.ordering();
        query = query.order(field, direction);
        if let Some(limit) = self.limit {
            query = query.limit(limit);
        }
        query
    }
}

/// Case-insensitive match on app name or developer name. A blank term
/// keeps everything.
pub fn filter_by_search(apps: Vec<AppListing>, term: &str) -> Vec<AppListing> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return apps;
    }
    apps.into_iter()
        .filter(|app| {
            app.record.name.to_lowercase().contains(&term)
                || app.record.developer_name.to_lowercase().contains(&term)
        })
        .collect()
}

pub fn browse(
    store: &dyn RecordStore,
    options: &BrowseOptions,
) -> Result<Vec<AppListing>, BackendError> {
    let query = options.to_query();
    debug!(query = ?query, "catalog.browse");
    let apps = store.query_apps(&query)?;
    Ok(match options.search {
        Some(ref term) => filter_by_search(apps, term),
        None => apps,
    })
}

pub fn find_app(store: &dyn RecordStore, id: &str) -> Result<Option<AppListing>, BackendError> {
    let mut found = store.query_apps(&Query::new().eq("id", id).limit(1))?;
    Ok(if found.is_empty() {
        None
    } else {
        Some(found.remove(0))
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct HomePage {
    pub featured: Option<AppListing>,
    pub popular: Vec<AppListing>,
    pub recent: Vec<AppListing>,
}

pub fn home(store: &dyn RecordStore) -> Result<HomePage, BackendError> {
    let featured = store
        .query_apps(&Query::new().order("rating", Direction::Descending).limit(1))?
        .into_iter()
        .next();
    let popular = browse(
        store,
        &BrowseOptions {
            sort: SortOption::Popular,
            limit: Some(HOME_SECTION_SIZE),
            ..BrowseOptions::default()
        },
    )?;
    let recent = browse(
        store,
        &BrowseOptions {
            sort: SortOption::Newest,
            limit: Some(HOME_SECTION_SIZE),
            ..BrowseOptions::default()
        },
    )?;
    Ok(HomePage {
        featured,
        popular,
        recent,
    })
}

/// URL-friendly category name: "Health & Fitness" becomes "health-&-fitness".
pub fn category_slug(category: &str) -> String {
    category
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

pub fn is_known_category(category: &str) -> bool {
    CATEGORIES.iter().any(|known| *known == category)
}
