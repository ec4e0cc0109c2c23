use std::fmt;

/// A published application, as constructed by the publish workflow and
/// inserted into the backing store.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct AppRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub version: String,
    pub developer_id: String,

    pub apk_file_url: String,
    pub icon_url: String,
    pub banner_url: String,
    #[serde(default)]
    pub screenshot_urls: Vec<String>,

    #[serde(default)]
    pub developer_name: String,
    #[serde(default)]
    pub developer_email: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub min_android_version: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub whats_new: String,
}

/// A record as returned by a query. The counters and timestamps are owned
/// by the store and default to zero/empty when it leaves them out.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct AppListing {
    #[serde(flatten)]
    pub record: AppRecord,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub size_bytes: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Direction::Ascending => write!(f, "asc"),
            Direction::Descending => write!(f, "desc"),
        }
    }
}

/// Equality filters, a single ordering and a limit: everything the record
/// store is asked to understand.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
    pub filters: Vec<(String, String)>,
    pub order: Option<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Query::default()
    }

    pub fn eq<F, V>(mut self, field: F, value: V) -> Self
    where
        F: Into<String>,
        V: Into<String>,
    {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn order<F: Into<String>>(mut self, field: F, direction: Direction) -> Self {
        self.order = Some((field.into(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn query_builder() {
        let query = Query::new()
            .eq("category", "Games")
            .order("downloads", Direction::Descending)
            .limit(6);
        assert_eq!(
            query.filters,
            vec![("category".to_string(), "Games".to_string())]
        );
        assert_eq!(
            query.order,
            Some(("downloads".to_string(), Direction::Descending))
        );
        assert_eq!(query.limit, Some(6));
    }

    #[test]
    fn listing_defaults_store_owned_fields() {
        let listing: AppListing = serde_json::from_str(
            r#"{
                "id": "a1",
                "name": "Demo",
                "description": "",
                "category": "Utilities",
                "version": "1.0.0",
                "developer_id": "u1",
                "apk_file_url": "https://cdn/a.apk",
                "icon_url": "https://cdn/i.png",
                "banner_url": "https://cdn/s.png"
            }"#,
        )
        .unwrap();
        assert_eq!(listing.record.name, "Demo");
        assert_eq!(listing.downloads, 0);
        assert_eq!(listing.created_at, None);
        assert!(listing.record.screenshot_urls.is_empty());
    }

    #[test]
    fn listing_reads_counters() {
        let listing: AppListing = serde_json::from_str(
            r#"{
                "id": "a1",
                "name": "Demo",
                "description": "",
                "category": "Utilities",
                "version": "1.0.0",
                "developer_id": "u1",
                "apk_file_url": "",
                "icon_url": "",
                "banner_url": "",
                "downloads": 1500000,
                "rating": 4.5,
                "created_at": "2024-05-01T10:00:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(listing.downloads, 1_500_000);
        assert_eq!(listing.rating, 4.5);
        assert_eq!(listing.created_at, Some("2024-05-01T10:00:00Z".to_string()));
    }
}
