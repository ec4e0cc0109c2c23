use std::fmt;

use console::style;

use apkshelf_lib::catalog::{category_slug, HomePage, CATEGORIES};
use apkshelf_lib::format::{format_downloads, format_size, strip_scheme, Stars, Style};
use apkshelf_lib::record::AppListing;

struct Card<'a>(&'a AppListing);

struct Cards<'a>(&'a [AppListing]);

struct Home<'a>(&'a HomePage);

struct Detail<'a>(&'a AppListing);

fn section(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "\n{}", style(title).cyan().bold())
}

impl<'a> fmt::Display for Card<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let app = self.0;
        write!(
            f,
            "{}  {}  {} downloads\n    {} | {} | id {}",
            style(&app.record.name).bold(),
            style(Stars::new(app.rating)).yellow(),
            format_downloads(app.downloads, Style::Short),
            app.record.developer_name,
            app.record.category,
            style(&app.record.id).dim(),
        )
    }
}

impl<'a> fmt::Display for Cards<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No apps found.");
        }
        for app in self.0 {
            writeln!(f, "{}", Card(app))?;
        }
        Ok(())
    }
}

impl<'a> fmt::Display for Home<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let page = self.0;
        if let Some(ref featured) = page.featured {
            section(f, "Featured")?;
            writeln!(f, "{}", Card(featured))?;
            if !featured.record.description.is_empty() {
                writeln!(f, "    {}", featured.record.description)?;
            }
        }
        section(f, "Popular Apps")?;
        write!(f, "{}", Cards(&page.popular))?;
        section(f, "Recently Added")?;
        write!(f, "{}", Cards(&page.recent))?;
        section(f, "Categories")?;
        for category in CATEGORIES.iter() {
            writeln!(f, "    {:<18} {}", category, style(category_slug(category)).dim())?;
        }
        Ok(())
    }
}

impl<'a> fmt::Display for Detail<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let app = self.0;
        let record = &app.record;
        writeln!(f, "{}", style(&record.name).bold())?;
        writeln!(f, "{}", record.developer_name)?;
        writeln!(
            f,
            "{}  {} downloads",
            style(Stars::new(app.rating)).yellow(),
            format_downloads(app.downloads, Style::Long)
        )?;
        writeln!(f)?;
        writeln!(f, "Category:     {}", record.category)?;
        writeln!(f, "Version:      {}", record.version)?;
        if let Some(size) = app.size_bytes {
            writeln!(f, "Size:         {}", format_size(size))?;
        }
        if !record.min_android_version.is_empty() {
            writeln!(f, "Requires:     Android {}+", record.min_android_version)?;
        }
        if let Some(ref created) = app.created_at {
            writeln!(f, "Released:     {}", created.get(..10).unwrap_or(created))?;
        }

        if !record.description.is_empty() {
            section(f, "About this app")?;
            writeln!(f, "{}", record.description)?;
        }
        if !record.features.is_empty() {
            section(f, "Features")?;
            for feature in &record.features {
                writeln!(f, "  * {}", feature)?;
            }
        }
        if !record.whats_new.is_empty() {
            section(f, "What's New")?;
            writeln!(f, "{}", record.whats_new)?;
        }
        if !record.screenshot_urls.is_empty() {
            section(f, "Screenshots")?;
            for url in &record.screenshot_urls {
                writeln!(f, "  {}", url)?;
            }
        }

        section(f, "Developer")?;
        if !record.developer_email.is_empty() {
            writeln!(f, "Email:        {}", record.developer_email)?;
        }
        if let Some(ref website) = record.website {
            writeln!(f, "Website:      {}", strip_scheme(website))?;
        }
        writeln!(f, "\nDownload:     apkshelf download {}", record.id)
    }
}

pub fn card(app: &AppListing) -> String {
    Card(app).to_string()
}

pub fn cards(apps: &[AppListing]) -> String {
    Cards(apps).to_string()
}

pub fn home(page: &HomePage) -> String {
    Home(page).to_string()
}

pub fn detail(app: &AppListing) -> String {
    Detail(app).to_string()
}

#[cfg(test)]
mod test {
    use super::*;
    use apkshelf_lib::test_helpers::listing;

    #[test]
    fn card_shows_short_counts() {
        console::set_colors_enabled(false);
        let text = card(&listing("a1", "Fitness Tracker Pro", "Health & Fitness", 1_500_000, 4.5));
        assert!(text.contains("Fitness Tracker Pro"));
        assert!(text.contains("★★★★★ 4.5"));
        assert!(text.contains("1.5M downloads"));
        assert!(text.contains("Fitness Tracker Pro Labs | Health & Fitness | id a1"));
    }

    #[test]
    fn empty_lists_say_so() {
        assert_eq!(cards(&[]), "No apps found.\n");
    }

    #[test]
    fn detail_shows_long_counts_and_bare_website() {
        console::set_colors_enabled(false);
        let mut app = listing("a1", "Budget Master", "Finance", 2_300_000, 3.2);
        app.record.website = Some("HTTPS://budget.example.com".to_string());
        app.record.features = vec!["Charts".to_string(), "Export".to_string()];
        app.size_bytes = Some(47_395_635);
        app.created_at = Some("2024-03-01T12:00:00Z".to_string());
        let text = detail(&app);
        assert!(text.contains("2.3 Million downloads"));
        assert!(text.contains("★★★☆☆ 3.2"));
        assert!(text.contains("Website:      budget.example.com"));
        assert!(text.contains("Size:         45.2 MB"));
        assert!(text.contains("Released:     2024-03-01"));
        assert!(text.contains("  * Export"));
        assert!(text.contains("apkshelf download a1"));
    }

    #[test]
    fn home_lists_category_slugs() {
        console::set_colors_enabled(false);
        let page = HomePage {
            featured: None,
            popular: vec![],
            recent: vec![],
        };
        let text = home(&page);
        assert!(!text.contains("Featured"));
        assert!(text.contains("photo-&-video"));
        assert!(text.contains("Popular Apps\nNo apps found.\n"));
    }

    #[test]
    fn cards_end_each_listing_with_a_newline() {
        console::set_colors_enabled(false);
        let apps = vec![
            listing("a1", "One", "Games", 10, 4.0),
            listing("a2", "Two", "Games", 20, 4.0),
        ];
        let text = cards(&apps);
        assert_eq!(text.lines().count(), 4);
        assert!(text.ends_with("id a2\n"));
    }
}
