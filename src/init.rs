//! Site initialization module.
//!
//! Creates a new site directory with a default configuration and a
//! seeded content store, so `serve` works immediately after `init`.

use anyhow::{Context, Result, bail};
use chrono::Utc;
use std::{fs, path::Path};

use crate::config::SiteConfig;
use crate::content::{
    ContentPage, ContentStore, Hero, NavItem, PageKind, Region, Status,
};
use crate::log;
use crate::routes;

/// Default config filename
const CONFIG_FILE: &str = "regionpress.toml";

/// Create a new site with a config file and seed content.
pub fn new_site(config: &SiteConfig, has_name: bool) -> Result<()> {
    let root = config.get_root();

    // Safety check: if no name was provided (init in current dir),
    // the directory must be completely empty
    if !has_name && !is_dir_empty(root)? {
        bail!(
            "Current directory is not empty. Use `regionpress init <SITE_NAME>` to create in a subdirectory."
        );
    }

    fs::create_dir_all(root).with_context(|| format!("Failed to create {}", root.display()))?;
    init_default_config(root)?;
    init_seed_store(config)?;

    log!("init"; "created site at {}", root.display());
    Ok(())
}

/// Check if a directory is completely empty
fn is_dir_empty(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    Ok(fs::read_dir(path)?.next().is_none())
}

/// Write default configuration file
fn init_default_config(root: &Path) -> Result<()> {
    let content = toml::to_string_pretty(&SiteConfig::default())?;
    fs::write(root.join(CONFIG_FILE), content)?;
    Ok(())
}

/// Seed the content store with one page, nav and hero per region.
fn init_seed_store(config: &SiteConfig) -> Result<()> {
    let store = ContentStore::open(&config.data_path())?;

    for region in Region::ALL {
        let page = ContentPage {
            id: store.allocate_id(),
            region,
            href: "about".to_string(),
            label: "About Us".to_string(),
            body_html: "<p>Edit this page through the admin API.</p>".to_string(),
            kind: PageKind::Generic,
            status: Status::Published,
            updated_at: Utc::now(),
        };
        let about_href = routes::content_path(region, &page.href);
        store.upsert_page(page);

        store.upsert_nav_item(NavItem {
            id: store.allocate_id(),
            region,
            label: "Home".to_string(),
            href: routes::home_path(region).to_string(),
            order: 1,
        });
        store.upsert_nav_item(NavItem {
            id: store.allocate_id(),
            region,
            label: "About".to_string(),
            href: about_href,
            order: 2,
        });
        store.upsert_nav_item(NavItem {
            id: store.allocate_id(),
            region,
            label: "Blog".to_string(),
            href: routes::blog_listing_path(region).to_string(),
            order: 3,
        });

        store.upsert_hero(Hero {
            id: store.allocate_id(),
            region,
            page_href: String::new(),
            heading: "Welcome to your new site".to_string(),
            subheading: "Region-aware content, ready to edit.".to_string(),
            cta_label: None,
            cta_href: None,
        });
    }

    store.persist()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_store_has_both_regions() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SiteConfig::default();
        config.set_root(dir.path());

        init_seed_store(&config).unwrap();

        let store = ContentStore::open(&config.data_path()).unwrap();
        for region in Region::ALL {
            assert!(store.find_page(region, "about").is_some());
            assert_eq!(store.nav_items(region).len(), 3);
            assert!(store.hero_for(region, "").is_some());
        }
    }

    #[test]
    fn test_is_dir_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(is_dir_empty(dir.path()).unwrap());
        fs::write(dir.path().join("f"), "x").unwrap();
        assert!(!is_dir_empty(dir.path()).unwrap());
        assert!(is_dir_empty(&dir.path().join("missing")).unwrap());
    }
}
