//! The sitemap listing: fixed pages plus the category and tag indexes.

use serde::Serialize;
use tracing::error;

use crate::domain::entities::{Category, Tag};

use super::catalog::ContentService;
use super::error::ContentError;

/// Fixed pages always present on the sitemap, as (label, path) pairs.
pub const FIXED_PAGES: &[(&str, &str)] = &[("ホーム", "/")];

/// The assembled sitemap. A section is `None` when its fetch failed; the
/// caller renders a localized fallback for that section only.
#[derive(Debug, Clone, Serialize)]
pub struct Sitemap {
    pub categories: Option<Vec<Category>>,
    pub tags: Option<Vec<Tag>>,
}

/// Fetch both indexes concurrently; each section degrades independently.
pub async fn sitemap(service: &ContentService) -> Sitemap {
    let (categories, tags) = tokio::join!(service.categories(), service.tags());
    Sitemap {
        categories: section(categories, "categories"),
        tags: section(tags, "tags"),
    }
}

fn section<T>(result: Result<Vec<T>, ContentError>, what: &'static str) -> Option<Vec<T>> {
    match result {
        Ok(items) => Some(items),
        Err(err) => {
            error!(section = what, error = %err, "sitemap section fetch failed");
            None
        }
    }
}
