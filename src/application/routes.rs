//! Build-time enumeration of the dynamic route sets.
//!
//! The static router needs every post, category and tag slug ahead of a
//! build. The three enumerations are independent and issued concurrently;
//! a failed one contributes no paths instead of aborting the build.

use serde::Serialize;

use super::catalog::ContentService;

/// Every path the static router must prebuild.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoutePlan {
    pub posts: Vec<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
}

impl RoutePlan {
    /// Concrete paths: the dynamic sets followed by the static sitemap
    /// page.
    pub fn paths(&self) -> Vec<String> {
        let mut paths =
            Vec::with_capacity(self.posts.len() + self.categories.len() + self.tags.len() + 1);
        paths.extend(self.posts.iter().map(|slug| format!("/blog/{slug}")));
        paths.extend(self.categories.iter().map(|slug| format!("/categories/{slug}")));
        paths.extend(self.tags.iter().map(|slug| format!("/tags/{slug}")));
        paths.push("/sitemap".to_string());
        paths
    }
}

/// Enumerate all dynamic routes from the content store.
pub async fn route_plan(service: &ContentService) -> RoutePlan {
    let (posts, categories, tags) = tokio::join!(
        service.post_slugs(),
        service.category_slugs(),
        service.tag_slugs(),
    );
    RoutePlan {
        posts,
        categories,
        tags,
    }
}
