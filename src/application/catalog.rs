//! Content operations backing the public pages.
//!
//! Every operation here is a read against the remote list endpoint. The
//! fetches of one logical page are independent: when one fails only its
//! slice of the page degrades, siblings are unaffected.

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::domain::entities::{Category, NavSummary, Post, PostSummary, Profile, Tag};
use crate::domain::navigation::{self, NEIGHBOR_WINDOW_LIMIT, NavigationRef};
use crate::domain::resolve;

use super::error::ContentError;
use super::repos::{ContentRepo, FilterExpr, ListQuery, SortOrder, collections};

/// Result caps used by the public pages.
pub const PROFILE_LIMIT: u32 = 3;
pub const CATEGORY_LIMIT: u32 = 5;
pub const TAG_LIMIT: u32 = 50;
pub const TAG_ENUMERATION_LIMIT: u32 = 100;
pub const POST_FEED_LIMIT: u32 = 50;

/// A full post together with its resolved neighbor references.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostWithNavigation {
    pub post: Post,
    pub prev: Option<NavigationRef>,
    pub next: Option<NavigationRef>,
}

/// Posts filed under one category. `category` is `None` when the slug did
/// not resolve, which leaves the feed empty but is not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryFeed {
    pub category: Option<Category>,
    pub posts: Vec<PostSummary>,
}

/// Posts carrying one tag; same degradation contract as [`CategoryFeed`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagFeed {
    pub tag: Option<Tag>,
    pub posts: Vec<PostSummary>,
}

#[derive(Debug, Deserialize)]
struct SlugRecord {
    slug: String,
}

/// Typed content operations over the list-query adapter.
#[derive(Clone)]
pub struct ContentService {
    repo: ContentRepo,
}

impl ContentService {
    pub fn new(repo: ContentRepo) -> Self {
        Self { repo }
    }

    /// The author profile: the store keeps a single record, so this takes
    /// the first entry of a bounded query.
    pub async fn profile(&self) -> Result<Profile, ContentError> {
        let page = self
            .repo
            .list::<Profile>(collections::PROFILE, &ListQuery::new().limit(PROFILE_LIMIT))
            .await?;
        page.contents
            .into_iter()
            .next()
            .ok_or(ContentError::NotFound)
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ContentError> {
        let page = self
            .repo
            .list(
                collections::CATEGORIES,
                &ListQuery::new().limit(CATEGORY_LIMIT),
            )
            .await?;
        Ok(page.contents)
    }

    pub async fn tags(&self) -> Result<Vec<Tag>, ContentError> {
        let page = self
            .repo
            .list(collections::TAGS, &ListQuery::new().limit(TAG_LIMIT))
            .await?;
        Ok(page.contents)
    }

    /// Fetch one post by slug together with its prev/next neighbors.
    ///
    /// The current post comes from an equality-filtered fetch of the full
    /// record. The neighbors come from a separate, capped, recency-sorted
    /// window projected to id/title/slug — a bandwidth trade-off that also
    /// bounds which posts have computable neighbors.
    pub async fn post_with_navigation(&self, slug: &str) -> Result<PostWithNavigation, ContentError> {
        let decoded = resolve::decode_slug(slug);

        let current = self
            .repo
            .list::<Post>(
                collections::POSTS,
                &ListQuery::new().filter(FilterExpr::equals("slug", decoded.as_ref())),
            )
            .await?;
        let post = current
            .contents
            .into_iter()
            .next()
            .ok_or(ContentError::NotFound)?;

        let window = self
            .repo
            .list::<NavSummary>(
                collections::POSTS,
                &ListQuery::new()
                    .fields(&["id", "title", "slug"])
                    .order(SortOrder::Descending("updatedAt"))
                    .limit(NEIGHBOR_WINDOW_LIMIT),
            )
            .await?;

        let neighbors = navigation::neighbors(&window.contents, &post.slug);
        Ok(PostWithNavigation {
            post,
            prev: neighbors.prev,
            next: neighbors.next,
        })
    }

    /// Posts filed under the category with the given slug. An unknown
    /// category yields an empty feed rather than an error.
    pub async fn posts_by_category(&self, slug: &str) -> Result<CategoryFeed, ContentError> {
        let categories = self.categories().await?;
        let Some(category) = resolve::find_by_slug(&categories, slug).cloned() else {
            return Ok(CategoryFeed {
                category: None,
                posts: Vec::new(),
            });
        };

        let page = self
            .repo
            .list(
                collections::POSTS,
                &ListQuery::new()
                    .limit(POST_FEED_LIMIT)
                    .filter(FilterExpr::equals("categories", category.id.as_str())),
            )
            .await?;
        Ok(CategoryFeed {
            category: Some(category),
            posts: page.contents,
        })
    }

    /// Posts carrying the tag with the given slug. An unknown tag yields
    /// an empty feed rather than an error.
    pub async fn posts_by_tag(&self, slug: &str) -> Result<TagFeed, ContentError> {
        let tags = self
            .repo
            .list::<Tag>(
                collections::TAGS,
                &ListQuery::new().limit(TAG_ENUMERATION_LIMIT),
            )
            .await?;
        let Some(tag) = resolve::find_by_slug(&tags.contents, slug).cloned() else {
            return Ok(TagFeed {
                tag: None,
                posts: Vec::new(),
            });
        };

        let page = self
            .repo
            .list(
                collections::POSTS,
                &ListQuery::new()
                    .limit(POST_FEED_LIMIT)
                    .filter(FilterExpr::contains("tags", tag.id.as_str())),
            )
            .await?;
        Ok(TagFeed {
            tag: Some(tag),
            posts: page.contents,
        })
    }

    /// Slugs of every post, for route pre-enumeration.
    pub async fn post_slugs(&self) -> Vec<String> {
        self.collect_slugs(collections::POSTS, ListQuery::new()).await
    }

    /// Slugs of every category, for route pre-enumeration.
    pub async fn category_slugs(&self) -> Vec<String> {
        self.collect_slugs(
            collections::CATEGORIES,
            ListQuery::new().limit(CATEGORY_LIMIT),
        )
        .await
    }

    /// Slugs of every tag, for route pre-enumeration.
    pub async fn tag_slugs(&self) -> Vec<String> {
        self.collect_slugs(
            collections::TAGS,
            ListQuery::new().limit(TAG_ENUMERATION_LIMIT),
        )
        .await
    }

    // Enumeration degrades to an empty list: a flaky upstream must never
    // abort route generation, it only narrows the prebuilt set.
    async fn collect_slugs(&self, collection: &'static str, query: ListQuery) -> Vec<String> {
        match self.repo.list::<SlugRecord>(collection, &query).await {
            Ok(page) => page
                .contents
                .into_iter()
                .map(|record| record.slug)
                .collect(),
            Err(err) => {
                error!(collection, error = %err, "slug enumeration failed, emitting no routes");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::{Value, json};

    use crate::application::repos::{ContentSource, SourceError};

    use super::*;

    /// In-memory stand-in for the remote store, keyed by collection and
    /// canonical query string.
    #[derive(Default)]
    struct FixtureSource {
        pages: HashMap<(String, String), Value>,
        offline: HashSet<String>,
    }

    impl FixtureSource {
        fn with(mut self, collection: &str, canonical: &str, contents: Value) -> Self {
            self.pages.insert(
                (collection.to_string(), canonical.to_string()),
                json!({ "contents": contents, "totalCount": 0, "offset": 0, "limit": 10 }),
            );
            self
        }

        fn offline(mut self, collection: &str) -> Self {
            self.offline.insert(collection.to_string());
            self
        }

        fn into_service(self) -> ContentService {
            ContentService::new(ContentRepo::new(Arc::new(self)))
        }
    }

    #[async_trait]
    impl ContentSource for FixtureSource {
        async fn list_raw(
            &self,
            collection: &str,
            query: &ListQuery,
        ) -> Result<Value, SourceError> {
            if self.offline.contains(collection) {
                return Err(SourceError::request("fixture offline"));
            }
            self.pages
                .get(&(collection.to_string(), query.canonical()))
                .cloned()
                .ok_or_else(|| {
                    SourceError::request(format!(
                        "no fixture for {collection}?{}",
                        query.canonical()
                    ))
                })
        }
    }

    fn post_json(slug: &str) -> Value {
        json!({
            "id": format!("id-{slug}"),
            "slug": slug,
            "title": format!("Post {slug}"),
            "body": "<p>本文</p>",
            "updatedAt": "2024-05-01T12:00:00.000Z",
            "publishedAt": "2024-04-30T09:00:00.000Z",
        })
    }

    fn nav_json(slug: &str) -> Value {
        json!({
            "id": format!("id-{slug}"),
            "title": format!("Post {slug}"),
            "slug": slug,
        })
    }

    const WINDOW_QUERY: &str = "orders=-updatedAt&fields=id,title,slug&limit=50";

    #[tokio::test]
    async fn post_with_navigation_resolves_both_neighbors() {
        let service = FixtureSource::default()
            .with("blogs", "filters=slug[equals]b", json!([post_json("b")]))
            .with(
                "blogs",
                WINDOW_QUERY,
                json!([nav_json("a"), nav_json("b"), nav_json("c")]),
            )
            .into_service();

        let resolved = service.post_with_navigation("b").await.expect("post");
        assert_eq!(resolved.post.slug, "b");
        assert_eq!(resolved.prev.map(|nav| nav.slug), Some("a".to_string()));
        assert_eq!(resolved.next.map(|nav| nav.slug), Some("c".to_string()));
    }

    #[tokio::test]
    async fn newest_post_has_no_prev() {
        let service = FixtureSource::default()
            .with("blogs", "filters=slug[equals]a", json!([post_json("a")]))
            .with(
                "blogs",
                WINDOW_QUERY,
                json!([nav_json("a"), nav_json("b"), nav_json("c")]),
            )
            .into_service();

        let resolved = service.post_with_navigation("a").await.expect("post");
        assert_eq!(resolved.prev, None);
        assert_eq!(resolved.next.map(|nav| nav.slug), Some("b".to_string()));
    }

    #[tokio::test]
    async fn post_outside_window_gets_degenerate_neighbors() {
        // "z" exists as a record but fell outside the capped window, so the
        // adjacency computation sees an absent slug.
        let service = FixtureSource::default()
            .with("blogs", "filters=slug[equals]z", json!([post_json("z")]))
            .with(
                "blogs",
                WINDOW_QUERY,
                json!([nav_json("a"), nav_json("b"), nav_json("c")]),
            )
            .into_service();

        let resolved = service.post_with_navigation("z").await.expect("post");
        assert_eq!(resolved.prev, None);
        assert_eq!(resolved.next.map(|nav| nav.slug), Some("a".to_string()));
    }

    #[tokio::test]
    async fn percent_encoded_slug_filters_on_the_decoded_form() {
        let service = FixtureSource::default()
            .with(
                "blogs",
                "filters=slug[equals]日本",
                json!([post_json("日本")]),
            )
            .with("blogs", WINDOW_QUERY, json!([nav_json("日本")]))
            .into_service();

        let resolved = service
            .post_with_navigation("%E6%97%A5%E6%9C%AC")
            .await
            .expect("post");
        assert_eq!(resolved.post.slug, "日本");
    }

    #[tokio::test]
    async fn missing_post_reports_not_found() {
        let service = FixtureSource::default()
            .with("blogs", "filters=slug[equals]ghost", json!([]))
            .into_service();

        let err = service
            .post_with_navigation("ghost")
            .await
            .expect_err("absent post");
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn transport_failure_is_not_conflated_with_not_found() {
        let service = FixtureSource::default().offline("blogs").into_service();

        let err = service
            .post_with_navigation("anything")
            .await
            .expect_err("offline source");
        assert!(matches!(err, ContentError::Source(_)));
    }

    #[tokio::test]
    async fn profile_takes_the_first_record() {
        let service = FixtureSource::default()
            .with(
                "profile",
                "limit=3",
                json!([
                    {
                        "id": "p1",
                        "name": "Yuma",
                        "iconImage": { "url": "https://img.example/icon.png", "width": 80, "height": 80 },
                        "introduction": "旅の記録を書いています。"
                    },
                    {
                        "id": "p2",
                        "name": "Ghost",
                        "iconImage": { "url": "https://img.example/ghost.png", "width": 80, "height": 80 },
                        "introduction": "unused"
                    }
                ]),
            )
            .into_service();

        let profile = service.profile().await.expect("profile");
        assert_eq!(profile.id, "p1");
        assert_eq!(profile.name, "Yuma");
    }

    #[tokio::test]
    async fn empty_profile_collection_is_not_found() {
        let service = FixtureSource::default()
            .with("profile", "limit=3", json!([]))
            .into_service();

        assert!(service.profile().await.expect_err("empty").is_not_found());
    }

    #[tokio::test]
    async fn tag_feed_filters_posts_by_the_resolved_tag_id() {
        let service = FixtureSource::default()
            .with(
                "tags",
                "limit=100",
                json!([
                    { "id": "t1", "name": "旅行", "slug": "travel" },
                    { "id": "t2", "name": "Rust", "slug": "rust" },
                ]),
            )
            .with(
                "blogs",
                "filters=tags[contains]t2&limit=50",
                json!([post_json("rust-intro")]),
            )
            .into_service();

        let feed = service.posts_by_tag("rust").await.expect("feed");
        assert_eq!(feed.tag.map(|tag| tag.id), Some("t2".to_string()));
        assert_eq!(feed.posts.len(), 1);
        assert_eq!(feed.posts[0].slug, "rust-intro");
    }

    #[tokio::test]
    async fn unknown_tag_slug_yields_an_empty_feed() {
        let service = FixtureSource::default()
            .with(
                "tags",
                "limit=100",
                json!([{ "id": "t1", "name": "旅行", "slug": "travel" }]),
            )
            .into_service();

        let feed = service.posts_by_tag("cooking").await.expect("feed");
        assert_eq!(feed.tag, None);
        assert!(feed.posts.is_empty());
    }

    #[tokio::test]
    async fn category_feed_uses_an_equality_filter() {
        let service = FixtureSource::default()
            .with(
                "categories",
                "limit=5",
                json!([{ "id": "c1", "name": "国内", "slug": "domestic" }]),
            )
            .with(
                "blogs",
                "filters=categories[equals]c1&limit=50",
                json!([post_json("kyoto"), post_json("nara")]),
            )
            .into_service();

        let feed = service.posts_by_category("domestic").await.expect("feed");
        assert_eq!(feed.category.map(|category| category.id), Some("c1".to_string()));
        assert_eq!(feed.posts.len(), 2);
    }

    #[tokio::test]
    async fn slug_enumeration_degrades_to_empty_on_failure() {
        let service = FixtureSource::default()
            .offline("blogs")
            .with(
                "tags",
                "limit=100",
                json!([{ "id": "t1", "name": "旅行", "slug": "travel" }]),
            )
            .into_service();

        assert!(service.post_slugs().await.is_empty());
        assert_eq!(service.tag_slugs().await, vec!["travel".to_string()]);
    }
}
