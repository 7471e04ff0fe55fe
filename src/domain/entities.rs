//! Content records decoded from the remote store.
//!
//! Every record here is a read-only snapshot as of fetch time; the crate
//! never creates, mutates or deletes remote content. Slugs are unique
//! within their own collection only, so lookups are always scoped to one
//! collection.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// An image reference with its intrinsic dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// A full post record, including the pre-sanitized body markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub eyecatch: Option<ImageRef>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// The card-list projection of a post, as returned by filtered feed
/// queries. Timestamps stay optional because feeds project different
/// subsets depending on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub eyecatch: Option<ImageRef>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
}

/// The restricted projection used for the neighbor window: id, title and
/// slug only, a bandwidth trade-off separate from the full-record fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavSummary {
    pub id: String,
    pub title: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// The author profile. The store keeps a single record by convention;
/// consumers take the first record of a bounded query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub icon_image: ImageRef,
    pub introduction: String,
}
