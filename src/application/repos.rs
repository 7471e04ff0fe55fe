//! The list-query contract against the remote content store.
//!
//! Everything the crate reads goes through one generic operation: list a
//! collection with an optional filter, sort directive, field projection
//! and result cap. The trait stays untyped (raw JSON pages) so it is
//! object-safe and the service layer can be exercised with in-memory
//! fixtures; [`ContentRepo`] adds the typed decode on top.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Collection names exposed by the content store.
pub mod collections {
    pub const POSTS: &str = "blogs";
    pub const CATEGORIES: &str = "categories";
    pub const TAGS: &str = "tags";
    pub const PROFILE: &str = "profile";
}

/// Transport-level failures reported by a [`ContentSource`].
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode response body: {0}")]
    Decode(String),
    #[error("invalid request URL: {0}")]
    Url(String),
}

impl SourceError {
    pub fn request(err: impl fmt::Display) -> Self {
        Self::Request(err.to_string())
    }

    pub fn decode(err: impl fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }

    pub fn url(err: impl fmt::Display) -> Self {
        Self::Url(err.to_string())
    }
}

/// A filter expression over a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpr {
    /// Exact match on a scalar field.
    Equals { field: &'static str, value: String },
    /// Membership test on an array-valued field.
    Contains { field: &'static str, value: String },
}

impl FilterExpr {
    pub fn equals(field: &'static str, value: impl Into<String>) -> Self {
        Self::Equals {
            field,
            value: value.into(),
        }
    }

    pub fn contains(field: &'static str, value: impl Into<String>) -> Self {
        Self::Contains {
            field,
            value: value.into(),
        }
    }
}

impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterExpr::Equals { field, value } => write!(f, "{field}[equals]{value}"),
            FilterExpr::Contains { field, value } => write!(f, "{field}[contains]{value}"),
        }
    }
}

/// A sort directive; descending order carries a leading `-` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending(&'static str),
    Descending(&'static str),
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Ascending(field) => write!(f, "{field}"),
            SortOrder::Descending(field) => write!(f, "-{field}"),
        }
    }
}

/// Query parameters accepted by the list endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    filter: Option<FilterExpr>,
    order: Option<SortOrder>,
    fields: Option<&'static [&'static str]>,
    limit: Option<u32>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: FilterExpr) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = Some(order);
        self
    }

    pub fn fields(mut self, fields: &'static [&'static str]) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Canonical query pairs, in stable order, as the wire protocol
    /// expects them.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(filter) = &self.filter {
            pairs.push(("filters", filter.to_string()));
        }
        if let Some(order) = &self.order {
            pairs.push(("orders", order.to_string()));
        }
        if let Some(fields) = self.fields {
            pairs.push(("fields", fields.join(",")));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }

    /// Stable textual form, used as a cache key component.
    pub fn canonical(&self) -> String {
        self.to_pairs()
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// One page of records returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage<T> {
    pub contents: Vec<T>,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub limit: u64,
}

/// A remote store of record collections reachable through the generic
/// list operation.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn list_raw(
        &self,
        collection: &str,
        query: &ListQuery,
    ) -> Result<serde_json::Value, SourceError>;
}

/// Typed access over a [`ContentSource`].
#[derive(Clone)]
pub struct ContentRepo {
    source: Arc<dyn ContentSource>,
}

impl ContentRepo {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self { source }
    }

    pub async fn list<T>(
        &self,
        collection: &str,
        query: &ListQuery,
    ) -> Result<ListPage<T>, SourceError>
    where
        T: DeserializeOwned,
    {
        let raw = self.source.list_raw(collection, query).await?;
        serde_json::from_value(raw).map_err(SourceError::decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_render_the_bracket_syntax() {
        assert_eq!(
            FilterExpr::equals("slug", "hello-world").to_string(),
            "slug[equals]hello-world"
        );
        assert_eq!(
            FilterExpr::contains("tags", "t1").to_string(),
            "tags[contains]t1"
        );
    }

    #[test]
    fn descending_sort_carries_a_leading_dash() {
        assert_eq!(SortOrder::Descending("updatedAt").to_string(), "-updatedAt");
        assert_eq!(SortOrder::Ascending("updatedAt").to_string(), "updatedAt");
    }

    #[test]
    fn pairs_keep_a_stable_order() {
        let query = ListQuery::new()
            .limit(50)
            .order(SortOrder::Descending("updatedAt"))
            .fields(&["id", "title", "slug"])
            .filter(FilterExpr::equals("slug", "a"));

        assert_eq!(
            query.to_pairs(),
            vec![
                ("filters", "slug[equals]a".to_string()),
                ("orders", "-updatedAt".to_string()),
                ("fields", "id,title,slug".to_string()),
                ("limit", "50".to_string()),
            ]
        );
    }

    #[test]
    fn canonical_form_is_deterministic() {
        let query = ListQuery::new()
            .fields(&["id", "slug"])
            .limit(5)
            .filter(FilterExpr::contains("tags", "t1"));

        assert_eq!(
            query.canonical(),
            "filters=tags[contains]t1&fields=id,slug&limit=5"
        );
        assert_eq!(ListQuery::new().canonical(), "");
    }
}
