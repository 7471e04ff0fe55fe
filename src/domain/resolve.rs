//! Slug resolution against fetched snapshots.
//!
//! Requested slugs arrive percent-encoded from the routing layer and are
//! decoded before comparison. Resolution is a linear scan over a bounded
//! snapshot; the first match wins and duplicates are assumed not to occur.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

use super::entities::{Category, NavSummary, Post, PostSummary, Tag};

/// Anything addressable by a slug within its own collection.
pub trait Slugged {
    fn slug(&self) -> &str;
}

impl Slugged for Post {
    fn slug(&self) -> &str {
        &self.slug
    }
}

impl Slugged for PostSummary {
    fn slug(&self) -> &str {
        &self.slug
    }
}

impl Slugged for NavSummary {
    fn slug(&self) -> &str {
        &self.slug
    }
}

impl Slugged for Category {
    fn slug(&self) -> &str {
        &self.slug
    }
}

impl Slugged for Tag {
    fn slug(&self) -> &str {
        &self.slug
    }
}

/// Percent-decode a requested slug. Sequences that do not decode to valid
/// UTF-8 fall back to the raw input unchanged.
pub fn decode_slug(raw: &str) -> Cow<'_, str> {
    match percent_decode_str(raw).decode_utf8() {
        Ok(decoded) => decoded,
        Err(_) => Cow::Borrowed(raw),
    }
}

/// Find the first entity whose slug equals the (decoded) target.
///
/// Absence is `None`, never an error: downstream consumers render a
/// localized fallback instead of failing the page.
pub fn find_by_slug<'a, T: Slugged>(snapshot: &'a [T], target: &str) -> Option<&'a T> {
    let decoded = decode_slug(target);
    snapshot
        .iter()
        .find(|entity| entity.slug() == decoded.as_ref())
}
