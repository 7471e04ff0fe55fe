//! Prev/next navigation within the recency-sorted neighbor window.
//!
//! The window is a size-capped batch ordered by descending update time and
//! projected down to id, title and slug. Neighbors are defined only with
//! respect to this snapshot: a post that fell outside the window has no
//! computable neighbors, which is a degenerate result, not an error.

use serde::Serialize;

use super::entities::NavSummary;

/// Fixed cap on the neighbor window fetch.
pub const NEIGHBOR_WINDOW_LIMIT: u32 = 50;

/// A lightweight link to a neighboring post.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationRef {
    pub title: String,
    pub slug: String,
}

impl From<&NavSummary> for NavigationRef {
    fn from(entry: &NavSummary) -> Self {
        Self {
            title: entry.title.clone(),
            slug: entry.slug.clone(),
        }
    }
}

/// The resolved neighbors of one post, either of which may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostNeighbors {
    pub prev: Option<NavigationRef>,
    pub next: Option<NavigationRef>,
}

/// Compute the neighbors of `slug` within `window`.
///
/// `window` must be ordered by descending update time. A slug at the first
/// index has no `prev`; a slug at the last index has no `next`. A slug
/// absent from the window resolves like an index of `-1`: no `prev`, and
/// the newest entry becomes `next`. Never fails.
pub fn neighbors(window: &[NavSummary], slug: &str) -> PostNeighbors {
    match window.iter().position(|entry| entry.slug == slug) {
        Some(index) => PostNeighbors {
            prev: (index > 0).then(|| NavigationRef::from(&window[index - 1])),
            next: window.get(index + 1).map(NavigationRef::from),
        },
        None => PostNeighbors {
            prev: None,
            next: window.first().map(NavigationRef::from),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(slugs: &[&str]) -> Vec<NavSummary> {
        slugs
            .iter()
            .enumerate()
            .map(|(index, slug)| NavSummary {
                id: format!("id-{index}"),
                title: format!("Post {slug}"),
                slug: (*slug).to_string(),
            })
            .collect()
    }

    #[test]
    fn middle_entry_has_both_neighbors() {
        let snapshot = window(&["a", "b", "c"]);

        let result = neighbors(&snapshot, "b");
        assert_eq!(result.prev.as_ref().map(|nav| nav.slug.as_str()), Some("a"));
        assert_eq!(result.next.as_ref().map(|nav| nav.slug.as_str()), Some("c"));
    }

    #[test]
    fn first_entry_has_no_prev() {
        let snapshot = window(&["a", "b", "c"]);

        let result = neighbors(&snapshot, "a");
        assert_eq!(result.prev, None);
        assert_eq!(result.next.as_ref().map(|nav| nav.slug.as_str()), Some("b"));
    }

    #[test]
    fn last_entry_has_no_next() {
        let snapshot = window(&["a", "b", "c"]);

        let result = neighbors(&snapshot, "c");
        assert_eq!(result.prev.as_ref().map(|nav| nav.slug.as_str()), Some("b"));
        assert_eq!(result.next, None);
    }

    #[test]
    fn every_index_matches_its_window_neighbors() {
        let snapshot = window(&["a", "b", "c", "d", "e"]);

        for (index, entry) in snapshot.iter().enumerate() {
            let result = neighbors(&snapshot, &entry.slug);
            let expected_prev = (index > 0).then(|| snapshot[index - 1].slug.clone());
            let expected_next = snapshot.get(index + 1).map(|next| next.slug.clone());
            assert_eq!(result.prev.map(|nav| nav.slug), expected_prev);
            assert_eq!(result.next.map(|nav| nav.slug), expected_next);
        }
    }

    // A slug outside the window computes like index -1: no older neighbor
    // even though one may exist upstream, and the newest entry becomes
    // `next`. This mirrors the routing contract and must not be "fixed"
    // into a full scan here.
    #[test]
    fn absent_slug_resolves_to_newest_as_next() {
        let snapshot = window(&["a", "b", "c"]);

        let result = neighbors(&snapshot, "z");
        assert_eq!(result.prev, None);
        assert_eq!(result.next.as_ref().map(|nav| nav.slug.as_str()), Some("a"));
    }

    #[test]
    fn single_entry_window_has_no_neighbors() {
        let snapshot = window(&["only"]);

        let result = neighbors(&snapshot, "only");
        assert_eq!(result, PostNeighbors::default());
    }

    #[test]
    fn empty_window_never_fails() {
        let result = neighbors(&[], "anything");
        assert_eq!(result, PostNeighbors::default());
    }
}
