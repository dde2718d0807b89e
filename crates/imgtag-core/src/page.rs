//! # Page Slicer
//!
//! Offset/limit windowing over ordered sequences.
//!
//! A page number is 1-based. Only integers `>= 1` are valid pages; anything
//! else is treated as "no page" and resolved by the route's `PagePolicy`.

use serde::{Deserialize, Serialize};

/// What a route does when no valid page number was supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PagePolicy {
    /// No page means the first page.
    FirstPage,
    /// No page means the full, unpaginated sequence.
    All,
}

/// The offset/limit pair used to slice one page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    /// Number of leading items to skip.
    pub offset: usize,
    /// Maximum number of items to return. `None` means unbounded.
    pub limit: Option<usize>,
}

impl PageWindow {
    /// Window for a 1-based page of `page_size` items.
    ///
    /// `page` of `None` yields the window the policy prescribes.
    #[must_use]
    pub fn for_page(page: Option<u64>, page_size: usize, policy: PagePolicy) -> Self {
        match page.filter(|&p| p >= 1) {
            Some(p) => {
                let index = usize::try_from(p - 1).unwrap_or(usize::MAX);
                Self {
                    offset: index.saturating_mul(page_size),
                    limit: Some(page_size),
                }
            }
            None => match policy {
                PagePolicy::FirstPage => Self {
                    offset: 0,
                    limit: Some(page_size),
                },
                PagePolicy::All => Self {
                    offset: 0,
                    limit: None,
                },
            },
        }
    }

    /// Exclusive end index of the window over a sequence of `len` items.
    #[must_use]
    pub fn end(&self, len: usize) -> usize {
        match self.limit {
            Some(limit) => self.offset.saturating_add(limit).min(len),
            None => len,
        }
    }
}

/// Parse a raw page segment (e.g. the trailing path segment).
///
/// Returns `None` unless the segment is a positive integer.
#[must_use]
pub fn parse_page(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|&p| p >= 1)
}

/// Return the slice of `items` covered by `window`.
///
/// A window starting past the end yields an empty vector, not an error.
#[must_use]
pub fn slice<T: Clone>(items: &[T], window: PageWindow) -> Vec<T> {
    if window.offset >= items.len() {
        return Vec::new();
    }
    items[window.offset..window.end(items.len())].to_vec()
}

/// Owned variant of [`slice`] that avoids cloning.
#[must_use]
pub fn slice_owned<T>(items: Vec<T>, window: PageWindow) -> Vec<T> {
    let end = window.end(items.len());
    items
        .into_iter()
        .skip(window.offset)
        .take(end.saturating_sub(window.offset))
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_two_of_forty_over_forty_five_items() {
        let items: Vec<u32> = (0..45).collect();
        let window = PageWindow::for_page(Some(2), 40, PagePolicy::FirstPage);
        assert_eq!(window.offset, 40);
        assert_eq!(slice(&items, window), vec![40, 41, 42, 43, 44]);
    }

    #[test]
    fn page_past_end_is_empty() {
        let items: Vec<u32> = (0..10).collect();
        let window = PageWindow::for_page(Some(3), 5, PagePolicy::FirstPage);
        assert!(slice(&items, window).is_empty());
    }

    #[test]
    fn missing_page_first_page_policy() {
        let items: Vec<u32> = (0..100).collect();
        let window = PageWindow::for_page(None, 40, PagePolicy::FirstPage);
        assert_eq!(slice(&items, window).len(), 40);
    }

    #[test]
    fn missing_page_all_policy() {
        let items: Vec<u32> = (0..100).collect();
        let window = PageWindow::for_page(None, 40, PagePolicy::All);
        assert_eq!(slice(&items, window).len(), 100);
    }

    #[test]
    fn zero_page_is_treated_as_missing() {
        let window = PageWindow::for_page(Some(0), 40, PagePolicy::FirstPage);
        assert_eq!(window.offset, 0);
        assert_eq!(window.limit, Some(40));
    }

    #[test]
    fn parse_page_accepts_positive_integers_only() {
        assert_eq!(parse_page("3"), Some(3));
        assert_eq!(parse_page("0"), None);
        assert_eq!(parse_page("-1"), None);
        assert_eq!(parse_page("tags-data"), None);
        assert_eq!(parse_page(""), None);
    }

    #[test]
    fn huge_page_does_not_overflow() {
        let window = PageWindow::for_page(Some(u64::MAX), 60, PagePolicy::FirstPage);
        let items = vec![1, 2, 3];
        assert!(slice(&items, window).is_empty());
        assert!(slice_owned(items, window).is_empty());
    }

    #[test]
    fn slice_owned_matches_slice() {
        let items: Vec<u32> = (0..45).collect();
        let window = PageWindow::for_page(Some(2), 20, PagePolicy::FirstPage);
        assert_eq!(slice_owned(items.clone(), window), slice(&items, window));
    }
}
