//! Paging data model.
//!
//! A paged list is loaded one [`Page`] at a time. Each load is described by a
//! [`PageRequest`] whose `key` is `None` for the first page. The key type is
//! opaque to the engine apart from the ordering operations on [`PageKey`].

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

// ============================================================================
// Page Key
// ============================================================================

/// An ordered page key with checked neighbours.
///
/// `successor`/`predecessor` are used only when recomputing a refresh key;
/// they return `None` instead of overflowing.
pub trait PageKey: Copy + Ord + Debug + Send + Sync + 'static {
    /// Returns the next key, or `None` on overflow.
    fn successor(self) -> Option<Self>;

    /// Returns the previous key, or `None` on underflow.
    fn predecessor(self) -> Option<Self>;
}

macro_rules! impl_page_key {
    ($($ty:ty),*) => {
        $(
            impl PageKey for $ty {
                fn successor(self) -> Option<Self> {
                    self.checked_add(1)
                }

                fn predecessor(self) -> Option<Self> {
                    self.checked_sub(1)
                }
            }
        )*
    };
}

impl_page_key!(u32, u64, usize);

// ============================================================================
// Request / Page
// ============================================================================

/// Which end of the loaded window a load extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadDirection {
    /// Initial load, or reload after invalidation.
    Refresh,
    /// Load before the first loaded page.
    Prepend,
    /// Load after the last loaded page.
    Append,
}

/// Parameters of a single page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest<K> {
    /// Page key. `None` means the first page.
    pub key: Option<K>,
    /// Requested number of items.
    pub load_size: u32,
    /// What kind of load this is.
    pub direction: LoadDirection,
}

impl<K> PageRequest<K> {
    /// Request for the first page.
    pub fn first(load_size: u32) -> Self {
        Self {
            key: None,
            load_size,
            direction: LoadDirection::Refresh,
        }
    }

    /// Request for the page at `key`.
    pub fn at(key: Option<K>, load_size: u32, direction: LoadDirection) -> Self {
        Self {
            key,
            load_size,
            direction,
        }
    }
}

/// A loaded page.
///
/// `prev_key` is `None` only for the first page and `next_key` is `None` only
/// for the last one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<K, T> {
    /// Items in provider order.
    pub items: Vec<T>,
    /// Key of the preceding page.
    pub prev_key: Option<K>,
    /// Key of the following page.
    pub next_key: Option<K>,
}

impl<K, T> Page<K, T> {
    /// Creates a page.
    pub fn new(items: Vec<T>, prev_key: Option<K>, next_key: Option<K>) -> Self {
        Self {
            items,
            prev_key,
            next_key,
        }
    }

    /// An empty terminal page with no neighbours.
    pub fn empty() -> Self {
        Self::new(Vec::new(), None, None)
    }

    /// Returns true if this is the last page.
    pub fn is_last(&self) -> bool {
        self.next_key.is_none()
    }
}

// ============================================================================
// Paging State
// ============================================================================

/// Snapshot of the loaded pages and the visible anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagingState<K, T> {
    /// Loaded pages in order.
    pub pages: Vec<Page<K, T>>,
    /// Index (across all loaded items) of the most recently visible item.
    pub anchor_position: Option<usize>,
}

impl<K, T> PagingState<K, T> {
    /// Creates a paging state.
    pub fn new(pages: Vec<Page<K, T>>, anchor_position: Option<usize>) -> Self {
        Self {
            pages,
            anchor_position,
        }
    }

    /// Total loaded items.
    pub fn item_count(&self) -> usize {
        self.pages.iter().map(|page| page.items.len()).sum()
    }

    /// Returns the page containing `position`.
    ///
    /// Positions past the loaded window resolve to the last page.
    pub fn closest_page_to_position(&self, position: usize) -> Option<&Page<K, T>> {
        let mut remaining = position;
        for page in &self.pages {
            if remaining < page.items.len() {
                return Some(page);
            }
            remaining -= page.items.len();
        }
        self.pages.last()
    }
}

impl<K: PageKey, T> PagingState<K, T> {
    /// Derives the key to resume loading around the anchor after invalidation.
    ///
    /// Returns `closest.prev_key + 1`, else `closest.next_key - 1`. `None`
    /// restarts from the first page, which is also the result for an
    /// unanchored state or a key that would overflow.
    pub fn refresh_key(&self) -> Option<K> {
        let anchor = self.anchor_position?;
        let page = self.closest_page_to_position(anchor)?;
        match page.prev_key {
            Some(prev) => prev.successor(),
            None => page.next_key.and_then(PageKey::predecessor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(items: Vec<u8>, prev: Option<u32>, next: Option<u32>) -> Page<u32, u8> {
        Page::new(items, prev, next)
    }

    #[test]
    fn test_refresh_key_from_previous_key() {
        let state = PagingState::new(vec![page(vec![1, 2], Some(20), Some(60))], Some(0));
        assert_eq!(state.refresh_key(), Some(21));
    }

    #[test]
    fn test_refresh_key_from_next_key_on_first_page() {
        let state = PagingState::new(vec![page(vec![1, 2], None, Some(20))], Some(1));
        assert_eq!(state.refresh_key(), Some(19));
    }

    #[test]
    fn test_refresh_key_without_anchor() {
        let state = PagingState::new(vec![page(vec![1], None, Some(20))], None);
        assert_eq!(state.refresh_key(), None);
    }

    #[test]
    fn test_refresh_key_single_terminal_page() {
        let state = PagingState::new(vec![page(vec![1], None, None)], Some(0));
        assert_eq!(state.refresh_key(), None);
    }

    #[test]
    fn test_refresh_key_does_not_underflow() {
        let state = PagingState::new(vec![page(vec![1], None, Some(0))], Some(0));
        assert_eq!(state.refresh_key(), None);
    }

    #[test]
    fn test_closest_page_walks_item_counts() {
        let state = PagingState::new(
            vec![
                page(vec![1, 2], None, Some(2)),
                page(vec![3, 4], Some(0), Some(4)),
                page(vec![5], Some(2), None),
            ],
            Some(3),
        );
        assert_eq!(state.closest_page_to_position(3).unwrap().items, vec![3, 4]);
        assert_eq!(state.closest_page_to_position(4).unwrap().items, vec![5]);
        assert_eq!(state.closest_page_to_position(99).unwrap().items, vec![5]);
        assert_eq!(state.refresh_key(), Some(1));
        assert_eq!(state.item_count(), 5);
    }

    #[test]
    fn test_page_key_bounds() {
        assert_eq!(u32::MAX.successor(), None);
        assert_eq!(0usize.predecessor(), None);
        assert_eq!(5u64.successor(), Some(6));
    }
}
