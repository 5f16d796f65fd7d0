//! Truncation and paging of ordered results.

/// Returns the first `n` items.
///
/// `n == 0` yields nothing; `n` past the end yields everything.
///
/// ```
/// use opsdeck_query::take_first;
///
/// let ids = [1, 2, 3, 4, 5];
/// assert_eq!(take_first(&ids, 3), vec![1, 2, 3]);
/// assert!(take_first(&ids, 0).is_empty());
/// assert_eq!(take_first(&ids, 1000).len(), 5);
/// ```
pub fn take_first<T: Clone>(items: &[T], n: usize) -> Vec<T> {
    items[..n.min(items.len())].to_vec()
}

/// One page of an ordered result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Zero-based index of this page.
    pub page_index: usize,
    /// Requested page size.
    pub page_size: usize,
    /// Number of items across all pages.
    pub total: usize,
    /// Number of pages.
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Returns `true` if a later page has items.
    pub fn has_next(&self) -> bool {
        self.page_index.saturating_add(1) < self.total_pages
    }

    /// Returns `true` if an earlier page has items.
    pub fn has_previous(&self) -> bool {
        self.page_index > 0 && self.total_pages > 0
    }

    /// Returns `true` if this page has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Cuts page `page_index` (zero-based) of size `page_size` out of `items`.
///
/// A zero page size gives an empty page and zero pages. A page index past
/// the end gives an empty page with the real totals.
pub fn paginate<T: Clone>(items: &[T], page_size: usize, page_index: usize) -> Page<T> {
    let total = items.len();
    if page_size == 0 {
        return Page {
            items: Vec::new(),
            page_index,
            page_size,
            total,
            total_pages: 0,
        };
    }

    let total_pages = total.div_ceil(page_size);
    let start = page_index.saturating_mul(page_size).min(total);
    let end = start.saturating_add(page_size).min(total);

    Page {
        items: items[start..end].to_vec(),
        page_index,
        page_size,
        total,
        total_pages,
    }
}

/// Skips `offset` items, then keeps at most `limit`.
pub(crate) fn window<T>(items: Vec<T>, offset: usize, limit: Option<usize>) -> Vec<T> {
    if offset == 0 && limit.map_or(true, |n| n >= items.len()) {
        return items;
    }
    items
        .into_iter()
        .skip(offset)
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_first_bounds() {
        let items = vec!["a", "b", "c", "d", "e"];
        assert!(take_first(&items, 0).is_empty());
        assert_eq!(take_first(&items, 2), vec!["a", "b"]);
        assert_eq!(take_first(&items, 1000), items);
        assert!(take_first::<u8>(&[], 3).is_empty());
    }

    #[test]
    fn paginate_middle_page() {
        let items: Vec<u32> = (1..=7).collect();
        let page = paginate(&items, 3, 1);
        assert_eq!(page.items, vec![4, 5, 6]);
        assert_eq!(page.total, 7);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn paginate_last_partial_page() {
        let items: Vec<u32> = (1..=7).collect();
        let page = paginate(&items, 3, 2);
        assert_eq!(page.items, vec![7]);
        assert!(!page.has_next());
    }

    #[test]
    fn paginate_past_the_end() {
        let items: Vec<u32> = (1..=7).collect();
        let page = paginate(&items, 3, 9);
        assert!(page.is_empty());
        assert_eq!(page.total_pages, 3);
        assert!(!page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn paginate_at_the_largest_index() {
        let page = paginate(&[1, 2, 3], 2, usize::MAX);
        assert!(page.is_empty());
        assert_eq!(page.total_pages, 2);
        assert!(!page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn paginate_zero_page_size() {
        let items: Vec<u32> = (1..=7).collect();
        let page = paginate(&items, 0, 0);
        assert!(page.is_empty());
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn paginate_empty_input() {
        let page = paginate::<u32>(&[], 10, 0);
        assert!(page.is_empty());
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next());
    }

    #[test]
    fn window_offset_and_limit() {
        let items: Vec<u32> = (1..=5).collect();
        assert_eq!(window(items.clone(), 0, None), items);
        assert_eq!(window(items.clone(), 1, Some(2)), vec![2, 3]);
        assert_eq!(window(items.clone(), 4, Some(10)), vec![5]);
        assert!(window(items, 9, None).is_empty());
    }
}
