//! Lazy page walking for truncated listings.
//!
//! Some providers cut a series' book listing to their page size and expose the
//! rest through a paged endpoint. [`paginate`] walks that endpoint one page at
//! a time; nothing is fetched until the previous group has been pulled, and
//! the walk is bounded by the total page count reported on the first page.

use async_stream::try_stream;
use futures_util::stream::Stream;
use futures_util::StreamExt;
use std::future::Future;

/// One page of a listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number
    pub page: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: u32, total_pages: u32) -> Self {
        Self {
            items,
            page,
            total_pages,
        }
    }
}

/// Walk pages starting at 1, yielding each page's items
///
/// The walk stops once the last fetched page reports `page >= total_pages`.
/// Later pages may revise the total, but no page past the first page's total
/// plus one is ever requested, and page numbers always increase.
pub fn paginate<T, E, F, Fut>(fetch: F) -> impl Stream<Item = Result<Vec<T>, E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    try_stream! {
        let mut fetch = fetch;
        let mut current = fetch(1).await?;
        let ceiling = current.total_pages.max(1).saturating_add(1);
        let mut requested = 1;

        loop {
            let page_number = current.page.max(requested);
            let total_pages = current.total_pages;
            yield current.items;

            if page_number >= total_pages || page_number >= ceiling {
                break;
            }

            requested = page_number + 1;
            tracing::debug!("Fetching page {} of {}", requested, total_pages);
            current = fetch(requested).await?;
        }
    }
}

/// Drain a page stream, concatenating groups in fetch order
pub async fn collect_pages<T, E, S>(pages: S) -> Result<Vec<T>, E>
where
    S: Stream<Item = Result<Vec<T>, E>>,
{
    let mut pages = Box::pin(pages);
    let mut items = Vec::new();

    while let Some(group) = pages.next().await {
        items.extend(group?);
    }

    Ok(items)
}

/// Whether a declared listing looks cut off at one of the provider's page sizes
pub fn should_expand(declared: usize, page_sizes: &[usize]) -> bool {
    page_sizes.contains(&declared)
}

/// Keep `expanded` only if it actually adds items
pub fn expand_listing<T>(original: Vec<T>, expanded: Vec<T>) -> Vec<T> {
    if expanded.len() > original.len() {
        expanded
    } else {
        original
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn counting_fetch<'a>(
        calls: &'a AtomicU32,
        totals: &'a [u32],
    ) -> impl FnMut(u32) -> std::future::Ready<Result<Page<u32>, String>> + 'a {
        move |page| {
            calls.fetch_add(1, Ordering::SeqCst);
            let total = totals
                .get(page as usize - 1)
                .or(totals.last())
                .copied()
                .unwrap_or(0);
            std::future::ready(Ok(Page::new(vec![page * 10, page * 10 + 1], page, total)))
        }
    }

    #[tokio::test]
    async fn test_walks_until_total_pages() {
        let calls = AtomicU32::new(0);

        let items = collect_pages(paginate(counting_fetch(&calls, &[3, 3, 3])))
            .await
            .unwrap();

        assert_eq!(items, vec![10, 11, 20, 21, 30, 31]);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_single_page_listing() {
        let calls = AtomicU32::new(0);

        let items = collect_pages(paginate(counting_fetch(&calls, &[1])))
            .await
            .unwrap();

        assert_eq!(items, vec![10, 11]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_is_lazy() {
        let calls = AtomicU32::new(0);
        let mut pages = Box::pin(paginate(counting_fetch(&calls, &[5])));

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let first = pages.next().await.unwrap().unwrap();
        assert_eq!(first, vec![10, 11]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        pages.next().await.unwrap().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_growing_total_is_bounded_by_first_page() {
        let calls = AtomicU32::new(0);

        // First page claims 2 pages, later pages keep raising the total.
        let items = collect_pages(paginate(counting_fetch(&calls, &[2, 10, 10, 10])))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(items.len(), 6);
    }

    #[tokio::test]
    async fn test_shrinking_total_stops_early() {
        let calls = AtomicU32::new(0);

        let items = collect_pages(paginate(counting_fetch(&calls, &[4, 2])))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(items, vec![10, 11, 20, 21]);
    }

    #[tokio::test]
    async fn test_stale_page_numbers_still_advance() {
        let calls = AtomicU32::new(0);
        let counter = &calls;

        // Source always echoes page 1
        let fetch = move |_page: u32| {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok::<_, String>(Page::new(vec![1u32], 1, 3)))
        };

        let items = collect_pages(paginate(fetch)).await.unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_error_stops_the_walk() {
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let fetch = move |page: u32| {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(if page == 2 {
                Err("page 2 unavailable".to_string())
            } else {
                Ok(Page::new(vec![page], page, 4))
            })
        };

        let result = collect_pages(paginate(fetch)).await;

        assert_eq!(result, Err("page 2 unavailable".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_should_expand_on_page_size() {
        assert!(should_expand(30, &[4, 30]));
        assert!(should_expand(4, &[4, 30]));
        assert!(!should_expand(12, &[4, 30]));
        assert!(!should_expand(0, &[4, 30]));
    }

    #[test]
    fn test_expand_listing_keeps_original_unless_larger() {
        assert_eq!(expand_listing(vec![1, 2], vec![1, 2]), vec![1, 2]);
        assert_eq!(expand_listing(vec![1, 2], vec![9]), vec![1, 2]);
        assert_eq!(expand_listing(vec![1, 2], vec![1, 2, 3]), vec![1, 2, 3]);
    }
}
