//! Lazy, cursor-following walk over a paginated catalog
//!
//! The walk is restartable from the beginning by calling [`walk`] again; no
//! cursor state is persisted, so a crash mid-walk requires a full re-walk.

use std::collections::VecDeque;

use futures::stream::Stream;
use priceloom_domain::{CatalogItem, PageCursor, Result};
use tracing::debug;

use super::ports::CatalogPageSource;

struct WalkState<S> {
    source: S,
    cursor: Option<PageCursor>,
    buffered: VecDeque<CatalogItem>,
    pages_fetched: usize,
    exhausted: bool,
    page_size: usize,
}

/// Walk the collection end-to-end, yielding items lazily in remote order.
///
/// Each page fetch is an await point; the stream terminates when the source
/// reports no further cursor. Items are yielded exactly once each, in
/// per-page order, with no cross-page sorting imposed.
pub fn walk<S>(source: S, page_size: usize) -> impl Stream<Item = Result<CatalogItem>>
where
    S: CatalogPageSource,
{
    let state = WalkState {
        source,
        cursor: None,
        buffered: VecDeque::new(),
        pages_fetched: 0,
        exhausted: false,
        page_size,
    };

    futures::stream::try_unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.buffered.pop_front() {
                return Ok(Some((item, state)));
            }
            if state.exhausted {
                return Ok(None);
            }

            let page = state.source.fetch_page(state.cursor.take(), state.page_size).await?;
            state.pages_fetched += 1;
            state.exhausted = page.next.is_none();
            state.cursor = page.next;
            state.buffered = page.items.into();

            debug!(
                page = state.pages_fetched,
                items = state.buffered.len(),
                has_next = !state.exhausted,
                "fetched catalog page"
            );
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use futures::TryStreamExt;
    use priceloom_domain::{CatalogPage, Price, PriceloomError, Variant};

    use super::*;

    fn item(id: &str) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            title: format!("Item {id}"),
            tags: vec![],
            variants: vec![Variant {
                id: format!("v{id}"),
                price: Price::parse("10.00").unwrap(),
                options: vec![],
            }],
            base_price: None,
        }
    }

    /// Page source backed by a fixed script of pages; counts fetches and
    /// checks the cursor handed back matches what the previous page advertised.
    struct ScriptedSource {
        pages: Vec<CatalogPage>,
        fetches: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CatalogPageSource for ScriptedSource {
        async fn fetch_page(
            &self,
            cursor: Option<PageCursor>,
            _page_size: usize,
        ) -> Result<CatalogPage> {
            let index = self.fetches.fetch_add(1, Ordering::SeqCst);
            if index > 0 {
                let expected = self.pages[index - 1].next.clone();
                assert_eq!(cursor, expected, "walker must echo the previous page's cursor");
            } else {
                assert_eq!(cursor, None);
            }
            Ok(self.pages[index].clone())
        }
    }

    fn link_pages() -> Vec<CatalogPage> {
        vec![
            CatalogPage {
                items: vec![item("1")],
                next: Some(PageCursor::LinkHeader("p2".into())),
            },
            CatalogPage {
                items: vec![item("2")],
                next: Some(PageCursor::LinkHeader("p3".into())),
            },
            CatalogPage { items: vec![item("3")], next: None },
        ]
    }

    #[tokio::test]
    async fn three_link_header_pages_yield_items_in_order() {
        let fetches = Arc::new(AtomicUsize::new(0));
        let source = ScriptedSource { pages: link_pages(), fetches: fetches.clone() };

        let items: Vec<_> = walk(source, 250).try_collect().await.unwrap();
        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();

        assert_eq!(ids, ["1", "2", "3"]);
        assert_eq!(fetches.load(Ordering::SeqCst), 3, "terminates after exactly 3 fetches");
    }

    #[tokio::test]
    async fn cursor_object_pages_yield_union_exactly_once() {
        let pages = vec![
            CatalogPage {
                items: vec![item("a"), item("b")],
                next: Some(PageCursor::Cursor("c1".into())),
            },
            CatalogPage {
                items: vec![item("c")],
                next: Some(PageCursor::Cursor("c2".into())),
            },
            CatalogPage { items: vec![item("d"), item("e")], next: None },
        ];
        let fetches = Arc::new(AtomicUsize::new(0));
        let source = ScriptedSource { pages, fetches: fetches.clone() };

        let items: Vec<_> = walk(source, 50).try_collect().await.unwrap();
        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();

        assert_eq!(ids, ["a", "b", "c", "d", "e"]);
        assert_eq!(fetches.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn empty_mid_walk_pages_are_skipped() {
        let pages = vec![
            CatalogPage { items: vec![item("1")], next: Some(PageCursor::Cursor("c1".into())) },
            CatalogPage { items: vec![], next: Some(PageCursor::Cursor("c2".into())) },
            CatalogPage { items: vec![item("2")], next: None },
        ];
        let fetches = Arc::new(AtomicUsize::new(0));
        let source = ScriptedSource { pages, fetches };

        let items: Vec<_> = walk(source, 10).try_collect().await.unwrap();
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn single_page_catalog_terminates_immediately() {
        let pages = vec![CatalogPage { items: vec![item("only")], next: None }];
        let fetches = Arc::new(AtomicUsize::new(0));
        let source = ScriptedSource { pages, fetches: fetches.clone() };

        let items: Vec<_> = walk(source, 10).try_collect().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn source_errors_propagate() {
        struct FailingSource;

        #[async_trait]
        impl CatalogPageSource for FailingSource {
            async fn fetch_page(
                &self,
                _cursor: Option<PageCursor>,
                _page_size: usize,
            ) -> Result<CatalogPage> {
                Err(PriceloomError::Network("boom".into()))
            }
        }

        let result: Result<Vec<_>> = walk(FailingSource, 10).try_collect().await;
        assert!(matches!(result, Err(PriceloomError::Network(_))));
    }
}
