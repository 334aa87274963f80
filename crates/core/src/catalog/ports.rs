//! Port interfaces for paginated catalog access

use async_trait::async_trait;
use priceloom_domain::{CatalogPage, PageCursor, Result};

/// One page-shaped view onto a remote collection resource.
///
/// Implementations decode exactly one cursor encoding (REST link headers or
/// GraphQL page-info objects) and return the next continuation token, if any,
/// alongside the page's items.
#[async_trait]
pub trait CatalogPageSource: Send + Sync {
    /// Fetch one page. `cursor` is `None` for the first page; `page_size` is
    /// a hint the remote may clamp.
    async fn fetch_page(
        &self,
        cursor: Option<PageCursor>,
        page_size: usize,
    ) -> Result<CatalogPage>;
}
