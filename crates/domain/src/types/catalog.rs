//! Catalog items, variants, and pagination cursors

use serde::{Deserialize, Serialize};

use super::pricing::Price;

/// An individually priced sub-unit of a catalog item.
///
/// `options` preserves the remote's positional option slots (size, material,
/// chain, ...) including empty positions; policy layers interpret them, the
/// core does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: String,
    pub price: Price,
    #[serde(default)]
    pub options: Vec<Option<String>>,
}

/// A sellable product with one or more priced variants.
///
/// The core only ever holds transient read-only copies fetched per run; the
/// remote system owns the data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub variants: Vec<Variant>,
    /// Base-price annotation, populated when the fetching adapter resolves it.
    #[serde(default)]
    pub base_price: Option<Price>,
}

impl CatalogItem {
    /// Case-insensitive tag membership test.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Opaque continuation token for a paginated collection.
///
/// The remote exposes two incompatible encodings depending on endpoint: REST
/// responses carry a `Link` header `page_info` token, GraphQL responses carry
/// an `endCursor`. Each encoding is decoded by exactly one adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageCursor {
    /// `page_info` token extracted from a `Link: <...>; rel="next"` header.
    LinkHeader(String),
    /// `endCursor` from a GraphQL `pageInfo` object.
    Cursor(String),
}

impl PageCursor {
    /// Borrow the raw token regardless of encoding.
    pub fn token(&self) -> &str {
        match self {
            Self::LinkHeader(token) | Self::Cursor(token) => token,
        }
    }
}

/// One fetched page of catalog items plus the continuation cursor, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPage {
    pub items: Vec<CatalogItem>,
    pub next: Option<PageCursor>,
}
