//! Catalog page sources
//!
//! Two implementations of the walker's page port, one per cursor encoding
//! the Admin API exposes.

use std::sync::Arc;

use async_trait::async_trait;
use priceloom_core::CatalogPageSource;
use priceloom_domain::{CatalogPage, PageCursor, PriceloomError, Result};

use crate::http::pagination::next_cursor_from_page_info;

use super::client::ShopifyClient;
use super::types::{ProductNode, ProductsData};

const PRODUCTS_QUERY: &str = r#"
query Products($first: Int!, $query: String, $cursor: String) {
  products(first: $first, query: $query, after: $cursor) {
    edges {
      node {
        id
        title
        tags
        variants(first: 250) {
          nodes { id price option1 option2 }
        }
      }
    }
    pageInfo { hasNextPage endCursor }
  }
}
"#;

/// REST `products.json` pages, continued through `Link` headers.
pub struct RestCatalogSource {
    client: Arc<ShopifyClient>,
}

impl RestCatalogSource {
    pub fn new(client: Arc<ShopifyClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CatalogPageSource for RestCatalogSource {
    async fn fetch_page(
        &self,
        cursor: Option<PageCursor>,
        page_size: usize,
    ) -> Result<CatalogPage> {
        if let Some(PageCursor::Cursor(_)) = cursor {
            return Err(PriceloomError::InvalidInput(
                "REST catalog source received a GraphQL cursor".into(),
            ));
        }
        self.client.products_page(cursor.as_ref(), page_size).await
    }
}

/// GraphQL products connection, continued through `pageInfo` cursors, with
/// an optional search filter such as `tag:ensemble`.
pub struct GraphqlCatalogSource {
    client: Arc<ShopifyClient>,
    query_filter: Option<String>,
}

impl GraphqlCatalogSource {
    pub fn new(client: Arc<ShopifyClient>) -> Self {
        Self { client, query_filter: None }
    }

    pub fn with_filter(client: Arc<ShopifyClient>, filter: impl Into<String>) -> Self {
        Self { client, query_filter: Some(filter.into()) }
    }
}

#[async_trait]
impl CatalogPageSource for GraphqlCatalogSource {
    async fn fetch_page(
        &self,
        cursor: Option<PageCursor>,
        page_size: usize,
    ) -> Result<CatalogPage> {
        if let Some(PageCursor::LinkHeader(_)) = cursor {
            return Err(PriceloomError::InvalidInput(
                "GraphQL catalog source received a link-header cursor".into(),
            ));
        }

        let variables = serde_json::json!({
            "first": page_size,
            "query": self.query_filter,
            "cursor": cursor.as_ref().map(PageCursor::token),
        });

        let data: ProductsData = self.client.graphql(PRODUCTS_QUERY, variables).await?;
        let connection = data.products;

        let items = connection
            .edges
            .into_iter()
            .map(|edge| ProductNode::into_domain(edge.node))
            .collect::<Result<Vec<_>>>()?;

        let next = next_cursor_from_page_info(
            connection.page_info.has_next_page,
            connection.page_info.end_cursor,
        );

        Ok(CatalogPage { items, next })
    }
}
