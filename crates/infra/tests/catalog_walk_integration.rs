//! Integration tests for the catalog walker over real HTTP
//!
//! **Purpose**: exercise the full path walker → page source → executor →
//! pagination decoding against a WireMock server speaking both cursor
//! conventions the Admin API uses.
//!
//! **Coverage:**
//! - REST link-header walk: 3 pages, `rel="next"` present on pages 1-2,
//!   absent on page 3, yields items [1,2,3] in order in exactly 3 fetches
//! - GraphQL cursor walk with a tag filter
//! - Throttled (429) page fetches recovered transparently mid-walk

#[path = "support.rs"]
mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::TryStreamExt;
use priceloom_core::walk;
use priceloom_infra::integrations::shopify::{GraphqlCatalogSource, RestCatalogSource};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn rest_product(id: u64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": format!("Product {id}"),
        "tags": "chaine_update",
        "variants": [{"id": id * 10, "price": "100.00", "option1": "Forsat S"}]
    })
}

fn link_header(server_uri: &str, token: &str) -> String {
    format!(
        r#"<{server_uri}/admin/api/2024-04/products.json?limit=250&page_info={token}>; rel="next""#
    )
}

#[tokio::test]
async fn rest_walk_follows_link_headers_to_the_end() {
    let server = MockServer::start().await;
    let uri = server.uri();

    Mock::given(method("GET"))
        .and(path("/admin/api/2024-04/products.json"))
        .and(query_param("page_info", "page2"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", link_header(&uri, "page3").as_str())
                .set_body_json(serde_json::json!({"products": [rest_product(2)]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/admin/api/2024-04/products.json"))
        .and(query_param("page_info", "page3"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"products": [rest_product(3)]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    // First page: no page_info param. Mounted last so the more specific
    // matchers above win for continuation requests.
    Mock::given(method("GET"))
        .and(path("/admin/api/2024-04/products.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", link_header(&uri, "page2").as_str())
                .set_body_json(serde_json::json!({"products": [rest_product(1)]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = support::client_for(&uri);
    let source = RestCatalogSource::new(client);

    let items: Vec<_> = walk(source, 250).try_collect().await.expect("walk");
    let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();

    assert_eq!(ids, ["1", "2", "3"]);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

fn graphql_page(ids: &[u64], end_cursor: Option<&str>) -> serde_json::Value {
    let edges: Vec<_> = ids
        .iter()
        .map(|id| {
            serde_json::json!({
                "node": {
                    "id": format!("gid://shopify/Product/{id}"),
                    "title": format!("Ensemble {id}"),
                    "tags": ["ensemble"],
                    "variants": {"nodes": [
                        {"id": format!("gid://shopify/ProductVariant/{}", id * 10),
                         "price": "150.00", "option1": "Gourmette", "option2": null}
                    ]}
                }
            })
        })
        .collect();

    serde_json::json!({
        "data": {
            "products": {
                "edges": edges,
                "pageInfo": {
                    "hasNextPage": end_cursor.is_some(),
                    "endCursor": end_cursor,
                }
            }
        }
    })
}

#[tokio::test]
async fn graphql_walk_follows_cursors_and_sends_the_filter() {
    let server = MockServer::start().await;

    let calls = Arc::new(AtomicUsize::new(0));
    let calls_ref = calls.clone();
    Mock::given(method("POST"))
        .and(path("/admin/api/2024-04/graphql.json"))
        .respond_with(move |request: &Request| {
            let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
            assert_eq!(body["variables"]["query"], "tag:ensemble");

            let call = calls_ref.fetch_add(1, Ordering::SeqCst);
            let page = match call {
                0 => {
                    assert!(body["variables"]["cursor"].is_null());
                    graphql_page(&[1, 2], Some("cursor-a"))
                }
                1 => {
                    assert_eq!(body["variables"]["cursor"], "cursor-a");
                    graphql_page(&[3], None)
                }
                _ => panic!("unexpected extra page fetch"),
            };
            ResponseTemplate::new(200).set_body_json(page)
        })
        .expect(2)
        .mount(&server)
        .await;

    let client = support::client_for(&server.uri());
    let source = GraphqlCatalogSource::with_filter(client, "tag:ensemble");

    let items: Vec<_> = walk(source, 250).try_collect().await.expect("walk");
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].id, "gid://shopify/Product/1");
    assert!(items[0].has_tag("ensemble"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn throttled_page_fetches_are_retried_mid_walk() {
    let server = MockServer::start().await;

    let calls = Arc::new(AtomicUsize::new(0));
    let calls_ref = calls.clone();
    Mock::given(method("GET"))
        .and(path("/admin/api/2024-04/products.json"))
        .respond_with(move |_request: &Request| {
            // Throttle the first two attempts, then serve the only page.
            if calls_ref.fetch_add(1, Ordering::SeqCst) < 2 {
                ResponseTemplate::new(429)
            } else {
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"products": [rest_product(7)]}))
            }
        })
        .expect(3)
        .mount(&server)
        .await;

    let client = support::client_for(&server.uri());
    let source = RestCatalogSource::new(client);

    let items: Vec<_> = walk(source, 250).try_collect().await.expect("walk");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, "7");
}
