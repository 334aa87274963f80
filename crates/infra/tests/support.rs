//! Shared helpers for infra integration tests

use std::sync::Arc;
use std::time::Duration;

use priceloom_common::BackoffPolicy;
use priceloom_domain::ShopConfig;
use priceloom_infra::integrations::shopify::ShopifyClient;
use priceloom_infra::HttpClient;

/// Build a client whose REST and GraphQL endpoints point at a mock server,
/// with a fast bounded throttle so failing tests do not hang.
pub fn client_for(server_uri: &str) -> Arc<ShopifyClient> {
    let config = ShopConfig {
        shop_domain: "test-shop.myshopify.com".into(),
        api_token: "shpat_test".into(),
        api_version: "2024-04".into(),
        webhook_secret: None,
        api_origin: Some(server_uri.to_string()),
    };
    let http = HttpClient::builder()
        .throttle_policy(BackoffPolicy::bounded(Duration::from_millis(10), 5))
        .build()
        .expect("http client");
    Arc::new(ShopifyClient::with_http(config, http))
}
