//! Shopify Admin API client
//!
//! One client instance owns one HTTP connection context; concurrent workers
//! build their own instances rather than sharing one.

use priceloom_domain::{
    constants, CatalogItem, CatalogPage, PageCursor, Price, PriceloomError, Result, ShopConfig,
};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, LINK};
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::errors::InfraError;
use crate::http::pagination::next_cursor_from_link_header;
use crate::http::HttpClient;

use super::types::{
    GraphqlEnvelope, MetafieldsSetData, RestMetafieldsPayload, RestProductPayload,
    RestProductsPayload, RestWebhookPayload, RestWebhooksPayload,
};
use super::product_gid;

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

const METAFIELDS_SET_MUTATION: &str = r#"
mutation SetBase($mf: [MetafieldsSetInput!]!) {
  metafieldsSet(metafields: $mf) {
    userErrors { field message }
  }
}
"#;

/// Outcome of a webhook registration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookRegistration {
    /// A webhook with the same address already existed.
    Existing(u64),
    /// A new webhook was created.
    Created(u64),
}

/// Authenticated Admin API client for one shop.
#[derive(Clone)]
pub struct ShopifyClient {
    config: ShopConfig,
    http: HttpClient,
}

impl ShopifyClient {
    /// Create a client with the default throttle policy (retry 429 forever,
    /// 2s apart).
    pub fn new(config: ShopConfig) -> Result<Self> {
        let http = HttpClient::builder().default_headers(Self::default_headers(&config)?).build()?;
        Ok(Self { config, http })
    }

    /// Create a client around a pre-built executor (custom throttle policy).
    pub fn with_http(config: ShopConfig, http: HttpClient) -> Self {
        Self { config, http }
    }

    fn default_headers(config: &ShopConfig) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let token = HeaderValue::from_str(&config.api_token)
            .map_err(|_| PriceloomError::Config("API token contains invalid characters".into()))?;
        headers.insert(ACCESS_TOKEN_HEADER, token);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    pub fn config(&self) -> &ShopConfig {
        &self.config
    }

    async fn rest_get(&self, path: &str, query: &[(&str, String)]) -> Result<Response> {
        let url = format!("{}/{path}", self.config.rest_base_url());
        let builder = self.http.request(Method::GET, &url).query(query);
        self.http.send(builder).await
    }

    /// Execute a GraphQL query/mutation and unwrap the response envelope.
    ///
    /// Transport-level GraphQL `errors` are raised as remote failures; user
    /// errors inside `data` are left to the caller to interpret.
    pub async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        let builder = self
            .http
            .request(Method::POST, self.config.graphql_url())
            .json(&serde_json::json!({ "query": query, "variables": variables }));

        let response = self.http.send(builder).await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_else(|_| "<unreadable body>".into());
            return Err(PriceloomError::Remote(format!("GraphQL call failed ({status}): {text}")));
        }

        let envelope: GraphqlEnvelope<T> = response.json().await.map_err(|err| {
            let infra: InfraError = err.into();
            PriceloomError::from(infra)
        })?;

        if let Some(errors) = envelope.errors {
            if !errors.is_null() {
                return Err(PriceloomError::Remote(format!("GraphQL errors: {errors}")));
            }
        }

        envelope.data.ok_or_else(|| PriceloomError::Remote("GraphQL response missing data".into()))
    }

    /// Fetch one REST catalog page; the continuation token rides in the
    /// response's `Link` header.
    pub async fn products_page(
        &self,
        cursor: Option<&PageCursor>,
        page_size: usize,
    ) -> Result<CatalogPage> {
        let mut query = vec![("limit", page_size.to_string())];
        if let Some(cursor) = cursor {
            query.push(("page_info", cursor.token().to_string()));
        }

        let response = self.rest_get("products.json", &query).await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_else(|_| "<unreadable body>".into());
            return Err(PriceloomError::Remote(format!(
                "products page fetch failed ({status}): {text}"
            )));
        }

        let next = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(next_cursor_from_link_header);

        let payload: RestProductsPayload = response.json().await.map_err(|err| {
            let infra: InfraError = err.into();
            PriceloomError::from(infra)
        })?;

        let items = payload
            .products
            .into_iter()
            .map(super::types::RestProduct::into_domain)
            .collect::<Result<Vec<_>>>()?;

        debug!(items = items.len(), has_next = next.is_some(), "fetched REST products page");
        Ok(CatalogPage { items, next })
    }

    /// Fetch a single product by id.
    pub async fn product(&self, product_id: &str) -> Result<CatalogItem> {
        let response = self.rest_get(&format!("products/{product_id}.json"), &[]).await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PriceloomError::NotFound(format!("product {product_id}")));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_else(|_| "<unreadable body>".into());
            return Err(PriceloomError::Remote(format!(
                "product fetch failed ({status}): {text}"
            )));
        }

        let payload: RestProductPayload = response.json().await.map_err(|err| {
            let infra: InfraError = err.into();
            PriceloomError::from(infra)
        })?;
        payload.product.into_domain()
    }

    /// Read a product's `custom.base_price` metafield, if present.
    ///
    /// Fetch failures are logged and swallowed: a product with an unreadable
    /// metafield is skipped by callers, not fatal to a whole run.
    pub async fn product_base_price(&self, product_id: &str) -> Result<Option<Price>> {
        let query = vec![
            ("namespace", constants::BASE_PRICE_NAMESPACE.to_string()),
            ("key", constants::BASE_PRICE_KEY.to_string()),
        ];
        let response =
            self.rest_get(&format!("products/{product_id}/metafields.json"), &query).await?;

        if !response.status().is_success() {
            warn!(product_id, status = %response.status(), "metafield fetch failed, skipping");
            return Ok(None);
        }

        let payload: RestMetafieldsPayload = response.json().await.map_err(|err| {
            let infra: InfraError = err.into();
            PriceloomError::from(infra)
        })?;

        for metafield in payload.metafields {
            if metafield.namespace == constants::BASE_PRICE_NAMESPACE
                && metafield.key == constants::BASE_PRICE_KEY
            {
                let raw = match metafield.value {
                    serde_json::Value::String(raw) => raw,
                    other => other.to_string(),
                };
                return Ok(Some(Price::parse(&raw)?));
            }
        }
        Ok(None)
    }

    /// Write a product's `custom.base_price` metafield; returns the remote's
    /// user errors, if any, for the caller to report.
    pub async fn set_base_price(
        &self,
        product_id: &str,
        price: &Price,
    ) -> Result<Vec<priceloom_domain::RemoteUserError>> {
        let variables = serde_json::json!({
            "mf": [{
                "ownerId": product_gid(product_id),
                "namespace": constants::BASE_PRICE_NAMESPACE,
                "key": constants::BASE_PRICE_KEY,
                "type": "number_decimal",
                "value": price.as_str(),
            }]
        });

        let data: MetafieldsSetData = self.graphql(METAFIELDS_SET_MUTATION, variables).await?;
        Ok(data
            .metafields_set
            .user_errors
            .into_iter()
            .map(super::types::GraphqlUserError::into_domain)
            .collect())
    }

    /// Idempotently register the `metafields/update` webhook at `address`.
    pub async fn register_metafield_webhook(&self, address: &str) -> Result<WebhookRegistration> {
        let query = vec![("topic", "metafields/update".to_string())];
        let response = self.rest_get("webhooks.json", &query).await?;
        if response.status().is_success() {
            let payload: RestWebhooksPayload = response.json().await.map_err(|err| {
                let infra: InfraError = err.into();
                PriceloomError::from(infra)
            })?;
            if let Some(hook) = payload.webhooks.iter().find(|hook| hook.address == address) {
                return Ok(WebhookRegistration::Existing(hook.id));
            }
        }

        let body = serde_json::json!({
            "webhook": {
                "topic": "metafields/update",
                "address": address,
                "format": "json",
            }
        });
        let url = format!("{}/webhooks.json", self.config.rest_base_url());
        let builder = self.http.request(Method::POST, &url).json(&body);
        let response = self.http.send(builder).await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_else(|_| "<unreadable body>".into());
            return Err(PriceloomError::Remote(format!(
                "webhook registration failed ({status}): {text}"
            )));
        }

        let payload: RestWebhookPayload = response.json().await.map_err(|err| {
            let infra: InfraError = err.into();
            PriceloomError::from(infra)
        })?;
        Ok(WebhookRegistration::Created(payload.webhook.id))
    }
}
