//! Shop connection configuration
//!
//! Credentials and endpoint coordinates are read from the environment (an
//! optional `.env` file is loaded by the binary before this runs). Missing
//! required values are a fatal configuration error.

use serde::{Deserialize, Serialize};

use crate::errors::{PriceloomError, Result};

/// Default Admin API version when `API_VERSION` is unset.
pub const DEFAULT_API_VERSION: &str = "2024-04";

/// Connection settings for the remote shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopConfig {
    /// Shop domain, e.g. `example.myshopify.com`.
    pub shop_domain: String,
    /// Admin API access token.
    pub api_token: String,
    /// Admin API version segment.
    pub api_version: String,
    /// Shared secret for webhook signature verification, when serving.
    pub webhook_secret: Option<String>,
    /// Override for the API origin (scheme + host). Normal runs derive it
    /// from `shop_domain`; development proxies and tests point it at a local
    /// server.
    pub api_origin: Option<String>,
}

impl ShopConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        let shop_domain = required_var("SHOP_DOMAIN")?;
        let api_token = required_var("API_TOKEN")?;
        let api_version =
            std::env::var("API_VERSION").unwrap_or_else(|_| DEFAULT_API_VERSION.to_string());
        let webhook_secret = std::env::var("SHOPIFY_WEBHOOK_SECRET").ok();
        let api_origin = std::env::var("API_ORIGIN").ok();

        Ok(Self { shop_domain, api_token, api_version, webhook_secret, api_origin })
    }

    fn origin(&self) -> String {
        self.api_origin
            .clone()
            .unwrap_or_else(|| format!("https://{}", self.shop_domain))
    }

    /// Base URL for REST Admin endpoints.
    pub fn rest_base_url(&self) -> String {
        format!("{}/admin/api/{}", self.origin(), self.api_version)
    }

    /// URL of the GraphQL Admin endpoint.
    pub fn graphql_url(&self) -> String {
        format!("{}/admin/api/{}/graphql.json", self.origin(), self.api_version)
    }
}

fn required_var(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(PriceloomError::Config(format!("{name} is not set"))),
    }
}
