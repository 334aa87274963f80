//! Wire payload shapes for the Admin API

use priceloom_domain::{
    BulkOperation, BulkOperationStatus, CatalogItem, Price, RemoteUserError, Result, Variant,
};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// REST payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RestProductsPayload {
    #[serde(default)]
    pub products: Vec<RestProduct>,
}

#[derive(Debug, Deserialize)]
pub struct RestProductPayload {
    pub product: RestProduct,
}

#[derive(Debug, Deserialize)]
pub struct RestProduct {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    /// Comma-separated tag list as the REST API returns it.
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub variants: Vec<RestVariant>,
}

#[derive(Debug, Deserialize)]
pub struct RestVariant {
    pub id: u64,
    pub price: String,
    #[serde(default)]
    pub option1: Option<String>,
    #[serde(default)]
    pub option2: Option<String>,
    #[serde(default)]
    pub option3: Option<String>,
}

impl RestProduct {
    /// Convert into the domain representation, validating prices.
    pub fn into_domain(self) -> Result<CatalogItem> {
        let tags = self
            .tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        let variants = self
            .variants
            .into_iter()
            .map(|v| {
                Ok(Variant {
                    id: v.id.to_string(),
                    price: Price::parse(&v.price)?,
                    options: vec![v.option1, v.option2, v.option3],
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CatalogItem {
            id: self.id.to_string(),
            title: self.title,
            tags,
            variants,
            base_price: None,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RestMetafieldsPayload {
    #[serde(default)]
    pub metafields: Vec<RestMetafield>,
}

#[derive(Debug, Deserialize)]
pub struct RestMetafield {
    pub namespace: String,
    pub key: String,
    pub value: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct RestWebhooksPayload {
    #[serde(default)]
    pub webhooks: Vec<RestWebhook>,
}

#[derive(Debug, Deserialize)]
pub struct RestWebhook {
    pub id: u64,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct RestWebhookPayload {
    pub webhook: RestWebhook,
}

// ---------------------------------------------------------------------------
// GraphQL payloads
// ---------------------------------------------------------------------------

/// Top-level GraphQL response envelope. Transport-level `errors` make the
/// whole call a remote failure regardless of `data`.
#[derive(Debug, Deserialize)]
pub struct GraphqlEnvelope<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ProductsData {
    pub products: ProductsConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsConnection {
    #[serde(default)]
    pub edges: Vec<ProductEdge>,
    pub page_info: GraphqlPageInfo,
}

#[derive(Debug, Deserialize)]
pub struct ProductEdge {
    pub node: ProductNode,
}

#[derive(Debug, Deserialize)]
pub struct ProductNode {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub variants: VariantConnection,
}

#[derive(Debug, Deserialize)]
pub struct VariantConnection {
    #[serde(default)]
    pub nodes: Vec<VariantNode>,
}

#[derive(Debug, Deserialize)]
pub struct VariantNode {
    pub id: String,
    pub price: String,
    #[serde(default)]
    pub option1: Option<String>,
    #[serde(default)]
    pub option2: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlPageInfo {
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

impl ProductNode {
    pub fn into_domain(self) -> Result<CatalogItem> {
        let variants = self
            .variants
            .nodes
            .into_iter()
            .map(|v| {
                Ok(Variant {
                    id: v.id,
                    price: Price::parse(&v.price)?,
                    options: vec![v.option1, v.option2],
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CatalogItem {
            id: self.id,
            title: self.title,
            tags: self.tags,
            variants,
            base_price: None,
        })
    }
}

/// A GraphQL user error; `field` is a path such as
/// `["variants", "0", "price"]`.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlUserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

impl GraphqlUserError {
    /// Convert into the domain error, correlating the originating update
    /// positionally from the field path where possible.
    pub fn into_domain(self) -> RemoteUserError {
        let update_index = self
            .field
            .as_deref()
            .and_then(|path| path.iter().find_map(|segment| segment.parse::<usize>().ok()));
        RemoteUserError {
            field: self.field.map(|path| path.join(".")),
            message: self.message,
            update_index,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VariantsBulkUpdateData {
    #[serde(rename = "productVariantsBulkUpdate")]
    pub product_variants_bulk_update: UserErrorsPayload,
}

#[derive(Debug, Deserialize)]
pub struct UserErrorsPayload {
    #[serde(rename = "userErrors", default)]
    pub user_errors: Vec<GraphqlUserError>,
}

#[derive(Debug, Deserialize)]
pub struct MetafieldsSetData {
    #[serde(rename = "metafieldsSet")]
    pub metafields_set: UserErrorsPayload,
}

#[derive(Debug, Deserialize)]
pub struct BulkRunData {
    #[serde(rename = "bulkOperationRunMutation")]
    pub bulk_operation_run_mutation: BulkRunPayload,
}

#[derive(Debug, Deserialize)]
pub struct BulkRunPayload {
    #[serde(rename = "bulkOperation", default)]
    pub bulk_operation: Option<BulkOperationNode>,
    #[serde(rename = "userErrors", default)]
    pub user_errors: Vec<GraphqlUserError>,
}

#[derive(Debug, Deserialize)]
pub struct NodeData {
    #[serde(default)]
    pub node: Option<BulkOperationNode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOperationNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
    /// `UnsignedInt64` arrives as a JSON string; tolerate numbers too.
    #[serde(default)]
    pub object_count: Option<serde_json::Value>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub url: Option<String>,
}

impl BulkOperationNode {
    pub fn into_domain(self) -> BulkOperation {
        let object_count = self.object_count.as_ref().and_then(|value| match value {
            serde_json::Value::String(raw) => raw.parse::<u64>().ok(),
            serde_json::Value::Number(n) => n.as_u64(),
            _ => None,
        });

        BulkOperation {
            id: self.id,
            status: self
                .status
                .as_deref()
                .map_or(BulkOperationStatus::Created, BulkOperationStatus::from),
            error_code: self.error_code,
            object_count,
            created_at: self.created_at,
            completed_at: self.completed_at,
            url: self.url,
        }
    }
}
