//! Asynchronous bulk operation API

use std::sync::Arc;

use async_trait::async_trait;
use priceloom_core::BulkOperationsApi;
use priceloom_domain::{BulkOperation, PriceloomError, Result};

use super::client::ShopifyClient;
use super::types::{BulkRunData, NodeData};

const RUN_MUTATION: &str = r#"
mutation($m: String!) {
  bulkOperationRunMutation(mutation: $m) {
    bulkOperation { id status }
    userErrors { field message }
  }
}
"#;

const STATUS_QUERY: &str = r#"
query($id: ID!) {
  node(id: $id) {
    ... on BulkOperation {
      id
      status
      errorCode
      objectCount
      createdAt
      completedAt
      url
    }
  }
}
"#;

/// [`BulkOperationsApi`] over `bulkOperationRunMutation` + `node(id)` polls.
pub struct ShopifyBulkApi {
    client: Arc<ShopifyClient>,
}

impl ShopifyBulkApi {
    pub fn new(client: Arc<ShopifyClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BulkOperationsApi for ShopifyBulkApi {
    async fn submit(&self, mutation_document: &str) -> Result<BulkOperation> {
        let variables = serde_json::json!({ "m": mutation_document });
        let data: BulkRunData = self.client.graphql(RUN_MUTATION, variables).await?;
        let payload = data.bulk_operation_run_mutation;

        if !payload.user_errors.is_empty() {
            let messages: Vec<_> =
                payload.user_errors.iter().map(|e| e.message.clone()).collect();
            return Err(PriceloomError::Remote(format!(
                "bulk operation rejected: {}",
                messages.join("; ")
            )));
        }

        // A missing operation node becomes an empty-id acknowledgment; the
        // tracker treats that as fatal.
        Ok(payload.bulk_operation.unwrap_or_default().into_domain())
    }

    async fn fetch_status(&self, operation_id: &str) -> Result<BulkOperation> {
        let variables = serde_json::json!({ "id": operation_id });
        let data: NodeData = self.client.graphql(STATUS_QUERY, variables).await?;
        data.node
            .map(super::types::BulkOperationNode::into_domain)
            .ok_or_else(|| PriceloomError::NotFound(format!("bulk operation {operation_id}")))
    }
}
