//! Request and response envelopes exchanged with the proxy.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// GraphQL request envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphqlRequest {
    /// GraphQL document.
    pub query: String,
    /// Operation variables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
    /// Explicit operation name; the proxy prefers it over scanning the document.
    #[serde(rename = "operationName", skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

impl GraphqlRequest {
    /// Envelope for `query` with no variables.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: None,
            operation_name: None,
        }
    }

    /// Attach variables.
    #[must_use]
    pub fn with_variables(mut self, variables: Value) -> Self {
        self.variables = Some(variables);
        self
    }

    /// Attach an explicit operation name.
    #[must_use]
    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }
}

/// Bulk product import upload.
#[derive(Debug, Clone)]
pub struct ImportProductsRequest {
    /// CSV file contents.
    pub csv: Vec<u8>,
    /// File name reported for the CSV part.
    pub csv_file_name: String,
    /// Optional zip archive of product images.
    pub images_zip: Option<Vec<u8>>,
    /// Target warehouse.
    pub warehouse_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlResponse {
    #[serde(default)]
    pub(crate) data: Option<Value>,
    #[serde(default)]
    pub(crate) errors: Vec<GraphqlErrorEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlErrorEntry {
    pub(crate) message: String,
}
