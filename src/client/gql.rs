//! GraphQL requests as templated POSTs.
//!
//! A GraphQL request is an ordinary request built from the client's template
//! (usually with the endpoint set as the template URI) carrying a JSON
//! [`GqlRequest`] body.

use super::Client;
use crate::error::Result;
use crate::types::Request;
use http::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// GraphQL request body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GqlRequest {
    /// GraphQL document.
    pub query: String,
    /// Operation to run when the document defines several.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    /// Variables referenced by the document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Value>,
}

/// One entry of a GraphQL `errors` array.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GqlError {
    /// Human readable description.
    pub message: String,
    /// Path to the response field that failed.
    #[serde(default)]
    pub path: Vec<serde_json::Value>,
}

/// GraphQL response envelope.
#[derive(Clone, Debug, Deserialize)]
pub struct GqlResponse<T> {
    /// Result data; `None` when execution failed before producing any.
    pub data: Option<T>,
    /// Errors reported by the server.
    #[serde(default)]
    pub errors: Vec<GqlError>,
}

impl<T> GqlResponse<T> {
    /// Data present and no errors reported.
    pub fn is_success(&self) -> bool {
        self.data.is_some() && self.errors.is_empty()
    }
}

impl Client {
    /// POST request carrying `query` to the template URI.
    pub fn create_gql_request(&self, query: &str, operation_name: Option<&str>) -> Result<Request> {
        self.create_gql_request_with_variables(query, operation_name, None)
    }

    /// POST request carrying `query` and `variables` to the template URI.
    pub fn create_gql_request_with_variables(
        &self,
        query: &str,
        operation_name: Option<&str>,
        variables: Option<serde_json::Value>,
    ) -> Result<Request> {
        let body = GqlRequest {
            query: query.to_string(),
            operation_name: operation_name.map(str::to_string),
            variables,
        };
        self.create_request()
            .with_method(Method::POST)
            .with_json_body(&body)
    }

    /// Send a GraphQL request and decode the envelope.
    pub async fn send_gql<T: DeserializeOwned>(&self, request: Request) -> Result<GqlResponse<T>> {
        self.send_as(request).await
    }
}
