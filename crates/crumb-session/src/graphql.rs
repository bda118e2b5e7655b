//! # GraphQL Client
//!
//! Thin POST-and-decode client for the restaurant API.
//!
//! ```text
//! POST {api.url}
//! { "query": "...", "variables": { ... } }
//!
//! 200 OK
//! { "data": { ... }, "errors": [ { "message": "..." } ] }
//! ```
//!
//! `errors` wins over `data`: a response carrying any error is a failure,
//! even when partial data came along.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorEntry {
    message: String,
}

/// GraphQL-over-HTTP client.
#[derive(Debug, Clone)]
pub struct GraphqlClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GraphqlClient {
    pub fn new(endpoint: impl Into<String>, http: reqwest::Client) -> Self {
        GraphqlClient {
            http,
            endpoint: endpoint.into(),
        }
    }

    /// Builds a client with the configured endpoint and timeout.
    pub fn from_config(config: &SessionConfig) -> SessionResult<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(GraphqlClient::new(config.api_url(), http))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Runs a query and decodes its `data` into `T`.
    pub async fn query<T>(&self, query: &str, variables: Value) -> SessionResult<T>
    where
        T: DeserializeOwned,
    {
        debug!(endpoint = %self.endpoint, "Sending GraphQL query");

        let response = self
            .http
            .post(self.endpoint.as_str())
            .json(&GraphqlRequest { query, variables })
            .send()
            .await?
            .error_for_status()?;

        let body: GraphqlResponse<T> = response.json().await?;
        decode_response(body)
    }
}

fn decode_response<T>(body: GraphqlResponse<T>) -> SessionResult<T> {
    if !body.errors.is_empty() {
        let messages: Vec<String> = body.errors.into_iter().map(|e| e.message).collect();
        warn!(?messages, "GraphQL query returned errors");
        return Err(SessionError::Graphql { messages });
    }

    body.data
        .ok_or_else(|| SessionError::UpstreamFetch("response carried no data".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Tips {
        tips: Value,
    }

    fn parse(raw: Value) -> SessionResult<Tips> {
        let body: GraphqlResponse<Tips> = serde_json::from_value(raw).unwrap();
        decode_response(body)
    }

    #[test]
    fn test_data_is_decoded() {
        let tips = parse(json!({ "data": { "tips": { "enabled": true } } })).unwrap();
        assert_eq!(tips.tips["enabled"], json!(true));
    }

    #[test]
    fn test_errors_win_over_data() {
        let err = parse(json!({
            "data": { "tips": null },
            "errors": [{ "message": "Not authorised" }, { "message": "Try again" }]
        }))
        .unwrap_err();

        match err {
            SessionError::Graphql { messages } => {
                assert_eq!(messages, vec!["Not authorised", "Try again"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_data_is_upstream_failure() {
        let err = parse(json!({ "data": null })).unwrap_err();
        assert!(matches!(err, SessionError::UpstreamFetch(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_request_shape() {
        let body = serde_json::to_value(GraphqlRequest {
            query: "query Tips { tips { _id } }",
            variables: json!({}),
        })
        .unwrap();
        assert_eq!(body["query"], "query Tips { tips { _id } }");
        assert_eq!(body["variables"], json!({}));
    }

    #[test]
    fn test_client_from_config() {
        let client = GraphqlClient::from_config(&SessionConfig::default()).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8000/graphql");
    }
}
