//! HTTP client for the GitHub GraphQL API.

use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use super::transport::{GraphqlTransport, QueryRequest};
use crate::error::ContribError;
use crate::utils::settings::get_env_var;

/// Public GitHub GraphQL endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.github.com/graphql";

/// Environment variable overriding the GraphQL endpoint (e.g. GitHub Enterprise).
pub const ENDPOINT_ENV: &str = "GH_CONTRIB_GRAPHQL_URL";

/// HTTP request timeout for a single GraphQL call.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
}

#[derive(Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
}

/// Authenticated GitHub GraphQL client.
pub struct GithubClient {
    client: Client,
    token: String,
    endpoint: Url,
}

impl GithubClient {
    /// Creates a client for the configured endpoint.
    ///
    /// Uses `GH_CONTRIB_GRAPHQL_URL` when set, otherwise the public API.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let endpoint = get_env_var(ENDPOINT_ENV).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        Self::with_endpoint(token, &endpoint)
    }

    /// Creates a client for an explicit endpoint.
    pub fn with_endpoint(token: impl Into<String>, endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .with_context(|| format!("Invalid GraphQL endpoint URL: {endpoint}"))?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("gh-contrib/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            token: token.into(),
            endpoint,
        })
    }

    /// Returns the endpoint requests are sent to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn post(&self, request: &QueryRequest) -> Result<Value> {
        let started = Instant::now();
        if request.options.debug {
            debug!(name = %request.name, query = %request.query, "GraphQL query");
        }

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.token)
            .json(&GraphqlRequest {
                query: &request.query,
            })
            .send()
            .await
            .map_err(|e| ContribError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(response).await.into());
        }

        let body: GraphqlResponse = response
            .json()
            .await
            .map_err(|e| ContribError::InvalidResponse(e.to_string()))?;

        if request.options.verbose {
            info!(
                name = %request.name,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "GraphQL request completed"
            );
        }

        let messages: Vec<&str> = body.errors.iter().map(|e| e.message.as_str()).collect();
        match body.data {
            Some(data) if !data.is_null() => {
                if !messages.is_empty() {
                    warn!(name = %request.name, errors = ?messages, "GraphQL response carried errors");
                }
                Ok(data)
            }
            _ if !messages.is_empty() => Err(ContribError::Graphql(messages.join("; ")).into()),
            _ => Err(ContribError::InvalidResponse("response has no data".to_string()).into()),
        }
    }
}

async fn status_error(response: reqwest::Response) -> ContribError {
    let status = response.status();
    let rate_limited = status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN
            && response
                .headers()
                .get("x-ratelimit-remaining")
                .is_some_and(|v| v.as_bytes() == b"0"));
    if rate_limited {
        return ContribError::RateLimited;
    }

    let body = response.text().await.unwrap_or_else(|e| {
        debug!("Failed to read error response body: {e}");
        String::new()
    });
    ContribError::HttpStatus {
        status: status.as_u16(),
        body,
    }
}

impl GraphqlTransport for GithubClient {
    fn execute<'a>(
        &'a self,
        request: &'a QueryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Value>> + Send + 'a>> {
        Box::pin(self.post(request))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_endpoint() {
        assert!(GithubClient::with_endpoint("t", "not a url").is_err());
    }

    #[test]
    fn keeps_explicit_endpoint() {
        let client = GithubClient::with_endpoint("t", "http://localhost:1234/graphql").unwrap();
        assert_eq!(client.endpoint().as_str(), "http://localhost:1234/graphql");
    }
}
