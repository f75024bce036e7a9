//! Transport seam between query building and the GitHub API.

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use serde_json::Value;

/// Flags that shape a contribution fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Return the raw response without checking or summarising it.
    pub dry_run: bool,
    /// Log each request and how long it took.
    pub verbose: bool,
    /// Log query text and response sizes.
    pub debug: bool,
    /// Include commit authors of the default branch.
    pub commits: bool,
    /// Include reactors.
    pub reactions: bool,
    /// Page through every connection instead of accepting the first page.
    pub full: bool,
}

/// One GraphQL request.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    /// Short description for logs, e.g. `owner/repo`.
    pub name: String,
    /// GraphQL query text.
    pub query: String,
    /// Flags of the fetch this request belongs to.
    pub options: FetchOptions,
}

impl QueryRequest {
    /// Creates a request.
    pub fn new(name: impl Into<String>, query: impl Into<String>, options: FetchOptions) -> Self {
        Self {
            name: name.into(),
            query: query.into(),
            options,
        }
    }
}

/// Executes GraphQL requests.
///
/// Implementations resolve to the response `data` object and fail on
/// network, authentication and rate-limit errors. They do not retry.
pub trait GraphqlTransport: Send + Sync {
    /// Executes `request` and returns the response `data`.
    fn execute<'a>(
        &'a self,
        request: &'a QueryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Value>> + Send + 'a>>;
}
