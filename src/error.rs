//! Error kinds surfaced by contribution fetching and aggregation.

use thiserror::Error;

/// Errors raised while fetching and summarising contributions.
///
/// Application code wraps these in [`anyhow::Error`]; callers that need to
/// tell the kinds apart can `downcast_ref::<ContribError>()`.
#[derive(Error, Debug)]
pub enum ContribError {
    /// No GitHub token was supplied by the config file or the caller.
    #[error("No token specified in config or arguments. Aborting.")]
    MissingToken,

    /// The response lacks the root entity the query asked for.
    #[error("Bad query: {key} '{context}' does not exist")]
    MissingRoot {
        /// Root key that was expected in the response (`repository`, `organization`).
        key: String,
        /// Human-readable query subject, e.g. `owner/repo`.
        context: String,
    },

    /// The request never produced an HTTP response.
    #[error("Network error: {0}")]
    Network(String),

    /// GitHub answered with a non-success status.
    #[error("GitHub API request failed: HTTP {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// GitHub rejected the request because the rate limit is exhausted.
    #[error("GitHub API rate limit exceeded. Please try again later")]
    RateLimited,

    /// The GraphQL endpoint returned an `errors` array.
    #[error("GraphQL query failed: {0}")]
    Graphql(String),

    /// The response does not have the shape the query selects.
    #[error("Invalid response from GitHub API: {0}")]
    InvalidResponse(String),

    /// A repository identifier or remote URL could not be parsed.
    #[error("Cannot parse GitHub repository from '{0}'")]
    InvalidRemoteUrl(String),

    /// A window boundary could not be parsed as a timestamp.
    #[error("Invalid timestamp '{0}'. Expected RFC 3339, YYYY-MM-DD[THH:MM[:SS]], YYYY-MM or YYYY")]
    InvalidTimestamp(String),
}
