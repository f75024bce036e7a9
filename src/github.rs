//! GitHub GraphQL access: queries, transport, response tree and full-mode resolution.

pub mod client;
pub mod fetch;
pub mod query;
pub mod remote;
pub mod resolver;
pub mod transport;
pub mod tree;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod test_utils;

pub use client::GithubClient;
pub use fetch::{current_user, org_contributors, repo_contributors, Contributions};
pub use remote::{current_repo_info, parse_git_url, repo_info_at, RepoSlug};
pub use resolver::TreeResolver;
pub use transport::{FetchOptions, GraphqlTransport, QueryRequest};
pub use tree::{Root, RootKind};
