//! Contribution fetches for single repositories and organizations.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::query;
use super::remote::RepoSlug;
use super::resolver::TreeResolver;
use super::transport::{FetchOptions, GraphqlTransport, QueryRequest};
use super::tree::{Root, RootKind};
use crate::error::ContribError;
use crate::synopsis::{Synopsis, SynopsisBuilder, TimeWindow};

/// Result of a contribution fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Contributions {
    /// Deduplicated contributors by category.
    Synopsis(Synopsis),
    /// Unexamined response `data`, returned in dry-run mode.
    Raw(Value),
}

impl Contributions {
    /// Returns the synopsis, unless this is a dry-run result.
    pub fn synopsis(&self) -> Option<&Synopsis> {
        match self {
            Self::Synopsis(synopsis) => Some(synopsis),
            Self::Raw(_) => None,
        }
    }
}

/// Fetches and summarises contributions to one repository.
pub async fn repo_contributors<T: GraphqlTransport + ?Sized>(
    transport: &T,
    slug: &RepoSlug,
    window: &TimeWindow,
    options: &FetchOptions,
) -> Result<Contributions> {
    let request = QueryRequest::new(
        slug.to_string(),
        query::repository(&slug.owner, &slug.repo, window, options),
        *options,
    );
    summarize(transport, RootKind::Repository, request, window, options).await
}

/// Fetches contributions to every repository of an organization and merges them.
pub async fn org_contributors<T: GraphqlTransport + ?Sized>(
    transport: &T,
    login: &str,
    window: &TimeWindow,
    options: &FetchOptions,
) -> Result<Contributions> {
    let request = QueryRequest::new(login, query::organization(login, window, options), *options);
    summarize(transport, RootKind::Organization, request, window, options).await
}

async fn summarize<T: GraphqlTransport + ?Sized>(
    transport: &T,
    kind: RootKind,
    request: QueryRequest,
    window: &TimeWindow,
    options: &FetchOptions,
) -> Result<Contributions> {
    info!(
        target_name = %request.name,
        full = options.full,
        after = %window.after,
        before = %window.before,
        "Fetching contributions"
    );
    let data = transport.execute(&request).await?;

    if options.dry_run {
        debug!(target_name = %request.name, "Dry run, returning raw response");
        return Ok(Contributions::Raw(data));
    }

    let mut root = Root::from_response(kind, &request.name, data)?;
    if options.full {
        TreeResolver::new(transport, window, *options)
            .resolve(&mut root)
            .await
            .with_context(|| format!("Failed to resolve full tree for {}", request.name))?;
    }

    let synopsis = SynopsisBuilder::new(*window)
        .with_commits(options.commits)
        .with_reactions(options.reactions)
        .build(&root);
    Ok(Contributions::Synopsis(synopsis))
}

/// Returns the login of the account the transport authenticates as.
pub async fn current_user<T: GraphqlTransport + ?Sized>(transport: &T) -> Result<String> {
    let request = QueryRequest::new("viewer", query::WHO_AM_I, FetchOptions::default());
    let data = transport.execute(&request).await?;
    data.pointer("/viewer/login")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ContribError::InvalidResponse("viewer login missing".to_string()).into())
}
