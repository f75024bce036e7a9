//! Full-mode tree resolution.
//!
//! A single GraphQL query returns at most one page per connection. The
//! resolver walks a decoded tree and keeps requesting the next page of every
//! truncated connection until GitHub reports no further pages, so the
//! resulting tree holds what an unbounded query would have returned.
//! Requests are issued one at a time since each depends on the previous
//! page's cursor.

use std::collections::HashSet;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use super::query::{self, PagedField};
use super::transport::{FetchOptions, GraphqlTransport, QueryRequest};
use super::tree::{Connection, Organization, Repository, Root, Thread, ThreadKind};
use crate::error::ContribError;
use crate::synopsis::TimeWindow;

/// Pages through every truncated connection of a response tree.
pub struct TreeResolver<'a, T: ?Sized> {
    transport: &'a T,
    window: &'a TimeWindow,
    options: FetchOptions,
}

impl<'a, T: GraphqlTransport + ?Sized> TreeResolver<'a, T> {
    /// Creates a resolver issuing follow-up queries through `transport`.
    pub fn new(transport: &'a T, window: &'a TimeWindow, options: FetchOptions) -> Self {
        Self {
            transport,
            window,
            options,
        }
    }

    /// Completes every connection reachable from `root`.
    pub async fn resolve(&self, root: &mut Root) -> Result<()> {
        match root {
            Root::Repository(repo) => self.resolve_repository(repo).await,
            Root::Organization(org) => self.resolve_organization(org).await,
        }
    }

    /// Completes an organization and each of its repositories.
    pub async fn resolve_organization(&self, org: &mut Organization) -> Result<()> {
        self.drain(&org.id, PagedField::Repositories, &mut org.repositories)
            .await?;
        for repo in &mut org.repositories.nodes {
            self.resolve_repository(repo).await?;
        }
        Ok(())
    }

    /// Completes a repository's threads, their comments and reactions, and history.
    pub async fn resolve_repository(&self, repo: &mut Repository) -> Result<()> {
        self.drain(&repo.id, PagedField::PullRequests, &mut repo.pull_requests)
            .await?;
        self.drain(&repo.id, PagedField::Issues, &mut repo.issues)
            .await?;

        for pr in &mut repo.pull_requests.nodes {
            self.resolve_thread(pr, ThreadKind::PullRequest).await?;
        }
        for issue in &mut repo.issues.nodes {
            self.resolve_thread(issue, ThreadKind::Issue).await?;
        }

        if self.options.commits {
            let target = repo
                .default_branch_ref
                .as_mut()
                .and_then(|branch| branch.target.as_mut());
            if let Some(target) = target {
                if let Some(history) = target.history.as_mut() {
                    self.drain(&target.id, PagedField::History, history).await?;
                }
            }
        }

        info!(
            repository = %repo.name,
            pull_requests = repo.pull_requests.nodes.len(),
            issues = repo.issues.nodes.len(),
            "Resolved repository tree"
        );
        Ok(())
    }

    async fn resolve_thread(&self, thread: &mut Thread, kind: ThreadKind) -> Result<()> {
        self.drain(&thread.id, PagedField::Comments(kind), &mut thread.comments)
            .await?;

        if !self.options.reactions {
            return Ok(());
        }
        if let Some(reactions) = thread.reactions.as_mut() {
            self.drain(&thread.id, PagedField::Reactions, reactions)
                .await?;
        }
        for comment in &mut thread.comments.nodes {
            if let Some(reactions) = comment.reactions.as_mut() {
                self.drain(&comment.id, PagedField::Reactions, reactions)
                    .await?;
            }
        }
        Ok(())
    }

    /// Appends pages of `field` on `node_id` until the connection is exhausted.
    async fn drain<N: DeserializeOwned>(
        &self,
        node_id: &str,
        field: PagedField,
        connection: &mut Connection<N>,
    ) -> Result<()> {
        let mut seen = HashSet::new();
        while connection.page_info.has_next_page {
            let Some(cursor) = connection.page_info.end_cursor.clone() else {
                return Err(ContribError::InvalidResponse(format!(
                    "{} of {node_id} has more pages but no end cursor",
                    field.field_name()
                ))
                .into());
            };
            if !seen.insert(cursor.clone()) {
                return Err(ContribError::InvalidResponse(format!(
                    "{} of {node_id} repeated cursor {cursor}",
                    field.field_name()
                ))
                .into());
            }

            let request = QueryRequest::new(
                format!("{} of {node_id}", field.field_name()),
                query::page(node_id, field, &cursor, self.window, &self.options),
                self.options,
            );
            let data = self
                .transport
                .execute(&request)
                .await
                .with_context(|| format!("Failed to fetch {}", request.name))?;
            let page: Connection<N> = extract_page(data, node_id, field)?;

            debug!(
                node = node_id,
                field = field.field_name(),
                fetched = page.nodes.len(),
                more = page.page_info.has_next_page,
                "Fetched connection page"
            );
            connection.nodes.extend(page.nodes);
            connection.page_info = page.page_info;
        }
        Ok(())
    }
}

fn extract_page<N: DeserializeOwned>(
    mut data: Value,
    node_id: &str,
    field: PagedField,
) -> Result<Connection<N>, ContribError> {
    let page = data
        .get_mut("node")
        .and_then(|node| node.get_mut(field.field_name()))
        .map(Value::take)
        .filter(|page| !page.is_null())
        .ok_or_else(|| {
            ContribError::InvalidResponse(format!(
                "node {node_id} returned no {}",
                field.field_name()
            ))
        })?;
    serde_json::from_value(page)
        .map_err(|e| ContribError::InvalidResponse(format!("{} of {node_id}: {e}", field.field_name())))
}
