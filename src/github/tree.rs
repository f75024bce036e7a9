//! Typed model of the GraphQL response tree.
//!
//! Mirrors the selections built in [`crate::github::query`]. Optional
//! selections (reactions, commit history) deserialize to `None` when the
//! query did not ask for them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ContribError;
use crate::synopsis::Actor;

/// Pagination state of a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Whether more nodes exist after `end_cursor`.
    #[serde(default)]
    pub has_next_page: bool,
    /// Cursor of the last node in this page.
    #[serde(default)]
    pub end_cursor: Option<String>,
}

/// A paginated GraphQL connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct Connection<T> {
    /// Pagination state after the nodes held here.
    #[serde(default)]
    pub page_info: PageInfo,
    /// Nodes fetched so far. Null entries in the response are skipped.
    #[serde(default = "Vec::new", deserialize_with = "non_null_nodes")]
    pub nodes: Vec<T>,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self {
            page_info: PageInfo::default(),
            nodes: Vec::new(),
        }
    }
}

impl<T> Connection<T> {
    /// Returns true when the server reported further pages.
    pub fn is_truncated(&self) -> bool {
        self.page_info.has_next_page
    }
}

fn non_null_nodes<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let nodes: Option<Vec<Option<T>>> = Option::deserialize(deserializer)?;
    Ok(nodes.unwrap_or_default().into_iter().flatten().collect())
}

/// A reaction left on a pull request, issue or comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    /// When the reaction was added.
    pub created_at: DateTime<Utc>,
    /// Who reacted.
    #[serde(default)]
    pub user: Option<Actor>,
}

/// A comment on a pull request or issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Global node id.
    pub id: String,
    /// When the comment was posted.
    pub created_at: DateTime<Utc>,
    /// Who posted it.
    #[serde(default)]
    pub author: Option<Actor>,
    /// Reactions on the comment, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reactions: Option<Connection<Reaction>>,
}

/// Which kind of discussion a [`Thread`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadKind {
    /// A pull request.
    PullRequest,
    /// An issue.
    Issue,
}

impl ThreadKind {
    /// GraphQL object type name.
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::PullRequest => "PullRequest",
            Self::Issue => "Issue",
        }
    }
}

/// A pull request or issue: an opening post plus its comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    /// Global node id.
    pub id: String,
    /// When the thread was opened.
    pub created_at: DateTime<Utc>,
    /// Who opened it.
    #[serde(default)]
    pub author: Option<Actor>,
    /// Comments on the thread.
    #[serde(default)]
    pub comments: Connection<Comment>,
    /// Reactions on the opening post, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reactions: Option<Connection<Reaction>>,
}

/// Git identity attached to a commit; `user` is the linked GitHub account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitActor {
    /// Linked GitHub account, absent for unknown emails.
    #[serde(default)]
    pub user: Option<Actor>,
}

/// One commit of the default branch history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitNode {
    /// When the commit was committed.
    pub committed_date: DateTime<Utc>,
    /// Commit author.
    #[serde(default)]
    pub author: Option<GitActor>,
}

/// Head commit of the default branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitTarget {
    /// Global node id of the head commit.
    pub id: String,
    /// Commit history reachable from the head.
    #[serde(default)]
    pub history: Option<Connection<CommitNode>>,
}

/// Default branch reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRef {
    /// Object the branch points at.
    #[serde(default)]
    pub target: Option<CommitTarget>,
}

/// A repository and the activity selected for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    /// Global node id.
    pub id: String,
    /// Repository name.
    pub name: String,
    /// Pull requests.
    #[serde(default)]
    pub pull_requests: Connection<Thread>,
    /// Issues.
    #[serde(default)]
    pub issues: Connection<Thread>,
    /// Default branch, present when commit history was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branch_ref: Option<BranchRef>,
}

impl Repository {
    /// Commit history of the default branch, if it was selected.
    pub fn history(&self) -> Option<&Connection<CommitNode>> {
        self.default_branch_ref
            .as_ref()
            .and_then(|branch| branch.target.as_ref())
            .and_then(|target| target.history.as_ref())
    }
}

/// An organization and its repositories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// Global node id.
    pub id: String,
    /// Repositories owned by the organization.
    #[serde(default)]
    pub repositories: Connection<Repository>,
}

/// Top-level entity a query asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    /// `repository(owner:, name:)`
    Repository,
    /// `organization(login:)`
    Organization,
}

impl RootKind {
    /// Key under which the entity appears in the response `data`.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Repository => "repository",
            Self::Organization => "organization",
        }
    }
}

/// A decoded response tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Root {
    /// Result of a repository query.
    Repository(Repository),
    /// Result of an organization query.
    Organization(Organization),
}

impl Root {
    /// Decodes the response `data` of a root query.
    ///
    /// An absent or null root key means the entity does not exist or the
    /// token cannot see it; that is reported as [`ContribError::MissingRoot`]
    /// rather than as an empty tree.
    pub fn from_response(kind: RootKind, context: &str, data: Value) -> Result<Self, ContribError> {
        let missing = || ContribError::MissingRoot {
            key: kind.key().to_string(),
            context: context.to_string(),
        };

        let Value::Object(mut fields) = data else {
            return Err(missing());
        };
        let entity = match fields.remove(kind.key()) {
            None | Some(Value::Null) => return Err(missing()),
            Some(entity) => entity,
        };

        let decoded = match kind {
            RootKind::Repository => serde_json::from_value(entity).map(Self::Repository),
            RootKind::Organization => serde_json::from_value(entity).map(Self::Organization),
        };
        decoded.map_err(|e| ContribError::InvalidResponse(format!("{context}: {e}")))
    }
}
