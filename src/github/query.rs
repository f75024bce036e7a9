//! GraphQL query strings for contribution fetches.
//!
//! Root queries select the first page of every connection. Follow-up
//! queries address a single connection through `node(id:)` and resume
//! after a cursor, selecting the same fields so the pages can be appended
//! to the tree unchanged.
//!
//! GitHub rejects a query whose node estimate (the sum over connections of
//! the product of `first:` along the path) exceeds [`MAX_NODE_LIMIT`]. Page
//! sizes therefore shrink with nesting depth; full mode pages the rest.

use chrono::SecondsFormat;

use super::transport::FetchOptions;
use super::tree::ThreadKind;
use crate::synopsis::TimeWindow;

/// Page size of a connection by nesting depth below the query root.
///
/// The outermost connection gets GitHub's cap of 100; deeper connections
/// reuse the last entry.
pub const PAGE_SIZES: [u32; 4] = [100, 20, 10, 5];

/// Largest node estimate GitHub accepts for one query.
pub const MAX_NODE_LIMIT: u64 = 500_000;

/// Returns the login of the token owner.
pub const WHO_AM_I: &str = "query { viewer { login } }";

/// Page size for a connection `depth` levels below the query root.
pub const fn page_size(depth: usize) -> u32 {
    if depth < PAGE_SIZES.len() {
        PAGE_SIZES[depth]
    } else {
        PAGE_SIZES[PAGE_SIZES.len() - 1]
    }
}

/// A connection that can be paged through on its parent node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagedField {
    /// `Organization.repositories`
    Repositories,
    /// `Repository.pullRequests`
    PullRequests,
    /// `Repository.issues`
    Issues,
    /// `PullRequest.comments` or `Issue.comments`
    Comments(ThreadKind),
    /// `Reactable.reactions`
    Reactions,
    /// `Commit.history`
    History,
}

impl PagedField {
    /// Field name in the GraphQL schema and in the response.
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Repositories => "repositories",
            Self::PullRequests => "pullRequests",
            Self::Issues => "issues",
            Self::Comments(_) => "comments",
            Self::Reactions => "reactions",
            Self::History => "history",
        }
    }

    const fn parent_type(self) -> &'static str {
        match self {
            Self::Repositories => "Organization",
            Self::PullRequests | Self::Issues => "Repository",
            Self::Comments(kind) => kind.type_name(),
            Self::Reactions => "Reactable",
            Self::History => "Commit",
        }
    }

    fn selection(self, cursor: Option<&str>, window: &TimeWindow, options: &FetchOptions) -> String {
        match self {
            Self::Repositories => repositories(cursor, 0, window, options),
            Self::PullRequests | Self::Issues => threads(self.field_name(), cursor, 0, options),
            Self::Comments(_) => comments(cursor, 0, options),
            Self::Reactions => reactions(cursor, 0),
            Self::History => history(cursor, 0, window),
        }
    }
}

/// Query for one repository's activity.
pub fn repository(owner: &str, name: &str, window: &TimeWindow, options: &FetchOptions) -> String {
    format!(
        "query {{ repository(owner: {}, name: {}) {{ {} }} }}",
        literal(owner),
        literal(name),
        repository_fields(0, window, options)
    )
}

/// Query for the activity of every repository in an organization.
pub fn organization(login: &str, window: &TimeWindow, options: &FetchOptions) -> String {
    format!(
        "query {{ organization(login: {}) {{ id {} }} }}",
        literal(login),
        repositories(None, 0, window, options)
    )
}

/// Query for the page of `field` on node `node_id` that follows `cursor`.
pub fn page(
    node_id: &str,
    field: PagedField,
    cursor: &str,
    window: &TimeWindow,
    options: &FetchOptions,
) -> String {
    format!(
        "query {{ node(id: {}) {{ ... on {} {{ {} }} }} }}",
        literal(node_id),
        field.parent_type(),
        field.selection(Some(cursor), window, options)
    )
}

/// Renders `value` as a GraphQL string literal.
fn literal(value: &str) -> String {
    // JSON string escaping is a subset of GraphQL's.
    serde_json::Value::String(value.to_string()).to_string()
}

fn page_arguments(cursor: Option<&str>, depth: usize) -> String {
    let first = page_size(depth);
    match cursor {
        Some(cursor) => format!("first: {first}, after: {}", literal(cursor)),
        None => format!("first: {first}"),
    }
}

const PAGE_INFO: &str = "pageInfo { hasNextPage endCursor }";
const ACTOR: &str = "login url ... on User { name }";
const USER: &str = "login url name";

fn reactions(cursor: Option<&str>, depth: usize) -> String {
    format!(
        "reactions({}) {{ {PAGE_INFO} nodes {{ createdAt user {{ {USER} }} }} }}",
        page_arguments(cursor, depth)
    )
}

fn comments(cursor: Option<&str>, depth: usize, options: &FetchOptions) -> String {
    let reactions = if options.reactions {
        reactions(None, depth + 1)
    } else {
        String::new()
    };
    format!(
        "comments({}) {{ {PAGE_INFO} nodes {{ id createdAt author {{ {ACTOR} }} {reactions} }} }}",
        page_arguments(cursor, depth)
    )
}

fn threads(field: &str, cursor: Option<&str>, depth: usize, options: &FetchOptions) -> String {
    let reactions = if options.reactions {
        reactions(None, depth + 1)
    } else {
        String::new()
    };
    format!(
        "{field}({}, orderBy: {{field: CREATED_AT, direction: DESC}}) {{ {PAGE_INFO} nodes {{ id createdAt author {{ {ACTOR} }} {} {reactions} }} }}",
        page_arguments(cursor, depth),
        comments(None, depth + 1, options)
    )
}

fn history(cursor: Option<&str>, depth: usize, window: &TimeWindow) -> String {
    let since = window.after.to_rfc3339_opts(SecondsFormat::Secs, true);
    let until = window.before.to_rfc3339_opts(SecondsFormat::Secs, true);
    format!(
        "history({}, since: {}, until: {}) {{ {PAGE_INFO} nodes {{ committedDate author {{ user {{ {USER} }} }} }} }}",
        page_arguments(cursor, depth),
        literal(&since),
        literal(&until)
    )
}

/// Fields of a repository whose own connections sit at `depth`.
fn repository_fields(depth: usize, window: &TimeWindow, options: &FetchOptions) -> String {
    let mut fields = format!(
        "id name {} {}",
        threads("pullRequests", None, depth, options),
        threads("issues", None, depth, options)
    );
    if options.commits {
        fields.push_str(&format!(
            " defaultBranchRef {{ target {{ id ... on Commit {{ {} }} }} }}",
            history(None, depth, window)
        ));
    }
    fields
}

fn repositories(
    cursor: Option<&str>,
    depth: usize,
    window: &TimeWindow,
    options: &FetchOptions,
) -> String {
    format!(
        "repositories({}) {{ {PAGE_INFO} nodes {{ {} }} }}",
        page_arguments(cursor, depth),
        repository_fields(depth + 1, window, options)
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::synopsis::parse_boundary;

    fn window() -> TimeWindow {
        TimeWindow::new(
            Some(parse_boundary("2020-01-01").unwrap()),
            Some(parse_boundary("2020-12-31T23:59:59Z").unwrap()),
        )
    }

    fn balanced(query: &str) -> bool {
        let mut depth = 0_i32;
        for c in query.chars() {
            match c {
                '{' | '(' => depth += 1,
                '}' | ')' => depth -= 1,
                _ => {}
            }
            if depth < 0 {
                return false;
            }
        }
        depth == 0
    }

    #[test]
    fn repository_query_selects_base_categories() {
        let query = repository("rust-lang", "rust", &window(), &FetchOptions::default());
        assert!(query.starts_with(r#"query { repository(owner: "rust-lang", name: "rust") {"#));
        assert!(query.contains("pullRequests(first: 100, orderBy"));
        assert!(query.contains("issues(first: 100, orderBy"));
        assert!(query.contains("comments(first: 20)"));
        assert!(!query.contains("reactions("));
        assert!(!query.contains("history("));
        assert!(balanced(&query));
    }

    #[test]
    fn optional_selections_follow_options() {
        let options = FetchOptions {
            commits: true,
            reactions: true,
            ..FetchOptions::default()
        };
        let query = repository("o", "r", &window(), &options);
        assert!(query.contains("reactions(first: 20)"));
        assert!(query.contains("reactions(first: 10)"));
        assert!(query.contains(
            r#"history(first: 100, since: "2020-01-01T00:00:00Z", until: "2020-12-31T23:59:59Z")"#
        ));
        assert!(balanced(&query));
    }

    #[test]
    fn organization_query_nests_repositories() {
        let query = organization("acme", &window(), &FetchOptions::default());
        assert!(query.starts_with(r#"query { organization(login: "acme") { id repositories(first: 100)"#));
        assert!(balanced(&query));
    }

    #[test]
    fn page_query_resumes_after_cursor() {
        let query = page(
            "PR_kw",
            PagedField::Comments(ThreadKind::PullRequest),
            "Y3Vyc29y",
            &window(),
            &FetchOptions::default(),
        );
        assert_eq!(
            query,
            r#"query { node(id: "PR_kw") { ... on PullRequest { comments(first: 100, after: "Y3Vyc29y") { pageInfo { hasNextPage endCursor } nodes { id createdAt author { login url ... on User { name } }  } } } } }"#
        );
    }

    /// GitHub's node estimate: for every connection, the product of the
    /// `first:` arguments on its path, summed over the query.
    fn node_estimate(query: &str) -> u64 {
        let mut total = 0;
        let mut products = vec![1_u64];
        let mut pending = None;
        let mut parens = 0_i32;

        for (i, c) in query.char_indices() {
            if parens > 0 {
                if let Some(rest) = query[i..].strip_prefix("first: ") {
                    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
                    pending = Some(digits.parse::<u64>().unwrap());
                }
            }
            match c {
                '(' => parens += 1,
                ')' => parens -= 1,
                '{' if parens == 0 => {
                    let outer = *products.last().unwrap();
                    let inner = pending.take().map_or(outer, |first| outer * first);
                    if inner != outer {
                        total += inner;
                    }
                    products.push(inner);
                }
                '}' if parens == 0 => {
                    products.pop();
                }
                _ => {}
            }
        }
        total
    }

    #[test]
    fn node_estimate_counts_nested_products() {
        assert_eq!(node_estimate("query { a(first: 10) { b(first: 5) { x } c(first: 2) { y } } }"), 80);
        assert_eq!(node_estimate(WHO_AM_I), 0);
    }

    #[test]
    fn every_query_stays_under_node_limit() {
        let all = FetchOptions {
            commits: true,
            reactions: true,
            ..FetchOptions::default()
        };
        let commits_only = FetchOptions {
            commits: true,
            ..FetchOptions::default()
        };
        let reactions_only = FetchOptions {
            reactions: true,
            ..FetchOptions::default()
        };

        for options in [FetchOptions::default(), commits_only, reactions_only, all] {
            let mut queries = vec![
                repository("o", "r", &window(), &options),
                organization("acme", &window(), &options),
            ];
            for field in [
                PagedField::Repositories,
                PagedField::PullRequests,
                PagedField::Issues,
                PagedField::Comments(ThreadKind::Issue),
                PagedField::Reactions,
                PagedField::History,
            ] {
                queries.push(page("N", field, "c", &window(), &options));
            }

            for query in queries {
                let estimate = node_estimate(&query);
                assert!(
                    estimate <= MAX_NODE_LIMIT,
                    "estimate {estimate} over limit for {options:?}: {query}"
                );
            }
        }
    }

    #[test]
    fn organization_estimate_with_everything_selected() {
        let all = FetchOptions {
            commits: true,
            reactions: true,
            ..FetchOptions::default()
        };
        // 100 repos x (2 x (20 + 20*10 + 20*10 + 20*10*5) + 20 commits) + 100
        assert_eq!(node_estimate(&organization("acme", &window(), &all)), 286_100);
        // 2 x (100 + 100*20 + 100*20 + 100*20*10) + 100 commits
        assert_eq!(node_estimate(&repository("o", "r", &window(), &all)), 48_300);
    }

    #[test]
    fn page_sizes_shrink_with_depth() {
        assert_eq!(page_size(0), 100);
        assert_eq!(page_size(1), 20);
        assert_eq!(page_size(3), 5);
        assert_eq!(page_size(9), 5);
    }

    #[test]
    fn literals_are_escaped() {
        let query = repository("o\"wner", "na\\me", &window(), &FetchOptions::default());
        assert!(query.contains(r#"owner: "o\"wner", name: "na\\me""#));
    }
}
