//! Config-driven batch fetches over many repositories and organizations.
//!
//! Every entry is fetched concurrently. Results come back in config order
//! whatever order the requests complete in. The batch is all-or-nothing:
//! the first failing entry fails the whole batch and the other results
//! are dropped.

use std::path::Path;

use anyhow::{Context, Result};
use futures::future::{try_join, try_join_all};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::data::yaml::from_yaml;
use crate::error::ContribError;
use crate::github::{
    org_contributors, repo_contributors, Contributions, FetchOptions, GraphqlTransport, RepoSlug,
};
use crate::synopsis::TimeWindow;

/// Batch configuration file contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// GitHub token; takes precedence over the caller's token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Repositories to summarise.
    #[serde(default)]
    pub repos: Vec<RepoEntry>,
    /// Organizations to summarise.
    #[serde(default)]
    pub orgs: Vec<OrgEntry>,
}

/// A repository entry of the batch config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoEntry {
    /// Owner login.
    pub login: String,
    /// Repository name.
    pub repo: String,
    /// Latest instant to include.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    /// Earliest instant to include.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

/// An organization entry of the batch config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgEntry {
    /// Organization login.
    pub login: String,
    /// Latest instant to include.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    /// Earliest instant to include.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

/// A repository entry annotated with its contributions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoReport {
    /// The config entry, as given.
    #[serde(flatten)]
    pub entry: RepoEntry,
    /// What was found for it.
    pub contributions: Contributions,
}

/// An organization entry annotated with its contributions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrgReport {
    /// The config entry, as given.
    #[serde(flatten)]
    pub entry: OrgEntry,
    /// What was found for it.
    pub contributions: Contributions,
}

/// Results of a batch, in config order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// One report per repository entry.
    pub repos: Vec<RepoReport>,
    /// One report per organization entry.
    pub orgs: Vec<OrgReport>,
}

impl BatchConfig {
    /// Loads a config file; `.yaml`/`.yml` files are read as YAML, anything else as JSON.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

        if is_yaml {
            from_yaml(&content)
        } else {
            serde_json::from_str(&content).map_err(anyhow::Error::from)
        }
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Picks the config token, falling back to the caller's.
    pub fn resolve_token(&self, caller_token: Option<&str>) -> Result<String, ContribError> {
        self.token
            .as_deref()
            .or(caller_token)
            .filter(|token| !token.trim().is_empty())
            .map(str::to_string)
            .ok_or(ContribError::MissingToken)
    }
}

/// Resolves the token, connects a transport with it, and runs the batch.
///
/// A missing token fails before `connect` is called.
pub async fn run_batch<T, F>(
    config: &BatchConfig,
    caller_token: Option<&str>,
    options: &FetchOptions,
    connect: F,
) -> Result<BatchReport>
where
    T: GraphqlTransport,
    F: FnOnce(String) -> Result<T>,
{
    let token = config.resolve_token(caller_token)?;
    let transport = connect(token)?;
    fetch_all(&transport, config, options).await
}

/// Fetches every entry of `config` concurrently through `transport`.
pub async fn fetch_all<T: GraphqlTransport + ?Sized>(
    transport: &T,
    config: &BatchConfig,
    options: &FetchOptions,
) -> Result<BatchReport> {
    let repo_windows = config
        .repos
        .iter()
        .map(|entry| window_for(entry.after.as_deref(), entry.before.as_deref()))
        .collect::<Result<Vec<_>>>()?;
    let org_windows = config
        .orgs
        .iter()
        .map(|entry| window_for(entry.after.as_deref(), entry.before.as_deref()))
        .collect::<Result<Vec<_>>>()?;

    info!(
        repos = config.repos.len(),
        orgs = config.orgs.len(),
        "Starting batch fetch"
    );

    let repo_fetches = config.repos.iter().zip(&repo_windows).map(|(entry, window)| async move {
        let slug = RepoSlug::new(&entry.login, &entry.repo);
        repo_contributors(transport, &slug, window, options)
            .await
            .with_context(|| format!("Failed to fetch contributions for repository {slug}"))
    });
    let org_fetches = config.orgs.iter().zip(&org_windows).map(|(entry, window)| async move {
        org_contributors(transport, &entry.login, window, options)
            .await
            .with_context(|| format!("Failed to fetch contributions for organization {}", entry.login))
    });

    let (repo_results, org_results) =
        try_join(try_join_all(repo_fetches), try_join_all(org_fetches)).await?;

    Ok(BatchReport {
        repos: config
            .repos
            .iter()
            .cloned()
            .zip(repo_results)
            .map(|(entry, contributions)| RepoReport {
                entry,
                contributions,
            })
            .collect(),
        orgs: config
            .orgs
            .iter()
            .cloned()
            .zip(org_results)
            .map(|(entry, contributions)| OrgReport {
                entry,
                contributions,
            })
            .collect(),
    })
}

fn window_for(after: Option<&str>, before: Option<&str>) -> Result<TimeWindow> {
    Ok(TimeWindow::parse(after, before)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::cell::Cell;

    use serde_json::{json, Value};

    use super::*;
    use crate::github::test_utils::{RoutedTransport, ScriptedTransport};

    fn repo_data(login: &str) -> Value {
        json!({"repository": {
            "id": "R", "name": "r",
            "pullRequests": {"nodes": [
                {"id": "PR", "createdAt": "2020-06-01T00:00:00Z",
                 "author": {"login": login, "url": "u"}, "comments": {"nodes": []}}
            ]},
            "issues": {"nodes": []}
        }})
    }

    fn org_data(login: &str) -> Value {
        json!({"organization": {"id": "O", "repositories": {"nodes": [repo_data(login)["repository"].clone()]}}})
    }

    fn repo(login: &str, repo: &str) -> RepoEntry {
        RepoEntry {
            login: login.to_string(),
            repo: repo.to_string(),
            before: None,
            after: None,
        }
    }

    fn creator(contributions: &Contributions) -> &str {
        &contributions.synopsis().unwrap().pr_creators[0].login
    }

    #[tokio::test]
    async fn results_follow_config_order_not_completion_order() {
        let transport = RoutedTransport::new()
            .route(r#"owner: "one""#, 60, repo_data("first"))
            .route(r#"owner: "two""#, 5, repo_data("second"))
            .route(r#"organization(login: "acme")"#, 30, org_data("third"));
        let config = BatchConfig {
            token: None,
            repos: vec![repo("one", "r"), repo("two", "r")],
            orgs: vec![OrgEntry {
                login: "acme".to_string(),
                before: None,
                after: None,
            }],
        };

        let report = fetch_all(&transport, &config, &FetchOptions::default())
            .await
            .unwrap();

        assert_eq!(
            transport.completion_order(),
            vec![
                r#"owner: "two""#.to_string(),
                r#"organization(login: "acme")"#.to_string(),
                r#"owner: "one""#.to_string()
            ]
        );
        assert_eq!(report.repos.len(), 2);
        assert_eq!(report.repos[0].entry, repo("one", "r"));
        assert_eq!(creator(&report.repos[0].contributions), "first");
        assert_eq!(creator(&report.repos[1].contributions), "second");
        assert_eq!(report.orgs.len(), 1);
        assert_eq!(creator(&report.orgs[0].contributions), "third");
    }

    #[tokio::test]
    async fn one_failure_fails_the_batch() {
        let transport = ScriptedTransport::new(vec![
            Ok(repo_data("a")),
            Err(crate::error::ContribError::RateLimited.into()),
        ]);
        let config = BatchConfig {
            token: None,
            repos: vec![repo("a", "r"), repo("b", "r")],
            orgs: vec![],
        };

        let err = fetch_all(&transport, &config, &FetchOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Failed to fetch contributions for repository"));
        assert!(matches!(
            err.downcast_ref::<ContribError>(),
            Some(ContribError::RateLimited)
        ));
    }

    #[tokio::test]
    async fn missing_token_fails_before_connecting() {
        let connected = Cell::new(false);
        let config = BatchConfig::default();

        let err = run_batch(&config, None, &FetchOptions::default(), |_| {
            connected.set(true);
            Ok(ScriptedTransport::new(vec![]))
        })
        .await
        .unwrap_err();

        assert!(!connected.get());
        assert!(matches!(
            err.downcast_ref::<ContribError>(),
            Some(ContribError::MissingToken)
        ));
    }

    #[tokio::test]
    async fn config_token_wins_over_caller() {
        let config = BatchConfig {
            token: Some("from-config".to_string()),
            ..BatchConfig::default()
        };
        let mut seen = None;

        let report = run_batch(&config, Some("from-caller"), &FetchOptions::default(), |token| {
            seen = Some(token);
            Ok(ScriptedTransport::new(vec![]))
        })
        .await
        .unwrap();

        assert_eq!(seen.as_deref(), Some("from-config"));
        assert!(report.repos.is_empty() && report.orgs.is_empty());
    }

    #[test]
    fn caller_token_is_fallback() {
        let config = BatchConfig::default();
        assert_eq!(config.resolve_token(Some("t")).unwrap(), "t");
        assert!(matches!(config.resolve_token(Some("  ")), Err(ContribError::MissingToken)));
    }

    #[tokio::test]
    async fn malformed_boundary_fails_before_network() {
        let transport = ScriptedTransport::new(vec![]);
        let queries = transport.query_handle();
        let config = BatchConfig {
            token: None,
            repos: vec![RepoEntry {
                after: Some("last tuesday".to_string()),
                ..repo("a", "r")
            }],
            orgs: vec![],
        };

        let err = fetch_all(&transport, &config, &FetchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ContribError>(),
            Some(ContribError::InvalidTimestamp(_))
        ));
        assert!(queries.queries().is_empty());
    }

    #[test]
    fn loads_json_and_yaml_configs() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("config.json");
        std::fs::write(
            &json_path,
            r#"{"token": "abc", "repos": [{"login": "o", "repo": "r", "after": "2020-01-01"}]}"#,
        )
        .unwrap();
        let config = BatchConfig::load(&json_path).unwrap();
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert_eq!(config.repos[0].after.as_deref(), Some("2020-01-01"));
        assert!(config.orgs.is_empty());

        let yaml_path = dir.path().join("config.yml");
        std::fs::write(&yaml_path, "orgs:\n  - login: acme\n    before: '2021-01-01'\n").unwrap();
        let config = BatchConfig::load(&yaml_path).unwrap();
        assert_eq!(config.orgs[0].login, "acme");
        assert_eq!(config.orgs[0].before.as_deref(), Some("2021-01-01"));
        assert!(config.token.is_none());
    }

    #[test]
    fn report_flattens_entry_fields() {
        let report = RepoReport {
            entry: repo("o", "r"),
            contributions: Contributions::Raw(json!({"x": 1})),
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value, json!({"login": "o", "repo": "r", "contributions": {"x": 1}}));
    }
}
