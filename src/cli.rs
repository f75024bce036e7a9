//! CLI interface for gh-contrib.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::error::ContribError;
use crate::utils::settings::resolve_token;

pub mod args;
pub mod batch;
pub mod org;
pub mod repo;
pub mod whoami;

/// gh-contrib: summarises who contributed to GitHub repositories and organizations.
#[derive(Parser)]
#[command(name = "gh-contrib")]
#[command(about = "Summarises contributors to GitHub repositories and organizations", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Options shared by every command.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// GitHub token; falls back to GITHUB_TOKEN, GH_TOKEN and the settings file.
    #[arg(long, global = true, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Logs each request and its timing.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logs query text and pagination progress.
    #[arg(long, global = true)]
    pub debug: bool,
}

impl GlobalArgs {
    /// Log filter implied by the flags, used when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "debug"
        } else if self.verbose {
            "info"
        } else {
            "warn"
        }
    }

    /// Token from the flag, environment or settings, if any.
    pub fn caller_token(&self) -> Option<String> {
        resolve_token(self.token.as_deref())
    }

    /// Token from the flag, environment or settings; required.
    pub fn require_token(&self) -> Result<String, ContribError> {
        self.caller_token().ok_or(ContribError::MissingToken)
    }
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Contributors to one repository (defaults to the current one).
    Repo(repo::RepoCommand),
    /// Contributors to every repository of an organization.
    Org(org::OrgCommand),
    /// Contributors to the repositories and organizations of a config file.
    Batch(batch::BatchCommand),
    /// Shows the login the token authenticates as.
    Whoami(whoami::WhoamiCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Repo(cmd) => cmd.execute(&self.global).await,
            Commands::Org(cmd) => cmd.execute(&self.global).await,
            Commands::Batch(cmd) => cmd.execute(&self.global).await,
            Commands::Whoami(cmd) => cmd.execute(&self.global).await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;
    use crate::data::OutputFormat;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "gh-contrib", "repo", "o/r", "--token", "t", "--debug", "--format", "json",
        ])
        .unwrap();
        assert_eq!(cli.global.token.as_deref(), Some("t"));
        assert_eq!(cli.global.log_filter(), "debug");
        let Commands::Repo(cmd) = cli.command else {
            panic!("expected repo command");
        };
        assert_eq!(cmd.repository.as_deref(), Some("o/r"));
        assert_eq!(cmd.fetch.format, OutputFormat::Json);
    }

    #[test]
    fn log_filter_defaults_to_warn() {
        assert_eq!(GlobalArgs::default().log_filter(), "warn");
        let verbose = GlobalArgs {
            verbose: true,
            ..GlobalArgs::default()
        };
        assert_eq!(verbose.log_filter(), "info");
    }

    #[test]
    fn org_requires_login() {
        assert!(Cli::try_parse_from(["gh-contrib", "org"]).is_err());
    }
}
