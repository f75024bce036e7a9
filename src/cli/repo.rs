//! Repo command: contributors to a single repository.

use anyhow::{Context, Result};
use clap::Parser;

use super::args::FetchArgs;
use super::GlobalArgs;
use crate::data::render_contributions;
use crate::github::{current_repo_info, repo_contributors, GithubClient, RepoSlug};

/// Repo command options.
#[derive(Parser)]
pub struct RepoCommand {
    /// Repository as OWNER/REPO or a GitHub URL (defaults to the origin remote).
    #[arg(value_name = "OWNER/REPO")]
    pub repository: Option<String>,

    /// Fetch and output options.
    #[command(flatten)]
    pub fetch: FetchArgs,
}

impl RepoCommand {
    /// Executes the repo command.
    pub async fn execute(self, global: &GlobalArgs) -> Result<()> {
        let slug = self.slug()?;
        let window = self.fetch.window()?;
        let options = self.fetch.options(global);
        let client = GithubClient::new(global.require_token()?)?;

        let contributions = repo_contributors(&client, &slug, &window, &options).await?;
        print!("{}", render_contributions(&contributions, self.fetch.format)?);
        Ok(())
    }

    fn slug(&self) -> Result<RepoSlug> {
        match &self.repository {
            Some(repository) => Ok(repository.parse()?),
            None => current_repo_info()
                .context("No repository given and none found in the current directory"),
        }
    }
}
