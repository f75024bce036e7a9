//! Org command: contributors across an organization.

use anyhow::Result;
use clap::Parser;

use super::args::FetchArgs;
use super::GlobalArgs;
use crate::data::render_contributions;
use crate::github::{org_contributors, GithubClient};

/// Org command options.
#[derive(Parser)]
pub struct OrgCommand {
    /// Organization login.
    #[arg(value_name = "LOGIN")]
    pub login: String,

    /// Fetch and output options.
    #[command(flatten)]
    pub fetch: FetchArgs,
}

impl OrgCommand {
    /// Executes the org command.
    pub async fn execute(self, global: &GlobalArgs) -> Result<()> {
        let window = self.fetch.window()?;
        let options = self.fetch.options(global);
        let client = GithubClient::new(global.require_token()?)?;

        let contributions = org_contributors(&client, &self.login, &window, &options).await?;
        print!("{}", render_contributions(&contributions, self.fetch.format)?);
        Ok(())
    }
}
