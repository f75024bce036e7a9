//! Whoami command.

use anyhow::Result;
use clap::Parser;

use super::GlobalArgs;
use crate::github::{current_user, GithubClient};

/// Whoami command options.
#[derive(Parser)]
pub struct WhoamiCommand {}

impl WhoamiCommand {
    /// Executes the whoami command.
    pub async fn execute(self, global: &GlobalArgs) -> Result<()> {
        let client = GithubClient::new(global.require_token()?)?;
        println!("{}", current_user(&client).await?);
        Ok(())
    }
}
