//! Batch command: contributors for every entry of a config file.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::warn;

use super::args::FetchArgs;
use super::GlobalArgs;
use crate::batch::{run_batch, BatchConfig};
use crate::data::render_batch;
use crate::github::GithubClient;

/// Batch command options.
#[derive(Parser)]
pub struct BatchCommand {
    /// Config file (JSON, or YAML for .yaml/.yml) listing repos and orgs.
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Fetch and output options; per-entry windows come from the config.
    #[command(flatten)]
    pub fetch: FetchArgs,
}

impl BatchCommand {
    /// Executes the batch command.
    pub async fn execute(self, global: &GlobalArgs) -> Result<()> {
        if self.fetch.before.is_some() || self.fetch.after.is_some() {
            warn!("--before/--after are ignored in batch mode; set them per config entry");
        }

        let config = BatchConfig::load(&self.config)?;
        let options = self.fetch.options(global);
        let caller_token = global.caller_token();

        let report = run_batch(&config, caller_token.as_deref(), &options, GithubClient::new).await?;
        print!("{}", render_batch(&report, self.fetch.format)?);
        Ok(())
    }
}
