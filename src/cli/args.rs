//! Fetch options shared by the repo, org and batch commands.

use clap::Args;

use super::GlobalArgs;
use crate::data::OutputFormat;
use crate::error::ContribError;
use crate::github::FetchOptions;
use crate::synopsis::TimeWindow;

/// What to fetch and how to print it.
#[derive(Args, Debug, Clone, Default)]
pub struct FetchArgs {
    /// Ignores activity after this instant (RFC 3339, date-time, date, YYYY-MM or YYYY; UTC).
    #[arg(long, value_name = "WHEN")]
    pub before: Option<String>,

    /// Ignores activity before this instant (same formats as --before).
    #[arg(long, value_name = "WHEN")]
    pub after: Option<String>,

    /// Also counts commit authors on the default branch.
    #[arg(long)]
    pub commits: bool,

    /// Also counts people who reacted to threads and comments.
    #[arg(long)]
    pub reactions: bool,

    /// Follows every page instead of stopping at the first 100 items per list.
    #[arg(long)]
    pub full: bool,

    /// Prints the raw response without checking or summarising it.
    #[arg(long)]
    pub dry_run: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,
}

impl FetchArgs {
    /// Parses `--after`/`--before` into a window.
    pub fn window(&self) -> Result<TimeWindow, ContribError> {
        TimeWindow::parse(self.after.as_deref(), self.before.as_deref())
    }

    /// Combines these flags with the global ones.
    pub fn options(&self, global: &GlobalArgs) -> FetchOptions {
        FetchOptions {
            dry_run: self.dry_run,
            verbose: global.verbose,
            debug: global.debug,
            commits: self.commits,
            reactions: self.reactions,
            full: self.full,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn window_parses_both_boundaries() {
        let args = FetchArgs {
            after: Some("2020-01".to_string()),
            before: Some("2020-06-30T12:00:00Z".to_string()),
            ..FetchArgs::default()
        };
        let window = args.window().unwrap();
        assert_eq!(window.after, Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(window.before, Utc.with_ymd_and_hms(2020, 6, 30, 12, 0, 0).unwrap());
    }

    #[test]
    fn bad_boundary_is_rejected() {
        let args = FetchArgs {
            before: Some("soon".to_string()),
            ..FetchArgs::default()
        };
        assert!(matches!(args.window(), Err(ContribError::InvalidTimestamp(_))));
    }

    #[test]
    fn options_merge_global_flags() {
        let args = FetchArgs {
            full: true,
            reactions: true,
            ..FetchArgs::default()
        };
        let global = GlobalArgs {
            verbose: true,
            ..GlobalArgs::default()
        };
        let options = args.options(&global);
        assert!(options.full && options.reactions && options.verbose);
        assert!(!options.commits && !options.debug && !options.dry_run);
    }
}
