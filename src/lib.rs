//! # gh-contrib
//!
//! Summarises who contributed to GitHub repositories and organizations.
//!
//! ## Features
//!
//! - Pull request, issue, comment, commit and reaction contributors per repository
//! - Organization-wide and config-driven batch aggregation
//! - Time-window filtering with inclusive UTC boundaries
//! - Full pagination through the GitHub GraphQL API
//!
//! ## Quick Start
//!
//! ```rust
//! use gh_contrib::synopsis::{merge_contributions, ContributorRecord};
//!
//! let record = ContributorRecord {
//!     login: "octocat".to_string(),
//!     name: None,
//!     url: "https://github.com/octocat".to_string(),
//!     count: 1,
//! };
//! let merged = merge_contributions([&record, &record]);
//! assert_eq!(merged[0].count, 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod batch;
pub mod cli;
pub mod data;
pub mod error;
pub mod github;
pub mod synopsis;
pub mod utils;

pub use crate::cli::Cli;
pub use crate::error::ContribError;

/// The current version of gh-contrib.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
