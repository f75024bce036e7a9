//! Timestamped contribution events and the accounts behind them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A GitHub account as reported by the GraphQL API.
///
/// `name` is only exposed for users; bots and organizations leave it unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Account login, the identity key for deduplication.
    pub login: String,
    /// Display name, if the account has one.
    #[serde(default)]
    pub name: Option<String>,
    /// Profile URL.
    #[serde(default)]
    pub url: String,
}

/// Anything that happened at a known instant.
pub trait Timestamped {
    /// Returns the instant the item was created.
    fn created_at(&self) -> DateTime<Utc>;
}

/// One contribution: who did something, and when.
///
/// `author` is `None` when GitHub reports a deleted or anonymized account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampedEvent<'a> {
    /// When the contribution was made.
    pub created_at: DateTime<Utc>,
    /// Who made it, if the account still exists.
    pub author: Option<&'a Actor>,
}

impl<'a> TimestampedEvent<'a> {
    /// Creates a new event.
    pub fn new(created_at: DateTime<Utc>, author: Option<&'a Actor>) -> Self {
        Self { created_at, author }
    }
}

impl Timestamped for TimestampedEvent<'_> {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
