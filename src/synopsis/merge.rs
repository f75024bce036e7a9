//! Deduplication of contributor records by login.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::event::{Actor, TimestampedEvent};

/// One person's tally for a contribution category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorRecord {
    /// Account login, the identity key.
    pub login: String,
    /// Display name, if known.
    pub name: Option<String>,
    /// Profile URL.
    #[serde(default)]
    pub url: String,
    /// Number of contributions counted for this login.
    pub count: u64,
}

impl ContributorRecord {
    /// Creates a record counting a single contribution by `actor`.
    pub fn from_actor(actor: &Actor) -> Self {
        Self {
            login: actor.login.clone(),
            name: actor.name.clone(),
            url: actor.url.clone(),
            count: 1,
        }
    }
}

/// Merges records sharing a login, summing their counts.
///
/// The first occurrence of each login supplies `name` and `url` and fixes
/// its position in the output. Inputs are only borrowed; every output
/// record is a fresh allocation.
pub fn merge_contributions<'a, I>(records: I) -> Vec<ContributorRecord>
where
    I: IntoIterator<Item = &'a ContributorRecord>,
{
    let mut merged: Vec<ContributorRecord> = Vec::new();
    let mut positions: HashMap<&'a str, usize> = HashMap::new();

    for record in records {
        match positions.get(record.login.as_str()) {
            Some(&index) => merged[index].count += record.count,
            None => {
                positions.insert(record.login.as_str(), merged.len());
                merged.push(record.clone());
            }
        }
    }

    merged
}

/// Merges several record sequences as if they were one concatenated sequence.
pub fn merge_sequences<S>(sequences: &[S]) -> Vec<ContributorRecord>
where
    S: AsRef<[ContributorRecord]>,
{
    merge_contributions(sequences.iter().flat_map(|s| s.as_ref()))
}

/// Tallies the authors of `events`, one contribution per event.
///
/// Events without an author are dropped.
pub fn contributors<'a, 'e, I>(events: I) -> Vec<ContributorRecord>
where
    'e: 'a,
    I: IntoIterator<Item = &'a TimestampedEvent<'e>>,
{
    let records: Vec<ContributorRecord> = events
        .into_iter()
        .filter_map(|event| event.author)
        .map(ContributorRecord::from_actor)
        .collect();
    merge_contributions(&records)
}
