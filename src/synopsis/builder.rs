//! Builds categorized contributor summaries from response trees.

use serde::{Deserialize, Serialize};

use super::event::TimestampedEvent;
use super::merge::{contributors, merge_sequences, ContributorRecord};
use super::window::{time_filter, TimeWindow};
use crate::github::tree::{Organization, Repository, Root, Thread};

/// Contribution categories, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Opened a pull request.
    PrCreator,
    /// Commented on a pull request.
    PrCommentator,
    /// Opened an issue.
    IssueCreator,
    /// Commented on an issue.
    IssueCommentator,
    /// Authored a commit on the default branch.
    CommitAuthor,
    /// Reacted to a pull request, issue or comment.
    Reactor,
}

impl Category {
    /// Row label used in tabular output.
    pub const fn label(self) -> &'static str {
        match self {
            Self::PrCreator => "pr creator",
            Self::PrCommentator => "pr commentator",
            Self::IssueCreator => "issue creator",
            Self::IssueCommentator => "issue commentator",
            Self::CommitAuthor => "commit author",
            Self::Reactor => "reactor",
        }
    }
}

/// Deduplicated contributors of one repository or organization, by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Synopsis {
    /// People who opened pull requests.
    pub pr_creators: Vec<ContributorRecord>,
    /// People who commented on pull requests.
    pub pr_commentators: Vec<ContributorRecord>,
    /// People who opened issues.
    pub issue_creators: Vec<ContributorRecord>,
    /// People who commented on issues.
    pub issue_commentators: Vec<ContributorRecord>,
    /// Commit authors, when commits were requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_authors: Option<Vec<ContributorRecord>>,
    /// Reactors, when reactions were requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reactors: Option<Vec<ContributorRecord>>,
}

impl Synopsis {
    /// Returns the populated categories with their records, in output order.
    pub fn categories(&self) -> Vec<(Category, &[ContributorRecord])> {
        let mut categories = vec![
            (Category::PrCreator, self.pr_creators.as_slice()),
            (Category::PrCommentator, self.pr_commentators.as_slice()),
            (Category::IssueCreator, self.issue_creators.as_slice()),
            (Category::IssueCommentator, self.issue_commentators.as_slice()),
        ];
        if let Some(authors) = &self.commit_authors {
            categories.push((Category::CommitAuthor, authors.as_slice()));
        }
        if let Some(reactors) = &self.reactors {
            categories.push((Category::Reactor, reactors.as_slice()));
        }
        categories
    }

    /// Merges synopses category by category.
    ///
    /// An optional category is present in the result when any input has it.
    pub fn merge(synopses: &[Self]) -> Self {
        let merge_optional = |pick: fn(&Self) -> Option<&Vec<ContributorRecord>>| {
            let present: Vec<&Vec<ContributorRecord>> = synopses.iter().filter_map(pick).collect();
            (!present.is_empty()).then(|| merge_sequences(&present))
        };

        Self {
            pr_creators: merge_sequences(&collect(synopses, |s| &s.pr_creators)),
            pr_commentators: merge_sequences(&collect(synopses, |s| &s.pr_commentators)),
            issue_creators: merge_sequences(&collect(synopses, |s| &s.issue_creators)),
            issue_commentators: merge_sequences(&collect(synopses, |s| &s.issue_commentators)),
            commit_authors: merge_optional(|s| s.commit_authors.as_ref()),
            reactors: merge_optional(|s| s.reactors.as_ref()),
        }
    }
}

fn collect<'a>(
    synopses: &'a [Synopsis],
    pick: fn(&Synopsis) -> &Vec<ContributorRecord>,
) -> Vec<&'a Vec<ContributorRecord>> {
    synopses.iter().map(pick).collect()
}

/// Extracts, filters and deduplicates contributors from response trees.
#[derive(Debug, Clone, Copy)]
pub struct SynopsisBuilder {
    window: TimeWindow,
    commits: bool,
    reactions: bool,
}

impl SynopsisBuilder {
    /// Creates a builder for the four base categories over `window`.
    pub fn new(window: TimeWindow) -> Self {
        Self {
            window,
            commits: false,
            reactions: false,
        }
    }

    /// Also reports commit authors.
    pub fn with_commits(mut self, commits: bool) -> Self {
        self.commits = commits;
        self
    }

    /// Also reports reactors.
    pub fn with_reactions(mut self, reactions: bool) -> Self {
        self.reactions = reactions;
        self
    }

    /// Summarises a decoded response tree.
    pub fn build(&self, root: &Root) -> Synopsis {
        match root {
            Root::Repository(repo) => self.repository(repo),
            Root::Organization(org) => self.organization(org),
        }
    }

    /// Summarises one repository.
    pub fn repository(&self, repo: &Repository) -> Synopsis {
        let prs = &repo.pull_requests.nodes;
        let issues = &repo.issues.nodes;

        let commit_authors = self.commits.then(|| {
            let events: Vec<TimestampedEvent<'_>> = repo
                .history()
                .map(|history| {
                    history
                        .nodes
                        .iter()
                        .map(|commit| {
                            let user = commit.author.as_ref().and_then(|a| a.user.as_ref());
                            TimestampedEvent::new(commit.committed_date, user)
                        })
                        .collect()
                })
                .unwrap_or_default();
            self.summarize(&events)
        });

        let reactors = self.reactions.then(|| {
            let events: Vec<TimestampedEvent<'_>> = prs
                .iter()
                .chain(issues)
                .flat_map(reaction_events)
                .collect();
            self.summarize(&events)
        });

        Synopsis {
            pr_creators: self.summarize(&creation_events(prs)),
            pr_commentators: self.summarize(&comment_events(prs)),
            issue_creators: self.summarize(&creation_events(issues)),
            issue_commentators: self.summarize(&comment_events(issues)),
            commit_authors,
            reactors,
        }
    }

    /// Summarises every repository of an organization and merges the results.
    pub fn organization(&self, org: &Organization) -> Synopsis {
        let per_repo: Vec<Synopsis> = org
            .repositories
            .nodes
            .iter()
            .map(|repo| self.repository(repo))
            .collect();

        let mut merged = Synopsis::merge(&per_repo);
        if self.commits && merged.commit_authors.is_none() {
            merged.commit_authors = Some(Vec::new());
        }
        if self.reactions && merged.reactors.is_none() {
            merged.reactors = Some(Vec::new());
        }
        merged
    }

    fn summarize(&self, events: &[TimestampedEvent<'_>]) -> Vec<ContributorRecord> {
        contributors(time_filter(events, Some(&self.window)))
    }
}

fn creation_events(threads: &[Thread]) -> Vec<TimestampedEvent<'_>> {
    threads
        .iter()
        .map(|thread| TimestampedEvent::new(thread.created_at, thread.author.as_ref()))
        .collect()
}

fn comment_events(threads: &[Thread]) -> Vec<TimestampedEvent<'_>> {
    threads
        .iter()
        .flat_map(|thread| &thread.comments.nodes)
        .map(|comment| TimestampedEvent::new(comment.created_at, comment.author.as_ref()))
        .collect()
}

fn reaction_events(thread: &Thread) -> Vec<TimestampedEvent<'_>> {
    let on_thread = thread.reactions.iter().flat_map(|r| &r.nodes);
    let on_comments = thread
        .comments
        .nodes
        .iter()
        .flat_map(|comment| comment.reactions.iter().flat_map(|r| &r.nodes));

    on_thread
        .chain(on_comments)
        .map(|reaction| TimestampedEvent::new(reaction.created_at, reaction.user.as_ref()))
        .collect()
}
