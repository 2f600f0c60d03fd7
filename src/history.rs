//! Version-control change history.
//!
//! The engine only needs three path sets per commit: the paths the commit
//! itself changed, the paths changed after it up to head, and the paths changed
//! from the first commit up to (but excluding) it.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

use thiserror::Error;

use crate::CommitRef;

/// Errors reported by a [`VersionHistory`] backend.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("unknown commit '{0}'")]
    UnknownCommit(CommitRef),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("repository error: {0}")]
    Backend(String),
}

/// Changed-path queries against a repository bound to a project.
///
/// Paths are project-relative and `/`-separated, like
/// [`Node::resource`](crate::Node::resource).
pub trait VersionHistory {
    /// Paths changed by `commit` itself.
    fn changed_by(&self, commit: &CommitRef) -> Result<BTreeSet<String>, HistoryError>;

    /// Paths changed by the commits after `commit`, up to and including head.
    fn changed_since(&self, commit: &CommitRef) -> Result<BTreeSet<String>, HistoryError>;

    /// Paths changed by the commits from the first one up to, but excluding, `commit`.
    fn changed_before(&self, commit: &CommitRef) -> Result<BTreeSet<String>, HistoryError>;
}

/// An in-memory, ordered commit log. The last commit pushed is head.
#[derive(Debug, Clone, Default)]
pub struct CommitLog {
    commits: Vec<(CommitRef, BTreeSet<String>)>,
}

impl CommitLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a commit that changed `paths`. It becomes the new head.
    #[must_use]
    pub fn commit<I, S>(mut self, id: &str, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(CommitRef::new(id), paths);
        self
    }

    pub fn push<I, S>(&mut self, commit: CommitRef, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.commits
            .push((commit, paths.into_iter().map(Into::into).collect()));
    }

    #[must_use]
    pub fn head(&self) -> Option<&CommitRef> {
        self.commits.last().map(|(commit, _)| commit)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    fn position(&self, commit: &CommitRef) -> Result<usize, HistoryError> {
        self.commits
            .iter()
            .position(|(c, _)| c == commit)
            .ok_or_else(|| HistoryError::UnknownCommit(commit.clone()))
    }

    fn union(&self, range: std::ops::Range<usize>) -> BTreeSet<String> {
        self.commits[range]
            .iter()
            .flat_map(|(_, paths)| paths.iter().cloned())
            .collect()
    }
}

impl VersionHistory for CommitLog {
    fn changed_by(&self, commit: &CommitRef) -> Result<BTreeSet<String>, HistoryError> {
        let pos = self.position(commit)?;
        Ok(self.commits[pos].1.clone())
    }

    fn changed_since(&self, commit: &CommitRef) -> Result<BTreeSet<String>, HistoryError> {
        let pos = self.position(commit)?;
        Ok(self.union(pos + 1..self.commits.len()))
    }

    fn changed_before(&self, commit: &CommitRef) -> Result<BTreeSet<String>, HistoryError> {
        let pos = self.position(commit)?;
        Ok(self.union(0..pos))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Range {
    By,
    Since,
    Before,
}

/// Memoizes another history's path sets for the lifetime of one report run.
///
/// Failed queries are not cached.
pub struct CachedHistory<'a> {
    inner: &'a dyn VersionHistory,
    cache: RefCell<HashMap<(CommitRef, Range), BTreeSet<String>>>,
}

impl<'a> CachedHistory<'a> {
    #[must_use]
    pub fn new(inner: &'a dyn VersionHistory) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }

    fn lookup(
        &self,
        commit: &CommitRef,
        range: Range,
        query: impl FnOnce() -> Result<BTreeSet<String>, HistoryError>,
    ) -> Result<BTreeSet<String>, HistoryError> {
        let key = (commit.clone(), range);
        if let Some(paths) = self.cache.borrow().get(&key) {
            return Ok(paths.clone());
        }
        let paths = query()?;
        self.cache.borrow_mut().insert(key, paths.clone());
        Ok(paths)
    }

    /// Number of cached path sets.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl VersionHistory for CachedHistory<'_> {
    fn changed_by(&self, commit: &CommitRef) -> Result<BTreeSet<String>, HistoryError> {
        self.lookup(commit, Range::By, || self.inner.changed_by(commit))
    }

    fn changed_since(&self, commit: &CommitRef) -> Result<BTreeSet<String>, HistoryError> {
        self.lookup(commit, Range::Since, || self.inner.changed_since(commit))
    }

    fn changed_before(&self, commit: &CommitRef) -> Result<BTreeSet<String>, HistoryError> {
        self.lookup(commit, Range::Before, || self.inner.changed_before(commit))
    }
}
