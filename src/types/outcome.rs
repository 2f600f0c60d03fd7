use std::fmt;
use std::time::Duration;

use super::node::NodeId;

/// Detailed result of a report run, returned by
/// [`ReportRunner::run_detailed()`](crate::ReportRunner::run_detailed).
///
/// Contains the sorted matches, how many nodes each rule matched, how many
/// nodes the traversal evaluated, and the wall-clock duration of the run.
#[derive(Debug, Clone)]
#[must_use]
pub struct ReportOutcome {
    matches: Vec<NodeId>,
    rule_hits: Vec<usize>,
    visited: usize,
    duration: Duration,
}

impl ReportOutcome {
    pub(crate) fn new(
        matches: Vec<NodeId>,
        rule_hits: Vec<usize>,
        visited: usize,
        duration: Duration,
    ) -> Self {
        Self {
            matches,
            rule_hits,
            visited,
            duration,
        }
    }

    /// Matching nodes in report order, same as [`ReportRunner::run()`](crate::ReportRunner::run).
    #[must_use]
    pub fn matches(&self) -> &[NodeId] {
        &self.matches
    }

    #[must_use]
    pub fn into_matches(self) -> Vec<NodeId> {
        self.matches
    }

    /// Number of matches contributed by each rule, in rule order.
    #[must_use]
    pub fn rule_hits(&self) -> &[usize] {
        &self.rule_hits
    }

    /// Number of non-container nodes evaluated across all rules.
    #[must_use]
    pub fn visited(&self) -> usize {
        self.visited
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for ReportOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "matches: {}", self.matches.len())?;
        let hits: Vec<String> = self.rule_hits.iter().map(ToString::to_string).collect();
        write!(f, ", rule hits: [{}]", hits.join(", "))?;
        write!(f, ", visited: {}", self.visited)?;
        write!(f, ", duration: {:?}", self.duration)?;
        Ok(())
    }
}
