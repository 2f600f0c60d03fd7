use std::cmp::Ordering;
use std::path::Path;
use std::time::Instant;

use crate::dispatch::{EvalContext, Evaluator};
use crate::history::CachedHistory;
use crate::validate::{DefaultValidator, ValidationContext, Validator};
use crate::{
    Condition, DocqueryError, EngineConfig, Node, NodeId, NodeKind, Project, ReportEntry, ReportError,
    ReportOutcome,
};

/// Runs report entries against a project tree.
///
/// A run rewrites every rule of the entry, validates all of them, then walks
/// the tree once per rule. Folders are always descended and never evaluated;
/// documents are evaluated as live documents and other items as out-of-tree
/// nodes. Matches of all rules are concatenated and sorted into report order.
#[derive(Debug)]
pub struct ReportRunner<'a, V = DefaultValidator> {
    project: &'a Project,
    config: EngineConfig,
    validator: V,
}

impl<'a> ReportRunner<'a> {
    #[must_use]
    pub fn new(project: &'a Project) -> Self {
        Self {
            project,
            config: EngineConfig::default(),
            validator: DefaultValidator,
        }
    }
}

impl<'a, V: Validator> ReportRunner<'a, V> {
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the rule validator.
    #[must_use]
    pub fn with_validator<W: Validator>(self, validator: W) -> ReportRunner<'a, W> {
        ReportRunner {
            project: self.project,
            config: self.config,
            validator,
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run `entry` over the subtree at `root` and return the matching nodes
    /// in report order.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::MalformedRule`] for the first rule that fails
    /// validation, or [`ReportError::UnknownNode`] if `root` is not in the
    /// project. No partial results are produced.
    pub fn run(&self, entry: &mut ReportEntry, root: NodeId) -> Result<Vec<NodeId>, ReportError> {
        Ok(self.run_detailed(entry, root)?.into_matches())
    }

    /// Like [`run`](Self::run), with per-rule hit counts and run statistics.
    ///
    /// # Errors
    ///
    /// Same as [`run`](Self::run).
    pub fn run_detailed(
        &self,
        entry: &mut ReportEntry,
        root: NodeId,
    ) -> Result<ReportOutcome, ReportError> {
        let start = Instant::now();
        if self.project.node(root).is_none() {
            return Err(ReportError::UnknownNode(root));
        }

        entry.rewrite_all();
        let context = ValidationContext::for_project(self.project);
        for (index, rule) in entry.rules().iter().enumerate() {
            self.validator
                .validate(rule.condition(), &context)
                .map_err(|source| ReportError::MalformedRule {
                    report: entry.name().to_owned(),
                    index,
                    source,
                })?;
        }

        let cached = self
            .project
            .history()
            .filter(|_| self.config.cache_version_sets)
            .map(CachedHistory::new);
        let mut evaluator = Evaluator::new(self.project);
        if let Some(history) = &cached {
            evaluator = evaluator.with_history(history);
        }

        let mut matches = Vec::new();
        let mut rule_hits = Vec::with_capacity(entry.rules().len());
        let mut visited = 0;
        for (index, rule) in entry.rules().iter().enumerate() {
            let (found, seen) = walk(&evaluator, rule.condition(), root);
            let hits = found.len();
            matches.extend(found);
            visited += seen;
            tracing::debug!(report = entry.name(), rule = index, hits, "rule evaluated");
            rule_hits.push(hits);
        }

        sort_report_order(self.project, &mut matches);
        let duration = start.elapsed();
        tracing::debug!(
            report = entry.name(),
            rules = rule_hits.len(),
            matches = matches.len(),
            visited,
            ?duration,
            "report finished"
        );
        Ok(ReportOutcome::new(matches, rule_hits, visited, duration))
    }
}

/// Run `entry` against `project` with the default configuration.
///
/// # Errors
///
/// See [`ReportRunner::run`].
pub fn run(
    entry: &mut ReportEntry,
    project: &Project,
    root: NodeId,
) -> Result<Vec<NodeId>, ReportError> {
    ReportRunner::new(project).run(entry, root)
}

/// Load engine settings from a TOML file, then run `entry`.
///
/// # Errors
///
/// Returns [`DocqueryError::Config`] if the settings cannot be loaded and
/// [`DocqueryError::Report`] if the run fails.
pub fn run_configured(
    entry: &mut ReportEntry,
    project: &Project,
    root: NodeId,
    config_path: impl AsRef<Path>,
) -> Result<Vec<NodeId>, DocqueryError> {
    let config = EngineConfig::load(config_path)?;
    Ok(ReportRunner::new(project)
        .with_config(config)
        .run(entry, root)?)
}

/// Depth-first, pre-order walk of the subtree at `id`. Returns the matching
/// nodes and the number of nodes evaluated.
fn walk(evaluator: &Evaluator<'_>, condition: &Condition, id: NodeId) -> (Vec<NodeId>, usize) {
    let Some(node) = evaluator.project().node(id) else {
        return (Vec::new(), 0);
    };
    let context = match node.kind() {
        NodeKind::Container | NodeKind::ReservedContainer => {
            return node.children().iter().fold(
                (Vec::new(), 0),
                |(mut matches, visited), &child| {
                    let (found, seen) = walk(evaluator, condition, child);
                    matches.extend(found);
                    (matches, visited + seen)
                },
            );
        }
        NodeKind::ContentUnit => EvalContext::LiveDocument,
        NodeKind::NonDocumentUnit => EvalContext::OutOfTree,
    };
    if evaluator.evaluate_condition(condition, id, context) {
        tracing::trace!(node = node.name(), "matched");
        (vec![id], 1)
    } else {
        (Vec::new(), 1)
    }
}

/// Documents first, by document order. Other items follow, by resource path
/// when both have one, by name when neither has one, and otherwise with the
/// resource-bearing item first. The sort is stable.
fn sort_report_order(project: &Project, matches: &mut [NodeId]) {
    matches.sort_by(|&a, &b| match (project.node(a), project.node(b)) {
        (Some(a), Some(b)) => report_order(a, b),
        _ => Ordering::Equal,
    });
}

fn report_order(a: &Node, b: &Node) -> Ordering {
    match (a.order(), b.order()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => match (a.resource(), b.resource()) {
            (Some(x), Some(y)) => x.cmp(y),
            (None, None) => a.name().cmp(b.name()),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
        },
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::BTreeSet;
    use std::rc::Rc;

    use tracing_test::traced_test;

    use super::*;
    use crate::history::{HistoryError, VersionHistory};
    use crate::{CommitLog, CommitRef, Field, Rule, Token, ValidationError, and, close, open};

    fn project() -> (Project, NodeId) {
        let mut project = Project::new();
        let root = project.root();
        let spec = project.add_child(root, Node::folder("Spec")).unwrap();
        project.add_child(spec, Node::unit("b.md").with_order(2)).unwrap();
        project.add_child(spec, Node::unit("a.md").with_order(1)).unwrap();
        project.add_child(spec, Node::non_document("z.png")).unwrap();
        project
            .add_child(spec, Node::non_document("loose.png").detached())
            .unwrap();
        project.add_child(root, Node::non_document("m.png")).unwrap();
        (project, spec)
    }

    fn names(project: &Project, ids: &[NodeId]) -> Vec<String> {
        ids.iter()
            .map(|&id| project.node(id).unwrap().name().to_owned())
            .collect()
    }

    #[test]
    fn sorts_documents_then_resources_then_names() {
        let (project, _) = project();
        let mut entry = ReportEntry::new("all").rule(Rule::new(Condition::new()));
        let matches = run(&mut entry, &project, project.root()).unwrap();
        assert_eq!(
            names(&project, &matches),
            vec!["a.md", "b.md", "z.png", "m.png", "loose.png"]
        );
    }

    #[test]
    fn non_documents_sort_by_resource_path() {
        let (project, _) = project();
        let mut entry = ReportEntry::new("png").rule(Rule::new(vec![Field::extension().eq("png")]));
        let matches = run(&mut entry, &project, project.root()).unwrap();
        let resources: Vec<_> = matches
            .iter()
            .map(|&id| project.node(id).unwrap().resource())
            .collect();
        assert_eq!(resources, vec![Some("Spec/z.png"), Some("m.png")]);
    }

    #[test]
    fn rules_concatenate_without_dedup() {
        let (project, _) = project();
        let md = || Rule::new(vec![Field::extension().eq("md")]);
        let mut entry = ReportEntry::new("twice").rule(md()).rule(md());
        let outcome = ReportRunner::new(&project)
            .run_detailed(&mut entry, project.root())
            .unwrap();
        assert_eq!(names(&project, outcome.matches()), vec!["a.md", "a.md", "b.md", "b.md"]);
        assert_eq!(outcome.rule_hits(), &[2, 2]);
        assert_eq!(outcome.visited(), 10);
    }

    #[test]
    fn bounds_restrict_to_folder() {
        let (project, _) = project();
        let mut entry = ReportEntry::new("spec")
            .with_bounds("Spec")
            .rule(Rule::new(vec![Field::extension().eq("png")]));
        let matches = run(&mut entry, &project, project.root()).unwrap();
        assert_eq!(names(&project, &matches), vec!["z.png"]);
    }

    #[test]
    fn walk_starts_at_given_root() {
        let (project, spec) = project();
        let mut entry = ReportEntry::new("png").rule(Rule::new(vec![Field::extension().eq("png")]));
        let matches = run(&mut entry, &project, spec).unwrap();
        assert_eq!(names(&project, &matches), vec!["z.png"]);
    }

    #[test]
    fn malformed_rule_aborts_run() {
        let (project, _) = project();
        let mut entry = ReportEntry::new("broken")
            .rule(Rule::new(vec![Field::extension().eq("md")]))
            .rule(Rule::new(vec![Token::Error("unterminated".into())]));
        let err = run(&mut entry, &project, project.root()).unwrap_err();
        match err {
            ReportError::MalformedRule {
                report,
                index,
                source,
            } => {
                assert_eq!(report, "broken");
                assert_eq!(index, 1);
                assert_eq!(
                    source,
                    ValidationError::ErrorToken {
                        message: "unterminated".into()
                    }
                );
            }
            other => panic!("expected MalformedRule, got {other}"),
        }
    }

    #[test]
    fn unknown_root_is_error() {
        let (project, _) = project();
        let mut entry = ReportEntry::new("r");
        let err = run(&mut entry, &project, NodeId(500)).unwrap_err();
        assert!(matches!(err, ReportError::UnknownNode(NodeId(500))));
    }

    #[test]
    fn custom_validator_is_used() {
        struct RejectAll;
        impl Validator for RejectAll {
            fn validate(
                &self,
                _: &Condition,
                _: &ValidationContext<'_>,
            ) -> Result<(), ValidationError> {
                Err(ValidationError::UnbalancedGroups)
            }
        }
        let (project, _) = project();
        let mut entry = ReportEntry::new("r").rule(Rule::new(Condition::new()));
        let err = ReportRunner::new(&project)
            .with_validator(RejectAll)
            .run(&mut entry, project.root())
            .unwrap_err();
        assert!(matches!(err, ReportError::MalformedRule { index: 0, .. }));
    }

    struct Counting {
        inner: CommitLog,
        calls: Rc<Cell<usize>>,
    }

    impl VersionHistory for Counting {
        fn changed_by(&self, commit: &CommitRef) -> Result<BTreeSet<String>, HistoryError> {
            self.calls.set(self.calls.get() + 1);
            self.inner.changed_by(commit)
        }

        fn changed_since(&self, commit: &CommitRef) -> Result<BTreeSet<String>, HistoryError> {
            self.calls.set(self.calls.get() + 1);
            self.inner.changed_since(commit)
        }

        fn changed_before(&self, commit: &CommitRef) -> Result<BTreeSet<String>, HistoryError> {
            self.calls.set(self.calls.get() + 1);
            self.inner.changed_before(commit)
        }
    }

    fn versioned(calls: &Rc<Cell<usize>>) -> Project {
        let mut project = Project::new().with_history(Counting {
            inner: CommitLog::new().commit("c1", ["a.md"]).commit("c2", ["b.md"]),
            calls: Rc::clone(calls),
        });
        let root = project.root();
        for name in ["a.md", "b.md", "c.md"] {
            project.add_child(root, Node::unit(name)).unwrap();
        }
        project
    }

    fn changed_in(commit: &str) -> ReportEntry {
        ReportEntry::new("changed").rule(Rule::new(vec![
            open(),
            Field::version().eq(CommitRef::new(commit)),
            close(),
            and(),
            Field::enabled().eq(true),
        ]))
    }

    #[test]
    fn version_sets_are_cached_when_enabled() {
        let calls = Rc::new(Cell::new(0));
        let project = versioned(&calls);
        let runner = ReportRunner::new(&project).with_config(EngineConfig {
            cache_version_sets: true,
            ..EngineConfig::default()
        });
        let matches = runner.run(&mut changed_in("c2"), project.root()).unwrap();
        assert_eq!(names(&project, &matches), vec!["b.md"]);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn version_sets_are_queried_per_node_by_default() {
        let calls = Rc::new(Cell::new(0));
        let project = versioned(&calls);
        let matches = run(&mut changed_in("c2"), &project, project.root()).unwrap();
        assert_eq!(names(&project, &matches), vec!["b.md"]);
        assert_eq!(calls.get(), 3);
    }

    #[traced_test]
    #[test]
    fn run_is_logged() {
        let (project, _) = project();
        let mut entry = ReportEntry::new("logged").rule(Rule::new(Condition::new()));
        run(&mut entry, &project, project.root()).unwrap();
        assert!(logs_contain("report finished"));
    }

    #[test]
    fn configured_run_reads_settings() {
        let (project, _) = project();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"cache_version_sets = true\n").unwrap();
        let mut entry = ReportEntry::new("md").rule(Rule::new(vec![Field::extension().eq("md")]));
        let matches = run_configured(&mut entry, &project, project.root(), file.path()).unwrap();
        assert_eq!(names(&project, &matches), vec!["a.md", "b.md"]);

        let err = run_configured(&mut entry, &project, project.root(), "/no/such/docquery.toml")
            .unwrap_err();
        assert!(matches!(err, DocqueryError::Config(_)));
    }

    #[test]
    fn report_order_ties_are_stable() {
        let a = Node::non_document("same");
        let b = Node::non_document("same");
        assert_eq!(report_order(&a, &b), Ordering::Equal);
    }
}
