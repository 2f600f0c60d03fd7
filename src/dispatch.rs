//! Context dispatchers: decide, per node context, which field kinds a
//! comparison may address, resolve each comparison through the field
//! evaluators and reduce the result.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::evaluate::{self, PathScope};
use crate::history::VersionHistory;
use crate::reduce::reduce_with;
use crate::{Condition, EngineConfig, Field, FieldKind, Node, NodeId, Operator, Project, Value};

/// How a tree node is looked at when a condition is evaluated against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvalContext {
    /// A document in the tree: every field kind applies.
    LiveDocument,
    /// A folder deciding whether to descend: only `path` is evaluated, every
    /// other comparison holds.
    ContainerOnly,
    /// A non-document item: only `ext` and `path` apply.
    OutOfTree,
}

/// Evaluates conditions against the nodes of a [`Project`].
#[derive(Clone, Copy)]
pub struct Evaluator<'a> {
    project: &'a Project,
    history: Option<&'a dyn VersionHistory>,
}

impl<'a> Evaluator<'a> {
    /// An evaluator using the history bound to `project`, if any.
    #[must_use]
    pub fn new(project: &'a Project) -> Self {
        Self {
            project,
            history: project.history(),
        }
    }

    /// Answer `version` comparisons from `history` instead of the project's.
    #[must_use]
    pub fn with_history(mut self, history: &'a dyn VersionHistory) -> Self {
        self.history = Some(history);
        self
    }

    #[must_use]
    pub fn project(&self) -> &'a Project {
        self.project
    }

    /// Evaluate `condition` for `node`. The empty condition always holds;
    /// an unknown node never matches a non-empty one.
    #[must_use]
    pub fn evaluate_condition(
        &self,
        condition: &Condition,
        node: NodeId,
        context: EvalContext,
    ) -> bool {
        if condition.is_empty() {
            return true;
        }
        let Some(target) = self.project.node(node) else {
            tracing::debug!(%node, "condition evaluated against unknown node");
            return false;
        };
        reduce_with(condition.tokens(), |field, op, value| {
            self.compare(node, target, context, field, op, value)
        })
    }

    /// Evaluate a single comparison for `node`.
    #[must_use]
    pub fn evaluate(
        &self,
        node: NodeId,
        context: EvalContext,
        field: &Field,
        op: Operator,
        value: &Value,
    ) -> bool {
        self.project
            .node(node)
            .is_some_and(|target| self.compare(node, target, context, field, op, value))
    }

    fn compare(
        &self,
        id: NodeId,
        node: &Node,
        context: EvalContext,
        field: &Field,
        op: Operator,
        value: &Value,
    ) -> bool {
        match context {
            EvalContext::LiveDocument => self.live(id, node, field, op, value),
            EvalContext::ContainerOnly => self.container(id, field, op, value),
            EvalContext::OutOfTree if node.kind().is_container() => match field.kind() {
                FieldKind::Extension => evaluate::extension(node.extension(), op, value),
                _ => self.container(id, field, op, value),
            },
            EvalContext::OutOfTree => self.out_of_tree(id, node, field, op, value),
        }
    }

    fn live(&self, id: NodeId, node: &Node, field: &Field, op: Operator, value: &Value) -> bool {
        let project = self.project;
        match field.kind() {
            FieldKind::Extension => evaluate::extension(node.extension(), op, value),
            FieldKind::Path => {
                evaluate::folder_in_scope(project, project.containing_folder(id), op, value)
            }
            FieldKind::Enabled => evaluate::enabled(!node.is_disabled(), op, value),
            FieldKind::FormField => {
                evaluate::form_field(node.extension(), node.form(), field, op, value)
            }
            kind @ (FieldKind::Text
            | FieldKind::CaseText
            | FieldKind::Word
            | FieldKind::CaseWord) => {
                evaluate::search(node.content().unwrap_or_default(), kind, op, value)
            }
            FieldKind::Version => evaluate::version(self.history, node.resource(), op, value),
        }
    }

    fn container(&self, id: NodeId, field: &Field, op: Operator, value: &Value) -> bool {
        match field.kind() {
            FieldKind::Path => evaluate::container_in_scope(self.project, id, op, value),
            _ => true,
        }
    }

    fn out_of_tree(
        &self,
        id: NodeId,
        node: &Node,
        field: &Field,
        op: Operator,
        value: &Value,
    ) -> bool {
        let project = self.project;
        match field.kind() {
            FieldKind::Extension => evaluate::extension(node.extension(), op, value),
            FieldKind::Path => {
                evaluate::folder_in_scope(project, project.containing_folder(id), op, value)
            }
            _ => false,
        }
    }
}

impl std::fmt::Debug for Evaluator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator")
            .field("project", self.project)
            .field("history", &self.history.is_some())
            .finish()
    }
}

/// Evaluates conditions against files in a directory on disk, outside any
/// project tree.
///
/// Files have no form and are always enabled. `path` targets must be
/// existing directories below the root.
pub struct FsEvaluator<'a> {
    root: PathBuf,
    history: Option<&'a dyn VersionHistory>,
    config: EngineConfig,
}

impl<'a> FsEvaluator<'a> {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            history: None,
            config: EngineConfig::default(),
        }
    }

    #[must_use]
    pub fn with_history(mut self, history: &'a dyn VersionHistory) -> Self {
        self.history = Some(history);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Evaluate `condition` for `file`, given either relative to the root or
    /// as a path that starts with it. An absolute path outside the root never
    /// matches a non-empty condition.
    #[must_use]
    pub fn evaluate_condition(&self, condition: &Condition, file: &Path) -> bool {
        if condition.is_empty() {
            return true;
        }
        let relative = match file.strip_prefix(&self.root) {
            Ok(relative) => relative,
            Err(_) if file.is_absolute() => {
                tracing::debug!(
                    file = %file.display(),
                    root = %self.root.display(),
                    "file outside root"
                );
                return false;
            }
            Err(_) => file,
        };
        reduce_with(condition.tokens(), |field, op, value| {
            self.compare(relative, field, op, value)
        })
    }

    fn compare(&self, relative: &Path, field: &Field, op: Operator, value: &Value) -> bool {
        match field.kind() {
            FieldKind::Extension => {
                let ext = relative.extension().and_then(|ext| ext.to_str());
                evaluate::extension(ext, op, value)
            }
            FieldKind::Path => self.in_scope(relative, op, value),
            FieldKind::Enabled => evaluate::enabled(true, op, value),
            FieldKind::FormField => false,
            kind @ (FieldKind::Text
            | FieldKind::CaseText
            | FieldKind::Word
            | FieldKind::CaseWord) => self
                .read_text(relative)
                .is_some_and(|text| evaluate::search(&text, kind, op, value)),
            FieldKind::Version => {
                let resource = resource_path(relative);
                evaluate::version(self.history, Some(&resource), op, value)
            }
        }
    }

    fn in_scope(&self, relative: &Path, op: Operator, value: &Value) -> bool {
        let Some(scope) = PathScope::parse(value) else {
            return true;
        };
        let target = Path::new(scope.target.trim_start_matches('/'));
        if !self.root.join(target).is_dir() {
            return false;
        }
        let folder = relative.parent().unwrap_or_else(|| Path::new(""));
        op.test_equality(folder.starts_with(target))
    }

    fn read_text(&self, relative: &Path) -> Option<String> {
        let path = self.root.join(relative);
        let read = || -> std::io::Result<Option<String>> {
            let file = fs::File::open(&path)?;
            if file.metadata()?.len() > self.config.max_text_bytes {
                return Ok(None);
            }
            let mut bytes = Vec::new();
            file.take(self.config.max_text_bytes).read_to_end(&mut bytes)?;
            Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
        };
        match read() {
            Ok(Some(text)) => Some(text),
            Ok(None) => {
                tracing::warn!(
                    path = %path.display(),
                    limit = self.config.max_text_bytes,
                    "file too large for text search"
                );
                None
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "failed to read file for text search");
                None
            }
        }
    }
}

impl std::fmt::Debug for FsEvaluator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsEvaluator")
            .field("root", &self.root)
            .field("history", &self.history.is_some())
            .field("config", &self.config)
            .finish()
    }
}

/// `/`-separated form of a relative path, as used by version histories.
fn resource_path(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
