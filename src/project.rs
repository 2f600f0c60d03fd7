use std::collections::BTreeSet;
use std::fmt;

use crate::history::VersionHistory;
use crate::{Node, NodeId, NodeKind, TreeError};

/// A document tree plus the schema and repository context rules run against.
///
/// Nodes are stored in an arena and addressed by [`NodeId`]. The root is a
/// nameless container whose resource path is the empty string.
pub struct Project {
    nodes: Vec<Node>,
    schema: BTreeSet<String>,
    history: Option<Box<dyn VersionHistory>>,
    next_order: u64,
}

impl Project {
    #[must_use]
    pub fn new() -> Self {
        let mut root = Node::folder("");
        root.resource = Some(String::new());
        Self {
            nodes: vec![root],
            schema: BTreeSet::new(),
            history: None,
            next_order: 0,
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A project always holds at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Insert `node` as the last child of `parent`.
    ///
    /// Unless the node carries an explicit resource path or is detached, its
    /// resource becomes `<parent resource>/<name>`. Content units without a
    /// document order are numbered after every order assigned so far.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError`] if `parent` is unknown or is not a container.
    pub fn add_child(&mut self, parent: NodeId, mut node: Node) -> Result<NodeId, TreeError> {
        let parent_node = self.node(parent).ok_or(TreeError::UnknownNode(parent))?;
        if !parent_node.kind().is_container() {
            return Err(TreeError::NotAContainer {
                parent: parent_node.name().to_owned(),
                child: node.name,
            });
        }

        if node.resource.is_none() && !node.detached {
            node.resource = Some(match parent_node.resource() {
                Some(base) if !base.is_empty() => format!("{base}/{}", node.name),
                _ => node.name.clone(),
            });
        }

        if node.kind == NodeKind::ContentUnit {
            match node.order {
                Some(order) => self.next_order = self.next_order.max(order.saturating_add(1)),
                None => {
                    node.order = Some(self.next_order);
                    self.next_order = self.next_order.saturating_add(1);
                }
            }
        } else {
            node.order = None;
        }

        if !node.kind.is_container() {
            node.children.clear();
        }

        node.parent = Some(parent);
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Resolve a `/`-separated path of node names relative to the root.
    /// The empty path resolves to the root.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<NodeId> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self.root(), |current, segment| {
                self.node(current)?
                    .children()
                    .iter()
                    .copied()
                    .find(|&child| self.node(child).is_some_and(|n| n.name() == segment))
            })
    }

    /// Whether `ancestor` is a strict ancestor of `node`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.node(node).and_then(Node::parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.node(id).and_then(Node::parent);
        }
        false
    }

    /// The nearest container above `node`.
    #[must_use]
    pub fn containing_folder(&self, node: NodeId) -> Option<NodeId> {
        let mut current = self.node(node)?.parent();
        while let Some(id) = current {
            let candidate = self.node(id)?;
            if candidate.kind().is_container() {
                return Some(id);
            }
            current = candidate.parent();
        }
        None
    }

    /// Register a document type whose form fields rules may address.
    pub fn register_extension(&mut self, extension: &str) {
        self.schema.insert(extension.to_owned());
    }

    #[must_use]
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.register_extension(extension);
        self
    }

    /// Document types known to the project schema.
    #[must_use]
    pub fn schema(&self) -> &BTreeSet<String> {
        &self.schema
    }

    pub fn bind_history(&mut self, history: impl VersionHistory + 'static) {
        self.history = Some(Box::new(history));
    }

    #[must_use]
    pub fn with_history(mut self, history: impl VersionHistory + 'static) -> Self {
        self.bind_history(history);
        self
    }

    #[must_use]
    pub fn history(&self) -> Option<&dyn VersionHistory> {
        self.history.as_deref()
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Project")
            .field("nodes", &self.nodes.len())
            .field("schema", &self.schema)
            .field("history", &self.history.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CommitLog;

    fn sample() -> (Project, NodeId, NodeId, NodeId) {
        let mut project = Project::new();
        let spec = project.add_child(project.root(), Node::folder("Spec")).unwrap();
        let sub = project.add_child(spec, Node::folder("Sub")).unwrap();
        let doc = project.add_child(sub, Node::unit("req1.md")).unwrap();
        (project, spec, sub, doc)
    }

    #[test]
    fn resources_are_derived_from_parents() {
        let (project, spec, sub, doc) = sample();
        assert_eq!(project.node(spec).unwrap().resource(), Some("Spec"));
        assert_eq!(project.node(sub).unwrap().resource(), Some("Spec/Sub"));
        assert_eq!(project.node(doc).unwrap().resource(), Some("Spec/Sub/req1.md"));
    }

    #[test]
    fn explicit_and_detached_resources() {
        let mut project = Project::new();
        let root = project.root();
        let a = project
            .add_child(root, Node::non_document("a").with_resource("elsewhere/a.txt"))
            .unwrap();
        let b = project
            .add_child(root, Node::non_document("b").detached())
            .unwrap();
        assert_eq!(project.node(a).unwrap().resource(), Some("elsewhere/a.txt"));
        assert_eq!(project.node(b).unwrap().resource(), None);
    }

    #[test]
    fn resolve_paths() {
        let (project, spec, sub, doc) = sample();
        assert_eq!(project.resolve(""), Some(project.root()));
        assert_eq!(project.resolve("Spec"), Some(spec));
        assert_eq!(project.resolve("Spec/Sub"), Some(sub));
        assert_eq!(project.resolve("/Spec/Sub/"), Some(sub));
        assert_eq!(project.resolve("Spec/Sub/req1.md"), Some(doc));
        assert_eq!(project.resolve("Spec/Missing"), None);
    }

    #[test]
    fn ancestry() {
        let (project, spec, sub, doc) = sample();
        assert!(project.is_ancestor(spec, doc));
        assert!(project.is_ancestor(project.root(), sub));
        assert!(!project.is_ancestor(doc, spec));
        assert!(!project.is_ancestor(spec, spec));
    }

    #[test]
    fn containing_folder_is_nearest_container() {
        let (project, spec, sub, doc) = sample();
        assert_eq!(project.containing_folder(doc), Some(sub));
        assert_eq!(project.containing_folder(sub), Some(spec));
        assert_eq!(project.containing_folder(project.root()), None);
    }

    #[test]
    fn cannot_add_under_a_document() {
        let (mut project, _, _, doc) = sample();
        let err = project.add_child(doc, Node::unit("x.md")).unwrap_err();
        assert_eq!(
            err,
            TreeError::NotAContainer {
                parent: "req1.md".into(),
                child: "x.md".into(),
            }
        );
        let err = project
            .add_child(NodeId(99), Node::unit("x.md"))
            .unwrap_err();
        assert_eq!(err, TreeError::UnknownNode(NodeId(99)));
    }

    #[test]
    fn document_order_is_assigned() {
        let mut project = Project::new();
        let root = project.root();
        let a = project.add_child(root, Node::unit("a.md")).unwrap();
        let b = project.add_child(root, Node::unit("b.md").with_order(10)).unwrap();
        let c = project.add_child(root, Node::unit("c.md")).unwrap();
        let d = project
            .add_child(root, Node::non_document("d.txt").with_order(4))
            .unwrap();
        assert_eq!(project.node(a).unwrap().order(), Some(0));
        assert_eq!(project.node(b).unwrap().order(), Some(10));
        assert_eq!(project.node(c).unwrap().order(), Some(11));
        assert_eq!(project.node(d).unwrap().order(), None);
    }

    #[test]
    fn largest_order_saturates() {
        let mut project = Project::new();
        let root = project.root();
        let last = project
            .add_child(root, Node::unit("last.md").with_order(u64::MAX))
            .unwrap();
        let next = project.add_child(root, Node::unit("next.md")).unwrap();
        assert_eq!(project.node(last).unwrap().order(), Some(u64::MAX));
        assert_eq!(project.node(next).unwrap().order(), Some(u64::MAX));
    }

    #[test]
    fn schema_and_history() {
        let project = Project::new()
            .with_extension("frm")
            .with_history(CommitLog::new().commit("c1", ["a.md"]));
        assert!(project.schema().contains("frm"));
        assert!(project.history().is_some());
        assert!(Project::new().history().is_none());
    }
}
