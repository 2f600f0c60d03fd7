use std::fmt;

use super::form::FormValues;

/// Handle to a node inside a [`Project`](crate::Project) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A document tracked by the project.
    ContentUnit,
    /// A folder.
    Container,
    /// A folder the project manages itself (schema, templates, ...).
    ReservedContainer,
    /// A file inside the tree that is not a tracked document.
    NonDocumentUnit,
}

impl NodeKind {
    #[must_use]
    pub fn is_container(self) -> bool {
        matches!(self, NodeKind::Container | NodeKind::ReservedContainer)
    }
}

/// One element of the document tree.
///
/// Nodes are built detached and then handed to
/// [`Project::add_child`](crate::Project::add_child), which wires the parent
/// link, derives the backing-resource path and assigns a document order to
/// content units that do not carry one.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) disabled: bool,
    pub(crate) read_only: bool,
    pub(crate) resource: Option<String>,
    pub(crate) detached: bool,
    pub(crate) order: Option<u64>,
    pub(crate) content: Option<String>,
    pub(crate) form: Option<FormValues>,
}

impl Node {
    fn with_kind(name: &str, kind: NodeKind) -> Self {
        Self {
            name: name.to_owned(),
            kind,
            parent: None,
            children: Vec::new(),
            disabled: false,
            read_only: false,
            resource: None,
            detached: false,
            order: None,
            content: None,
            form: None,
        }
    }

    #[must_use]
    pub fn unit(name: &str) -> Self {
        Self::with_kind(name, NodeKind::ContentUnit)
    }

    #[must_use]
    pub fn folder(name: &str) -> Self {
        Self::with_kind(name, NodeKind::Container)
    }

    #[must_use]
    pub fn reserved(name: &str) -> Self {
        Self::with_kind(name, NodeKind::ReservedContainer)
    }

    #[must_use]
    pub fn non_document(name: &str) -> Self {
        Self::with_kind(name, NodeKind::NonDocumentUnit)
    }

    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    #[must_use]
    pub fn with_order(mut self, order: u64) -> Self {
        self.order = Some(order);
        self
    }

    #[must_use]
    pub fn with_form(mut self, form: FormValues) -> Self {
        self.form = Some(form);
        self
    }

    /// Override the project-relative resource path derived on insertion.
    #[must_use]
    pub fn with_resource(mut self, path: impl Into<String>) -> Self {
        self.resource = Some(path.into());
        self
    }

    /// Mark the node as having no backing resource at all.
    #[must_use]
    pub fn detached(mut self) -> Self {
        self.resource = None;
        self.detached = true;
        self
    }

    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Project-relative, `/`-separated path of the backing file or folder.
    #[must_use]
    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    /// Extension of the backing resource, without the dot.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        let file_name = self.resource()?.rsplit('/').next()?;
        match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => Some(ext),
            _ => None,
        }
    }

    /// Position in document order. Present only for live documents.
    #[must_use]
    pub fn order(&self) -> Option<u64> {
        self.order
    }

    /// Cached rendering of the node's text.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    #[must_use]
    pub fn form(&self) -> Option<&FormValues> {
        self.form.as_ref()
    }
}
