use crate::{NodeId, Operator, Project, Value};

/// The folder a `path` value names, with any trailing `/` or `/*` removed.
///
/// `None` for an empty value, which every node satisfies. A trailing `/*`
/// asks for the target and everything nested beneath it; a plain target
/// already accepts every folder it is an ancestor of, so both spellings
/// select the same nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PathScope<'v> {
    pub(crate) target: &'v str,
}

impl<'v> PathScope<'v> {
    pub(crate) fn parse(value: &'v Value) -> Option<Self> {
        let literal = value.literal().trim();
        let (target, recursive) = match literal.strip_suffix("/*") {
            Some(target) => (target, true),
            None => (literal, false),
        };
        let target = target.trim_end_matches('/');
        if target.is_empty() && !recursive {
            return None;
        }
        Some(Self { target })
    }

    fn resolve(&self, project: &Project) -> Option<NodeId> {
        let id = project.resolve(self.target)?;
        project
            .node(id)
            .is_some_and(|node| node.kind().is_container())
            .then_some(id)
    }
}

fn within(project: &Project, target: NodeId, folder: NodeId) -> bool {
    folder == target || project.is_ancestor(target, folder)
}

/// Evaluate `path` for a leaf whose nearest container is `folder`.
pub(crate) fn folder_in_scope(
    project: &Project,
    folder: Option<NodeId>,
    op: Operator,
    value: &Value,
) -> bool {
    let Some(scope) = PathScope::parse(value) else {
        return true;
    };
    let (Some(target), Some(folder)) = (scope.resolve(project), folder) else {
        return false;
    };
    op.test_equality(within(project, target, folder))
}

/// Evaluate `path` for a container deciding whether to descend: it is in
/// scope when it is the target, lies beneath it, or lies on the way to it.
pub(crate) fn container_in_scope(
    project: &Project,
    container: NodeId,
    op: Operator,
    value: &Value,
) -> bool {
    let Some(scope) = PathScope::parse(value) else {
        return true;
    };
    let Some(target) = scope.resolve(project) else {
        return false;
    };
    let on_route = project.is_ancestor(container, target);
    op.test_equality(on_route || within(project, target, container))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Node;

    struct Tree {
        project: Project,
        spec: NodeId,
        sub: NodeId,
        other: NodeId,
    }

    fn tree() -> Tree {
        let mut project = Project::new();
        let root = project.root();
        let spec = project.add_child(root, Node::folder("Spec")).unwrap();
        let sub = project.add_child(spec, Node::folder("Sub")).unwrap();
        let other = project.add_child(root, Node::folder("Other")).unwrap();
        project.add_child(spec, Node::unit("a.md")).unwrap();
        Tree {
            project,
            spec,
            sub,
            other,
        }
    }

    #[test]
    fn parse_scope() {
        let v = Value::from("Spec/*");
        assert_eq!(
            PathScope::parse(&v),
            Some(PathScope { target: "Spec" })
        );
        let v = Value::from("Spec/Sub/");
        assert_eq!(
            PathScope::parse(&v),
            Some(PathScope { target: "Spec/Sub" })
        );
        assert_eq!(PathScope::parse(&Value::from("")), None);
        assert_eq!(PathScope::parse(&Value::from("  ")), None);
        let v = Value::from("/*");
        assert_eq!(PathScope::parse(&v), Some(PathScope { target: "" }));
    }

    #[test]
    fn empty_value_is_vacuous() {
        let t = tree();
        assert!(folder_in_scope(&t.project, None, Operator::Equal, &Value::from("")));
    }

    #[test]
    fn exact_folder_matches() {
        let t = tree();
        let v = Value::from("Spec");
        assert!(folder_in_scope(&t.project, Some(t.spec), Operator::Equal, &v));
        assert!(!folder_in_scope(&t.project, Some(t.other), Operator::Equal, &v));
        assert!(folder_in_scope(&t.project, Some(t.other), Operator::NotEqual, &v));
    }

    #[test]
    fn nested_folder_matches_in_both_modes() {
        let t = tree();
        assert!(folder_in_scope(&t.project, Some(t.sub), Operator::Equal, &Value::from("Spec")));
        assert!(folder_in_scope(&t.project, Some(t.sub), Operator::Equal, &Value::from("Spec/*")));
    }

    #[test]
    fn parent_folder_does_not_match_nested_target() {
        let t = tree();
        let v = Value::from("Spec/Sub");
        assert!(!folder_in_scope(&t.project, Some(t.spec), Operator::Equal, &v));
    }

    #[test]
    fn root_recursive_scope_matches_everything() {
        let t = tree();
        let v = Value::from("/*");
        assert!(folder_in_scope(&t.project, Some(t.project.root()), Operator::Equal, &v));
        assert!(folder_in_scope(&t.project, Some(t.sub), Operator::Equal, &v));
    }

    #[test]
    fn unresolved_or_non_container_target_is_false() {
        let t = tree();
        for literal in ["Missing", "Spec/a.md"] {
            let v = Value::from(literal);
            assert!(!folder_in_scope(&t.project, Some(t.spec), Operator::Equal, &v));
            assert!(!folder_in_scope(&t.project, Some(t.spec), Operator::NotEqual, &v));
        }
    }

    #[test]
    fn container_scope_allows_route_to_target() {
        let t = tree();
        let v = Value::from("Spec/Sub");
        assert!(container_in_scope(&t.project, t.project.root(), Operator::Equal, &v));
        assert!(container_in_scope(&t.project, t.spec, Operator::Equal, &v));
        assert!(container_in_scope(&t.project, t.sub, Operator::Equal, &v));
        assert!(!container_in_scope(&t.project, t.other, Operator::Equal, &v));
    }
}
