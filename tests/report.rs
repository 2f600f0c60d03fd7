use std::fs;

use docquery::{
    CommitLog, CommitRef, Condition, EvalContext, Evaluator, Field, FsEvaluator, Node, NodeId,
    Project, ReportEntry, ReportError, ReportRunner, Rule, Token, ValidationError, and, close,
    open, or, reduce, run, run_configured,
};

fn names(project: &Project, ids: &[NodeId]) -> Vec<String> {
    ids.iter()
        .map(|&id| project.node(id).unwrap().name().to_owned())
        .collect()
}

fn spec_tree() -> Project {
    let mut project = Project::new();
    let spec = project.add_child(project.root(), Node::folder("Spec")).unwrap();
    project
        .add_child(spec, Node::unit("req1.md").with_content("hello world"))
        .unwrap();
    project
        .add_child(spec, Node::unit("req2.md").with_content("goodbye").disabled(true))
        .unwrap();
    project
}

#[test]
fn enabled_documents_with_word() {
    let project = spec_tree();
    let mut entry = ReportEntry::new("greetings").rule(Rule::new(vec![
        Field::enabled().eq("true"),
        and(),
        Field::word().eq("hello"),
    ]));
    let matches = run(&mut entry, &project, project.root()).unwrap();
    assert_eq!(names(&project, &matches), vec!["req1.md"]);
}

#[test]
fn empty_condition_holds_everywhere() {
    let mut project = spec_tree();
    project
        .add_child(project.root(), Node::non_document("logo.png"))
        .unwrap();
    let evaluator = Evaluator::new(&project);
    let empty = Condition::new();
    let mut ids = vec![project.root()];
    let mut i = 0;
    while i < ids.len() {
        ids.extend_from_slice(project.node(ids[i]).unwrap().children());
        i += 1;
    }
    assert_eq!(ids.len(), project.len());
    for id in ids {
        for context in [
            EvalContext::LiveDocument,
            EvalContext::ContainerOnly,
            EvalContext::OutOfTree,
        ] {
            assert!(evaluator.evaluate_condition(&empty, id, context));
        }
    }
}

#[test]
fn reducer_examples() {
    let t = || Token::Bool(true);
    let f = || Token::Bool(false);
    assert!(reduce(&[t()]));
    assert!(!reduce(&[f()]));
    assert!(!reduce(&[t(), and(), f()]));
    assert!(reduce(&[t(), or(), f()]));
    assert!(reduce(&[open(), t(), close()]));
    assert!(reduce(&[
        open(),
        open(),
        t(),
        and(),
        f(),
        close(),
        or(),
        t(),
        close()
    ]));

    let mut unmatched = vec![open(); 26];
    unmatched.extend([t(), and(), f()]);
    unmatched.extend(vec![close(); 24]);
    assert!(unmatched.len() >= 50);
    assert!(!reduce(&unmatched));
    assert!(!reduce(&[t(), and()]));
}

fn single(project: &Project, id: NodeId, token: Token) -> bool {
    Evaluator::new(project).evaluate_condition(&Condition::from(vec![token]), id, EvalContext::LiveDocument)
}

#[test]
fn extension_enabled_and_search() {
    let mut project = Project::new();
    let root = project.root();
    let doc = project
        .add_child(root, Node::unit("fox.md").with_content("The quick fox").disabled(true))
        .unwrap();

    assert!(single(&project, doc, Field::extension().eq("md")));
    assert!(!single(&project, doc, Field::extension().neq("md")));

    assert!(!single(&project, doc, Field::enabled().eq("true")));
    assert!(single(&project, doc, Field::enabled().eq("false")));

    assert!(single(&project, doc, Field::text().eq("quick")));
    assert!(!single(&project, doc, Field::case_text().eq("Quick")));
    assert!(single(&project, doc, Field::word().eq("fox")));
    assert!(!single(&project, doc, Field::word().eq("fo")));
}

#[test]
fn version_ranges() {
    let history = CommitLog::new()
        .commit("C1", ["a.txt"])
        .commit("C2", ["b.txt"])
        .commit("C3", ["a.txt", "c.txt"]);
    let mut project = Project::new().with_history(history);
    let root = project.root();
    let a = project.add_child(root, Node::unit("a.txt")).unwrap();
    let b = project.add_child(root, Node::unit("b.txt")).unwrap();
    let c = project.add_child(root, Node::unit("c.txt")).unwrap();

    assert!(!single(&project, a, Field::version().eq(CommitRef::new("C2"))));
    assert!(single(&project, c, Field::version().gt(CommitRef::new("C1"))));
    assert!(single(&project, b, Field::version().lt(CommitRef::new("C3"))));
}

#[test]
fn scoped_rule_rewrites_once() {
    let mut rule = Rule::new(vec![Field::named("color").eq("red")]).with_extension_scope("frm");
    let first = rule.rewrite(None).clone();
    let second = rule.rewrite(None).clone();
    assert_eq!(first, second);
    assert_eq!(
        first.tokens(),
        &[Field::form("frm", "color").eq("red")]
    );
}

#[test]
fn documents_before_other_items() {
    let mut project = Project::new();
    let root = project.root();
    project
        .add_child(root, Node::unit("five.md").with_order(5))
        .unwrap();
    project
        .add_child(root, Node::non_document("b.txt"))
        .unwrap();
    project
        .add_child(root, Node::unit("two.md").with_order(2))
        .unwrap();
    project
        .add_child(root, Node::non_document("a.txt"))
        .unwrap();

    let mut entry = ReportEntry::new("all").rule(Rule::new(Condition::new()));
    let matches = run(&mut entry, &project, root).unwrap();
    assert_eq!(
        names(&project, &matches),
        vec!["two.md", "five.md", "a.txt", "b.txt"]
    );
}

#[test]
fn bounded_entry_and_detailed_outcome() {
    let mut project = spec_tree();
    let other = project
        .add_child(project.root(), Node::folder("Other"))
        .unwrap();
    project
        .add_child(other, Node::unit("note.md").with_content("hello again"))
        .unwrap();

    let mut entry = ReportEntry::new("hello")
        .with_bounds("Spec")
        .rule(Rule::new(vec![Field::word().eq("hello")]))
        .rule(Rule::new(vec![Field::word().eq("hello")]).with_bounds("Other"));
    let outcome = ReportRunner::new(&project)
        .run_detailed(&mut entry, project.root())
        .unwrap();
    assert_eq!(names(&project, outcome.matches()), vec!["req1.md", "note.md"]);
    assert_eq!(outcome.rule_hits(), &[1, 1]);
    assert_eq!(outcome.visited(), 6);
}

#[test]
fn malformed_rule_names_entry_and_index() {
    let project = spec_tree();
    let mut entry = ReportEntry::new("broken")
        .rule(Rule::new(vec![Field::word().eq("hello")]))
        .rule(Rule::new(vec![Field::extension().lt("md")]));
    let err = run(&mut entry, &project, project.root()).unwrap_err();
    match err {
        ReportError::MalformedRule {
            report,
            index,
            source,
        } => {
            assert_eq!(report, "broken");
            assert_eq!(index, 1);
            assert!(matches!(source, ValidationError::IllegalOperator { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn configured_run_from_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("docquery.toml");
    fs::write(&path, "cache_version_sets = true\n").unwrap();

    let project = spec_tree();
    let mut entry = ReportEntry::new("r").rule(Rule::new(vec![Field::text().eq("good")]));
    let matches = run_configured(&mut entry, &project, project.root(), &path).unwrap();
    assert_eq!(names(&project, &matches), vec!["req2.md"]);

    let missing = dir.path().join("missing.toml");
    let mut entry = ReportEntry::new("r");
    assert!(run_configured(&mut entry, &project, project.root(), missing).is_err());
}

#[test]
fn raw_files_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("Spec")).unwrap();
    fs::write(dir.path().join("Spec/req1.md"), "hello world").unwrap();
    fs::write(dir.path().join("notes.md"), "hello there").unwrap();

    let evaluator = FsEvaluator::new(dir.path());
    let condition = Condition::from(vec![
        Field::path().eq("Spec"),
        and(),
        Field::word().eq("hello"),
    ]);
    assert!(evaluator.evaluate_condition(&condition, &dir.path().join("Spec/req1.md")));
    assert!(!evaluator.evaluate_condition(&condition, &dir.path().join("notes.md")));
}
