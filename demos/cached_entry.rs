use docquery::serial::is_fresh;
use docquery::{Field, Node, Project, ReportEntry, Rule, and, run};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const SOURCE: &str = "requirements: ext == md AND word == shall";

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let mut project = Project::new();
    let root = project.root();
    let spec = project.add_child(root, Node::folder("Spec")).expect("root is a folder");
    project
        .add_child(spec, Node::unit("req.md").with_content("The system shall start."))
        .expect("Spec is a folder");

    let mut entry = ReportEntry::new("requirements").with_bounds("Spec").rule(Rule::new(vec![
        Field::extension().eq("md"),
        and(),
        Field::word().eq("shall"),
    ]));
    let first = run(&mut entry, &project, root).expect("rules are well formed");

    let bytes = entry.to_bytes(Some(SOURCE)).expect("failed to serialize");
    println!("cached {} bytes, fresh: {}", bytes.len(), is_fresh(&bytes, SOURCE).unwrap_or(false));

    let mut restored = ReportEntry::from_bytes(&bytes).expect("failed to deserialize");
    let second = run(&mut restored, &project, root).expect("rules are well formed");
    assert_eq!(first, second);
    println!("reloaded entry matched {} node(s)", second.len());
}
