use docquery::{
    Choice, CommitLog, CommitRef, EngineConfig, Field, FormFieldValue, FormValues, Node, Project,
    ReportEntry, ReportRunner, Rule, and, close, open, or,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let history = CommitLog::new()
        .commit("c1", ["Spec/login.md", "Spec/logout.md"])
        .commit("c2", ["Spec/login.md"])
        .commit("c3", ["Tickets/T-1.frm"]);

    let mut project = Project::new().with_extension("frm").with_history(history);
    let root = project.root();
    let spec = project.add_child(root, Node::folder("Spec")).expect("root is a folder");
    project
        .add_child(spec, Node::unit("login.md").with_content("The user can log in with a password."))
        .expect("Spec is a folder");
    project
        .add_child(
            spec,
            Node::unit("logout.md")
                .with_content("The user can log out.")
                .disabled(true),
        )
        .expect("Spec is a folder");
    project
        .add_child(spec, Node::non_document("flow.png"))
        .expect("Spec is a folder");

    let tickets = project.add_child(root, Node::folder("Tickets")).expect("root is a folder");
    project
        .add_child(
            tickets,
            Node::unit("T-1.frm").with_form(
                FormValues::new()
                    .set("title", FormFieldValue::Text("Login fails".into()))
                    .set(
                        "priority",
                        FormFieldValue::Radio(Choice::new(["low", "medium", "high"]).select(2)),
                    ),
            ),
        )
        .expect("Tickets is a folder");

    let mut entry = ReportEntry::new("login review")
        .rule(
            Rule::new(vec![
                Field::enabled().eq(true),
                and(),
                open(),
                Field::word().eq("password"),
                or(),
                Field::version().gte(CommitRef::new("c2")),
                close(),
            ])
            .with_bounds("Spec"),
        )
        .rule(Rule::new(vec![Field::named("priority").gte("medium")]).with_extension_scope("frm"))
        .rule(Rule::new(vec![Field::extension().eq("png")]));

    let runner = ReportRunner::new(&project).with_config(EngineConfig {
        cache_version_sets: true,
        ..EngineConfig::default()
    });
    let outcome = runner
        .run_detailed(&mut entry, root)
        .expect("report rules are well formed");

    for rule in entry.rules() {
        println!("rule: {}", rule.condition());
    }
    println!();
    println!("{outcome}");
    for &id in outcome.matches() {
        let node = project.node(id).expect("matches belong to the project");
        println!("  {}", node.resource().unwrap_or(node.name()));
    }
}
