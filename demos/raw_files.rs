use std::fs;

use docquery::{Condition, EngineConfig, Field, FsEvaluator, and};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> std::io::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let dir = std::env::temp_dir().join("docquery-raw-files");
    fs::create_dir_all(dir.join("Spec"))?;
    fs::write(dir.join("Spec/req1.md"), "hello world")?;
    fs::write(dir.join("Spec/req2.md"), "goodbye")?;
    fs::write(dir.join("notes.md"), "hello from the root")?;

    let evaluator = FsEvaluator::new(&dir).with_config(EngineConfig {
        max_text_bytes: 64 * 1024,
        ..EngineConfig::default()
    });
    let condition = Condition::from(vec![
        Field::path().eq("Spec"),
        and(),
        Field::word().eq("hello"),
    ]);
    println!("condition: {condition}");

    for file in ["Spec/req1.md", "Spec/req2.md", "notes.md"] {
        let matched = evaluator.evaluate_condition(&condition, &dir.join(file));
        println!("  {file}: {matched}");
    }

    fs::remove_dir_all(&dir)
}
