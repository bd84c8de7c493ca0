use anyhow::Result;
use clap::Parser;
use semgraph::app::engine::AnalysisEngine;
use tracing_subscriber::EnvFilter;

/// Load a serialized resolved program and build its semantic graph.
#[derive(Parser)]
#[command(name = "sgtool", version, about)]
struct Cli {
    /// Path to a resolved program file (JSON).
    program: std::path::PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let ctx = AnalysisEngine::analyze_file(&cli.program)?;

    let store = &ctx.store;
    println!("Model summary:");
    println!("  Objects: {}", store.object_count());
    println!("  Links: {}", store.link_count());
    for (class_name, count) in store.class_counts() {
        println!("  {class_name}: {count}");
    }
    Ok(())
}
