use anyhow::Result;
use clap::Parser;
use engine::SearchEngine;
use std::io::{self, BufRead, Write};
use std::time::Instant;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "query")]
#[command(about = "Interactive boolean search over a built index", long_about = None)]
struct Args {
    /// Index directory path
    #[arg(long, default_value = "./index")]
    index: String,
}

/// Reads one query per line from stdin until EOF. Results go to stdout;
/// everything diagnostic goes to stderr so output stays pipeable.
fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let engine = SearchEngine::load(&args.index)?;
    tracing::info!(
        index = %args.index,
        vocabulary = engine.vocabulary_size(),
        documents = engine.num_doc_slots(),
        "index loaded"
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in stdin.lock().lines() {
        let query = line?;
        if query.is_empty() {
            continue;
        }

        let started = Instant::now();
        let (results, total) = engine.search(&query);
        let ms = started.elapsed().as_secs_f64() * 1000.0;

        writeln!(out, "Found {} documents ({:.1} ms):", total, ms)?;
        for result in &results {
            writeln!(out, "{}\t{}\t{}", result.doc_id, result.url, result.title)?;
        }
        if total > results.len() {
            writeln!(out, "... and {} more results", total - results.len())?;
        }
        writeln!(out)?;
        out.flush()?;
    }
    Ok(())
}
