use anyhow::{ensure, Result};
use clap::Parser;
use engine::builder::IndexBuilder;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build a boolean search index from JSONL documents", long_about = None)]
struct Args {
    /// Input JSONL file, or a directory of .json/.jsonl files
    #[arg(long)]
    input: PathBuf,
    /// Output index directory
    #[arg(long)]
    output: PathBuf,
    /// Zipf frequency report path (defaults to <output>/zipf_stats.csv)
    #[arg(long)]
    zipf: Option<PathBuf>,
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut files: Vec<PathBuf> = Vec::new();
    if args.input.is_dir() {
        for entry in WalkDir::new(&args.input).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.is_file()
                && matches!(path.extension().and_then(|s| s.to_str()), Some("json" | "jsonl"))
            {
                files.push(path.to_path_buf());
            }
        }
        files.sort();
    } else {
        files.push(args.input.clone());
    }
    ensure!(!files.is_empty(), "no input files under {}", args.input.display());

    let mut builder = IndexBuilder::new();
    let start = Instant::now();
    for file in &files {
        tracing::info!(file = %file.display(), "indexing");
        builder.build_from_stream(file)?;
    }
    let elapsed = start.elapsed().as_secs_f64();

    builder.save(&args.output)?;
    let zipf_path = args
        .zipf
        .clone()
        .unwrap_or_else(|| args.output.join("zipf_stats.csv"));
    builder.save_zipf(&zipf_path)?;

    let stats = builder.stats();
    let vocabulary = builder.vocabulary_size();
    let postings = builder.total_postings();
    tracing::info!(
        documents = stats.doc_count,
        skipped = stats.skipped_records,
        total_tokens = stats.total_tokens,
        total_stems = stats.total_stems,
        vocabulary,
        postings,
        text_bytes = stats.total_text_bytes,
        elapsed_seconds = elapsed,
        "index build complete"
    );

    let avg_token_length = per(stats.total_token_chars, stats.total_tokens);
    let avg_stem_length = per(stats.total_stem_chars, stats.total_stems);
    let stem_reduction_pct = if avg_token_length > 0.0 {
        100.0 * (avg_token_length - avg_stem_length) / avg_token_length
    } else {
        0.0
    };
    tracing::info!(
        avg_tokens_per_doc = per(stats.total_tokens, stats.doc_count),
        avg_token_length,
        avg_stem_length,
        stem_reduction_pct,
        avg_postings_per_term = per(postings, vocabulary as u64),
        output = %args.output.display(),
        zipf = %zipf_path.display(),
        "build statistics"
    );
    Ok(())
}

fn per(total: u64, count: u64) -> f64 {
    if count > 0 {
        total as f64 / count as f64
    } else {
        0.0
    }
}
