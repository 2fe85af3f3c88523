//! Offline index builder.
//!
//! Reads newline-delimited JSON knowledge-base files (`<domain>.jsonl`) and
//! writes one persisted vector index per domain. This runs outside the live
//! request path; the server only ever opens the resulting indexes read-only,
//! and rerunning the builder replaces them wholesale.

use anyhow::Context;
use clap::Parser;
use jewelrybox::index::{load_passages_from_jsonl, PassageIndex};
use jewelrybox::providers::ai::ApiEmbedder;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(about = "Build the persisted vector indexes from knowledge-base JSONL files")]
struct Args {
    /// Directory of `<domain>.jsonl` knowledge-base files.
    #[arg(long, default_value = "kb")]
    kb_dir: PathBuf,
    /// Output directory for the built `<domain>.db` indexes.
    #[arg(long, default_value = "indexes")]
    out_dir: PathBuf,
    /// OpenAI-compatible embeddings endpoint.
    #[arg(long, env = "EMBEDDINGS_API_URL", default_value = "https://api.openai.com/v1/embeddings")]
    api_url: String,
    /// Embedding model name.
    #[arg(long, env = "EMBEDDINGS_MODEL", default_value = "text-embedding-3-small")]
    model: String,
    /// Bearer token for the embeddings endpoint.
    #[arg(long, env = "OPENAI_API_KEY")]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let args = Args::parse();
    let embedder = ApiEmbedder::new(args.api_url.clone(), args.model.clone(), args.api_key.clone())?;
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create '{}'", args.out_dir.display()))?;

    let mut built = 0usize;
    let entries = std::fs::read_dir(&args.kb_dir)
        .with_context(|| format!("Failed to read knowledge base dir '{}'", args.kb_dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("jsonl") {
            continue;
        }
        let domain = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("default")
            .to_string();

        let passages = load_passages_from_jsonl(&path)
            .with_context(|| format!("Failed to load '{}'", path.display()))?;
        if passages.is_empty() {
            warn!(domain, "Knowledge base file has no passages, skipping");
            continue;
        }

        let out_path = args.out_dir.join(format!("{domain}.db"));
        let identifier = out_path
            .to_str()
            .context("Index output path is not valid UTF-8")?;
        let index = PassageIndex::build(identifier, &passages, &embedder, &args.model).await?;
        info!(
            domain,
            passages = index.passage_count().await?,
            path = %out_path.display(),
            "Index built"
        );
        built += 1;
    }

    info!(built, "Index build complete");
    Ok(())
}
