use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use log::{error, info};
use std::path::Path;

use pdf_chat::document::Document;
use pdf_chat::gemini::{GeminiClient, GeminiConfig};
use pdf_chat::rag::RagPipeline;
use pdf_chat::store::IndexStore;

/// Ask questions about a PDF using Gemini embeddings and an on-disk vector index
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the document to process (supports text and PDF)
    #[arg(index = 1)]
    file_path: String,

    /// Directory holding cached vector indexes
    #[arg(long, default_value = "index")]
    index_dir: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    info!("Processing file: {}", args.file_path);

    // Validate input file exists
    let path = Path::new(&args.file_path);
    if !path.exists() {
        error!("File not found: {}", args.file_path);
        return Err(anyhow::anyhow!("File not found"));
    }

    // Load configuration from environment
    let gemini_config = GeminiConfig::from_env().context("Missing GEMINI_API_KEY")?;

    let store = IndexStore::new(&args.index_dir, &gemini_config.embedding_model);
    let gemini = GeminiClient::new(gemini_config);
    let pipeline = RagPipeline::new(gemini, store);

    // Load the document (text or PDF) and hash its bytes
    let document = Document::from_file(path).context("Failed to process document")?;

    info!("Document type: {}", document.mime_type);
    info!("Content id: {}", document.content_id);

    // Load the cached index for these bytes, or build and persist one
    let index = pipeline
        .ensure_index(&document)
        .await
        .context("Failed to index document")?;

    // Enter interactive Q&A loop
    pipeline
        .run_query_loop(&index)
        .await
        .context("Error in query loop")?;

    Ok(())
}
