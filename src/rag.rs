use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use log::info;
use tokio::sync::Mutex;

use crate::chunking;
use crate::document::Document;
use crate::error::RagError;
use crate::gemini::{GeminiClient, GenerationOptions};
use crate::index::VectorIndex;
use crate::store::IndexStore;

/// Number of chunks retrieved as context for each question.
const TOP_K: usize = 3;

/// Returned when the generator output carries no "Answer:" marker.
pub const NO_ANSWER: &str = "Answer not found.";

/// Retrieval-augmented question-answering pipeline over one document.
///
/// Owns everything the pipeline needs; constructed once in `main` and passed
/// around explicitly, so there is no module-level shared state.
pub struct RagPipeline {
    gemini: GeminiClient,
    store: IndexStore,
    // At most one build may run per content id at a time; concurrent uploads
    // of the same bytes serialize here instead of racing on the store.
    build_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl RagPipeline {
    pub fn new(gemini: GeminiClient, store: IndexStore) -> Self {
        RagPipeline {
            gemini,
            store,
            build_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn build_lock(&self, content_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.build_locks.lock().await;
        locks
            .entry(content_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Load the cached index for a document, or build and persist one.
    ///
    /// The check-then-build-then-save sequence runs under the per-content-id
    /// lock, so the same document is never embedded twice concurrently. A
    /// cached artifact that fails to load surfaces as
    /// [`RagError::CorruptIndex`]; there is no automatic rebuild.
    pub async fn ensure_index(&self, document: &Document) -> Result<VectorIndex, RagError> {
        let lock = self.build_lock(&document.content_id).await;
        let _guard = lock.lock().await;

        if self.store.exists(&document.content_id) {
            info!("Using cached index for {}", document.content_id);
            return self.store.load(&document.content_id);
        }

        let chunks = chunking::split_into_chunks(&document.content);
        info!("Split document into {} chunks", chunks.len());

        let mut index = VectorIndex::new();
        for chunk in chunks {
            let embedding = self.gemini.embed(&chunk.text).await?;
            index.insert(chunk, embedding);
        }

        self.store.save(&document.content_id, &index)?;
        Ok(index)
    }

    /// Answer a question using the top chunks retrieved from the index.
    pub async fn answer(&self, index: &VectorIndex, question: &str) -> Result<String, RagError> {
        let query_embedding = self.gemini.embed(question).await?;
        let context_chunks = index.similarity_search(&query_embedding.values, TOP_K);

        let context = context_chunks
            .iter()
            .map(|chunk| chunk.text.as_str())
            .collect::<Vec<&str>>()
            .join("\n\n");

        let prompt = build_prompt(&context, question);
        let output = self
            .gemini
            .generate(&prompt, GenerationOptions::default())
            .await?;

        Ok(extract_answer(&output))
    }

    /// Interactive question loop over one document. Type 'exit' to quit.
    pub async fn run_query_loop(&self, index: &VectorIndex) -> Result<()> {
        info!("Ready to answer questions. Type 'exit' to quit.");

        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut buffer = String::new();

        loop {
            print!("\nYour question: ");
            stdout.flush()?;

            buffer.clear();
            stdin.read_line(&mut buffer)?;

            let question = buffer.trim();
            if question.is_empty() {
                continue;
            }
            if question.eq_ignore_ascii_case("exit") {
                info!("Goodbye!");
                break;
            }

            let answer = self.answer(index, question).await?;
            println!("\n{}", answer);
        }

        Ok(())
    }
}

/// Assemble the single-shot prompt: instructional preamble, retrieved
/// context separated by blank lines, the literal question, and the trailing
/// answer marker the extraction step looks for.
fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "Use the following context to answer the question:\n\n{}\n\nQuestion: {}\nAnswer:",
        context, question
    )
}

/// Return everything after the first case-insensitive "Answer:" marker,
/// trimmed; [`NO_ANSWER`] when the marker is absent.
pub fn extract_answer(output: &str) -> String {
    const MARKER: &[u8] = b"answer:";

    let bytes = output.as_bytes();
    let hit = bytes
        .windows(MARKER.len())
        .position(|window| window.eq_ignore_ascii_case(MARKER));

    match hit {
        // The marker is pure ASCII, so both slice bounds are char boundaries
        Some(i) => output[i + MARKER.len()..].trim().to_string(),
        None => NO_ANSWER.to_string(),
    }
}
