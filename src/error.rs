use thiserror::Error;

/// Errors surfaced by the question-answering pipeline.
///
/// Every variant is terminal for the interaction that raised it: nothing is
/// retried and no fallback path exists. A missing "Answer:" marker in the
/// generator output is not an error (see [`crate::rag::NO_ANSWER`]).
#[derive(Debug, Error)]
pub enum RagError {
    /// The uploaded bytes could not be turned into document text.
    #[error("unreadable document: {0}")]
    UnreadableDocument(String),

    /// A cached index exists on disk but cannot be used.
    #[error("corrupt index for {content_id}: {reason}")]
    CorruptIndex { content_id: String, reason: String },

    /// The embedding endpoint failed or returned a non-success status.
    #[error("embedding request failed: {0}")]
    EmbeddingFailed(String),

    /// The generation endpoint failed or returned a non-success status.
    #[error("generator unavailable: {0}")]
    GeneratorUnavailable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
