pub mod chunking;
pub mod document;
pub mod error;
pub mod gemini;
pub mod hashing;
pub mod index;
pub mod rag;
pub mod store;
