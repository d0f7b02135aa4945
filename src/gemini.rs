use std::env;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::error::RagError;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GENERATION_MODEL: &str = "models/gemini-2.0-flash";
const DEFAULT_EMBEDDING_MODEL: &str = "models/text-embedding-004";

/// Configuration for the Gemini API
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub generation_model: String,
    pub embedding_model: String,
    pub api_base: String,
}

impl GeminiConfig {
    /// Create a new configuration from environment variables. Only the API
    /// key is required; models and endpoint fall back to defaults.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("GEMINI_API_KEY")?;
        let generation_model =
            env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GENERATION_MODEL.to_string());
        let embedding_model = env::var("GEMINI_EMBEDDING_MODEL")
            .unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string());
        let api_base =
            env::var("GEMINI_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());

        Ok(GeminiConfig {
            api_key,
            generation_model,
            embedding_model,
            api_base,
        })
    }
}

/// Options for a single generation call.
#[derive(Debug, Clone, Copy)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_output_tokens: i32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        GenerationOptions {
            temperature: 0.3,
            max_output_tokens: 512,
        }
    }
}

/// Client for interacting with the Gemini API
#[derive(Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(config: GeminiConfig) -> Self {
        let client = reqwest::Client::new();
        GeminiClient { config, client }
    }

    /// Generate the embedding for a text. The model is fixed for the
    /// lifetime of the client, so build-time and query-time vectors are
    /// always comparable.
    pub async fn embed(&self, text: &str) -> Result<Embedding, RagError> {
        #[derive(Serialize)]
        struct EmbeddingContent<'a> {
            parts: Vec<Part<'a>>,
        }

        #[derive(Serialize)]
        struct EmbeddingRequest<'a> {
            model: &'a str,
            content: EmbeddingContent<'a>,
        }

        let request = EmbeddingRequest {
            model: &self.config.embedding_model,
            content: EmbeddingContent {
                parts: vec![Part { text }],
            },
        };

        let url = format!(
            "{}/{}:embedContent?key={}",
            self.config.api_base, self.config.embedding_model, self.config.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::EmbeddingFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RagError::EmbeddingFailed(format!(
                "{} {}",
                status, error_text
            )));
        }

        let response_data: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| RagError::EmbeddingFailed(e.to_string()))?;

        Ok(Embedding {
            values: response_data.embedding.values,
        })
    }

    /// Run a single generation call and return the model's text output.
    pub async fn generate(
        &self,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<String, RagError> {
        let request = GenerateRequest {
            contents: vec![Content::new_with_role(prompt, "user")],
            generation_config: GenerationConfig {
                temperature: options.temperature,
                max_output_tokens: options.max_output_tokens,
            },
        };

        let url = format!(
            "{}/{}:generateContent?key={}",
            self.config.api_base, self.config.generation_model, self.config.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::GeneratorUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RagError::GeneratorUnavailable(format!(
                "{} {}",
                status, error_text
            )));
        }

        let response_data: GenerateResponse = response
            .json()
            .await
            .map_err(|e| RagError::GeneratorUnavailable(e.to_string()))?;

        response_data
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| RagError::GeneratorUnavailable("no response generated".to_string()))
    }
}

/// Representation of a vector embedding
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Embedding {
    pub values: Vec<f32>,
}

// Request/response structures for the Gemini API

#[derive(Deserialize, Debug)]
struct EmbeddingResponse {
    embedding: EmbeddingData,
}

#[derive(Deserialize, Debug)]
struct EmbeddingData {
    values: Vec<f32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
    role: &'static str,
}

impl<'a> Content<'a> {
    fn new_with_role(text: &'a str, role: &'static str) -> Self {
        Content {
            parts: vec![Part { text }],
            role,
        }
    }
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: i32,
}

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Deserialize, Debug)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    text: String,
}
