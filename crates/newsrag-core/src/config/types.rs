use std::path::PathBuf;

use newsrag_memory::document::{LoaderConfig, SplitterConfig};
use serde::{Deserialize, Serialize};

use crate::vault::Secret;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default)]
    pub splitter: SplitterConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(skip)]
    pub secrets: ResolvedSecrets,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}

fn default_max_tokens() -> u32 {
    500
}

fn default_temperature() -> f32 {
    0.7
}

fn default_embed_batch_size() -> usize {
    newsrag_llm::openai::DEFAULT_EMBED_BATCH_SIZE
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_embed_batch_size")]
    pub embed_batch_size: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            embedding_model: default_embedding_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            embed_batch_size: default_embed_batch_size(),
        }
    }
}

fn default_index_path() -> PathBuf {
    PathBuf::from(".newsrag/index.json")
}

fn default_top_k() -> usize {
    4
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexConfig {
    /// Snapshot file rewritten on every successful build.
    #[serde(default = "default_index_path")]
    pub path: PathBuf,
    /// Passages retrieved per question.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            path: default_index_path(),
            top_k: default_top_k(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ResolvedSecrets {
    pub openai_api_key: Option<Secret>,
}
