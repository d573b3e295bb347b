use std::path::PathBuf;

use super::Config;

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("NEWSRAG_LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("NEWSRAG_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("NEWSRAG_LLM_EMBEDDING_MODEL") {
            self.llm.embedding_model = v;
        }
        if let Ok(v) = std::env::var("NEWSRAG_LLM_MAX_TOKENS") {
            if let Ok(n) = v.parse::<u32>() {
                self.llm.max_tokens = n;
            } else {
                tracing::warn!("ignoring invalid NEWSRAG_LLM_MAX_TOKENS value: {v}");
            }
        }
        if let Ok(v) = std::env::var("NEWSRAG_LOADER_TIMEOUT") {
            if let Ok(secs) = v.parse::<u64>() {
                self.loader.timeout = secs;
            } else {
                tracing::warn!("ignoring invalid NEWSRAG_LOADER_TIMEOUT value: {v}");
            }
        }
        if let Ok(v) = std::env::var("NEWSRAG_LOADER_MAX_BODY") {
            if let Ok(bytes) = v.parse::<usize>() {
                self.loader.max_body_bytes = bytes;
            } else {
                tracing::warn!("ignoring invalid NEWSRAG_LOADER_MAX_BODY value: {v}");
            }
        }
        if let Ok(v) = std::env::var("NEWSRAG_SPLITTER_CHUNK_SIZE") {
            if let Ok(size) = v.parse::<usize>() {
                self.splitter.chunk_size = size;
            } else {
                tracing::warn!("ignoring invalid NEWSRAG_SPLITTER_CHUNK_SIZE value: {v}");
            }
        }
        if let Ok(v) = std::env::var("NEWSRAG_INDEX_PATH") {
            self.index.path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("NEWSRAG_INDEX_TOP_K") {
            if let Ok(k) = v.parse::<usize>() {
                self.index.top_k = k;
            } else {
                tracing::warn!("ignoring invalid NEWSRAG_INDEX_TOP_K value: {v}");
            }
        }
    }
}
