#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("too many URLs: {given} given, at most {max} allowed")]
    TooManyUrls { given: usize, max: usize },

    #[error("embedding failed: {0}")]
    Embedding(#[from] newsrag_llm::LlmError),

    #[error("index error: {0}")]
    Index(#[from] crate::index::IndexError),
}

/// Why a single URL could not be turned into text.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("blocked: {0}")]
    Blocked(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("response too large: {size} bytes (max: {max})")]
    TooLarge { size: usize, max: usize },

    #[error("HTML parse failed: {0}")]
    Parse(String),

    #[error("no readable text found")]
    NoText,
}
