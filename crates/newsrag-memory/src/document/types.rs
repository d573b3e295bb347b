#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Fetched,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub url: String,
    pub title: Option<String>,
    pub raw_text: String,
    pub fetch_status: FetchStatus,
}

impl SourceDocument {
    #[must_use]
    pub fn fetched(url: impl Into<String>, title: Option<String>, raw_text: String) -> Self {
        Self {
            url: url.into(),
            title,
            raw_text,
            fetch_status: FetchStatus::Fetched,
        }
    }

    #[must_use]
    pub fn failed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            raw_text: String::new(),
            fetch_status: FetchStatus::Failed(reason.into()),
        }
    }

    #[must_use]
    pub fn is_fetched(&self) -> bool {
        self.fetch_status == FetchStatus::Fetched
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub text: String,
    pub source_url: String,
    /// Position of the chunk within its document, starting at 0.
    pub sequence_index: usize,
}
