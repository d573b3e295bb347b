//! Build and ask actions wired from explicit configuration.

use std::path::{Path, PathBuf};

use newsrag_llm::openai::OpenAiProvider;
use newsrag_llm::{LlmError, LlmProvider};
use newsrag_memory::document::{
    DocumentError, DocumentLoader, FetchStatus, IngestionPipeline, TextSplitter, WebLoader,
};
use newsrag_memory::{SnapshotError, snapshot};

use crate::config::Config;
use crate::qa::{AnswerResult, QaError, RetrievalQa};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("no API key configured; set NEWSRAG_OPENAI_API_KEY or enter one when prompted")]
    MissingCredential,

    #[error("no index found at {}; process some URLs first", .0.display())]
    MissingIndex(PathBuf),

    #[error("none of the URLs produced any text to index")]
    NoContent,

    #[error("remote API call failed: {0}")]
    Remote(#[from] LlmError),

    #[error(transparent)]
    Document(DocumentError),

    #[error(transparent)]
    Snapshot(SnapshotError),

    #[error(transparent)]
    Qa(QaError),
}

impl From<DocumentError> for PipelineError {
    fn from(e: DocumentError) -> Self {
        match e {
            DocumentError::Embedding(e) => Self::Remote(e),
            other => Self::Document(other),
        }
    }
}

impl From<SnapshotError> for PipelineError {
    fn from(e: SnapshotError) -> Self {
        match e {
            SnapshotError::NotFound(path) => Self::MissingIndex(path),
            other => Self::Snapshot(other),
        }
    }
}

impl From<QaError> for PipelineError {
    fn from(e: QaError) -> Self {
        match e {
            QaError::Llm(e) => Self::Remote(e),
            other => Self::Qa(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUrl {
    pub url: String,
    pub reason: String,
}

/// Summary of a build that wrote a new snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub documents: usize,
    pub failed: Vec<FailedUrl>,
    pub chunks: usize,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Every URL field was blank; nothing was fetched or written.
    Skipped,
    Built(BuildReport),
}

/// One user session: a provider, a loader, and where the index lives.
pub struct Pipeline<P> {
    provider: P,
    loader: Box<dyn DocumentLoader>,
    ingestion: IngestionPipeline,
    index_path: PathBuf,
    top_k: usize,
}

impl<P: LlmProvider> Pipeline<P> {
    #[must_use]
    pub fn new(
        provider: P,
        loader: Box<dyn DocumentLoader>,
        splitter: TextSplitter,
        index_path: impl Into<PathBuf>,
        top_k: usize,
    ) -> Self {
        Self {
            provider,
            loader,
            ingestion: IngestionPipeline::new(splitter),
            index_path: index_path.into(),
            top_k,
        }
    }

    #[must_use]
    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Fetch, chunk and embed the given URLs, then replace the snapshot.
    ///
    /// The previous snapshot is left untouched on any error.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NoContent`] if no URL yielded text,
    /// [`PipelineError::Remote`] if an embedding call fails, or another
    /// variant if the URL list is rejected or the snapshot cannot be written.
    pub async fn build(&self, urls: &[String]) -> Result<BuildOutcome, PipelineError> {
        if urls.iter().all(|u| u.trim().is_empty()) {
            tracing::debug!("all URL fields blank, skipping build");
            return Ok(BuildOutcome::Skipped);
        }

        tracing::info!("loading articles");
        let (documents, ingested) = self
            .ingestion
            .load_and_ingest(self.loader.as_ref(), &self.provider, urls)
            .await?;

        let failed: Vec<FailedUrl> = documents
            .iter()
            .filter_map(|doc| match &doc.fetch_status {
                FetchStatus::Failed(reason) => Some(FailedUrl {
                    url: doc.url.clone(),
                    reason: reason.clone(),
                }),
                FetchStatus::Fetched => None,
            })
            .collect();

        if ingested.chunk_count == 0 {
            return Err(PipelineError::NoContent);
        }

        let path = self.index_path.clone();
        let index = ingested.index;
        tokio::task::spawn_blocking({
            let path = path.clone();
            move || snapshot::save(&index, &path)
        })
        .await
        .map_err(|e| SnapshotError::Io(std::io::Error::other(e)))??;

        tracing::info!(
            documents = documents.len(),
            failed = failed.len(),
            chunks = ingested.chunk_count,
            "index built"
        );
        Ok(BuildOutcome::Built(BuildReport {
            documents: documents.len(),
            failed,
            chunks: ingested.chunk_count,
            path,
        }))
    }

    /// Answer a question from the last saved snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingIndex`] if no build has completed yet,
    /// or another variant if loading or a remote call fails.
    pub async fn ask(&self, question: &str) -> Result<AnswerResult, PipelineError> {
        if question.trim().is_empty() {
            return Err(QaError::EmptyQuestion.into());
        }

        let path = self.index_path.clone();
        let index = tokio::task::spawn_blocking(move || snapshot::load(&path))
            .await
            .map_err(|e| SnapshotError::Io(std::io::Error::other(e)))??;

        let qa = RetrievalQa::new(&self.provider, self.top_k);
        Ok(qa.answer(&index, question).await?)
    }
}

impl Pipeline<OpenAiProvider> {
    /// Wire the OpenAI-compatible client and web loader from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingCredential`] if no API key was resolved.
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        let api_key = config
            .secrets
            .openai_api_key
            .as_ref()
            .filter(|k| !k.is_blank())
            .ok_or(PipelineError::MissingCredential)?;

        let provider = OpenAiProvider::new(
            api_key.expose().to_owned(),
            config.llm.base_url.clone(),
            config.llm.model.clone(),
            config.llm.max_tokens,
            Some(config.llm.embedding_model.clone()),
        )
        .with_temperature(config.llm.temperature)
        .with_embed_batch_size(config.llm.embed_batch_size);

        Ok(Self::new(
            provider,
            Box::new(WebLoader::new(&config.loader)),
            TextSplitter::new(config.splitter.clone()),
            config.index.path.clone(),
            config.index.top_k,
        ))
    }
}
