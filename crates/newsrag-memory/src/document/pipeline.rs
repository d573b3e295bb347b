use newsrag_llm::{LlmError, LlmProvider};

use super::{DocumentError, DocumentLoader, SourceDocument, TextSplitter};
use crate::index::{IndexEntry, VectorIndex};

/// Result of a successful ingestion.
#[derive(Debug)]
pub struct Ingested {
    pub index: VectorIndex,
    pub chunk_count: usize,
}

pub struct IngestionPipeline {
    splitter: TextSplitter,
}

impl IngestionPipeline {
    #[must_use]
    pub fn new(splitter: TextSplitter) -> Self {
        Self { splitter }
    }

    /// Split fetched documents, embed every chunk, and build a fresh index.
    ///
    /// Failed documents contribute no chunks. The first embedding failure
    /// aborts the whole build.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding fails or the vectors cannot form an index.
    pub async fn ingest<P: LlmProvider>(
        &self,
        provider: &P,
        documents: &[SourceDocument],
    ) -> Result<Ingested, DocumentError> {
        let chunks = self.splitter.split_documents(documents);
        if chunks.is_empty() {
            return Ok(Ingested {
                index: VectorIndex::default(),
                chunk_count: 0,
            });
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        tracing::info!(chunks = texts.len(), provider = provider.name(), "embedding chunks");
        let vectors = provider.embed_batch(&texts).await?;
        if vectors.len() != chunks.len() {
            return Err(LlmError::Other(format!(
                "expected {} embeddings, got {}",
                chunks.len(),
                vectors.len()
            ))
            .into());
        }

        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexEntry {
                vector,
                chunk_text: chunk.text,
                source_url: chunk.source_url,
            })
            .collect();

        let chunk_count = entries.len();
        let index = VectorIndex::build(entries)?;
        Ok(Ingested { index, chunk_count })
    }

    /// # Errors
    ///
    /// Returns an error if the URL list is rejected or embedding fails.
    pub async fn load_and_ingest<P: LlmProvider>(
        &self,
        loader: &(dyn DocumentLoader + '_),
        provider: &P,
        urls: &[String],
    ) -> Result<(Vec<SourceDocument>, Ingested), DocumentError> {
        let documents = loader.load(urls).await?;
        let ingested = self.ingest(provider, &documents).await?;
        Ok((documents, ingested))
    }
}
