//! Test-only mock LLM provider.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::provider::{LlmProvider, Message};

/// Scripted chat replies plus deterministic bag-of-words embeddings.
///
/// Texts sharing words get nearby vectors, which is enough for retrieval
/// tests without a real embedding model.
#[derive(Debug, Clone)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<String>>>,
    requests: Arc<Mutex<Vec<Vec<Message>>>>,
    embed_calls: Arc<AtomicUsize>,
    pub default_response: String,
    pub dimension: usize,
    pub supports_embeddings: bool,
    pub fail_chat: bool,
    pub fail_embed: bool,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            embed_calls: Arc::new(AtomicUsize::new(0)),
            default_response: "mock response".into(),
            dimension: 64,
            supports_embeddings: true,
            fail_chat: false,
            fail_embed: false,
        }
    }
}

impl MockProvider {
    #[must_use]
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing_chat() -> Self {
        Self {
            fail_chat: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing_embed() -> Self {
        Self {
            fail_embed: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn without_embeddings() -> Self {
        Self {
            supports_embeddings: false,
            ..Self::default()
        }
    }

    /// Every message list passed to `chat`, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of `embed` calls made so far, batch calls counted per text.
    #[must_use]
    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }

    /// Hash lowercase words into buckets and L2-normalize.
    #[must_use]
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let dim = self.dimension.max(1);
        let mut vector = vec![0.0f32; dim];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            #[allow(clippy::cast_possible_truncation)]
            let bucket = (hasher.finish() % dim as u64) as usize;
            vector[bucket] += 1.0;
        }
        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }
}

impl LlmProvider for MockProvider {
    async fn chat(&self, messages: &[Message]) -> Result<String, crate::LlmError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        if self.fail_chat {
            return Err(crate::LlmError::Other("mock LLM error".into()));
        }
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(self.default_response.clone())
        } else {
            Ok(responses.remove(0))
        }
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, crate::LlmError> {
        if !self.supports_embeddings {
            return Err(crate::LlmError::EmbedUnsupported { provider: "mock" });
        }
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_embed {
            return Err(crate::LlmError::RateLimited);
        }
        Ok(self.embed_text(text))
    }

    fn supports_embeddings(&self) -> bool {
        self.supports_embeddings
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_responses_then_default() {
        let p = MockProvider::with_responses(vec!["first".into()]);
        assert_eq!(p.chat(&[Message::user("a")]).await.unwrap(), "first");
        assert_eq!(p.chat(&[Message::user("b")]).await.unwrap(), "mock response");
        assert_eq!(p.requests().len(), 2);
    }

    #[tokio::test]
    async fn embeddings_are_deterministic_and_normalized() {
        let p = MockProvider::default();
        let a = p.embed("Rates rise again").await.unwrap();
        let b = p.embed("rates RISE again").await.unwrap();
        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn without_embeddings_rejects_embed() {
        let p = MockProvider::without_embeddings();
        assert!(!p.supports_embeddings());
        assert!(matches!(
            p.embed("text").await,
            Err(crate::LlmError::EmbedUnsupported { provider: "mock" })
        ));
    }

    #[tokio::test]
    async fn failing_embed_stops_batch() {
        let p = MockProvider::failing_embed();
        let texts = vec!["a".to_owned(), "b".to_owned()];
        assert!(p.embed_batch(&texts).await.is_err());
        assert_eq!(p.embed_calls(), 1);
    }
}
