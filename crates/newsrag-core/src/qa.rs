//! Retrieval-augmented answering over a loaded [`VectorIndex`].

use std::fmt::Write as _;

use newsrag_llm::provider::Message;
use newsrag_llm::{LlmError, LlmProvider};
use newsrag_memory::{IndexError, Neighbor, VectorIndex};

const INSTRUCTIONS: &str = "Given the following extracted parts of news articles and a question, \
create a final answer with references (\"SOURCES\").\n\
Answer only from the extracts. If you don't know the answer, just say that you don't know; \
don't try to make up an answer.\n\
ALWAYS end your reply with a line starting with \"SOURCES:\" followed by the source URLs \
you used, separated by commas.";

const MARKERS: [&str; 2] = ["sources:", "source:"];

#[derive(Debug, thiserror::Error)]
pub enum QaError {
    #[error("question is empty")]
    EmptyQuestion,

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("retrieval failed: {0}")]
    Index(#[from] IndexError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerResult {
    pub answer_text: String,
    pub source_urls: Vec<String>,
}

/// Embeds a question, retrieves the closest passages and asks the model to
/// answer from them.
pub struct RetrievalQa<'a, P> {
    provider: &'a P,
    top_k: usize,
}

impl<'a, P: LlmProvider> RetrievalQa<'a, P> {
    #[must_use]
    pub fn new(provider: &'a P, top_k: usize) -> Self {
        Self { provider, top_k }
    }

    /// # Errors
    ///
    /// Returns an error if the question is blank, a remote call fails, or the
    /// question embedding does not match the index dimension.
    pub async fn answer(&self, index: &VectorIndex, question: &str) -> Result<AnswerResult, QaError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(QaError::EmptyQuestion);
        }

        let query = self.provider.embed(question).await?;
        let neighbors = index.nearest_neighbors(&query, self.top_k)?;
        tracing::debug!(retrieved = neighbors.len(), "retrieved passages");

        let messages = build_prompt(question, &neighbors);
        let reply = self.provider.chat(&messages).await?;
        Ok(parse_answer(&reply))
    }
}

/// Stuff every retrieved passage into a single prompt.
#[must_use]
pub fn build_prompt(question: &str, neighbors: &[Neighbor<'_>]) -> Vec<Message> {
    let mut body = format!("QUESTION: {question}\n=========\n");
    for n in neighbors {
        let _ = write!(
            body,
            "Content: {}\nSource: {}\n\n",
            n.entry.chunk_text, n.entry.source_url
        );
    }
    body.push_str("=========\nFINAL ANSWER:");

    vec![Message::system(INSTRUCTIONS), Message::user(body)]
}

/// Locate the sources marker as `(answer_end, sources_start)`.
///
/// A marker counts when it opens a line (after optional list or emphasis
/// punctuation), or when it is written in upper case after whitespace.
/// Words such as "resource:" or "open source:" mid-sentence are not markers.
fn find_marker(reply: &str) -> Option<(usize, usize)> {
    // ASCII lowercasing keeps byte offsets aligned with `reply`
    let lower = reply.to_ascii_lowercase();
    let mut best: Option<(usize, usize)> = None;

    for marker in MARKERS {
        for (pos, _) in lower.match_indices(marker) {
            let line_start = reply[..pos].rfind('\n').map_or(0, |i| i + 1);
            let prefix = &reply[line_start..pos];
            let opens_line = prefix
                .chars()
                .all(|c| c.is_whitespace() || matches!(c, '*' | '#' | '-' | '_' | '>'));
            let inline_upper = reply[pos..].starts_with(&marker.to_ascii_uppercase())
                && prefix.chars().last().is_some_and(char::is_whitespace);

            let found = if opens_line {
                (line_start, pos + marker.len())
            } else if inline_upper {
                (pos, pos + marker.len())
            } else {
                continue;
            };
            if best.is_none_or(|(end, _)| found.0 < end) {
                best = Some(found);
            }
            break;
        }
    }
    best
}

/// Split a model reply into the answer and its cited sources.
///
/// Everything before the first `SOURCES:` (or `SOURCE:`) marker is the
/// answer. Without a marker the whole reply is the answer and no sources are
/// reported.
#[must_use]
pub fn parse_answer(reply: &str) -> AnswerResult {
    let Some((answer_end, sources_start)) = find_marker(reply) else {
        return AnswerResult {
            answer_text: reply.trim().to_owned(),
            source_urls: Vec::new(),
        };
    };

    let mut source_urls: Vec<String> = Vec::new();
    for token in reply[sources_start..].split(|c: char| c == ',' || c.is_whitespace()) {
        let token = token.trim_matches(|c: char| {
            matches!(c, '-' | '*' | '•' | '[' | ']' | '(' | ')' | '<' | '>' | '"' | '\'' | '.' | ';')
        });
        if token.is_empty()
            || token.eq_ignore_ascii_case("none")
            || token.eq_ignore_ascii_case("n/a")
        {
            continue;
        }
        if !source_urls.iter().any(|s| s == token) {
            source_urls.push(token.to_owned());
        }
    }

    AnswerResult {
        answer_text: reply[..answer_end].trim().to_owned(),
        source_urls,
    }
}

#[cfg(test)]
mod tests {
    use newsrag_llm::mock::MockProvider;
    use newsrag_llm::provider::Role;
    use newsrag_memory::IndexEntry;

    use super::*;

    async fn index_for(provider: &MockProvider, passages: &[(&str, &str)]) -> VectorIndex {
        let mut entries = Vec::new();
        for (text, url) in passages {
            entries.push(IndexEntry {
                vector: provider.embed(text).await.unwrap(),
                chunk_text: (*text).to_owned(),
                source_url: (*url).to_owned(),
            });
        }
        VectorIndex::build(entries).unwrap()
    }

    #[test]
    fn parse_answer_with_sources() {
        let result = parse_answer("Rates went up.\nSOURCES: https://a.test/x, https://b.test/y");
        assert_eq!(result.answer_text, "Rates went up.");
        assert_eq!(result.source_urls, vec!["https://a.test/x", "https://b.test/y"]);
    }

    #[test]
    fn parse_answer_case_insensitive_singular_marker() {
        let result = parse_answer("It rained.\nsource: https://w.test/today.");
        assert_eq!(result.answer_text, "It rained.");
        assert_eq!(result.source_urls, vec!["https://w.test/today"]);
    }

    #[test]
    fn parse_answer_without_marker_has_no_sources() {
        let result = parse_answer("  I don't know.  ");
        assert_eq!(result.answer_text, "I don't know.");
        assert!(result.source_urls.is_empty());
    }

    #[test]
    fn parse_answer_list_and_duplicates() {
        let reply = "Answer.\nSources:\n- https://a.test\n- https://a.test\n* [https://b.test]";
        let result = parse_answer(reply);
        assert_eq!(result.source_urls, vec!["https://a.test", "https://b.test"]);
    }

    #[test]
    fn parse_answer_ignores_marker_words_mid_sentence() {
        let reply = "The key resource: oil prices. It is open source: anyone can read it.";
        let result = parse_answer(reply);
        assert_eq!(result.answer_text, reply);
        assert!(result.source_urls.is_empty());

        let result = parse_answer("The resource: oil.\nSOURCES: https://oil.test");
        assert_eq!(result.answer_text, "The resource: oil.");
        assert_eq!(result.source_urls, vec!["https://oil.test"]);
    }

    #[test]
    fn parse_answer_inline_upper_and_emphasised_markers() {
        let result = parse_answer("Rates rose. SOURCES: https://a.test");
        assert_eq!(result.answer_text, "Rates rose.");
        assert_eq!(result.source_urls, vec!["https://a.test"]);

        let result = parse_answer("Rates rose.\n**Sources:** https://a.test");
        assert_eq!(result.answer_text, "Rates rose.");
        assert_eq!(result.source_urls, vec!["https://a.test"]);
    }

    #[test]
    fn parse_answer_none_sources() {
        let result = parse_answer("I don't know.\nSOURCES: none");
        assert_eq!(result.answer_text, "I don't know.");
        assert!(result.source_urls.is_empty());
    }

    #[test]
    fn parse_answer_non_ascii_before_marker() {
        let result = parse_answer("Zürich café prices rose.\nSOURCES: https://z.test");
        assert_eq!(result.answer_text, "Zürich café prices rose.");
        assert_eq!(result.source_urls, vec!["https://z.test"]);
    }

    #[test]
    fn prompt_contains_extracts_and_question() {
        let entry = IndexEntry {
            vector: vec![1.0],
            chunk_text: "The bank raised rates.".into(),
            source_url: "https://a.test".into(),
        };
        let neighbors = vec![Neighbor {
            entry: &entry,
            distance: 0.0,
        }];
        let messages = build_prompt("What happened?", &neighbors);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.contains("SOURCES:"));
        assert!(messages[1].content.starts_with("QUESTION: What happened?"));
        assert!(messages[1].content.contains("Content: The bank raised rates.\nSource: https://a.test"));
    }

    #[tokio::test]
    async fn answer_uses_closest_passages() {
        let provider = MockProvider::with_responses(vec![
            "The central bank raised rates.\nSOURCES: https://a.test".into(),
        ]);
        let index = index_for(
            &provider,
            &[
                ("central bank raised interest rates", "https://a.test"),
                ("football team won the cup final", "https://b.test"),
            ],
        )
        .await;

        let qa = RetrievalQa::new(&provider, 1);
        let result = qa.answer(&index, "What did the central bank do with rates?").await.unwrap();

        assert_eq!(result.answer_text, "The central bank raised rates.");
        assert_eq!(result.source_urls, vec!["https://a.test"]);

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        let prompt = &requests[0][1].content;
        assert!(prompt.contains("central bank raised interest rates"));
        assert!(!prompt.contains("football"));
    }

    #[tokio::test]
    async fn blank_question_rejected_without_remote_calls() {
        let provider = MockProvider::default();
        let index = VectorIndex::default();
        let result = RetrievalQa::new(&provider, 4).answer(&index, "   ").await;
        assert!(matches!(result, Err(QaError::EmptyQuestion)));
        assert_eq!(provider.embed_calls(), 0);
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn chat_failure_surfaces() {
        let provider = MockProvider::failing_chat();
        let index = index_for(&provider, &[("text", "https://a.test")]).await;
        let result = RetrievalQa::new(&provider, 4).answer(&index, "question?").await;
        assert!(matches!(result, Err(QaError::Llm(_))));
    }
}
