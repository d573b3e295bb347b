use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use super::super::{
    DEFAULT_MAX_BODY_BYTES, DEFAULT_MAX_URLS, DocumentError, DocumentLoader, FetchError,
    SourceDocument,
};

/// Elements whose text makes up the readable body of an article.
const CONTENT_SELECTOR: &str = "h1, h2, h3, h4, h5, h6, p, li, blockquote, pre";

fn default_timeout() -> u64 {
    30
}

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

fn default_max_urls() -> usize {
    DEFAULT_MAX_URLS
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoaderConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    #[serde(default = "default_max_urls")]
    pub max_urls: usize,
    /// Permit loopback, private and link-local hosts.
    #[serde(default)]
    pub allow_private_hosts: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            max_body_bytes: default_max_body_bytes(),
            max_urls: default_max_urls(),
            allow_private_hosts: false,
        }
    }
}

/// Fetches article pages and extracts their readable text with `scrape-core`.
#[derive(Debug, Clone)]
pub struct WebLoader {
    client: reqwest::Client,
    max_body_bytes: usize,
    max_urls: usize,
    allow_private_hosts: bool,
}

impl WebLoader {
    #[must_use]
    pub fn new(config: &LoaderConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(concat!("newsrag/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .unwrap_or_default();

        Self {
            client,
            max_body_bytes: config.max_body_bytes,
            max_urls: config.max_urls,
            allow_private_hosts: config.allow_private_hosts,
        }
    }

    async fn load_urls(&self, urls: &[String]) -> Result<Vec<SourceDocument>, DocumentError> {
        let targets: Vec<&str> = urls
            .iter()
            .map(|u| u.trim())
            .filter(|u| !u.is_empty())
            .collect();

        if targets.len() > self.max_urls {
            return Err(DocumentError::TooManyUrls {
                given: targets.len(),
                max: self.max_urls,
            });
        }

        let mut documents = Vec::with_capacity(targets.len());
        for url in targets {
            match self.fetch_document(url).await {
                Ok(doc) => {
                    tracing::debug!(url, chars = doc.raw_text.len(), "fetched article");
                    documents.push(doc);
                }
                Err(e) => {
                    tracing::warn!(url, "failed to load article: {e}");
                    documents.push(SourceDocument::failed(url, e.to_string()));
                }
            }
        }
        Ok(documents)
    }

    async fn fetch_document(&self, url: &str) -> Result<SourceDocument, FetchError> {
        validate_url(url, self.allow_private_hosts)?;

        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status().as_u16()));
        }

        if let Some(len) = resp.content_length()
            && usize::try_from(len).map_or(true, |len| len > self.max_body_bytes)
        {
            return Err(FetchError::TooLarge {
                size: usize::try_from(len).unwrap_or(usize::MAX),
                max: self.max_body_bytes,
            });
        }

        let is_plain_text = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("text/plain"));

        let bytes = resp.bytes().await?;
        if bytes.len() > self.max_body_bytes {
            return Err(FetchError::TooLarge {
                size: bytes.len(),
                max: self.max_body_bytes,
            });
        }
        let body = String::from_utf8_lossy(&bytes).into_owned();

        let (title, text) = if is_plain_text {
            (None, body.trim().to_owned())
        } else {
            tokio::task::spawn_blocking(move || extract_text(&body))
                .await
                .map_err(|e| FetchError::Parse(e.to_string()))??
        };

        if text.is_empty() {
            return Err(FetchError::NoText);
        }
        Ok(SourceDocument::fetched(url, title, text))
    }
}

impl DocumentLoader for WebLoader {
    fn load<'a>(
        &'a self,
        urls: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<Vec<SourceDocument>, DocumentError>> + Send + 'a>>
    {
        Box::pin(self.load_urls(urls))
    }
}

fn validate_url(raw: &str, allow_private_hosts: bool) -> Result<(), FetchError> {
    let parsed = Url::parse(raw).map_err(|_| FetchError::InvalidUrl(raw.to_owned()))?;

    if parsed.scheme() != "https" && parsed.scheme() != "http" {
        return Err(FetchError::Blocked(format!(
            "scheme not allowed: {}",
            parsed.scheme()
        )));
    }

    let Some(host) = parsed.host() else {
        return Err(FetchError::InvalidUrl(raw.to_owned()));
    };

    if !allow_private_hosts && is_private_host(&host) {
        return Err(FetchError::Blocked(format!(
            "private/local host: {}",
            parsed.host_str().unwrap_or("")
        )));
    }

    Ok(())
}

fn is_private_host(host: &url::Host<&str>) -> bool {
    match host {
        url::Host::Domain(d) => *d == "localhost",
        url::Host::Ipv4(v4) => is_private_v4(*v4),
        url::Host::Ipv6(v6) => {
            if v6.is_loopback() || v6.is_unspecified() {
                return true;
            }
            let seg = v6.segments();
            // fe80::/10 link-local, fc00::/7 unique local
            if seg[0] & 0xffc0 == 0xfe80 || seg[0] & 0xfe00 == 0xfc00 {
                return true;
            }
            v6.to_ipv4_mapped().is_some_and(is_private_v4)
        }
    }
}

fn is_private_v4(v4: std::net::Ipv4Addr) -> bool {
    v4.is_loopback()
        || v4.is_private()
        || v4.is_link_local()
        || v4.is_unspecified()
        || v4.is_broadcast()
}

/// Returns the page title and the article text, blocks separated by blank lines.
fn extract_text(html: &str) -> Result<(Option<String>, String), FetchError> {
    let soup = scrape_core::Soup::parse(html);

    let title = soup
        .find_all("title")
        .map_err(|e| FetchError::Parse(e.to_string()))?
        .into_iter()
        .map(|t| t.text().trim().to_owned())
        .find(|t| !t.is_empty());

    let mut blocks = Vec::new();
    for tag in soup
        .find_all(CONTENT_SELECTOR)
        .map_err(|e| FetchError::Parse(e.to_string()))?
    {
        // an enclosing block already carries this element's text
        let nested = tag
            .closest(CONTENT_SELECTOR)
            .map_err(|e| FetchError::Parse(e.to_string()))?
            .is_some();
        if nested {
            continue;
        }
        let text = tag.text().trim().to_owned();
        if !text.is_empty() {
            blocks.push(text);
        }
    }

    if !blocks.is_empty() {
        return Ok((title, blocks.join("\n\n")));
    }

    let body = soup
        .find_all("body")
        .map_err(|e| FetchError::Parse(e.to_string()))?
        .into_iter()
        .map(|t| t.text().trim().to_owned())
        .next()
        .unwrap_or_default();

    Ok((title, body))
}
