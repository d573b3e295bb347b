pub mod error;
pub mod loader;
pub mod pipeline;
pub mod splitter;
pub mod types;

use std::future::Future;
use std::pin::Pin;

pub use error::{DocumentError, FetchError};
pub use loader::{LoaderConfig, WebLoader};
pub use pipeline::{Ingested, IngestionPipeline};
pub use splitter::{SplitterConfig, TextSplitter};
pub use types::{FetchStatus, SourceDocument, TextChunk};

/// Default maximum response body: 5 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// Default number of URL fields accepted per build.
pub const DEFAULT_MAX_URLS: usize = 3;

pub trait DocumentLoader: Send + Sync {
    /// Load one document per non-blank URL, in input order.
    ///
    /// Per-URL failures are reported through [`FetchStatus::Failed`], not as
    /// an error of the whole call.
    fn load<'a>(
        &'a self,
        urls: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<Vec<SourceDocument>, DocumentError>> + Send + 'a>>;
}
