use std::fmt::Write as _;

use newsrag_core::{AnswerResult, BuildOutcome};

pub(crate) fn build_outcome(outcome: &BuildOutcome) -> String {
    let report = match outcome {
        BuildOutcome::Skipped => return "No URLs given, nothing to process.".into(),
        BuildOutcome::Built(report) => report,
    };

    let mut out = format!(
        "Processing complete: {} article(s), {} chunk(s) indexed at {}",
        report.documents.saturating_sub(report.failed.len()),
        report.chunks,
        report.path.display()
    );
    for failed in &report.failed {
        let _ = write!(out, "\n  skipped {}: {}", failed.url, failed.reason);
    }
    out
}

pub(crate) fn answer(result: &AnswerResult) -> String {
    let mut out = format!("Answer:\n{}", result.answer_text);
    if !result.source_urls.is_empty() {
        out.push_str("\n\nSources:");
        for url in &result.source_urls {
            let _ = write!(out, "\n  {url}");
        }
    }
    out
}
