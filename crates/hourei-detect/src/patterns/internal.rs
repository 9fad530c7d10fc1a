use std::sync::LazyLock;

use hourei_core::{ReferenceKind, Span};
use regex::Regex;

use super::{Collector, Scan, guards, provision};
use crate::candidate::{Candidate, confidence, priority};

static ARTICLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&provision::article("a")).expect("article pattern is valid"));

/// Catch-all for bare `第N条`. Anything more specific covering the same
/// text outranks it.
pub struct InternalCollector;

impl Collector for InternalCollector {
    fn name(&self) -> &'static str {
        "internal"
    }

    fn collect(&self, scan: &Scan<'_>) -> Vec<Candidate> {
        let text = scan.text;
        ARTICLE
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                if guards::preceded_by_qualifier(text, whole.start()) {
                    return None;
                }
                let p = provision::read(text, &caps, "a")?;
                let article = p.article_label()?;
                Candidate::new(
                    ReferenceKind::Internal,
                    text,
                    Span::new(whole.start(), p.end?),
                    priority::INTERNAL,
                    confidence::INTERNAL,
                )
                .map(|c| c.with_article(article))
            })
            .collect()
    }
}
