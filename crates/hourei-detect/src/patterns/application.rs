use std::sync::LazyLock;

use hourei_core::{ReferenceKind, Span, meta};
use regex::Regex;

use super::{Collector, Scan, guards, provision};
use crate::candidate::{Candidate, confidence, priority};

static ARTICLE_PROVISIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("{}の規定", provision::article("a"))).expect("application pattern is valid")
});

/// `第N条の規定は、…準用する`: a single article applied by analogy.
pub struct ApplicationCollector;

impl Collector for ApplicationCollector {
    fn name(&self) -> &'static str {
        "application"
    }

    fn collect(&self, scan: &Scan<'_>) -> Vec<Candidate> {
        let text = scan.text;
        let lookahead = scan.config.application_lookahead_chars;
        ARTICLE_PROVISIONS
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                // Law-qualified articles belong to the external collectors.
                if guards::preceded_by_name_char(text, whole.start())
                    || guards::preceded_by_qualifier(text, whole.start())
                    || !guards::application_follows(text, whole.end(), lookahead)
                {
                    return None;
                }
                let p = provision::read(text, &caps, "a")?;
                let article = p.article_label()?;
                Candidate::new(
                    ReferenceKind::Application,
                    text,
                    Span::new(whole.start(), p.end?),
                    priority::APPLICATION,
                    confidence::APPLICATION,
                )
                .map(|c| c.with_article(article).with_meta(meta::APPLICATION, "true"))
            })
            .collect()
    }
}
