use hourei_core::{ReferenceKind, Span, meta};
use tracing::trace;

use super::{Collector, Scan, guards};
use crate::candidate::{Candidate, confidence, priority};

/// Registry abbreviations (`民訴第百条`), expanded to the full title.
pub struct AbbreviationCollector;

impl Collector for AbbreviationCollector {
    fn name(&self) -> &'static str {
        "abbreviation"
    }

    fn collect(&self, scan: &Scan<'_>) -> Vec<Candidate> {
        let text = scan.text;
        let mut out = Vec::new();
        for m in scan.registry.expand_abbreviations(text) {
            if guards::preceded_by_amendment_clause(text, m.span.start) {
                continue;
            }
            let mut span = m.span;
            let mut article = m.article.clone();
            if let Some(a) = article.as_mut().filter(|a| a.has_branches()) {
                if m.paragraph.is_none()
                    && m.item.is_none()
                    && guards::branch_is_word_fragment(text, span.end)
                {
                    if let Some(cut) = text[span.start..span.end].rfind('の') {
                        a.branches.pop();
                        span = Span::new(span.start, span.start + cut);
                    }
                }
            }

            let (prio, conf) = if article.is_some() {
                (priority::EXTERNAL, confidence::EXTERNAL)
            } else {
                (priority::LAW_MENTION, confidence::LAW_MENTION)
            };
            let Some(candidate) = Candidate::new(ReferenceKind::External, text, span, prio, conf)
            else {
                continue;
            };
            let mut candidate = candidate
                .with_law(Some(m.entry.full_name.clone()), m.entry.law_id())
                .with_paragraph(m.paragraph.map(hourei_core::numeral::paragraph_label))
                .with_item(m.item.map(hourei_core::numeral::item_label))
                .with_meta(meta::EXPANDED_FROM, m.key.clone())
                .with_meta(meta::LAW_KIND, m.entry.category.as_str());
            if let Some(a) = article {
                candidate = candidate.with_article(a.to_string());
            }
            trace!(key = %m.key, law = %m.entry.full_name, "expanded abbreviation");
            out.push(candidate);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::testing::run;
    use pretty_assertions::assert_eq;

    #[test]
    fn expands_with_article() {
        let found = run(&AbbreviationCollector, "民訴第百条", None);
        assert_eq!(found.len(), 1);
        let r = &found[0].reference;
        assert_eq!(r.kind, ReferenceKind::External);
        assert_eq!(r.target_law_name.as_deref(), Some("民事訴訟法"));
        assert_eq!(r.target_law_id.as_deref(), Some("408AC0000000109"));
        assert_eq!(r.target_article.as_deref(), Some("第百条"));
        assert_eq!(r.meta(meta::EXPANDED_FROM), Some("民訴"));
        assert_eq!(found[0].priority, 10);
    }

    #[test]
    fn bare_abbreviation_is_a_law_mention() {
        let found = run(&AbbreviationCollector, "独禁法の規定に違反する", None);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].target_article(), None);
        assert_eq!(found[0].reference.confidence, 0.75);
    }

    #[test]
    fn word_fragment_branch_is_dropped() {
        let found = run(&AbbreviationCollector, "労基法第三十二条の一部", None);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].target_article(), Some("第三十二条"));
        assert_eq!(found[0].reference.source_text, "労基法第三十二条");
    }
}
