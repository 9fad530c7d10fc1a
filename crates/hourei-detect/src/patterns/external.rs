use std::sync::LazyLock;

use hourei_core::{ReferenceKind, Span, meta};
use regex::Regex;
use tracing::trace;

use super::{Collector, Scan, guards, law_type, provision};
use crate::candidate::{Candidate, confidence, priority};

/// A provision directly after a law title.
static PROVISION_AFTER_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{}", provision::provision("p"))).expect("provision pattern is valid")
});

static SAME_LAW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("同法{}", provision::provision("p"))).expect("same-law pattern is valid")
});

/// Registered law titles followed by a provision (`会社法第二条第一項`).
pub struct ExternalCollector;

impl Collector for ExternalCollector {
    fn name(&self) -> &'static str {
        "external"
    }

    fn collect(&self, scan: &Scan<'_>) -> Vec<Candidate> {
        let text = scan.text;
        let mut out = Vec::new();
        for mention in scan.registry.find_laws(text) {
            if guards::preceded_by_amendment_clause(text, mention.span.start) {
                trace!(law = %mention.law.name, "left to the pre-amendment collector");
                continue;
            }
            let rest = &text[mention.span.end..];
            let Some(caps) = PROVISION_AFTER_TITLE.captures(rest) else {
                continue;
            };
            let Some(p) = provision::read(rest, &caps, "p") else {
                continue;
            };
            let (Some(article), Some(end)) = (p.article_label(), p.end) else {
                continue;
            };
            let span = Span::new(mention.span.start, mention.span.end + end);
            let Some(candidate) = Candidate::new(
                ReferenceKind::External,
                text,
                span,
                priority::EXTERNAL,
                confidence::EXTERNAL,
            ) else {
                continue;
            };
            let mut candidate = candidate
                .with_law(Some(mention.law.name.clone()), mention.law.law_id())
                .with_article(article)
                .with_paragraph(p.paragraph_label())
                .with_item(p.item_label())
                .with_meta(meta::LAW_KIND, mention.law.kind.as_str());
            if let Some(number) = &mention.law.law_number {
                candidate = candidate.with_meta(meta::LAW_NUMBER, number.clone());
            }
            out.push(candidate);
        }
        out
    }
}

/// `同法第N条`: the nearest law named earlier in the same text.
///
/// Without one the citation is kept as an unresolved relative reference.
pub struct SameLawCollector;

impl Collector for SameLawCollector {
    fn name(&self) -> &'static str {
        "same_law"
    }

    fn collect(&self, scan: &Scan<'_>) -> Vec<Candidate> {
        let text = scan.text;
        let mut out = Vec::new();
        for caps in SAME_LAW.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let Some(p) = provision::read(text, &caps, "p") else {
                continue;
            };
            let (Some(article), Some(end)) = (p.article_label(), p.end) else {
                continue;
            };
            let span = Span::new(whole.start(), end);

            let candidate = match nearest_law_before(scan, whole.start()) {
                Some((name, law_id)) => Candidate::new(
                    ReferenceKind::External,
                    text,
                    span,
                    priority::SAME_LAW_RESOLVED,
                    confidence::SAME_LAW,
                )
                .map(|c| {
                    c.with_law(Some(name), law_id)
                        .with_meta(meta::RESOLVED_FROM, "同法")
                }),
                None => Candidate::new(
                    ReferenceKind::Relative,
                    text,
                    span,
                    priority::RELATIVE_UNRESOLVED,
                    confidence::RELATIVE_UNRESOLVED,
                )
                .map(|c| {
                    c.with_meta(meta::RELATIVE_MARKER, "同法")
                        .with_meta(meta::RESOLVED, "false")
                }),
            };
            if let Some(c) = candidate {
                out.push(
                    c.with_article(article)
                        .with_paragraph(p.paragraph_label())
                        .with_item(p.item_label()),
                );
            }
        }
        out
    }
}

/// The law whose title ends last before `pos`: registered titles,
/// abbreviations, and unregistered titles that cite a provision.
fn nearest_law_before(scan: &Scan<'_>, pos: usize) -> Option<(String, Option<String>)> {
    let head = &scan.text[..pos];
    let mut best: Option<(usize, String, Option<String>)> = None;
    let mut consider = |end: usize, name: String, id: Option<String>| {
        if best.as_ref().is_none_or(|(e, _, _)| end > *e) {
            best = Some((end, name, id));
        }
    };

    if let Some(m) = scan.registry.find_laws(head).last() {
        consider(m.span.end, m.law.name.clone(), m.law.law_id());
    }
    if let Some(m) = scan.registry.expand_abbreviations(head).last() {
        consider(m.span.end, m.entry.full_name.clone(), m.entry.law_id());
    }
    if let Some((span, title)) = law_type::titled_laws(head).pop() {
        let id = scan.registry.lookup_law(&title).and_then(|law| law.law_id());
        consider(span.end, title, id);
    }
    best.map(|(_, name, id)| (name, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::testing::{articles, run};
    use pretty_assertions::assert_eq;

    #[test]
    fn registered_titles_with_provisions() {
        let text = "商法第五百条の規定により、会社法第二条第一項に定める会社とする。";
        let found = run(&ExternalCollector, text, None);
        assert_eq!(articles(&found), vec!["第五百条", "第二条"]);

        let shouhou = &found[0].reference;
        assert_eq!(shouhou.target_law_name.as_deref(), Some("商法"));
        assert_eq!(shouhou.source_text, "商法第五百条");
        assert_eq!(shouhou.target_law_id.as_deref(), Some("132AC0000000048"));

        let kaisha = &found[1].reference;
        assert_eq!(kaisha.target_law_name.as_deref(), Some("会社法"));
        assert_eq!(kaisha.target_paragraph.as_deref(), Some("第一項"));
        assert_eq!(kaisha.source_text, "会社法第二条第一項");
        assert_eq!(found[1].priority, 10);
    }

    #[test]
    fn bare_titles_are_not_citations() {
        assert!(run(&ExternalCollector, "民法の一部を改正する法律", None).is_empty());
    }

    #[test]
    fn amended_versions_are_skipped() {
        let text = "平成十七年法律第八十七号による改正前の商法第二条";
        assert!(run(&ExternalCollector, text, None).is_empty());
    }

    #[test]
    fn same_law_resolves_to_nearest_title() {
        let text = "民法第九十条及び会社法第二条の規定は、同法第三条の場合に準用する。";
        let found = run(&SameLawCollector, text, None);
        assert_eq!(found.len(), 1);
        let r = &found[0].reference;
        assert_eq!(r.kind, ReferenceKind::External);
        assert_eq!(r.target_law_name.as_deref(), Some("会社法"));
        assert_eq!(r.target_article.as_deref(), Some("第三条"));
        assert_eq!(r.source_text, "同法第三条");
        assert_eq!(r.meta(meta::RESOLVED_FROM), Some("同法"));
    }

    #[test]
    fn same_law_without_antecedent_is_unresolved() {
        let found = run(&SameLawCollector, "同法第三条の規定による。", None);
        assert_eq!(found.len(), 1);
        let r = &found[0].reference;
        assert_eq!(r.kind, ReferenceKind::Relative);
        assert_eq!(r.target_law_name, None);
        assert!(r.confidence <= 0.7);
        assert_eq!(r.meta(meta::RELATIVE_MARKER), Some("同法"));
    }

    #[test]
    fn titles_after_amending_clause() {
        let found = run(&ExternalCollector, "同項中商法第二条の規定", None);
        assert_eq!(articles(&found), vec!["第二条"]);
        assert_eq!(found[0].reference.target_law_name.as_deref(), Some("商法"));
        assert_eq!(found[0].reference.source_text, "商法第二条");

        let found = run(&ExternalCollector, "規定中民法第九十条とあるのは", None);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].reference.target_law_name.as_deref(), Some("民法"));
    }
}
