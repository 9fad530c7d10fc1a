//! Article + paragraph (+ item) citations, the 同条 form, and paragraphs
//! or items cited without an article.

use std::sync::LazyLock;

use hourei_core::{ReferenceKind, Span, meta};
use regex::Regex;

use super::{Collector, Scan, guards, provision};
use crate::candidate::{Candidate, confidence, priority};

static FULL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&provision::provision("a")).expect("composite pattern is valid")
});

static SAME_ARTICLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("同条{}", provision::tail("a"))).expect("same-article pattern is valid")
});

static SUBDIVISION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "{}(?:{})?|{}",
        provision::paragraph("a"),
        provision::item("a"),
        provision::item("b")
    ))
    .expect("subdivision pattern is valid")
});

pub struct CompositeCollector;

impl CompositeCollector {
    fn explicit(&self, scan: &Scan<'_>, out: &mut Vec<Candidate>) {
        let text = scan.text;
        for caps in FULL.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let Some(p) = provision::read(text, &caps, "a") else {
                continue;
            };
            if !p.has_subdivision() || guards::preceded_by_qualifier(text, whole.start()) {
                continue;
            }
            let Some(end) = p.end.filter(|e| !guards::starts_range(text, *e)) else {
                continue;
            };
            let Some(article) = p.article_label() else { continue };
            if let Some(c) = Candidate::new(
                ReferenceKind::Internal,
                text,
                Span::new(whole.start(), end),
                priority::COMPOSITE,
                confidence::COMPOSITE,
            ) {
                out.push(
                    c.with_article(article)
                        .with_paragraph(p.paragraph_label())
                        .with_item(p.item_label()),
                );
            }
        }
    }

    /// 同条第N項 resolves through the current article; without one the
    /// marker itself is the target.
    fn same_article(&self, scan: &Scan<'_>, out: &mut Vec<Candidate>) {
        let text = scan.text;
        for caps in SAME_ARTICLE.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let Some(p) = provision::read(text, &caps, "a") else {
                continue;
            };
            let Some(end) = p.end.filter(|_| p.has_subdivision()) else {
                continue;
            };
            let resolved = scan.context.current_article().map(ToString::to_string);
            let conf = if resolved.is_some() {
                confidence::COMPOSITE
            } else {
                confidence::RELATIVE_UNRESOLVED
            };
            let Some(c) = Candidate::new(
                ReferenceKind::Internal,
                text,
                Span::new(whole.start(), end),
                priority::COMPOSITE,
                conf,
            ) else {
                continue;
            };
            let c = c
                .with_article(resolved.clone().unwrap_or_else(|| "同条".to_string()))
                .with_paragraph(p.paragraph_label())
                .with_item(p.item_label())
                .with_meta(meta::RELATIVE_MARKER, "同条")
                .with_meta(meta::RESOLVED, resolved.is_some().to_string());
            out.push(c);
        }
    }

    /// `第二項`, `第三号` on their own refer into the current article.
    fn subdivision_only(&self, scan: &Scan<'_>, out: &mut Vec<Candidate>) {
        let text = scan.text;
        let current = scan.context.current_article().map(ToString::to_string);
        for caps in SUBDIVISION.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            // After 条/項/法律 the number belongs to a longer citation.
            if guards::preceded_by_name_char(text, whole.start())
                || guards::starts_range(text, whole.end())
                || guards::closes_range(text, whole.start())
            {
                continue;
            }
            let (Some(a), Some(b)) = (provision::read(text, &caps, "a"), provision::read(text, &caps, "b"))
            else {
                continue;
            };
            let conf = if current.is_some() {
                confidence::INTERNAL
            } else {
                confidence::INTERNAL_NO_ARTICLE
            };
            let Some(mut c) = Candidate::new(
                ReferenceKind::Internal,
                text,
                Span::new(whole.start(), whole.end()),
                priority::INTERNAL,
                conf,
            ) else {
                continue;
            };
            if let Some(article) = &current {
                c = c.with_article(article.clone());
            }
            out.push(
                c.with_paragraph(a.paragraph_label())
                    .with_item(a.item_label().or(b.item_label())),
            );
        }
    }
}

impl Collector for CompositeCollector {
    fn name(&self) -> &'static str {
        "composite"
    }

    fn collect(&self, scan: &Scan<'_>) -> Vec<Candidate> {
        let mut out = Vec::new();
        self.explicit(scan, &mut out);
        self.same_article(scan, &mut out);
        self.subdivision_only(scan, &mut out);
        out
    }
}
