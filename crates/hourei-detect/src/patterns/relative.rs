//! Positional citations: 前条, 次条, 同条, 本条, 前項, 次項, 同項, 前号,
//! and the counted forms 前二条 and 前各項.
//!
//! Each marker resolves against the current position only. A chain such
//! as 前項の前項 is not followed: every marker is resolved on its own.

use std::sync::LazyLock;

use hourei_core::numeral::{item_label, paragraph_label};
use hourei_core::{ReferenceKind, Span, kanji_to_arabic, meta};
use regex::{Captures, Regex};

use super::{Collector, Scan, guards, provision};
use crate::candidate::{Candidate, confidence, priority};
use crate::context::{ContextTracker, RelativeUnit, Resolution};

static RELATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "(?P<dir>前|次|同|本)(?P<each>各)?(?P<n>[一二三四五六七八九十]+)?(?P<unit>条|項|号){}",
        provision::tail("t")
    ))
    .expect("relative pattern is valid")
});

/// Direction of a marker: 前 back, 次 forward, 同/本 the same unit.
fn direction(marker: &str) -> i64 {
    match marker {
        "前" => -1,
        "次" => 1,
        _ => 0,
    }
}

/// Resolve a single-step marker such as 前条 or 同項 for collectors that
/// carry one as a prefix. Returns (article, paragraph, resolved).
pub(crate) fn resolve_marker(
    context: &ContextTracker,
    marker: &str,
) -> (Option<String>, Option<String>, bool) {
    let mut chars = marker.chars();
    let dir = chars.next().map(|c| direction(&c.to_string())).unwrap_or(0);
    let unit = chars.next_back().and_then(RelativeUnit::from_marker);
    match unit.and_then(|u| context.resolve(u, dir)) {
        Some(Resolution::Article(a)) => (Some(a.to_string()), None, true),
        Some(Resolution::Paragraph { article, paragraph }) => {
            (Some(article.to_string()), Some(paragraph_label(paragraph)), true)
        }
        _ => (Some(marker.to_string()), None, false),
    }
}

pub struct RelativeCollector;

struct Marker<'t> {
    text: &'t str,
    span: Span,
    unit: RelativeUnit,
    offset: i64,
    count: Option<i64>,
    each: bool,
    /// Paragraph and item after the marker (`前条第二項`).
    paragraph: Option<u32>,
    item: Option<u32>,
}

impl RelativeCollector {
    fn parse<'t>(text: &'t str, caps: &Captures<'t>) -> Option<Marker<'t>> {
        let whole = caps.get(0)?;
        let dir = caps.name("dir")?.as_str();
        let unit_match = caps.name("unit")?;
        let unit = RelativeUnit::from_marker(unit_match.as_str().chars().next()?)?;
        if guards::relative_is_word_fragment(text, unit_match.end()) {
            return None;
        }
        let count = match caps.name("n") {
            Some(n) => Some(i64::from(kanji_to_arabic(n.as_str())).max(1)),
            None => None,
        };
        let tail = provision::read(text, caps, "t")?;
        // A paragraph only follows an article marker, an item only an
        // article or paragraph marker.
        let (paragraph, item, end) = match unit {
            RelativeUnit::Article => (tail.paragraph, tail.item, tail.end),
            RelativeUnit::Paragraph if tail.paragraph.is_none() => (None, tail.item, tail.end),
            _ => (None, None, None),
        };
        let end = end.unwrap_or(unit_match.end());

        Some(Marker {
            text: &text[whole.start()..unit_match.end()],
            span: Span::new(whole.start(), end),
            unit,
            offset: direction(dir),
            count,
            each: caps.name("each").is_some(),
            paragraph,
            item,
        })
    }

    fn emit(&self, scan: &Scan<'_>, m: &Marker<'_>, out: &mut Vec<Candidate>) {
        let ctx = scan.context;
        let resolution = match (m.unit, m.count, m.each) {
            (RelativeUnit::Paragraph, None, true) if m.offset < 0 => ctx.preceding_paragraphs(),
            (_, _, true) => None,
            (unit, Some(n), false) if m.offset < 0 => ctx.resolve_span(unit, -n, -1),
            (unit, Some(n), false) if m.offset > 0 => ctx.resolve_span(unit, 1, n),
            (_, Some(_), false) => None,
            (unit, None, false) => ctx.resolve(unit, m.offset),
        };

        let Some(resolution) = resolution else {
            self.unresolved(scan, m, out);
            return;
        };

        let base = |c: Candidate| {
            c.with_meta(meta::RELATIVE_MARKER, m.text)
                .with_meta(meta::RELATIVE_OFFSET, m.offset.to_string())
                .with_meta(meta::RESOLVED, "true")
        };
        let new = || {
            Candidate::new(
                ReferenceKind::Relative,
                scan.text,
                m.span,
                priority::RELATIVE,
                confidence::RELATIVE_RESOLVED,
            )
            .map(base)
        };

        match resolution {
            Resolution::Article(article) => {
                if let Some(c) = new() {
                    out.push(
                        c.with_article(article.to_string())
                            .with_paragraph(m.paragraph.map(paragraph_label))
                            .with_item(m.item.map(item_label)),
                    );
                }
            }
            Resolution::Paragraph { article, paragraph } => {
                if let Some(c) = new() {
                    out.push(
                        c.with_article(article.to_string())
                            .with_paragraph(Some(paragraph_label(paragraph)))
                            .with_item(m.item.map(item_label)),
                    );
                }
            }
            Resolution::Articles(articles) => {
                let (Some(first), Some(last)) = (articles.first(), articles.last()) else {
                    return;
                };
                let (first, last) = (first.to_string(), last.to_string());
                for article in &articles {
                    if let Some(c) = new() {
                        out.push(
                            c.with_article(article.to_string())
                                .as_range_member(&first, &last, "条"),
                        );
                    }
                }
            }
            Resolution::Paragraphs { article, paragraphs } => {
                let (Some(first), Some(last)) = (paragraphs.first(), paragraphs.last()) else {
                    return;
                };
                let (first, last) = (paragraph_label(*first), paragraph_label(*last));
                for p in &paragraphs {
                    if let Some(c) = new() {
                        out.push(
                            c.with_article(article.to_string())
                                .with_paragraph(Some(paragraph_label(*p)))
                                .as_range_member(&first, &last, "項"),
                        );
                    }
                }
            }
        }
    }

    /// No usable position: keep the citation with the marker as target.
    fn unresolved(&self, scan: &Scan<'_>, m: &Marker<'_>, out: &mut Vec<Candidate>) {
        let Some(c) = Candidate::new(
            ReferenceKind::Relative,
            scan.text,
            m.span,
            priority::RELATIVE_UNRESOLVED,
            confidence::RELATIVE_UNRESOLVED,
        ) else {
            return;
        };
        let current = scan.context.current_article().map(ToString::to_string);
        let c = match (m.unit, current) {
            (RelativeUnit::Article, _) | (_, None) => c
                .with_article(m.text)
                .with_paragraph(m.paragraph.map(paragraph_label))
                .with_item(m.item.map(item_label)),
            (RelativeUnit::Paragraph, Some(article)) => c
                .with_article(article)
                .with_paragraph(Some(m.text.to_string()))
                .with_item(m.item.map(item_label)),
            (RelativeUnit::Item, Some(article)) => c
                .with_article(article)
                .with_paragraph(scan.context.current_paragraph().map(paragraph_label))
                .with_item(Some(m.text.to_string())),
        };
        out.push(
            c.with_meta(meta::RELATIVE_MARKER, m.text)
                .with_meta(meta::RELATIVE_OFFSET, m.offset.to_string())
                .with_meta(meta::RESOLVED, "false"),
        );
    }
}

impl Collector for RelativeCollector {
    fn name(&self) -> &'static str {
        "relative"
    }

    fn collect(&self, scan: &Scan<'_>) -> Vec<Candidate> {
        let mut out = Vec::new();
        for caps in RELATIVE.captures_iter(scan.text) {
            if let Some(marker) = Self::parse(scan.text, &caps) {
                self.emit(scan, &marker, &mut out);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::testing::{articles, run};
    use pretty_assertions::assert_eq;

    #[test]
    fn previous_and_next_article() {
        let text = "前条の規定にかかわらず、次条に定める場合においては、この限りでない。";
        let found = run(&RelativeCollector, text, Some("第五条"));
        assert_eq!(articles(&found), vec!["第四条", "第六条"]);
        assert!(found.iter().all(|c| c.reference.confidence == 0.95));
        assert_eq!(found[0].reference.source_text, "前条");
        assert_eq!(found[0].reference.meta(meta::RELATIVE_MARKER), Some("前条"));
    }

    #[test]
    fn unresolved_without_context() {
        let found = run(&RelativeCollector, "前条の規定", None);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].target_article(), Some("前条"));
        assert!(found[0].reference.confidence <= 0.7);
        assert_eq!(found[0].priority, 3);
    }

    #[test]
    fn same_article_without_context_is_not_defaulted() {
        let found = run(&RelativeCollector, "同条の規定", None);
        assert_eq!(found[0].target_article(), Some("同条"));
    }

    #[test]
    fn first_article_has_no_previous() {
        let found = run(&RelativeCollector, "前条", Some("第一条"));
        assert_eq!(found[0].target_article(), Some("前条"));
        assert_eq!(found[0].reference.meta(meta::RESOLVED), Some("false"));
    }

    #[test]
    fn counted_marker_is_a_range() {
        let found = run(&RelativeCollector, "前二条の規定", Some("第十条"));
        assert_eq!(articles(&found), vec!["第八条", "第九条"]);
        assert!(found.iter().all(|c| c.is_range_member));
        assert_eq!(found[0].reference.meta(meta::RANGE_END), Some("第九条"));
    }

    #[test]
    fn article_marker_with_paragraph() {
        let found = run(&RelativeCollector, "前条第二項の規定", Some("第五条"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].target_article(), Some("第四条"));
        assert_eq!(found[0].reference.target_paragraph.as_deref(), Some("第二項"));
        assert_eq!(found[0].reference.source_text, "前条第二項");
    }

    #[test]
    fn paragraph_markers() {
        let found = run(&RelativeCollector, "前項の場合", Some("第五条第三項"));
        assert_eq!(found[0].target_article(), Some("第五条"));
        assert_eq!(found[0].reference.target_paragraph.as_deref(), Some("第二項"));

        let found = run(&RelativeCollector, "前各項の規定", Some("第五条第三項"));
        let paragraphs: Vec<_> = found
            .iter()
            .filter_map(|c| c.reference.target_paragraph.as_deref())
            .collect();
        assert_eq!(paragraphs, vec!["第一項", "第二項"]);

        // Article-level context cannot place 前項.
        let found = run(&RelativeCollector, "前項の場合", Some("第五条"));
        assert_eq!(found[0].target_article(), Some("第五条"));
        assert_eq!(found[0].reference.target_paragraph.as_deref(), Some("前項"));
        assert_eq!(found[0].reference.meta(meta::RESOLVED), Some("false"));
    }

    #[test]
    fn item_markers_stay_unresolved() {
        let found = run(&RelativeCollector, "前号に掲げる者", Some("第五条第一項"));
        assert_eq!(found[0].target_article(), Some("第五条"));
        assert_eq!(found[0].reference.target_paragraph.as_deref(), Some("第一項"));
        assert_eq!(found[0].reference.target_item.as_deref(), Some("前号"));
    }

    #[test]
    fn chained_markers_resolve_independently() {
        let found = run(&RelativeCollector, "前項の前項", Some("第五条第三項"));
        let paragraphs: Vec<_> = found
            .iter()
            .filter_map(|c| c.reference.target_paragraph.as_deref())
            .collect();
        assert_eq!(paragraphs, vec!["第二項", "第二項"]);
    }

    #[test]
    fn words_are_not_markers() {
        assert!(run(&RelativeCollector, "同条約の締約国", Some("第五条")).is_empty());
        assert!(run(&RelativeCollector, "本条例の施行", Some("第五条")).is_empty());
    }

    #[test]
    fn marker_resolution_for_prefixes() {
        let mut ctx = ContextTracker::new();
        ctx.advance(hourei_core::ProvisionId::parse("第五条第二項").unwrap());
        assert_eq!(
            resolve_marker(&ctx, "前条"),
            (Some("第四条".into()), None, true)
        );
        assert_eq!(
            resolve_marker(&ctx, "同項"),
            (Some("第五条".into()), Some("第二項".into()), true)
        );
        assert_eq!(
            resolve_marker(&ContextTracker::new(), "前項"),
            (Some("前項".into()), None, false)
        );
    }
}
