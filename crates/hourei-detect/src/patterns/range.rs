//! `第X条から第Y条まで` and the paragraph and item forms.

use std::sync::LazyLock;

use hourei_core::numeral::{item_label, paragraph_label};
use hourei_core::{ArticleNumber, ReferenceKind, Span, meta};
use regex::Regex;
use tracing::trace;

use super::{Collector, Scan, guards, provision};
use crate::candidate::{Candidate, confidence, priority};

static ARTICLE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "{}から(?:同法)?{}まで",
        provision::article("a"),
        provision::article("b")
    ))
    .expect("article range pattern is valid")
});

static PARAGRAPH_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "(?:{})?{}から{}まで",
        provision::article("a"),
        provision::paragraph("a"),
        provision::paragraph("b")
    ))
    .expect("paragraph range pattern is valid")
});

static ITEM_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "(?:{})?(?:{})?{}から{}まで",
        provision::article("a"),
        provision::paragraph("a"),
        provision::item("a"),
        provision::item("b")
    ))
    .expect("item range pattern is valid")
});

/// Every article from `from` to `to` inclusive, in document order.
///
/// Intermediate branch articles cannot be known from the text and are not
/// invented; a branch endpoint is listed after its main article. Returns
/// `None` for reversed ranges and ranges larger than `max`.
pub(crate) fn expand_articles(
    from: &ArticleNumber,
    to: &ArticleNumber,
    max: usize,
) -> Option<Vec<ArticleNumber>> {
    if from > to {
        return None;
    }
    if from.main == to.main {
        if from.branches.len() > 1 || to.branches.len() > 1 {
            let mut members = vec![from.clone()];
            if to != from {
                members.push(to.clone());
            }
            return Some(members);
        }
        let first = from.branches.first().copied().unwrap_or(1);
        let last = to.branches.first().copied().unwrap_or(1);
        let count = usize::try_from(last - first + 1).ok()?;
        if count > max {
            return None;
        }
        return Some(
            (first..=last)
                .map(|b| {
                    if b == 1 && !from.has_branches() {
                        ArticleNumber::new(from.main)
                    } else {
                        ArticleNumber::with_branches(from.main, vec![b])
                    }
                })
                .collect(),
        );
    }

    let count = usize::try_from(to.main - from.main).ok()? + 1 + usize::from(to.has_branches());
    if count > max {
        return None;
    }
    let mut members = Vec::with_capacity(count);
    members.push(from.clone());
    members.extend((from.main + 1..=to.main).map(ArticleNumber::new));
    if to.has_branches() {
        members.push(to.clone());
    }
    Some(members)
}

/// Numbers `from..=to`, or `None` if reversed or larger than `max`.
fn expand_numbers(from: u32, to: u32, max: usize) -> Option<Vec<u32>> {
    if from > to || usize::try_from(to - from + 1).ok()? > max {
        return None;
    }
    Some((from..=to).collect())
}

pub struct RangeCollector;

impl RangeCollector {
    fn articles(&self, scan: &Scan<'_>, out: &mut Vec<Candidate>) {
        let text = scan.text;
        for caps in ARTICLE_RANGE.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            if guards::followed_by_deletion(text, whole.end()) {
                continue;
            }
            let (Some(a), Some(b)) = (
                provision::read(text, &caps, "a").and_then(|p| p.article),
                provision::read(text, &caps, "b").and_then(|p| p.article),
            ) else {
                continue;
            };
            let Some(members) = expand_articles(&a, &b, scan.config.max_range_size) else {
                trace!(range = whole.as_str(), "dropped reversed or oversized range");
                continue;
            };

            let prio = if a.has_branches() || b.has_branches() {
                priority::RANGE_BRANCHED
            } else {
                priority::RANGE
            };
            let law = guards::law_name_before(text, whole.start(), scan.registry);
            let applied = guards::application_follows(
                text,
                whole.end(),
                scan.config.application_lookahead_chars,
            );
            let (start_label, end_label) = (a.to_string(), b.to_string());
            let span = Span::new(whole.start(), whole.end());

            for member in members {
                let Some(c) = member_candidate(text, span, prio, applied) else {
                    continue;
                };
                let mut c = c
                    .with_article(member.to_string())
                    .as_range_member(&start_label, &end_label, "条");
                if let Some(law) = &law {
                    c = c.with_law(Some(law.name.clone()), law.law_id.clone());
                }
                out.push(c);
            }
        }
    }

    /// Paragraph and item ranges inherit the stated article, else the
    /// current one.
    fn subdivisions(&self, scan: &Scan<'_>, out: &mut Vec<Candidate>) {
        let text = scan.text;
        let current = scan.context.current_article().map(ToString::to_string);

        for (regex, unit) in [(&*PARAGRAPH_RANGE, '項'), (&*ITEM_RANGE, '号')] {
            for caps in regex.captures_iter(text) {
                let Some(whole) = caps.get(0) else { continue };
                let (Some(head), Some(tail)) =
                    (provision::read(text, &caps, "a"), provision::read(text, &caps, "b"))
                else {
                    continue;
                };
                let (from, to) = match unit {
                    '項' => (head.paragraph, tail.paragraph),
                    _ => (head.item, tail.item),
                };
                let (Some(from), Some(to)) = (from, to) else { continue };
                let Some(numbers) = expand_numbers(from, to, scan.config.max_range_size) else {
                    trace!(range = whole.as_str(), "dropped reversed or oversized range");
                    continue;
                };
                let label = |n: u32| match unit {
                    '項' => paragraph_label(n),
                    _ => item_label(n),
                };
                let article = head.article_label().or_else(|| current.clone());
                let applied = guards::application_follows(
                    text,
                    whole.end(),
                    scan.config.application_lookahead_chars,
                );
                let span = Span::new(whole.start(), whole.end());
                let (start_label, end_label) = (label(from), label(to));

                for n in numbers {
                    let Some(mut c) = member_candidate(text, span, priority::RANGE, applied) else {
                        continue;
                    };
                    if let Some(article) = &article {
                        c = c.with_article(article.clone());
                    }
                    c = match unit {
                        '項' => c.with_paragraph(Some(label(n))),
                        _ => c.with_paragraph(head.paragraph_label()).with_item(Some(label(n))),
                    };
                    out.push(c.as_range_member(&start_label, &end_label, &unit.to_string()));
                }
            }
        }
    }
}

/// One member; ranges applied by 準用 are retagged as application.
fn member_candidate(text: &str, span: Span, prio: u8, applied: bool) -> Option<Candidate> {
    let kind = if applied {
        ReferenceKind::Application
    } else {
        ReferenceKind::Range
    };
    let c = Candidate::new(kind, text, span, prio, confidence::RANGE)?;
    Some(if applied {
        c.with_meta(meta::APPLICATION, "true")
    } else {
        c
    })
}

impl Collector for RangeCollector {
    fn name(&self) -> &'static str {
        "range"
    }

    fn collect(&self, scan: &Scan<'_>) -> Vec<Candidate> {
        let mut out = Vec::new();
        self.articles(scan, &mut out);
        self.subdivisions(scan, &mut out);
        out
    }
}
