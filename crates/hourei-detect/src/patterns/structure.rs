//! Structural units (編・章・節・款・目, 別表, 附則) and the finer
//! structures inside a provision: iroha sub-item ranges, chapeaus,
//! exclusions, provisos.

use std::sync::LazyLock;

use hourei_core::{ReferenceKind, Span, meta};
use regex::Regex;

use super::relative::resolve_marker;
use super::{Collector, Scan, guards, provision};
use crate::candidate::{Candidate, confidence, priority};

/// Sub-item letters in iroha order.
const IROHA: &str = "イロハニホヘトチリヌルヲワカヨタレソツネナラムウヰノオクヤマケフコエテアサキユメミシヱヒモセス";

static UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        "第(?P<n>[0-9０-９〇一二三四五六七八九十百]+)(?P<unit>編|章|節|款|目)(?:の[0-9０-９〇一二三四五六七八九十]+)*",
    )
    .expect("structural unit pattern is valid")
});

static APPENDED_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("別表第[0-9０-９〇一二三四五六七八九十百]+(?:の[0-9０-９〇一二三四五六七八九十]+)*")
        .expect("appended table pattern is valid")
});

static SUPPLEMENTARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "附則(?:{}|{})",
        provision::provision("p"),
        provision::paragraph("q")
    ))
    .expect("supplementary provision pattern is valid")
});

static SUB_ITEM_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "(?:{}|{}(?:{})?|{})?(?P<from>[{IROHA}])から(?P<to>[{IROHA}])まで",
        provision::provision("p"),
        provision::paragraph("q"),
        provision::item("q"),
        provision::item("r"),
    ))
    .expect("sub-item range pattern is valid")
});

static CHAPEAU: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "(?:{}|{})?各号列記以外の部分",
        provision::provision("p"),
        provision::paragraph("q")
    ))
    .expect("chapeau pattern is valid")
});

static EXCLUSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("{}(?:の規定)?を除(?:く|き)", provision::provision("p")))
        .expect("exclusion pattern is valid")
});

static CLAUSE_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "(?:{}|(?P<rel>(?:前|次|同|本)(?:条|項)))(?P<part>ただし書|本文|前段|後段)",
        provision::provision("p")
    ))
    .expect("clause part pattern is valid")
});

pub struct StructuralCollector;

impl Collector for StructuralCollector {
    fn name(&self) -> &'static str {
        "structural"
    }

    fn collect(&self, scan: &Scan<'_>) -> Vec<Candidate> {
        let text = scan.text;
        let mut out = Vec::new();

        for caps in UNIT.captures_iter(text) {
            let (Some(whole), Some(unit)) = (caps.get(0), caps.name("unit")) else {
                continue;
            };
            if let Some(c) = structural(text, Span::new(whole.start(), whole.end())) {
                out.push(
                    c.with_meta(meta::UNIT, unit.as_str())
                        .with_meta(meta::STRUCTURE, whole.as_str()),
                );
            }
        }

        for m in APPENDED_TABLE.find_iter(text) {
            if let Some(c) = structural(text, Span::new(m.start(), m.end())) {
                out.push(
                    c.with_meta(meta::UNIT, "別表")
                        .with_meta(meta::STRUCTURE, m.as_str()),
                );
            }
        }

        for caps in SUPPLEMENTARY.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let (Some(p), Some(q)) = (provision::read(text, &caps, "p"), provision::read(text, &caps, "q"))
            else {
                continue;
            };
            let end = p.end.or(q.end).unwrap_or(whole.end());
            let Some(mut c) = structural(text, Span::new(whole.start(), end)) else {
                continue;
            };
            if let Some(article) = p.article_label() {
                c = c.with_article(article);
            }
            out.push(
                c.with_paragraph(p.paragraph_label().or(q.paragraph_label()))
                    .with_item(p.item_label())
                    .with_meta(meta::PART, "附則"),
            );
        }
        out
    }
}

fn structural(text: &str, span: Span) -> Option<Candidate> {
    Candidate::new(
        ReferenceKind::Structural,
        text,
        span,
        priority::STRUCTURAL,
        confidence::STRUCTURAL,
    )
}

fn nested(kind: ReferenceKind, text: &str, span: Span) -> Option<Candidate> {
    Candidate::new(kind, text, span, priority::NESTED, confidence::NESTED)
}

/// `第一号イからホまで`: one reference carrying the sub-item span.
pub struct NestedCollector;

impl Collector for NestedCollector {
    fn name(&self) -> &'static str {
        "nested"
    }

    fn collect(&self, scan: &Scan<'_>) -> Vec<Candidate> {
        let text = scan.text;
        let letters: Vec<char> = IROHA.chars().collect();
        let current = scan.context.current_article().map(ToString::to_string);
        let mut out = Vec::new();

        for caps in SUB_ITEM_RANGE.captures_iter(text) {
            let (Some(whole), Some(from), Some(to)) = (caps.get(0), caps.name("from"), caps.name("to"))
            else {
                continue;
            };
            if from.start() == whole.start() && guards::preceded_by_katakana(text, from.start()) {
                continue;
            }
            let position = |m: regex::Match<'_>| {
                m.as_str()
                    .chars()
                    .next()
                    .and_then(|c| letters.iter().position(|l| *l == c))
            };
            let (Some(a), Some(b)) = (position(from), position(to)) else {
                continue;
            };
            if a > b || b - a + 1 > scan.config.max_range_size {
                continue;
            }
            let (Some(p), Some(q), Some(r)) = (
                provision::read(text, &caps, "p"),
                provision::read(text, &caps, "q"),
                provision::read(text, &caps, "r"),
            ) else {
                continue;
            };
            let Some(mut c) = nested(
                ReferenceKind::NestedRange,
                text,
                Span::new(whole.start(), whole.end()),
            ) else {
                continue;
            };
            if let Some(article) = p.article_label().or_else(|| current.clone()) {
                c = c.with_article(article);
            }
            let sub_items: String = letters[a..=b]
                .iter()
                .map(char::to_string)
                .collect::<Vec<_>>()
                .join("、");
            out.push(
                c.with_paragraph(p.paragraph_label().or(q.paragraph_label()))
                    .with_item(p.item_label().or(q.item_label()).or(r.item_label()))
                    .with_meta(meta::SUB_ITEM_START, from.as_str())
                    .with_meta(meta::SUB_ITEM_END, to.as_str())
                    .with_meta(meta::SUB_ITEMS, sub_items),
            );
        }
        out
    }
}

/// 各号列記以外の部分 (the chapeau) and `…を除く` exclusions.
pub struct SpecialStructureCollector;

impl Collector for SpecialStructureCollector {
    fn name(&self) -> &'static str {
        "special_structure"
    }

    fn collect(&self, scan: &Scan<'_>) -> Vec<Candidate> {
        let text = scan.text;
        let current = scan.context.current_article().map(ToString::to_string);
        let mut out = Vec::new();

        for caps in CHAPEAU.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let (Some(p), Some(q)) = (provision::read(text, &caps, "p"), provision::read(text, &caps, "q"))
            else {
                continue;
            };
            let Some(mut c) = nested(
                ReferenceKind::SpecialStructure,
                text,
                Span::new(whole.start(), whole.end()),
            ) else {
                continue;
            };
            if let Some(article) = p.article_label().or_else(|| current.clone()) {
                c = c.with_article(article);
            }
            out.push(
                c.with_paragraph(p.paragraph_label().or(q.paragraph_label()))
                    .with_meta(meta::STRUCTURE, "各号列記以外の部分"),
            );
        }

        for caps in EXCLUSION.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            if guards::preceded_by_qualifier(text, whole.start()) {
                continue;
            }
            let Some(p) = provision::read(text, &caps, "p") else {
                continue;
            };
            let (Some(article), Some(end)) = (p.article_label(), p.end) else {
                continue;
            };
            let Some(c) = nested(
                ReferenceKind::SpecialStructure,
                text,
                Span::new(whole.start(), end),
            ) else {
                continue;
            };
            let mut c = c
                .with_article(article)
                .with_paragraph(p.paragraph_label())
                .with_item(p.item_label())
                .with_meta(meta::EXCLUSION, "true");
            if let Some(law) = guards::law_name_before(text, whole.start(), scan.registry) {
                c = c.with_law(Some(law.name), law.law_id);
            }
            out.push(c);
        }
        out
    }
}

/// ただし書, 本文, 前段, 後段 of a provision.
pub struct ConditionalCollector;

impl Collector for ConditionalCollector {
    fn name(&self) -> &'static str {
        "conditional"
    }

    fn collect(&self, scan: &Scan<'_>) -> Vec<Candidate> {
        let text = scan.text;
        let mut out = Vec::new();
        for caps in CLAUSE_PART.captures_iter(text) {
            let (Some(whole), Some(part)) = (caps.get(0), caps.name("part")) else {
                continue;
            };
            let Some(p) = provision::read(text, &caps, "p") else {
                continue;
            };
            let (article, paragraph, resolved) = match caps.name("rel") {
                Some(rel) => resolve_marker(scan.context, rel.as_str()),
                None => (p.article_label(), p.paragraph_label(), true),
            };
            let Some(c) = nested(
                ReferenceKind::Conditional,
                text,
                Span::new(whole.start(), whole.end()),
            ) else {
                continue;
            };
            let mut c = c
                .with_paragraph(paragraph)
                .with_item(p.item_label())
                .with_meta(meta::CLAUSE_PART, part.as_str());
            if let Some(article) = article {
                c = c.with_article(article);
            }
            if let Some(rel) = caps.name("rel") {
                c = c
                    .with_meta(meta::RELATIVE_MARKER, rel.as_str())
                    .with_meta(meta::RESOLVED, resolved.to_string());
            }
            out.push(c);
        }
        out
    }
}
