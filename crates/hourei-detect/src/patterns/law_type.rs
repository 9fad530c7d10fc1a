use std::sync::LazyLock;

use hourei_core::fragments::title_offset;
use hourei_core::{LawKind, ReferenceKind, Span, meta};
use regex::{Match, Regex};

use super::{Collector, Scan, guards, provision};
use crate::candidate::{Candidate, confidence, priority};

/// Characters of a law title.
const NAME: &str = "[\\p{Han}\\p{Katakana}ー・々]";

const SUFFIX: &str = "法律|法|施行令|施行規則|政令|省令|府令|規則|条例|告示|通達|訓令";

/// A title ending in a law suffix, directly followed by a provision.
static TITLED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "(?P<title>{NAME}*?(?:{SUFFIX})){}",
        provision::provision("p")
    ))
    .expect("titled law pattern is valid")
});

/// 人事院規則 are numbered with a dash (`人事院規則一〇―一〇`).
static NPA_RULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "人事院規則(?P<a>[0-9０-９〇一二三四五六七八九十]+)[―ー－‐-](?P<b>[0-9０-９〇一二三四五六七八九十]+)(?:{})?",
        provision::provision("p")
    ))
    .expect("rule pattern is valid")
});

/// A title match without the `…中` clause it may have swept in.
fn title_of<'t>(m: Match<'t>) -> (usize, &'t str) {
    let offset = title_offset(m.as_str());
    (m.start() + offset, &m.as_str()[offset..])
}

/// Unregistered titles that cite a provision, in text order.
pub(crate) fn titled_laws(text: &str) -> Vec<(Span, String)> {
    TITLED
        .captures_iter(text)
        .filter_map(|caps| {
            let title = caps.name("title")?;
            let (start, name) = title_of(title);
            if guards::is_placeholder_law_name(name) {
                return None;
            }
            Some((Span::new(start, title.end()), name.to_string()))
        })
        .collect()
}

/// Laws and instruments outside the registry, recognised by their suffix
/// (`…法`, `…施行令`, `…規則`, `…条例`).
pub struct LawTypeCollector;

impl Collector for LawTypeCollector {
    fn name(&self) -> &'static str {
        "law_type"
    }

    fn collect(&self, scan: &Scan<'_>) -> Vec<Candidate> {
        let text = scan.text;
        let mut out = Vec::new();

        for caps in TITLED.captures_iter(text) {
            let Some(title) = caps.name("title") else { continue };
            let (start, name) = title_of(title);
            if guards::is_placeholder_law_name(name)
                || guards::preceded_by_amendment_clause(text, start)
                || scan.registry.lookup_law(name).is_some()
                || scan.registry.lookup(name).is_some()
            {
                continue;
            }
            let Some(p) = provision::read(text, &caps, "p") else {
                continue;
            };
            let (Some(article), Some(end)) = (p.article_label(), p.end) else {
                continue;
            };
            let kind = LawKind::from_title(name);
            let prio = if kind == LawKind::Act {
                priority::UNREGISTERED_LAW
            } else {
                priority::LAW_TYPE
            };
            let Some(candidate) = Candidate::new(
                ReferenceKind::External,
                text,
                Span::new(start, end),
                prio,
                confidence::LAW_TYPE,
            ) else {
                continue;
            };
            out.push(
                candidate
                    .with_law(Some(name.to_string()), None)
                    .with_article(article)
                    .with_paragraph(p.paragraph_label())
                    .with_item(p.item_label())
                    .with_meta(meta::LAW_KIND, kind.as_str()),
            );
        }

        for caps in NPA_RULE.captures_iter(text) {
            let (Some(whole), Some(a), Some(b)) = (caps.get(0), caps.name("a"), caps.name("b"))
            else {
                continue;
            };
            let Some(p) = provision::read(text, &caps, "p") else {
                continue;
            };
            let name = format!("人事院規則{}―{}", a.as_str(), b.as_str());
            let end = p.end.unwrap_or(b.end());
            let conf = if p.article.is_some() {
                confidence::LAW_TYPE
            } else {
                confidence::LAW_MENTION
            };
            let Some(candidate) = Candidate::new(
                ReferenceKind::External,
                text,
                Span::new(whole.start(), end),
                priority::LAW_TYPE,
                conf,
            ) else {
                continue;
            };
            let mut candidate = candidate
                .with_law(Some(name), None)
                .with_paragraph(p.paragraph_label())
                .with_item(p.item_label())
                .with_meta(meta::LAW_KIND, LawKind::Rule.as_str());
            if let Some(article) = p.article_label() {
                candidate = candidate.with_article(article);
            }
            out.push(candidate);
        }
        out
    }
}
