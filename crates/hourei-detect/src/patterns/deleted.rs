use std::sync::LazyLock;

use hourei_core::{LawNumber, ReferenceKind, Span, meta};
use regex::Regex;
use tracing::trace;

use super::range::expand_articles;
use super::{Collector, Scan, guards, provision};
use crate::candidate::{Candidate, confidence, priority};

static DELETED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "{}(?:から{}まで)?[ \\t　]*削除",
        provision::article("a"),
        provision::article("b")
    ))
    .expect("deletion pattern is valid")
});

static PRE_AMENDMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "(?P<number>(?:明治|大正|昭和|平成|令和)(?:元|[0-9０-９〇一二三四五六七八九十]+)年(?:法律|政令|勅令|[^\\s第]{{1,8}}?省令|[^\\s第]{{1,8}}?府令)第[0-9０-９〇一二三四五六七八九十百千]+号)による改正前の(?P<title>[\\p{{Han}}\\p{{Katakana}}ー・]+?)?{}",
        provision::provision("p")
    ))
    .expect("pre-amendment pattern is valid")
});

/// `第三条　削除` and `第三条から第五条まで　削除`.
pub struct DeletedCollector;

impl Collector for DeletedCollector {
    fn name(&self) -> &'static str {
        "deleted"
    }

    fn collect(&self, scan: &Scan<'_>) -> Vec<Candidate> {
        let text = scan.text;
        let mut out = Vec::new();
        for caps in DELETED.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let span = Span::new(whole.start(), whole.end());
            let Some(from) = provision::read(text, &caps, "a").and_then(|p| p.article) else {
                continue;
            };
            let to = provision::read(text, &caps, "b").and_then(|p| p.article);

            let Some(to) = to else {
                if let Some(c) = Candidate::new(
                    ReferenceKind::Deleted,
                    text,
                    span,
                    priority::DELETED,
                    confidence::DELETED,
                ) {
                    out.push(c.with_article(from.to_string()));
                }
                continue;
            };

            let Some(members) = expand_articles(&from, &to, scan.config.max_range_size) else {
                trace!(range = whole.as_str(), "dropped reversed or oversized deleted range");
                continue;
            };
            let (first, last) = (from.to_string(), to.to_string());
            for member in members {
                if let Some(c) = Candidate::new(
                    ReferenceKind::DeletedRange,
                    text,
                    span,
                    priority::DELETED,
                    confidence::DELETED,
                ) {
                    out.push(
                        c.with_article(member.to_string())
                            .as_range_member(&first, &last, "条"),
                    );
                }
            }
        }
        out
    }
}

/// `平成十七年法律第八十七号による改正前の商法第二条`: a provision as it
/// stood before the named amendment.
pub struct PreAmendmentCollector;

impl Collector for PreAmendmentCollector {
    fn name(&self) -> &'static str {
        "pre_amendment"
    }

    fn collect(&self, scan: &Scan<'_>) -> Vec<Candidate> {
        let text = scan.text;
        let mut out = Vec::new();
        for caps in PRE_AMENDMENT.captures_iter(text) {
            let (Some(whole), Some(number)) = (caps.get(0), caps.name("number")) else {
                continue;
            };
            let Some(p) = provision::read(text, &caps, "p") else {
                continue;
            };
            let (Some(article), Some(end)) = (p.article_label(), p.end) else {
                continue;
            };
            let Some(c) = Candidate::new(
                ReferenceKind::PreAmendment,
                text,
                Span::new(whole.start(), end),
                priority::PRE_AMENDMENT,
                confidence::PRE_AMENDMENT,
            ) else {
                continue;
            };
            let mut c = c
                .with_article(article)
                .with_paragraph(p.paragraph_label())
                .with_item(p.item_label())
                .with_meta(meta::AMENDMENT_LAW_NUMBER, number.as_str());

            if let Some(parsed) = LawNumber::parse(number.as_str()) {
                c = c.with_meta(meta::AMENDMENT_YEAR, parsed.gregorian_year().to_string());
                if let Some(id) = parsed.law_id() {
                    c = c.with_meta(meta::AMENDMENT_LAW_ID, id);
                }
            }

            if let Some(title) = caps.name("title") {
                if let Some(law) = guards::law_name_before(text, title.end(), scan.registry) {
                    c = c.with_law(Some(law.name), law.law_id);
                }
            }
            out.push(c);
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
    fn single_deletion() {
        let found = run(&DeletedCollector, "第三条　削除", None);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind(), ReferenceKind::Deleted);
        assert_eq!(found[0].target_article(), Some("第三条"));
        assert_eq!(found[0].reference.source_text, "第三条　削除");
    }

    #[test]
    fn deleted_range() {
        let found = run(&DeletedCollector, "第七条から第九条まで　削除", None);
        assert_eq!(articles(&found), vec!["第七条", "第八条", "第九条"]);
        assert!(found.iter().all(|c| c.kind() == ReferenceKind::DeletedRange));
        assert!(found.iter().all(|c| c.is_range_member));
    }

    #[test]
    fn pre_amendment_with_law() {
        let text = "平成十七年法律第八十七号による改正前の商法第二条第一項の規定";
        let found = run(&PreAmendmentCollector, text, None);
        assert_eq!(found.len(), 1);
        let r = &found[0].reference;
        assert_eq!(r.kind, ReferenceKind::PreAmendment);
        assert_eq!(r.target_law_name.as_deref(), Some("商法"));
        assert_eq!(r.target_article.as_deref(), Some("第二条"));
        assert_eq!(r.target_paragraph.as_deref(), Some("第一項"));
        assert_eq!(r.meta(meta::AMENDMENT_YEAR), Some("2005"));
        assert_eq!(r.meta(meta::AMENDMENT_LAW_ID), Some("417AC0000000087"));
        assert_eq!(r.meta(meta::AMENDMENT_LAW_NUMBER), Some("平成十七年法律第八十七号"));
    }

    #[test]
    fn pre_amendment_of_same_law() {
        let text = "令和元年法律第二号による改正前の第五条";
        let found = run(&PreAmendmentCollector, text, None);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].reference.target_law_name, None);
        assert_eq!(found[0].target_article(), Some("第五条"));
        assert_eq!(found[0].reference.meta(meta::AMENDMENT_YEAR), Some("2019"));
    }
}
