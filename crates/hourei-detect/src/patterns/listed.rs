use std::collections::HashSet;
use std::sync::LazyLock;

use hourei_core::{ReferenceKind, Span, meta};
use regex::Regex;

use super::{Collector, Scan, guards, provision};
use crate::candidate::{Candidate, confidence, priority};

static MEMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "{}|{}(?:{})?",
        provision::provision("m"),
        provision::paragraph("n"),
        provision::item("n")
    ))
    .expect("list member pattern is valid")
});

const CONJUNCTIONS: &[&str] = &["、", "及び", "並びに", "又は", "若しくは"];

#[derive(Debug, Clone)]
struct Member {
    span: Span,
    article: Option<String>,
    paragraph: Option<String>,
    item: Option<String>,
}

/// `第三条、第五条及び第七条`: one candidate per listed member.
///
/// A member that names only a paragraph takes the article of the member
/// before it (`第三条第一項及び第二項`).
pub struct ListedCollector;

impl ListedCollector {
    fn chains(&self, text: &str) -> Vec<Vec<Member>> {
        let mut chains: Vec<Vec<Member>> = Vec::new();
        for caps in MEMBER.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let Some(p) = provision::read(text, &caps, "m")
                .filter(|p| p.article.is_some())
                .or_else(|| provision::read(text, &caps, "n"))
            else {
                continue;
            };
            let member = Member {
                span: Span::new(whole.start(), p.end.unwrap_or(whole.end())),
                article: p.article_label(),
                paragraph: p.paragraph_label(),
                item: p.item_label(),
            };
            match chains.last_mut() {
                Some(chain) if joins(text, chain, &member) => {
                    let mut member = member;
                    if member.article.is_none() {
                        member.article = chain.last().and_then(|m| m.article.clone());
                    }
                    chain.push(member);
                }
                _ => chains.push(vec![member]),
            }
        }
        chains.retain(|chain| chain.len() > 1);
        chains
    }
}

fn joins(text: &str, chain: &[Member], next: &Member) -> bool {
    let Some(last) = chain.last() else {
        return false;
    };
    text.get(last.span.end..next.span.start)
        .is_some_and(|gap| CONJUNCTIONS.contains(&gap))
}

impl Collector for ListedCollector {
    fn name(&self) -> &'static str {
        "listed"
    }

    fn collect(&self, scan: &Scan<'_>) -> Vec<Candidate> {
        let text = scan.text;
        let current = scan.context.current_article().map(ToString::to_string);
        let mut out = Vec::new();
        let mut seen: HashSet<(usize, Option<String>)> = HashSet::new();

        for chain in self.chains(text) {
            let first = chain[0].span.start;
            if guards::preceded_by_qualifier(text, first) {
                continue;
            }
            let law = guards::law_name_before(text, first, scan.registry);
            let size = chain.len().to_string();
            for member in chain {
                if guards::starts_range(text, member.span.end)
                    || guards::closes_range(text, member.span.start)
                {
                    continue;
                }
                let article = member.article.or_else(|| current.clone());
                if !seen.insert((member.span.start, article.clone())) {
                    continue;
                }
                let Some(mut c) = Candidate::new(
                    ReferenceKind::Multiple,
                    text,
                    member.span,
                    priority::MULTIPLE,
                    confidence::MULTIPLE,
                ) else {
                    continue;
                };
                if let Some(article) = article {
                    c = c.with_article(article);
                }
                if let Some(law) = &law {
                    c = c.with_law(Some(law.name.clone()), law.law_id.clone());
                }
                out.push(
                    c.with_paragraph(member.paragraph)
                        .with_item(member.item)
                        .with_meta(meta::LIST_SIZE, size.clone()),
                );
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
    fn expands_listed_chain() {
        let found = run(&ListedCollector, "第三条、第五条及び第七条の規定", None);
        assert_eq!(articles(&found), vec!["第三条", "第五条", "第七条"]);
        assert!(found.iter().all(|c| c.kind() == ReferenceKind::Multiple));
        assert_eq!(found[1].reference.source_text, "第五条");
        assert_eq!(found[0].reference.meta(meta::LIST_SIZE), Some("3"));
    }

    #[test]
    fn paragraph_members_inherit_article() {
        let found = run(&ListedCollector, "第三条第一項及び第二項", None);
        assert_eq!(articles(&found), vec!["第三条", "第三条"]);
        assert_eq!(found[1].reference.target_paragraph.as_deref(), Some("第二項"));
    }

    #[test]
    fn single_citation_is_not_a_list() {
        assert!(run(&ListedCollector, "第三条の規定", None).is_empty());
        assert!(run(&ListedCollector, "第三条の規定及び第五条", None).is_empty());
    }

    #[test]
    fn law_applies_to_every_member() {
        let found = run(&ListedCollector, "会社法第二条及び第三条", None);
        assert_eq!(found.len(), 2);
        assert!(found
            .iter()
            .all(|c| c.reference.target_law_name.as_deref() == Some("会社法")));
    }

    #[test]
    fn other_words_break_the_chain() {
        let found = run(&ListedCollector, "第一条又は第二条、並びに第四条", None);
        assert_eq!(articles(&found), vec!["第一条", "第二条"]);
    }
}
