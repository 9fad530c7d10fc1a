//! Named-group provision fragments for collectors that combine several
//! citations in one pattern.

use hourei_core::fragments::NUM;
use hourei_core::numeral::{item_label, paragraph_label};
use hourei_core::{ArticleNumber, kanji_to_arabic};
use regex::Captures;

use super::guards;

const SMALL_NUM: &str = "[0-9０-９〇零一二三四五六七八九十百千]+";

/// `第N条(のM)*` with groups `{p}_main` and `{p}_br`.
pub fn article(p: &str) -> String {
    format!("第(?P<{p}_main>{NUM})条(?P<{p}_br>(?:の{SMALL_NUM})*)")
}

/// `第N項` with group `{p}_para`.
pub fn paragraph(p: &str) -> String {
    format!("第(?P<{p}_para>{SMALL_NUM})項")
}

/// `第N号` with group `{p}_item`.
pub fn item(p: &str) -> String {
    format!("第(?P<{p}_item>{SMALL_NUM})号")
}

/// Article with optional paragraph and item.
pub fn provision(p: &str) -> String {
    format!(
        "{}(?:{})?(?:{})?",
        article(p),
        paragraph(p),
        item(p)
    )
}

/// Optional paragraph and item following some other head.
pub fn tail(p: &str) -> String {
    format!("(?:{})?(?:{})?", paragraph(p), item(p))
}

/// A provision read back out of named groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provision {
    pub article: Option<ArticleNumber>,
    pub paragraph: Option<u32>,
    pub item: Option<u32>,
    /// Byte offset just past the last component actually kept.
    pub end: Option<usize>,
}

impl Provision {
    pub fn article_label(&self) -> Option<String> {
        self.article.as_ref().map(ToString::to_string)
    }

    pub fn paragraph_label(&self) -> Option<String> {
        self.paragraph.map(paragraph_label)
    }

    pub fn item_label(&self) -> Option<String> {
        self.item.map(item_label)
    }

    pub fn has_subdivision(&self) -> bool {
        self.paragraph.is_some() || self.item.is_some()
    }
}

/// Read the groups named with prefix `p`.
///
/// Returns `None` when a group matched but holds an unusable numeral, so
/// the caller emits nothing for that match. A trailing branch that is
/// really the start of a word (`第三条の一部`) is dropped and `end` moved
/// back before it.
pub fn read(text: &str, caps: &Captures<'_>, p: &str) -> Option<Provision> {
    let mut provision = Provision {
        article: None,
        paragraph: None,
        item: None,
        end: None,
    };

    if let Some(main) = caps.name(&format!("{p}_main")) {
        let branches = caps.name(&format!("{p}_br"));
        let branch_text = branches.map(|b| b.as_str()).unwrap_or("");
        let mut article = ArticleNumber::parse(&format!("第{}条{}", main.as_str(), branch_text))?;
        let mut end = match branches {
            Some(b) if !b.as_str().is_empty() => b.end(),
            _ => main.end() + '条'.len_utf8(),
        };
        if let Some(b) = branches.filter(|b| guards::branch_is_word_fragment(text, b.end())) {
            if let Some(last) = b.as_str().rfind('の') {
                article.branches.pop();
                end = b.start() + last;
            }
        }
        provision.article = Some(article);
        provision.end = Some(end);
    }

    if let Some(m) = caps.name(&format!("{p}_para")) {
        provision.paragraph = Some(positive(m.as_str())?);
        provision.end = Some(m.end() + '項'.len_utf8());
    }
    if let Some(m) = caps.name(&format!("{p}_item")) {
        provision.item = Some(positive(m.as_str())?);
        provision.end = Some(m.end() + '号'.len_utf8());
    }
    Some(provision)
}

fn positive(numeral: &str) -> Option<u32> {
    Some(kanji_to_arabic(numeral)).filter(|n| *n > 0)
}
