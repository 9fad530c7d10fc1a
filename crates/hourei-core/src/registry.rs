//! Law abbreviation registry and known-law table.
//!
//! The registry is an explicitly constructed value: the engine receives it
//! at construction and never reaches for global state. Entries are shared
//! behind [`Arc`] so that an abbreviation and all of its aliases resolve to
//! one immutable entry. Runtime extension appends new entries and never
//! touches existing ones.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::RegistryError;
use crate::fragments::{ARTICLE, ITEM, PARAGRAPH, char_after, is_name_char, title_starts_at};
use crate::law::{LawKind, LawNumber};
use crate::numeral::{ArticleNumber, kanji_to_arabic};
use crate::reference::Span;

/// A law abbreviation (略称) and what it stands for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbbreviationEntry {
    pub abbreviation: String,
    pub full_name: String,
    #[serde(default)]
    pub law_number: Option<String>,
    pub category: LawKind,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl AbbreviationEntry {
    pub fn new(abbreviation: &str, full_name: &str, law_number: Option<&str>) -> Self {
        let category = law_number
            .and_then(LawNumber::parse)
            .map(|n| n.kind)
            .unwrap_or_else(|| LawKind::from_title(full_name));
        Self {
            abbreviation: abbreviation.to_string(),
            full_name: full_name.to_string(),
            law_number: law_number.map(str::to_string),
            category,
            aliases: Vec::new(),
        }
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    /// The abbreviation followed by every alias, in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.abbreviation.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    pub fn law_id(&self) -> Option<String> {
        LawNumber::parse(self.law_number.as_deref()?)?.law_id()
    }
}

/// A law known by its full title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LawRecord {
    pub name: String,
    pub law_number: Option<String>,
    pub kind: LawKind,
}

impl LawRecord {
    pub fn law_id(&self) -> Option<String> {
        LawNumber::parse(self.law_number.as_deref()?)?.law_id()
    }
}

/// One abbreviation occurrence found by [`AbbreviationRegistry::expand_abbreviations`].
#[derive(Debug, Clone, PartialEq)]
pub struct AbbreviationMatch {
    pub span: Span,
    pub key: String,
    pub entry: Arc<AbbreviationEntry>,
    pub article: Option<ArticleNumber>,
    pub paragraph: Option<u32>,
    pub item: Option<u32>,
    registration: usize,
}

/// One known-law title occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct LawMention {
    pub span: Span,
    pub law: Arc<LawRecord>,
}

#[derive(Debug, Clone)]
struct KeyPattern {
    key: String,
    regex: Regex,
    entry: Arc<AbbreviationEntry>,
}

/// Immutable-after-construction table of abbreviations and known laws.
#[derive(Debug, Clone)]
pub struct AbbreviationRegistry {
    entries: Vec<Arc<AbbreviationEntry>>,
    by_key: HashMap<String, Arc<AbbreviationEntry>>,
    patterns: Vec<KeyPattern>,
    laws: HashMap<String, Arc<LawRecord>>,
    law_pattern: Option<Regex>,
    revision: u64,
}

/// Laws cited by title often enough to recognise without an abbreviation.
const BUILTIN_LAWS: &[(&str, Option<&str>)] = &[
    ("日本国憲法", None),
    ("民法", Some("明治二十九年法律第八十九号")),
    ("刑法", Some("明治四十年法律第四十五号")),
    ("商法", Some("明治三十二年法律第四十八号")),
    ("会社法", Some("平成十七年法律第八十六号")),
    ("破産法", Some("平成十六年法律第七十五号")),
    ("民事再生法", Some("平成十一年法律第二百二十五号")),
    ("会社更生法", Some("平成十四年法律第百五十四号")),
    ("手形法", Some("昭和七年法律第二十号")),
    ("小切手法", Some("昭和八年法律第五十七号")),
    ("信託法", Some("平成十八年法律第百八号")),
    ("保険法", Some("平成二十年法律第五十六号")),
    ("借地借家法", Some("平成三年法律第九十号")),
    ("不動産登記法", Some("平成十六年法律第百二十三号")),
    ("戸籍法", Some("昭和二十二年法律第二百二十四号")),
    ("著作権法", Some("昭和四十五年法律第四十八号")),
    ("特許法", Some("昭和三十四年法律第百二十一号")),
    ("実用新案法", Some("昭和三十四年法律第百二十三号")),
    ("意匠法", Some("昭和三十四年法律第百二十五号")),
    ("商標法", Some("昭和三十四年法律第百二十七号")),
    ("所得税法", Some("昭和四十年法律第三十三号")),
    ("法人税法", Some("昭和四十年法律第三十四号")),
    ("消費税法", Some("昭和六十三年法律第百八号")),
    ("国税通則法", Some("昭和三十七年法律第六十六号")),
    ("銀行法", Some("昭和五十六年法律第五十九号")),
    ("保険業法", Some("平成七年法律第百五号")),
    ("行政代執行法", Some("昭和二十三年法律第四十三号")),
    ("国家賠償法", Some("昭和二十二年法律第百二十五号")),
    ("裁判所法", Some("昭和二十二年法律第五十九号")),
    ("弁護士法", Some("昭和二十四年法律第二百五号")),
    ("内閣法", Some("昭和二十二年法律第五号")),
    ("国会法", Some("昭和二十二年法律第七十九号")),
    ("公職選挙法", Some("昭和二十五年法律第百号")),
    ("学校教育法", Some("昭和二十二年法律第二十六号")),
    ("生活保護法", Some("昭和二十五年法律第百四十四号")),
    ("健康保険法", Some("大正十一年法律第七十号")),
    ("国民年金法", Some("昭和三十四年法律第百四十一号")),
    ("厚生年金保険法", Some("昭和二十九年法律第百十五号")),
    ("雇用保険法", Some("昭和四十九年法律第百十六号")),
    ("最低賃金法", Some("昭和三十四年法律第百三十七号")),
    ("電気事業法", Some("昭和三十九年法律第百七十号")),
    ("電波法", Some("昭和二十五年法律第百三十一号")),
    ("農地法", Some("昭和二十七年法律第二百二十九号")),
    ("森林法", Some("昭和二十六年法律第二百四十九号")),
    ("河川法", Some("昭和三十九年法律第百六十七号")),
    ("道路法", Some("昭和二十七年法律第百八十号")),
    ("消防法", Some("昭和二十三年法律第百八十六号")),
    ("警察法", Some("昭和二十九年法律第百六十二号")),
    ("関税法", Some("昭和二十九年法律第六十一号")),
    ("地方税法", Some("昭和二十五年法律第二百二十六号")),
];

/// (abbreviation, full name, law number, aliases)
const BUILTIN_ABBREVIATIONS: &[(&str, &str, Option<&str>, &[&str])] = &[
    ("憲法", "日本国憲法", None, &[]),
    ("民訴", "民事訴訟法", Some("平成八年法律第百九号"), &["民訴法"]),
    ("刑訴", "刑事訴訟法", Some("昭和二十三年法律第百三十一号"), &["刑訴法"]),
    ("民執", "民事執行法", Some("昭和五十四年法律第四号"), &["民執法"]),
    ("民保", "民事保全法", Some("平成元年法律第九十一号"), &["民保法"]),
    ("労基法", "労働基準法", Some("昭和二十二年法律第四十九号"), &["労基"]),
    ("労組法", "労働組合法", Some("昭和二十四年法律第百七十四号"), &[]),
    ("労契法", "労働契約法", Some("平成十九年法律第百二十八号"), &[]),
    (
        "独禁法",
        "私的独占の禁止及び公正取引の確保に関する法律",
        Some("昭和二十二年法律第五十四号"),
        &["独占禁止法"],
    ),
    ("金商法", "金融商品取引法", Some("昭和二十三年法律第二十五号"), &[]),
    (
        "個人情報保護法",
        "個人情報の保護に関する法律",
        Some("平成十五年法律第五十七号"),
        &["個情法"],
    ),
    ("行訴法", "行政事件訴訟法", Some("昭和三十七年法律第百三十九号"), &[]),
    ("行手法", "行政手続法", Some("平成五年法律第八十八号"), &[]),
    ("行審法", "行政不服審査法", Some("平成二十六年法律第六十八号"), &[]),
    (
        "情報公開法",
        "行政機関の保有する情報の公開に関する法律",
        Some("平成十一年法律第四十二号"),
        &[],
    ),
    ("国公法", "国家公務員法", Some("昭和二十二年法律第百二十号"), &[]),
    ("地公法", "地方公務員法", Some("昭和二十五年法律第二百六十一号"), &[]),
    ("地自法", "地方自治法", Some("昭和二十二年法律第六十七号"), &["自治法"]),
    (
        "入管法",
        "出入国管理及び難民認定法",
        Some("昭和二十六年政令第三百十九号"),
        &["入管難民法"],
    ),
    ("道交法", "道路交通法", Some("昭和三十五年法律第百五号"), &[]),
    (
        "景表法",
        "不当景品類及び不当表示防止法",
        Some("昭和三十七年法律第百三十四号"),
        &["景品表示法"],
    ),
    ("下請法", "下請代金支払遅延等防止法", Some("昭和三十一年法律第百二十号"), &[]),
    ("特商法", "特定商取引に関する法律", Some("昭和五十一年法律第五十七号"), &[]),
    ("消契法", "消費者契約法", Some("平成十二年法律第六十一号"), &[]),
    ("建基法", "建築基準法", Some("昭和二十五年法律第二百一号"), &[]),
    ("都計法", "都市計画法", Some("昭和四十三年法律第百号"), &[]),
    (
        "廃掃法",
        "廃棄物の処理及び清掃に関する法律",
        Some("昭和四十五年法律第百三十七号"),
        &["廃棄物処理法"],
    ),
    (
        "薬機法",
        "医薬品、医療機器等の品質、有効性及び安全性の確保等に関する法律",
        Some("昭和三十五年法律第百四十五号"),
        &[],
    ),
    (
        "派遣法",
        "労働者派遣事業の適正な運営の確保及び派遣労働者の保護等に関する法律",
        Some("昭和六十年法律第八十八号"),
        &["労働者派遣法"],
    ),
    ("安衛法", "労働安全衛生法", Some("昭和四十七年法律第五十七号"), &["労安衛法"]),
];

impl AbbreviationRegistry {
    /// An empty registry with no abbreviations and no known laws.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            by_key: HashMap::new(),
            patterns: Vec::new(),
            laws: HashMap::new(),
            law_pattern: None,
            revision: 0,
        }
    }

    /// The built-in table of common abbreviations and frequently cited laws.
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut registry = Self::empty();
        for (name, number) in BUILTIN_LAWS {
            registry.insert_law(name, *number);
        }
        for (abbr, full, number, aliases) in BUILTIN_ABBREVIATIONS {
            registry.insert_entry(AbbreviationEntry::new(abbr, full, *number).with_aliases(aliases))?;
        }
        registry.rebuild_law_pattern()?;
        registry.revision = 0;
        info!(
            entries = registry.entries.len(),
            laws = registry.laws.len(),
            "abbreviation registry ready"
        );
        Ok(registry)
    }

    /// Build a registry from explicit entries, in registration order.
    pub fn from_entries(entries: Vec<AbbreviationEntry>) -> Result<Self, RegistryError> {
        let mut registry = Self::empty();
        for entry in entries {
            registry.insert_entry(entry)?;
        }
        registry.rebuild_law_pattern()?;
        registry.revision = 0;
        Ok(registry)
    }

    /// Append an entry at runtime. Existing entries are left untouched;
    /// a key that is already registered is rejected.
    pub fn add_custom_abbreviation(&mut self, entry: AbbreviationEntry) -> Result<(), RegistryError> {
        self.insert_entry(entry)?;
        self.rebuild_law_pattern()?;
        Ok(())
    }

    /// Increments on every runtime extension; part of cache discrimination.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &Arc<AbbreviationEntry>> {
        self.entries.iter()
    }

    /// Resolve an abbreviation or alias. `None` means "not found".
    pub fn lookup(&self, key: &str) -> Option<Arc<AbbreviationEntry>> {
        self.by_key.get(key).cloned()
    }

    /// Resolve a full law title.
    pub fn lookup_law(&self, name: &str) -> Option<Arc<LawRecord>> {
        self.laws.get(name).cloned()
    }

    /// Find the law title that a law id belongs to.
    pub fn law_name_for_id(&self, law_id: &str) -> Option<String> {
        let mut names: Vec<&String> = self
            .laws
            .values()
            .filter(|law| law.law_id().as_deref() == Some(law_id))
            .map(|law| &law.name)
            .collect();
        names.sort();
        names.first().map(|n| n.to_string())
    }

    /// Scan `text` for abbreviations, each optionally followed by an article.
    ///
    /// Matches embedded in a longer title (a name character directly before
    /// the key, or after it where no article follows) are skipped. When two
    /// keys match at the same offset the longer match wins, then the earlier
    /// registration.
    pub fn expand_abbreviations(&self, text: &str) -> Vec<AbbreviationMatch> {
        let mut found: Vec<AbbreviationMatch> = Vec::new();

        for (registration, pattern) in self.patterns.iter().enumerate() {
            for caps in pattern.regex.captures_iter(text) {
                let Some(whole) = caps.get(0) else { continue };
                if !title_starts_at(text, whole.start()) {
                    continue;
                }
                let article = caps.get(1).and_then(|main| {
                    let branches = caps.get(2).map(|b| b.as_str()).unwrap_or("");
                    ArticleNumber::parse(&format!("第{}条{}", main.as_str(), branches))
                });
                if article.is_none() && char_after(text, whole.end()).is_some_and(is_name_char) {
                    continue;
                }
                let paragraph = caps.get(3).map(|m| kanji_to_arabic(m.as_str())).filter(|n| *n > 0);
                let item = caps.get(4).map(|m| kanji_to_arabic(m.as_str())).filter(|n| *n > 0);
                found.push(AbbreviationMatch {
                    span: Span::new(whole.start(), whole.end()),
                    key: pattern.key.clone(),
                    entry: Arc::clone(&pattern.entry),
                    article,
                    paragraph,
                    item,
                    registration,
                });
            }
        }

        found.sort_by(|a, b| {
            a.span
                .start
                .cmp(&b.span.start)
                .then(b.span.len().cmp(&a.span.len()))
                .then(a.registration.cmp(&b.registration))
        });
        found.dedup_by(|later, first| later.span.start == first.span.start);
        debug!(count = found.len(), "abbreviation matches");
        found
    }

    /// Scan `text` for known law titles not embedded in a longer title. A
    /// title right after an amending clause (`同項中商法`) still counts.
    pub fn find_laws(&self, text: &str) -> Vec<LawMention> {
        let Some(pattern) = &self.law_pattern else {
            return Vec::new();
        };
        pattern
            .find_iter(text)
            .filter(|m| title_starts_at(text, m.start()))
            .filter_map(|m| {
                let law = self.laws.get(m.as_str())?;
                Some(LawMention {
                    span: Span::new(m.start(), m.end()),
                    law: Arc::clone(law),
                })
            })
            .collect()
    }

    fn insert_law(&mut self, name: &str, law_number: Option<&str>) {
        if self.laws.contains_key(name) {
            return;
        }
        let kind = law_number
            .and_then(LawNumber::parse)
            .map(|n| n.kind)
            .unwrap_or_else(|| LawKind::from_title(name));
        self.laws.insert(
            name.to_string(),
            Arc::new(LawRecord {
                name: name.to_string(),
                law_number: law_number.map(str::to_string),
                kind,
            }),
        );
    }

    fn insert_entry(&mut self, entry: AbbreviationEntry) -> Result<(), RegistryError> {
        if entry.full_name.trim().is_empty() {
            return Err(RegistryError::EmptyFullName(entry.abbreviation));
        }
        for key in entry.keys() {
            if key.trim().is_empty() {
                return Err(RegistryError::EmptyKey);
            }
            if self.by_key.contains_key(key) {
                return Err(RegistryError::DuplicateKey(key.to_string()));
            }
        }

        let entry = Arc::new(entry);
        let mut compiled = Vec::new();
        for key in entry.keys() {
            if key == entry.full_name {
                continue;
            }
            let regex = Regex::new(&format!(
                "{}(?:{ARTICLE}(?:{PARAGRAPH})?(?:{ITEM})?)?",
                regex::escape(key)
            ))?;
            compiled.push(KeyPattern {
                key: key.to_string(),
                regex,
                entry: Arc::clone(&entry),
            });
        }

        for key in entry.keys() {
            self.by_key.insert(key.to_string(), Arc::clone(&entry));
        }
        self.patterns.extend(compiled);
        self.insert_law(&entry.full_name, entry.law_number.as_deref());
        self.entries.push(entry);
        self.revision += 1;
        Ok(())
    }

    fn rebuild_law_pattern(&mut self) -> Result<(), RegistryError> {
        if self.laws.is_empty() {
            self.law_pattern = None;
            return Ok(());
        }
        let mut names: Vec<&str> = self.laws.keys().map(String::as_str).collect();
        names.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
        let alternation = names
            .iter()
            .map(|n| regex::escape(n))
            .collect::<Vec<_>>()
            .join("|");
        self.law_pattern = Some(Regex::new(&format!("(?:{alternation})"))?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> AbbreviationRegistry {
        AbbreviationRegistry::builtin().unwrap()
    }

    #[test]
    fn builtin_keys_resolve_to_shared_entry() {
        let reg = registry();
        let a = reg.lookup("民訴").unwrap();
        let b = reg.lookup("民訴法").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.full_name, "民事訴訟法");
        assert_eq!(a.law_id().as_deref(), Some("408AC0000000109"));
        assert!(reg.lookup("存在しない法").is_none());
    }

    #[test]
    fn expands_abbreviation_with_article() {
        let reg = registry();
        let matches = reg.expand_abbreviations("民訴第百条の規定による");
        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.key, "民訴");
        assert_eq!(m.entry.full_name, "民事訴訟法");
        assert_eq!(m.article, Some(ArticleNumber::new(100)));
        assert_eq!(m.span, Span::new(0, "民訴第百条".len()));
    }

    #[test]
    fn longer_key_wins_at_same_offset() {
        let reg = registry();
        let matches = reg.expand_abbreviations("民訴法第二条第一項");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].key, "民訴法");
        assert_eq!(matches[0].paragraph, Some(1));
    }

    #[test]
    fn embedded_keys_are_skipped() {
        let reg = registry();
        assert!(reg.expand_abbreviations("労基法施行規則").is_empty());
        assert!(reg.expand_abbreviations("旧民訴").is_empty());
    }

    #[test]
    fn bare_abbreviation_without_article() {
        let reg = registry();
        let matches = reg.expand_abbreviations("独禁法の規定");
        assert_eq!(matches.len(), 1);
        assert!(matches[0].article.is_none());
        assert_eq!(
            matches[0].entry.full_name,
            "私的独占の禁止及び公正取引の確保に関する法律"
        );
    }

    #[test]
    fn custom_abbreviation_appends() {
        let mut reg = registry();
        let before = reg.len();
        let rev = reg.revision();
        reg.add_custom_abbreviation(AbbreviationEntry::new(
            "番号法",
            "行政手続における特定の個人を識別するための番号の利用等に関する法律",
            Some("平成二十五年法律第二十七号"),
        ))
        .unwrap();
        assert_eq!(reg.len(), before + 1);
        assert!(reg.revision() > rev);
        let m = reg.expand_abbreviations("番号法第九条");
        assert_eq!(m.len(), 1);
        assert!(reg
            .lookup_law("行政手続における特定の個人を識別するための番号の利用等に関する法律")
            .is_some());
    }

    #[test]
    fn duplicate_and_empty_keys_rejected() {
        let mut reg = registry();
        let err = reg
            .add_custom_abbreviation(AbbreviationEntry::new("民訴", "別の法律", None))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateKey(k) if k == "民訴"));
        let err = reg
            .add_custom_abbreviation(AbbreviationEntry::new(" ", "別の法律", None))
            .unwrap_err();
        assert!(matches!(err, RegistryError::EmptyKey));
        // Existing entry untouched.
        assert_eq!(reg.lookup("民訴").unwrap().full_name, "民事訴訟法");
    }

    #[test]
    fn finds_known_laws_longest_first() {
        let reg = registry();
        let found = reg.find_laws("民事訴訟法及び民法");
        let names: Vec<&str> = found.iter().map(|m| m.law.name.as_str()).collect();
        assert_eq!(names, vec!["民事訴訟法", "民法"]);
        assert!(reg.find_laws("新民法").is_empty());
    }

    #[test]
    fn finds_laws_after_amending_clause() {
        let reg = registry();
        let found = reg.find_laws("同項中商法第二条の規定");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].law.name, "商法");
        assert_eq!(found[0].span, Span::new("同項中".len(), "同項中商法".len()));

        let found = reg.find_laws("規定中民法第九十条とあるのは");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].law.name, "民法");
    }

    #[test]
    fn law_name_by_id() {
        let reg = registry();
        assert_eq!(reg.law_name_for_id("417AC0000000086").as_deref(), Some("会社法"));
        assert_eq!(reg.law_name_for_id("nope"), None);
    }
}
