//! Look-around checks that suppress false positives.
//!
//! Each guard inspects the text around a match and nothing else, so it
//! can be tested on its own.

use hourei_core::fragments::{
    char_after, char_before, chars_after, is_name_char, sentence_after, title_offset,
};
use hourei_core::{AbbreviationRegistry, LawKind};

/// Kanji that turn a branch-like `の一` into a word (`の一部`, `の一般`).
const WORD_AFTER_BRANCH: &[char] = &[
    '部', '方', '般', '定', '体', '括', '時', '層', '種', '環', '員', '連', '人', '者',
];

/// Kanji that turn 同条/本条 into a word (`同条約`, `本条例`).
const WORD_AFTER_RELATIVE: &[char] = &['約', '例', '件', '理', '文'];

/// Qualifiers that attach a bare article to something other than the
/// current law.
const QUALIFIERS: &[&str] = &["同法", "同令", "同規則", "附則", "旧法", "新法"];

/// Endings that make a run of name characters a law title.
const LAW_SUFFIXES: &[&str] = &[
    "法律", "法", "施行令", "施行規則", "政令", "省令", "府令", "規則", "条例", "告示", "通達",
    "訓令",
];

/// Titles that are not names of a particular law.
const PLACEHOLDER_NAMES: &[&str] = &[
    "法", "法律", "本法", "同法", "旧法", "新法", "前法", "政令", "省令", "府令", "規則", "条例",
    "告示", "通達", "訓令", "施行令", "施行規則", "内閣府令", "主務省令", "命令",
];

/// A law title found directly before a citation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LawBefore {
    pub start: usize,
    pub name: String,
    pub law_id: Option<String>,
    pub kind: LawKind,
}

/// The character at `pos` continues a word begun by a trailing `の一`.
pub fn branch_is_word_fragment(text: &str, pos: usize) -> bool {
    char_after(text, pos).is_some_and(|c| WORD_AFTER_BRANCH.contains(&c))
}

/// The character at `pos` makes the preceding 同条/本条 part of a word.
pub fn relative_is_word_fragment(text: &str, pos: usize) -> bool {
    char_after(text, pos).is_some_and(|c| WORD_AFTER_RELATIVE.contains(&c))
}

pub fn preceded_by_name_char(text: &str, pos: usize) -> bool {
    char_before(text, pos).is_some_and(is_name_char)
}

/// 同法, 附則 and similar directly before `pos`.
pub fn preceded_by_qualifier(text: &str, pos: usize) -> bool {
    text.get(..pos)
        .is_some_and(|head| QUALIFIERS.iter().any(|q| head.ends_with(q)))
}

/// The citation at `pos` is qualified as a pre-amendment version.
pub fn preceded_by_amendment_clause(text: &str, pos: usize) -> bool {
    text.get(..pos).is_some_and(|head| {
        let head = head.trim_end_matches(|c: char| is_name_char(c) && c != '前');
        head.ends_with("改正前の")
    })
}

/// 準用 appears in the rest of the sentence within `lookahead` characters.
pub fn application_follows(text: &str, pos: usize, lookahead: usize) -> bool {
    sentence_after(text, pos, lookahead).contains("準用")
}

/// 削除 follows directly, ignoring spaces.
pub fn followed_by_deletion(text: &str, pos: usize) -> bool {
    text.get(pos..)
        .is_some_and(|rest| rest.trim_start_matches([' ', '\t', '　']).starts_with("削除"))
}

/// The citation at `pos` opens a range (`第一項から…`).
pub fn starts_range(text: &str, pos: usize) -> bool {
    chars_after(text, pos, 2) == "から"
}

/// The citation at `pos` closes a range (`…から第三項`).
pub fn closes_range(text: &str, pos: usize) -> bool {
    text.get(..pos).is_some_and(|head| head.ends_with("から"))
}

/// The previous character is a katakana letter, so an iroha sub-item
/// marker at `pos` is really inside a word.
pub fn preceded_by_katakana(text: &str, pos: usize) -> bool {
    char_before(text, pos).is_some_and(|c| matches!(c, '\u{30A1}'..='\u{30FA}' | 'ー'))
}

pub fn is_placeholder_law_name(name: &str) -> bool {
    PLACEHOLDER_NAMES.contains(&name)
        || name.chars().count() < 2
        || name.starts_with('同')
        || name.starts_with('本')
        || name.starts_with('第')
        || name.starts_with("当該")
}

pub fn has_law_suffix(name: &str) -> bool {
    LAW_SUFFIXES.iter().any(|s| name.ends_with(s))
}

/// The law title ending exactly at `pos`, if any.
///
/// Registered titles win, then abbreviations, then an unregistered run of
/// name characters ending in a law suffix.
pub fn law_name_before(
    text: &str,
    pos: usize,
    registry: &AbbreviationRegistry,
) -> Option<LawBefore> {
    let head = text.get(..pos)?;
    if let Some(mention) = registry
        .find_laws(head)
        .into_iter()
        .rfind(|m| m.span.end == pos)
    {
        return Some(LawBefore {
            start: mention.span.start,
            name: mention.law.name.clone(),
            law_id: mention.law.law_id(),
            kind: mention.law.kind,
        });
    }

    let run_start = head
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_name_char(*c))
        .take(30)
        .last()
        .map(|(i, _)| i)?;
    let run_start = run_start + title_offset(&head[run_start..]);
    let name = &head[run_start..];
    if let Some(entry) = registry.lookup(name) {
        return Some(LawBefore {
            start: run_start,
            name: entry.full_name.clone(),
            law_id: entry.law_id(),
            kind: entry.category,
        });
    }
    if has_law_suffix(name) && !is_placeholder_law_name(name) {
        return Some(LawBefore {
            start: run_start,
            name: name.to_string(),
            law_id: None,
            kind: LawKind::from_title(name),
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_word_fragments() {
        let text = "第三条の一部";
        let pos = "第三条の一".len();
        assert!(branch_is_word_fragment(text, pos));
        assert!(!branch_is_word_fragment("第三条の二の規定", "第三条の二".len()));
        assert!(!branch_is_word_fragment("第三条の二", "第三条の二".len()));
    }

    #[test]
    fn relative_word_fragments() {
        assert!(relative_is_word_fragment("同条約", "同条".len()));
        assert!(relative_is_word_fragment("本条例", "本条".len()));
        assert!(!relative_is_word_fragment("同条の規定", "同条".len()));
    }

    #[test]
    fn qualifiers() {
        let text = "同法第三条";
        assert!(preceded_by_qualifier(text, "同法".len()));
        assert!(preceded_by_qualifier("附則第二条", "附則".len()));
        assert!(!preceded_by_qualifier("第三条", 0));
        assert!(preceded_by_name_char("民法第三条", "民法".len()));
        assert!(!preceded_by_name_char("及び第三条", "及び".len()));
    }

    #[test]
    fn amendment_clause() {
        let text = "平成十七年法律第八十七号による改正前の商法第二条";
        assert!(preceded_by_amendment_clause(text, text.find("商法").unwrap()));
        assert!(preceded_by_amendment_clause(text, text.find("第二条").unwrap()));
        assert!(!preceded_by_amendment_clause("商法第二条", 0));
    }

    #[test]
    fn application_lookahead_stops_at_sentence_end() {
        let text = "第一条から第三条までの規定は、次の場合に準用する。";
        assert!(application_follows(text, "第一条から第三条まで".len(), 30));
        let text = "第一条の規定による。次条の規定を準用する。";
        assert!(!application_follows(text, "第一条".len(), 30));
        // Outside the window.
        assert!(!application_follows("第一条の規定は、ここに長い説明を置いた上で準用する。", 0, 5));
    }

    #[test]
    fn deletion_and_range_openers() {
        assert!(followed_by_deletion("第三条　削除", "第三条".len()));
        assert!(followed_by_deletion("第三条削除", "第三条".len()));
        assert!(!followed_by_deletion("第三条の規定", "第三条".len()));
        assert!(starts_range("第一項から第三項まで", "第一項".len()));
        assert!(!starts_range("第一項の規定", "第一項".len()));
        assert!(closes_range("第一項から第三項まで", "第一項から".len()));
    }

    #[test]
    fn katakana_before() {
        assert!(preceded_by_katakana("カード", "カ".len()));
        assert!(!preceded_by_katakana("第一号イ", "第一号".len()));
    }

    #[test]
    fn placeholder_names() {
        assert!(is_placeholder_law_name("同法"));
        assert!(is_placeholder_law_name("法律"));
        assert!(is_placeholder_law_name("同法施行規則"));
        assert!(is_placeholder_law_name("政令"));
        assert!(!is_placeholder_law_name("宅地建物取引業法"));
        assert!(has_law_suffix("宅地建物取引業法施行令"));
        assert!(!has_law_suffix("民訴"));
    }

    #[test]
    fn law_names_before_a_citation() {
        let registry = AbbreviationRegistry::builtin().unwrap();

        let text = "及び会社法第二条";
        let law = law_name_before(text, text.find('第').unwrap(), &registry).unwrap();
        assert_eq!(law.name, "会社法");
        assert_eq!(law.law_id.as_deref(), Some("417AC0000000086"));
        assert_eq!(law.start, "及び".len());

        let text = "民訴第百条";
        let law = law_name_before(text, "民訴".len(), &registry).unwrap();
        assert_eq!(law.name, "民事訴訟法");

        let text = "宅地建物取引業法第三条";
        let law = law_name_before(text, text.find('第').unwrap(), &registry).unwrap();
        assert_eq!(law.name, "宅地建物取引業法");
        assert_eq!(law.law_id, None);
        assert_eq!(law.kind, LawKind::Act);

        let text = "私的独占の禁止及び公正取引の確保に関する法律第三条";
        let law = law_name_before(text, text.find("第三条").unwrap(), &registry).unwrap();
        assert_eq!(law.start, 0);
        assert_eq!(law.law_id.as_deref(), Some("322AC0000000054"));

        assert_eq!(law_name_before("この第三条", "この".len(), &registry), None);
        assert_eq!(law_name_before("同法第三条", "同法".len(), &registry), None);
    }
}
