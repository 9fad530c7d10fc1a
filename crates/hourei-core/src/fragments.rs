//! Regex fragments for provision numbers, shared by the registry and the
//! pattern collectors.

use std::sync::LazyLock;

use regex::Regex;

/// One numeral: kanji, ASCII, or full-width digits plus magnitudes.
pub const NUM: &str = "[0-9０-９〇零一二三四五六七八九十百千万壱弐参拾]+";

/// `第N条` with optional branch numbers; groups: main, branches.
pub const ARTICLE: &str =
    "第([0-9０-９〇零一二三四五六七八九十百千万壱弐参拾]+)条((?:の[0-9０-９〇一二三四五六七八九十百千]+)*)";

/// `第N項`; group: number.
pub const PARAGRAPH: &str = "第([0-9０-９〇零一二三四五六七八九十百千]+)項";

/// `第N号`; group: number.
pub const ITEM: &str = "第([0-9０-９〇零一二三四五六七八九十百千]+)号";

/// Article, optional paragraph, optional item, anchored at the start.
/// Groups: 1 main, 2 branches, 3 paragraph, 4 item.
pub static PROVISION_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{ARTICLE}(?:{PARAGRAPH})?(?:{ITEM})?"))
        .expect("provision suffix pattern is valid")
});

/// Characters that can continue a law title: kanji, 々, katakana, ー.
pub fn is_name_char(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'
        | '\u{3400}'..='\u{4DBF}'
        | '々' | '〆' | 'ヶ'
        | '\u{30A1}'..='\u{30FA}'
        | 'ー' | '・')
}

/// A clause such as `同項中` or `規定中` that runs straight into a law
/// title in amending text.
const CLAUSE: &str = "(?:[条項号]|規定|本文|字句|部分)中";

static CLAUSE_AT_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("{CLAUSE}$")).expect("clause pattern is valid"));

static CLAUSE_LEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^.*{CLAUSE}")).expect("clause pattern is valid"));

/// True when a law title may begin at byte offset `pos`: nothing of a
/// longer name comes before it, or only a `…中` clause does.
pub fn title_starts_at(text: &str, pos: usize) -> bool {
    match char_before(text, pos) {
        None => true,
        Some(c) if !is_name_char(c) => true,
        Some(_) => text.get(..pos).is_some_and(|head| CLAUSE_AT_END.is_match(head)),
    }
}

/// Byte offset where the title proper starts once a leading `…中` clause
/// is cut off (`規定中民法` → 9).
pub fn title_offset(title: &str) -> usize {
    CLAUSE_LEADING.find(title).map(|m| m.end()).unwrap_or(0)
}

/// Last character before byte offset `pos`.
pub fn char_before(text: &str, pos: usize) -> Option<char> {
    text.get(..pos)?.chars().next_back()
}

/// First character at or after byte offset `pos`.
pub fn char_after(text: &str, pos: usize) -> Option<char> {
    text.get(pos..)?.chars().next()
}

/// Up to `n` characters starting at byte offset `pos`.
pub fn chars_after(text: &str, pos: usize, n: usize) -> &str {
    let Some(rest) = text.get(pos..) else {
        return "";
    };
    let end = rest
        .char_indices()
        .nth(n)
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    &rest[..end]
}

/// Up to `n` characters ending at byte offset `pos`.
pub fn chars_before(text: &str, pos: usize, n: usize) -> &str {
    let Some(head) = text.get(..pos) else {
        return "";
    };
    let start = head
        .char_indices()
        .rev()
        .nth(n.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    if n == 0 { "" } else { &head[start..] }
}

/// Remainder of the sentence from `pos`, capped at `n` characters.
pub fn sentence_after(text: &str, pos: usize, n: usize) -> &str {
    let window = chars_after(text, pos, n);
    match window.find('。') {
        Some(i) => &window[..i],
        None => window,
    }
}
