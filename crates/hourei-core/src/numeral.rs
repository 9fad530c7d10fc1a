//! Numeral conversion and sort keys for Japanese provision numbers.
//!
//! Converts between kanji numerals (as printed in statutes) and arabic
//! numbers, and parses article identifiers into a structured form that
//! sorts in document order.
//!
//! # Japanese numbering conventions
//!
//! - Articles: 第一条, 第二条, ..., 第十条, 第百二十三条
//! - Branch numbers (枝番号) for inserted articles: 第三条の二 sits between
//!   第三条 and 第四条; 第三条の二の二 after 第三条の二
//! - The "一" multiplier is omitted immediately before 十/百/千 (十五, 百, 千二),
//!   but kept before 万 (一万)
//! - Digit-run forms (一〇〇) and full-width digits (１００) also appear in
//!   tables and notices

use std::fmt;

use serde::{Deserialize, Serialize};

/// Value of a single digit character (kanji, ASCII, or full-width), if any.
fn digit_value(c: char) -> Option<u32> {
    match c {
        '〇' | '零' => Some(0),
        '一' | '壱' => Some(1),
        '二' | '弐' => Some(2),
        '三' | '参' => Some(3),
        '四' => Some(4),
        '五' => Some(5),
        '六' => Some(6),
        '七' => Some(7),
        '八' => Some(8),
        '九' => Some(9),
        '0'..='9' => c.to_digit(10),
        '０'..='９' => Some(c as u32 - '０' as u32),
        _ => None,
    }
}

/// Multiplier of a magnitude character below 万.
fn small_magnitude(c: char) -> Option<u32> {
    match c {
        '十' | '拾' => Some(10),
        '百' => Some(100),
        '千' => Some(1000),
        _ => None,
    }
}

/// True for any character that can appear inside a provision numeral.
pub fn is_numeral_char(c: char) -> bool {
    digit_value(c).is_some() || small_magnitude(c).is_some() || c == '万'
}

/// Convert a kanji (or digit) numeral to its arabic value.
///
/// Strips a leading 第 and a trailing 条, passes plain digit strings
/// through, and otherwise applies positional-magnitude parsing.
/// Unparseable input yields 0.
///
/// # Algorithm
///
/// 1. A run of digit characters accumulates positionally (一〇〇 = 100)
/// 2. 十/百/千 multiply the pending digit run, or 1 when it is empty
///    (十五 = 15), and add into the current 万-group
/// 3. 万 closes the current group and adds `group × 10000`
/// 4. The result is `groups + section + pending digits`
pub fn kanji_to_arabic(s: &str) -> u32 {
    let s = s.trim();
    let s = s.strip_prefix('第').unwrap_or(s);
    let s = s.strip_suffix('条').unwrap_or(s);
    if s.is_empty() {
        return 0;
    }
    parse_numeral(s).unwrap_or(0)
}

fn parse_numeral(s: &str) -> Option<u32> {
    let mut total: u32 = 0;
    let mut section: u32 = 0;
    let mut pending: Option<u32> = None;

    for c in s.chars() {
        if let Some(d) = digit_value(c) {
            pending = Some(pending.unwrap_or(0).checked_mul(10)?.checked_add(d)?);
        } else if let Some(mag) = small_magnitude(c) {
            let multiplier = pending.take().unwrap_or(1);
            section = section.checked_add(multiplier.checked_mul(mag)?)?;
        } else if c == '万' {
            let group = section.checked_add(pending.take().unwrap_or(0))?;
            let group = if group == 0 { 1 } else { group };
            total = total.checked_add(group.checked_mul(10_000)?)?;
            section = 0;
        } else {
            return None;
        }
    }

    total.checked_add(section)?.checked_add(pending.unwrap_or(0))
}

const KANJI_DIGITS: [char; 10] = ['〇', '一', '二', '三', '四', '五', '六', '七', '八', '九'];

/// Format a number below 10000 in kanji, omitting 一 before 十/百/千.
fn format_below_man(n: u32, out: &mut String) {
    for (mag, ch) in [(1000, '千'), (100, '百'), (10, '十')] {
        let d = (n / mag) % 10;
        if d > 0 {
            if d > 1 {
                out.push(KANJI_DIGITS[d as usize]);
            }
            out.push(ch);
        }
    }
    let ones = n % 10;
    if ones > 0 {
        out.push(KANJI_DIGITS[ones as usize]);
    }
}

/// Convert an arabic number to a kanji numeral (`123` → `百二十三`).
///
/// Zero yields an empty string.
pub fn arabic_to_kanji(n: u32) -> String {
    let mut out = String::new();
    let oku = n / 100_000_000;
    let man = (n / 10_000) % 10_000;
    let rest = n % 10_000;
    if oku > 0 {
        format_below_man(oku, &mut out);
        out.push('億');
    }
    if man > 0 {
        format_below_man(man, &mut out);
        out.push('万');
    }
    format_below_man(rest, &mut out);
    out
}

/// Format an article number: `5` → `第五条`. Zero yields an empty string.
pub fn arabic_to_kanji_article(n: u32) -> String {
    if n == 0 {
        return String::new();
    }
    format!("第{}条", arabic_to_kanji(n))
}

/// Format a paragraph number: `2` → `第二項`.
pub fn paragraph_label(n: u32) -> String {
    if n == 0 {
        return String::new();
    }
    format!("第{}項", arabic_to_kanji(n))
}

/// Format an item number: `3` → `第三号`.
pub fn item_label(n: u32) -> String {
    if n == 0 {
        return String::new();
    }
    format!("第{}号", arabic_to_kanji(n))
}

/// A structured article number with optional branch numbers (枝番号).
///
/// Ordering follows document order: 第三条 < 第三条の二 < 第三条の三 < 第四条.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArticleNumber {
    pub main: u32,
    pub branches: Vec<u32>,
}

impl ArticleNumber {
    pub fn new(main: u32) -> Self {
        Self {
            main,
            branches: Vec::new(),
        }
    }

    pub fn with_branches(main: u32, branches: Vec<u32>) -> Self {
        Self { main, branches }
    }

    /// Parse `第三条の二`, `第3条`, `三条の二の三`, or a bare numeral.
    ///
    /// Returns `None` when the main number is missing or zero, or when
    /// anything other than `の<numeral>` branches follows the 条 marker.
    pub fn parse(s: &str) -> Option<Self> {
        let (article, rest) = split_article(s.trim())?;
        if !rest.is_empty() {
            return None;
        }
        Some(article)
    }

    pub fn has_branches(&self) -> bool {
        !self.branches.is_empty()
    }

    /// Shift by `delta` articles, dropping branch numbers.
    ///
    /// Stepping back from a branch article lands on its main article
    /// (第五条の二 − 1 = 第五条). Returns `None` below 第一条.
    pub fn offset(&self, delta: i64) -> Option<Self> {
        if delta == 0 {
            return Some(self.clone());
        }
        let base = i64::from(self.main);
        let target = if delta < 0 && self.has_branches() {
            base + delta + 1
        } else {
            base + delta
        };
        let main = u32::try_from(target).ok().filter(|m| *m > 0)?;
        Some(Self::new(main))
    }

    /// Lexicographically-sortable key: main and up to two branch levels,
    /// zero-padded to four digits (`第三条の二` → `0003.0002.0000`).
    pub fn sort_key(&self) -> String {
        let b1 = self.branches.first().copied().unwrap_or(0);
        let b2 = self.branches.get(1).copied().unwrap_or(0);
        format!("{:04}.{:04}.{:04}", self.main, b1, b2)
    }
}

impl fmt::Display for ArticleNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "第{}条", arabic_to_kanji(self.main))?;
        for b in &self.branches {
            write!(f, "の{}", arabic_to_kanji(*b))?;
        }
        Ok(())
    }
}

/// Split a leading article number off `s`, returning the unparsed rest.
fn split_article(s: &str) -> Option<(ArticleNumber, &str)> {
    let s = s.strip_prefix('第').unwrap_or(s);
    let main_end = s.find(|c: char| !is_numeral_char(c)).unwrap_or(s.len());
    let main = parse_numeral(&s[..main_end]).filter(|m| *m > 0)?;
    let mut rest = &s[main_end..];
    rest = rest.strip_prefix('条').unwrap_or(rest);

    let mut branches = Vec::new();
    while let Some(after) = rest.strip_prefix('の') {
        let end = after
            .find(|c: char| !is_numeral_char(c))
            .unwrap_or(after.len());
        match parse_numeral(&after[..end]) {
            Some(b) if end > 0 && b > 0 => {
                branches.push(b);
                rest = &after[end..];
            }
            _ => break,
        }
    }
    Some((ArticleNumber::with_branches(main, branches), rest))
}

/// Current position within a law: an article plus optional paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProvisionId {
    pub article: ArticleNumber,
    pub paragraph: Option<u32>,
}

impl ProvisionId {
    pub fn article(article: ArticleNumber) -> Self {
        Self {
            article,
            paragraph: None,
        }
    }

    /// Parse `第五条`, `第五条の二`, or `第五条第二項`.
    pub fn parse(s: &str) -> Option<Self> {
        let (article, rest) = split_article(s.trim())?;
        if rest.is_empty() {
            return Some(Self::article(article));
        }
        let para = rest.strip_prefix('第')?.strip_suffix('項')?;
        let paragraph = parse_numeral(para).filter(|p| *p > 0)?;
        Some(Self {
            article,
            paragraph: Some(paragraph),
        })
    }
}

impl fmt::Display for ProvisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.article)?;
        if let Some(p) = self.paragraph {
            write!(f, "{}", paragraph_label(p))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Helper: assert a list of article ids produces sort keys in strictly ascending order.
    fn assert_sorted_order(inputs: &[&str]) {
        let keys: Vec<String> = inputs
            .iter()
            .map(|s| ArticleNumber::parse(s).expect("parseable").sort_key())
            .collect();
        for i in 1..keys.len() {
            assert!(
                keys[i - 1] < keys[i],
                "Expected {:?} ({}) < {:?} ({})",
                inputs[i - 1],
                keys[i - 1],
                inputs[i],
                keys[i],
            );
        }
    }

    #[test]
    fn kanji_basic_values() {
        assert_eq!(kanji_to_arabic("一"), 1);
        assert_eq!(kanji_to_arabic("十"), 10);
        assert_eq!(kanji_to_arabic("十五"), 15);
        assert_eq!(kanji_to_arabic("二十"), 20);
        assert_eq!(kanji_to_arabic("百二十三"), 123);
        assert_eq!(kanji_to_arabic("五百"), 500);
        assert_eq!(kanji_to_arabic("千"), 1000);
        assert_eq!(kanji_to_arabic("二千三百四十五"), 2345);
        assert_eq!(kanji_to_arabic("九千九百九十九"), 9999);
        assert_eq!(kanji_to_arabic("一万"), 10_000);
        assert_eq!(kanji_to_arabic("三万二千"), 32_000);
    }

    #[test]
    fn markers_are_stripped() {
        assert_eq!(kanji_to_arabic("第五条"), 5);
        assert_eq!(kanji_to_arabic("第百条"), 100);
        assert_eq!(kanji_to_arabic("  第十二条 "), 12);
    }

    #[test]
    fn digit_strings_pass_through() {
        assert_eq!(kanji_to_arabic("42"), 42);
        assert_eq!(kanji_to_arabic("第3条"), 3);
        assert_eq!(kanji_to_arabic("１２"), 12);
        assert_eq!(kanji_to_arabic("一〇〇"), 100);
    }

    #[test]
    fn unparseable_yields_zero() {
        assert_eq!(kanji_to_arabic(""), 0);
        assert_eq!(kanji_to_arabic("第条"), 0);
        assert_eq!(kanji_to_arabic("abc"), 0);
        assert_eq!(kanji_to_arabic("前"), 0);
        assert_eq!(kanji_to_arabic("99999999999999"), 0);
    }

    #[test]
    fn kanji_formatting() {
        assert_eq!(arabic_to_kanji(0), "");
        assert_eq!(arabic_to_kanji(1), "一");
        assert_eq!(arabic_to_kanji(10), "十");
        assert_eq!(arabic_to_kanji(11), "十一");
        assert_eq!(arabic_to_kanji(110), "百十");
        assert_eq!(arabic_to_kanji(1001), "千一");
        assert_eq!(arabic_to_kanji(2020), "二千二十");
        assert_eq!(arabic_to_kanji(10_000), "一万");
        assert_eq!(arabic_to_kanji(15_300), "一万五千三百");
    }

    #[test]
    fn labels() {
        assert_eq!(arabic_to_kanji_article(500), "第五百条");
        assert_eq!(arabic_to_kanji_article(0), "");
        assert_eq!(paragraph_label(1), "第一項");
        assert_eq!(item_label(13), "第十三号");
    }

    #[test]
    fn article_parse_and_display() {
        let a = ArticleNumber::parse("第三条の二").unwrap();
        assert_eq!(a, ArticleNumber::with_branches(3, vec![2]));
        assert_eq!(a.to_string(), "第三条の二");

        let b = ArticleNumber::parse("第3条の2の3").unwrap();
        assert_eq!(b.to_string(), "第三条の二の三");

        assert_eq!(ArticleNumber::parse("十二").unwrap().main, 12);
        assert!(ArticleNumber::parse("第条").is_none());
        assert!(ArticleNumber::parse("第三条第二項").is_none());
    }

    #[test]
    fn branch_sort_order() {
        assert_sorted_order(&["第三条", "第三条の二", "第三条の二の二", "第三条の三", "第四条"]);
        assert_sorted_order(&["第九条", "第十条", "第十一条", "第百条"]);
    }

    #[test]
    fn exact_sort_keys() {
        assert_eq!(ArticleNumber::new(3).sort_key(), "0003.0000.0000");
        assert_eq!(
            ArticleNumber::with_branches(3, vec![2]).sort_key(),
            "0003.0002.0000"
        );
        assert_eq!(
            ArticleNumber::with_branches(19, vec![4, 1]).sort_key(),
            "0019.0004.0001"
        );
    }

    #[test]
    fn offsets() {
        let five = ArticleNumber::new(5);
        assert_eq!(five.offset(-1), Some(ArticleNumber::new(4)));
        assert_eq!(five.offset(1), Some(ArticleNumber::new(6)));
        assert_eq!(five.offset(0), Some(five.clone()));
        assert_eq!(ArticleNumber::new(1).offset(-1), None);

        let branch = ArticleNumber::with_branches(5, vec![2]);
        assert_eq!(branch.offset(-1), Some(ArticleNumber::new(5)));
        assert_eq!(branch.offset(-2), Some(ArticleNumber::new(4)));
        assert_eq!(branch.offset(1), Some(ArticleNumber::new(6)));
    }

    #[test]
    fn provision_ids() {
        let p = ProvisionId::parse("第五条第二項").unwrap();
        assert_eq!(p.article, ArticleNumber::new(5));
        assert_eq!(p.paragraph, Some(2));
        assert_eq!(p.to_string(), "第五条第二項");

        let q = ProvisionId::parse("第五条の二").unwrap();
        assert_eq!(q.paragraph, None);
        assert!(ProvisionId::parse("第五条第二号").is_none());
        assert!(ProvisionId::parse("前条").is_none());
    }

    proptest! {
        #[test]
        fn kanji_roundtrip(n in 1u32..=9999) {
            prop_assert_eq!(kanji_to_arabic(&arabic_to_kanji_article(n)), n);
        }

        #[test]
        fn article_display_roundtrip(main in 1u32..=3000, branch in 0u32..=20) {
            let branches = if branch == 0 { vec![] } else { vec![branch] };
            let a = ArticleNumber::with_branches(main, branches);
            prop_assert_eq!(ArticleNumber::parse(&a.to_string()), Some(a));
        }

        #[test]
        fn never_panics(s in "\\PC{0,12}") {
            let _ = kanji_to_arabic(&s);
            let _ = ArticleNumber::parse(&s);
            let _ = ProvisionId::parse(&s);
        }
    }
}
