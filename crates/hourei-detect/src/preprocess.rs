//! Text rewriting applied before the collectors run.
//!
//! Parallel citations such as `A施行令第三条及びB施行令第五条` are split
//! by blanking the conjunction between them, so each citation stands on
//! its own. Every rewrite keeps byte length and character boundaries, so
//! spans found in the rewritten text are valid for the original.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static PARALLEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[条項号](?P<conj>、|及び|並びに|又は|若しくは)[\p{Han}\p{Katakana}ー々・]{1,30}?(?:法律|法|令|規則|条例)第",
    )
    .expect("parallel citation pattern is valid")
});

/// Ideographic space; three bytes like every conjunction character.
const BLANK: char = '\u{3000}';

pub fn split_parallel_citations(text: &str) -> Cow<'_, str> {
    let conjunctions: Vec<_> = PARALLEL
        .captures_iter(text)
        .filter_map(|caps| caps.name("conj"))
        .map(|m| m.range())
        .collect();
    if conjunctions.is_empty() {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for range in conjunctions {
        out.push_str(&text[last..range.start]);
        let width = text[range.clone()].len();
        let blanks = width / BLANK.len_utf8();
        out.extend(std::iter::repeat_n(BLANK, blanks));
        last = range.end;
    }
    out.push_str(&text[last..]);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn blanks_conjunction_between_law_citations() {
        let text = "会社法施行令第三条及び金融商品取引法施行令第五条";
        let out = split_parallel_citations(text);
        assert_eq!(out, "会社法施行令第三条\u{3000}\u{3000}金融商品取引法施行令第五条");
        assert_eq!(out.len(), text.len());
    }

    #[test]
    fn every_conjunction_in_a_chain() {
        let text = "甲法第一条、乙法第二条又は丙法第三条";
        let out = split_parallel_citations(text);
        assert_eq!(out, "甲法第一条\u{3000}乙法第二条\u{3000}\u{3000}丙法第三条");
    }

    #[test]
    fn plain_lists_are_untouched() {
        let text = "第三条及び第五条";
        assert!(matches!(split_parallel_citations(text), Cow::Borrowed(_)));
    }
}
