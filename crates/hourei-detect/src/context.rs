//! Sequential document-position state for one law.
//!
//! A tracker belongs to exactly one caller walking one law's articles in
//! order. It is never shared between threads and never resets on its own:
//! call [`ContextTracker::reset`] between laws.

use std::collections::VecDeque;

use hourei_core::{ArticleNumber, ProvisionId};
use tracing::{debug, info};

/// How many provisions the history remembers.
pub const HISTORY_LIMIT: usize = 10;

/// Unit addressed by a relative marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeUnit {
    Article,
    Paragraph,
    Item,
}

impl RelativeUnit {
    pub fn from_marker(c: char) -> Option<Self> {
        match c {
            '条' => Some(Self::Article),
            '項' => Some(Self::Paragraph),
            '号' => Some(Self::Item),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Self::Article => '条',
            Self::Paragraph => '項',
            Self::Item => '号',
        }
    }
}

/// A relative citation resolved against the current position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Article(ArticleNumber),
    Paragraph { article: ArticleNumber, paragraph: u32 },
    Articles(Vec<ArticleNumber>),
    Paragraphs { article: ArticleNumber, paragraphs: Vec<u32> },
}

#[derive(Debug, Clone, Default)]
pub struct ContextTracker {
    current_law_id: Option<String>,
    current: Option<ProvisionId>,
    history: VecDeque<ProvisionId>,
    /// Law names in first-seen order.
    detected_laws: Vec<String>,
}

impl ContextTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to `provision`, pushing it onto the bounded history.
    pub fn advance(&mut self, provision: ProvisionId) {
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(provision.clone());
        debug!(provision = %provision, "context advanced");
        self.current = Some(provision);
    }

    /// Forget position, history, and detected laws. The law id is kept
    /// unless changed with [`ContextTracker::set_law`].
    pub fn reset(&mut self) {
        self.current = None;
        self.history.clear();
        self.detected_laws.clear();
        info!(law_id = ?self.current_law_id, "context reset");
    }

    pub fn set_law(&mut self, law_id: Option<String>) {
        self.current_law_id = law_id;
    }

    pub fn current_law_id(&self) -> Option<&str> {
        self.current_law_id.as_deref()
    }

    pub fn current(&self) -> Option<&ProvisionId> {
        self.current.as_ref()
    }

    pub fn current_article(&self) -> Option<&ArticleNumber> {
        self.current.as_ref().map(|p| &p.article)
    }

    pub fn current_paragraph(&self) -> Option<u32> {
        self.current.as_ref().and_then(|p| p.paragraph)
    }

    pub fn history(&self) -> impl Iterator<Item = &ProvisionId> {
        self.history.iter()
    }

    pub fn note_law(&mut self, name: &str) {
        if !self.detected_laws.iter().any(|l| l == name) {
            self.detected_laws.push(name.to_string());
        }
    }

    pub fn detected_laws(&self) -> &[String] {
        &self.detected_laws
    }

    /// The law most recently added to the detected set.
    pub fn most_recent_law(&self) -> Option<&str> {
        self.detected_laws.last().map(String::as_str)
    }

    /// Resolve a single relative step. Offset 0 is the same unit (同条, 本項).
    ///
    /// Items are never resolved: the tracker does not follow item position.
    pub fn resolve(&self, unit: RelativeUnit, offset: i64) -> Option<Resolution> {
        let current = self.current.as_ref()?;
        match unit {
            RelativeUnit::Article => current.article.offset(offset).map(Resolution::Article),
            RelativeUnit::Paragraph => {
                let paragraph = shift(current.paragraph?, offset)?;
                Some(Resolution::Paragraph {
                    article: current.article.clone(),
                    paragraph,
                })
            }
            RelativeUnit::Item => None,
        }
    }

    /// Resolve a generalized span such as 前二条 (`-2..=-1`) or 次三項
    /// (`1..=3`). Out-of-document members make the whole span unresolved.
    pub fn resolve_span(&self, unit: RelativeUnit, from: i64, to: i64) -> Option<Resolution> {
        let current = self.current.as_ref()?;
        if from > to {
            return None;
        }
        match unit {
            RelativeUnit::Article => {
                let members = (from..=to)
                    .map(|d| current.article.offset(d))
                    .collect::<Option<Vec<_>>>()?;
                Some(Resolution::Articles(members))
            }
            RelativeUnit::Paragraph => {
                let base = current.paragraph?;
                let paragraphs = (from..=to)
                    .map(|d| shift(base, d))
                    .collect::<Option<Vec<_>>>()?;
                Some(Resolution::Paragraphs {
                    article: current.article.clone(),
                    paragraphs,
                })
            }
            RelativeUnit::Item => None,
        }
    }

    /// 前各項: every paragraph before the current one.
    pub fn preceding_paragraphs(&self) -> Option<Resolution> {
        let current = self.current.as_ref()?;
        let paragraph = current.paragraph?;
        if paragraph < 2 {
            return None;
        }
        Some(Resolution::Paragraphs {
            article: current.article.clone(),
            paragraphs: (1..paragraph).collect(),
        })
    }

    /// Compact description of the state that changes detection output,
    /// used to discriminate cache entries.
    pub fn discriminator(&self) -> String {
        format!(
            "{}|{}",
            self.current_law_id.as_deref().unwrap_or(""),
            self.current
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default()
        )
    }
}

fn shift(base: u32, delta: i64) -> Option<u32> {
    u32::try_from(i64::from(base) + delta)
        .ok()
        .filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> ContextTracker {
        let mut ctx = ContextTracker::new();
        ctx.advance(ProvisionId::parse(s).unwrap());
        ctx
    }

    #[test]
    fn resolves_neighbouring_articles() {
        let ctx = at("第五条");
        assert_eq!(
            ctx.resolve(RelativeUnit::Article, -1),
            Some(Resolution::Article(ArticleNumber::new(4)))
        );
        assert_eq!(
            ctx.resolve(RelativeUnit::Article, 1),
            Some(Resolution::Article(ArticleNumber::new(6)))
        );
        assert_eq!(
            ctx.resolve(RelativeUnit::Article, 0),
            Some(Resolution::Article(ArticleNumber::new(5)))
        );
    }

    #[test]
    fn branch_article_steps_back_to_main() {
        let ctx = at("第五条の二");
        assert_eq!(
            ctx.resolve(RelativeUnit::Article, -1),
            Some(Resolution::Article(ArticleNumber::new(5)))
        );
        assert_eq!(
            ctx.resolve(RelativeUnit::Article, 0),
            Some(Resolution::Article(ArticleNumber::with_branches(5, vec![2])))
        );
    }

    #[test]
    fn nothing_resolves_without_context() {
        let ctx = ContextTracker::new();
        assert_eq!(ctx.resolve(RelativeUnit::Article, 0), None);
        assert_eq!(ctx.resolve(RelativeUnit::Article, -1), None);
        assert_eq!(ctx.resolve_span(RelativeUnit::Article, -2, -1), None);
    }

    #[test]
    fn first_article_has_no_predecessor() {
        let ctx = at("第一条");
        assert_eq!(ctx.resolve(RelativeUnit::Article, -1), None);
        assert_eq!(ctx.resolve_span(RelativeUnit::Article, -2, -1), None);
    }

    #[test]
    fn preceding_n_articles_is_a_span() {
        let ctx = at("第十条");
        assert_eq!(
            ctx.resolve_span(RelativeUnit::Article, -2, -1),
            Some(Resolution::Articles(vec![
                ArticleNumber::new(8),
                ArticleNumber::new(9)
            ]))
        );
    }

    #[test]
    fn paragraphs_need_a_current_paragraph() {
        assert_eq!(at("第三条").resolve(RelativeUnit::Paragraph, -1), None);
        let ctx = at("第三条第三項");
        assert_eq!(
            ctx.resolve(RelativeUnit::Paragraph, -1),
            Some(Resolution::Paragraph {
                article: ArticleNumber::new(3),
                paragraph: 2
            })
        );
        assert_eq!(
            ctx.preceding_paragraphs(),
            Some(Resolution::Paragraphs {
                article: ArticleNumber::new(3),
                paragraphs: vec![1, 2]
            })
        );
        assert_eq!(at("第三条第一項").preceding_paragraphs(), None);
    }

    #[test]
    fn items_are_never_resolved() {
        assert_eq!(at("第三条第一項").resolve(RelativeUnit::Item, -1), None);
    }

    #[test]
    fn history_is_bounded() {
        let mut ctx = ContextTracker::new();
        for n in 1..=15 {
            ctx.advance(ProvisionId::article(ArticleNumber::new(n)));
        }
        let history: Vec<u32> = ctx.history().map(|p| p.article.main).collect();
        assert_eq!(history, (6..=15).collect::<Vec<_>>());
        assert_eq!(ctx.current_article(), Some(&ArticleNumber::new(15)));
    }

    #[test]
    fn reset_is_explicit_and_complete() {
        let mut ctx = at("第五条");
        ctx.set_law(Some("129AC0000000089".into()));
        ctx.note_law("会社法");
        ctx.note_law("民法");
        ctx.note_law("会社法");
        assert_eq!(ctx.detected_laws(), ["会社法", "民法"]);
        assert_eq!(ctx.most_recent_law(), Some("民法"));

        ctx.reset();
        assert!(ctx.current().is_none());
        assert_eq!(ctx.history().count(), 0);
        assert!(ctx.detected_laws().is_empty());
        assert_eq!(ctx.current_law_id(), Some("129AC0000000089"));
    }
}
