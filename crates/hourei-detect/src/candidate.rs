//! Internal detection candidates: a reference plus the bookkeeping the
//! conflict resolver needs. Candidates never leave the crate's pipeline.

use hourei_core::{Reference, ReferenceKind, Span, meta};

/// Conflict-resolution priority per collector category; higher wins.
pub mod priority {
    pub const EXTERNAL: u8 = 10;
    pub const PRE_AMENDMENT: u8 = 9;
    pub const SAME_LAW_RESOLVED: u8 = 10;
    pub const COMPOSITE: u8 = 9;
    pub const LAW_TYPE: u8 = 9;
    pub const DELETED: u8 = 9;
    pub const UNREGISTERED_LAW: u8 = 8;
    pub const RANGE: u8 = 8;
    pub const RANGE_BRANCHED: u8 = 7;
    pub const APPLICATION: u8 = 7;
    pub const MULTIPLE: u8 = 6;
    pub const RELATIVE: u8 = 6;
    pub const STRUCTURAL: u8 = 6;
    pub const INTERNAL: u8 = 5;
    pub const LAW_MENTION: u8 = 4;
    pub const NESTED: u8 = 4;
    pub const RELATIVE_UNRESOLVED: u8 = 3;
    pub const INDIRECT: u8 = 2;
}

/// Confidence per source reliability.
pub mod confidence {
    pub const EXTERNAL: f32 = 0.95;
    pub const RELATIVE_RESOLVED: f32 = 0.95;
    pub const COMPOSITE: f32 = 0.9;
    pub const DELETED: f32 = 0.9;
    pub const PRE_AMENDMENT: f32 = 0.9;
    pub const RANGE: f32 = 0.85;
    pub const APPLICATION: f32 = 0.85;
    pub const LAW_TYPE: f32 = 0.85;
    pub const SAME_LAW: f32 = 0.85;
    pub const INTERNAL: f32 = 0.8;
    pub const MULTIPLE: f32 = 0.8;
    pub const STRUCTURAL: f32 = 0.8;
    pub const LAW_MENTION: f32 = 0.75;
    pub const NESTED: f32 = 0.7;
    pub const INTERNAL_NO_ARTICLE: f32 = 0.7;
    pub const INDIRECT_GUESS: f32 = 0.6;
    pub const INDIRECT: f32 = 0.5;
    pub const RELATIVE_UNRESOLVED: f32 = 0.5;
}

/// A reference proposed by one collector, before conflict resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub reference: Reference,
    pub priority: u8,
    /// Range members are never deduplicated against each other.
    pub is_range_member: bool,
    /// (collector registration index, emission index); assigned by the engine.
    pub(crate) order: (usize, usize),
}

impl Candidate {
    /// A candidate whose source text is the span's slice of `text`.
    ///
    /// Returns `None` for empty or out-of-bounds spans.
    pub fn new(
        kind: ReferenceKind,
        text: &str,
        span: Span,
        priority: u8,
        confidence: f32,
    ) -> Option<Self> {
        if span.is_empty() {
            return None;
        }
        let source = span.slice(text)?;
        let mut reference = Reference::new(kind, source, span);
        reference.confidence = confidence;
        Some(Self {
            reference,
            priority,
            is_range_member: false,
            order: (0, 0),
        })
    }

    pub fn span(&self) -> Span {
        self.reference.source_span
    }

    pub fn kind(&self) -> ReferenceKind {
        self.reference.kind
    }

    pub fn target_article(&self) -> Option<&str> {
        self.reference.target_article.as_deref()
    }

    pub fn with_article(mut self, article: impl Into<String>) -> Self {
        self.reference.target_article = Some(article.into());
        self
    }

    pub fn with_paragraph(mut self, paragraph: Option<String>) -> Self {
        self.reference.target_paragraph = paragraph;
        self
    }

    pub fn with_item(mut self, item: Option<String>) -> Self {
        self.reference.target_item = item;
        self
    }

    pub fn with_law(mut self, name: Option<String>, id: Option<String>) -> Self {
        self.reference.target_law_name = name;
        self.reference.target_law_id = id;
        self
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<String>) -> Self {
        self.reference.metadata.insert(key.to_string(), value.into());
        self
    }

    /// Mark as one member of a range spanning `start..=end`.
    pub fn as_range_member(mut self, start: &str, end: &str, unit: &str) -> Self {
        self.is_range_member = true;
        self.reference
            .metadata
            .insert(meta::RANGE_START.to_string(), start.to_string());
        self.reference
            .metadata
            .insert(meta::RANGE_END.to_string(), end.to_string());
        self.reference
            .metadata
            .insert(meta::RANGE_UNIT.to_string(), unit.to_string());
        self
    }

    pub fn into_reference(self) -> Reference {
        self.reference
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_text_is_span_slice() {
        let text = "第一条の規定";
        let c = Candidate::new(
            ReferenceKind::Internal,
            text,
            Span::new(0, "第一条".len()),
            priority::INTERNAL,
            confidence::INTERNAL,
        )
        .unwrap();
        assert_eq!(c.reference.source_text, "第一条");
        assert_eq!(c.priority, 5);
    }

    #[test]
    fn rejects_bad_spans() {
        let text = "第一条";
        assert!(Candidate::new(ReferenceKind::Internal, text, Span::new(3, 3), 5, 0.8).is_none());
        assert!(Candidate::new(ReferenceKind::Internal, text, Span::new(0, 99), 5, 0.8).is_none());
        assert!(Candidate::new(ReferenceKind::Internal, text, Span::new(1, 3), 5, 0.8).is_none());
    }

    #[test]
    fn range_member_metadata() {
        let c = Candidate::new(ReferenceKind::Range, "第一条から第三条まで", Span::new(0, 9), 8, 0.85)
            .unwrap()
            .as_range_member("第一条", "第三条", "条");
        assert!(c.is_range_member);
        assert_eq!(c.reference.meta(meta::RANGE_START), Some("第一条"));
        assert_eq!(c.reference.meta(meta::RANGE_END), Some("第三条"));
    }
}
