//! Detected cross-references and the rows they become downstream.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of a detected reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// Another article of the same law (`第五条`).
    Internal,
    /// An article of another, named law (`会社法第二条`).
    External,
    /// A positional citation (`前条`, `次項`, `同条`).
    Relative,
    /// A structural unit rather than an article (`第二章`, `附則第三条`).
    Structural,
    /// One member of `第X条から第Y条まで`.
    Range,
    /// One member of a listed chain (`第三条及び第五条`).
    Multiple,
    /// Provisions applied by analogy (準用).
    Application,
    /// Contextual citation with an inferred target (`主務省令`).
    Indirect,
    /// A deleted article (`第三条　削除`).
    Deleted,
    /// One member of a deleted range.
    DeletedRange,
    /// An article as it stood before an amendment.
    PreAmendment,
    /// A sub-item range (`イからホまで`).
    NestedRange,
    /// Chapeau or exclusion structures (`各号列記以外の部分`).
    SpecialStructure,
    /// A proviso or main-text part (`ただし書`).
    Conditional,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 14] = [
        Self::Internal,
        Self::External,
        Self::Relative,
        Self::Structural,
        Self::Range,
        Self::Multiple,
        Self::Application,
        Self::Indirect,
        Self::Deleted,
        Self::DeletedRange,
        Self::PreAmendment,
        Self::NestedRange,
        Self::SpecialStructure,
        Self::Conditional,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::External => "external",
            Self::Relative => "relative",
            Self::Structural => "structural",
            Self::Range => "range",
            Self::Multiple => "multiple",
            Self::Application => "application",
            Self::Indirect => "indirect",
            Self::Deleted => "deleted",
            Self::DeletedRange => "deleted_range",
            Self::PreAmendment => "pre_amendment",
            Self::NestedRange => "nested_range",
            Self::SpecialStructure => "special_structure",
            Self::Conditional => "conditional",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Half-open byte range `[start, end)` into the detected text.
///
/// Offsets always fall on UTF-8 character boundaries of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// True when `other` lies entirely inside this span.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// The covered slice of `text`, if the span is valid for it.
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.start..self.end)
    }
}

/// Metadata keys shared by collectors and consumers.
pub mod meta {
    pub const RANGE_START: &str = "range_start";
    pub const RANGE_END: &str = "range_end";
    pub const RANGE_UNIT: &str = "range_unit";
    pub const EXPANDED_FROM: &str = "expanded_from";
    pub const LAW_KIND: &str = "law_kind";
    pub const LAW_NUMBER: &str = "law_number";
    pub const RELATIVE_MARKER: &str = "relative_marker";
    pub const RELATIVE_OFFSET: &str = "relative_offset";
    pub const RESOLVED: &str = "resolved";
    pub const RESOLVED_FROM: &str = "resolved_from";
    pub const RELATION: &str = "relation";
    pub const APPLICATION: &str = "application";
    pub const INFERRED: &str = "inferred";
    pub const INDIRECT_PHRASE: &str = "indirect_phrase";
    pub const AMENDMENT_LAW_NUMBER: &str = "amendment_law_number";
    pub const AMENDMENT_LAW_ID: &str = "amendment_law_id";
    pub const AMENDMENT_YEAR: &str = "amendment_year";
    pub const SUB_ITEM_START: &str = "sub_item_start";
    pub const SUB_ITEM_END: &str = "sub_item_end";
    pub const SUB_ITEMS: &str = "sub_items";
    pub const STRUCTURE: &str = "structure";
    pub const EXCLUSION: &str = "exclusion";
    pub const CLAUSE_PART: &str = "clause_part";
    pub const UNIT: &str = "unit";
    pub const PART: &str = "part";
    pub const SCOPE: &str = "scope";
    pub const COLLECTOR: &str = "collector";
    pub const LIST_SIZE: &str = "list_size";
}

pub type Metadata = BTreeMap<String, String>;

/// A detected cross-reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "type")]
    pub kind: ReferenceKind,
    #[serde(alias = "text")]
    pub source_text: String,
    pub source_span: Span,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_law_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "targetLaw")]
    pub target_law_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_article: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_paragraph: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_item: Option<String>,
    pub confidence: f32,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Reference {
    pub fn new(kind: ReferenceKind, source_text: impl Into<String>, source_span: Span) -> Self {
        Self {
            kind,
            source_text: source_text.into(),
            source_span,
            target_law_id: None,
            target_law_name: None,
            target_article: None,
            target_paragraph: None,
            target_item: None,
            confidence: 0.0,
            metadata: Metadata::new(),
        }
    }

    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Flatten into a persistence row keyed by source and target provision.
    ///
    /// References without a named target law point into the source law.
    pub fn to_edge(&self, source_law_id: &str, source_article: Option<&str>) -> ReferenceEdge {
        let target_law_id = match (&self.target_law_id, &self.target_law_name) {
            (Some(id), _) => Some(id.clone()),
            (None, Some(_)) => None,
            (None, None) => Some(source_law_id.to_string()),
        };
        ReferenceEdge {
            source_law_id: source_law_id.to_string(),
            source_article: source_article.map(str::to_string),
            target_law_id,
            target_law_name: self.target_law_name.clone(),
            target_article: self.target_article.clone(),
            reference_type: self.kind,
            confidence: self.confidence,
        }
    }
}

/// A reference flattened for relational and graph stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEdge {
    pub source_law_id: String,
    pub source_article: Option<String>,
    pub target_law_id: Option<String>,
    pub target_law_name: Option<String>,
    pub target_article: Option<String>,
    pub reference_type: ReferenceKind,
    pub confidence: f32,
}
