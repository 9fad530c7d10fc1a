//! Final clean-up of resolved candidates into returned references.

use hourei_core::fragments::sentence_after;
use hourei_core::{AbbreviationRegistry, Reference, meta};
use tracing::debug;

use crate::candidate::Candidate;

/// How far past a citation the relation phrase is searched, in characters.
const RELATION_WINDOW: usize = 40;

/// How the citing sentence uses the cited provision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Replace,
    Apply,
    Deem,
    Follow,
    BasedOn,
    According,
    Other,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Apply => "apply",
            Self::Deem => "deem",
            Self::Follow => "follow",
            Self::BasedOn => "based_on",
            Self::According => "according_to",
            Self::Other => "other",
        }
    }
}

/// Classify the rest of the sentence following a citation.
pub fn classify_relation(following: &str) -> Relation {
    if following.contains("読み替") || following.contains("読替") {
        Relation::Replace
    } else if following.contains("準用") {
        Relation::Apply
    } else if following.contains("みなす") {
        Relation::Deem
    } else if ["なお従前の例", "なお効力を有する", "従う"]
        .iter()
        .any(|p| following.contains(p))
    {
        Relation::Follow
    } else if following.contains("に基づ") {
        Relation::BasedOn
    } else if following.contains("により") || following.contains("による") {
        Relation::According
    } else {
        Relation::Other
    }
}

/// Turn surviving candidates into references against the original text.
///
/// Source text is re-sliced from `original`, so preprocessing never leaks
/// into the output. Candidates whose span does not fit the original are
/// dropped. Confidence is clamped to `[0, 1]`, missing law names and ids
/// are filled from the registry, and the result is ordered by start offset.
pub fn normalize(
    original: &str,
    candidates: Vec<Candidate>,
    registry: &AbbreviationRegistry,
    min_confidence: f32,
) -> Vec<Reference> {
    let before = candidates.len();
    let mut out: Vec<Reference> = candidates
        .into_iter()
        .filter_map(|c| finish(original, c.into_reference(), registry))
        .filter(|r| r.confidence >= min_confidence)
        .collect();
    out.sort_by_key(|r| r.source_span.start);
    if out.len() != before {
        debug!(before, after = out.len(), "normalization dropped references");
    }
    out
}

fn finish(original: &str, mut r: Reference, registry: &AbbreviationRegistry) -> Option<Reference> {
    let span = r.source_span;
    let source = span.slice(original).filter(|s| !s.is_empty())?;
    r.source_text = source.to_string();

    r.confidence = if r.confidence.is_nan() {
        0.0
    } else {
        r.confidence.clamp(0.0, 1.0)
    };

    match (&r.target_law_name, &r.target_law_id) {
        (None, Some(id)) => r.target_law_name = registry.law_name_for_id(id),
        (Some(name), None) => {
            r.target_law_id = registry
                .lookup_law(name)
                .and_then(|law| law.law_id())
                .or_else(|| registry.lookup(name).and_then(|entry| entry.law_id()));
        }
        _ => {}
    }

    let relation = classify_relation(sentence_after(original, span.end, RELATION_WINDOW));
    r.metadata
        .insert(meta::RELATION.to_string(), relation.as_str().to_string());
    Some(r)
}
