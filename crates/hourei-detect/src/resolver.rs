//! Reconciles overlapping candidates from independent collectors.

use std::collections::HashSet;

use hourei_core::ReferenceKind;
use tracing::trace;

use crate::candidate::Candidate;

/// Chooses the surviving candidates.
///
/// Candidates are ordered by start offset, then priority (highest first),
/// then registration order. Range members always survive. Any other
/// candidate is dropped when one with the same span and target article was
/// already kept, and an Internal or Multiple candidate is also dropped when
/// it lies inside the span of a strictly higher-priority candidate.
#[derive(Debug, Clone, Default)]
pub struct ConflictResolver;

impl ConflictResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, mut candidates: Vec<Candidate>) -> Vec<Candidate> {
        candidates.sort_by(|a, b| {
            a.span()
                .start
                .cmp(&b.span().start)
                .then_with(|| b.priority.cmp(&a.priority))
                .then_with(|| a.order.cmp(&b.order))
        });

        let covering: Vec<_> = candidates
            .iter()
            .map(|c| (c.span(), c.priority))
            .collect();
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            if candidate.is_range_member {
                kept.push(candidate);
                continue;
            }
            let span = candidate.span();
            if matches!(candidate.kind(), ReferenceKind::Internal | ReferenceKind::Multiple)
                && covering
                    .iter()
                    .any(|(outer, p)| *p > candidate.priority && outer.contains(&span))
            {
                trace!(text = %candidate.reference.source_text, "dropped candidate inside stronger match");
                continue;
            }
            let key = (
                span.start,
                span.end,
                candidate.target_article().map(str::to_string),
            );
            if !seen.insert(key) {
                trace!(text = %candidate.reference.source_text, "dropped duplicate candidate");
                continue;
            }
            kept.push(candidate);
        }
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::{confidence, priority};
    use hourei_core::Span;
    use pretty_assertions::assert_eq;

    const TEXT: &str = "会社法第二条及び第三条";

    fn candidate(kind: ReferenceKind, start: usize, end: usize, prio: u8, order: usize) -> Candidate {
        let mut c = Candidate::new(kind, TEXT, Span::new(start, end), prio, confidence::INTERNAL)
            .unwrap()
            .with_article(&TEXT[start..end]);
        c.order = (order, 0);
        c
    }

    #[test]
    fn higher_priority_wins_identical_span() {
        let internal = candidate(ReferenceKind::Internal, 9, 18, priority::INTERNAL, 5);
        let external = candidate(ReferenceKind::External, 9, 18, priority::EXTERNAL, 0);
        let kept = ConflictResolver::new().resolve(vec![internal, external]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].kind(), ReferenceKind::External);
    }

    #[test]
    fn contained_internal_is_dropped() {
        let external = candidate(ReferenceKind::External, 0, 18, priority::EXTERNAL, 0);
        let internal = candidate(ReferenceKind::Internal, 9, 18, priority::INTERNAL, 5);
        let kept = ConflictResolver::new().resolve(vec![internal, external]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].span(), Span::new(0, 18));
    }

    #[test]
    fn equal_priority_keeps_registration_order() {
        let a = candidate(ReferenceKind::Relative, 9, 18, priority::RELATIVE, 3);
        let b = candidate(ReferenceKind::Structural, 9, 18, priority::STRUCTURAL, 1);
        let kept = ConflictResolver::new().resolve(vec![a, b]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].kind(), ReferenceKind::Structural);
    }

    #[test]
    fn range_members_survive_and_output_is_sorted() {
        let span = (0, TEXT.len());
        let members: Vec<_> = ["第一条", "第二条", "第三条"]
            .into_iter()
            .enumerate()
            .map(|(i, article)| {
                let mut c = Candidate::new(
                    ReferenceKind::Range,
                    TEXT,
                    Span::new(span.0, span.1),
                    priority::RANGE,
                    confidence::RANGE,
                )
                .unwrap()
                .with_article(article)
                .as_range_member("第一条", "第三条", "条");
                c.order = (7, i);
                c
            })
            .collect();
        let mut input = vec![candidate(ReferenceKind::Internal, 24, 33, priority::INTERNAL, 12)];
        input.extend(members);

        let kept = ConflictResolver::new().resolve(input);
        let articles: Vec<_> = kept.iter().filter_map(|c| c.target_article()).collect();
        assert_eq!(articles, vec!["第一条", "第二条", "第三条"]);
        assert!(kept.windows(2).all(|w| w[0].span().start <= w[1].span().start));
    }

    #[test]
    fn distinct_targets_on_one_span_are_kept() {
        let a = candidate(ReferenceKind::Multiple, 9, 33, priority::MULTIPLE, 9).with_article("第二条");
        let b = candidate(ReferenceKind::Multiple, 9, 33, priority::MULTIPLE, 9).with_article("第三条");
        assert_eq!(ConflictResolver::new().resolve(vec![a, b]).len(), 2);
    }
}
