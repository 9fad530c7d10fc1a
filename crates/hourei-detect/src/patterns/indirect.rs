use std::sync::LazyLock;

use hourei_core::{ReferenceKind, Span, meta};
use regex::Regex;

use super::{Collector, Scan};
use crate::candidate::{Candidate, confidence, priority};

static INDIRECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        "関係法令|別に(?:法律|政令|省令|内閣府令|条例)で定める|(?:主務省令|内閣府令|政令|省令|命令)で定める|主務省令",
    )
    .expect("indirect pattern is valid")
});

/// True when `text` holds a phrase whose target is guessed from the laws
/// seen so far, so its result depends on more than the current position.
pub(crate) fn mentions_indirect(text: &str) -> bool {
    INDIRECT.is_match(text)
}

/// What instrument a phrase points at, relative to the law in context.
fn instrument_suffix(phrase: &str) -> Option<&'static str> {
    if phrase.starts_with("別に") || phrase.starts_with("関係") || phrase.starts_with("命令") {
        None
    } else if phrase.starts_with("政令") {
        Some("施行令")
    } else {
        Some("施行規則")
    }
}

/// Citations that name no provision (`政令で定める`, `主務省令`,
/// `関係法令`). The target is an advisory guess from the laws seen so far.
pub struct IndirectCollector;

impl Collector for IndirectCollector {
    fn name(&self) -> &'static str {
        "indirect"
    }

    fn collect(&self, scan: &Scan<'_>) -> Vec<Candidate> {
        let text = scan.text;
        let recent = scan.context.most_recent_law();
        INDIRECT
            .find_iter(text)
            .filter_map(|m| {
                let phrase = m.as_str();
                let guess = instrument_suffix(phrase)
                    .zip(recent)
                    .map(|(suffix, law)| format!("{law}{suffix}"));
                let conf = if guess.is_some() {
                    confidence::INDIRECT_GUESS
                } else {
                    confidence::INDIRECT
                };
                let c = Candidate::new(
                    ReferenceKind::Indirect,
                    text,
                    Span::new(m.start(), m.end()),
                    priority::INDIRECT,
                    conf,
                )?
                .with_meta(meta::INDIRECT_PHRASE, phrase)
                .with_meta(meta::INFERRED, guess.is_some().to_string());
                Some(c.with_law(guess, None))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextTracker;
    use crate::patterns::testing::{run, run_with};
    use pretty_assertions::assert_eq;

    #[test]
    fn guesses_from_detected_laws() {
        let mut ctx = ContextTracker::new();
        ctx.note_law("民法");
        ctx.note_law("会社法");
        let found = run_with(&IndirectCollector, "政令で定める額を超える場合", &ctx);
        assert_eq!(found.len(), 1);
        let r = &found[0].reference;
        assert_eq!(r.target_law_name.as_deref(), Some("会社法施行令"));
        assert_eq!(r.confidence, 0.6);
        assert_eq!(r.meta(meta::INFERRED), Some("true"));

        let found = run_with(&IndirectCollector, "主務省令で定めるところにより", &ctx);
        assert_eq!(found[0].reference.target_law_name.as_deref(), Some("会社法施行規則"));
        assert_eq!(found[0].reference.source_text, "主務省令で定める");
    }

    #[test]
    fn no_guess_without_laws() {
        let found = run(&IndirectCollector, "関係法令の規定に従い", None);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].reference.target_law_name, None);
        assert_eq!(found[0].reference.confidence, 0.5);
        assert_eq!(found[0].priority, 2);
    }

    #[test]
    fn separately_provided_is_never_guessed() {
        let mut ctx = ContextTracker::new();
        ctx.note_law("会社法");
        let found = run_with(&IndirectCollector, "別に法律で定める", &ctx);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].reference.target_law_name, None);
    }
}
