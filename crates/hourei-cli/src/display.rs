//! Vertical card display for detected references.
//!
//! Renders one reference as a grouped, human-readable card: where it was
//! found, what it points at, how sure the engine is, and any remaining
//! metadata.

use std::fmt::Write;

use hourei_core::{Reference, meta};

/// Metadata keys shown in their own sections rather than under Metadata.
const SHOWN_ELSEWHERE: &[&str] = &[meta::COLLECTOR, meta::RELATION];

// ── Public API ──

/// Render a reference as a card, headed by the article it was found in.
pub fn render_card(r: &Reference, found_in: Option<&str>) -> String {
    let mut out = String::new();
    let target = r.target_article.as_deref().unwrap_or("?");
    let _ = writeln!(out, "=== {} ({}) ===", target, r.kind);
    if let Some(law) = &r.target_law_name {
        let _ = writeln!(out, "{law}");
    }
    out.push('\n');

    section(
        &mut out,
        "Source",
        &[
            ("found_in", found_in.map(str::to_string)),
            ("text", Some(r.source_text.clone())),
            (
                "span",
                Some(format!("{}..{}", r.source_span.start, r.source_span.end)),
            ),
            ("collector", r.meta(meta::COLLECTOR).map(str::to_string)),
        ],
    );
    section(
        &mut out,
        "Target",
        &[
            ("law", r.target_law_name.clone()),
            ("law_id", r.target_law_id.clone()),
            ("article", r.target_article.clone()),
            ("paragraph", r.target_paragraph.clone()),
            ("item", r.target_item.clone()),
        ],
    );
    section(
        &mut out,
        "Assessment",
        &[
            ("confidence", Some(format!("{:.2}", r.confidence))),
            ("relation", r.meta(meta::RELATION).map(str::to_string)),
        ],
    );
    let rest: Vec<_> = r
        .metadata
        .iter()
        .filter(|(k, _)| !SHOWN_ELSEWHERE.contains(&k.as_str()))
        .map(|(k, v)| (k.as_str(), Some(v.clone())))
        .collect();
    section(&mut out, "Metadata", &rest);
    out
}

// ── Section rendering ──

fn section(out: &mut String, header: &str, rows: &[(&str, Option<String>)]) {
    if rows.iter().all(|(_, v)| v.is_none()) {
        return;
    }
    let _ = writeln!(out, "{header}");
    for (name, value) in rows {
        if let Some(value) = value {
            let _ = writeln!(out, "  {:<26} {}", name, value);
        }
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use hourei_core::{ReferenceKind, Span};

    #[test]
    fn card_groups_fields() {
        let mut r = Reference::new(ReferenceKind::External, "会社法第二条", Span::new(0, 18));
        r.target_law_name = Some("会社法".into());
        r.target_article = Some("第二条".into());
        r.confidence = 0.95;
        r.metadata.insert(meta::RELATION.into(), "apply".into());
        r.metadata.insert(meta::LAW_KIND.into(), "act".into());

        let card = render_card(&r, Some("第五条"));
        assert!(card.starts_with("=== 第二条 (external) ===\n会社法\n"));
        assert!(card.contains("Source\n  found_in"));
        assert!(card.contains(&format!("  {:<26} 0.95", "confidence")));
        assert!(card.contains("Metadata\n  law_kind"));
        assert!(!card.contains("Metadata\n  relation"));
    }

    #[test]
    fn empty_sections_are_skipped() {
        let r = Reference::new(ReferenceKind::Internal, "第一条", Span::new(0, 9));
        let card = render_card(&r, None);
        assert!(!card.contains("Metadata"));
        assert!(card.contains("=== ? (internal) ==="));
    }
}
