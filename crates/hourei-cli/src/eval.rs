//! `hourei eval`: precision, recall, and F1 against a gold corpus.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

use anyhow::Context;
use hourei_core::{Reference, ReferenceKind};
use hourei_detect::DetectionEngine;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct GoldCase {
    pub text: String,
    #[serde(default)]
    pub current_article: Option<String>,
    #[serde(default)]
    pub law_id: Option<String>,
    pub expected: Vec<Expected>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Expected {
    pub kind: ReferenceKind,
    #[serde(default)]
    pub target_article: Option<String>,
    #[serde(default)]
    pub target_law: Option<String>,
}

type MatchKey = (ReferenceKind, Option<String>, Option<String>);

impl Expected {
    fn key(&self) -> MatchKey {
        (self.kind, self.target_law.clone(), self.target_article.clone())
    }
}

fn detected_key(r: &Reference) -> MatchKey {
    (r.kind, r.target_law_name.clone(), r.target_article.clone())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Score {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl Score {
    fn finish(&mut self) {
        let tp = self.true_positives as f64;
        let predicted = tp + self.false_positives as f64;
        let actual = tp + self.false_negatives as f64;
        self.precision = if predicted > 0.0 { tp / predicted } else { 0.0 };
        self.recall = if actual > 0.0 { tp / actual } else { 0.0 };
        self.f1 = if self.precision + self.recall > 0.0 {
            2.0 * self.precision * self.recall / (self.precision + self.recall)
        } else {
            0.0
        };
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub cases: usize,
    pub by_kind: BTreeMap<String, Score>,
    pub overall: Score,
}

impl Report {
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} cases", self.cases);
        let _ = writeln!(
            out,
            "{:<18} {:>5} {:>5} {:>5} {:>9} {:>9} {:>9}",
            "kind", "tp", "fp", "fn", "precision", "recall", "f1"
        );
        let rows = self
            .by_kind
            .iter()
            .map(|(k, s)| (k.as_str(), s))
            .chain(std::iter::once(("overall", &self.overall)));
        for (name, s) in rows {
            let _ = writeln!(
                out,
                "{:<18} {:>5} {:>5} {:>5} {:>9.3} {:>9.3} {:>9.3}",
                name,
                s.true_positives,
                s.false_positives,
                s.false_negatives,
                s.precision,
                s.recall,
                s.f1
            );
        }
        out
    }
}

pub fn parse_gold(json: &str) -> anyhow::Result<Vec<GoldCase>> {
    serde_json::from_str(json).context("gold corpus is not a JSON array of cases")
}

/// Run every case from a clean context and score by (kind, law, article).
pub fn evaluate(engine: &mut DetectionEngine, cases: &[GoldCase]) -> Report {
    let mut report = Report {
        cases: cases.len(),
        ..Report::default()
    };

    for case in cases {
        engine.reset_context();
        engine.set_current_law(case.law_id.clone());
        let detected = engine.detect(&case.text, case.current_article.as_deref());

        let mut remaining: HashMap<MatchKey, usize> = HashMap::new();
        for e in &case.expected {
            *remaining.entry(e.key()).or_default() += 1;
        }
        for r in &detected {
            let key = detected_key(r);
            let score = report.by_kind.entry(r.kind.as_str().to_string()).or_default();
            match remaining.get_mut(&key) {
                Some(n) if *n > 0 => {
                    *n -= 1;
                    score.true_positives += 1;
                    report.overall.true_positives += 1;
                }
                _ => {
                    score.false_positives += 1;
                    report.overall.false_positives += 1;
                }
            }
        }
        for ((kind, _, _), missed) in remaining {
            if missed == 0 {
                continue;
            }
            report
                .by_kind
                .entry(kind.as_str().to_string())
                .or_default()
                .false_negatives += missed;
            report.overall.false_negatives += missed;
        }
    }

    for score in report.by_kind.values_mut() {
        score.finish();
    }
    report.overall.finish();
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOLD: &str = r#"[
        {"text": "第一条の規定により定める。",
         "expected": [{"kind": "internal", "target_article": "第一条"}]},
        {"text": "前条の規定にかかわらず、", "current_article": "第五条",
         "expected": [{"kind": "relative", "target_article": "第四条"}]},
        {"text": "民訴第百条",
         "expected": [
            {"kind": "external", "target_law": "民事訴訟法", "target_article": "第百条"},
            {"kind": "external", "target_law": "商法", "target_article": "第一条"}
         ]}
    ]"#;

    #[test]
    fn scores_per_kind_and_overall() {
        let cases = parse_gold(GOLD).unwrap();
        let mut engine = DetectionEngine::builtin().unwrap();
        let report = evaluate(&mut engine, &cases);

        assert_eq!(report.cases, 3);
        assert_eq!(report.overall.true_positives, 3);
        assert_eq!(report.overall.false_negatives, 1);
        let external = &report.by_kind["external"];
        assert_eq!(external.true_positives, 1);
        assert_eq!(external.false_negatives, 1);
        assert!((external.recall - 0.5).abs() < 1e-9);
        assert!(report.render().contains("overall"));
    }

    #[test]
    fn f1_of_empty_score_is_zero() {
        let mut s = Score::default();
        s.finish();
        assert_eq!(s.f1, 0.0);
    }

    #[test]
    fn malformed_gold_is_an_error() {
        assert!(parse_gold("{\"text\": 1}").is_err());
    }
}
