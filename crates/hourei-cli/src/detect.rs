//! `hourei detect`: run the engine over the articles of a text file.

use std::fmt::Write;

use hourei_core::{ProvisionId, Reference};
use hourei_detect::DetectionEngine;
use serde::Serialize;

use crate::OutputFormat;
use crate::display::render_card;

/// One blank-line separated block of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block<'a> {
    pub article: Option<String>,
    /// Body of the block, without its heading.
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
struct BlockResult<'a> {
    block: usize,
    article: Option<&'a str>,
    references: &'a [Reference],
}

/// Split input into blocks. A block whose first token is a provision
/// (`第五条　…`) is read as that article and the heading is dropped from
/// its text; others use `fallback`.
pub fn split_blocks<'a>(text: &'a str, fallback: Option<&str>) -> Vec<Block<'a>> {
    let mut blocks = Vec::new();
    let mut start: Option<usize> = None;
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.trim().is_empty() {
            if let Some(s) = start.take() {
                blocks.push(&text[s..offset]);
            }
        } else if start.is_none() {
            start = Some(offset);
        }
        offset += line.len();
    }
    if let Some(s) = start {
        blocks.push(&text[s..]);
    }

    blocks
        .into_iter()
        .map(|block| {
            let text = block.trim_end();
            let token = text.split(char::is_whitespace).next().unwrap_or_default();
            match ProvisionId::parse(token) {
                Some(heading) => Block {
                    article: Some(heading.to_string()),
                    text: text[token.len()..].trim_start(),
                },
                None => Block {
                    article: fallback.map(str::to_string),
                    text,
                },
            }
        })
        .collect()
}

pub fn run(
    engine: &mut DetectionEngine,
    text: &str,
    article: Option<&str>,
    law_id: Option<&str>,
    format: OutputFormat,
) -> anyhow::Result<String> {
    engine.set_current_law(law_id.map(str::to_string));
    let blocks = split_blocks(text, article);
    let results: Vec<(Option<String>, Vec<Reference>)> = blocks
        .iter()
        .map(|b| (b.article.clone(), engine.detect(b.text, b.article.as_deref())))
        .collect();

    let mut out = String::new();
    match format {
        OutputFormat::Json => {
            let rows: Vec<BlockResult<'_>> = results
                .iter()
                .enumerate()
                .map(|(i, (article, references))| BlockResult {
                    block: i + 1,
                    article: article.as_deref(),
                    references,
                })
                .collect();
            writeln!(out, "{}", serde_json::to_string_pretty(&rows)?)?;
        }
        OutputFormat::Edges => {
            let source = law_id.unwrap_or_default();
            for (article, references) in &results {
                for r in references {
                    let edge = r.to_edge(source, article.as_deref());
                    writeln!(out, "{}", serde_json::to_string(&edge)?)?;
                }
            }
        }
        OutputFormat::Card => {
            for (article, references) in &results {
                for r in references {
                    out.push_str(&render_card(r, article.as_deref()));
                }
            }
        }
    }
    Ok(out)
}
