use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// `[source_id, chunk_id]`
static STRUCTURED_CITATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[([a-z0-9_.\- ]+),\s*([a-z0-9_]+_c\d+)\]").expect("structured citation pattern")
});

/// `[chunk_id]`
static BARE_CITATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[([a-z0-9_]+_c\d+)\]").expect("bare citation pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationForm {
    /// `[source_id, chunk_id]`
    Structured,
    /// `[chunk_id]`, accepted only when no structured citation exists.
    Bare,
}

/// One citation occurrence, exactly as written in the answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Empty for bare citations.
    pub source_id: String,
    pub chunk_id: String,
    pub form: CitationForm,
}

/// Extracts citations in textual order, repeats included.
///
/// Structured citations are tried first; bare ones are considered only if
/// the answer contains no structured citation at all.
pub fn extract_citations(answer: &str) -> Vec<Citation> {
    let structured = parse_structured(answer);
    if !structured.is_empty() {
        return structured;
    }
    parse_bare(answer)
}

/// Chunk ids of [`extract_citations`], in order, repeats included.
pub fn extract_chunk_ids(answer: &str) -> Vec<String> {
    extract_citations(answer)
        .into_iter()
        .map(|citation| citation.chunk_id)
        .collect()
}

fn parse_structured(answer: &str) -> Vec<Citation> {
    STRUCTURED_CITATION
        .captures_iter(answer)
        .map(|caps| Citation {
            source_id: caps[1].to_string(),
            chunk_id: caps[2].to_string(),
            form: CitationForm::Structured,
        })
        .collect()
}

fn parse_bare(answer: &str) -> Vec<Citation> {
    BARE_CITATION
        .captures_iter(answer)
        .map(|caps| Citation {
            source_id: String::new(),
            chunk_id: caps[1].to_string(),
            form: CitationForm::Bare,
        })
        .collect()
}
