use std::collections::BTreeSet;

use evidence_core::citation::{
    citation_validity, evidence_missing_handling, extract_chunk_ids, extract_citations, groundedness, source_recall,
    CitationForm,
};
use evidence_core::types::{Chunk, ChunkId, RetrievedChunk, SourceId};

const NO_SOURCES: &[&str] = &[];

fn chunk_id(source: &str, ordinal: u32) -> ChunkId {
    ChunkId::new(&SourceId::new(source).unwrap(), ordinal)
}

fn universe(ids: &[(&str, u32)]) -> BTreeSet<ChunkId> {
    ids.iter().map(|(s, o)| chunk_id(s, *o)).collect()
}

fn retrieved(ids: &[(&str, u32)]) -> Vec<RetrievedChunk> {
    ids.iter()
        .map(|(s, o)| {
            let source_id = SourceId::new(*s).unwrap();
            RetrievedChunk {
                chunk: Chunk {
                    chunk_id: ChunkId::new(&source_id, *o),
                    source_id,
                    section_title: "Body".into(),
                    text: "text".into(),
                    ordinal: *o,
                },
                title: "Title".into(),
                distance: 0.1,
            }
        })
        .collect()
}

#[test]
fn structured_citations_are_extracted_in_order() {
    let answer = "Attacks transfer [harmbench, harmbench_c05]. Defenses lag [Jail Break-v2.1, jailbreak_c12].";

    let citations = extract_citations(answer);

    assert_eq!(citations.len(), 2);
    assert_eq!(citations[0].source_id, "harmbench");
    assert_eq!(citations[0].chunk_id, "harmbench_c05");
    assert_eq!(citations[0].form, CitationForm::Structured);
    assert_eq!(citations[1].source_id, "Jail Break-v2.1");
    assert_eq!(citations[1].chunk_id, "jailbreak_c12");
}

#[test]
fn bare_citations_are_a_fallback_only() {
    let bare_only = "See [harmbench_c05] and [gcg_c01].";
    let citations = extract_citations(bare_only);
    assert_eq!(citations.len(), 2);
    assert!(citations.iter().all(|c| c.form == CitationForm::Bare && c.source_id.is_empty()));
    assert_eq!(extract_chunk_ids(bare_only), vec!["harmbench_c05", "gcg_c01"]);

    // One structured citation suppresses every bare one.
    let mixed = "See [harmbench_c05] and [gcg, gcg_c01].";
    assert_eq!(extract_chunk_ids(mixed), vec!["gcg_c01"]);
}

#[test]
fn matching_is_case_insensitive_and_keeps_repeats() {
    let answer = "[HarmBench, HARMBENCH_C05] then again [harmbench, harmbench_c05].";

    assert_eq!(extract_chunk_ids(answer), vec!["HARMBENCH_C05", "harmbench_c05"]);
}

#[test]
fn text_without_citations_yields_nothing() {
    assert!(extract_citations("No brackets here, nor [malformed] ones [a, b].").is_empty());
    assert!(extract_citations("").is_empty());
}

#[test]
fn invariant_zero_citations_scores_zero_precision() {
    let result = citation_validity("Nothing cited.", &universe(&[("a", 1)]));

    assert_eq!(result.total_citations, 0);
    assert_eq!(result.citation_precision, 0.0);
    assert!(result.cited_ids.is_empty());
}

#[test]
fn invariant_all_valid_citations_score_full_precision() {
    let answer = "[a, a_c01] [a, a_c02] [b, b_c01] [a, a_c01]";

    let result = citation_validity(answer, &universe(&[("a", 1), ("a", 2), ("b", 1)]));

    assert_eq!(result.total_citations, 4, "repeats count separately");
    assert_eq!(result.valid_citations, 4);
    assert_eq!(result.citation_precision, 1.0);
}

#[test]
fn invalid_citations_are_listed() {
    let answer = "[a, a_c01] [a, a_c99] [ghost, ghost_c01] [a, a_c99]";

    let result = citation_validity(answer, &universe(&[("a", 1)]));

    assert_eq!(result.total_citations, 4);
    assert_eq!(result.valid_citations, 1);
    assert_eq!(result.invalid_citations, 3);
    assert_eq!(result.citation_precision, 0.25);
    assert_eq!(result.invalid_ids, vec!["a_c99", "ghost_c01", "a_c99"]);
}

#[test]
fn invariant_valid_but_unretrieved_citation_is_not_grounded() {
    let answer = "[a, a_c01] and [b, b_c02]";
    let retrieved = retrieved(&[("a", 1), ("a", 2)]);

    let validity = citation_validity(answer, &universe(&[("a", 1), ("a", 2), ("b", 2)]));
    let result = groundedness(answer, &retrieved);

    assert_eq!(validity.citation_precision, 1.0);
    assert!(!result.is_grounded);
    assert!(result.groundedness_score < 1.0);
    assert_eq!(result.grounded_citations, 1);
    assert_eq!(result.ungrounded_citations, 1);
    assert_eq!(result.ungrounded_ids, vec!["b_c02"]);
}

#[test]
fn groundedness_counts_distinct_ids() {
    let answer = "[a, a_c01] [a, a_c01] [a, a_c01] [b, b_c01]";
    let retrieved = retrieved(&[("a", 1)]);

    let result = groundedness(answer, &retrieved);

    assert_eq!(result.grounded_citations, 1);
    assert_eq!(result.ungrounded_citations, 1);
    assert_eq!(result.groundedness_score, 0.5);
}

#[test]
fn fully_grounded_answer() {
    let answer = "[a, a_c01] [a, a_c02]";

    let result = groundedness(answer, &retrieved(&[("a", 1), ("a", 2), ("b", 1)]));

    assert!(result.is_grounded);
    assert_eq!(result.groundedness_score, 1.0);
    assert!(result.ungrounded_ids.is_empty());
}

#[test]
fn zero_citations_is_never_grounded() {
    let result = groundedness("An answer with no citations.", &retrieved(&[("a", 1)]));

    assert!(!result.is_grounded);
    assert_eq!(result.groundedness_score, 0.0);
    assert_eq!(result.grounded_citations, 0);
}

#[test]
fn evidence_missing_is_flagged_for_queries_without_sources() {
    let result = evidence_missing_handling("There is INSUFFICIENT EVIDENCE in the corpus.", NO_SOURCES);
    assert!(result.should_flag_missing);
    assert_eq!(result.correctly_flags_missing, Some(true));

    let missed = evidence_missing_handling("Here is a confident answer [a, a_c01].", NO_SOURCES);
    assert!(missed.should_flag_missing);
    assert_eq!(missed.correctly_flags_missing, Some(false));

    let not_applicable = evidence_missing_handling("No evidence at all.", &["harmbench"]);
    assert!(!not_applicable.should_flag_missing);
    assert_eq!(not_applicable.correctly_flags_missing, None);
}

#[test]
fn source_recall_over_expected_sources() {
    let chunks = retrieved(&[("a", 1), ("a", 2), ("b", 1)]);

    assert_eq!(source_recall(&["a", "c"], &chunks), Some(0.5));
    assert_eq!(source_recall(&["a", "b"], &chunks), Some(1.0));
    assert_eq!(source_recall(NO_SOURCES, &chunks), None);
}

#[test]
fn chunk_ids_from_chunking_are_always_citable() {
    use evidence_core::chunking::{chunk_sections, ChunkingConfig};
    use evidence_core::document::Section;

    let source = SourceId::new("llama_2").unwrap();
    let sections = vec![Section::new("Intro", "Open weights help red teaming.")];
    let chunks = chunk_sections(&sections, &source, &ChunkingConfig::v0());
    let id = chunks[0].chunk_id.clone();
    let universe: BTreeSet<ChunkId> = [id.clone()].into_iter().collect();

    let structured = format!("Claim [{}, {}].", source, id);
    assert_eq!(extract_chunk_ids(&structured), vec![id.as_str().to_string()]);
    let validity = citation_validity(&structured, &universe);
    assert_eq!(validity.total_citations, 1);
    assert_eq!(validity.citation_precision, 1.0);

    let bare = format!("Claim [{}].", id);
    assert_eq!(extract_chunk_ids(&bare), vec![id.as_str().to_string()]);
}
