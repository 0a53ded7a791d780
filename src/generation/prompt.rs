use crate::types::RetrievedChunk;

pub const PROMPT_TEMPLATE_VERSION: &str = "v2";

pub const SYSTEM_PROMPT: &str = "\
You are a research assistant answering questions about a corpus of research papers.

STRICT RULES:
1. ONLY use information from the provided context chunks. Do NOT use prior knowledge.
2. For EVERY claim you make, cite the source using EXACTLY this format: [source_id, chunk_id]
   Example: [harmbench, harmbench_c05]
   Do NOT add labels like \"source_id:\" or \"chunk_id:\" inside the brackets.
3. If the context does not contain sufficient evidence to answer fully, state what IS available
   with citations, then note what evidence is missing. Only use the full \"EVIDENCE MISSING\"
   response when the context contains NO relevant information at all.
4. If evidence conflicts across sources, explicitly flag the conflict with citations to both sides.
5. Do NOT invent or fabricate any citations. Only cite chunk IDs that appear in the context below.
6. When comparing multiple topics or papers, address each one explicitly using evidence from
   different sources. If evidence for one topic is missing, say so while still citing what you have.
7. Answer in a clear, concise manner with structured paragraphs.";

pub const EVIDENCE_MISSING_ANSWER: &str = "EVIDENCE MISSING: The corpus does not contain sufficient evidence \
to answer this question. Consider refining your query or adding more sources to the corpus.";

const CHUNK_SEPARATOR: &str = "\n\n---\n\n";

/// `[source_id, chunk_id] (from: title)` followed by the chunk text.
pub fn format_chunk(chunk: &RetrievedChunk) -> String {
    format!(
        "[{}, {}] (from: {})\n{}",
        chunk.source_id(),
        chunk.chunk_id(),
        chunk.title,
        chunk.chunk.text
    )
}

/// User message carrying the retrieved context and the question.
pub fn build_user_message(query: &str, chunks: &[RetrievedChunk]) -> String {
    let context = chunks
        .iter()
        .map(format_chunk)
        .collect::<Vec<_>>()
        .join(CHUNK_SEPARATOR);
    format!("Context chunks (use these to answer):\n{context}\n\nQuestion: {query}")
}
