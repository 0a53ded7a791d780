use super::sentences::{char_len, split_sentences};
use super::ChunkingConfig;

/// Splits one section's text into chunk bodies.
///
/// Text that fits is returned whole. Oversized text is cut into sentences
/// and packed greedily; each new window is seeded with the trailing
/// sentences of the previous one that fit in `overlap_chars`. A single
/// sentence longer than `max_chars` is kept intact.
pub fn split_section(text: &str, config: &ChunkingConfig) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    if char_len(text) <= config.max_chars {
        return vec![text.to_string()];
    }

    let mut pieces = Vec::new();
    let mut window: Vec<&str> = Vec::new();
    // Sum of sentence lengths; joining spaces are not counted.
    let mut window_len = 0;

    for sentence in split_sentences(text) {
        let len = char_len(sentence);
        if window_len + len > config.max_chars && !window.is_empty() {
            pieces.push(window.join(" "));
            window = overlap_suffix(&window, config.overlap_chars);
            window_len = window.iter().map(|s| char_len(s)).sum();
        }
        window.push(sentence);
        window_len += len;
    }

    if !window.is_empty() {
        pieces.push(window.join(" "));
    }

    pieces
}

/// Longest run of trailing sentences whose total length stays within
/// `overlap_chars`, in original order.
fn overlap_suffix<'a>(window: &[&'a str], overlap_chars: usize) -> Vec<&'a str> {
    let mut carried = Vec::new();
    let mut carried_len = 0;
    for sentence in window.iter().rev() {
        let len = char_len(sentence);
        if carried_len + len > overlap_chars {
            break;
        }
        carried.push(*sentence);
        carried_len += len;
    }
    carried.reverse();
    carried
}
