/// Splits `text` after every `.`, `!` or `?` that is followed by whitespace.
///
/// The whitespace run at each boundary is dropped; every other character
/// lands in exactly one sentence, in order. Empty sentences are never
/// returned.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if ch.is_whitespace() && matches!(prev, Some('.' | '!' | '?')) {
            let mut end = idx + ch.len_utf8();
            while let Some(&(next_idx, next)) = chars.peek() {
                if !next.is_whitespace() {
                    break;
                }
                end = next_idx + next.len_utf8();
                chars.next();
            }
            push_sentence(&mut sentences, &text[start..idx]);
            start = end;
            prev = None;
            continue;
        }
        prev = Some(ch);
    }
    push_sentence(&mut sentences, &text[start..]);

    sentences
}

fn push_sentence<'a>(sentences: &mut Vec<&'a str>, candidate: &'a str) {
    if !candidate.is_empty() {
        sentences.push(candidate);
    }
}

/// Length in Unicode scalar values, the unit `max_chars` is expressed in.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
