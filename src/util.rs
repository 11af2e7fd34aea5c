//! Shared utility functions

/// One-line preview of a daemon payload for logs and error messages.
///
/// Runs of whitespace collapse to a single space and the result is cut to at
/// most `max_chars` characters, ending in "..." when anything was dropped.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut out = String::with_capacity(text.len().min(max_chars + 3));
    let mut count = 0;
    let mut words = text.split_whitespace().peekable();

    while let Some(word) = words.next() {
        for ch in word.chars() {
            if count == max_chars {
                out.push_str("...");
                return out;
            }
            out.push(ch);
            count += 1;
        }
        if words.peek().is_some() {
            if count == max_chars {
                out.push_str("...");
                return out;
            }
            out.push(' ');
            count += 1;
        }
    }
    out
}
