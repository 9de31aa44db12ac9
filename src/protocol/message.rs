//! Module `message`
//!
//! Pure helpers for the chat wire format. Sessions build outbound text with
//! these; the registry only ever sees finished strings.

/// Reserved message that signals a graceful departure.
pub const EXIT_TOKEN: &str = "/exit";

/// Delimiter inserted between a sender's name and their message text.
pub const PROMPT: &str = "> ";

/// Strips one trailing newline and an optional preceding carriage return.
///
/// Tolerates `\r\n` endings as produced by line-oriented terminal clients;
/// interior whitespace is left untouched.
pub fn trim_line(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Returns whether a trimmed payload is the reserved exit token.
pub fn is_exit(text: &str) -> bool {
    text == EXIT_TOKEN
}

/// Truncates to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Truncates to at most `max_bytes` bytes, backing up to a char boundary.
pub fn truncate_bytes(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Formats a relayed chat line: `name` + `"> "` + text + newline.
pub fn chat_line(name: &str, text: &str) -> String {
    format!("{}{}{}\n", name, PROMPT, text)
}

/// Formats the announcement broadcast when a client joins.
pub fn join_announcement(name: &str) -> String {
    format!("\n=== {} has joined the chat ===\n", name)
}

/// Formats the announcement broadcast when a client leaves.
pub fn leave_announcement(name: &str) -> String {
    format!("\n=== {} has left the chat ===\n", name)
}
