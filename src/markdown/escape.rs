//! Pure markdown escaping utilities.
//!
//! Converted text is meant to be read as-is, so inline punctuation is left
//! alone. Only text that would turn into block syntax at the start of a line
//! (headings, quotes, list markers) is escaped.

/// Escape text that is about to be written at the start of a line.
///
/// # Examples
///
/// ```
/// use docmark::markdown::escape_line_start;
///
/// assert_eq!(escape_line_start("# not a heading"), "\\# not a heading");
/// assert_eq!(escape_line_start("1. not a list"), "1\\. not a list");
/// assert_eq!(escape_line_start("plain *text*"), "plain *text*");
/// ```
pub fn escape_line_start(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some('#' | '>') => format!("\\{text}"),
        Some('-' | '+' | '*') if matches!(chars.next(), Some(' ') | None) => format!("\\{text}"),
        Some(c) if c.is_ascii_digit() => {
            let digits = text.bytes().take_while(u8::is_ascii_digit).count();
            let rest = &text[digits..];
            match rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
                Some(tail) if tail.is_empty() || tail.starts_with(' ') => {
                    format!("{}\\{}", &text[..digits], &text[digits..])
                }
                _ => text.to_string(),
            }
        }
        _ => text.to_string(),
    }
}

/// Calculate the minimum fence length needed for a code block.
///
/// Returns the smallest number of fence characters (at least 3) that
/// doesn't appear as a run in the content.
///
/// # Examples
///
/// ```
/// use docmark::markdown::calculate_fence_length;
///
/// // Normal content needs 3 backticks
/// assert_eq!(calculate_fence_length("let x = 1;", '`'), 3);
///
/// // Content with 3 backticks needs 4
/// assert_eq!(calculate_fence_length("```rust\ncode\n```", '`'), 4);
/// ```
pub fn calculate_fence_length(content: &str, fence_char: char) -> usize {
    longest_run(content, fence_char).max(2) + 1
}

/// Calculate the minimum backtick count needed for inline code.
///
/// # Examples
///
/// ```
/// use docmark::markdown::calculate_inline_code_ticks;
///
/// assert_eq!(calculate_inline_code_ticks("code"), 1);
/// assert_eq!(calculate_inline_code_ticks("code with ` backtick"), 2);
/// ```
pub fn calculate_inline_code_ticks(content: &str) -> usize {
    longest_run(content, '`') + 1
}

fn longest_run(content: &str, target: char) -> usize {
    let mut max_run = 0;
    let mut current_run = 0;

    for c in content.chars() {
        if c == target {
            current_run += 1;
            max_run = max_run.max(current_run);
        } else {
            current_run = 0;
        }
    }

    max_run
}
