//! Output formatting: keep GOOD paragraphs and rewrap them to a fixed width.

use crate::paragraph::{FinalLabel, Paragraph};

/// Join the text of every GOOD paragraph, one block per paragraph separated
/// by a blank line, each block wrapped to `max_line_width` characters.
pub fn format_text(paragraphs: &[Paragraph], max_line_width: usize) -> String {
    paragraphs
        .iter()
        .filter(|p| p.final_label == Some(FinalLabel::Good))
        .map(|p| wrap_line(&p.text, max_line_width))
        .collect::<Vec<_>>()
        .join("\n\n")
        .trim()
        .to_string()
}

/// Greedily wrap one line on word boundaries. A word wider than
/// `max_line_width` gets a line of its own and is never split.
pub fn wrap_line(text: &str, max_line_width: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut line_len = 0usize;

    for word in text.split(' ').filter(|w| !w.is_empty()) {
        let word_len = word.chars().count();

        if line_len == 0 {
            out.push_str(word);
            line_len = word_len;
        } else if line_len + 1 + word_len <= max_line_width {
            out.push(' ');
            out.push_str(word);
            line_len += 1 + word_len;
        } else {
            out.push('\n');
            out.push_str(word);
            line_len = word_len;
        }
    }

    out
}
