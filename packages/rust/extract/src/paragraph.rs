//! The paragraph record and its classification labels.

use serde::Serialize;

/// Label assigned from a paragraph's own statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Good,
    Bad,
    Short,
    NearGood,
}

/// Final content/boilerplate decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FinalLabel {
    Good,
    Bad,
}

/// A block of text between two paragraph boundaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paragraph {
    /// Element path of the block that opened the paragraph, e.g. `html.body.p`.
    pub dom_path: String,
    /// Retained text chunks joined with single spaces.
    pub text: String,
    /// Length of `text` in characters.
    pub total_char_count: usize,
    /// Characters contributed from inside anchors.
    pub link_char_count: usize,
    /// Elements opened while this paragraph was current.
    pub tag_count: usize,
    pub is_heading: bool,
    pub context_free_label: Option<Label>,
    pub final_label: Option<FinalLabel>,
}

impl Paragraph {
    pub fn new(dom_path: impl Into<String>, is_heading: bool) -> Self {
        Self {
            dom_path: dom_path.into(),
            text: String::new(),
            total_char_count: 0,
            link_char_count: 0,
            tag_count: 0,
            is_heading,
            context_free_label: None,
            final_label: None,
        }
    }

    /// Append a whitespace-normalised chunk, separated from earlier text by
    /// one space. Returns the number of characters added.
    pub(crate) fn append(&mut self, chunk: &str, in_link: bool) -> usize {
        let mut added = chunk.chars().count();
        if !self.text.is_empty() {
            self.text.push(' ');
            added += 1;
        }
        self.text.push_str(chunk);

        self.total_char_count += added;
        if in_link {
            self.link_char_count += added;
        }
        added
    }

    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }

    /// Fraction of characters inside anchors; `0` for an empty paragraph.
    pub fn link_density(&self) -> f64 {
        if self.total_char_count == 0 {
            0.0
        } else {
            self.link_char_count as f64 / self.total_char_count as f64
        }
    }

    /// True unless the paragraph was resolved as content.
    pub fn is_boilerplate(&self) -> bool {
        self.final_label != Some(FinalLabel::Good)
    }
}
