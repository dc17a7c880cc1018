//! Context-free classification: each paragraph is labelled from its own
//! statistics, independently of its neighbours.

use std::sync::LazyLock;

use regex::Regex;

use distill_shared::ClassificationConfig;

use crate::paragraph::{Label, Paragraph};
use crate::stoplists::Stoplist;

static COPYRIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)©|\bcopyright\b").expect("valid regex"));

/// Label every paragraph in place.
pub fn classify_paragraphs(
    paragraphs: &mut [Paragraph],
    stoplist: &Stoplist,
    config: &ClassificationConfig,
) {
    for paragraph in paragraphs.iter_mut() {
        paragraph.context_free_label = Some(classify(paragraph, stoplist, config));
    }
}

/// Decide a single paragraph's label. The first matching rule wins.
pub fn classify(paragraph: &Paragraph, stoplist: &Stoplist, config: &ClassificationConfig) -> Label {
    let length = paragraph.total_char_count;

    if paragraph.link_density() > config.max_link_density {
        return Label::Bad;
    }
    if COPYRIGHT_RE.is_match(&paragraph.text) {
        return Label::Bad;
    }
    if config.no_headings && paragraph.is_heading {
        return Label::Short;
    }
    if length < config.length_low {
        return if paragraph.link_char_count > 0 {
            Label::Bad
        } else {
            Label::Short
        };
    }

    let density = stopword_density(&paragraph.text, stoplist);
    if density >= config.stopwords_high {
        if length >= config.length_high {
            Label::Good
        } else {
            Label::NearGood
        }
    } else if density >= config.stopwords_low {
        Label::NearGood
    } else {
        Label::Bad
    }
}

/// Fraction of whitespace-delimited words found in `stoplist`. Words are
/// lowercased and stripped of surrounding punctuation before lookup.
pub fn stopword_density(text: &str, stoplist: &Stoplist) -> f64 {
    let mut words = 0usize;
    let mut stopwords = 0usize;

    for word in text.split_whitespace() {
        words += 1;
        let bare = word
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        if !bare.is_empty() && stoplist.contains(&bare) {
            stopwords += 1;
        }
    }

    if words == 0 {
        0.0
    } else {
        stopwords as f64 / words as f64
    }
}
