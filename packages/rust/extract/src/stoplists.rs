//! Language stoplists used to measure stopword density.
//!
//! Built-in lists are the jusText frequency lists shipped with the `justext`
//! crate; the classification thresholds are calibrated against them. A
//! custom list can be read from a file with one word per line (`#` starts a
//! comment line).

use std::collections::HashSet;
use std::path::Path;

use distill_shared::{DistillError, Result};

/// An immutable set of lowercase stopwords.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stoplist {
    words: HashSet<String>,
}

impl Stoplist {
    /// Load a built-in stoplist. Language names are matched case-insensitively.
    pub fn builtin(language: &str) -> Result<Self> {
        let languages = available_languages();
        let name = languages
            .iter()
            .find(|name| name.eq_ignore_ascii_case(language.trim()))
            .ok_or_else(|| {
                DistillError::config(format!(
                    "unknown stoplist language '{language}' (available: {})",
                    languages.join(", ")
                ))
            })?;

        let words = justext::get_stoplist(name)
            .map_err(|e| DistillError::config(format!("cannot load stoplist '{name}': {e}")))?;

        Ok(words.into_iter().collect())
    }

    /// Read a stoplist from a UTF-8 file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DistillError::io(path, e))?;
        let stoplist = Self::parse(&content);

        if stoplist.is_empty() {
            return Err(DistillError::config(format!(
                "stoplist file {} contains no words",
                path.display()
            )));
        }

        Ok(stoplist)
    }

    /// Parse stoplist text: one word per line, blank and `#` lines ignored.
    pub fn parse(content: &str) -> Self {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect()
    }

    /// Whether `word` (already lowercased) is a stopword.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for Stoplist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            words: iter
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }
}

/// Names of the built-in stoplists, sorted.
pub fn available_languages() -> Vec<String> {
    let mut languages: Vec<String> = justext::available_languages()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    languages.sort();
    languages
}
