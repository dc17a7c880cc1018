//! Markup normalization: decode bytes, parse into a tree, and detach
//! everything that can never be content before paragraphs are built.

use std::collections::HashSet;
use std::sync::LazyLock;

use encoding_rs::Encoding;
use regex::Regex;
use scraper::node::Element;
use scraper::{Html, Node};
use tracing::debug;

use distill_shared::{CleaningConfig, DistillError, Result};

/// Inline styles that hide an element.
static HIDDEN_STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)display\s*:\s*none|visibility\s*:\s*hidden").expect("valid regex")
});

/// Parses markup and strips non-content constructs.
#[derive(Debug, Clone)]
pub struct Normalizer {
    default_encoding: &'static Encoding,
    kill_tags: HashSet<String>,
    remove_comments: bool,
    remove_hidden: bool,
}

impl Normalizer {
    /// Build a normalizer; fails if the fallback encoding label is unknown.
    pub fn new(config: &CleaningConfig) -> Result<Self> {
        let default_encoding = Encoding::for_label(config.encoding.trim().as_bytes())
            .ok_or_else(|| DistillError::config(format!("unknown encoding '{}'", config.encoding)))?;

        Ok(Self {
            default_encoding,
            kill_tags: config.kill_tags.iter().cloned().collect(),
            remove_comments: config.remove_comments,
            remove_hidden: config.remove_hidden,
        })
    }

    /// Decode raw bytes. A BOM wins, then a recognised `charset`, then the
    /// configured default. Invalid sequences are replaced, never fatal.
    pub fn decode(&self, bytes: &[u8], charset: Option<&str>) -> String {
        let encoding = charset
            .and_then(|label| Encoding::for_label(label.trim().as_bytes()))
            .unwrap_or(self.default_encoding);

        let (text, used, had_errors) = encoding.decode(bytes);
        if had_errors {
            debug!(encoding = used.name(), "replaced malformed byte sequences");
        }
        text.into_owned()
    }

    /// Parse `html` and remove excluded elements, comments and hidden nodes.
    ///
    /// html5ever recovers from any malformed input, so this never fails.
    pub fn normalize(&self, html: &str) -> Html {
        let mut doc = Html::parse_document(html);

        if !doc.errors.is_empty() {
            debug!(errors = doc.errors.len(), "recovered from malformed markup");
        }

        let doomed: Vec<_> = doc
            .tree
            .nodes()
            .filter(|node| match node.value() {
                Node::Comment(_) => self.remove_comments,
                Node::Element(el) => self.is_excluded(el),
                _ => false,
            })
            .map(|node| node.id())
            .collect();

        debug!(removed = doomed.len(), "detaching excluded nodes");

        for id in doomed {
            if let Some(mut node) = doc.tree.get_mut(id) {
                node.detach();
            }
        }

        doc
    }

    fn is_excluded(&self, el: &Element) -> bool {
        if self.kill_tags.contains(el.name()) {
            return true;
        }
        self.remove_hidden && is_hidden(el)
    }
}

/// Whether an element is hidden from readers by attribute or inline style.
fn is_hidden(el: &Element) -> bool {
    if el.attr("hidden").is_some() {
        return true;
    }
    if el
        .attr("aria-hidden")
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    {
        return true;
    }
    el.attr("style")
        .is_some_and(|style| HIDDEN_STYLE_RE.is_match(style))
}
