//! Paragraph building: a depth-first walk over the normalized tree emits
//! [`Event`]s into a [`ParagraphBuilder`] state machine.

use std::collections::HashSet;

use ego_tree::iter::Edge;
use scraper::{Html, Node};
use tracing::trace;

use crate::paragraph::Paragraph;

/// One step of the document traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<'a> {
    StartElement {
        name: &'a str,
        attrs: Vec<(&'a str, &'a str)>,
    },
    EndElement {
        name: &'a str,
    },
    Characters(&'a str),
}

/// Where the builder is relative to the current paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuilderState {
    /// The current paragraph has no text yet.
    OutsideParagraph,
    /// The current paragraph has text and no anchor is open.
    InsideParagraph,
    /// An anchor is open. `linked_text` records whether it has contributed
    /// text to the current paragraph.
    InsideLink {
        href: Option<String>,
        linked_text: bool,
    },
}

/// Finite-state machine turning traversal events into paragraphs.
#[derive(Debug)]
pub struct ParagraphBuilder<'a> {
    block_tags: &'a HashSet<String>,
    state: BuilderState,
    path: Vec<String>,
    current: Paragraph,
    paragraphs: Vec<Paragraph>,
    /// The previous significant event was a `<br>`.
    after_br: bool,
}

impl<'a> ParagraphBuilder<'a> {
    pub fn new(block_tags: &'a HashSet<String>) -> Self {
        Self {
            block_tags,
            state: BuilderState::OutsideParagraph,
            path: Vec::new(),
            current: Paragraph::new("", false),
            paragraphs: Vec::new(),
            after_br: false,
        }
    }

    pub fn state(&self) -> &BuilderState {
        &self.state
    }

    /// Advance the machine by one event.
    pub fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::StartElement { name, attrs } => self.start_element(name, &attrs),
            Event::EndElement { name } => self.end_element(name),
            Event::Characters(text) => self.characters(text),
        }
    }

    /// Seal the open paragraph and return the finished sequence.
    pub fn finish(mut self) -> Vec<Paragraph> {
        self.seal();
        self.paragraphs
    }

    fn start_element(&mut self, name: &str, attrs: &[(&str, &str)]) {
        // A second `<br>` splits at the enclosing element, not at the `<br>`.
        if name == "br" && self.after_br {
            self.after_br = false;
            self.seal();
            self.path.push(name.to_string());
            return;
        }

        self.path.push(name.to_string());

        if self.block_tags.contains(name) {
            self.after_br = false;
            self.seal();
            return;
        }

        self.after_br = name == "br";
        self.current.tag_count += 1;

        if name == "a" {
            let href = attrs
                .iter()
                .find(|(key, _)| *key == "href")
                .map(|(_, value)| value.trim())
                .filter(|value| !value.is_empty())
                .map(String::from);
            self.state = BuilderState::InsideLink {
                href,
                linked_text: false,
            };
        }
    }

    fn end_element(&mut self, name: &str) {
        self.path.pop();

        if name == "a" {
            let state = std::mem::replace(&mut self.state, BuilderState::OutsideParagraph);
            if let BuilderState::InsideLink {
                href: Some(href),
                linked_text: true,
            } = state
            {
                self.annotate_link(&href);
            }
            self.state = self.resting_state();
        }

        if self.block_tags.contains(name) {
            self.after_br = false;
            self.seal();
        }
    }

    fn characters(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }

        let chunk = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let in_link = matches!(self.state, BuilderState::InsideLink { .. });
        self.current.append(&chunk, in_link);

        match &mut self.state {
            BuilderState::InsideLink { linked_text, .. } => *linked_text = true,
            state => *state = BuilderState::InsideParagraph,
        }
        self.after_br = false;
    }

    fn annotate_link(&mut self, href: &str) {
        self.current.append(&format!("[{href}]"), true);
    }

    /// State to fall back to when no anchor is open.
    fn resting_state(&self) -> BuilderState {
        if self.current.has_text() {
            BuilderState::InsideParagraph
        } else {
            BuilderState::OutsideParagraph
        }
    }

    /// Push the current paragraph (if it has text) and open a fresh one at
    /// the current position in the tree.
    fn seal(&mut self) {
        // An anchor spanning a boundary is annotated in each paragraph it fed.
        let pending = match &mut self.state {
            BuilderState::InsideLink { href, linked_text } if *linked_text => {
                *linked_text = false;
                href.clone()
            }
            _ => None,
        };
        if let Some(href) = pending {
            self.annotate_link(&href);
        }

        let is_heading = self.path.iter().any(|tag| is_heading_tag(tag));
        let fresh = Paragraph::new(self.path.join("."), is_heading);
        let finished = std::mem::replace(&mut self.current, fresh);

        if finished.has_text() {
            trace!(
                dom_path = %finished.dom_path,
                chars = finished.total_char_count,
                "sealed paragraph"
            );
            self.paragraphs.push(finished);
        }

        if !matches!(self.state, BuilderState::InsideLink { .. }) {
            self.state = BuilderState::OutsideParagraph;
        }
    }
}

fn is_heading_tag(tag: &str) -> bool {
    matches!(tag, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// Walk `doc` depth-first and build its paragraph sequence.
pub fn make_paragraphs(doc: &Html, block_tags: &HashSet<String>) -> Vec<Paragraph> {
    let mut builder = ParagraphBuilder::new(block_tags);

    for edge in doc.tree.root().traverse() {
        match edge {
            Edge::Open(node) => match node.value() {
                Node::Element(el) => builder.handle(Event::StartElement {
                    name: el.name(),
                    attrs: el.attrs().collect(),
                }),
                Node::Text(text) => builder.handle(Event::Characters(&**text)),
                _ => {}
            },
            Edge::Close(node) => {
                if let Node::Element(el) = node.value() {
                    builder.handle(Event::EndElement { name: el.name() });
                }
            }
        }
    }

    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use distill_shared::CleaningConfig;

    use crate::normalize::Normalizer;

    fn block_tags() -> HashSet<String> {
        CleaningConfig::default().block_tags.into_iter().collect()
    }

    fn paragraphs_of(html: &str) -> Vec<Paragraph> {
        let doc = Normalizer::new(&CleaningConfig::default())
            .unwrap()
            .normalize(html);
        make_paragraphs(&doc, &block_tags())
    }

    fn texts(paragraphs: &[Paragraph]) -> Vec<&str> {
        paragraphs.iter().map(|p| p.text.as_str()).collect()
    }

    fn start<'a>(name: &'a str) -> Event<'a> {
        Event::StartElement {
            name,
            attrs: Vec::new(),
        }
    }

    fn end(name: &str) -> Event<'_> {
        Event::EndElement { name }
    }

    #[test]
    fn state_transitions_follow_events() {
        let tags = block_tags();
        let mut builder = ParagraphBuilder::new(&tags);
        assert_eq!(builder.state(), &BuilderState::OutsideParagraph);

        builder.handle(start("p"));
        assert_eq!(builder.state(), &BuilderState::OutsideParagraph);

        builder.handle(Event::Characters("Some text"));
        assert_eq!(builder.state(), &BuilderState::InsideParagraph);

        builder.handle(Event::StartElement {
            name: "a",
            attrs: vec![("href", "/next")],
        });
        assert_eq!(
            builder.state(),
            &BuilderState::InsideLink {
                href: Some("/next".into()),
                linked_text: false
            }
        );

        builder.handle(Event::Characters("next page"));
        builder.handle(end("a"));
        assert_eq!(builder.state(), &BuilderState::InsideParagraph);

        builder.handle(end("p"));
        assert_eq!(builder.state(), &BuilderState::OutsideParagraph);

        let paragraphs = builder.finish();
        assert_eq!(texts(&paragraphs), vec!["Some text next page [/next]"]);
        assert_eq!(paragraphs[0].tag_count, 1);
    }

    #[test]
    fn block_elements_split_paragraphs_in_order() {
        let paragraphs = paragraphs_of(
            "<body><p>First paragraph.</p><div>Second block.</div><ul><li>Item one</li><li>Item two</li></ul></body>",
        );
        assert_eq!(
            texts(&paragraphs),
            vec!["First paragraph.", "Second block.", "Item one", "Item two"]
        );
        assert_eq!(paragraphs[0].dom_path, "html.body.p");
    }

    #[test]
    fn text_after_closing_block_starts_new_paragraph() {
        let paragraphs = paragraphs_of("<body><div><p>Inside.</p>Trailing text</div></body>");
        assert_eq!(texts(&paragraphs), vec!["Inside.", "Trailing text"]);
    }

    #[test]
    fn inline_chunks_join_with_single_spaces() {
        let paragraphs = paragraphs_of("<p>  Some   <b>bold</b>\n\n text <i>here</i> </p>");
        assert_eq!(texts(&paragraphs), vec!["Some bold text here"]);
        assert_eq!(paragraphs[0].total_char_count, 19);
        assert_eq!(paragraphs[0].tag_count, 2);
    }

    #[test]
    fn single_br_keeps_paragraph_double_br_splits() {
        let paragraphs = paragraphs_of("<p>line one<br>line two<br><br>line three</p>");
        assert_eq!(texts(&paragraphs), vec!["line one line two", "line three"]);
    }

    #[test]
    fn double_br_paragraph_path_names_enclosing_element() {
        let paragraphs = paragraphs_of("<body><p>line one<br><br>line two</p></body>");
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[0].dom_path, "html.body.p");
        assert_eq!(paragraphs[1].dom_path, "html.body.p");
    }

    #[test]
    fn br_separated_by_element_is_not_consecutive() {
        let paragraphs = paragraphs_of("<p>one<br><span></span><br>two</p>");
        assert_eq!(texts(&paragraphs), vec!["one two"]);
    }

    #[test]
    fn headings_are_flagged() {
        let paragraphs =
            paragraphs_of("<body><h2>A <em>heading</em></h2><p>Body text follows.</p></body>");
        assert_eq!(texts(&paragraphs), vec!["A heading", "Body text follows."]);
        assert!(paragraphs[0].is_heading);
        assert!(!paragraphs[1].is_heading);
    }

    #[test]
    fn fully_linked_paragraph_has_density_one() {
        let paragraphs = paragraphs_of(r#"<p><a href="/about">About us</a></p>"#);
        assert_eq!(texts(&paragraphs), vec!["About us [/about]"]);
        assert_eq!(paragraphs[0].link_char_count, paragraphs[0].total_char_count);
        assert_eq!(paragraphs[0].link_density(), 1.0);
    }

    #[test]
    fn several_links_in_one_block_stay_fully_linked() {
        let paragraphs =
            paragraphs_of(r#"<nav><a href="/1">Home</a><a href="/2">About</a></nav>"#);
        assert_eq!(texts(&paragraphs), vec!["Home [/1] About [/2]"]);
        assert_eq!(paragraphs[0].link_density(), 1.0);
    }

    #[test]
    fn paragraph_without_links_has_density_zero() {
        let paragraphs = paragraphs_of("<p>Plain words only.</p>");
        assert_eq!(paragraphs[0].link_char_count, 0);
        assert_eq!(paragraphs[0].link_density(), 0.0);
    }

    #[test]
    fn link_without_href_or_text_adds_no_annotation() {
        let paragraphs = paragraphs_of(r#"<p>Text <a>anchor</a> and <a href="/x"> </a>end</p>"#);
        assert_eq!(texts(&paragraphs), vec!["Text anchor and end"]);
        assert_eq!(paragraphs[0].link_char_count, " anchor".len());
    }

    #[test]
    fn link_spanning_blocks_annotates_each_part() {
        let paragraphs =
            paragraphs_of(r#"<body><a href="/card"><div>Card title</div><div>Card body</div></a></body>"#);
        assert_eq!(
            texts(&paragraphs),
            vec!["Card title [/card]", "Card body [/card]"]
        );
        assert!(paragraphs.iter().all(|p| p.link_density() == 1.0));
    }

    #[test]
    fn whitespace_only_document_yields_nothing() {
        assert!(paragraphs_of("   \n\t ").is_empty());
        assert!(paragraphs_of("<div>  </div><p>\n</p>").is_empty());
    }

    #[test]
    fn excluded_elements_never_reach_builder() {
        let paragraphs = paragraphs_of(
            "<body><script>alert('x')</script><p>Kept</p><style>.a{}</style></body>",
        );
        assert_eq!(texts(&paragraphs), vec!["Kept"]);
    }
}
