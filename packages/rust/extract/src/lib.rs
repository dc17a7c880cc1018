//! Main-content extraction for HTML documents.
//!
//! The pipeline runs in five stages over one pre-fetched document:
//! 1. [`normalize`]: decode, parse, and detach non-content markup
//! 2. [`builder`]: walk the tree and build the paragraph sequence
//! 3. [`classify`]: label each paragraph from its own statistics
//! 4. [`revise`]: resolve borderline labels from their neighbours
//! 5. [`format`]: keep GOOD text and rewrap it to a fixed width
//!
//! [`Extractor`] bundles the configuration and stoplist so one instance can
//! be shared across threads and reused for any number of documents.

pub mod builder;
pub mod classify;
pub mod format;
pub mod normalize;
pub mod paragraph;
pub mod revise;
pub mod stoplists;

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, instrument};

use distill_shared::{AppConfig, ClassificationConfig, CleaningConfig, Result};

pub use builder::{BuilderState, Event, ParagraphBuilder, make_paragraphs};
pub use normalize::Normalizer;
pub use paragraph::{FinalLabel, Label, Paragraph};
pub use stoplists::{Stoplist, available_languages};

/// A configured, immutable extraction pipeline.
#[derive(Debug, Clone)]
pub struct Extractor {
    normalizer: Normalizer,
    block_tags: HashSet<String>,
    classification: ClassificationConfig,
    stoplist: Stoplist,
}

impl Extractor {
    /// Build an extractor from explicit configuration values.
    pub fn new(
        cleaning: &CleaningConfig,
        classification: ClassificationConfig,
        stoplist: Stoplist,
    ) -> Result<Self> {
        Ok(Self {
            normalizer: Normalizer::new(cleaning)?,
            block_tags: cleaning.block_tags.iter().cloned().collect(),
            classification,
            stoplist,
        })
    }

    /// Build an extractor from the application config, loading its stoplist.
    ///
    /// An unknown language or unreadable stoplist file fails here, before
    /// any document is processed.
    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        let stoplist = match &config.classification.stoplist_file {
            Some(file) => Stoplist::from_file(Path::new(file))?,
            None => Stoplist::builtin(&config.classification.language)?,
        };

        debug!(
            language = %config.classification.language,
            stopwords = stoplist.len(),
            "loaded stoplist"
        );

        Self::new(
            &CleaningConfig::from(config),
            ClassificationConfig::from(config),
            stoplist,
        )
    }

    /// Run stages 1–4 and return the labelled paragraphs.
    #[instrument(skip_all, fields(html_len = html.len()))]
    pub fn paragraphs(&self, html: &str) -> Vec<Paragraph> {
        let doc = self.normalizer.normalize(html);
        let mut paragraphs = make_paragraphs(&doc, &self.block_tags);

        classify::classify_paragraphs(&mut paragraphs, &self.stoplist, &self.classification);
        revise::revise_paragraphs(&mut paragraphs, self.classification.max_heading_distance);

        debug!(
            paragraphs = paragraphs.len(),
            kept = paragraphs.iter().filter(|p| !p.is_boilerplate()).count(),
            "classified paragraphs"
        );

        paragraphs
    }

    /// Extract the main content of `html` as wrapped plain text.
    ///
    /// Returns an empty string when nothing is classified as content.
    pub fn extract(&self, html: &str) -> String {
        let paragraphs = self.paragraphs(html);
        format::format_text(&paragraphs, self.classification.max_line_width)
    }

    /// Decode raw document bytes, honouring `charset` when recognised.
    pub fn decode(&self, bytes: &[u8], charset: Option<&str>) -> String {
        self.normalizer.decode(bytes, charset)
    }

    /// Decode `bytes` (using `charset` if recognised) and extract.
    pub fn extract_bytes(&self, bytes: &[u8], charset: Option<&str>) -> String {
        let html = self.decode(bytes, charset);
        self.extract(&html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROSE: &str = "The history of the old town is long and it is full of surprises for \
        all of the people who visit it. It was founded on the banks of a wide river by a \
        group of farmers who wanted to trade with the people that lived in the hills. Over \
        the years it grew into a busy market town, and many of the old buildings can still \
        be seen there today.";

    fn scenario_config() -> ClassificationConfig {
        ClassificationConfig {
            length_low: 70,
            length_high: 200,
            stopwords_low: 0.30,
            stopwords_high: 0.32,
            max_link_density: 0.3,
            no_headings: false,
            max_heading_distance: 2,
            max_line_width: 79,
        }
    }

    fn extractor(config: ClassificationConfig) -> Extractor {
        Extractor::new(
            &CleaningConfig::default(),
            config,
            Stoplist::builtin("English").unwrap(),
        )
        .unwrap()
    }

    fn article_page() -> String {
        format!(
            r#"<html><body>
            <nav><a href="/1">Home</a><a href="/2">About</a></nav>
            <article><p>{PROSE}</p></article>
            <footer>© 2023 Example</footer>
            </body></html>"#
        )
    }

    #[test]
    fn keeps_article_and_drops_nav_and_footer() {
        let extractor = extractor(scenario_config());
        let output = extractor.extract(&article_page());

        let expected = format::wrap_line(&PROSE.split_whitespace().collect::<Vec<_>>().join(" "), 79);
        assert_eq!(output, expected);
        assert!(!output.contains("Home"));
        assert!(!output.contains("2023"));
        assert!(output.lines().all(|l| l.chars().count() <= 79));
    }

    #[test]
    fn scenario_paragraph_labels() {
        let extractor = extractor(scenario_config());
        let paragraphs = extractor.paragraphs(&article_page());

        assert_eq!(paragraphs.len(), 3);
        assert_eq!(paragraphs[0].link_density(), 1.0);
        assert_eq!(paragraphs[0].context_free_label, Some(Label::Bad));
        assert_eq!(paragraphs[1].context_free_label, Some(Label::Good));
        assert_eq!(paragraphs[2].context_free_label, Some(Label::Bad));
        assert_eq!(
            paragraphs
                .iter()
                .map(|p| p.final_label.unwrap())
                .collect::<Vec<_>>(),
            vec![FinalLabel::Bad, FinalLabel::Good, FinalLabel::Bad]
        );
    }

    #[test]
    fn all_short_document_extracts_nothing() {
        let html = "<body><p>Short one.</p><p>Another short line.</p><div>Tiny</div></body>";
        let extractor = extractor(scenario_config());

        let paragraphs = extractor.paragraphs(html);
        assert!(paragraphs.iter().all(|p| p.context_free_label == Some(Label::Short)));
        assert_eq!(extractor.extract(html), "");
    }

    #[test]
    fn empty_input_extracts_nothing() {
        let extractor = extractor(scenario_config());
        assert_eq!(extractor.extract(""), "");
        assert_eq!(extractor.extract("   \n "), "");
        assert_eq!(extractor.extract_bytes(b"", None), "");
    }

    #[test]
    fn heading_before_article_is_kept_within_distance() {
        let html = format!(
            "<body><h1>A short town history</h1><p>{PROSE}</p></body>"
        );

        let near = extractor(scenario_config()).extract(&html);
        assert!(near.starts_with("A short town history\n\nThe history"));

        let far = extractor(ClassificationConfig {
            max_heading_distance: 0,
            ..scenario_config()
        })
        .extract(&html);
        assert!(far.starts_with("The history"));
    }

    #[test]
    fn extraction_is_deterministic() {
        let extractor = extractor(scenario_config());
        let page = article_page();
        let first = extractor.extract(&page);
        let second = extractor.extract(&page);
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn extract_bytes_decodes_legacy_encodings() {
        let text = "Это история старого города, и она очень длинная. Он был основан на \
            берегу широкой реки, и с тех пор в нём жили люди, которые торговали с теми, \
            кто жил в горах. Многие старые дома можно увидеть там и сегодня, и это \
            очень красиво.";
        let html = format!("<html><body><p>{text}</p></body></html>");
        let (bytes, _, _) = encoding_rs::WINDOWS_1251.encode(&html);

        let mut config = AppConfig::default();
        config.classification.language = "Russian".into();
        config.classification.max_link_density = 0.3;
        let extractor = Extractor::from_app_config(&config).unwrap();

        let output = extractor.extract_bytes(&bytes, Some("windows-1251"));
        assert!(output.starts_with("Это история"));
    }

    const RUSSIAN_NEWS: &str = "В среду в Москве прошло заседание правительства, на котором \
        министры обсудили, как будут расти цены на продукты в этом году. По словам главы \
        ведомства, в ближайшие месяцы они не должны вырасти больше чем на пять процентов, \
        однако это будет зависеть от того, что произойдет на мировых рынках.";

    const ENGLISH_NEWS: &str = "The city council voted on Tuesday to approve a new budget for \
        the next year, which will increase spending on public schools and road repairs. The \
        mayor said that the plan was the result of months of talks with residents, and that \
        it would not raise taxes for most of the families who live in the area.";

    fn news_page(title: &str, body: &str) -> String {
        format!(
            r#"<html><head><title>{title}</title></head><body>
            <nav><a href="/">Главная</a> <a href="/news">Новости</a> <a href="/world">Мир</a></nav>
            <h1>{title}</h1>
            <div class="text"><p>{body}</p></div>
            <footer>© 1999–2024 News Media</footer>
            </body></html>"#
        )
    }

    #[test]
    fn default_config_keeps_ordinary_news_prose() {
        for (language, title, body) in [
            ("Russian", "Правительство обсудило цены", RUSSIAN_NEWS),
            ("English", "Council approves budget", ENGLISH_NEWS),
        ] {
            let mut config = AppConfig::default();
            config.classification.language = language.into();
            let extractor = Extractor::from_app_config(&config).unwrap();

            let output = extractor.extract(&news_page(title, body));

            assert!(!output.is_empty(), "{language}: nothing extracted");
            let kept: Vec<&str> = output.split_whitespace().collect();
            let words: Vec<&str> = body.split_whitespace().collect();
            assert!(kept.ends_with(&words), "{language}: {output}");
            assert!(!output.contains("2024"));
        }
    }

    #[test]
    fn unknown_language_fails_before_processing() {
        let mut config = AppConfig::default();
        config.classification.language = "Elvish".into();
        assert!(Extractor::from_app_config(&config).is_err());
    }

    #[test]
    fn extractor_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Extractor>();
    }
}
