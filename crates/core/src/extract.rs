//! Article extraction: title, publication date and body text.
//!
//! Each field is found by its own selector cascade (see [`crate::cascade`]),
//! most specific selectors first. Nothing here touches the network; callers
//! hand in the page HTML.
//!
//! # Example
//!
//! ```rust
//! use referent_core::extract_article;
//!
//! let html = r#"
//!     <html><head><title>Site | Post</title></head>
//!     <body>
//!         <h1 class="entry-title">A Post</h1>
//!         <time datetime="2024-03-05T10:00:00Z">March 5</time>
//!         <div class="content"><p>Short body.</p></div>
//!     </body></html>
//! "#;
//!
//! let article = extract_article(html).unwrap();
//! assert_eq!(article.title.as_deref(), Some("A Post"));
//! assert_eq!(article.date.as_deref(), Some("2024-03-05T10:00:00Z"));
//! assert_eq!(article.content.as_deref(), Some("Short body."));
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cascade::{Acceptance, Rule, run_cascade};
use crate::parse::Document;
use crate::{ReferentError, Result};

/// Body text of this many characters or fewer is treated as an excerpt.
pub const CONTENT_MIN_CHARS: usize = 200;

/// Boilerplate removed from a content candidate before reading its text.
pub const CONTENT_NOISE: &str = "nav, .nav, .navigation, .menu, .sidebar, .ad, .advertisement, .ads, script, style, \
                                 .comments, .comment-section, .social-share, .share-buttons";

/// Boilerplate removed from `<main>` when it is used as the last resort.
pub const FALLBACK_NOISE: &str = "nav, .nav, header, footer, script, style";

const DATE_ATTRIBUTES: &[&str] = &["datetime", "content"];

pub const TITLE_RULES: &[Rule] = &[
    Rule::text("h1.entry-title"),
    Rule::text("h1.post-title"),
    Rule::text("h1.article-title"),
    Rule::text("article h1"),
    Rule::text(".post h1"),
    Rule::text(".content h1"),
    Rule::text(".entry-content h1"),
    Rule::text("main h1"),
    Rule::text("article header h1"),
    Rule::text("h1"),
    Rule::text("title"),
];

pub const DATE_RULES: &[Rule] = &[
    Rule::attributes_then_text("time[datetime]", DATE_ATTRIBUTES),
    Rule::attributes_then_text("time", DATE_ATTRIBUTES),
    Rule::attributes_then_text(".published-date", DATE_ATTRIBUTES),
    Rule::attributes_then_text(".post-date", DATE_ATTRIBUTES),
    Rule::attributes_then_text(".article-date", DATE_ATTRIBUTES),
    Rule::attributes_then_text(".entry-date", DATE_ATTRIBUTES),
    Rule::attributes_then_text(".date", DATE_ATTRIBUTES),
    Rule::attributes_then_text(r#"[itemprop="datePublished"]"#, DATE_ATTRIBUTES),
    Rule::attributes_then_text(r#"meta[property="article:published_time"]"#, DATE_ATTRIBUTES),
    Rule::attributes_then_text(r#"meta[name="pubdate"]"#, DATE_ATTRIBUTES),
    Rule::attributes_then_text(r#"meta[name="publish-date"]"#, DATE_ATTRIBUTES),
];

const BODY: Acceptance = Acceptance::LongerThan(CONTENT_MIN_CHARS);

pub const CONTENT_RULES: &[Rule] = &[
    Rule::stripped("article", CONTENT_NOISE, BODY),
    Rule::stripped(".post", CONTENT_NOISE, BODY),
    Rule::stripped(".content", CONTENT_NOISE, BODY),
    Rule::stripped(".entry-content", CONTENT_NOISE, BODY),
    Rule::stripped(".article-content", CONTENT_NOISE, BODY),
    Rule::stripped(".post-content", CONTENT_NOISE, BODY),
    Rule::stripped(".main-content", CONTENT_NOISE, BODY),
    Rule::stripped(r#"[role="article"]"#, CONTENT_NOISE, BODY),
    Rule::stripped("main article", CONTENT_NOISE, BODY),
    Rule::stripped(".entry", CONTENT_NOISE, BODY),
    Rule::stripped(".article-body", CONTENT_NOISE, BODY),
];

pub const FALLBACK_CONTENT_RULES: &[Rule] = &[Rule::stripped("main", FALLBACK_NOISE, Acceptance::NonEmpty)];

/// Best-guess article fields. Absent fields are `None`, never empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Article headline.
    pub title: Option<String>,
    /// Publication timestamp exactly as the page states it.
    pub date: Option<String>,
    /// Plain body text with boilerplate removed.
    pub content: Option<String>,
}

impl ExtractionResult {
    /// Body text, or [`ReferentError::ExtractionEmpty`] when none was found.
    pub fn require_content(&self) -> Result<&str> {
        self.content.as_deref().ok_or(ReferentError::ExtractionEmpty)
    }

    /// True when no field was found.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.date.is_none() && self.content.is_none()
    }
}

/// Extracts title, date and body text from raw HTML.
///
/// "Not found" is never an error: missing fields are `None`. The only error
/// is [`ReferentError::MarkupError`].
pub fn extract_article(html: &str) -> Result<ExtractionResult> {
    let mut doc = Document::parse(html)?;
    extract_from_document(&mut doc)
}

/// Runs the three cascades over an already parsed document.
///
/// Content extraction prunes boilerplate from `doc` in place.
pub fn extract_from_document(doc: &mut Document) -> Result<ExtractionResult> {
    let title = run_cascade(doc, TITLE_RULES)?;
    let date = run_cascade(doc, DATE_RULES)?;

    let content = match run_cascade(doc, CONTENT_RULES)? {
        Some(content) => Some(content),
        None => run_cascade(doc, FALLBACK_CONTENT_RULES)?,
    };

    debug!(
        title = title.is_some(),
        date = date.is_some(),
        content_chars = content.as_ref().map(|c| c.chars().count()).unwrap_or(0),
        "extracted article"
    );

    Ok(ExtractionResult { title, date, content })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn long_body() -> String {
        "word ".repeat(250)
    }

    #[test]
    fn test_title_absent_without_candidates() {
        let result = extract_article("<html><body><p>No headings here.</p></body></html>").unwrap();
        assert_eq!(result.title, None);
    }

    #[test]
    fn test_title_falls_back_to_document_title() {
        let html = "<html><head><title> Page Title </title></head><body><h1></h1></body></html>";
        let result = extract_article(html).unwrap();
        assert_eq!(result.title.as_deref(), Some("Page Title"));
    }

    #[rstest]
    #[case(r#"<h1>Generic</h1><h1 class="entry-title">Entry</h1>"#, "Entry")]
    #[case(r#"<h1>Generic</h1><h1 class="post-title">Post</h1>"#, "Post")]
    #[case(r#"<h1>Generic</h1><article><h1>In Article</h1></article>"#, "In Article")]
    #[case(r#"<h1>Generic</h1><main><h1>In Main</h1></main>"#, "In Main")]
    #[case(r#"<h2>Sub</h2><h1>Generic</h1>"#, "Generic")]
    fn test_title_priority(#[case] body: &str, #[case] expected: &str) {
        let html = format!("<html><head><title>Doc</title></head><body>{body}</body></html>");
        let result = extract_article(&html).unwrap();
        assert_eq!(result.title.as_deref(), Some(expected));
    }

    #[test]
    fn test_only_first_match_per_title_selector() {
        let html = r#"<h1 class="entry-title"> </h1><h1 class="entry-title">Second</h1><h1 class="post-title">Post</h1>"#;
        let result = extract_article(html).unwrap();
        assert_eq!(result.title.as_deref(), Some("Post"));
    }

    #[test]
    fn test_datetime_attribute_wins_over_text() {
        let html = r#"<time datetime="2024-01-01">January 1st, 2024</time>"#;
        let result = extract_article(html).unwrap();
        assert_eq!(result.date.as_deref(), Some("2024-01-01"));
    }

    #[rstest]
    #[case(r#"<time>Yesterday</time>"#, "Yesterday")]
    #[case(r#"<span class="post-date"> 5 May 2023 </span>"#, "5 May 2023")]
    #[case(r#"<span itemprop="datePublished" content="2022-02-02">Feb</span>"#, "2022-02-02")]
    #[case(r#"<meta property="article:published_time" content="2021-07-08T09:00:00Z">"#, "2021-07-08T09:00:00Z")]
    #[case(r#"<meta name="pubdate" content="20200101">"#, "20200101")]
    #[case(r#"<meta name="publish-date" content="2019-12-31">"#, "2019-12-31")]
    fn test_date_sources(#[case] markup: &str, #[case] expected: &str) {
        let html = format!("<html><head></head><body>{markup}</body></html>");
        let result = extract_article(&html).unwrap();
        assert_eq!(result.date.as_deref(), Some(expected));
    }

    #[test]
    fn test_date_is_not_normalized() {
        let html = r#"<span class="date">last Tuesday-ish</span>"#;
        let result = extract_article(html).unwrap();
        assert_eq!(result.date.as_deref(), Some("last Tuesday-ish"));
    }

    #[test]
    fn test_empty_date_element_continues_cascade() {
        let html = r#"<time></time><span class="date">2020-01-01</span>"#;
        let result = extract_article(html).unwrap();
        assert_eq!(result.date.as_deref(), Some("2020-01-01"));
    }

    #[test]
    fn test_noise_removed_and_long_content_accepted() {
        let body = long_body();
        let html = format!(
            r#"<article><nav>spam</nav><p>{body}</p></article>
               <div class="post"><p>Later post block that must be ignored.</p></div>"#
        );
        let result = extract_article(&html).unwrap();
        let content = result.content.unwrap();

        assert!(!content.contains("spam"));
        assert!(!content.contains("Later post block"));
        assert!(content.chars().count() > CONTENT_MIN_CHARS);
        assert_eq!(content, body.trim());
    }

    #[test]
    fn test_stripped_noise_is_not_picked_up_by_later_rules() {
        let body = long_body();
        let html = format!(
            r#"<article><div class="sidebar"><div class="post">Related teaser</div></div><p>tiny</p></article>
               <div class="post"><p>{body}</p></div>"#
        );
        let content = extract_article(&html).unwrap().content.unwrap();

        assert!(!content.contains("Related teaser"));
        assert_eq!(content, body.trim());
    }

    #[test]
    fn test_title_follows_tree_order_after_foster_parenting() {
        let html = "<html><body><table><tr><td><h1>Cell</h1></td></tr><h1>Fostered</h1></table></body></html>";
        let result = extract_article(html).unwrap();
        assert_eq!(result.title.as_deref(), Some("Fostered"));
    }

    #[test]
    fn test_all_noise_selectors_stripped() {
        let body = long_body();
        let html = format!(
            r#"<article>
                <div class="menu">MENU</div><aside class="sidebar">SIDEBAR</aside>
                <div class="ad">AD1</div><div class="advertisement">AD2</div><div class="ads">AD3</div>
                <script>var SCRIPT = 1;</script><style>.STYLE {{}}</style>
                <div class="comments">COMMENTS</div><div class="comment-section">THREAD</div>
                <div class="social-share">SHARE1</div><div class="share-buttons">SHARE2</div>
                <ul class="navigation">NAVIGATION</ul><div class="nav">NAVDIV</div>
                <p>{body}</p>
            </article>"#
        );
        let content = extract_article(&html).unwrap().content.unwrap();

        let noise = [
            "MENU", "SIDEBAR", "AD1", "AD2", "AD3", "SCRIPT", "STYLE", "COMMENTS", "THREAD", "SHARE1", "SHARE2",
            "NAVIGATION", "NAVDIV",
        ];
        for noise in noise {
            assert!(!content.contains(noise), "{noise} should be stripped");
        }
    }

    #[test]
    fn test_short_candidate_retained() {
        let html = r#"<html><body><div class="content">short</div></body></html>"#;
        let result = extract_article(html).unwrap();
        assert_eq!(result.content.as_deref(), Some("short"));
    }

    #[test]
    fn test_later_candidate_overwrites_earlier_short_one() {
        let html = r#"<article>teaser</article><div class="entry">another excerpt</div>"#;
        let result = extract_article(html).unwrap();
        assert_eq!(result.content.as_deref(), Some("another excerpt"));
    }

    #[test]
    fn test_later_long_block_clears_threshold() {
        let body = long_body();
        let html = format!(r#"<article>teaser</article><div class="article-body">{body}</div>"#);
        let result = extract_article(&html).unwrap();
        assert_eq!(result.content.as_deref(), Some(body.trim()));
    }

    #[test]
    fn test_main_fallback() {
        let html = r#"<html><body><main><footer>ignored</footer><p>Real text</p></main></body></html>"#;
        let result = extract_article(html).unwrap();
        assert_eq!(result.content.as_deref(), Some("Real text"));
    }

    #[test]
    fn test_main_fallback_strips_header_and_nav() {
        let html = r#"<main><header>Masthead</header><nav>Links</nav><div class="nav">More</div><p>Body</p></main>"#;
        let result = extract_article(html).unwrap();
        assert_eq!(result.content.as_deref(), Some("Body"));
    }

    #[test]
    fn test_fallback_skipped_when_candidate_exists() {
        let html = r#"<div class="post">tiny</div><main><p>Main text</p></main>"#;
        let result = extract_article(html).unwrap();
        assert_eq!(result.content.as_deref(), Some("tiny"));
    }

    #[test]
    fn test_no_content_anywhere() {
        let result = extract_article("<html><body><div>loose text</div></body></html>").unwrap();
        assert_eq!(result.content, None);
        assert!(matches!(result.require_content(), Err(ReferentError::ExtractionEmpty)));
    }

    #[test]
    fn test_content_has_no_markup() {
        let body = long_body();
        let html = format!(r#"<article><p><b>Bold</b> and <a href="/x">link</a> {body}</p></article>"#);
        let content = extract_article(&html).unwrap().content.unwrap();
        assert!(!content.contains('<'));
        assert!(content.starts_with("Bold and link"));
    }

    #[rstest]
    #[case("")]
    #[case("not html at all")]
    #[case("<<<>>><div")]
    #[case("<html><body></body></html>")]
    fn test_never_fails_on_odd_input(#[case] html: &str) {
        let result = extract_article(html).unwrap();
        assert!(result.content.is_none());
        assert_ne!(result.title.as_deref(), Some(""));
    }

    #[test]
    fn test_deterministic() {
        let body = long_body();
        let html = format!(
            r#"<html><head><title>T</title></head><body><time datetime="2024-01-01"></time>
               <article><nav>x</nav><p>{body}</p></article></body></html>"#
        );
        assert_eq!(extract_article(&html).unwrap(), extract_article(&html).unwrap());
    }

    #[test]
    fn test_serializes_absent_fields_as_null() {
        let result = ExtractionResult { title: Some("T".into()), ..Default::default() };
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["title"], "T");
        assert!(json["date"].is_null());
        assert!(json["content"].is_null());
    }
}
