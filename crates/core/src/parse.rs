//! HTML parsing and DOM manipulation.
//!
//! This module provides the [`Document`] and [`Element`] types for parsing
//! HTML, querying it with CSS selectors and pruning subtrees in place.
//!
//! # Example
//!
//! ```rust
//! use referent_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <h1>Title</h1>
//!             <p class="content">Paragraph</p>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html).unwrap();
//! let heading = doc.select_first("h1").unwrap().unwrap();
//! assert_eq!(heading.trimmed_text(), "Title");
//! ```

use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};

use crate::{ReferentError, Result};

/// Represents a parsed HTML document.
///
/// Parsing is lenient: malformed markup is recovered the way browsers do,
/// so any string produces a tree.
///
/// # Example
///
/// ```rust
/// use referent_core::parse::Document;
///
/// let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
/// let doc = Document::parse(html).unwrap();
/// assert_eq!(doc.title(), Some("Test".to_string()));
/// ```
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML from a string.
    ///
    /// # Example
    ///
    /// ```rust
    /// use referent_core::parse::Document;
    ///
    /// let html = "<html><body><h1>Title</h1></body></html>";
    /// let doc = Document::parse(html).unwrap();
    /// ```
    pub fn parse(html: &str) -> Result<Self> {
        let html = Html::parse_document(html);
        Ok(Self { html })
    }

    /// Selects elements using a CSS selector, in document order.
    ///
    /// Only elements attached to the tree are visited; subtrees removed with
    /// [`Document::remove_within`] never match.
    ///
    /// # Errors
    ///
    /// Returns [`ReferentError::MarkupError`] if the selector is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use referent_core::parse::Document;
    ///
    /// let html = r#"<p class="content">First</p><p class="content">Second</p>"#;
    /// let doc = Document::parse(html).unwrap();
    /// let elements = doc.select("p.content").unwrap();
    /// assert_eq!(elements.len(), 2);
    /// ```
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = compile(selector)?;
        Ok(self.html.root_element().select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Selects the first element matching a CSS selector in document order.
    ///
    /// Later matches are never visited.
    pub fn select_first(&'_ self, selector: &str) -> Result<Option<Element<'_>>> {
        let sel = compile(selector)?;
        Ok(self.html.root_element().select(&sel).next().map(|el| Element { element: el }))
    }

    /// Looks up an element by its node id.
    ///
    /// Returns `None` if the id does not refer to an element.
    pub fn element(&'_ self, id: NodeId) -> Option<Element<'_>> {
        self.html.tree.get(id).and_then(ElementRef::wrap).map(|el| Element { element: el })
    }

    /// Removes every descendant of `scope` matching `selector`, with its subtree.
    ///
    /// The scope element itself is never removed. Returns the number of
    /// matched elements that were detached.
    ///
    /// # Example
    ///
    /// ```rust
    /// use referent_core::parse::Document;
    ///
    /// let mut doc = Document::parse("<article><nav>menu</nav><p>Body</p></article>").unwrap();
    /// let article = doc.select_first("article").unwrap().unwrap().id();
    ///
    /// assert_eq!(doc.remove_within(article, "nav").unwrap(), 1);
    /// assert_eq!(doc.element(article).unwrap().trimmed_text(), "Body");
    /// ```
    pub fn remove_within(&mut self, scope: NodeId, selector: &str) -> Result<usize> {
        let sel = compile(selector)?;
        let doomed: Vec<NodeId> = match self.element(scope) {
            Some(scope) => scope.element.select(&sel).map(|el| el.id()).collect(),
            None => return Ok(0),
        };

        for id in &doomed {
            if let Some(mut node) = self.html.tree.get_mut(*id) {
                node.detach();
            }
        }

        Ok(doomed.len())
    }

    /// Gets the title of the document.
    ///
    /// Returns the trimmed content of the `<title>` element if present.
    pub fn title(&self) -> Option<String> {
        self.select_first("title").ok().flatten().map(|el| el.trimmed_text())
    }
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ReferentError::MarkupError(format!("Invalid selector {selector:?}: {e}")))
}

/// A wrapper around scraper's ElementRef.
///
/// # Example
///
/// ```rust
/// use referent_core::parse::Document;
///
/// let html = r#"<a href="https://example.com">Link text</a>"#;
/// let doc = Document::parse(html).unwrap();
/// let link = &doc.select("a").unwrap()[0];
///
/// assert_eq!(link.text(), "Link text");
/// assert_eq!(link.attr("href"), Some("https://example.com"));
/// ```
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Node id of this element, stable while the element stays attached.
    pub fn id(&self) -> NodeId {
        self.element.id()
    }

    /// Gets the text content of this element.
    ///
    /// Returns the concatenation of all descendant text nodes.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Text content with leading and trailing whitespace removed.
    pub fn trimmed_text(&self) -> String {
        self.text().trim().to_string()
    }

    /// Gets the value of an attribute.
    ///
    /// Returns `None` if the attribute is not present.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <meta charset="UTF-8">
            <title>  Test Page  </title>
        </head>
        <body>
            <h1>Heading</h1>
            <p class="content">Paragraph 1</p>
            <p class="content">Paragraph 2</p>
            <a href="https://example.com">Link</a>
        </body>
        </html>
    "#;

    #[test]
    fn test_parse_document() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        assert_eq!(doc.title(), Some("Test Page".to_string()));
    }

    #[test]
    fn test_select_elements() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let elements = doc.select("p.content").unwrap();

        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].text(), "Paragraph 1");
        assert_eq!(elements[1].text(), "Paragraph 2");
    }

    #[test]
    fn test_select_first_in_document_order() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let first = doc.select_first("p.content").unwrap().unwrap();
        assert_eq!(first.text(), "Paragraph 1");
        assert!(doc.select_first("table").unwrap().is_none());
    }

    #[test]
    fn test_element_attributes() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let elements = doc.select("a").unwrap();

        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].attr("href"), Some("https://example.com"));
        assert_eq!(elements[0].attr("title"), None);
    }

    #[test]
    fn test_removed_subtree_never_matches() {
        let html = r#"<article><nav><h1>Menu heading</h1><p class="x">link</p></nav><p>Body</p></article>"#;
        let mut doc = Document::parse(html).unwrap();
        let article = doc.select_first("article").unwrap().unwrap().id();

        doc.remove_within(article, "nav").unwrap();

        assert!(doc.select_first("h1").unwrap().is_none());
        assert!(doc.select(".x").unwrap().is_empty());
        assert_eq!(doc.select("p").unwrap().len(), 1);
    }

    #[test]
    fn test_matches_follow_tree_order_after_foster_parenting() {
        // the stray h1 is moved in front of the table by the parser
        let html = "<body><table><tr><td><h1>Cell</h1></td></tr><h1>Fostered</h1></table></body>";
        let doc = Document::parse(html).unwrap();

        let first = doc.select_first("h1").unwrap().unwrap();
        assert_eq!(first.trimmed_text(), "Fostered");

        let all: Vec<String> = doc.select("h1").unwrap().iter().map(|el| el.trimmed_text()).collect();
        assert_eq!(all, ["Fostered", "Cell"]);
    }

    #[test]
    fn test_invalid_selector() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let result = doc.select("[[invalid");

        assert!(matches!(result, Err(ReferentError::MarkupError(_))));
    }

    #[test]
    fn test_text_flattens_descendants() {
        let doc = Document::parse("<div id='x'>  one <b>two</b> <i>three</i>  </div>").unwrap();
        let div = doc.select_first("#x").unwrap().unwrap();
        assert_eq!(div.trimmed_text(), "one two three");
    }

    #[test]
    fn test_remove_within_only_touches_scope() {
        let html = r#"
            <nav>outer nav</nav>
            <article><nav>inner nav</nav><div class="ad"><p>buy</p></div><p>Body</p></article>
        "#;
        let mut doc = Document::parse(html).unwrap();
        let article = doc.select_first("article").unwrap().unwrap().id();

        let removed = doc.remove_within(article, "nav, .ad, p").unwrap();
        assert_eq!(removed, 4);

        assert_eq!(doc.element(article).unwrap().trimmed_text(), "");
        assert_eq!(doc.select("nav").unwrap().len(), 1);
        assert_eq!(doc.select_first("nav").unwrap().unwrap().trimmed_text(), "outer nav");
    }

    #[test]
    fn test_remove_within_does_not_remove_scope() {
        let mut doc = Document::parse("<div class='nav'><div class='nav'>x</div>y</div>").unwrap();
        let outer = doc.select_first(".nav").unwrap().unwrap().id();

        doc.remove_within(outer, ".nav").unwrap();

        let outer = doc.element(outer).unwrap();
        assert_eq!(outer.trimmed_text(), "y");
    }

    #[test]
    fn test_malformed_markup_is_recovered() {
        let doc = Document::parse("<div><p>unclosed <b>bold</div><span>tail").unwrap();
        let text = doc.select_first("body").unwrap().unwrap().text();

        assert!(text.contains("unclosed"));
        assert!(text.contains("tail"));
        assert_eq!(doc.select_first("span").unwrap().unwrap().trimmed_text(), "tail");
    }
}
