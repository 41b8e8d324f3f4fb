//! Page snapshots: the main document, its embedded frames and the
//! visibility rules used to read "what the user sees" out of raw HTML.

use std::path::Path;

use once_cell::sync::Lazy;
use scraper::node::Element;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{Result, ScanError};

static IFRAME_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("iframe").expect("Invalid iframe selector"));

static BODY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("body").expect("Invalid body selector"));

/// Elements that are never rendered
const NON_RENDERED: &[&str] = &["script", "style", "noscript", "template", "head", "iframe"];

/// Elements whose text starts on a new line when rendered
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "footer",
    "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol",
    "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Document load progress, mirroring `document.readyState`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Complete,
}

/// Content of an embedded frame
#[derive(Debug, Clone)]
pub enum FrameContent {
    /// Same-origin frame whose document can be read
    Loaded(Html),
    /// Frame on another origin; its document is off limits
    CrossOrigin,
    /// Same-origin frame whose document has not been supplied
    NotLoaded,
}

/// An embedded frame (`<iframe>`) of a page
#[derive(Debug, Clone)]
pub struct Frame {
    pub src: Option<String>,
    pub content: FrameContent,
}

impl Frame {
    /// Access the frame's document, failing for cross-origin frames
    pub fn document(&self) -> Result<Option<&Html>> {
        match &self.content {
            FrameContent::Loaded(doc) => Ok(Some(doc)),
            FrameContent::NotLoaded => Ok(None),
            FrameContent::CrossOrigin => Err(ScanError::CrossOriginAccessDenied(
                self.src.clone().unwrap_or_else(|| "<unknown>".to_string()),
            )),
        }
    }
}

/// A snapshot of a document and its frames
#[derive(Debug, Clone)]
pub struct Page {
    pub url: Option<Url>,
    pub document: Html,
    pub frames: Vec<Frame>,
    pub ready_state: ReadyState,
}

impl Page {
    /// Parse a page from HTML. `srcdoc` frames are parsed inline; frames with
    /// a `src` are recorded as cross-origin or not-yet-loaded.
    pub fn from_html(html: &str, url: Option<&str>) -> Result<Self> {
        let url = url.map(Url::parse).transpose()?;
        let document = Html::parse_document(html);

        let frames = document
            .select(&IFRAME_SELECTOR)
            .map(|iframe| {
                let src = iframe.value().attr("src").map(str::to_string);
                let content = if let Some(srcdoc) = iframe.value().attr("srcdoc") {
                    FrameContent::Loaded(Html::parse_document(srcdoc))
                } else if is_same_origin(url.as_ref(), src.as_deref()) {
                    FrameContent::NotLoaded
                } else {
                    FrameContent::CrossOrigin
                };
                Frame { src, content }
            })
            .collect();

        Ok(Self {
            url,
            document,
            frames,
            ready_state: ReadyState::Complete,
        })
    }

    /// Read a saved page from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let html = std::fs::read_to_string(path)?;
        Self::from_html(&html, None)
    }

    /// Supply the document for the frame with the given `src`.
    ///
    /// Cross-origin frames stay unreadable even when HTML is supplied.
    pub fn load_frame(&mut self, src: &str, html: &str) {
        let page_url = self.url.clone();
        let same_origin = is_same_origin(page_url.as_ref(), Some(src));
        let content = if same_origin {
            FrameContent::Loaded(Html::parse_document(html))
        } else {
            FrameContent::CrossOrigin
        };

        if let Some(frame) = self
            .frames
            .iter_mut()
            .find(|f| f.src.as_deref() == Some(src))
        {
            frame.content = content;
        } else {
            self.frames.push(Frame {
                src: Some(src.to_string()),
                content,
            });
        }
    }

    /// Visible text of the page body
    pub fn body_text(&self) -> String {
        body_text(&self.document)
    }
}

/// Visible text of a document's `<body>` (or root when there is none)
pub fn body_text(document: &Html) -> String {
    match document.select(&BODY_SELECTOR).next() {
        Some(body) => visible_text(body),
        None => visible_text(document.root_element()),
    }
}

/// Decide whether a frame `src` shares the page's origin.
///
/// Relative sources and `about:` documents inherit the page origin.
pub fn is_same_origin(page_url: Option<&Url>, frame_src: Option<&str>) -> bool {
    let Some(src) = frame_src else {
        return true;
    };
    if src.starts_with("about:") {
        return true;
    }

    match Url::parse(src) {
        Ok(frame_url) => match page_url {
            Some(page_url) => frame_url.origin() == page_url.origin(),
            None => false,
        },
        // Relative URL
        Err(url::ParseError::RelativeUrlWithoutBase) => true,
        Err(_) => false,
    }
}

/// Check an element's own attributes for anything that hides it
pub fn is_hidden_element(element: &Element) -> bool {
    if NON_RENDERED.contains(&element.name()) {
        return true;
    }
    if element.attr("hidden").is_some() {
        return true;
    }
    if element
        .attr("aria-hidden")
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    {
        return true;
    }

    element.attr("style").is_some_and(style_hides)
}

/// Inline style declarations that remove an element from view
fn style_hides(style: &str) -> bool {
    style.split(';').any(|decl| {
        let Some((prop, value)) = decl.split_once(':') else {
            return false;
        };
        let prop = prop.trim().to_ascii_lowercase();
        let value = value
            .trim()
            .trim_end_matches("!important")
            .trim()
            .to_ascii_lowercase();

        match prop.as_str() {
            "display" => value == "none",
            "visibility" => value == "hidden" || value == "collapse",
            "opacity" => value.parse::<f32>().is_ok_and(|o| o <= 0.0),
            _ => false,
        }
    })
}

/// An element is visible when neither it nor any ancestor is hidden
pub fn is_visible(element: ElementRef) -> bool {
    if is_hidden_element(element.value()) {
        return false;
    }
    !element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| is_hidden_element(ancestor.value()))
}

/// Rendered text of an element, skipping hidden descendants.
///
/// Block-level elements are separated by line breaks, roughly like
/// `innerText`.
pub fn visible_text(element: ElementRef) -> String {
    let mut out = String::new();
    collect_visible_text(element, &mut out);
    out
}

fn collect_visible_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            if is_hidden_element(child_el.value()) {
                continue;
            }
            let block = BLOCK_ELEMENTS.contains(&child_el.value().name());
            if block {
                out.push('\n');
            }
            collect_visible_text(child_el, out);
            if block {
                out.push('\n');
            }
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_hides() {
        assert!(style_hides("display: none"));
        assert!(style_hides("color: red; visibility:hidden"));
        assert!(style_hides("opacity: 0"));
        assert!(style_hides("display:none !important"));
        assert!(!style_hides("opacity: 0.5; display: block"));
    }

    #[test]
    fn test_visible_text_skips_hidden() {
        let html = r#"<html><body>
            <div id="job"><p>Shown text</p><p style="display:none">Secret</p>
            <script>var x = 1;</script></div></body></html>"#;
        let page = Page::from_html(html, None).unwrap();
        let text = page.body_text();
        assert!(text.contains("Shown text"));
        assert!(!text.contains("Secret"));
        assert!(!text.contains("var x"));
    }

    #[test]
    fn test_is_visible_checks_ancestors() {
        let html = r#"<html><body><div hidden><p class="inner">Hi</p></div></body></html>"#;
        let doc = Html::parse_document(html);
        let sel = Selector::parse(".inner").unwrap();
        let inner = doc.select(&sel).next().unwrap();
        assert!(!is_visible(inner));
    }

    #[test]
    fn test_same_origin() {
        let page = Url::parse("https://jobs.example.com/posting/1").unwrap();
        assert!(is_same_origin(Some(&page), Some("/embed/1")));
        assert!(is_same_origin(Some(&page), Some("about:blank")));
        assert!(is_same_origin(Some(&page), Some("https://jobs.example.com/embed")));
        assert!(!is_same_origin(Some(&page), Some("https://ads.other.com/frame")));
    }

    #[test]
    fn test_srcdoc_frame_is_loaded() {
        let html = r#"<html><body>
            <iframe srcdoc="<p>Embedded posting</p>"></iframe>
            <iframe src="https://ads.other.com/x"></iframe>
            </body></html>"#;
        let page = Page::from_html(html, Some("https://jobs.example.com/")).unwrap();
        assert_eq!(page.frames.len(), 2);
        assert!(matches!(page.frames[0].content, FrameContent::Loaded(_)));
        assert!(matches!(
            page.frames[1].document(),
            Err(ScanError::CrossOriginAccessDenied(_))
        ));
    }

    #[test]
    fn test_load_frame_respects_origin() {
        let html = r#"<html><body><iframe src="/embed/42"></iframe></body></html>"#;
        let mut page = Page::from_html(html, Some("https://jobs.example.com/")).unwrap();
        assert!(matches!(page.frames[0].content, FrameContent::NotLoaded));

        page.load_frame("/embed/42", "<p>Posting body</p>");
        assert!(matches!(page.frames[0].content, FrameContent::Loaded(_)));

        page.load_frame("https://evil.example.org/x", "<p>nope</p>");
        assert!(matches!(page.frames[1].content, FrameContent::CrossOrigin));
    }
}
