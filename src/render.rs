//! Markdown to HTML rendering for chat messages.
//!
//! Renderers are pure functions of the full accumulated text. Capabilities
//! are layered by wrapping: [`ExternalLinks`] decorates whatever another
//! renderer produces so that every anchor opens in a new browsing context.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};
use thiserror::Error;

/// Attributes added to every generated anchor.
pub const EXTERNAL_LINK_ATTRS: &str = r#"target="_blank" rel="noopener noreferrer""#;

/// Errors a renderer may report instead of producing HTML.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("input of {len} bytes exceeds the render limit of {limit} bytes")]
    TooLarge { len: usize, limit: usize },
}

/// Converts message text into displayable HTML.
pub trait Renderer: Send + Sync {
    fn render(&self, text: &str) -> Result<String, RenderError>;
}

/// CommonMark renderer with the GitHub-flavoured extensions chat replies use.
///
/// Raw HTML in the input is escaped and shown as text, so the output only
/// contains markup the renderer generated itself. Link and image
/// destinations with a script-capable scheme are neutralised.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    options: Options,
    max_len: Option<usize>,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_TASKLISTS);
        Self {
            options,
            max_len: None,
        }
    }
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse inputs longer than `limit` bytes.
    pub fn with_max_len(mut self, limit: Option<usize>) -> Self {
        self.max_len = limit;
        self
    }
}

impl Renderer for MarkdownRenderer {
    fn render(&self, text: &str) -> Result<String, RenderError> {
        if let Some(limit) = self.max_len {
            if text.len() > limit {
                return Err(RenderError::TooLarge {
                    len: text.len(),
                    limit,
                });
            }
        }

        let parser = Parser::new_ext(text, self.options).map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => Event::Start(Tag::Link {
                link_type,
                dest_url: safe_destination(dest_url, "#", false),
                title,
                id,
            }),
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => Event::Start(Tag::Image {
                link_type,
                dest_url: safe_destination(dest_url, "", true),
                title,
                id,
            }),
            other => other,
        });

        let mut html_output = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut html_output, parser);
        Ok(html_output)
    }
}

/// Replace `url` with `replacement` when following it could run script.
///
/// Browsers drop ASCII tab and newline anywhere in a URL and ignore leading
/// control characters and spaces, so the scheme is checked after the same
/// normalisation. Raster `data:image/` URLs stay allowed for images.
fn safe_destination<'a>(url: CowStr<'a>, replacement: &'static str, image: bool) -> CowStr<'a> {
    let normalized: String = url
        .trim_start_matches(|c: char| c.is_ascii_control() || c == ' ')
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
        .take(32)
        .collect::<String>()
        .to_ascii_lowercase();

    let blocked = if normalized.starts_with("javascript:") || normalized.starts_with("vbscript:") {
        true
    } else if normalized.starts_with("data:") {
        !(image && is_raster_data_image(&normalized))
    } else {
        false
    };

    if blocked {
        CowStr::Borrowed(replacement)
    } else {
        url
    }
}

fn is_raster_data_image(normalized: &str) -> bool {
    ["data:image/png", "data:image/gif", "data:image/jpeg", "data:image/webp"]
        .iter()
        .any(|prefix| normalized.starts_with(prefix))
}

/// Decorator that makes every anchor open in a new tab without leaking
/// `window.opener` or the referrer.
#[derive(Debug, Clone, Default)]
pub struct ExternalLinks<R> {
    inner: R,
}

impl<R: Renderer> ExternalLinks<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Renderer> Renderer for ExternalLinks<R> {
    fn render(&self, text: &str) -> Result<String, RenderError> {
        self.inner.render(text).map(|html| decorate_anchors(&html))
    }
}

/// Insert [`EXTERNAL_LINK_ATTRS`] into every `<a` start tag.
pub fn decorate_anchors(html: &str) -> String {
    html.replace("<a ", &format!("<a {} ", EXTERNAL_LINK_ATTRS))
}

/// Markdown renderer with external-link decoration, the chat default.
pub fn default_renderer() -> ExternalLinks<MarkdownRenderer> {
    ExternalLinks::new(MarkdownRenderer::new())
}

/// Plain-text rendering used when a renderer fails.
pub fn fallback_html(text: &str) -> String {
    format!("<pre>{}</pre>", html_escape(text))
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
