use std::borrow::Cow;

use pulldown_cmark::{html, Options, Parser};

use crate::config::ConfigMarkdown;

/// markdown in, html out
///
/// the html is untrusted until it has been through a [`Sanitizer`], see [`Renderer`]
pub trait Converter {
    fn convert(&self, markdown: &str) -> String;
}

/// html in, safe html out
pub trait Sanitizer {
    fn sanitize(&self, html: &str) -> String;
}

/// CommonMark conversion through pulldown-cmark
#[derive(Debug, Clone, Copy)]
pub struct Cmark {
    options: Options,
}

impl Cmark {
    pub fn new(options: Options) -> Self {
        Self { options }
    }
}

impl Default for Cmark {
    fn default() -> Self {
        Self::new(ConfigMarkdown::default().options())
    }
}

impl Converter for Cmark {
    fn convert(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}

/// Allow-list for user generated content.
///
/// Keeps ammonia's structural and formatting tags, drops `script`/`style` along with their
/// contents, event handler attributes and unsafe url schemes. On top of that the standard
/// `id`, `dir`, `lang` and `title` attributes are kept, `code` may carry a `language-*`
/// class and every link gets `rel="nofollow noopener noreferrer"`.
pub struct UgcPolicy {
    builder: ammonia::Builder<'static>,
}

impl UgcPolicy {
    pub fn new() -> Self {
        let mut builder = ammonia::Builder::default();
        builder
            .add_generic_attributes(&["id", "dir", "lang", "title"])
            .add_tag_attributes("code", &["class"])
            .attribute_filter(filter_attribute)
            .link_rel(Some("nofollow noopener noreferrer"));
        Self { builder }
    }
}

impl Default for UgcPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl Sanitizer for UgcPolicy {
    fn sanitize(&self, html: &str) -> String {
        self.builder.clean(html).to_string()
    }
}

fn filter_attribute<'u>(element: &str, attribute: &str, value: &'u str) -> Option<Cow<'u, str>> {
    match (element, attribute) {
        ("code", "class") => {
            let language = value.strip_prefix("language-")?;
            let valid = !language.is_empty()
                && language
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '+');
            valid.then_some(Cow::Borrowed(value))
        }
        _ => Some(Cow::Borrowed(value)),
    }
}

/// markdown to sanitized html: a converter followed by a sanitizer
///
/// both halves are pluggable, the defaults are pulldown-cmark and an ammonia policy for
/// user generated content
pub struct Renderer {
    converter: Box<dyn Converter>,
    sanitizer: Box<dyn Sanitizer>,
}

impl Renderer {
    pub fn new(converter: impl Converter + 'static, sanitizer: impl Sanitizer + 'static) -> Self {
        Self {
            converter: Box::new(converter),
            sanitizer: Box::new(sanitizer),
        }
    }

    /// Render raw file contents; invalid utf-8 is replaced rather than rejected.
    pub fn render(&self, input: &[u8]) -> String {
        let markdown = String::from_utf8_lossy(input);
        let unsafe_html = self.converter.convert(&markdown);
        self.sanitizer.sanitize(&unsafe_html)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(Cmark::default(), UgcPolicy::new())
    }
}

impl From<&ConfigMarkdown> for Renderer {
    fn from(value: &ConfigMarkdown) -> Self {
        Self::new(Cmark::new(value.options()), UgcPolicy::new())
    }
}
