//! Markdown preview rendering for the markdown editor.
//!
//! Uses pulldown-cmark with GitHub-flavored extensions. The HTML is shown
//! inside the page, so raw HTML in the source is rendered as text, and the
//! generated markup is scrubbed of scripts, frames, embedded objects, inline
//! event handlers and `javascript:` URLs before it is returned.

use pulldown_cmark::{html, Event, Options, Parser};
use regex::Regex;
use std::sync::OnceLock;

/// Configuration for markdown rendering
#[derive(Debug, Clone)]
pub struct PreviewConfig {
    /// Enable GitHub-flavored markdown (tables, strikethrough, task lists)
    pub gfm: bool,
    pub sanitize_html: bool,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            gfm: true,
            sanitize_html: true,
        }
    }
}

/// Render markdown to HTML with the default configuration
pub fn render_preview(input: &str) -> String {
    render_preview_with_config(input, &PreviewConfig::default())
}

pub fn render_preview_with_config(input: &str, config: &PreviewConfig) -> String {
    let parser = Parser::new_ext(input, build_options(config));
    let mut output = String::with_capacity(input.len() * 2);

    if !config.sanitize_html {
        html::push_html(&mut output, parser);
        return output;
    }

    let escaped = parser.map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    html::push_html(&mut output, escaped);
    sanitize_html(&output)
}

fn build_options(config: &PreviewConfig) -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    if config.gfm {
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
    }
    options
}

struct SanitizePatterns {
    blocks: Regex,
    embeds: Regex,
    handlers: Regex,
    javascript_urls: Regex,
}

fn patterns() -> &'static SanitizePatterns {
    static PATTERNS: OnceLock<SanitizePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| SanitizePatterns {
        // (?s) lets . span newlines inside the removed element
        blocks: Regex::new(r"(?is)<(script|iframe|object)[^>]*>.*?</(script|iframe|object)>")
            .expect("valid block pattern"),
        embeds: Regex::new(r"(?i)<(embed|script|iframe|object)[^>]*/?>").expect("valid embed pattern"),
        // Only attributes inside a tag; escaped text has no `<`
        handlers: Regex::new(r#"(?i)(<[a-z][^>]*?)\s+on[a-z]+\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#)
            .expect("valid handler pattern"),
        javascript_urls: Regex::new(r#"(?i)(href|src)\s*=\s*(["']?)\s*javascript:[^"'\s>]*"#)
            .expect("valid url pattern"),
    })
}

fn sanitize_html(html: &str) -> String {
    let patterns = patterns();
    let cleaned = patterns.blocks.replace_all(html, "");
    let cleaned = patterns.embeds.replace_all(&cleaned, "");
    let mut cleaned = cleaned.into_owned();
    while patterns.handlers.is_match(&cleaned) {
        cleaned = patterns.handlers.replace_all(&cleaned, "$1").into_owned();
    }
    patterns
        .javascript_urls
        .replace_all(&cleaned, "$1=$2#")
        .into_owned()
}
