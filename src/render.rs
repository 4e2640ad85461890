//! Rendering adapters: markdown, highlighted code blocks, theme stylesheet.
//!
//! All functions are pure with respect to their inputs; syntax and theme
//! sets are loaded once into statics. comrak and syntect are CPU-bound, so
//! handlers call these under `spawn_blocking`.

use comrak::plugins::syntect::SyntectAdapter;
use comrak::{markdown_to_html_with_plugins, Options, Plugins};
use once_cell::sync::Lazy;
use syntect::highlighting::ThemeSet;
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use thiserror::Error;

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

// a None theme selects class-based output, so pages are themed by the
// served stylesheet instead of per-span inline styles
static SYNTECT_ADAPTER: Lazy<SyntectAdapter> = Lazy::new(|| SyntectAdapter::new(None));

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no syntax for language token `{0}`")]
    UnknownLanguage(String),

    #[error("unknown theme `{0}`")]
    UnknownTheme(String),

    #[error("highlighting failed: {0}")]
    Highlight(#[from] syntect::Error),
}

/// Render markdown text to an HTML fragment.
///
/// Fenced code blocks are highlighted through the same syntect pipeline as
/// code pages. Raw HTML in the source is escaped, not passed through.
pub fn markdown_to_html(content: &str) -> String {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.render.r#unsafe = false;
    options.render.escape = true;

    let mut plugins = Plugins::default();
    plugins.render.codefence_syntax_highlighter = Some(&*SYNTECT_ADAPTER);

    markdown_to_html_with_plugins(content, &options, &plugins)
}

/// Highlight a block of code as HTML, classed for the theme stylesheet.
///
/// The token may be a language name or an extension; an unrecognized token
/// is a typed error so the dispatcher can decide between surfacing it and
/// falling back to raw passthrough.
pub fn highlight_code(code: &str, token: &str) -> Result<String, RenderError> {
    let syntax = SYNTAX_SET
        .find_syntax_by_token(token)
        .ok_or_else(|| RenderError::UnknownLanguage(token.to_string()))?;

    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAX_SET, ClassStyle::Spaced);
    for line in LinesWithEndings::from(code) {
        generator.parse_html_for_line_which_includes_newline(line)?;
    }

    Ok(format!(
        "<pre class=\"highlight\"><code>{}</code></pre>\n",
        generator.finalize()
    ))
}

/// Stylesheet for a named theme from the default theme set.
pub fn theme_css(name: &str) -> Result<String, RenderError> {
    let theme = THEME_SET
        .themes
        .get(name)
        .ok_or_else(|| RenderError::UnknownTheme(name.to_string()))?;

    Ok(css_for_theme_with_class_style(theme, ClassStyle::Spaced)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_renders_headings() {
        let html = markdown_to_html("# Hello\n\nWorld");
        assert!(html.contains("<h1>"));
        assert!(html.contains("Hello"));
    }

    #[test]
    fn markdown_escapes_raw_html() {
        let html = markdown_to_html("before <script>alert(1)</script> after");
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn highlights_known_language() {
        let html = highlight_code("fn main() {}\n", "rust").unwrap();
        assert!(html.starts_with("<pre class=\"highlight\">"));
        assert!(html.contains("main"));
    }

    #[test]
    fn extension_works_as_token() {
        assert!(highlight_code("x = 1\n", "py").is_ok());
        assert!(highlight_code("--- a\n+++ b\n", "diff").is_ok());
    }

    #[test]
    fn unknown_token_is_a_typed_error() {
        let err = highlight_code("whatever", "no-such-language").unwrap_err();
        assert!(matches!(err, RenderError::UnknownLanguage(_)));
    }

    #[test]
    fn theme_css_for_default_theme() {
        let css = theme_css("base16-ocean.dark").unwrap();
        assert!(!css.is_empty());
    }

    #[test]
    fn unknown_theme_is_a_typed_error() {
        let err = theme_css("no-such-theme").unwrap_err();
        assert!(matches!(err, RenderError::UnknownTheme(_)));
    }
}
