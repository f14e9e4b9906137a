use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use std::fs;
use std::path::PathBuf;

use crate::error::AppError;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Text to normalize, tagged explicitly. A markup string that happens to
/// name an existing file is still treated as markup.
#[derive(Debug, Clone)]
pub enum TextSource {
    Path(PathBuf),
    Markup(String),
}

#[derive(Debug, Clone, Copy)]
pub struct CleanOptions {
    pub strip_semicolons: bool,
}

impl Default for CleanOptions {
    fn default() -> Self {
        CleanOptions { strip_semicolons: true }
    }
}

/// Strips markup from the source and returns canonical plain text: tag-free,
/// non-breaking spaces replaced, whitespace runs collapsed, trimmed.
pub fn normalize(source: &TextSource, options: CleanOptions) -> Result<String, AppError> {
    let markup = match source {
        TextSource::Path(path) => fs::read_to_string(path)?,
        TextSource::Markup(markup) => markup.clone(),
    };
    Ok(clean_html(&markup, options))
}

pub fn clean_html(markup: &str, options: CleanOptions) -> String {
    let fragment = Html::parse_fragment(markup);
    let text = fragment.root_element().text().collect::<String>();

    // The parser decodes &nbsp; to U+00A0; unparsed fragments may still carry
    // the literal entity.
    let mut text = text.replace("&nbsp;", " ").replace('\u{a0}', " ");
    if options.strip_semicolons {
        text = text.replace(';', " ");
    }

    WHITESPACE_RUN.replace_all(&text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn default_clean(markup: &str) -> String {
        clean_html(markup, CleanOptions::default())
    }

    #[test]
    fn strips_tags_and_collapses_whitespace() {
        let cleaned = default_clean("<p>State  Board\n of <b>Education</b></p>");
        assert_eq!(cleaned, "State Board of Education");
        assert!(!cleaned.contains('<'));
        assert!(!cleaned.contains("  "));
    }

    #[test]
    fn replaces_non_breaking_spaces() {
        assert_eq!(default_clean("Board&nbsp;of\u{a0}Education"), "Board of Education");
    }

    #[test]
    fn semicolon_policy_is_configurable() {
        assert_eq!(default_clean("Board; Commission"), "Board Commission");
        let kept = clean_html("Board; Commission", CleanOptions { strip_semicolons: false });
        assert_eq!(kept, "Board; Commission");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(default_clean("  Ohio Ethics Commission  "), "Ohio Ethics Commission");
    }

    #[test]
    fn markup_source_is_not_sniffed_as_a_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fragment.html");
        fs::write(&path, "<p>from file</p>").unwrap();

        // The same string, tagged two ways, resolves two ways.
        let as_markup = TextSource::Markup(path.to_string_lossy().into_owned());
        let cleaned = normalize(&as_markup, CleanOptions::default()).unwrap();
        assert!(cleaned.contains("fragment.html"));

        let as_path = TextSource::Path(path);
        let cleaned = normalize(&as_path, CleanOptions::default()).unwrap();
        assert_eq!(cleaned, "from file");
    }

    #[test]
    fn missing_file_is_an_io_failure() {
        let source = TextSource::Path(PathBuf::from("/nonexistent/fragment.html"));
        assert!(normalize(&source, CleanOptions::default()).is_err());
    }

    #[test]
    fn file_handle_is_released_after_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.html");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"<div>State Board</div>").unwrap();
        drop(file);

        normalize(&TextSource::Path(path.clone()), CleanOptions::default()).unwrap();
        // Re-reading succeeds because nothing holds the handle open.
        normalize(&TextSource::Path(path), CleanOptions::default()).unwrap();
    }
}
