//! HTML metadata extraction
//!
//! This module turns a page's markup into the title, description and
//! keywords stored in the index:
//! - title from `<title>`
//! - description and keywords from `<meta name="...">` tags
//! - a fallback to the first `<h1>` and `<p>` when no description is declared

use crate::storage::PageMetadata;
use scraper::{Html, Selector};

/// Longest fallback description kept, ellipsis included
pub const DESCRIPTION_LIMIT: usize = 120;

const ELLIPSIS: &str = "...";

/// Extracts title, description and keywords from an HTML document
///
/// # Extraction Rules
///
/// 1. Title is the text of the first `<title>` element
/// 2. Description is the `content` of the first `<meta name="description">`
/// 3. Keywords is the `content` of the first `<meta name="keywords">`
/// 4. If the description is empty, the first `<h1>` (when present) replaces
///    the title and the first `<p>` becomes the description, shortened to
///    [`DESCRIPTION_LIMIT`] characters
///
/// All fields are trimmed after the fallback is applied, so the paragraph is
/// measured with its surrounding whitespace. Missing elements produce empty
/// strings.
///
/// # Example
///
/// ```
/// use shelfmark::crawler::extract_metadata;
///
/// let html = r#"<html><head><title>Home</title>
///     <meta name="description" content="Welcome"></head></html>"#;
/// let metadata = extract_metadata(html);
/// assert_eq!(metadata.title, "Home");
/// assert_eq!(metadata.description, "Welcome");
/// assert_eq!(metadata.keywords, "");
/// ```
pub fn extract_metadata(html: &str) -> PageMetadata {
    let document = Html::parse_document(html);

    // html5ever recovers from malformed markup, so errors are only reported
    if !document.errors.is_empty() {
        tracing::debug!("Recovered from {} markup errors", document.errors.len());
    }

    let mut title = first_text(&document, "title").unwrap_or_default();
    let mut description = meta_content(&document, "description").unwrap_or_default();
    let keywords = meta_content(&document, "keywords").unwrap_or_default();

    // A declared but blank description still counts as declared
    if description.is_empty() {
        if let Some(heading) = first_text(&document, "h1") {
            title = heading;
        }
        if let Some(paragraph) = first_text(&document, "p") {
            description = truncate_description(&paragraph);
        }
    }

    PageMetadata {
        title: title.trim().to_string(),
        description: description.trim().to_string(),
        keywords: keywords.trim().to_string(),
    }
}

/// Text content of the first element matching `selector`
fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;

    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>())
}

/// `content` attribute of the first `<meta>` with the given name
fn meta_content(document: &Html, name: &str) -> Option<String> {
    let selector = Selector::parse(&format!("meta[name=\"{}\"]", name)).ok()?;

    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(str::to_string)
}

/// Shortens text longer than [`DESCRIPTION_LIMIT`] characters
fn truncate_description(text: &str) -> String {
    if text.chars().count() <= DESCRIPTION_LIMIT {
        return text.to_string();
    }

    let keep = DESCRIPTION_LIMIT - ELLIPSIS.len();
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_all_fields() {
        let html = r#"<html><head>
            <title>Field Guide</title>
            <meta name="description" content="Birds of the valley">
            <meta name="keywords" content="birds, valley">
        </head><body></body></html>"#;

        let metadata = extract_metadata(html);
        assert_eq!(metadata.title, "Field Guide");
        assert_eq!(metadata.description, "Birds of the valley");
        assert_eq!(metadata.keywords, "birds, valley");
    }

    #[test]
    fn test_fields_are_trimmed() {
        let html = r#"<html><head>
            <title>
                Spaced Out
            </title>
            <meta name="description" content="  padded  ">
            <meta name="keywords" content=" a, b ">
        </head></html>"#;

        let metadata = extract_metadata(html);
        assert_eq!(metadata.title, "Spaced Out");
        assert_eq!(metadata.description, "padded");
        assert_eq!(metadata.keywords, "a, b");
    }

    #[test]
    fn test_meta_description_beats_paragraph() {
        let html = r#"<html><head>
            <title>Title</title>
            <meta name="description" content="From meta">
        </head><body>
            <h1>Heading</h1>
            <p>From paragraph</p>
        </body></html>"#;

        let metadata = extract_metadata(html);
        assert_eq!(metadata.title, "Title");
        assert_eq!(metadata.description, "From meta");
    }

    #[test]
    fn test_fallback_uses_heading_and_paragraph() {
        let html = r#"<html><head><title>Title</title>
            <meta name="keywords" content="kw"></head>
        <body>
            <h1>Heading</h1>
            <p>First paragraph</p>
            <p>Second paragraph</p>
        </body></html>"#;

        let metadata = extract_metadata(html);
        assert_eq!(metadata.title, "Heading");
        assert_eq!(metadata.description, "First paragraph");
        assert_eq!(metadata.keywords, "kw");
    }

    #[test]
    fn test_fallback_without_heading_keeps_title() {
        let html = r#"<html><head><title>Title</title></head>
        <body><p>Only a paragraph</p></body></html>"#;

        let metadata = extract_metadata(html);
        assert_eq!(metadata.title, "Title");
        assert_eq!(metadata.description, "Only a paragraph");
    }

    #[test]
    fn test_empty_meta_description_triggers_fallback() {
        let html = r#"<html><head><meta name="description" content=""></head>
        <body><h1>Heading</h1><p>Body text</p></body></html>"#;

        let metadata = extract_metadata(html);
        assert_eq!(metadata.title, "Heading");
        assert_eq!(metadata.description, "Body text");
    }

    #[test]
    fn test_blank_meta_description_keeps_title() {
        let html = r#"<html><head><title>Declared</title>
            <meta name="description" content="   "></head>
        <body><h1>Heading</h1><p>Body text</p></body></html>"#;

        let metadata = extract_metadata(html);
        assert_eq!(metadata.title, "Declared");
        assert_eq!(metadata.description, "");
    }

    #[test]
    fn test_meta_without_content_is_empty() {
        let html = r#"<html><head><title>T</title><meta name="keywords"></head></html>"#;

        let metadata = extract_metadata(html);
        assert_eq!(metadata.keywords, "");
    }

    #[test]
    fn test_long_paragraph_is_truncated() {
        let paragraph = "x".repeat(200);
        let html = format!("<html><body><p>{}</p></body></html>", paragraph);

        let metadata = extract_metadata(&html);
        assert_eq!(metadata.description.chars().count(), 120);
        assert!(metadata.description.ends_with("..."));
        assert_eq!(&metadata.description[..117], &paragraph[..117]);
    }

    #[test]
    fn test_paragraph_at_limit_is_kept() {
        let paragraph = "y".repeat(120);
        let html = format!("<html><body><p>{}</p></body></html>", paragraph);

        let metadata = extract_metadata(&html);
        assert_eq!(metadata.description, paragraph);
    }

    #[test]
    fn test_paragraph_whitespace_counts_toward_limit() {
        let text: String = "abcdefghij".repeat(12).chars().take(118).collect();
        let html = format!(
            "<html><body><p>\n          {}\n        </p></body></html>",
            text
        );

        // 11 leading + 118 + 9 trailing characters exceed the limit
        let metadata = extract_metadata(&html);
        assert_eq!(metadata.description, format!("{}...", &text[..106]));
        assert_eq!(metadata.description.chars().count(), 109);
    }

    #[test]
    fn test_truncation_counts_characters() {
        let paragraph = "é".repeat(150);
        let truncated = truncate_description(&paragraph);
        assert_eq!(truncated.chars().count(), 120);
        assert!(truncated.starts_with(&"é".repeat(117)));
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(extract_metadata(""), PageMetadata::default());
    }

    #[test]
    fn test_malformed_markup_does_not_panic() {
        let html = "<html><head><title>Broken</title><body><p>unclosed <b>bold";
        let metadata = extract_metadata(html);
        assert_eq!(metadata.title, "Broken");
        assert_eq!(metadata.description, "unclosed bold");
    }
}
