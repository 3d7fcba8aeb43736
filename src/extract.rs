//! Article page extraction.
//!
//! Pulling an image and a body excerpt out of arbitrary news pages is guesswork,
//! so the logic sits behind [`ContentExtractor`] and can be replaced without
//! touching the enricher or the aggregator.

use scraper::{Html, Selector};

/// What an extractor could find on a page. `image_url` is `None` when no
/// usable image was found; the caller substitutes its fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    pub image_url: Option<String>,
    pub excerpt: String,
}

pub trait ContentExtractor: Send + Sync {
    fn extract(&self, html: &str) -> Extracted;
}

/// First absolute image plus the long paragraphs of the page.
#[derive(Debug, Clone)]
pub struct HeuristicExtractor {
    /// Blocks must be strictly longer than this (in chars, trimmed) to be kept
    pub min_block_chars: usize,
    /// Excerpts longer than this are cut and suffixed with `...`
    pub max_excerpt_chars: usize,
}

impl Default for HeuristicExtractor {
    fn default() -> Self {
        Self {
            min_block_chars: 100,
            max_excerpt_chars: 500,
        }
    }
}

impl HeuristicExtractor {
    pub fn new(min_block_chars: usize, max_excerpt_chars: usize) -> Self {
        Self {
            min_block_chars,
            max_excerpt_chars,
        }
    }

    fn first_image(document: &Html) -> Option<String> {
        let selector = Selector::parse("img[src]").ok()?;
        document
            .select(&selector)
            .filter_map(|img| img.value().attr("src"))
            .find_map(normalize_image_src)
    }

    fn body_text(&self, document: &Html) -> String {
        let Ok(selector) = Selector::parse("p, article") else {
            return String::new();
        };

        let blocks: Vec<String> = document
            .select(&selector)
            .map(|block| block.text().collect::<String>().trim().to_string())
            .filter(|text| text.chars().count() > self.min_block_chars)
            .collect();

        // separator goes between blocks only, never after the last one
        blocks.join("\n\n")
    }
}

impl ContentExtractor for HeuristicExtractor {
    fn extract(&self, html: &str) -> Extracted {
        let document = Html::parse_document(html);

        Extracted {
            image_url: Self::first_image(&document),
            excerpt: truncate_excerpt(&self.body_text(&document), self.max_excerpt_chars),
        }
    }
}

/// Accept `http(s)://` sources as-is and upgrade protocol-relative ones to https.
/// Relative paths and data URIs are rejected.
pub fn normalize_image_src(src: &str) -> Option<String> {
    let src = src.trim();
    if src.starts_with("//") {
        Some(format!("https:{}", src))
    } else if src.starts_with("http://") || src.starts_with("https://") {
        Some(src.to_string())
    } else {
        None
    }
}

/// Cut `text` to `max_chars` characters and append `...` if anything was dropped.
pub fn truncate_excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Visible text of an HTML fragment with whitespace collapsed.
pub fn html_to_text(fragment: &str) -> String {
    let parsed = Html::parse_fragment(fragment);
    let text: String = parsed.root_element().text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(len: usize, fill: char) -> String {
        std::iter::repeat(fill).take(len).collect()
    }

    mod image_tests {
        use super::*;

        #[test]
        fn test_first_absolute_image_wins() {
            let html = r#"<html><body>
                <img src="/static/logo.png">
                <img src="https://cdn.example.com/lead.jpg">
                <img src="https://cdn.example.com/second.jpg">
            </body></html>"#;

            let extracted = HeuristicExtractor::default().extract(html);
            assert_eq!(
                extracted.image_url.as_deref(),
                Some("https://cdn.example.com/lead.jpg")
            );
        }

        #[test]
        fn test_protocol_relative_image_is_upgraded() {
            let html = r#"<img src="//img.example.com/a.jpg">"#;

            let extracted = HeuristicExtractor::default().extract(html);
            assert_eq!(
                extracted.image_url.as_deref(),
                Some("https://img.example.com/a.jpg")
            );
        }

        #[test]
        fn test_plain_http_image_is_kept() {
            let html = r#"<img src="http://img.example.com/a.jpg">"#;

            let extracted = HeuristicExtractor::default().extract(html);
            assert_eq!(
                extracted.image_url.as_deref(),
                Some("http://img.example.com/a.jpg")
            );
        }

        #[test]
        fn test_no_qualifying_image() {
            let html = r#"<img src="relative.jpg"><img src="data:image/png;base64,AAAA"><img>"#;

            let extracted = HeuristicExtractor::default().extract(html);
            assert_eq!(extracted.image_url, None);
        }

        #[test]
        fn test_normalize_rejects_empty() {
            assert_eq!(normalize_image_src(""), None);
            assert_eq!(normalize_image_src("   "), None);
        }
    }

    mod text_tests {
        use super::*;

        #[test]
        fn test_short_paragraphs_are_ignored() {
            let html = format!(
                "<p>Kurz.</p><p>{}</p><p>{}</p>",
                paragraph(100, 'a'),
                paragraph(101, 'b')
            );

            let extracted = HeuristicExtractor::default().extract(&html);
            assert_eq!(extracted.excerpt, paragraph(101, 'b'));
        }

        #[test]
        fn test_blocks_joined_by_blank_line_in_document_order() {
            let first = paragraph(120, 'x');
            let second = paragraph(130, 'y');
            let html = format!("<div><p>{first}</p></div><p>  {second}  </p>");

            let extracted = HeuristicExtractor::default().extract(&html);
            assert_eq!(extracted.excerpt, format!("{first}\n\n{second}"));
        }

        #[test]
        fn test_article_tag_counts_as_block() {
            let body = paragraph(150, 'z');
            let html = format!("<article><span>{body}</span></article>");

            let extracted = HeuristicExtractor::default().extract(&html);
            assert_eq!(extracted.excerpt, body);
        }

        #[test]
        fn test_long_text_is_truncated_to_limit_plus_ellipsis() {
            let html = format!("<p>{}</p><p>{}</p>", paragraph(300, 'a'), paragraph(300, 'b'));

            let extracted = HeuristicExtractor::default().extract(&html);
            assert!(extracted.excerpt.ends_with("..."));
            assert_eq!(extracted.excerpt.chars().count(), 503);
        }

        #[test]
        fn test_umlauts_count_as_single_chars() {
            let body = paragraph(120, 'ä');

            let extracted = HeuristicExtractor::new(100, 500).extract(&format!("<p>{body}</p>"));
            assert_eq!(extracted.excerpt, body);
        }

        #[test]
        fn test_page_without_text() {
            let extracted = HeuristicExtractor::default().extract("<html><body></body></html>");
            assert_eq!(extracted, Extracted::default());
        }
    }

    mod truncate_tests {
        use super::*;

        #[test]
        fn test_exact_limit_is_untouched() {
            let text = paragraph(500, 'q');
            assert_eq!(truncate_excerpt(&text, 500), text);
        }

        #[test]
        fn test_one_over_limit() {
            let text = paragraph(501, 'q');
            let truncated = truncate_excerpt(&text, 500);
            assert_eq!(truncated, format!("{}...", paragraph(500, 'q')));
        }

        #[test]
        fn test_multibyte_boundary() {
            let truncated = truncate_excerpt("Größenordnung", 4);
            assert_eq!(truncated, "Größ...");
        }
    }

    mod html_to_text_tests {
        use super::*;

        #[test]
        fn test_strips_tags_and_collapses_whitespace() {
            let text = html_to_text("<p>Die   <b>Bundesregierung</b>\n hat</p> <br/> entschieden");
            assert_eq!(text, "Die Bundesregierung hat entschieden");
        }

        #[test]
        fn test_plain_text_passes_through() {
            assert_eq!(html_to_text("Nur Text"), "Nur Text");
        }
    }
}
