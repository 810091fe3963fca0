//! Default HTML-to-text extractor.
//!
//! Drops `<script>`/`<style>` bodies and comments, strips every remaining tag
//! (void elements such as `<meta>` and `<link>` vanish with them), decodes
//! common entities and collapses whitespace to single spaces.

use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::traits::TextExtractor;

static HTML_PATTERNS: OnceLock<HtmlPatterns> = OnceLock::new();

struct HtmlPatterns {
    hidden: Regex,
    tag: Regex,
    entity: Regex,
    whitespace: Regex,
}

impl HtmlPatterns {
    fn new() -> Self {
        Self {
            hidden: Regex::new(
                r"(?is)<!--.*?-->|<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>",
            )
            .expect("hidden-content regex must compile"),
            tag: Regex::new(r"(?s)<[^>]*>").expect("tag regex must compile"),
            entity: Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]+);")
                .expect("entity regex must compile"),
            whitespace: Regex::new(r"\s+").expect("whitespace regex must compile"),
        }
    }
}

fn patterns() -> &'static HtmlPatterns {
    HTML_PATTERNS.get_or_init(HtmlPatterns::new)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlTextExtractor;

impl HtmlTextExtractor {
    pub fn new() -> Self { Self }

    pub fn extract_str(&self, html: &str) -> String {
        let p = patterns();
        let visible = p.hidden.replace_all(html, " ");
        let untagged = p.tag.replace_all(&visible, " ");
        let decoded =
            p.entity.replace_all(&untagged, |caps: &Captures| decode_entity(&caps[0], &caps[1]));
        p.whitespace.replace_all(&decoded, " ").trim().to_string()
    }
}

impl TextExtractor for HtmlTextExtractor {
    fn extract(&self, raw: &[u8]) -> String {
        self.extract_str(&String::from_utf8_lossy(raw))
    }
}

/// Unknown named entities are kept verbatim.
fn decode_entity(whole: &str, body: &str) -> String {
    let decoded = if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => num.parse::<u32>().ok(),
        };
        code.and_then(char::from_u32)
    } else {
        match body {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some(' '),
            _ => None,
        }
    };
    decoded.map_or_else(|| whole.to_string(), String::from)
}
