//! Readable text from rendered HTML
//!
//! Strips non-content elements and markup, decodes common entities and
//! returns one paragraph per block element, separated by blank lines.

use regex::{Captures, Regex};

/// Elements whose content is never readable text
const SKIPPED_ELEMENTS: [&str; 6] = ["script", "style", "noscript", "head", "template", "svg"];

const BLOCK_ELEMENTS: &str = "p|div|br|hr|h[1-6]|li|ul|ol|dl|dt|dd|tr|td|th|table|section|article|aside|header|footer|nav|main|blockquote|pre|figure|figcaption|form";

pub struct HtmlExtractor {
    skipped: Vec<Regex>,
    comment: Regex,
    block: Regex,
    tag: Regex,
    entity: Regex,
    spaces: Regex,
}

impl std::fmt::Debug for HtmlExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlExtractor").finish_non_exhaustive()
    }
}

impl HtmlExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        let skipped = SKIPPED_ELEMENTS
            .iter()
            .map(|name| Regex::new(&format!(r"(?is)<{name}\b[^>]*>.*?</{name}\s*>")))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            skipped,
            comment: Regex::new(r"(?s)<!--.*?-->")?,
            block: Regex::new(&format!(r"(?i)</?(?:{BLOCK_ELEMENTS})\b[^>]*>"))?,
            tag: Regex::new(r"(?s)<[^>]*>")?,
            entity: Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});")?,
            spaces: Regex::new(r"[ \t\r\f\x{a0}]+")?,
        })
    }

    /// Paragraphs of visible text joined by blank lines; empty when none
    pub fn extract(&self, html: &str) -> String {
        let mut text = self.comment.replace_all(html, "").into_owned();
        for element in &self.skipped {
            text = element.replace_all(&text, "").into_owned();
        }

        let text = self.block.replace_all(&text, "\n\n");
        let text = self.tag.replace_all(&text, "");
        let text = self.entity.replace_all(&text, |caps: &Captures<'_>| decode_entity(&caps[0], &caps[1]));

        let mut paragraphs: Vec<String> = Vec::new();
        let mut current: Vec<String> = Vec::new();
        for line in text.lines() {
            let line = self.spaces.replace_all(line, " ");
            let line = line.trim();
            if line.is_empty() {
                if !current.is_empty() {
                    paragraphs.push(current.join(" "));
                    current.clear();
                }
            } else {
                current.push(line.to_string());
            }
        }
        if !current.is_empty() {
            paragraphs.push(current.join(" "));
        }

        paragraphs.join("\n\n")
    }
}

fn decode_entity(raw: &str, body: &str) -> String {
    let decoded = match body {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        "ndash" => Some('–'),
        "mdash" => Some('—'),
        "hellip" => Some('…'),
        "copy" => Some('©'),
        "deg" => Some('°'),
        _ => body
            .strip_prefix("#x")
            .or_else(|| body.strip_prefix("#X"))
            .map(|hex| u32::from_str_radix(hex, 16))
            .or_else(|| body.strip_prefix('#').map(str::parse))
            .and_then(Result::ok)
            .and_then(char::from_u32),
    };

    decoded.map_or_else(|| raw.to_string(), String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_paragraphs() {
        let html = r#"<!DOCTYPE html>
            <html><head><title>Krabi</title><style>p { color: red }</style></head>
            <body>
              <script>var x = "<p>not text</p>";</script>
              <h1>Krabi   travel guide</h1>
              <!-- banner -->
              <p>Railay Beach is reachable
                 only by <a href="/boat">longtail boat</a>.</p>
              <ul><li>Tiger Cave Temple</li><li>Phi Phi &amp; Hong islands</li></ul>
              <noscript>Enable JavaScript</noscript>
            </body></html>"#;

        let text = HtmlExtractor::new().unwrap().extract(html);
        assert_eq!(
            text,
            "Krabi travel guide\n\n\
             Railay Beach is reachable only by longtail boat.\n\n\
             Tiger Cave Temple\n\n\
             Phi Phi & Hong islands"
        );
    }

    #[test]
    fn test_entities() {
        let extractor = HtmlExtractor::new().unwrap();
        assert_eq!(extractor.extract("30&deg;C &#8211; &#x1F334; &bogus;"), "30°C – 🌴 &bogus;");
        assert!(extractor.extract("<html><head><title>t</title></head><body> </body></html>").is_empty());
    }
}
