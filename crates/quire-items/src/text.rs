//! Turning free text and markup into diff-friendly lines.
//!
//! Diffs should track what a reader sees, not markup noise, and a one-word
//! edit in a long paragraph should not show the whole paragraph as changed.
//! So markup tags become line breaks, entities are decoded, and the result is
//! word-wrapped to a fixed width before it is added to the line list.

use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Column width used when wrapping free text for diffs.
pub const WRAP_WIDTH: usize = 60;

/// Word-wrap `text` to [`WRAP_WIDTH`] and append the nonempty lines.
pub fn add_diff_lines_for_text(text: &str, lines: &mut Vec<String>) {
    for raw in text.split('\n') {
        lines.extend(wrap(raw, WRAP_WIDTH));
    }
}

/// Like [`add_diff_lines_for_text`], after turning tags into line breaks and
/// decoding entities.
pub fn add_diff_lines_for_markup(markup: &str, lines: &mut Vec<String>) {
    let text = tag_pattern().replace_all(markup, "\n");
    add_diff_lines_for_text(&decode_entities(&text), lines);
}

/// Greedy word wrap. Runs of whitespace collapse to one space; words longer
/// than `width` get a line of their own rather than being split.
pub fn wrap(line: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"))
}

fn entity_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z][A-Za-z0-9]{1,31});")
            .expect("entity pattern is valid")
    })
}

/// Decode HTML character references. Unknown named entities are left as-is.
pub fn decode_entities(text: &str) -> String {
    entity_pattern()
        .replace_all(text, |caps: &Captures<'_>| {
            let body = &caps[1];
            let decoded = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(body)
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        "hellip" => '…',
        "mdash" => '—',
        "ndash" => '–',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "laquo" => '«',
        "raquo" => '»',
        "bull" => '•',
        "middot" => '·',
        "deg" => '°',
        "euro" => '€',
        "pound" => '£',
        "yen" => '¥',
        "cent" => '¢',
        "sect" => '§',
        "times" => '×',
        "divide" => '÷',
        _ => return None,
    };
    Some(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_line() {
        let mut lines = Vec::new();
        add_diff_lines_for_text("hello world", &mut lines);
        assert_eq!(lines, vec!["hello world"]);
    }

    #[test]
    fn long_text_wraps_at_width() {
        let text = "word ".repeat(40);
        let mut lines = Vec::new();
        add_diff_lines_for_text(&text, &mut lines);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.chars().count() <= WRAP_WIDTH, "too long: {line:?}");
        }
        let rejoined = lines.join(" ");
        assert_eq!(rejoined, text.trim_end());
    }

    #[test]
    fn oversized_word_stands_alone() {
        let long = "x".repeat(80);
        let wrapped = wrap(&format!("a {long} b"), WRAP_WIDTH);
        assert_eq!(wrapped, vec!["a".to_string(), long, "b".to_string()]);
    }

    #[test]
    fn blank_lines_are_dropped() {
        let mut lines = Vec::new();
        add_diff_lines_for_text("one\n\n   \ntwo", &mut lines);
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn markup_tags_become_breaks() {
        let mut lines = Vec::new();
        add_diff_lines_for_markup("<p>First <b>bold</b> para</p><p>Second</p>", &mut lines);
        assert_eq!(lines, vec!["First", "bold", "para", "Second"]);
    }

    #[test]
    fn entities_are_decoded() {
        assert_eq!(decode_entities("Fish &amp; Chips"), "Fish & Chips");
        assert_eq!(decode_entities("&lt;tag&gt;"), "<tag>");
        assert_eq!(decode_entities("&#65;&#x42;"), "AB");
        assert_eq!(decode_entities("&bogus; stays"), "&bogus; stays");
        assert_eq!(decode_entities("no entities"), "no entities");
    }

    #[test]
    fn decoded_markup_entities_reach_lines() {
        let mut lines = Vec::new();
        add_diff_lines_for_markup("<p>Tom &amp; Jerry</p>", &mut lines);
        assert_eq!(lines, vec!["Tom & Jerry"]);
    }
}
