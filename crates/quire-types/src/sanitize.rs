//! Input sanitizers and small string helpers.
//!
//! Form submissions and imported content arrive loosely typed, so most of
//! these accept a [`serde_json::Value`] and coerce it the forgiving way:
//! junk never fails, it falls back to a default.

use std::sync::OnceLock;

use chrono::{DateTime, Local};
use regex::Regex;
use serde_json::Value;

/// Options for [`slugify`].
#[derive(Clone, Debug)]
pub struct SlugifyOptions {
    /// Extra characters that survive besides ASCII letters and digits.
    pub allow: String,
    /// Replacement for every run of disallowed characters.
    pub separator: char,
}

impl Default for SlugifyOptions {
    fn default() -> Self {
        Self {
            allow: String::new(),
            separator: '-',
        }
    }
}

/// Turn arbitrary text into a lowercase, URL-safe slug.
///
/// ```
/// use quire_types::sanitize::{slugify, SlugifyOptions};
///
/// assert_eq!(slugify("Hello, World!", &SlugifyOptions::default()), "hello-world");
/// ```
pub fn slugify(s: &str, options: &SlugifyOptions) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_separator = false;
    for c in s.trim().chars() {
        if c.is_ascii_alphanumeric() || options.allow.contains(c) {
            if pending_separator && !out.is_empty() {
                out.push(options.separator);
            }
            pending_separator = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    if out.is_empty() {
        return "none".into();
    }
    out
}

/// Normalize text for tolerant searching and sorting: like [`slugify`] but
/// separated by spaces.
pub fn sortify(s: &str) -> String {
    slugify(
        s,
        &SlugifyOptions {
            separator: ' ',
            ..Default::default()
        },
    )
}

/// Coerce to a trimmed string. Numbers are stringified, anything else is
/// empty. An empty result is replaced by `default` when one is given.
pub fn sanitize_string(value: &Value, default: Option<&str>) -> String {
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    };
    match default {
        Some(def) if s.is_empty() => def.to_string(),
        _ => s,
    }
}

/// Accepts `true`, and strings or numbers starting with `t`, `y` or `1`
/// (case-insensitive) as true. Everything else is false. Missing input yields
/// `default`, or false.
pub fn sanitize_boolean(value: &Value, default: Option<bool>) -> bool {
    if let Value::Bool(b) = value {
        return *b;
    }
    let s = sanitize_string(value, None);
    match s.chars().next().map(|c| c.to_ascii_lowercase()) {
        None => default.unwrap_or(false),
        Some('t' | 'y' | '1') => true,
        Some(_) => false,
    }
}

/// Coerce to an integer, clamped to `[min, max]` when given.
///
/// Numbers are floored. Strings are read up to the first non-digit, so
/// `"12px"` is 12. Unparseable input yields `default`.
pub fn sanitize_integer(value: &Value, default: i64, min: Option<i64>, max: Option<i64>) -> i64 {
    let parsed = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.floor() as i64)),
        Value::String(s) => leading_integer(s.trim()),
        _ => None,
    };
    let mut i = parsed.unwrap_or(default);
    if let Some(min) = min {
        i = i.max(min);
    }
    if let Some(max) = max {
        i = i.min(max);
    }
    i
}

fn leading_integer(s: &str) -> Option<i64> {
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Left-pad an integer with zeroes to at least `places` digits.
pub fn pad_integer(i: i64, places: usize) -> String {
    format!("{i:0places$}")
}

/// Normalize a user-entered date to `YYYY-MM-DD`.
///
/// Accepts `YYYY-MM-DD`, `MM-DD`, `MM/DD`, `MM/DD/YY` and `MM/DD/YYYY`
/// (leading zeroes optional), then RFC 3339 timestamps. The current year is
/// assumed when none is given and two-digit years land in 2000-2099. Anything
/// else yields `default`, or today's date.
pub fn sanitize_date(input: &str, default: Option<&str>) -> String {
    let input = input.trim();
    let fallback = || {
        default
            .map(str::to_string)
            .unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string())
    };

    let separator = if input.contains('/') {
        Some('/')
    } else if input.contains('-') {
        Some('-')
    } else {
        None
    };

    if let Some(sep) = separator {
        let parts: Option<Vec<u32>> = input
            .split(sep)
            .map(|p| p.trim().parse::<u32>().ok())
            .collect();
        let Some(parts) = parts else {
            return DateTime::parse_from_rfc3339(input)
                .map(|dt| dt.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|_| fallback());
        };
        let current_year = Local::now().format("%Y").to_string();
        let current_year: u32 = current_year.parse().unwrap_or(1970);
        let (year, month, day) = match (sep, parts.as_slice()) {
            (_, [month, day]) => (current_year, *month, *day),
            ('/', [month, day, year]) if *year < 100 => (2000 + year, *month, *day),
            ('/', [month, day, year]) => (*year, *month, *day),
            ('-', [year, month, day]) => (*year, *month, *day),
            _ => return fallback(),
        };
        return format!("{year:04}-{month:02}-{day:02}");
    }

    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| fallback())
}

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d+)(?::(\d+))?(?::(\d+))?\s*(am|pm)?$").expect("time pattern is valid")
    })
}

/// Normalize a 12- or 24-hour time to `HH:MM:SS`.
///
/// Unparseable input yields `default`, or the current time.
pub fn sanitize_time(input: &str, default: Option<&str>) -> String {
    let input = input.trim().to_lowercase();
    let Some(caps) = time_pattern().captures(&input) else {
        return default
            .map(str::to_string)
            .unwrap_or_else(|| Local::now().format("%H:%M:%S").to_string());
    };
    let number = |i: usize| {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .unwrap_or(0)
    };
    let mut hours = number(1);
    let minutes = number(2);
    let seconds = number(3);
    match (hours, caps.get(4).map(|m| m.as_str())) {
        (12, Some("am")) => hours = 0,
        (12, Some("pm")) => {}
        (_, Some("pm")) => hours += 12,
        _ => {}
    }
    if hours == 24 {
        hours = 0;
    }
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

fn tag_separator() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r",\s*").expect("tag separator pattern is valid"))
}

/// Split a comma-separated tag string into lowercase, nonempty tags.
pub fn tags_to_array(value: &Value) -> Vec<String> {
    let s = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return Vec::new(),
    };
    tag_separator()
        .split(&s)
        .filter(|tag| !tag.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Keep only string (or stringified number) entries of a submitted tag array.
pub fn sanitize_tags(value: &Value) -> Vec<String> {
    let Some(tags) = value.as_array() else {
        return Vec::new();
    };
    tags.iter()
        .filter_map(|tag| match tag {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}

pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `richTextEditor` becomes `rich-text-editor`.
pub fn css_name(camel: &str) -> String {
    let mut css = String::with_capacity(camel.len() + 4);
    for c in camel.chars() {
        if c.is_ascii_uppercase() {
            css.push('-');
            css.push(c.to_ascii_lowercase());
        } else {
            css.push(c);
        }
    }
    css
}

/// Camel-case a friendly name: only ASCII letters and digits survive, and
/// anything else uppercases the next kept character.
pub fn camel_name(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut next_upper = false;
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            if next_upper {
                out.push(c.to_ascii_uppercase());
                next_upper = false;
            } else {
                out.push(c.to_ascii_lowercase());
            }
        } else {
            next_upper = true;
        }
    }
    out
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn slugify_basic() {
        let opts = SlugifyOptions::default();
        assert_eq!(slugify("Hello, World!", &opts), "hello-world");
        assert_eq!(slugify("  --Leading and trailing--  ", &opts), "leading-and-trailing");
        assert_eq!(slugify("!!!", &opts), "none");
        assert_eq!(slugify("", &opts), "none");
    }

    #[test]
    fn slugify_allow_list() {
        let opts = SlugifyOptions {
            allow: "/".into(),
            ..Default::default()
        };
        assert_eq!(slugify("/About Us/Team", &opts), "/about-us/team");
    }

    #[test]
    fn sortify_uses_spaces() {
        assert_eq!(sortify("The  Quick, Brown fox"), "the quick brown fox");
    }

    #[test]
    fn boolean_coercion() {
        assert!(sanitize_boolean(&json!("t"), None));
        assert!(sanitize_boolean(&json!("Yes"), None));
        assert!(sanitize_boolean(&json!("1"), None));
        assert!(sanitize_boolean(&json!(1), None));
        assert!(sanitize_boolean(&json!(true), None));
        assert!(!sanitize_boolean(&json!("n"), None));
        assert!(!sanitize_boolean(&json!("false"), None));
        assert!(!sanitize_boolean(&json!(false), Some(true)));
        assert!(!sanitize_boolean(&json!(null), None));
        assert!(sanitize_boolean(&json!(null), Some(true)));
        assert!(sanitize_boolean(&json!("   "), Some(true)));
    }

    #[test]
    fn string_coercion() {
        assert_eq!(sanitize_string(&json!("  hi "), None), "hi");
        assert_eq!(sanitize_string(&json!(42), None), "42");
        assert_eq!(sanitize_string(&json!(["x"]), None), "");
        assert_eq!(sanitize_string(&json!(""), Some("fallback")), "fallback");
    }

    #[test]
    fn integer_coercion() {
        assert_eq!(sanitize_integer(&json!(3.7), 0, None, None), 3);
        assert_eq!(sanitize_integer(&json!("12px"), 0, None, None), 12);
        assert_eq!(sanitize_integer(&json!("-4"), 0, None, None), -4);
        assert_eq!(sanitize_integer(&json!("abc"), 9, None, None), 9);
        assert_eq!(sanitize_integer(&json!(50), 0, Some(1), Some(10)), 10);
        assert_eq!(sanitize_integer(&json!(-50), 0, Some(1), Some(10)), 1);
    }

    #[test]
    fn pad() {
        assert_eq!(pad_integer(4, 2), "04");
        assert_eq!(pad_integer(12, 2), "12");
        assert_eq!(pad_integer(2013, 4), "2013");
    }

    #[test]
    fn dates() {
        assert_eq!(sanitize_date("04/01/2013", None), "2013-04-01");
        assert_eq!(sanitize_date("4/1/13", None), "2013-04-01");
        assert_eq!(sanitize_date("2013-4-1", None), "2013-04-01");
        assert_eq!(sanitize_date("2013-04-01T10:00:00Z", None), "2013-04-01");
        assert_eq!(sanitize_date("garbage", Some("2000-01-01")), "2000-01-01");
        assert_eq!(sanitize_date("1/2/3/4", Some("2000-01-01")), "2000-01-01");

        let year = Local::now().format("%Y").to_string();
        assert_eq!(sanitize_date("04/01", None), format!("{year}-04-01"));
    }

    #[test]
    fn times() {
        assert_eq!(sanitize_time("23:35", None), "23:35:00");
        assert_eq!(sanitize_time("11pm", None), "23:00:00");
        assert_eq!(sanitize_time("11:15 PM", None), "23:15:00");
        assert_eq!(sanitize_time("12am", None), "00:00:00");
        assert_eq!(sanitize_time("12pm", None), "12:00:00");
        assert_eq!(sanitize_time("24:00", None), "00:00:00");
        assert_eq!(sanitize_time("teatime", Some("16:00:00")), "16:00:00");
    }

    #[test]
    fn tags() {
        assert_eq!(tags_to_array(&json!("A, b,,C")), vec!["a", "b", "c"]);
        assert_eq!(tags_to_array(&json!(12)), vec!["12"]);
        assert!(tags_to_array(&json!("")).is_empty());
        assert!(tags_to_array(&json!({})).is_empty());
        assert_eq!(sanitize_tags(&json!(["x", 3, null])), vec!["x", "3"]);
        assert!(sanitize_tags(&json!("x")).is_empty());
    }

    #[test]
    fn naming_helpers() {
        assert_eq!(capitalize_first("blog"), "Blog");
        assert_eq!(capitalize_first(""), "");
        assert_eq!(css_name("richTextEditor"), "rich-text-editor");
        assert_eq!(camel_name("Event Start Date"), "eventStartDate");
        assert_eq!(escape_html("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }

    proptest! {
        #[test]
        fn slugify_output_is_url_safe(s in ".{0,40}") {
            let slug = slugify(&s, &SlugifyOptions::default());
            prop_assert!(!slug.is_empty());
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!slug.starts_with('-'));
            prop_assert!(!slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
        }

        #[test]
        fn slugify_is_idempotent(s in "[a-zA-Z0-9 ,.!-]{1,40}") {
            let opts = SlugifyOptions::default();
            let once = slugify(&s, &opts);
            prop_assert_eq!(slugify(&once, &opts), once.clone());
        }
    }
}
