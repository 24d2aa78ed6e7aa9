//! Normalization of spec-supplied text into identifiers and doc comments
//!
//! `Sanitize` holds no state. It is still passed around as an explicit value
//! so every component that names things visibly depends on the same rules.

use once_cell::sync::Lazy;
use regex::Regex;

use super::utils::{is_reserved_type_name, sanitize_rust_field_name, to_proper_case};

static LINE_BREAK_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<\s*(br|/p|/div|/li|/h[1-6])\s*/?\s*>").expect("valid regex"));
static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\u{a0}]+").expect("valid regex"));
static ILLEGAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\-. ]+").expect("valid regex"));

/// Identifier and documentation sanitizer
#[derive(Debug, Clone, Copy, Default)]
pub struct Sanitize;

impl Sanitize {
    pub fn new() -> Self {
        Self
    }

    /// Turns a raw path segment or schema name into a PascalCase identifier.
    ///
    /// Characters that cannot appear in an identifier are treated as word
    /// breaks. A leading digit gets an `N` prefix, and names that would clash
    /// with `Self` or a prelude type used by generated code get a trailing
    /// underscore.
    pub fn clean(&self, raw: &str) -> String {
        let spaced = ILLEGAL.replace_all(raw, " ");
        let ident = to_proper_case(&spaced);
        if ident.starts_with(|c: char| c.is_ascii_digit()) {
            format!("N{ident}")
        } else if is_reserved_type_name(&ident) {
            format!("{ident}_")
        } else {
            ident
        }
    }

    /// Turns a raw path segment into a snake_case module name.
    pub fn module_name(&self, raw: &str) -> String {
        let spaced = ILLEGAL.replace_all(raw, " ");
        sanitize_rust_field_name(&spaced)
    }

    /// Turns a property or parameter name into a snake_case field name.
    pub fn field_name(&self, raw: &str) -> String {
        self.module_name(raw)
    }

    /// Removes markup from a human-authored description.
    ///
    /// Block-level closing tags and `<br>` become line breaks, the common
    /// entities are decoded, typographic quotes are flattened, and runs of
    /// blank lines collapse to one.
    pub fn strip_html(&self, description: &str) -> String {
        let with_breaks = LINE_BREAK_TAG.replace_all(description, "\n");
        let text = HTML_TAG.replace_all(&with_breaks, "");
        let text = decode_entities(&text);

        let mut lines: Vec<String> = Vec::new();
        for line in text.lines() {
            let line = WHITESPACE.replace_all(line.trim(), " ").to_string();
            if line.is_empty() && lines.last().is_none_or(|prev| prev.is_empty()) {
                continue;
            }
            lines.push(line);
        }
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        lines.join("\n")
    }

    /// `strip_html` for optional descriptions, mapping empty results to `None`.
    pub fn description(&self, description: Option<&str>) -> Option<String> {
        description
            .map(|d| self.strip_html(d))
            .filter(|d| !d.is_empty())
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace('\u{2014}', "-")
        // last, so "&amp;lt;" decodes to "&lt;" and not "<"
        .replace("&amp;", "&")
}
