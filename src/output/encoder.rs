//! JSON document encoding
//!
//! The document has a single top-level key, the category label, mapping to an
//! array of `{"Question", "Answer", "Source"}` objects in record order:
//!
//! ```text
//! {"Maliki": [
//! 	{"Question": "...", "Answer": "...", "Source": "..."},
//! 	{"Question": "...", "Answer": "...", "Source": "..."}
//! ]}
//! ```
//!
//! An empty record list encodes as `{"Maliki": []}`.

use crate::record::Record;
use std::fmt::Write;

/// Escapes text for use inside a JSON string literal
///
/// Backslash and double quote are backslash-escaped, the common control
/// characters use their short escapes, any other character below U+0020
/// becomes `\u00XX`, and everything else passes through unchanged.
///
/// # Examples
///
/// ```
/// use qna_harvest::output::escape_json;
///
/// assert_eq!(escape_json("say \"hi\"\n"), "say \\\"hi\\\"\\n");
/// assert_eq!(escape_json("\u{1}"), "\\u0001");
/// ```
pub fn escape_json(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\u{08}' => escaped.push_str("\\b"),
            '\u{0c}' => escaped.push_str("\\f"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(escaped, "\\u{:04x}", c as u32);
            }
            c => escaped.push(c),
        }
    }

    escaped
}

/// Encodes records as the output document under `category_label`
pub fn encode_records(records: &[Record], category_label: &str) -> String {
    let label = escape_json(category_label);

    if records.is_empty() {
        return format!("{{\"{}\": []}}", label);
    }

    let entries: Vec<String> = records
        .iter()
        .map(|record| {
            format!(
                "\t{{\"Question\": \"{}\", \"Answer\": \"{}\", \"Source\": \"{}\"}}",
                escape_json(&record.title),
                escape_json(&record.answer),
                escape_json(&record.source_link)
            )
        })
        .collect();

    format!("{{\"{}\": [\n{}\n]}}", label, entries.join(",\n"))
}
