//! NLSML result-document formatting.
//!
//! Recognition results travel as a small fixed-schema markup body: one
//! `result` element referencing the active grammar, with a single
//! interpretation carrying the recognized input. Single-interpretation
//! only; n-best lists are a decoder concern this layer does not surface.

use crate::defaults;

/// Formats a recognition result document.
pub fn result_document(grammar_id: &str, confidence: u32, input: &str) -> String {
    format!(
        "<?xml version=\"1.0\"?>\n\
         <result grammar=\"{grammar}\">\n\
         \x20 <interpretation grammar=\"{grammar}\" confidence=\"{confidence}\">\n\
         \x20   <input mode=\"speech\">{input}</input>\n\
         \x20 </interpretation>\n\
         </result>\n",
        grammar = grammar_id,
        confidence = confidence,
        input = escape(input),
    )
}

/// Returns whether a DEFINE-GRAMMAR content type denotes a supported
/// grammar format.
pub fn is_supported_grammar_type(content_type: &str) -> bool {
    content_type.contains(defaults::SUPPORTED_GRAMMAR_MARKER)
}

/// Escapes the characters that would break the surrounding markup.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
