//! Deterministic cleanup of text recovered from PDFs and OCR.
//!
//! PDF content streams and tesseract both emit layout noise: CRLF line
//! endings, padded lines, long runs of blank lines between blocks and the
//! occasional zero-width character. None of it carries meaning for the
//! tutoring prompt, so it is removed before the text is returned.
//!
//! Plain-text uploads do not pass through here; they are used verbatim.
//!
//! ## Rule Order
//!
//! Line endings are normalised first so the per-line rules see `\n` only;
//! blank-line collapsing runs after trailing whitespace is gone so that
//! "blank" lines containing spaces collapse too.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all normalisation rules.
///
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 3. Trim trailing whitespace per line
/// 4. Collapse 3+ consecutive newlines down to 2
/// 5. Trim leading and trailing whitespace of the whole text
pub fn normalise_extracted(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = remove_invisible_chars(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    s.trim().to_string()
}

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

fn remove_invisible_chars(input: &str) -> String {
    const INVISIBLE: [char; 6] = [
        '\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}', '\u{FEFF}', '\u{00AD}',
    ];
    input.chars().filter(|c| !INVISIBLE.contains(c)).collect()
}

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|l| l.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

fn collapse_blank_lines(input: &str) -> String {
    BLANK_RUN.replace_all(input, "\n\n").into_owned()
}
