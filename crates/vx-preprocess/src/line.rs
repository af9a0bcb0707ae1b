//! Line classification for annotated shader sources

/// Marker that starts a directive line
pub const DIRECTIVE_MARKER: char = '$';

/// Marker that starts a discarded comment line
pub const COMMENT_MARKER: &str = "//";

/// What a single raw line contributes to the splitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Empty line, skipped
    Blank,
    /// `//` comment line, skipped
    Comment,
    /// `$` directive; carries the body after the marker
    Directive(&'a str),
    /// Program text routed through the write gate
    Content(&'a str),
}

/// Classify one line (without its terminator)
///
/// Comment is checked before blank and directive, so `//$vertex` is a comment.
/// Only a leading `//` counts; indented comments are content and are handed to
/// the native compiler untouched.
pub fn classify(line: &str) -> LineKind<'_> {
    if line.starts_with(COMMENT_MARKER) {
        LineKind::Comment
    } else if line.is_empty() {
        LineKind::Blank
    } else if let Some(body) = line.strip_prefix(DIRECTIVE_MARKER) {
        LineKind::Directive(body)
    } else {
        LineKind::Content(line)
    }
}
