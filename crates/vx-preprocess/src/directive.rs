//! `$` directive parsing
//!
//! A directive body is everything after the `$` marker. Two matching modes are
//! supported: exact keyword tokens (the default) and the legacy substring
//! containment mode, where the first `$keyword` found anywhere on the line
//! wins in a fixed priority order.

use serde::{Deserialize, Serialize};

use crate::line::DIRECTIVE_MARKER;
use crate::{PlatformGate, ShaderStage};

/// Keywords checked in priority order by [`DirectiveMatching::Contains`]
const PRIORITY: [(&str, Directive<'static>); 6] = [
    ("vertex", Directive::Stage(ShaderStage::Vertex)),
    ("fragment", Directive::Stage(ShaderStage::Fragment)),
    ("ignore", Directive::Stage(ShaderStage::None)),
    ("native", Directive::Gate(PlatformGate::Native)),
    ("emscripten", Directive::Gate(PlatformGate::Emscripten)),
    ("endif", Directive::Gate(PlatformGate::Indifferent)),
];

/// How directive bodies are matched against keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectiveMatching {
    /// First whitespace-delimited token must equal the keyword
    #[default]
    Exact,
    /// Line only needs to contain `$keyword`
    Contains,
}

/// A parsed directive line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive<'a> {
    /// Splice another file; carries the path argument as written
    Include(&'a str),
    /// Switch the active stage
    Stage(ShaderStage),
    /// Open or close a platform gate
    Gate(PlatformGate),
    /// Anything else; consumed without effect
    Unknown(&'a str),
}

impl<'a> Directive<'a> {
    /// Parse a directive body (the text after `$`)
    pub fn parse(body: &'a str, matching: DirectiveMatching) -> Self {
        match matching {
            DirectiveMatching::Exact => Self::parse_exact(body),
            DirectiveMatching::Contains => Self::parse_contains(body),
        }
    }

    fn parse_exact(body: &'a str) -> Self {
        let trimmed = body.trim();
        let (keyword, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (trimmed, ""),
        };

        if keyword == "include" {
            return Directive::Include(rest);
        }

        PRIORITY
            .iter()
            .find(|(name, _)| *name == keyword)
            .map(|(_, directive)| *directive)
            .unwrap_or(Directive::Unknown(body))
    }

    fn parse_contains(body: &'a str) -> Self {
        if let Some(path) = after_marked(body, "include ") {
            return Directive::Include(path);
        }

        PRIORITY
            .iter()
            .find(|(name, _)| after_marked(body, name).is_some())
            .map(|(_, directive)| *directive)
            .unwrap_or(Directive::Unknown(body))
    }
}

/// Text following the first `$keyword` on a directive line
///
/// `body` starts right after the line's own marker, so the keyword matches at
/// the start of the body or after any later `$`.
fn after_marked<'b>(body: &'b str, keyword: &str) -> Option<&'b str> {
    body.strip_prefix(keyword).or_else(|| {
        body.match_indices(DIRECTIVE_MARKER)
            .find_map(|(at, _)| body[at + DIRECTIVE_MARKER.len_utf8()..].strip_prefix(keyword))
    })
}
