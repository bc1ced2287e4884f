//! Relational wildcard patterns (`_` = one character, `%` = any sequence).

use regex::{Regex, RegexBuilder};
use tracing::warn;

#[derive(Clone, Debug)]
enum Matcher {
    All,
    Regex(Regex),
    /// The pattern could not be compiled (e.g. it exceeds the regex size
    /// limit); it matches no name.
    Nothing,
}

/// Compiled name filter used by catalog queries.
#[derive(Clone, Debug)]
pub struct NamePattern {
    matcher: Matcher,
}

impl NamePattern {
    /// Compiles a case-sensitive pattern. `None` matches every name.
    pub fn compile(pattern: Option<&str>) -> Self {
        Self::compile_with(pattern, false)
    }

    /// Compiles a pattern, optionally ignoring ASCII and Unicode case.
    pub fn compile_with(pattern: Option<&str>, case_insensitive: bool) -> Self {
        let Some(raw) = pattern else {
            return Self {
                matcher: Matcher::All,
            };
        };
        let mut body = String::with_capacity(raw.len() + 8);
        for ch in raw.chars() {
            match ch {
                '_' => body.push('.'),
                '%' => body.push_str(".*"),
                other => body.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
            }
        }
        let matcher = match RegexBuilder::new(&format!("^(?:{body})$"))
            .case_insensitive(case_insensitive)
            .dot_matches_new_line(true)
            .build()
        {
            Ok(regex) => Matcher::Regex(regex),
            Err(err) => {
                warn!(len = raw.len(), error = %err, "catalog.pattern.rejected");
                Matcher::Nothing
            }
        };
        Self { matcher }
    }

    /// Returns true when `name` matches the whole pattern.
    pub fn matches(&self, name: &str) -> bool {
        match &self.matcher {
            Matcher::All => true,
            Matcher::Regex(regex) => regex.is_match(name),
            Matcher::Nothing => false,
        }
    }

    /// Returns true when the pattern filters nothing.
    pub fn is_match_all(&self) -> bool {
        matches!(self.matcher, Matcher::All)
    }
}
