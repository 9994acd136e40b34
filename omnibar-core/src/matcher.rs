//! Composite keyword matcher.
//!
//! Builds one anchored, case-insensitive pattern over every registered
//! keyword key: `<keyword> [-flag ]query`. Rebuilt whenever classification
//! runs; immutable afterward for the session.

use regex::Regex;

use crate::error::PipelineError;

/// The parsed parts of a keyword-command input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInput {
    /// Matched trigger key, lowercased to match the registered key.
    pub cmd: String,
    /// Optional `-<flag>` value between the trigger and the query.
    pub flag: Option<String>,
    /// Remainder of the input; may be empty.
    pub query: String,
}

/// One pattern recognizing `<keyword> [-flag ]query` for the whole keyword
/// pool.
///
/// Key collisions are the classifier's responsibility; the matcher only
/// alternates over whatever keys it is given.
#[derive(Debug, Clone)]
pub struct CompositeMatcher {
    regex: Option<Regex>,
}

impl CompositeMatcher {
    /// Build the matcher from the keyword pool's keys. An empty pool yields
    /// a matcher that matches nothing.
    pub fn build<'a, I>(keys: I) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let alternation = keys
            .into_iter()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|");

        if alternation.is_empty() {
            return Ok(Self { regex: None });
        }

        let pattern = format!(r"(?i)^((?:{alternation}))\s(?:-(\w+))?\s?(.*)$");
        let regex = Regex::new(&pattern)
            .map_err(|source| PipelineError::MatcherBuild { source })?;

        Ok(Self { regex: Some(regex) })
    }

    /// Parse an input string against the composite pattern.
    pub fn parse(&self, input: &str) -> Option<ParsedInput> {
        let regex = self.regex.as_ref()?;
        let captures = regex.captures(input)?;

        let cmd = captures.get(1)?.as_str().to_lowercase();
        let flag = captures.get(2).map(|m| m.as_str().to_string());
        let query = captures
            .get(3)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        Some(ParsedInput { cmd, flag, query })
    }

    /// Whether any keyword key is registered at all.
    pub fn is_empty(&self) -> bool {
        self.regex.is_none()
    }
}
