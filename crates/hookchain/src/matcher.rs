// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Operation name matchers.
//!
//! Patterns, most specific first:
//! - `"Bash"` - exact, case-sensitive literal
//! - `"*"` - every operation
//! - `"Read*"` - any name starting with `Read`
//! - `"(Read|Write)"` - regular expression anchored to the full name
//!
//! A bare `"Edit|Write"` is treated like `"(Edit|Write)"`, matching the
//! pipe-separated matchers used in agent settings files.

use crate::error::MatchCompileError;
use regex::Regex;

/// Characters that are not allowed in literal and prefix patterns.
const RESERVED: &[char] = &['*', '(', ')', '|'];

/// A compiled predicate over operation names.
#[derive(Clone, Debug)]
pub struct Matcher {
    pattern: String,
    rule: MatchRule,
}

/// How a matcher tests a name.
#[derive(Clone, Debug)]
pub enum MatchRule {
    /// Exact string match
    Exact(String),
    /// Matches everything
    Any,
    /// Prefix match (for `Name*` patterns)
    Prefix(String),
    /// Anchored regular expression (for `(A|B)` patterns)
    Alternation(Regex),
}

/// Compile a pattern string into a [`Matcher`].
pub fn compile(pattern: &str) -> Result<Matcher, MatchCompileError> {
    let trimmed = pattern.trim();
    if trimmed.is_empty() {
        return Err(MatchCompileError::new(pattern, "pattern is empty"));
    }

    let rule = if trimmed == "*" {
        MatchRule::Any
    } else if let Some(inner) = trimmed
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        alternation(trimmed, inner)?
    } else if trimmed.contains('|') || trimmed.contains('(') {
        alternation(trimmed, trimmed)?
    } else if let Some(prefix) = trimmed.strip_suffix('*') {
        check_literal(trimmed, prefix)?;
        MatchRule::Prefix(prefix.to_string())
    } else {
        check_literal(trimmed, trimmed)?;
        MatchRule::Exact(trimmed.to_string())
    };

    Ok(Matcher {
        pattern: trimmed.to_string(),
        rule,
    })
}

/// `body` is the pattern without its outer parentheses and is only used for
/// the emptiness checks; the regex always covers the whole pattern.
fn alternation(pattern: &str, body: &str) -> Result<MatchRule, MatchCompileError> {
    if body.trim().is_empty() {
        return Err(MatchCompileError::new(pattern, "alternation is empty"));
    }
    if body.split('|').any(|branch| branch.trim().is_empty()) {
        return Err(MatchCompileError::new(
            pattern,
            "alternation has an empty branch",
        ));
    }
    Regex::new(&format!("^(?:{pattern})$"))
        .map(MatchRule::Alternation)
        .map_err(|e| MatchCompileError::new(pattern, e.to_string()))
}

fn check_literal(pattern: &str, literal: &str) -> Result<(), MatchCompileError> {
    if literal.is_empty() {
        return Err(MatchCompileError::new(pattern, "prefix is empty"));
    }
    if let Some(c) = literal.chars().find(|c| RESERVED.contains(c)) {
        return Err(MatchCompileError::new(
            pattern,
            format!("unexpected `{c}`; wrap regular expressions in parentheses"),
        ));
    }
    if literal.chars().any(char::is_whitespace) {
        return Err(MatchCompileError::new(
            pattern,
            "whitespace is not allowed in operation names",
        ));
    }
    Ok(())
}

impl Matcher {
    /// Test an operation name.
    pub fn matches(&self, name: &str) -> bool {
        match &self.rule {
            MatchRule::Exact(exact) => name == exact,
            MatchRule::Any => true,
            MatchRule::Prefix(prefix) => name.starts_with(prefix.as_str()),
            MatchRule::Alternation(regex) => regex.is_match(name),
        }
    }

    /// The (trimmed) source pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn rule(&self) -> &MatchRule {
        &self.rule
    }
}

#[cfg(test)]
#[path = "matcher_tests.rs"]
mod tests;
