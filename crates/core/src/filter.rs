// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wildcard pipeline name filter

use regex::{Regex, RegexBuilder};

/// Case-insensitive `*` / `?` glob over pipeline names
///
/// An empty pattern or a lone `*` matches every name.
#[derive(Debug, Clone)]
pub struct PipelineFilter {
    pattern: Option<Regex>,
}

impl PipelineFilter {
    pub fn new(pattern: Option<&str>) -> Result<Self, regex::Error> {
        let pattern = match pattern.map(str::trim) {
            None | Some("") | Some("*") => None,
            Some(glob) => Some(
                RegexBuilder::new(&glob_to_regex(glob))
                    .case_insensitive(true)
                    .build()?,
            ),
        };
        Ok(Self { pattern })
    }

    /// A filter that accepts everything
    pub fn all() -> Self {
        Self { pattern: None }
    }

    pub fn matches(&self, name: &str) -> bool {
        match &self.pattern {
            None => true,
            Some(re) => re.is_match(name),
        }
    }
}

fn glob_to_regex(glob: &str) -> String {
    let escaped = regex::escape(glob)
        .replace("\\*", ".*")
        .replace("\\?", ".");
    format!("^{}$", escaped)
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
