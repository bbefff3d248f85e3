//! Request DTOs for the filtering proxy API
//!
//! Defines the query-parameter surface of the feed endpoint.

use std::collections::HashMap;

use crate::error::Result;
use crate::filter::{FilterRule, FilterSet};

/// Highest rule index read from `fieldN`/`patternN`/`invertN` parameters.
const MAX_RULES: usize = 9;

/// Fields searched when a rule omits its field list.
const DEFAULT_FIELDS: [&str; 2] = ["summary", "description"];

/// Parsed query parameters for the feed endpoint (GET /feed).
///
/// # Fields
/// - `upstream`: origin address; falls back to the configured default
/// - `debug`: respond with a match report instead of the document
/// - `rules`: filter rules in parameter order
#[derive(Debug, Clone)]
pub struct FeedParams {
    pub upstream: Option<String>,
    pub debug: bool,
    pub rules: Vec<RuleParams>,
}

/// One filter rule as read from the query string.
#[derive(Debug, Clone)]
pub struct RuleParams {
    /// Field names, from a comma-separated `field` value
    pub fields: Vec<String>,
    /// Uncompiled pattern text
    pub pattern: String,
    /// Remove non-matching records instead of matching ones
    pub invert: bool,
}

impl FeedParams {
    /// Reads the feed parameters out of a query-string map.
    ///
    /// The bare `field`/`pattern`/`invert` parameters come first, then the
    /// indexed forms `field1`..`field9` in index order. A rule exists only
    /// when its pattern is present and nonempty; its field list defaults
    /// to summary and description.
    pub fn from_query(query: &HashMap<String, String>) -> Self {
        let mut rules = Vec::new();

        if let Some(pattern) = query.get("pattern").filter(|p| !p.is_empty()) {
            rules.push(RuleParams {
                fields: parse_field_list(query.get("field")),
                pattern: pattern.clone(),
                invert: parse_bool(query, "invert"),
            });
        }

        for index in 1..=MAX_RULES {
            let pattern = query.get(&format!("pattern{index}"));
            let Some(pattern) = pattern.filter(|p| !p.is_empty()) else {
                continue;
            };
            rules.push(RuleParams {
                fields: parse_field_list(query.get(&format!("field{index}"))),
                pattern: pattern.clone(),
                invert: parse_bool(query, &format!("invert{index}")),
            });
        }

        Self {
            upstream: query.get("upstream").filter(|u| !u.is_empty()).cloned(),
            debug: parse_bool(query, "debug"),
            rules,
        }
    }

    /// Compiles the parsed rules into a filter set.
    ///
    /// # Errors
    /// Returns an invalid-request error for the first pattern that does
    /// not compile.
    pub fn filter_set(&self) -> Result<FilterSet> {
        let mut rules = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            rules.push(FilterRule::new(
                rule.fields.clone(),
                &rule.pattern,
                rule.invert,
            )?);
        }
        Ok(FilterSet::new(rules))
    }
}

/// Splits a comma-separated field list, dropping empty segments; an
/// absent or empty list falls back to the default fields.
fn parse_field_list(raw: Option<&String>) -> Vec<String> {
    let fields: Vec<String> = raw
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|field| !field.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if fields.is_empty() {
        DEFAULT_FIELDS.iter().map(|field| field.to_string()).collect()
    } else {
        fields
    }
}

/// Boolean query parameter: bare presence, `true`, and `1` all mean true.
fn parse_bool(query: &HashMap<String, String>, key: &str) -> bool {
    match query.get(key) {
        Some(value) => value.is_empty() || value == "true" || value == "1",
        None => false,
    }
}
