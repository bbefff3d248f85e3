//! Filter Module
//!
//! Regex filtering over record-structured text documents. A document is a
//! sequence of blank-line-separated records made of `Field: value` lines;
//! blocks without any field line (headers, prose) always pass through.

use regex::Regex;
use serde::Serialize;

use crate::error::{AppError, Result};

// == Filter Rule ==
/// One filtering rule: a pattern tested against named fields of a record.
///
/// A non-inverted rule removes records it matches; an inverted rule
/// removes records it does not match.
#[derive(Debug, Clone)]
pub struct FilterRule {
    /// Field names to test, matched case-insensitively
    fields: Vec<String>,
    /// Compiled pattern
    pattern: Regex,
    /// Pattern source, kept verbatim for fingerprinting
    raw_pattern: String,
    /// Invert match semantics
    invert: bool,
}

impl FilterRule {
    // == Constructor ==
    /// Compiles a rule.
    ///
    /// # Errors
    /// Returns an invalid-request error when the pattern does not compile,
    /// so a bad filter is rejected before any fetch happens.
    pub fn new(fields: Vec<String>, pattern: &str, invert: bool) -> Result<Self> {
        let compiled = Regex::new(pattern).map_err(|err| {
            AppError::InvalidRequest(format!("invalid filter pattern {pattern:?}: {err}"))
        })?;

        Ok(Self {
            fields,
            pattern: compiled,
            raw_pattern: pattern.to_string(),
            invert,
        })
    }

    /// True when any named field has a nonempty value matching the
    /// pattern. Empty values never match, so `.*` cannot remove a record
    /// that merely declares a field.
    fn matches(&self, record: &Record<'_>) -> bool {
        self.fields.iter().any(|field| {
            record
                .value(field)
                .is_some_and(|value| !value.is_empty() && self.pattern.is_match(value))
        })
    }

    /// Whether this rule removes the record.
    fn removes(&self, record: &Record<'_>) -> bool {
        let matched = self.matches(record);
        if self.invert {
            !matched
        } else {
            matched
        }
    }

    /// Component string feeding the output cache fingerprint. Carries the
    /// field list, the verbatim pattern, and the invert flag, since each
    /// changes the computed output.
    fn fingerprint_component(&self) -> String {
        format!("{}:{}:{}", self.fields.join(","), self.raw_pattern, self.invert)
    }

    /// Human-readable form used in debug reports.
    fn describe(&self) -> String {
        format!(
            "fields=[{}] pattern={:?} invert={}",
            self.fields.join(","),
            self.raw_pattern,
            self.invert
        )
    }
}

// == Filter Set ==
/// An ordered set of rules applied conjunctively: a record survives only
/// if no rule removes it.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    rules: Vec<FilterRule>,
}

impl FilterSet {
    // == Constructor ==
    pub fn new(rules: Vec<FilterRule>) -> Self {
        Self { rules }
    }

    /// True when no rules are configured; applying is then the identity.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    // == Apply ==
    /// Filters a document, returning the kept records.
    ///
    /// Kept blocks are emitted in order, separated by single blank lines,
    /// with newline line endings; interior blank-line runs are not
    /// preserved byte for byte.
    pub fn apply(&self, document: &str) -> String {
        let mut kept_blocks: Vec<String> = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for line in document.lines() {
            if line.trim().is_empty() {
                self.finish_block(&mut current, &mut kept_blocks);
            } else {
                current.push(line);
            }
        }
        self.finish_block(&mut current, &mut kept_blocks);

        let mut output = kept_blocks.join("\n\n");
        if document.ends_with('\n') && !output.is_empty() {
            output.push('\n');
        }
        output
    }

    fn finish_block(&self, current: &mut Vec<&str>, kept: &mut Vec<String>) {
        if current.is_empty() {
            return;
        }
        if self.keeps(current) {
            kept.push(current.join("\n"));
        }
        current.clear();
    }

    fn keeps(&self, block: &[&str]) -> bool {
        let Some(record) = Record::parse(block) else {
            // Not a record, always passes through.
            return true;
        };
        !self.rules.iter().any(|rule| rule.removes(&record))
    }

    // == Apply Debug ==
    /// Runs the rules and reports, per record, whether it was removed and
    /// by which rule. Non-record blocks are not reported.
    pub fn apply_debug(&self, document: &str) -> FilterReport {
        let mut matches = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        let inspect = |block: &[&str], matches: &mut Vec<RecordMatch>| {
            let Some(record) = Record::parse(block) else {
                return;
            };
            let removed_by = self
                .rules
                .iter()
                .find(|rule| rule.removes(&record))
                .map(FilterRule::describe);
            matches.push(RecordMatch {
                index: matches.len(),
                first_line: block.first().map(|line| line.trim().to_string()).unwrap_or_default(),
                removed: removed_by.is_some(),
                removed_by,
            });
        };

        for line in document.lines() {
            if line.trim().is_empty() {
                if !current.is_empty() {
                    inspect(&current, &mut matches);
                    current.clear();
                }
            } else {
                current.push(line);
            }
        }
        if !current.is_empty() {
            inspect(&current, &mut matches);
        }

        let removed_records = matches.iter().filter(|m| m.removed).count();
        FilterReport {
            total_records: matches.len(),
            kept_records: matches.len() - removed_records,
            removed_records,
            records: matches,
        }
    }

    // == Fingerprint Components ==
    /// Ordered component strings describing this filter set, fed into the
    /// output cache key.
    pub fn fingerprint_components(&self) -> Vec<String> {
        self.rules
            .iter()
            .map(FilterRule::fingerprint_component)
            .collect()
    }
}

// == Filter Report ==
/// Debug view of one filtering pass.
#[derive(Debug, Serialize)]
pub struct FilterReport {
    pub total_records: usize,
    pub kept_records: usize,
    pub removed_records: usize,
    pub records: Vec<RecordMatch>,
}

/// Outcome for a single record in a debug pass.
#[derive(Debug, Serialize)]
pub struct RecordMatch {
    pub index: usize,
    pub first_line: String,
    pub removed: bool,
    /// Description of the first rule that removed the record, if any
    pub removed_by: Option<String>,
}

// == Record ==
/// Parsed view of one block: its `Field: value` lines, names lowercased.
struct Record<'a> {
    fields: Vec<(String, &'a str)>,
}

impl<'a> Record<'a> {
    /// Returns None when no line parses as a field, which marks the block
    /// as passthrough content rather than a record.
    fn parse(lines: &[&'a str]) -> Option<Self> {
        let mut fields = Vec::new();
        for line in lines {
            if let Some((name, value)) = line.split_once(':') {
                let name = name.trim();
                if !name.is_empty() && !name.chars().any(char::is_whitespace) {
                    fields.push((name.to_ascii_lowercase(), value.trim()));
                }
            }
        }
        if fields.is_empty() {
            None
        } else {
            Some(Self { fields })
        }
    }

    /// First value stored under a field name, case-insensitive.
    fn value(&self, field: &str) -> Option<&'a str> {
        let want = field.to_ascii_lowercase();
        self.fields
            .iter()
            .find(|(name, _)| *name == want)
            .map(|(_, value)| *value)
    }
}
