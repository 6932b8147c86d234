//! Finds ticket mentions in free chat text.

use std::{collections::HashSet, sync::LazyLock};

use regex::Regex;

use crate::base::types::IssueIdentifier;

/// `KEY-NUMBER` on ASCII word boundaries; non-ASCII letters never join a key.
static ISSUE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?-u:\b)[0-9A-Za-z_]+-[0-9]+(?-u:\b)").unwrap());

/// Extracts the distinct ticket identifiers mentioned in `text`.
///
/// Matches are upper-cased, so `abc-123` and `ABC-123` are the same ticket. The result keeps
/// the order in which each ticket is first mentioned.
pub fn extract_issue_identifiers(text: &str) -> Vec<IssueIdentifier> {
    let mut seen = HashSet::new();

    ISSUE_PATTERN
        .find_iter(text)
        .map(|m| IssueIdentifier::new(m.as_str()))
        .filter(|id| seen.insert(id.clone()))
        .collect()
}
