//! Reusable input filters
//!
//! These normalise raw string fields before validation.

use std::collections::HashSet;

/// Filter: trim whitespace, mapping blank strings to `None`
pub fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Filter: trim and lowercase an identifier, mapping blank strings to `None`
pub fn identifier(value: Option<&str>) -> Option<String> {
    trimmed(value).map(|s| s.to_lowercase())
}

/// Filter: normalise identifiers and drop duplicates, keeping first occurrence
///
/// Stops once `limit` distinct entries have been collected.
pub fn dedup_identifiers(values: &[String], limit: usize) -> Vec<String> {
    let mut seen = HashSet::with_capacity(limit.min(values.len()));
    let mut unique = Vec::with_capacity(limit.min(values.len()));
    for value in values {
        if unique.len() >= limit {
            break;
        }
        if let Some(id) = identifier(Some(value))
            && seen.insert(id.clone())
        {
            unique.push(id);
        }
    }
    unique
}
