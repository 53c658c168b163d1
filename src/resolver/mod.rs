//! Operation label → skill column resolution.
//!
//! Operation bulletins and skill matrices are typed by different people, so
//! the same operation is often spelled differently in each. The resolver
//! maps every bulletin label without an exact skill-column match to the
//! closest column by similarity ratio, when one clears the cutoff.
//!
//! # Resolution Order
//!
//! 1. Explicit overrides from configuration.
//! 2. Exact match (identity, no map entry).
//! 3. Best fuzzy suggestion at or above the cutoff.
//! 4. Otherwise the label itself, which then fails to find a skill column
//!    and sends the operation down the floater path.

mod similarity;

pub use similarity::{best_match, similarity_ratio};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

use crate::config::DEFAULT_SIMILARITY_CUTOFF;
use crate::normalize::normalize;

/// Operation label → skill column mapping.
///
/// Labels with an exact skill-column match have no entry; lookups fall back
/// to the label itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationMap {
    entries: BTreeMap<String, String>,
}

impl OperationMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a mapping (both sides normalized).
    pub fn with_entry(mut self, label: impl AsRef<str>, column: impl AsRef<str>) -> Self {
        self.insert(label, column);
        self
    }

    /// Inserts a mapping (both sides normalized).
    pub fn insert(&mut self, label: impl AsRef<str>, column: impl AsRef<str>) {
        self.entries
            .insert(normalize(label.as_ref()), normalize(column.as_ref()));
    }

    /// Skill column for a label, falling back to the label.
    pub fn resolve<'a>(&'a self, label: &'a str) -> &'a str {
        self.entries.get(label).map(String::as_str).unwrap_or(label)
    }

    /// The explicit entry for a label, if any.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries.get(label).map(String::as_str)
    }

    /// Number of explicit entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Outcome of resolving one label that had no exact match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionDiagnostic {
    /// The operation label.
    pub label: String,
    /// Suggested skill column, `None` when nothing cleared the cutoff.
    pub suggestion: Option<String>,
    /// Similarity ratio of the suggestion.
    pub ratio: Option<f64>,
}

/// Resolver output: the map plus one diagnostic per unmatched label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// Label → column mapping.
    pub map: OperationMap,
    /// Unmatched labels in first-appearance order.
    pub diagnostics: Vec<ResolutionDiagnostic>,
}

impl Resolution {
    /// Labels with no usable skill column.
    pub fn unresolved(&self) -> impl Iterator<Item = &str> {
        self.diagnostics
            .iter()
            .filter(|d| d.suggestion.is_none())
            .map(|d| d.label.as_str())
    }
}

/// Fuzzy label resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyResolver {
    cutoff: f64,
    overrides: OperationMap,
}

impl FuzzyResolver {
    /// Creates a resolver with the default cutoff (0.6).
    pub fn new() -> Self {
        Self {
            cutoff: DEFAULT_SIMILARITY_CUTOFF,
            overrides: OperationMap::new(),
        }
    }

    /// Sets the similarity cutoff.
    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Sets explicit overrides; they win over exact and fuzzy matches.
    pub fn with_overrides(mut self, overrides: OperationMap) -> Self {
        self.overrides = overrides;
        self
    }

    /// Suggests the closest column for a single label.
    ///
    /// Returns `None` for an exact match as well as for no match; use
    /// [`resolve`](Self::resolve) to tell the two apart.
    pub fn suggest<'c>(&self, label: &str, columns: &'c [String]) -> Option<(&'c str, f64)> {
        if columns.iter().any(|c| c == label) {
            return None;
        }
        best_match(label, columns.iter().map(String::as_str), self.cutoff)
    }

    /// Resolves every distinct label against the skill columns.
    pub fn resolve<'l, I>(&self, labels: I, columns: &[String]) -> Resolution
    where
        I: IntoIterator<Item = &'l str>,
    {
        let mut resolution = Resolution {
            map: OperationMap::new(),
            diagnostics: Vec::new(),
        };
        let mut seen = HashSet::new();

        for label in labels {
            let label = normalize(label);
            if !seen.insert(label.clone()) {
                continue;
            }

            if let Some(column) = self.overrides.get(&label) {
                debug!(%label, %column, "operation mapped by override");
                resolution.map.insert(&label, column);
                continue;
            }
            if columns.iter().any(|c| *c == label) {
                continue;
            }

            match best_match(&label, columns.iter().map(String::as_str), self.cutoff) {
                Some((column, ratio)) => {
                    debug!(%label, %column, ratio, "fuzzy-mapped operation to skill column");
                    resolution.map.insert(&label, column);
                    resolution.diagnostics.push(ResolutionDiagnostic {
                        label,
                        suggestion: Some(column.to_string()),
                        ratio: Some(ratio),
                    });
                }
                None => {
                    warn!(%label, cutoff = self.cutoff, "no skill column close to operation");
                    resolution.diagnostics.push(ResolutionDiagnostic {
                        label,
                        suggestion: None,
                        ratio: None,
                    });
                }
            }
        }
        resolution
    }
}

impl Default for FuzzyResolver {
    fn default() -> Self {
        Self::new()
    }
}
