//! Run configuration.
//!
//! Every field has a default, so an empty JSON object is a valid
//! configuration:
//!
//! ```
//! use u_linebalance::config::{AllocationConfig, OrderingPolicy};
//!
//! let config = AllocationConfig::from_json_str(r#"{
//!     "ordering": "sam_priority",
//!     "auto_grouping": { "keywords": ["IRON"], "sam_threshold": 2.0 }
//! }"#).unwrap();
//! assert_eq!(config.ordering, OrderingPolicy::SamPriority);
//! assert_eq!(config.floater_proficiency, 55.0);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ConfigError;
use crate::normalize::normalize;

/// Proficiency credited to floaters and unfilled operations.
pub const DEFAULT_FLOATER_PROFICIENCY: f64 = 55.0;

/// Minimum similarity ratio for a fuzzy label suggestion.
pub const DEFAULT_SIMILARITY_CUTOFF: f64 = 0.6;

/// Order in which operations claim operators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingPolicy {
    /// Task-list order.
    #[default]
    InputOrder,
    /// Highest summed SAM first; ties keep task-list order.
    SamPriority,
}

/// Keyword/threshold rules for automatic operation grouping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoGrouping {
    /// Keywords in priority order; the first keyword to group an operation wins.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Operations with summed SAM strictly below this are candidates.
    #[serde(default)]
    pub sam_threshold: f64,
}

impl AutoGrouping {
    /// Creates a rule set.
    pub fn new<I, S>(keywords: I, sam_threshold: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            sam_threshold,
        }
    }
}

/// Configuration of a line-balancing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    /// Visiting order of operations during matching.
    pub ordering: OrderingPolicy,
    /// Proficiency credited to floaters and unfilled operations.
    pub floater_proficiency: f64,
    /// Minimum similarity ratio (0-1) for fuzzy label suggestions.
    pub similarity_cutoff: f64,
    /// Automatic grouping rules; `None` disables automatic grouping.
    pub auto_grouping: Option<AutoGrouping>,
    /// Explicit operation label → skill column overrides.
    pub operation_map: BTreeMap<String, String>,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            ordering: OrderingPolicy::InputOrder,
            floater_proficiency: DEFAULT_FLOATER_PROFICIENCY,
            similarity_cutoff: DEFAULT_SIMILARITY_CUTOFF,
            auto_grouping: None,
            operation_map: BTreeMap::new(),
        }
    }
}

impl AllocationConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the ordering policy.
    pub fn with_ordering(mut self, ordering: OrderingPolicy) -> Self {
        self.ordering = ordering;
        self
    }

    /// Sets the floater proficiency.
    pub fn with_floater_proficiency(mut self, proficiency: f64) -> Self {
        self.floater_proficiency = proficiency;
        self
    }

    /// Sets the fuzzy-match cutoff.
    pub fn with_similarity_cutoff(mut self, cutoff: f64) -> Self {
        self.similarity_cutoff = cutoff;
        self
    }

    /// Enables automatic grouping.
    pub fn with_auto_grouping(mut self, rules: AutoGrouping) -> Self {
        self.auto_grouping = Some(rules);
        self
    }

    /// Adds an explicit label → skill column override.
    pub fn with_mapping(mut self, label: impl AsRef<str>, column: impl AsRef<str>) -> Self {
        self.operation_map
            .insert(normalize(label.as_ref()), normalize(column.as_ref()));
        self
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.similarity_cutoff) {
            return Err(ConfigError::InvalidValue {
                key: "similarity_cutoff".into(),
                message: format!("{} is outside [0, 1]", self.similarity_cutoff),
            });
        }
        if !self.floater_proficiency.is_finite() || self.floater_proficiency < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "floater_proficiency".into(),
                message: format!("{} must be a non-negative number", self.floater_proficiency),
            });
        }
        if let Some(auto) = &self.auto_grouping {
            if !auto.sam_threshold.is_finite() {
                return Err(ConfigError::InvalidValue {
                    key: "auto_grouping.sam_threshold".into(),
                    message: format!("{} is not finite", auto.sam_threshold),
                });
            }
            if auto.keywords.iter().any(|k| normalize(k).is_empty()) {
                return Err(ConfigError::InvalidValue {
                    key: "auto_grouping.keywords".into(),
                    message: "keywords must not be blank".into(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AllocationConfig::default();
        assert_eq!(config.ordering, OrderingPolicy::InputOrder);
        assert_eq!(config.floater_proficiency, 55.0);
        assert_eq!(config.similarity_cutoff, 0.6);
        assert!(config.auto_grouping.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_json_is_default() {
        let config = AllocationConfig::from_json_str("{}").unwrap();
        assert_eq!(config, AllocationConfig::default());
    }

    #[test]
    fn test_full_json() {
        let config = AllocationConfig::from_json_str(
            r#"{
                "ordering": "sam_priority",
                "floater_proficiency": 50.0,
                "similarity_cutoff": 0.7,
                "auto_grouping": { "keywords": ["IRON", "TRIM"], "sam_threshold": 2.0 },
                "operation_map": { "SEW SIDE SEAM": "SIDE SEAM" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.ordering, OrderingPolicy::SamPriority);
        assert_eq!(config.floater_proficiency, 50.0);
        let auto = config.auto_grouping.unwrap();
        assert_eq!(auto.keywords, vec!["IRON", "TRIM"]);
        assert_eq!(auto.sam_threshold, 2.0);
        assert_eq!(config.operation_map["SEW SIDE SEAM"], "SIDE SEAM");
    }

    #[test]
    fn test_invalid_values() {
        let err = AllocationConfig::from_json_str(r#"{ "similarity_cutoff": 1.5 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "similarity_cutoff"));

        let err = AllocationConfig::from_json_str(r#"{ "floater_proficiency": -1 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "floater_proficiency"));

        let err = AllocationConfig::from_json_str(
            r#"{ "auto_grouping": { "keywords": [" "], "sam_threshold": 1.0 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_parse_error() {
        let err = AllocationConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        let err = AllocationConfig::from_json_str(r#"{ "ordering": "fastest" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_builder_normalizes_mapping() {
        let config = AllocationConfig::default().with_mapping("sew side", " side seam ");
        assert_eq!(config.operation_map["SEW SIDE"], "SIDE SEAM");
    }
}
