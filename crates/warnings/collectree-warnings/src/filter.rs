//! `-W` style warning filters.
//!
//! Grammar: `action[:message[:category]]`
//! - `action` is any non-empty prefix of `default`, `error`, `ignore`,
//!   `always` or `once`
//! - `message` must match the start of the warning message, ignoring case
//! - `category` matches that category and its subclasses
//!
//! Empty fields match everything. When several filters match, the one added
//! last wins.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::category::WarningCategory;
use crate::error::FilterError;
use crate::warning::WarningRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterAction {
    /// Escalate the warning to an error.
    Error,
    /// Drop the warning.
    Ignore,
    /// Forward every occurrence.
    Always,
    /// Forward the first occurrence per location.
    #[default]
    Default,
    /// Forward the first occurrence regardless of location.
    Once,
}

impl FilterAction {
    const ALL: [FilterAction; 5] = [
        FilterAction::Default,
        FilterAction::Error,
        FilterAction::Ignore,
        FilterAction::Always,
        FilterAction::Once,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FilterAction::Error => "error",
            FilterAction::Ignore => "ignore",
            FilterAction::Always => "always",
            FilterAction::Default => "default",
            FilterAction::Once => "once",
        }
    }
}

impl fmt::Display for FilterAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterAction {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(FilterAction::Default);
        }
        FilterAction::ALL
            .into_iter()
            .find(|a| a.name().starts_with(s))
            .ok_or_else(|| FilterError::UnknownAction(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarningFilter {
    pub action: FilterAction,
    /// Lowercased message prefix; empty matches every message.
    message: String,
    pub category: WarningCategory,
}

impl WarningFilter {
    pub fn new(action: FilterAction, message: &str, category: WarningCategory) -> Self {
        Self {
            action,
            message: message.to_lowercase(),
            category,
        }
    }

    /// Filter applying `action` to every warning.
    pub fn all(action: FilterAction) -> Self {
        Self::new(action, "", WarningCategory::Warning)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn matches(&self, record: &WarningRecord) -> bool {
        record.category().is_subclass_of(self.category)
            && record.message().to_lowercase().starts_with(&self.message)
    }
}

impl FromStr for WarningFilter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        if parts.len() > 3 {
            return Err(FilterError::TooManyFields(s.to_string()));
        }
        let action = parts[0].parse::<FilterAction>()?;
        let message = parts.get(1).copied().unwrap_or("");
        let category = match parts.get(2).copied() {
            None | Some("") => WarningCategory::Warning,
            Some(name) => name.parse::<WarningCategory>()?,
        };
        Ok(WarningFilter::new(action, message, category))
    }
}

/// Action of the last matching filter, if any matches.
pub fn resolve(filters: &[WarningFilter], record: &WarningRecord) -> Option<FilterAction> {
    filters
        .iter()
        .rev()
        .find(|f| f.matches(record))
        .map(|f| f.action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warning::Warning;

    fn record(category: WarningCategory, message: &str) -> WarningRecord {
        WarningRecord::new(Warning::new(category, message))
    }

    #[test]
    fn parse_full_filter() {
        let f: WarningFilter = "ignore:Mode is deprecated:DeprecationWarning".parse().unwrap();
        assert_eq!(f.action, FilterAction::Ignore);
        assert_eq!(f.message(), "mode is deprecated");
        assert_eq!(f.category, WarningCategory::DeprecationWarning);
    }

    #[test]
    fn parse_action_prefixes() {
        assert_eq!("e".parse::<FilterAction>().unwrap(), FilterAction::Error);
        assert_eq!("ign".parse::<FilterAction>().unwrap(), FilterAction::Ignore);
        assert!(matches!(
            "explode".parse::<FilterAction>(),
            Err(FilterError::UnknownAction(_))
        ));
    }

    #[test]
    fn parse_rejects_bad_filters() {
        assert!(matches!(
            "error::NoSuchWarning".parse::<WarningFilter>(),
            Err(FilterError::UnknownCategory(_))
        ));
        assert!(matches!(
            "error:a:Warning:mod:12".parse::<WarningFilter>(),
            Err(FilterError::TooManyFields(_))
        ));
    }

    #[test]
    fn message_is_a_case_insensitive_prefix() {
        let f: WarningFilter = "error:the imp".parse().unwrap();
        assert!(f.matches(&record(WarningCategory::DeprecationWarning, "The IMP module is gone")));
        assert!(!f.matches(&record(WarningCategory::DeprecationWarning, "not the imp")));
    }

    #[test]
    fn category_matches_subclasses() {
        let f: WarningFilter = "error::DeprecationWarning".parse().unwrap();
        assert!(f.matches(&record(WarningCategory::PytestRemovedIn8Warning, "x")));
        assert!(!f.matches(&record(WarningCategory::PytestCollectionWarning, "x")));
    }

    #[test]
    fn last_matching_filter_wins() {
        let filters: Vec<WarningFilter> = ["error", "ignore::ImportWarning"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        assert_eq!(
            resolve(&filters, &record(WarningCategory::ImportWarning, "x")),
            Some(FilterAction::Ignore)
        );
        assert_eq!(
            resolve(&filters, &record(WarningCategory::UserWarning, "x")),
            Some(FilterAction::Error)
        );
        assert_eq!(resolve(&[], &record(WarningCategory::UserWarning, "x")), None);
    }
}
