//! Warning categories and their subclass relation.
//!
//! The hierarchy mirrors the one test authors filter against:
//!
//! ```text
//! Warning
//! ├── UserWarning
//! │   └── PytestWarning
//! │       ├── PytestDeprecationWarning (also a DeprecationWarning)
//! │       │   └── PytestRemovedIn8Warning
//! │       ├── PytestCollectionWarning
//! │       └── PytestConfigWarning
//! ├── DeprecationWarning
//! ├── PendingDeprecationWarning
//! └── ImportWarning
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FilterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WarningCategory {
    Warning,
    UserWarning,
    DeprecationWarning,
    PendingDeprecationWarning,
    ImportWarning,
    PytestWarning,
    PytestDeprecationWarning,
    PytestRemovedIn8Warning,
    PytestCollectionWarning,
    PytestConfigWarning,
}

impl WarningCategory {
    pub const ALL: [WarningCategory; 10] = [
        WarningCategory::Warning,
        WarningCategory::UserWarning,
        WarningCategory::DeprecationWarning,
        WarningCategory::PendingDeprecationWarning,
        WarningCategory::ImportWarning,
        WarningCategory::PytestWarning,
        WarningCategory::PytestDeprecationWarning,
        WarningCategory::PytestRemovedIn8Warning,
        WarningCategory::PytestCollectionWarning,
        WarningCategory::PytestConfigWarning,
    ];

    pub fn name(self) -> &'static str {
        match self {
            WarningCategory::Warning => "Warning",
            WarningCategory::UserWarning => "UserWarning",
            WarningCategory::DeprecationWarning => "DeprecationWarning",
            WarningCategory::PendingDeprecationWarning => "PendingDeprecationWarning",
            WarningCategory::ImportWarning => "ImportWarning",
            WarningCategory::PytestWarning => "PytestWarning",
            WarningCategory::PytestDeprecationWarning => "PytestDeprecationWarning",
            WarningCategory::PytestRemovedIn8Warning => "PytestRemovedIn8Warning",
            WarningCategory::PytestCollectionWarning => "PytestCollectionWarning",
            WarningCategory::PytestConfigWarning => "PytestConfigWarning",
        }
    }

    /// Direct base categories. `Warning` is the only category without one.
    pub fn bases(self) -> &'static [WarningCategory] {
        use WarningCategory::*;
        match self {
            Warning => &[],
            UserWarning | DeprecationWarning | PendingDeprecationWarning | ImportWarning => {
                &[Warning]
            }
            PytestWarning => &[UserWarning],
            PytestDeprecationWarning => &[PytestWarning, DeprecationWarning],
            PytestRemovedIn8Warning => &[PytestDeprecationWarning],
            PytestCollectionWarning | PytestConfigWarning => &[PytestWarning],
        }
    }

    /// Reflexive, transitive subclass check.
    pub fn is_subclass_of(self, other: WarningCategory) -> bool {
        self == other || self.bases().iter().any(|base| base.is_subclass_of(other))
    }
}

impl fmt::Display for WarningCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WarningCategory {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        WarningCategory::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| FilterError::UnknownCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removed_in_8_is_a_deprecation_and_a_framework_warning() {
        let c = WarningCategory::PytestRemovedIn8Warning;
        assert!(c.is_subclass_of(WarningCategory::PytestDeprecationWarning));
        assert!(c.is_subclass_of(WarningCategory::DeprecationWarning));
        assert!(c.is_subclass_of(WarningCategory::PytestWarning));
        assert!(c.is_subclass_of(WarningCategory::UserWarning));
        assert!(c.is_subclass_of(WarningCategory::Warning));
        assert!(!c.is_subclass_of(WarningCategory::PytestCollectionWarning));
    }

    #[test]
    fn plain_deprecation_is_not_a_framework_warning() {
        assert!(!WarningCategory::DeprecationWarning.is_subclass_of(WarningCategory::PytestWarning));
        assert!(!WarningCategory::Warning.is_subclass_of(WarningCategory::UserWarning));
    }

    #[test]
    fn every_category_descends_from_warning() {
        for c in WarningCategory::ALL {
            assert!(c.is_subclass_of(WarningCategory::Warning), "{c}");
            assert!(c.is_subclass_of(c));
        }
    }

    #[test]
    fn parse_by_name() {
        assert_eq!(
            "ImportWarning".parse::<WarningCategory>().unwrap(),
            WarningCategory::ImportWarning
        );
        assert!("NotAWarning".parse::<WarningCategory>().is_err());
    }
}
