use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, FilterError};
use crate::filter::{FilterAction, WarningFilter};
use crate::sink::{FilteredSink, WarningSink};

/// Warning handling configuration.
///
/// ```json
/// { "filters": ["error", "ignore::ImportWarning"], "default_action": "default" }
/// ```
///
/// Filters use the `-W` grammar; later entries take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningsConfig {
    #[serde(default)]
    pub filters: Vec<String>,
    #[serde(default)]
    pub default_action: FilterAction,
}

impl WarningsConfig {
    /// Parse from JSON and validate every filter up front.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let cfg: WarningsConfig = serde_json::from_str(json)?;
        cfg.build_filters()?;
        Ok(cfg)
    }

    pub fn build_filters(&self) -> Result<Vec<WarningFilter>, FilterError> {
        self.filters.iter().map(|f| f.parse()).collect()
    }

    /// Wrap `inner` in a [`FilteredSink`] configured from `self`.
    pub fn into_sink<S: WarningSink>(&self, inner: S) -> Result<FilteredSink<S>, ConfigError> {
        let filters = self.build_filters()?;
        log::debug!(
            "installing {} warning filter(s), default action {}",
            filters.len(),
            self.default_action
        );
        Ok(FilteredSink::new(inner)
            .with_filters(filters)
            .with_default_action(self.default_action))
    }
}
