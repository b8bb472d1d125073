//! collectree-warnings: warning categories, the deprecation registry and the
//! sinks/filters that decide what happens to an emitted warning.

pub mod category;
pub mod config;
pub mod deprecated;
pub mod error;
pub mod filter;
pub mod sink;
pub mod terminal;
pub mod warning;

pub use category::WarningCategory;
pub use config::WarningsConfig;
pub use deprecated::check_private;
pub use error::{ConfigError, FilterError, TemplateError, WarningError};
pub use filter::{FilterAction, WarningFilter};
pub use sink::{FilteredSink, LogSink, WarningRecorder, WarningSink, LOG_TARGET};
pub use terminal::{Markup, TerminalSink, TerminalWriter};
pub use warning::{UnformattedWarning, Warning, WarningRecord};
