use std::path::PathBuf;

use collectree_warnings::WarningError;
use thiserror::Error;

/// Errors produced while locating the rootdir and reading its config file.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{}:{line}: {message}", path.display())]
    Ini {
        path: PathBuf,
        line: usize,
        message: String,
    },
    #[error("{}: {source}", path.display())]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("[pytest] section in {filename} files is no longer supported, change to [tool:pytest] instead.")]
    PytestSectionInCfg { filename: String },
    #[error("Directory '{}' not found. Check your '--rootdir' option.", .0.display())]
    RootdirNotFound(PathBuf),
    #[error(transparent)]
    Warning(#[from] WarningError),
}
