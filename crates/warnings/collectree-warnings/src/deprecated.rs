//! Deprecation messages for internal APIs scheduled for removal.
//!
//! Every entry is either a [`Warning`] or, when the message needs arguments,
//! an [`UnformattedWarning`]. Keeping them in one place makes it easy to find
//! and drop them once the removal lands.

use crate::category::WarningCategory::{PytestDeprecationWarning, PytestRemovedIn8Warning};
use crate::error::WarningError;
use crate::sink::WarningSink;
use crate::warning::{UnformattedWarning, Warning, WarningRecord};

/// Plugins that were merged into the core; registering them is skipped.
pub const DEPRECATED_EXTERNAL_PLUGINS: [&str; 3] = [
    "pytest_catchlog",
    "pytest_capturelog",
    "pytest_faulthandler",
];

pub fn is_deprecated_external_plugin(name: &str) -> bool {
    DEPRECATED_EXTERNAL_PLUGINS.contains(&name)
}

pub static YIELD_FIXTURE: Warning = Warning::from_static(
    PytestDeprecationWarning,
    "@pytest.yield_fixture is deprecated.\n\
     Use @pytest.fixture instead; they are the same.",
);

pub static WARNING_CMDLINE_PREPARSE_HOOK: Warning = Warning::from_static(
    PytestRemovedIn8Warning,
    "The pytest_cmdline_preparse hook is deprecated and will be removed in a future release. \n\
     Please use pytest_load_initial_conftests hook instead.",
);

pub static FSCOLLECTOR_GETHOOKPROXY_ISINITPATH: Warning = Warning::from_static(
    PytestRemovedIn8Warning,
    "The gethookproxy() and isinitpath() methods of FSCollector and Package are deprecated; \
     use self.session.gethookproxy() and self.session.isinitpath() instead. ",
);

pub static STRICT_OPTION: Warning = Warning::from_static(
    PytestRemovedIn8Warning,
    "The --strict option is deprecated, use --strict-markers instead.",
);

/// Never scheduled for removal.
pub static PRIVATE: Warning = Warning::from_static(
    PytestDeprecationWarning,
    "A private pytest class or function was used.",
);

pub static ARGUMENT_PERCENT_DEFAULT: Warning = Warning::from_static(
    PytestRemovedIn8Warning,
    "pytest now uses argparse. \"%default\" should be changed to \"%(default)s\"",
);

pub static ARGUMENT_TYPE_STR_CHOICE: UnformattedWarning = UnformattedWarning::new(
    PytestRemovedIn8Warning,
    "`type` argument to addoption() is the string {typ!r}. \
     For choices this is optional and can be omitted,  \
     but when supplied should be a type (for example `str` or `int`). \
     (options: {names})",
);

pub static ARGUMENT_TYPE_STR: UnformattedWarning = UnformattedWarning::new(
    PytestRemovedIn8Warning,
    "`type` argument to addoption() is the string {typ!r},  \
     but when supplied should be a type (for example `str` or `int`). \
     (options: {names})",
);

pub static SETUP_CFG_CONFIG: Warning = Warning::from_static(
    PytestDeprecationWarning,
    "configuring pytest in setup.cfg has been deprecated \n\
     as pytest and setuptools do not share he same config parser\n\
     please consider pytest.ini/tox.ini or pyproject.toml",
);

pub static HOOK_LEGACY_PATH_ARG: UnformattedWarning = UnformattedWarning::new(
    PytestRemovedIn8Warning,
    "The ({pylib_path_arg}: py.path.local) argument is deprecated, please use ({pathlib_path_arg}: pathlib.Path)\n\
     see https://docs.pytest.org/en/latest/deprecations.html\
     #py-path-local-arguments-for-hooks-replaced-with-pathlib-path",
);

pub static NODE_CTOR_FSPATH_ARG: UnformattedWarning = UnformattedWarning::new(
    PytestRemovedIn8Warning,
    "The (fspath: py.path.local) argument to {node_type_name} is deprecated. \
     Please use the (path: pathlib.Path) argument instead.\n\
     See https://docs.pytest.org/en/latest/deprecations.html\
     #fspath-argument-for-node-constructors-replaced-with-pathlib-path",
);

pub static WARNS_NONE_ARG: Warning = Warning::from_static(
    PytestRemovedIn8Warning,
    "Passing None has been deprecated.\n\
     See https://docs.pytest.org/en/latest/how-to/capture-warnings.html\
     #additional-use-cases-of-warnings-in-tests \
     for alternatives in common use cases.",
);

pub static KEYWORD_MSG_ARG: UnformattedWarning = UnformattedWarning::new(
    PytestRemovedIn8Warning,
    "pytest.{func}(msg=...) is now deprecated, use pytest.{func}(reason=...) instead",
);

pub static INSTANCE_COLLECTOR: Warning = Warning::from_static(
    PytestRemovedIn8Warning,
    "The pytest.Instance collector type is deprecated and is no longer used. \
     See https://docs.pytest.org/en/latest/deprecations.html#the-pytest-instance-collector",
);

/// Emitted by `Node::create` for every constructor argument it had to take
/// from the parent.
pub static NODE_IMPLIED_CTOR_ARG: UnformattedWarning = UnformattedWarning::new(
    PytestDeprecationWarning,
    "implying Node.{arg} from parent.{arg} has been deprecated\n\
     please use the Node.from_parent to have them be implied by the superclass named ctors",
);

/// A registry entry: either ready to emit or still needing arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deprecation {
    Fixed(&'static Warning),
    Template(&'static UnformattedWarning),
}

static REGISTRY: [(&str, Deprecation); 15] = [
    ("YIELD_FIXTURE", Deprecation::Fixed(&YIELD_FIXTURE)),
    (
        "WARNING_CMDLINE_PREPARSE_HOOK",
        Deprecation::Fixed(&WARNING_CMDLINE_PREPARSE_HOOK),
    ),
    (
        "FSCOLLECTOR_GETHOOKPROXY_ISINITPATH",
        Deprecation::Fixed(&FSCOLLECTOR_GETHOOKPROXY_ISINITPATH),
    ),
    ("STRICT_OPTION", Deprecation::Fixed(&STRICT_OPTION)),
    ("PRIVATE", Deprecation::Fixed(&PRIVATE)),
    (
        "ARGUMENT_PERCENT_DEFAULT",
        Deprecation::Fixed(&ARGUMENT_PERCENT_DEFAULT),
    ),
    (
        "ARGUMENT_TYPE_STR_CHOICE",
        Deprecation::Template(&ARGUMENT_TYPE_STR_CHOICE),
    ),
    ("ARGUMENT_TYPE_STR", Deprecation::Template(&ARGUMENT_TYPE_STR)),
    ("SETUP_CFG_CONFIG", Deprecation::Fixed(&SETUP_CFG_CONFIG)),
    (
        "HOOK_LEGACY_PATH_ARG",
        Deprecation::Template(&HOOK_LEGACY_PATH_ARG),
    ),
    (
        "NODE_CTOR_FSPATH_ARG",
        Deprecation::Template(&NODE_CTOR_FSPATH_ARG),
    ),
    ("WARNS_NONE_ARG", Deprecation::Fixed(&WARNS_NONE_ARG)),
    ("KEYWORD_MSG_ARG", Deprecation::Template(&KEYWORD_MSG_ARG)),
    ("INSTANCE_COLLECTOR", Deprecation::Fixed(&INSTANCE_COLLECTOR)),
    (
        "NODE_IMPLIED_CTOR_ARG",
        Deprecation::Template(&NODE_IMPLIED_CTOR_ARG),
    ),
];

/// All registered deprecations, by constant name.
pub fn registry() -> &'static [(&'static str, Deprecation)] {
    &REGISTRY
}

pub fn lookup(name: &str) -> Option<Deprecation> {
    REGISTRY
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, entry)| *entry)
}

/// Guard for functions that are only meant to be called from inside the
/// framework. Internal callers pass `internal = true`; everybody else gets
/// [`PRIVATE`] emitted into `sink`.
///
/// ```
/// use collectree_warnings::{check_private, WarningRecorder};
///
/// let recorder = WarningRecorder::new();
/// check_private(true, &recorder).unwrap();
/// assert!(recorder.is_empty());
/// check_private(false, &recorder).unwrap();
/// assert_eq!(recorder.len(), 1);
/// ```
pub fn check_private(internal: bool, sink: &dyn WarningSink) -> Result<(), WarningError> {
    if internal {
        return Ok(());
    }
    sink.emit(WarningRecord::new(PRIVATE.clone()))
}
