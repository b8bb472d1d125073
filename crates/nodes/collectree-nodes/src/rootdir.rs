//! Rootdir discovery from invocation arguments.
//!
//! A directory becomes the rootdir when it holds a config file with a pytest
//! section (see [`crate::inifile`]), when it holds `setup.py`, or as the
//! common ancestor of the arguments and the invocation directory.

use std::env;
use std::path::{Path, PathBuf};

use collectree_warnings::WarningSink;

use crate::error::SetupError;
use crate::inifile::{load_config_dict_from_file, IniConfig, CONFIG_LOADERS};
use crate::node_id::ITEM_SEP;
use crate::path::absolute_path;

pub const SETUP_PY: &str = "setup.py";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootDirSetup {
    pub rootdir: PathBuf,
    /// The config file the options came from, if any.
    pub inifile: Option<PathBuf>,
    pub inicfg: IniConfig,
}

fn shared_prefix(a: &Path, b: &Path) -> Option<PathBuf> {
    let shared: PathBuf = a
        .components()
        .zip(b.components())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x)
        .collect();
    if shared.as_os_str().is_empty() {
        None
    } else {
        Some(shared)
    }
}

/// Deepest directory containing every existing path in `paths`.
///
/// Paths that do not exist are skipped; with none left the result is `cwd`.
/// A file result is replaced by its parent directory.
pub fn common_ancestor<I, P>(paths: I, cwd: &Path) -> PathBuf
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut common: Option<PathBuf> = None;
    for path in paths {
        let path = path.as_ref();
        if !path.exists() {
            continue;
        }
        common = Some(match common {
            None => path.to_path_buf(),
            Some(current) if path.starts_with(&current) => current,
            Some(current) if current.starts_with(path) => path.to_path_buf(),
            Some(current) => shared_prefix(&current, path).unwrap_or(current),
        });
    }
    match common {
        None => cwd.to_path_buf(),
        Some(found) if found.is_file() => found.parent().map(Path::to_path_buf).unwrap_or(found),
        Some(found) => found,
    }
}

/// Existing directories named by `args`.
///
/// Options (anything starting with `-`) are skipped and node id suffixes
/// (`::Class::test`) are stripped. Files map to their parent directory.
pub fn dirs_from_args<I, S>(args: I, cwd: &Path) -> Vec<PathBuf>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .filter(|arg| !arg.as_ref().starts_with('-'))
        .map(|arg| {
            let file_part = arg.as_ref().split(ITEM_SEP).next().unwrap_or("").to_string();
            absolute_path(Path::new(&file_part), cwd)
        })
        .filter(|path| path.exists())
        .map(|path| {
            if path.is_dir() {
                path
            } else {
                path.parent().map(Path::to_path_buf).unwrap_or(path)
            }
        })
        .collect()
}

/// First directory, walking up from each of `args` in turn, holding a config
/// file with a pytest section. With no `args` the search starts at `cwd`.
pub fn locate_config(
    args: &[PathBuf],
    cwd: &Path,
    sink: &dyn WarningSink,
) -> Result<Option<RootDirSetup>, SetupError> {
    let fallback = [cwd.to_path_buf()];
    let args = if args.is_empty() { &fallback[..] } else { args };
    for arg in args {
        let argpath = absolute_path(arg, cwd);
        for base in argpath.ancestors() {
            for (name, loader) in CONFIG_LOADERS {
                let candidate = base.join(name);
                if !candidate.is_file() {
                    continue;
                }
                if let Some(inicfg) = loader.load(&candidate, sink)? {
                    log::debug!("rootdir {} from {}", base.display(), candidate.display());
                    return Ok(Some(RootDirSetup {
                        rootdir: base.to_path_buf(),
                        inifile: Some(candidate),
                        inicfg,
                    }));
                }
            }
        }
    }
    Ok(None)
}

/// Expand `$NAME` and `${NAME}` using `var`; unknown variables are left as
/// written.
pub fn expand_vars<F>(s: &str, var: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let is_name = |c: char| c.is_ascii_alphanumeric() || c == '_';
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(at) = rest.find('$') {
        out.push_str(&rest[..at]);
        let after = &rest[at + 1..];
        let (name, consumed) = match after.strip_prefix('{') {
            Some(braced) => match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => ("", 0),
            },
            None => {
                let end = after.find(|c| !is_name(c)).unwrap_or(after.len());
                (&after[..end], end)
            }
        };
        match (!name.is_empty()).then(|| var(name)).flatten() {
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[at..at + 1 + consumed]),
        }
        rest = &after[consumed..];
    }
    out.push_str(rest);
    out
}

/// Pick the rootdir and config file for an invocation from `cwd`.
///
/// An explicit `inifile` supplies the options and, unless `rootdir_arg` is
/// given, its directory becomes the rootdir. Otherwise, in order:
///
/// 1. the nearest ancestor of the arguments' common ancestor holding a config file
/// 2. else (without `rootdir_arg`) the nearest one holding `setup.py`
/// 3. else a config file above any individual argument directory
/// 4. else the common ancestor of `cwd` and the arguments, unless that is the
///    file system root, in which case the arguments' common ancestor
///
/// `rootdir_arg` (`--rootdir`, environment variables expanded) always wins
/// and must name an existing directory.
pub fn determine_setup<I, S>(
    inifile: Option<&Path>,
    args: I,
    rootdir_arg: Option<&str>,
    cwd: &Path,
    sink: &dyn WarningSink,
) -> Result<RootDirSetup, SetupError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let dirs = dirs_from_args(args, cwd);
    let mut setup = match inifile {
        Some(inifile) => {
            let inipath = absolute_path(inifile, cwd);
            let inicfg = load_config_dict_from_file(&inipath, sink)?.unwrap_or_default();
            let rootdir = inipath.parent().unwrap_or(cwd).to_path_buf();
            RootDirSetup {
                rootdir,
                inifile: Some(inipath),
                inicfg,
            }
        }
        None => {
            let ancestor = common_ancestor(&dirs, cwd);
            match locate_config(std::slice::from_ref(&ancestor), cwd, sink)? {
                Some(found) => found,
                None if rootdir_arg.is_some() => RootDirSetup {
                    rootdir: ancestor,
                    inifile: None,
                    inicfg: IniConfig::new(),
                },
                None => fallback_setup(&dirs, ancestor, cwd, sink)?,
            }
        }
    };

    if let Some(arg) = rootdir_arg {
        let rootdir = absolute_path(Path::new(&expand_vars(arg, |k| env::var(k).ok())), cwd);
        if !rootdir.is_dir() {
            return Err(SetupError::RootdirNotFound(rootdir));
        }
        setup.rootdir = rootdir;
    }
    Ok(setup)
}

fn fallback_setup(
    dirs: &[PathBuf],
    ancestor: PathBuf,
    cwd: &Path,
    sink: &dyn WarningSink,
) -> Result<RootDirSetup, SetupError> {
    if let Some(base) = ancestor.ancestors().find(|b| b.join(SETUP_PY).is_file()) {
        log::debug!("rootdir {} from {SETUP_PY}", base.display());
        return Ok(RootDirSetup {
            rootdir: base.to_path_buf(),
            inifile: None,
            inicfg: IniConfig::new(),
        });
    }

    if dirs != [ancestor.clone()] {
        if let Some(found) = locate_config(dirs, cwd, sink)? {
            return Ok(found);
        }
    }

    let rootdir = common_ancestor([cwd, ancestor.as_path()], cwd);
    let rootdir = if rootdir.parent().is_none() {
        ancestor
    } else {
        rootdir
    };
    log::debug!("rootdir {} from common ancestor", rootdir.display());
    Ok(RootDirSetup {
        rootdir,
        inifile: None,
        inicfg: IniConfig::new(),
    })
}

/// [`determine_setup`] without an explicit config file or `--rootdir`.
pub fn determine_rootdir<I, S>(
    args: I,
    cwd: &Path,
    sink: &dyn WarningSink,
) -> Result<RootDirSetup, SetupError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    determine_setup(None, args, None, cwd, sink)
}
