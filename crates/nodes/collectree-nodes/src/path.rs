//! Node ids for file system collectors.

use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

use crate::node::Session;
use crate::node_id::{NodeId, PATH_SEP};

fn join_components(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join(PATH_SEP)
}

/// Path of `path` relative to the first initial path containing it.
///
/// Returns `Some("")` when `path` is itself an initial path and `None` when
/// no initial path contains it. Works for directories as well as files.
pub fn initial_path_relpath<'a, I>(initial_paths: I, path: &Path) -> Option<String>
where
    I: IntoIterator<Item = &'a Path>,
{
    initial_paths
        .into_iter()
        .find_map(|initial| path.strip_prefix(initial).ok())
        .map(join_components)
}

/// Node id of a file system node: relative to the rootdir when possible,
/// otherwise relative to an initial path, otherwise the path itself.
pub fn nodeid_for_path(session: &Session, path: &Path) -> NodeId {
    if let Ok(rel) = path.strip_prefix(session.rootdir()) {
        return NodeId::new(join_components(rel));
    }
    let initial = session.initial_paths().iter().map(PathBuf::as_path);
    if let Some(rel) = initial_path_relpath(initial, path) {
        return NodeId::new(rel);
    }
    log::debug!(
        "{} is outside rootdir {} and all initial paths",
        path.display(),
        session.rootdir().display()
    );
    NodeId::new(path.to_string_lossy().replace(MAIN_SEPARATOR, PATH_SEP))
}

/// Resolve `.` and `..` without touching the file system.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out
}

/// `path` made absolute against `cwd` and normalized.
pub fn absolute_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_lexically(path)
    } else {
        normalize_lexically(&cwd.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn relpath_handles_directories_and_outsiders() {
        let cwd = Path::new("/work/project");
        let initial = [cwd];

        assert_eq!(initial_path_relpath(initial, cwd), Some(String::new()));
        assert_eq!(
            initial_path_relpath(initial, &cwd.join("file")),
            Some("file".to_string())
        );
        assert_eq!(
            initial_path_relpath(initial, &cwd.join("pkg").join("test_x.py")),
            Some("pkg/test_x.py".to_string())
        );
        assert_eq!(initial_path_relpath(initial, Path::new("/outside")), None);
    }

    #[test]
    fn relpath_uses_first_matching_initial_path() {
        let a = Path::new("/a");
        let ab = Path::new("/a/b");
        let target = Path::new("/a/b/c.py");
        assert_eq!(initial_path_relpath([ab, a], target), Some("c.py".into()));
        assert_eq!(initial_path_relpath([a, ab], target), Some("b/c.py".into()));
    }

    #[test]
    fn nodeid_prefers_rootdir_then_initial_paths() {
        let session = Arc::new(Session::new("/repo", vec![PathBuf::from("/elsewhere/suite")]));
        assert_eq!(
            nodeid_for_path(&session, Path::new("/repo/tests/test_a.py")),
            "tests/test_a.py"
        );
        assert_eq!(nodeid_for_path(&session, Path::new("/repo")), "");
        assert_eq!(
            nodeid_for_path(&session, Path::new("/elsewhere/suite/test_b.py")),
            "test_b.py"
        );
        assert_eq!(
            nodeid_for_path(&session, Path::new("/tmp/test_c.py")),
            "/tmp/test_c.py"
        );
    }

    #[test]
    fn normalize_drops_dots() {
        assert_eq!(
            normalize_lexically(Path::new("/a/./b/../c")),
            PathBuf::from("/a/c")
        );
        assert_eq!(
            absolute_path(Path::new("../x"), Path::new("/a/b")),
            PathBuf::from("/a/x")
        );
        assert_eq!(normalize_lexically(Path::new("/../x")), PathBuf::from("/x"));
        assert_eq!(normalize_lexically(Path::new("../x")), PathBuf::from("../x"));
    }
}
