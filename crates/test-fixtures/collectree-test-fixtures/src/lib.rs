//! Shared test data under `fixtures/`, addressed through `fixtures/manifest.json`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../../../fixtures/manifest.json"))
        .expect("fixtures/manifest.json should parse")
});

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Manifest {
    node_ids: BTreeMap<String, String>,
    warnings_configs: BTreeMap<String, String>,
    rootdir_layouts: String,
}

fn read(rel: &str) -> Result<String> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../../fixtures")
        .join(rel);
    fs::read_to_string(&path).with_context(|| format!("reading fixture {}", path.display()))
}

fn read_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    serde_json::from_str(&read(rel)?).with_context(|| format!("parsing fixture {rel}"))
}

fn entry<'a>(section: &'a BTreeMap<String, String>, name: &str) -> Result<&'a str> {
    section
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("no fixture named '{name}'"))
}

pub mod node_ids {
    use super::*;

    /// One row of the ancestor-splitting table.
    #[derive(Debug, Clone, Deserialize)]
    pub struct ParentIdCase {
        pub nodeid: String,
        pub expected: Vec<String>,
        #[serde(default)]
        pub note: Option<String>,
    }

    pub fn parent_id_cases() -> Result<Vec<ParentIdCase>> {
        read_json(entry(&MANIFEST.node_ids, "parent-ids")?)
    }

    /// Node ids of a small collected test suite.
    pub fn tree() -> Result<Vec<String>> {
        read_json(entry(&MANIFEST.node_ids, "tree")?)
    }
}

pub mod warnings_configs {
    use super::*;

    /// Names in manifest order (sorted).
    pub fn keys() -> Vec<&'static str> {
        MANIFEST.warnings_configs.keys().map(String::as_str).collect()
    }

    /// Raw JSON of the named config.
    pub fn json(name: &str) -> Result<String> {
        read(entry(&MANIFEST.warnings_configs, name)?)
    }
}

pub mod rootdir_layouts {
    use super::*;

    /// A directory tree, an invocation inside it, and the rootdir it should
    /// resolve to. Paths are relative to the tree; `""` is the tree itself.
    #[derive(Debug, Clone, Deserialize)]
    pub struct Layout {
        pub name: String,
        /// Relative file path to contents.
        pub files: BTreeMap<String, String>,
        pub cwd: String,
        pub args: Vec<String>,
        pub rootdir: String,
        pub inifile: Option<String>,
    }

    impl Layout {
        /// Write the files under `root`, creating directories as needed.
        pub fn materialize(&self, root: &Path) -> Result<()> {
            for (rel, contents) in &self.files {
                let path = root.join(rel);
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("creating {}", parent.display()))?;
                }
                fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
            }
            Ok(())
        }

        pub fn cwd_in(&self, root: &Path) -> PathBuf {
            resolve(root, &self.cwd)
        }

        pub fn expected_rootdir(&self, root: &Path) -> PathBuf {
            resolve(root, &self.rootdir)
        }

        pub fn expected_inifile(&self, root: &Path) -> Option<PathBuf> {
            self.inifile.as_deref().map(|rel| resolve(root, rel))
        }
    }

    fn resolve(root: &Path, rel: &str) -> PathBuf {
        if rel.is_empty() {
            root.to_path_buf()
        } else {
            root.join(rel)
        }
    }

    pub fn all() -> Result<Vec<Layout>> {
        read_json(&MANIFEST.rootdir_layouts)
    }
}
