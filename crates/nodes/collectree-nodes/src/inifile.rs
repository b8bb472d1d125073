//! Reading the `[pytest]` options out of the files that can mark a rootdir.
//!
//! Each candidate file name has a loader. A loader returns `Ok(None)` when the
//! file exists but carries no pytest section, in which case the search moves
//! on to the next candidate.

use std::fs;
use std::path::{Path, PathBuf};

use collectree_warnings::deprecated::SETUP_CFG_CONFIG;
use collectree_warnings::{WarningRecord, WarningSink};
use hashbrown::HashMap;

use crate::error::SetupError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IniValue {
    Str(String),
    List(Vec<String>),
}

impl IniValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            IniValue::Str(s) => Some(s),
            IniValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            IniValue::List(items) => Some(items),
            IniValue::Str(_) => None,
        }
    }
}

/// Options of the pytest section of a config file.
pub type IniConfig = HashMap<String, IniValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLoader {
    /// `pytest.ini`: always the config source, even without a `[pytest]` section.
    PytestIni,
    /// Generic `.ini` (`tox.ini`): needs a `[pytest]` section.
    Ini,
    /// `.cfg` (`setup.cfg`): needs a `[tool:pytest]` section.
    Cfg,
    /// `pyproject.toml`: needs a `[tool.pytest.ini_options]` table.
    Pyproject,
}

/// Candidate file names, in the order they are tried in each directory.
pub const CONFIG_LOADERS: [(&str, ConfigLoader); 5] = [
    ("pytest.ini", ConfigLoader::PytestIni),
    (".pytest.ini", ConfigLoader::PytestIni),
    ("pyproject.toml", ConfigLoader::Pyproject),
    ("tox.ini", ConfigLoader::Ini),
    ("setup.cfg", ConfigLoader::Cfg),
];

const CONFIG_SUFFIXES: [(&str, ConfigLoader); 3] = [
    ("ini", ConfigLoader::Ini),
    ("cfg", ConfigLoader::Cfg),
    ("toml", ConfigLoader::Pyproject),
];

impl ConfigLoader {
    /// Loader for an explicitly named file: by file name, then by extension.
    pub fn for_path(path: &Path) -> Option<Self> {
        let name = path.file_name().and_then(|n| n.to_str());
        if let Some(loader) = name.and_then(|n| {
            CONFIG_LOADERS
                .iter()
                .find(|(candidate, _)| *candidate == n)
                .map(|(_, loader)| *loader)
        }) {
            return Some(loader);
        }
        let ext = path.extension().and_then(|e| e.to_str())?;
        CONFIG_SUFFIXES
            .iter()
            .find(|(suffix, _)| *suffix == ext)
            .map(|(_, loader)| *loader)
    }

    pub fn load(self, path: &Path, sink: &dyn WarningSink) -> Result<Option<IniConfig>, SetupError> {
        let text = fs::read_to_string(path).map_err(|source| SetupError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match self {
            ConfigLoader::PytestIni => {
                let ini = IniFile::parse(path, &text)?;
                Ok(Some(ini.section_config("pytest").unwrap_or_default()))
            }
            ConfigLoader::Ini => Ok(IniFile::parse(path, &text)?.section_config("pytest")),
            ConfigLoader::Cfg => {
                let ini = IniFile::parse(path, &text)?;
                if let Some(cfg) = ini.section_config("tool:pytest") {
                    if path.file_name().is_some_and(|n| n == "setup.cfg") {
                        sink.emit(WarningRecord::at(
                            SETUP_CFG_CONFIG.clone(),
                            path.display().to_string(),
                        ))?;
                    }
                    Ok(Some(cfg))
                } else if ini.section("pytest").is_some() {
                    Err(SetupError::PytestSectionInCfg {
                        filename: "setup.cfg".to_string(),
                    })
                } else {
                    Ok(None)
                }
            }
            ConfigLoader::Pyproject => load_pyproject(path, &text),
        }
    }
}

/// Load pytest options from `path` if its name or extension has a loader.
pub fn load_config_dict_from_file(
    path: &Path,
    sink: &dyn WarningSink,
) -> Result<Option<IniConfig>, SetupError> {
    match ConfigLoader::for_path(path) {
        Some(loader) => loader.load(path, sink),
        None => Ok(None),
    }
}

fn load_pyproject(path: &Path, text: &str) -> Result<Option<IniConfig>, SetupError> {
    let doc = text.parse::<toml::Table>().map_err(|source| SetupError::Toml {
        path: path.to_path_buf(),
        source,
    })?;
    let options = doc
        .get("tool")
        .and_then(toml::Value::as_table)
        .and_then(|tool| tool.get("pytest"))
        .and_then(toml::Value::as_table)
        .and_then(|pytest| pytest.get("ini_options"))
        .and_then(toml::Value::as_table);
    Ok(options.map(|table| {
        table
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    toml::Value::Array(items) => {
                        IniValue::List(items.iter().map(toml_scalar).collect())
                    }
                    other => IniValue::Str(toml_scalar(other)),
                };
                (key.clone(), value)
            })
            .collect()
    }))
}

/// String form of a TOML value as the ini option layer expects it.
fn toml_scalar(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Boolean(true) => "True".to_string(),
        toml::Value::Boolean(false) => "False".to_string(),
        toml::Value::Float(f) if f.is_finite() && f.fract() == 0.0 => format!("{f:.1}"),
        other => other.to_string(),
    }
}

/// Sections of an ini file, in file order.
///
/// Comment lines start with `#` or `;`. Entries are `name = value` or
/// `name: value`; indented lines continue the previous value.
#[derive(Debug, Clone, Default)]
pub struct IniFile {
    sections: Vec<(String, Vec<(String, String)>)>,
}

impl IniFile {
    pub fn parse(path: &Path, text: &str) -> Result<Self, SetupError> {
        let err = |line: usize, message: &str| SetupError::Ini {
            path: PathBuf::from(path),
            line,
            message: message.to_string(),
        };
        let mut sections: Vec<(String, Vec<(String, String)>)> = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let lineno = idx + 1;
            let line = raw.trim_end();
            let stripped = line.trim_start();
            if stripped.is_empty() || stripped.starts_with('#') || stripped.starts_with(';') {
                continue;
            }

            if line.starts_with(char::is_whitespace) {
                let entry = sections
                    .last_mut()
                    .and_then(|(_, entries)| entries.last_mut())
                    .ok_or_else(|| err(lineno, "unexpected value continuation"))?;
                if !entry.1.is_empty() {
                    entry.1.push('\n');
                }
                entry.1.push_str(stripped);
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                let header = rest
                    .split(|c| c == '#' || c == ';')
                    .next()
                    .unwrap_or("")
                    .trim_end();
                let name = header
                    .strip_suffix(']')
                    .ok_or_else(|| err(lineno, "unterminated section header"))?;
                if sections.iter().any(|(existing, _)| existing == name) {
                    return Err(err(lineno, &format!("duplicate section {name:?}")));
                }
                sections.push((name.to_string(), Vec::new()));
                continue;
            }

            let (name, value) = split_entry(line).ok_or_else(|| err(lineno, "unexpected line"))?;
            let (_, entries) = sections
                .last_mut()
                .ok_or_else(|| err(lineno, "no section header defined"))?;
            if entries.iter().any(|(existing, _)| existing == name) {
                return Err(err(lineno, &format!("duplicate name {name:?}")));
            }
            entries.push((name.to_string(), value.to_string()));
        }
        Ok(Self { sections })
    }

    pub fn section(&self, name: &str) -> Option<&[(String, String)]> {
        self.sections
            .iter()
            .find(|(section, _)| section == name)
            .map(|(_, entries)| entries.as_slice())
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|(name, _)| name.as_str())
    }

    fn section_config(&self, name: &str) -> Option<IniConfig> {
        self.section(name).map(|entries| {
            entries
                .iter()
                .map(|(k, v)| (k.clone(), IniValue::Str(v.clone())))
                .collect()
        })
    }
}

/// `name = value` wins unless the name part would contain a `:`.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let by = |sep: char| line.split_once(sep).map(|(n, v)| (n.trim(), v.trim()));
    match by('=') {
        Some((name, value)) if !name.contains(':') => Some((name, value)),
        _ => by(':'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collectree_warnings::{WarningCategory, WarningRecorder};
    use std::fs;

    fn parse(text: &str) -> Result<IniFile, SetupError> {
        IniFile::parse(Path::new("t.ini"), text)
    }

    #[test]
    fn ini_parses_sections_entries_and_continuations() {
        let ini = parse(
            "# leading comment\n\
             [pytest]\n\
             addopts = -ra\n\
             testpaths:\n    tests\n    docs\n\
             ; another comment\n\
             url = http://x:1\n\
             [other] # trailing\n\
             k=v\n",
        )
        .unwrap();
        assert_eq!(ini.section_names().collect::<Vec<_>>(), ["pytest", "other"]);
        let pytest = ini.section("pytest").unwrap();
        assert_eq!(pytest[0], ("addopts".into(), "-ra".into()));
        assert_eq!(pytest[1], ("testpaths".into(), "tests\ndocs".into()));
        assert_eq!(pytest[2], ("url".into(), "http://x:1".into()));
        assert_eq!(ini.section("other").unwrap()[0], ("k".into(), "v".into()));
    }

    #[test]
    fn ini_rejects_malformed_input() {
        for (text, line) in [
            ("a = 1\n", 1),
            ("[s]\nnovalue\n", 2),
            ("[s]\n[s]\n", 2),
            ("[s]\na=1\na=2\n", 3),
            ("  continued\n", 1),
            ("[open\n", 1),
        ] {
            match parse(text) {
                Err(SetupError::Ini { line: got, .. }) => assert_eq!(got, line, "{text:?}"),
                other => panic!("{text:?}: expected ini error, got {other:?}"),
            }
        }
    }

    #[test]
    fn loader_is_picked_by_name_then_extension() {
        assert_eq!(ConfigLoader::for_path(Path::new("/x/pytest.ini")), Some(ConfigLoader::PytestIni));
        assert_eq!(ConfigLoader::for_path(Path::new("/x/tox.ini")), Some(ConfigLoader::Ini));
        assert_eq!(ConfigLoader::for_path(Path::new("/x/custom.ini")), Some(ConfigLoader::Ini));
        assert_eq!(ConfigLoader::for_path(Path::new("/x/setup.cfg")), Some(ConfigLoader::Cfg));
        assert_eq!(ConfigLoader::for_path(Path::new("/x/my.toml")), Some(ConfigLoader::Pyproject));
        assert_eq!(ConfigLoader::for_path(Path::new("/x/conf.json")), None);
    }

    #[test]
    fn pytest_ini_without_section_is_empty_config() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("pytest.ini");
        fs::write(&path, "[other]\nx = 1\n").unwrap();
        let rec = WarningRecorder::new();
        assert_eq!(ConfigLoader::PytestIni.load(&path, &rec).unwrap(), Some(IniConfig::new()));
        assert_eq!(ConfigLoader::Ini.load(&path, &rec).unwrap(), None);
    }

    #[test]
    fn setup_cfg_tool_section_warns() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("setup.cfg");
        fs::write(&path, "[metadata]\nname = x\n[tool:pytest]\nminversion = 6.0\n").unwrap();
        let rec = WarningRecorder::new();
        let cfg = ConfigLoader::Cfg.load(&path, &rec).unwrap().unwrap();
        assert_eq!(cfg["minversion"].as_str(), Some("6.0"));
        let warned = rec.pop(WarningCategory::PytestDeprecationWarning).unwrap();
        assert_eq!(warned.warning, SETUP_CFG_CONFIG);
        assert_eq!(warned.location, Some(path.display().to_string()));
    }

    #[test]
    fn other_cfg_files_do_not_warn() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("custom.cfg");
        fs::write(&path, "[tool:pytest]\nx = 1\n").unwrap();
        let rec = WarningRecorder::new();
        assert!(load_config_dict_from_file(&path, &rec).unwrap().is_some());
        assert!(rec.is_empty());
    }

    #[test]
    fn plain_pytest_section_in_setup_cfg_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("setup.cfg");
        fs::write(&path, "[pytest]\nx = 1\n").unwrap();
        let err = ConfigLoader::Cfg.load(&path, &WarningRecorder::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "[pytest] section in setup.cfg files is no longer supported, change to [tool:pytest] instead."
        );
    }

    #[test]
    fn pyproject_values_become_strings_or_lists() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("pyproject.toml");
        fs::write(
            &path,
            "[project]\nname = \"x\"\n\n\
             [tool.pytest.ini_options]\n\
             minversion = \"6.0\"\n\
             xfail_strict = true\n\
             timeout = 30\n\
             ratio = 2.0\n\
             testpaths = [\"tests\", \"integration\"]\n",
        )
        .unwrap();
        let cfg = ConfigLoader::Pyproject
            .load(&path, &WarningRecorder::new())
            .unwrap()
            .unwrap();
        assert_eq!(cfg["minversion"].as_str(), Some("6.0"));
        assert_eq!(cfg["xfail_strict"].as_str(), Some("True"));
        assert_eq!(cfg["timeout"].as_str(), Some("30"));
        assert_eq!(cfg["ratio"].as_str(), Some("2.0"));
        assert_eq!(
            cfg["testpaths"].as_list(),
            Some(&["tests".to_string(), "integration".to_string()][..])
        );
    }

    #[test]
    fn pyproject_without_pytest_table_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("pyproject.toml");
        fs::write(&path, "[tool.black]\nline-length = 88\n").unwrap();
        assert_eq!(
            ConfigLoader::Pyproject.load(&path, &WarningRecorder::new()).unwrap(),
            None
        );
        fs::write(&path, "[tool.pytest\n").unwrap();
        assert!(matches!(
            ConfigLoader::Pyproject.load(&path, &WarningRecorder::new()),
            Err(SetupError::Toml { .. })
        ));
    }
}
