//! On-disk layout of generated crates.

use std::path::{Path, PathBuf};

use toml::{Table, Value};

/// Version requirement of the runtime used when no local path is given.
const RUNTIME_VERSION: &str = "0.1";

/// Outcome of [`write_file_if_changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    /// The file was created or its content replaced.
    Written,
    /// The file already held the content.
    Unchanged,
}

/// Write `content` to `path` unless the file already holds exactly that.
pub fn write_file_if_changed(path: &Path, content: &str) -> Result<WriteResult, String> {
    if path.exists() {
        let existing = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
        if existing == content {
            return Ok(WriteResult::Unchanged);
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| format!("Failed to create directory: {e}"))?;
    }

    std::fs::write(path, content).map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
    Ok(WriteResult::Written)
}

/// Paths of one API's generated crate under the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrateLayout {
    pub dir: PathBuf,
    pub manifest: PathBuf,
    pub source: PathBuf,
    pub document: PathBuf,
}

impl CrateLayout {
    /// `<gendir>/<package>/<version>/`
    pub fn new(gendir: &Path, package: &str, version: &str) -> Self {
        let dir = gendir.join(package).join(version);
        Self {
            manifest: dir.join("Cargo.toml"),
            source: dir.join("src").join("lib.rs"),
            document: dir.join(format!("{package}-api.json")),
            dir,
        }
    }
}

/// Crate name for a generated client, e.g. `tasks-v1`.
pub fn crate_name(package: &str, version: &str) -> String {
    format!("{package}-{version}")
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// `Cargo.toml` of a generated client crate.
///
/// With `runtime_path` the runtime is referenced by path, otherwise by
/// version. The crate declares an empty workspace so it builds standalone
/// even when the output directory sits inside another workspace.
pub fn crate_manifest(
    package: &str,
    version: &str,
    description: &str,
    runtime_path: Option<&Path>,
) -> Result<String, String> {
    let mut pkg = Table::new();
    pkg.insert("name".into(), Value::String(crate_name(package, version)));
    pkg.insert("version".into(), Value::String("0.1.0".into()));
    pkg.insert("edition".into(), Value::String("2024".into()));
    pkg.insert("description".into(), Value::String(description.into()));
    pkg.insert("publish".into(), Value::Boolean(false));

    let runtime = match runtime_path {
        Some(path) => {
            let mut dep = Table::new();
            dep.insert("path".into(), Value::String(path.display().to_string()));
            Value::Table(dep)
        }
        None => Value::String(RUNTIME_VERSION.into()),
    };
    let mut serde = Table::new();
    serde.insert("version".into(), Value::String("1".into()));
    serde.insert(
        "features".into(),
        Value::Array(vec![Value::String("derive".into())]),
    );

    let mut deps = Table::new();
    deps.insert("discogen-runtime".into(), runtime);
    deps.insert("serde".into(), Value::Table(serde));
    deps.insert("serde_json".into(), Value::String("1".into()));

    let mut manifest = Table::new();
    manifest.insert("package".into(), Value::Table(pkg));
    manifest.insert("dependencies".into(), Value::Table(deps));
    manifest.insert("workspace".into(), Value::Table(Table::new()));

    toml::to_string(&manifest).map_err(|e| format!("Failed to render Cargo.toml: {e}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_write_file_if_changed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b.txt");

        assert_eq!(write_file_if_changed(&path, "one").unwrap(), WriteResult::Written);
        assert_eq!(write_file_if_changed(&path, "one").unwrap(), WriteResult::Unchanged);
        assert_eq!(write_file_if_changed(&path, "two").unwrap(), WriteResult::Written);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "two");
    }

    #[test]
    fn test_layout() {
        let layout = CrateLayout::new(Path::new("/out"), "tasks", "v1");
        assert_eq!(layout.dir, Path::new("/out/tasks/v1"));
        assert_eq!(layout.manifest, Path::new("/out/tasks/v1/Cargo.toml"));
        assert_eq!(layout.source, Path::new("/out/tasks/v1/src/lib.rs"));
        assert_eq!(layout.document, Path::new("/out/tasks/v1/tasks-api.json"));
    }

    #[test]
    fn test_crate_name_sanitizes_version() {
        assert_eq!(crate_name("compute", "v1.1beta"), "compute-v1_1beta");
    }

    #[test]
    fn test_manifest_with_runtime_path() {
        let manifest =
            crate_manifest("tasks", "v1", "Tasks API", Some(Path::new("/src/runtime"))).unwrap();
        let parsed: Table = manifest.parse().unwrap();
        assert_eq!(parsed["package"]["name"].as_str(), Some("tasks-v1"));
        assert_eq!(
            parsed["dependencies"]["discogen-runtime"]["path"].as_str(),
            Some("/src/runtime")
        );
        assert_eq!(parsed["dependencies"]["serde"]["features"][0].as_str(), Some("derive"));
        assert!(parsed["workspace"].as_table().unwrap().is_empty());
    }

    #[test]
    fn test_manifest_with_runtime_version() {
        let manifest = crate_manifest("tasks", "v1", "", None).unwrap();
        let parsed: Table = manifest.parse().unwrap();
        assert_eq!(parsed["dependencies"]["discogen-runtime"].as_str(), Some("0.1"));
    }
}
