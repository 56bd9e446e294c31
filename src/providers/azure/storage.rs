use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::Result;

use super::types::ResourceDefinition;

/// How resolved definitions are turned into files.
#[derive(Debug, Clone)]
pub struct StorageOptions {
    pub output_dir: PathBuf,
    /// Append the resource id to every filename so same-named resources don't collide.
    pub disambiguate_ids: bool,
    /// Re-indent JSON bodies instead of writing them byte-for-byte.
    pub pretty: bool,
}

/// A named byte payload destined for one directory.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub directory: PathBuf,
    pub filename: String,
    pub content: Vec<u8>,
}

impl ExportArtifact {
    pub fn from_definition(definition: &ResourceDefinition, options: &StorageOptions) -> Result<Self> {
        let filename = artifact_filename(definition, options.disambiguate_ids);

        let content = if options.pretty {
            let value: serde_json::Value = serde_json::from_slice(&definition.body)?;
            serde_json::to_vec_pretty(&value)?
        } else {
            definition.body.clone()
        };

        Ok(Self {
            directory: options.output_dir.clone(),
            filename,
            content,
        })
    }

    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }

    /// Writes the artifact, creating the directory if needed. Existing files are overwritten.
    pub fn write(&self) -> Result<PathBuf> {
        ensure_directory(&self.directory)?;

        let path = self.path();
        fs::write(&path, &self.content)?;
        debug!("Wrote {} bytes to {}", self.content.len(), path.display());

        Ok(path)
    }
}

/// `<kind>-<name>.json`, or `<kind>-<name>-<id>.json` when disambiguating.
///
/// Path separators in the name are replaced with `_`; everything else is kept.
pub fn artifact_filename(definition: &ResourceDefinition, disambiguate_ids: bool) -> String {
    let name = sanitize_name(&definition.name);
    let prefix = definition.kind.prefix();

    if disambiguate_ids {
        format!("{prefix}-{name}-{}.json", definition.id)
    } else {
        format!("{prefix}-{name}.json")
    }
}

fn sanitize_name(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

fn ensure_directory(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        debug!("Created output directory {}", dir.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::azure::types::ResourceKind;
    use tempfile::TempDir;

    fn definition(kind: ResourceKind, id: u64, name: &str, body: &str) -> ResourceDefinition {
        ResourceDefinition {
            kind,
            id,
            name: name.to_string(),
            body: body.as_bytes().to_vec(),
        }
    }

    fn options(dir: &Path) -> StorageOptions {
        StorageOptions {
            output_dir: dir.to_path_buf(),
            disambiguate_ids: false,
            pretty: false,
        }
    }

    #[test]
    fn test_filename_keeps_spaces() {
        let def = definition(ResourceKind::Release, 1, "Prod Release", "{}");
        assert_eq!(artifact_filename(&def, false), "release-Prod Release.json");
    }

    #[test]
    fn test_filename_with_id() {
        let def = definition(ResourceKind::Build, 42, "ci", "{}");
        assert_eq!(artifact_filename(&def, true), "build-ci-42.json");
    }

    #[test]
    fn test_filename_replaces_path_separators() {
        let def = definition(ResourceKind::VariableGroup, 1, "team/prod\\eu", "{}");
        assert_eq!(artifact_filename(&def, false), "vargroup-team_prod_eu.json");
    }

    #[test]
    fn test_write_creates_directory_and_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("nested").join("backup");
        let opts = options(&out);

        let first = definition(ResourceKind::Release, 1, "Prod Release", r#"{"v":1}"#);
        let path = ExportArtifact::from_definition(&first, &opts)
            .unwrap()
            .write()
            .unwrap();
        assert_eq!(path, out.join("release-Prod Release.json"));

        let second = definition(ResourceKind::Release, 2, "Prod Release", r#"{"v":2}"#);
        ExportArtifact::from_definition(&second, &opts)
            .unwrap()
            .write()
            .unwrap();

        assert_eq!(fs::read_dir(&out).unwrap().count(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"v":2}"#);
    }

    #[test]
    fn test_body_is_written_verbatim_by_default() {
        let temp_dir = TempDir::new().unwrap();
        let body = r#"{ "keep" :  "spacing" }"#;
        let def = definition(ResourceKind::Build, 1, "ci", body);

        let path = ExportArtifact::from_definition(&def, &options(temp_dir.path()))
            .unwrap()
            .write()
            .unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), body);
    }

    #[test]
    fn test_pretty_reformats_json() {
        let def = definition(ResourceKind::Build, 1, "ci", r#"{"a":1}"#);
        let mut opts = options(Path::new("out"));
        opts.pretty = true;

        let artifact = ExportArtifact::from_definition(&def, &opts).unwrap();

        assert_eq!(String::from_utf8(artifact.content).unwrap(), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_pretty_keeps_key_order() {
        let def = definition(
            ResourceKind::Release,
            1,
            "prod",
            r#"{"zeta":1,"alpha":{"y":2,"b":3}}"#,
        );
        let mut opts = options(Path::new("out"));
        opts.pretty = true;

        let artifact = ExportArtifact::from_definition(&def, &opts).unwrap();

        assert_eq!(
            String::from_utf8(artifact.content).unwrap(),
            "{\n  \"zeta\": 1,\n  \"alpha\": {\n    \"y\": 2,\n    \"b\": 3\n  }\n}"
        );
    }

    #[test]
    fn test_pretty_rejects_non_json_body() {
        let def = definition(ResourceKind::Build, 1, "ci", "<html>");
        let mut opts = options(Path::new("out"));
        opts.pretty = true;

        assert!(ExportArtifact::from_definition(&def, &opts).is_err());
    }
}
