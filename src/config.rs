use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::auth::AuthScheme;
use crate::providers::RewriteRule;

const FILE_STEM: &str = "devops-snapshot";

/// Configuration file structure for devops-snapshot.
///
/// Lets an operator keep the organization, project and export settings in a
/// file instead of repeating flags. Command line flags and environment
/// variables win over anything set here.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Connection to the Azure DevOps organization
    #[serde(default)]
    pub azure: AzureConfig,

    /// What gets exported and how files are written
    #[serde(default)]
    pub export: ExportConfig,

    /// Substitutions used by `clone-pipeline`
    #[serde(default)]
    pub rewrite: RewriteConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AzureConfig {
    /// Organization URL (e.g., <https://dev.azure.com/contoso>)
    pub org_url: Option<String>,

    /// Personal access token
    pub token: Option<String>,

    /// Project to export
    pub project: Option<String>,

    /// Release management URL, derived from the organization URL when unset
    pub release_url: Option<String>,

    /// How the token is sent
    #[serde(default)]
    pub auth_scheme: AuthScheme,

    /// Retries for idempotent requests on network errors, 429 and 5xx
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay between retries, in seconds
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Maximum number of requests in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExportConfig {
    /// Directory the artifacts are written to
    pub output_dir: Option<PathBuf>,

    #[serde(default = "default_true")]
    pub releases: bool,

    #[serde(default = "default_true")]
    pub variable_groups: bool,

    #[serde(default = "default_true")]
    pub builds: bool,

    /// Also export pipelines through their `self` links
    #[serde(default)]
    pub pipelines: bool,

    /// Append resource ids to filenames
    #[serde(default)]
    pub disambiguate_ids: bool,

    /// Re-indent exported JSON
    #[serde(default)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RewriteConfig {
    /// Name given to cloned pipelines
    #[serde(default = "default_placeholder_name")]
    pub placeholder_name: String,

    /// Folder used when the pipelines API creates the clone
    #[serde(default = "default_folder")]
    pub folder: String,

    /// Applied in order after the name substitution
    #[serde(default)]
    pub rules: Vec<RewriteRule>,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            org_url: None,
            token: None,
            project: None,
            release_url: None,
            auth_scheme: AuthScheme::default(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
            concurrency: default_concurrency(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            releases: true,
            variable_groups: true,
            builds: true,
            pipelines: false,
            disambiguate_ids: false,
            pretty: false,
        }
    }
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            placeholder_name: default_placeholder_name(),
            folder: default_folder(),
            rules: Vec::new(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_secs() -> u64 {
    2
}

fn default_concurrency() -> usize {
    4
}

fn default_true() -> bool {
    true
}

fn default_placeholder_name() -> String {
    "imported pipeline".to_string()
}

fn default_folder() -> String {
    "\\".to_string()
}

impl Config {
    /// Reads `path` if given, otherwise the first of
    /// `./devops-snapshot.{toml,json,yaml,yml}` and
    /// `<config dir>/devops-snapshot/config.toml` that exists.
    /// Falls back to defaults when nothing is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let discovered = ["toml", "json", "yaml", "yml"]
            .into_iter()
            .map(|ext| PathBuf::from(format!("{FILE_STEM}.{ext}")))
            .chain(user_config_path())
            .find(|candidate| candidate.exists());

        match discovered {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let parsed = match Format::from_path(path) {
            Some(format) => format.parse(&contents),
            None => Format::ALL
                .into_iter()
                .find_map(|format| format.parse(&contents).ok())
                .ok_or_else(|| anyhow!("not valid TOML, JSON or YAML")),
        };

        parsed.with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Toml,
    Json,
    Yaml,
}

impl Format {
    /// Order tried for files without a recognised extension.
    const ALL: [Self; 3] = [Self::Toml, Self::Json, Self::Yaml];

    fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    fn parse(self, contents: &str) -> Result<Config> {
        let config = match self {
            Self::Toml => toml::from_str(contents)?,
            Self::Json => serde_json::from_str(contents)?,
            Self::Yaml => serde_yaml::from_str(contents)?,
        };
        Ok(config)
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(FILE_STEM).join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.azure.max_retries, 3);
        assert_eq!(config.azure.concurrency, 4);
        assert_eq!(config.azure.auth_scheme, AuthScheme::Basic);
        assert!(config.export.releases);
        assert!(config.export.variable_groups);
        assert!(config.export.builds);
        assert!(!config.export.pipelines);
        assert_eq!(config.rewrite.placeholder_name, "imported pipeline");
    }

    #[test]
    fn test_load_toml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        let toml_content = r#"
[azure]
org-url = "https://dev.azure.com/contoso"
token = "pat-from-file"
project = "shop"
auth-scheme = "bearer"
concurrency = 1

[export]
output-dir = "/tmp/backup"
variable-groups = false
pipelines = true

[rewrite]
placeholder-name = "newpipeline"

[[rewrite.rules]]
from = "https://contoso.visualstudio.com/_apis/projects/7f6695b5"

[[rewrite.rules]]
from = "[0-9a-f]{8}-"
to = "x-"
pattern = true
"#;
        write!(temp_file, "{}", toml_content).unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.azure.org_url.as_deref(), Some("https://dev.azure.com/contoso"));
        assert_eq!(config.azure.project.as_deref(), Some("shop"));
        assert_eq!(config.azure.auth_scheme, AuthScheme::Bearer);
        assert_eq!(config.azure.concurrency, 1);
        assert_eq!(config.azure.max_retries, 3);
        assert_eq!(config.export.output_dir, Some(PathBuf::from("/tmp/backup")));
        assert!(!config.export.variable_groups);
        assert!(config.export.pipelines);
        assert_eq!(config.rewrite.placeholder_name, "newpipeline");
        assert_eq!(config.rewrite.rules.len(), 2);
        assert_eq!(config.rewrite.rules[0].to, "");
        assert!(config.rewrite.rules[1].pattern);
    }

    #[test]
    fn test_load_json_config() {
        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        let json_content = r#"{
  "azure": {
    "org-url": "https://contoso.visualstudio.com",
    "project": "shop"
  },
  "export": {
    "disambiguate-ids": true
  }
}"#;
        write!(temp_file, "{}", json_content).unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.azure.org_url.as_deref(), Some("https://contoso.visualstudio.com"));
        assert!(config.export.disambiguate_ids);
        assert!(config.export.builds);
    }

    #[test]
    fn test_load_yaml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".yaml").unwrap();
        write!(temp_file, "export:\n  pretty: true\n").unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert!(config.export.pretty);
    }

    #[test]
    fn test_unknown_extension_tries_each_format() {
        let mut temp_file = NamedTempFile::with_suffix(".conf").unwrap();
        write!(temp_file, r#"{{"azure": {{"project": "shop"}}}}"#).unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.azure.project.as_deref(), Some("shop"));
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let result = Config::load(Some(Path::new("does-not-exist.toml")));
        assert!(result.is_err());
    }
}
