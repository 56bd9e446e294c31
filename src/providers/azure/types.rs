use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Envelope returned by every Azure DevOps listing endpoint.
#[derive(Debug, Deserialize)]
pub struct ListEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

/// A team project in the organization.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectReference {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub state: Option<String>,
}

/// Pipeline summary as returned by the pipelines listing.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineReference {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub folder: Option<String>,
}

/// Pipeline as returned by the pipelines get-by-id call.
///
/// The full definition is not part of this response; it is reachable
/// through the `self` entry of `_links`.
#[derive(Debug, Clone, Deserialize)]
pub struct Pipeline {
    pub id: u64,
    pub name: String,
    #[serde(rename = "_links", alias = "links", default)]
    pub links: Option<Links>,
}

impl Pipeline {
    pub fn self_href(&self) -> Option<&str> {
        self.links
            .as_ref()
            .and_then(|links| links.self_link.as_ref())
            .map(|link| link.href.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Links {
    #[serde(rename = "self", default)]
    pub self_link: Option<Link>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    pub href: String,
}

/// Release or build definition summary. Both listings share this shape.
#[derive(Debug, Clone, Deserialize)]
pub struct DefinitionReference {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Variable group with its variables in server order.
#[derive(Debug, Clone, Deserialize)]
pub struct VariableGroup {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub variables: IndexMap<String, serde_json::Value>,
}

/// Body of the typed pipeline creation call.
#[derive(Debug, Clone, Serialize)]
pub struct CreatePipelineParameters {
    pub name: String,
    pub folder: String,
    pub configuration: PipelineConfiguration,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PipelineConfiguration {
    #[serde(rename = "type")]
    pub kind: String,
    pub path: String,
    pub repository: serde_json::Value,
}

/// Identity of a definition or pipeline created by a POST.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedResource {
    pub id: u64,
    pub name: String,
}

/// The resource families the exporter knows how to write to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Release,
    VariableGroup,
    Build,
    Pipeline,
}

impl ResourceKind {
    /// Filename prefix for artifacts of this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Release => "release",
            Self::VariableGroup => "vargroup",
            Self::Build => "build",
            Self::Pipeline => "pipeline",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Release => "Release definitions",
            Self::VariableGroup => "Variable groups",
            Self::Build => "Build definitions",
            Self::Pipeline => "Pipelines",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Where the full definition of a listed resource comes from.
#[derive(Debug, Clone)]
pub enum Locator {
    /// The listing entry carries the definition's own `url`.
    Url(String),
    /// Only a pipeline id is known; the definition sits behind its `self` link.
    Pipeline(u64),
    /// The content is already in hand (variable group variables).
    Variables(IndexMap<String, serde_json::Value>),
}

/// Lightweight reference to one resource produced by a listing call.
#[derive(Debug, Clone)]
pub struct ResourceReference {
    pub kind: ResourceKind,
    pub id: u64,
    pub name: String,
    pub locator: Locator,
}

impl ResourceReference {
    /// Human readable identity used in logs and failure reports.
    pub fn describe(&self) -> String {
        format!("{} '{}' (id {})", self.kind, self.name, self.id)
    }
}

/// Fully resolved definition body of one resource.
#[derive(Debug, Clone)]
pub struct ResourceDefinition {
    pub kind: ResourceKind,
    pub id: u64,
    pub name: String,
    pub body: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_self_href_from_underscore_links() {
        let pipeline: Pipeline = serde_json::from_str(
            r#"{"id": 7, "name": "ci", "_links": {"self": {"href": "http://x/y"}, "web": {"href": "http://w"}}}"#,
        )
        .unwrap();

        assert_eq!(pipeline.self_href(), Some("http://x/y"));
    }

    #[test]
    fn test_pipeline_self_href_from_plain_links() {
        let pipeline: Pipeline =
            serde_json::from_str(r#"{"id": 7, "name": "ci", "links": {"self": {"href": "http://x/y"}}}"#)
                .unwrap();

        assert_eq!(pipeline.self_href(), Some("http://x/y"));
    }

    #[test]
    fn test_pipeline_without_self_link() {
        let pipeline: Pipeline =
            serde_json::from_str(r#"{"id": 7, "name": "ci", "_links": {"web": {"href": "http://w"}}}"#)
                .unwrap();

        assert_eq!(pipeline.self_href(), None);
    }

    #[test]
    fn test_pipeline_with_malformed_self_link_is_rejected() {
        let result: std::result::Result<Pipeline, _> =
            serde_json::from_str(r#"{"id": 7, "name": "ci", "_links": {"self": "http://x/y"}}"#);

        assert!(result.is_err());
    }

    #[test]
    fn test_variable_group_preserves_variable_order() {
        let group: VariableGroup = serde_json::from_str(
            r#"{"id": 1, "name": "shared", "variables": {"zeta": {"value": "1"}, "alpha": {"value": "2"}}}"#,
        )
        .unwrap();

        let keys: Vec<_> = group.variables.keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_resource_kind_prefixes() {
        assert_eq!(ResourceKind::Release.prefix(), "release");
        assert_eq!(ResourceKind::VariableGroup.prefix(), "vargroup");
        assert_eq!(ResourceKind::Build.prefix(), "build");
        assert_eq!(ResourceKind::Pipeline.prefix(), "pipeline");
    }
}
