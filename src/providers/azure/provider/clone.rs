use log::{info, warn};
use serde::Deserialize;
use serde_json::json;

use crate::error::{Result, SnapshotError};
use crate::providers::azure::rewrite::{RewriteRule, Rewriter};
use crate::providers::azure::types::{CreatePipelineParameters, CreatedResource, PipelineConfiguration};

use super::AzureDevOpsProvider;

/// Re-create an existing build definition under a new name.
#[derive(Debug, Clone)]
pub struct CloneRequest {
    pub definition_id: u64,
    pub target_project: String,
    pub name: String,
    pub folder: String,
    /// Applied after the source name -> `name` substitution, in order.
    pub rules: Vec<RewriteRule>,
}

#[derive(Debug)]
pub enum CloneOutcome {
    /// The rewritten definition was accepted by the build definitions endpoint.
    BuildDefinition(CreatedResource),
    /// The build definitions endpoint refused it; the pipelines API created one instead.
    Pipeline(CreatedResource),
}

impl CloneOutcome {
    pub fn created(&self) -> &CreatedResource {
        match self {
            Self::BuildDefinition(created) | Self::Pipeline(created) => created,
        }
    }
}

/// The handful of fields the clone path reads from a raw build definition.
#[derive(Debug, Deserialize)]
struct SourceDefinition {
    name: String,
    #[serde(default)]
    process: Option<SourceProcess>,
    #[serde(default)]
    repository: Option<SourceRepository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SourceProcess {
    #[serde(default)]
    yaml_filename: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SourceRepository {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

impl SourceDefinition {
    /// YAML configuration for the pipelines API, if the source is a YAML pipeline.
    fn pipeline_configuration(&self) -> Option<PipelineConfiguration> {
        let path = self.process.as_ref()?.yaml_filename.clone()?;
        let repository = self.repository.as_ref()?;
        let id = repository.id.clone()?;

        Some(PipelineConfiguration {
            kind: "yaml".to_string(),
            path,
            repository: json!({
                "id": id,
                "name": repository.name,
                "type": pipelines_repository_type(repository.kind.as_deref()),
            }),
        })
    }
}

/// Build definitions and the pipelines API name repository types differently.
fn pipelines_repository_type(kind: Option<&str>) -> String {
    match kind {
        Some("TfsGit") | None => "azureReposGit".to_string(),
        Some("GitHub") => "gitHub".to_string(),
        Some("Bitbucket") => "bitbucket".to_string(),
        Some(other) => other.to_string(),
    }
}

impl AzureDevOpsProvider {
    /// Fetches a build definition, rewrites it and creates a copy.
    ///
    /// The rewritten document is POSTed to the build definitions endpoint
    /// first. Only if that fails is the typed pipelines API tried, with a YAML
    /// configuration taken from the source definition.
    ///
    /// # Errors
    ///
    /// Fails if the source cannot be fetched or parsed, a rewrite pattern is
    /// invalid, or both creation attempts fail.
    pub async fn clone_pipeline(&self, request: &CloneRequest) -> Result<CloneOutcome> {
        let raw = self
            .client
            .get_build_definition_raw(&self.project, request.definition_id)
            .await?;

        let text = String::from_utf8(raw).map_err(|e| {
            SnapshotError::resolution(
                format!("build definition {}", request.definition_id),
                format!("body is not UTF-8: {e}"),
            )
        })?;

        let source: SourceDefinition = serde_json::from_str(&text).map_err(|e| {
            SnapshotError::resolution(
                format!("build definition {}", request.definition_id),
                format!("unexpected definition shape: {e}"),
            )
        })?;

        info!(
            "Cloning '{}' from '{}' into '{}' as '{}'",
            source.name, self.project, request.target_project, request.name
        );

        let mut rules = vec![RewriteRule::literal(source.name.as_str(), request.name.as_str())];
        rules.extend(request.rules.iter().cloned());
        let rewritten = Rewriter::new(&rules)?.apply(&text);

        let rest_error = match self
            .client
            .create_build_definition(&request.target_project, rewritten.as_bytes())
            .await
        {
            Ok(created) => {
                info!("Created build definition {} ('{}')", created.id, created.name);
                return Ok(CloneOutcome::BuildDefinition(created));
            }
            Err(e) => e,
        };

        warn!("Build definition creation failed ({rest_error}), trying the pipelines API");

        let Some(configuration) = source.pipeline_configuration() else {
            return Err(SnapshotError::CloneFailed {
                rest: rest_error.to_string(),
                pipelines: "source definition has no YAML file or repository id".to_string(),
            });
        };

        let parameters = CreatePipelineParameters {
            name: request.name.clone(),
            folder: request.folder.clone(),
            configuration,
        };

        match self
            .client
            .create_pipeline(&request.target_project, &parameters)
            .await
        {
            Ok(created) => {
                info!("Created pipeline {} ('{}')", created.id, created.name);
                Ok(CloneOutcome::Pipeline(created))
            }
            Err(e) => Err(SnapshotError::CloneFailed {
                rest: rest_error.to_string(),
                pipelines: e.to_string(),
            }),
        }
    }
}
