use log::debug;

use super::core::AzureClient;
use super::endpoints::{api_url, BUILD_DEFINITION_API_VERSION, PIPELINES_API_VERSION};
use crate::error::{Result, SnapshotError};
use crate::providers::azure::types::{CreatePipelineParameters, CreatedResource, Pipeline};

impl AzureClient {
    /// Typed get-by-id for a pipeline. The response carries links, not the definition.
    pub async fn get_pipeline(&self, project: &str, pipeline_id: u64) -> Result<Pipeline> {
        let id = pipeline_id.to_string();
        let url = api_url(
            &self.org_url,
            Some(project),
            &["pipelines", id.as_str()],
            PIPELINES_API_VERSION,
        )?;

        let response = self.get(&url).await?;

        serde_json::from_slice(&response.body).map_err(|e| {
            SnapshotError::resolution(
                format!("pipeline {pipeline_id}"),
                format!("unexpected pipeline response shape: {e}"),
            )
        })
    }

    /// Raw build definition document, exactly as the service returns it.
    pub async fn get_build_definition_raw(&self, project: &str, definition_id: u64) -> Result<Vec<u8>> {
        let id = definition_id.to_string();
        let url = api_url(
            &self.org_url,
            Some(project),
            &["build", "definitions", id.as_str()],
            BUILD_DEFINITION_API_VERSION,
        )?;

        Ok(self.get(&url).await?.body)
    }

    /// Creates a build definition from a raw JSON document.
    pub async fn create_build_definition(&self, project: &str, body: &[u8]) -> Result<CreatedResource> {
        let url = api_url(
            &self.org_url,
            Some(project),
            &["build", "definitions"],
            BUILD_DEFINITION_API_VERSION,
        )?;

        let response = self.post(&url, body).await?;
        debug!("Build definition created (status {})", response.status);

        Ok(serde_json::from_slice(&response.body)?)
    }

    /// Typed pipeline creation through the pipelines API.
    pub async fn create_pipeline(
        &self,
        project: &str,
        parameters: &CreatePipelineParameters,
    ) -> Result<CreatedResource> {
        let url = api_url(
            &self.org_url,
            Some(project),
            &["pipelines"],
            PIPELINES_API_VERSION,
        )?;

        let body = serde_json::to_vec(parameters)?;
        let response = self.post(&url, &body).await?;

        Ok(serde_json::from_slice(&response.body)?)
    }
}
