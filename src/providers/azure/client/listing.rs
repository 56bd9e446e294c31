use serde::de::DeserializeOwned;
use url::Url;

use super::core::AzureClient;
use super::endpoints::{
    api_url, BUILD_LIST_API_VERSION, PIPELINES_API_VERSION, PROJECTS_API_VERSION,
    RELEASE_API_VERSION, VARIABLE_GROUPS_API_VERSION,
};
use crate::error::Result;
use crate::providers::azure::pagination::{collect_all, Page};
use crate::providers::azure::types::{
    DefinitionReference, ListEnvelope, PipelineReference, ProjectReference, VariableGroup,
};

impl AzureClient {
    /// Fetches one page of a listing endpoint, echoing `token` back when present.
    pub(super) async fn fetch_page<T>(&self, url: &Url, token: Option<String>) -> Result<Page<T>>
    where
        T: DeserializeOwned,
    {
        let mut url = url.clone();
        if let Some(token) = &token {
            url.query_pairs_mut().append_pair("continuationToken", token);
        }

        let response = self.get(&url).await?;
        let continuation_token = response.continuation_token();
        let envelope: ListEnvelope<T> = serde_json::from_slice(&response.body)?;

        Ok(Page {
            items: envelope.value,
            continuation_token,
        })
    }

    /// Drains every page of a listing endpoint.
    async fn list_all<T>(&self, url: Url) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let url = &url;
        collect_all(move |token| self.fetch_page(url, token)).await
    }

    pub async fn list_projects(&self) -> Result<Vec<ProjectReference>> {
        let url = api_url(&self.org_url, None, &["projects"], PROJECTS_API_VERSION)?;
        self.list_all(url).await
    }

    pub async fn list_pipelines(&self, project: &str) -> Result<Vec<PipelineReference>> {
        let url = api_url(
            &self.org_url,
            Some(project),
            &["pipelines"],
            PIPELINES_API_VERSION,
        )?;
        self.list_all(url).await
    }

    pub async fn list_release_definitions(&self, project: &str) -> Result<Vec<DefinitionReference>> {
        let url = api_url(
            &self.release_url,
            Some(project),
            &["release", "definitions"],
            RELEASE_API_VERSION,
        )?;
        self.list_all(url).await
    }

    pub async fn list_build_definitions(&self, project: &str) -> Result<Vec<DefinitionReference>> {
        let url = api_url(
            &self.org_url,
            Some(project),
            &["build", "definitions"],
            BUILD_LIST_API_VERSION,
        )?;
        self.list_all(url).await
    }

    pub async fn list_variable_groups(&self, project: &str) -> Result<Vec<VariableGroup>> {
        let url = api_url(
            &self.org_url,
            Some(project),
            &["distributedtask", "variablegroups"],
            VARIABLE_GROUPS_API_VERSION,
        )?;
        self.list_all(url).await
    }
}
