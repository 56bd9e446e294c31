use log::debug;

use crate::error::{Result, SnapshotError};

use super::client::AzureClient;
use super::types::{Locator, ResourceDefinition, ResourceReference};

/// Turns listing references into full definitions.
///
/// Release and build definitions carry their own `url` and are fetched
/// directly. Pipelines only expose links, so the pipeline is fetched first
/// and its `self` link is followed with a second authenticated GET.
pub struct Resolver<'a> {
    client: &'a AzureClient,
    project: &'a str,
}

impl<'a> Resolver<'a> {
    pub fn new(client: &'a AzureClient, project: &'a str) -> Self {
        Self { client, project }
    }

    pub async fn resolve(&self, reference: &ResourceReference) -> Result<ResourceDefinition> {
        let body = match &reference.locator {
            Locator::Url(url) => self.client.get_href(url).await?,
            Locator::Pipeline(pipeline_id) => self.follow_self_link(reference, *pipeline_id).await?,
            Locator::Variables(variables) => serde_json::to_vec(variables)?,
        };

        Ok(ResourceDefinition {
            kind: reference.kind,
            id: reference.id,
            name: reference.name.clone(),
            body,
        })
    }

    async fn follow_self_link(&self, reference: &ResourceReference, pipeline_id: u64) -> Result<Vec<u8>> {
        let pipeline = self.client.get_pipeline(self.project, pipeline_id).await?;

        let href = pipeline.self_href().ok_or_else(|| {
            SnapshotError::resolution(reference.describe(), "response has no `self` link")
        })?;

        debug!(
            "Following self link of pipeline {} ('{}'): {href}",
            pipeline.id, pipeline.name
        );

        self.client.get_href(href).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::azure::client::test_settings;
    use crate::providers::azure::types::ResourceKind;
    use indexmap::IndexMap;
    use mockito::Matcher;

    fn pipeline_ref(id: u64) -> ResourceReference {
        ResourceReference {
            kind: ResourceKind::Pipeline,
            id,
            name: format!("pipeline-{id}"),
            locator: Locator::Pipeline(id),
        }
    }

    #[tokio::test]
    async fn test_link_follow_requests_exact_self_href() {
        let mut server = mockito::Server::new_async().await;
        let href = format!("{}/x/y", server.url());

        server
            .mock("GET", "/org/proj/_apis/pipelines/4")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(format!(r#"{{"id": 4, "name": "ci", "links": {{"self": {{"href": "{href}"}}}}}}"#))
            .create_async()
            .await;
        let definition = server
            .mock("GET", "/x/y")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"process": {"yamlFilename": "azure-pipelines.yml"}}"#)
            .expect(1)
            .create_async()
            .await;

        let client = AzureClient::new(&test_settings(&format!("{}/org", server.url()))).unwrap();
        let resolved = Resolver::new(&client, "proj")
            .resolve(&pipeline_ref(4))
            .await
            .unwrap();

        assert_eq!(resolved.body, br#"{"process": {"yamlFilename": "azure-pipelines.yml"}}"#);
        assert_eq!(resolved.name, "pipeline-4");
        definition.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_self_link_is_resolution_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/org/proj/_apis/pipelines/4")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"id": 4, "name": "ci", "_links": {"web": {"href": "http://w"}}}"#)
            .create_async()
            .await;

        let client = AzureClient::new(&test_settings(&format!("{}/org", server.url()))).unwrap();
        let err = Resolver::new(&client, "proj")
            .resolve(&pipeline_ref(4))
            .await
            .unwrap_err();

        match err {
            SnapshotError::Resolution { resource, reason } => {
                assert!(resource.contains("pipeline-4"));
                assert!(reason.contains("self"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_direct_strategy_gets_definition_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/org/proj/_apis/release/definitions/1")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"id": 1, "name": "Prod Release"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = AzureClient::new(&test_settings(&format!("{}/org", server.url()))).unwrap();
        let reference = ResourceReference {
            kind: ResourceKind::Release,
            id: 1,
            name: "Prod Release".to_string(),
            locator: Locator::Url(format!("{}/org/proj/_apis/release/definitions/1", server.url())),
        };

        let resolved = Resolver::new(&client, "proj").resolve(&reference).await.unwrap();

        assert_eq!(resolved.body, br#"{"id": 1, "name": "Prod Release"}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_direct_strategy_non_success_is_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/org/proj/_apis/build/definitions/2")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let client = AzureClient::new(&test_settings(&format!("{}/org", server.url()))).unwrap();
        let reference = ResourceReference {
            kind: ResourceKind::Build,
            id: 2,
            name: "gone".to_string(),
            locator: Locator::Url(format!("{}/org/proj/_apis/build/definitions/2", server.url())),
        };

        let result = Resolver::new(&client, "proj").resolve(&reference).await;
        assert!(matches!(result, Err(SnapshotError::Api { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_variables_are_serialized_without_group_metadata() {
        let client = AzureClient::new(&test_settings("https://dev.azure.com/org")).unwrap();
        let mut variables = IndexMap::new();
        variables.insert("env".to_string(), serde_json::json!({"value": "prod"}));

        let reference = ResourceReference {
            kind: ResourceKind::VariableGroup,
            id: 9,
            name: "shared".to_string(),
            locator: Locator::Variables(variables),
        };

        let resolved = Resolver::new(&client, "proj").resolve(&reference).await.unwrap();

        assert_eq!(resolved.body, br#"{"env":{"value":"prod"}}"#);
    }
}
