mod clone;
mod flows;

use chrono::Utc;
use log::{info, warn};

use crate::error::Result;
use crate::report::ExportReport;

use super::client::{AzureClient, ConnectionSettings};
use super::storage::StorageOptions;
use super::types::{PipelineReference, ProjectReference, ResourceKind};

pub use clone::{CloneOutcome, CloneRequest};

/// The flows a default export runs, in order.
pub const DEFAULT_FLOWS: [ResourceKind; 3] = [
    ResourceKind::Release,
    ResourceKind::VariableGroup,
    ResourceKind::Build,
];

/// What to export and where to put it.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub storage: StorageOptions,
    pub flows: Vec<ResourceKind>,
}

/// Azure DevOps export provider for a single project.
///
/// Enumerates release definitions, variable groups, build definitions and
/// (optionally) pipelines, resolves every entry to its full definition and
/// writes one JSON file per resource.
pub struct AzureDevOpsProvider {
    pub client: AzureClient,
    pub project: String,
}

impl AzureDevOpsProvider {
    /// Creates a provider for `project`.
    ///
    /// # Errors
    ///
    /// Returns an error if the organization or release URL cannot be parsed,
    /// or the HTTP client cannot be built.
    pub fn new(settings: &ConnectionSettings, project: String) -> Result<Self> {
        let client = AzureClient::new(settings)?;
        Ok(Self { client, project })
    }

    pub async fn list_projects(&self) -> Result<Vec<ProjectReference>> {
        self.client.list_projects().await
    }

    pub async fn list_pipelines(&self) -> Result<Vec<PipelineReference>> {
        self.client.list_pipelines(&self.project).await
    }

    /// Runs every requested flow one after the other.
    ///
    /// Never fails as a whole: listing failures abort only their own flow and
    /// are recorded in the report, per-resource failures are counted and the
    /// flow moves on.
    pub async fn export(&self, options: &ExportOptions) -> ExportReport {
        info!(
            "Starting export of project '{}' into {}",
            self.project,
            options.storage.output_dir.display()
        );

        let mut flows = Vec::with_capacity(options.flows.len());
        for kind in &options.flows {
            flows.push(self.run_flow(*kind, &options.storage).await);
        }

        let report = ExportReport {
            project: self.project.clone(),
            output_dir: options.storage.output_dir.clone(),
            exported_at: Utc::now(),
            flows,
        };

        if report.total_failed() > 0 {
            warn!(
                "{} resources could not be exported",
                report.total_failed()
            );
        }
        info!(
            "Export finished: {} exported, {} skipped, {} failed",
            report.total_exported(),
            report.total_skipped(),
            report.total_failed()
        );

        report
    }
}
