use std::path::PathBuf;

use log::{error, info, warn};

use crate::error::Result;
use crate::output::FlowProgress;
use crate::providers::azure::resolver::Resolver;
use crate::providers::azure::storage::{ExportArtifact, StorageOptions};
use crate::providers::azure::types::{
    DefinitionReference, Locator, ResourceDefinition, ResourceKind, ResourceReference,
    VariableGroup,
};
use crate::report::FlowReport;

use super::AzureDevOpsProvider;

/// References that can be exported plus the number of listing entries dropped.
struct Listing {
    references: Vec<ResourceReference>,
    skipped: usize,
}

impl AzureDevOpsProvider {
    async fn list_references(&self, kind: ResourceKind) -> Result<Listing> {
        let listing = match kind {
            ResourceKind::Release => {
                let definitions = self.client.list_release_definitions(&self.project).await?;
                definition_listing(kind, definitions)
            }
            ResourceKind::Build => {
                let definitions = self.client.list_build_definitions(&self.project).await?;
                definition_listing(kind, definitions)
            }
            ResourceKind::VariableGroup => {
                let groups = self.client.list_variable_groups(&self.project).await?;
                variable_group_listing(groups)
            }
            ResourceKind::Pipeline => {
                let pipelines = self.client.list_pipelines(&self.project).await?;
                Listing {
                    references: pipelines
                        .into_iter()
                        .map(|pipeline| ResourceReference {
                            kind,
                            id: pipeline.id,
                            name: pipeline.name,
                            locator: Locator::Pipeline(pipeline.id),
                        })
                        .collect(),
                    skipped: 0,
                }
            }
        };

        Ok(listing)
    }

    /// Enumerates one resource kind, resolves every entry and writes it to disk.
    pub(super) async fn run_flow(&self, kind: ResourceKind, storage: &StorageOptions) -> FlowReport {
        let progress = FlowProgress::start(kind);
        info!("Listing {} for project '{}'", kind.label(), self.project);

        let listing = match self.list_references(kind).await {
            Ok(listing) => listing,
            Err(e) => {
                error!("Failed to list {}: {e}", kind.label());
                let report = FlowReport::aborted(kind, e.to_string());
                progress.finish(&report);
                return report;
            }
        };

        let mut report = FlowReport::new(
            kind,
            listing.references.len() + listing.skipped,
            listing.skipped,
        );

        let resolver = Resolver::new(&self.client, &self.project);
        let resolutions = listing
            .references
            .iter()
            .map(|reference| resolver.resolve(reference));

        let outcomes = futures::future::join_all(resolutions).await;

        // Writes happen in listing order so that among same-named resources
        // the last listed one always ends up on disk.
        for (reference, outcome) in listing.references.iter().zip(outcomes) {
            match outcome.and_then(|definition| write_definition(&definition, storage)) {
                Ok(path) => {
                    info!("Exported {} to {}", reference.describe(), path.display());
                    report.record_export();
                }
                Err(e) => {
                    warn!("Skipping {}: {e}", reference.describe());
                    report.record_failure(reference.describe(), e.to_string());
                }
            }
        }

        progress.finish(&report);
        report
    }
}

fn write_definition(definition: &ResourceDefinition, storage: &StorageOptions) -> Result<PathBuf> {
    ExportArtifact::from_definition(definition, storage)?.write()
}

fn definition_listing(kind: ResourceKind, definitions: Vec<DefinitionReference>) -> Listing {
    let mut references = Vec::with_capacity(definitions.len());
    let mut skipped = 0;

    for definition in definitions {
        match (definition.name, definition.url) {
            (Some(name), Some(url)) => references.push(ResourceReference {
                kind,
                id: definition.id,
                name,
                locator: Locator::Url(url),
            }),
            _ => {
                warn!(
                    "Skipping {kind} definition {}: listing entry has no name or url",
                    definition.id
                );
                skipped += 1;
            }
        }
    }

    Listing {
        references,
        skipped,
    }
}

fn variable_group_listing(groups: Vec<VariableGroup>) -> Listing {
    let mut references = Vec::with_capacity(groups.len());
    let mut skipped = 0;

    for group in groups {
        let Some(name) = group.name else {
            warn!("Skipping variable group {}: listing entry has no name", group.id);
            skipped += 1;
            continue;
        };

        references.push(ResourceReference {
            kind: ResourceKind::VariableGroup,
            id: group.id,
            name,
            locator: Locator::Variables(group.variables),
        });
    }

    Listing {
        references,
        skipped,
    }
}
