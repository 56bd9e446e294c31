use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::auth::Token;
use crate::config::{Config, ExportConfig};
use crate::error::SnapshotError;
use crate::output;
use crate::providers::{
    AzureDevOpsProvider, CloneOutcome, CloneRequest, ConnectionSettings, ExportOptions,
    ResourceKind, RewriteRule, StorageOptions, DEFAULT_FLOWS,
};

#[derive(Parser)]
#[command(name = "devops-snapshot")]
#[command(author, version, about = "Azure DevOps configuration export", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./devops-snapshot.{toml,json,yaml,yml})
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print JSON artifacts and reports
    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Args, Debug, Clone, Default)]
struct ConnectionArgs {
    /// Organization URL, e.g. https://dev.azure.com/contoso
    #[arg(long, env = "AZURE_DEVOPS_ORG_URL")]
    org_url: Option<String>,

    /// Personal access token with read access to build, release and variable groups
    #[arg(short, long, env = "AZURE_DEVOPS_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export release definitions, variable groups and build definitions to disk
    Export {
        #[command(flatten)]
        connection: ConnectionArgs,

        #[arg(short = 'P', long)]
        project: Option<String>,

        /// Directory the JSON files are written to (created if missing)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also export pipelines, resolved through their self links
        #[arg(long, default_value_t = false)]
        include_pipelines: bool,

        /// Append resource ids to filenames instead of overwriting same-named resources
        #[arg(long, default_value_t = false)]
        disambiguate_ids: bool,

        /// Maximum number of requests in flight
        #[arg(long)]
        concurrency: Option<usize>,

        /// Write the completion report as JSON to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// List every project in the organization
    Projects {
        #[command(flatten)]
        connection: ConnectionArgs,
    },

    /// List every pipeline in a project
    Pipelines {
        #[command(flatten)]
        connection: ConnectionArgs,

        #[arg(short = 'P', long)]
        project: Option<String>,
    },

    /// Re-create a build definition under a new name (experimental)
    ClonePipeline {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// Project holding the source definition
        #[arg(short = 'P', long)]
        project: Option<String>,

        /// Id of the build definition to copy
        #[arg(long)]
        definition_id: u64,

        /// Project to create the copy in (defaults to the source project)
        #[arg(long)]
        target_project: Option<String>,

        /// Name of the copy
        #[arg(long)]
        name: Option<String>,

        /// Folder used if the pipelines API creates the copy
        #[arg(long)]
        folder: Option<String>,

        /// Extra literal substitution, FROM=TO (repeatable)
        #[arg(long = "replace", value_name = "FROM=TO", value_parser = RewriteRule::parse_cli)]
        replacements: Vec<RewriteRule>,
    },
}

/// Accumulates absent required settings so they are reported together.
#[derive(Default)]
struct Required(Vec<&'static str>);

impl Required {
    fn take<T>(&mut self, value: Option<T>, name: &'static str) -> Option<T> {
        if value.is_none() {
            self.0.push(name);
        }
        value
    }

    fn finish<T>(self, values: Option<T>) -> std::result::Result<T, SnapshotError> {
        match values {
            Some(values) if self.0.is_empty() => Ok(values),
            _ => Err(SnapshotError::Config(format!(
                "missing required settings: {}",
                self.0.join(", ")
            ))),
        }
    }
}

impl ConnectionArgs {
    /// Organization URL and token, flags and environment first, then the config file.
    fn resolve(&self, config: &Config, required: &mut Required) -> Option<(String, String)> {
        let org_url = required.take(
            self.org_url.clone().or_else(|| config.azure.org_url.clone()),
            "organization URL (--org-url)",
        );
        let token = required.take(
            self.token.clone().or_else(|| config.azure.token.clone()),
            "access token (--token)",
        );
        org_url.zip(token)
    }
}

fn connection_settings(
    (org_url, token): (String, String),
    concurrency: Option<usize>,
    config: &Config,
) -> ConnectionSettings {
    ConnectionSettings {
        org_url,
        token: Token::from(token),
        auth_scheme: config.azure.auth_scheme,
        release_url: config.azure.release_url.clone(),
        max_retries: config.azure.max_retries,
        retry_delay: Duration::from_secs(config.azure.retry_delay_secs),
        concurrency: concurrency.unwrap_or(config.azure.concurrency),
    }
}

fn selected_flows(export: &ExportConfig, include_pipelines: bool) -> Vec<ResourceKind> {
    let enabled = |kind: &ResourceKind| match kind {
        ResourceKind::Release => export.releases,
        ResourceKind::VariableGroup => export.variable_groups,
        ResourceKind::Build => export.builds,
        ResourceKind::Pipeline => include_pipelines || export.pipelines,
    };

    DEFAULT_FLOWS
        .into_iter()
        .chain([ResourceKind::Pipeline])
        .filter(enabled)
        .collect()
}

impl Cli {
    fn load_config(&self) -> Result<Config> {
        Config::load(self.config.as_deref())
    }

    #[allow(clippy::too_many_arguments)]
    async fn execute_export(
        &self,
        connection: &ConnectionArgs,
        project: Option<&str>,
        output_dir: Option<&Path>,
        include_pipelines: bool,
        disambiguate_ids: bool,
        concurrency: Option<usize>,
        report_path: Option<&Path>,
    ) -> Result<()> {
        let config = self.load_config()?;

        let mut required = Required::default();
        let connection = connection.resolve(&config, &mut required);
        let project = required.take(
            project.map(ToOwned::to_owned).or_else(|| config.azure.project.clone()),
            "project name (--project)",
        );
        let output_dir = required.take(
            output_dir
                .map(Path::to_path_buf)
                .or_else(|| config.export.output_dir.clone()),
            "output directory (--output)",
        );
        let ((connection, project), output_dir) =
            required.finish(connection.zip(project).zip(output_dir))?;

        let settings = connection_settings(connection, concurrency, &config);
        let provider = AzureDevOpsProvider::new(&settings, project)?;

        info!("Exporting Azure DevOps project: {}", provider.project);

        let options = ExportOptions {
            storage: StorageOptions {
                output_dir,
                disambiguate_ids: disambiguate_ids || config.export.disambiguate_ids,
                pretty: self.pretty || config.export.pretty,
            },
            flows: selected_flows(&config.export, include_pipelines),
        };

        let report = provider.export(&options).await;

        output::print_summary(&report);

        if let Some(path) = report_path {
            let json = if self.pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
            info!("Report written to: {}", path.display());
        }

        let aborted: Vec<&str> = report.aborted_flows().map(|flow| flow.kind.label()).collect();
        if !aborted.is_empty() {
            anyhow::bail!("Listing failed for: {}", aborted.join(", "));
        }

        Ok(())
    }

    async fn execute_projects(&self, connection: &ConnectionArgs) -> Result<()> {
        let config = self.load_config()?;
        let mut required = Required::default();
        let connection = connection.resolve(&config, &mut required);
        let settings = connection_settings(required.finish(connection)?, None, &config);
        let provider = AzureDevOpsProvider::new(&settings, String::new())?;

        let projects = provider
            .list_projects()
            .await
            .context("Failed to list projects")?;

        output::print_projects(&projects);
        Ok(())
    }

    async fn execute_pipelines(&self, connection: &ConnectionArgs, project: Option<&str>) -> Result<()> {
        let config = self.load_config()?;
        let mut required = Required::default();
        let connection = connection.resolve(&config, &mut required);
        let project = required.take(
            project.map(ToOwned::to_owned).or_else(|| config.azure.project.clone()),
            "project name (--project)",
        );
        let (connection, project) = required.finish(connection.zip(project))?;

        let settings = connection_settings(connection, None, &config);
        let provider = AzureDevOpsProvider::new(&settings, project)?;

        let pipelines = provider
            .list_pipelines()
            .await
            .with_context(|| format!("Failed to list pipelines of {}", provider.project))?;

        output::print_pipelines(&pipelines);
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn execute_clone(
        &self,
        connection: &ConnectionArgs,
        project: Option<&str>,
        definition_id: u64,
        target_project: Option<&str>,
        name: Option<&str>,
        folder: Option<&str>,
        replacements: &[RewriteRule],
    ) -> Result<()> {
        let config = self.load_config()?;
        let mut required = Required::default();
        let connection = connection.resolve(&config, &mut required);
        let project = required.take(
            project.map(ToOwned::to_owned).or_else(|| config.azure.project.clone()),
            "project name (--project)",
        );
        let (connection, project) = required.finish(connection.zip(project))?;

        let settings = connection_settings(connection, None, &config);

        let mut rules = config.rewrite.rules.clone();
        rules.extend(replacements.iter().cloned());

        let request = CloneRequest {
            definition_id,
            target_project: target_project.map_or_else(|| project.clone(), ToOwned::to_owned),
            name: name.map_or_else(|| config.rewrite.placeholder_name.clone(), ToOwned::to_owned),
            folder: folder.map_or_else(|| config.rewrite.folder.clone(), ToOwned::to_owned),
            rules,
        };

        let provider = AzureDevOpsProvider::new(&settings, project)?;
        let outcome = provider.clone_pipeline(&request).await?;

        let created = outcome.created();
        match outcome {
            CloneOutcome::BuildDefinition(_) => println!(
                "Created build definition '{}' (id {}) in {}",
                created.name, created.id, request.target_project
            ),
            CloneOutcome::Pipeline(_) => println!(
                "Created pipeline '{}' (id {}) in {} through the pipelines API",
                created.name, created.id, request.target_project
            ),
        }

        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Export {
                connection,
                project,
                output,
                include_pipelines,
                disambiguate_ids,
                concurrency,
                report,
            } => {
                self.execute_export(
                    connection,
                    project.as_deref(),
                    output.as_deref(),
                    *include_pipelines,
                    *disambiguate_ids,
                    *concurrency,
                    report.as_deref(),
                )
                .await
            }
            Commands::Projects { connection } => self.execute_projects(connection).await,
            Commands::Pipelines {
                connection,
                project,
            } => self.execute_pipelines(connection, project.as_deref()).await,
            Commands::ClonePipeline {
                connection,
                project,
                definition_id,
                target_project,
                name,
                folder,
                replacements,
            } => {
                self.execute_clone(
                    connection,
                    project.as_deref(),
                    *definition_id,
                    target_project.as_deref(),
                    name.as_deref(),
                    folder.as_deref(),
                    replacements,
                )
                .await
            }
        }
    }
}
