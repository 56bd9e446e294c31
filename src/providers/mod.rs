mod azure;

pub use azure::{
    AzureDevOpsProvider, CloneOutcome, CloneRequest, ConnectionSettings, ExportOptions,
    PipelineReference, ProjectReference, ResourceKind, RewriteRule, StorageOptions, DEFAULT_FLOWS,
};
