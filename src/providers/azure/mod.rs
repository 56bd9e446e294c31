mod client;
mod pagination;
mod provider;
mod resolver;
mod rewrite;
mod storage;
mod types;

pub use client::ConnectionSettings;
pub use provider::{AzureDevOpsProvider, CloneOutcome, CloneRequest, ExportOptions, DEFAULT_FLOWS};
pub use rewrite::RewriteRule;
pub use storage::StorageOptions;
pub use types::{PipelineReference, ProjectReference, ResourceKind};
