use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::providers::ResourceKind;

/// Outcome of a complete export run for one project.
#[derive(Debug, Serialize)]
pub struct ExportReport {
    pub project: String,
    pub output_dir: PathBuf,
    pub exported_at: DateTime<Utc>,
    pub flows: Vec<FlowReport>,
}

impl ExportReport {
    pub fn total_exported(&self) -> usize {
        self.flows.iter().map(|flow| flow.exported).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.flows.iter().map(|flow| flow.skipped).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.flows.iter().map(|flow| flow.failed).sum()
    }

    pub fn aborted_flows(&self) -> impl Iterator<Item = &FlowReport> {
        self.flows.iter().filter(|flow| flow.aborted.is_some())
    }
}

/// Counts for one enumerate-resolve-persist flow.
#[derive(Debug, Clone, Serialize)]
pub struct FlowReport {
    pub kind: ResourceKind,
    /// Entries returned by the listing, skipped ones included.
    pub listed: usize,
    pub exported: usize,
    pub skipped: usize,
    pub failed: usize,
    pub failures: Vec<ResourceFailure>,
    /// Set when the listing itself failed and nothing was attempted.
    pub aborted: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceFailure {
    pub resource: String,
    pub reason: String,
}

impl FlowReport {
    pub fn new(kind: ResourceKind, listed: usize, skipped: usize) -> Self {
        Self {
            kind,
            listed,
            exported: 0,
            skipped,
            failed: 0,
            failures: Vec::new(),
            aborted: None,
        }
    }

    pub fn aborted(kind: ResourceKind, reason: impl Into<String>) -> Self {
        Self {
            aborted: Some(reason.into()),
            ..Self::new(kind, 0, 0)
        }
    }

    pub fn record_export(&mut self) {
        self.exported += 1;
    }

    pub fn record_failure(&mut self, resource: impl Into<String>, reason: impl Into<String>) {
        self.failed += 1;
        self.failures.push(ResourceFailure {
            resource: resource.into(),
            reason: reason.into(),
        });
    }
}
