mod progress;
mod styling;
mod summary;
mod tables;

pub use progress::FlowProgress;
pub use styling::{banner, failure, muted};
pub use summary::{print_pipelines, print_projects, print_summary};

/// Prints the `devops-snapshot` banner to stderr.
///
/// Displays the tool name, version, and description at the start of execution.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        banner("📦 devops-snapshot"),
        muted(env!("CARGO_PKG_VERSION")),
        muted("Azure DevOps configuration export")
    );
}
