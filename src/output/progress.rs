use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::providers::ResourceKind;
use crate::report::FlowReport;

use super::styling::{failure, success, warning};

/// Spinner shown while one export flow runs
pub struct FlowProgress {
    pb: ProgressBar,
}

impl FlowProgress {
    pub fn start(kind: ResourceKind) -> Self {
        let pb = create_spinner(warning(format!("Exporting {}", kind.label())).to_string());
        Self { pb }
    }

    pub fn finish(self, report: &FlowReport) {
        let label = report.kind.label();

        let message = match &report.aborted {
            Some(reason) => failure(format!("{label}: listing failed ({reason}) ✗")).to_string(),
            None if report.failed > 0 => warning(format!(
                "{label}: {} exported, {} skipped, {} failed",
                report.exported, report.skipped, report.failed
            ))
            .to_string(),
            None => success(format!(
                "{label}: {} exported, {} skipped ✓",
                report.exported, report.skipped
            ))
            .to_string(),
        };

        self.pb.finish_with_message(message);
    }
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {msg} {spinner}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
