use std::fmt::Write;

use comfy_table::Cell;

use crate::providers::{PipelineReference, ProjectReference};
use crate::report::ExportReport;

use super::styling::{emphasis, failure, heading, muted, success, value, warning};
use super::tables::{create_table, exported_cell, failed_cell, header_row, skipped_cell};

/// Prints the completion report of an export run to stdout.
///
/// Shows one row per flow with listed/exported/skipped/failed counts,
/// followed by every failed resource with its reason. Aborted flows are
/// listed with the listing error instead of counts.
pub fn print_summary(report: &ExportReport) {
    println!("{}", render_summary(report));
}

pub fn print_projects(projects: &[ProjectReference]) {
    let mut table = create_table();
    table.set_header(header_row(&["Name", "Id", "State"]));
    for project in projects {
        table.add_row(vec![
            Cell::new(&project.name),
            Cell::new(&project.id),
            Cell::new(project.state.as_deref().unwrap_or("-")),
        ]);
    }
    println!("{table}");
    println!("  {} {}", muted("Projects:"), warning(projects.len()));
}

pub fn print_pipelines(pipelines: &[PipelineReference]) {
    let mut table = create_table();
    table.set_header(header_row(&["Name", "Id", "Folder"]));
    for pipeline in pipelines {
        table.add_row(vec![
            Cell::new(&pipeline.name),
            Cell::new(pipeline.id),
            Cell::new(pipeline.folder.as_deref().unwrap_or("\\")),
        ]);
    }
    println!("{table}");
    println!("  {} {}", muted("Pipelines:"), warning(pipelines.len()));
}

fn add_section_header(output: &mut String, emoji: &str, title: &str) {
    let _ = writeln!(output, "{} {}", emphasis(emoji), heading(title));
}

fn render_summary(report: &ExportReport) -> String {
    let mut output = String::new();

    add_section_header(&mut output, "📊", "Overview");
    let _ = writeln!(
        output,
        "  {} {}\n  {} {}\n  {} {}\n",
        muted("Project:"),
        value(&report.project),
        muted("Output directory:"),
        value(report.output_dir.display()),
        muted("Exported at:"),
        muted(report.exported_at.format("%Y-%m-%d %H:%M:%S UTC")),
    );

    add_section_header(&mut output, "🗂️", "Flows");
    let mut table = create_table();
    table.set_header(header_row(&["Flow", "Listed", "Exported", "Skipped", "Failed"]));
    for flow in &report.flows {
        match &flow.aborted {
            Some(reason) => table.add_row(vec![
                Cell::new(flow.kind.label()),
                Cell::new(format!("aborted: {reason}")).fg(comfy_table::Color::Red),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("-"),
            ]),
            None => table.add_row(vec![
                Cell::new(flow.kind.label()),
                Cell::new(flow.listed),
                exported_cell(flow.exported),
                skipped_cell(flow.skipped),
                failed_cell(flow.failed),
            ]),
        };
    }
    let _ = writeln!(output, "{table}\n");

    let failures: Vec<_> = report
        .flows
        .iter()
        .flat_map(|flow| flow.failures.iter())
        .collect();

    if !failures.is_empty() {
        add_section_header(&mut output, "⚠️", "Failed resources");
        let mut table = create_table();
        table.set_header(header_row(&["Resource", "Reason"]));
        for failure in failures {
            table.add_row(vec![Cell::new(&failure.resource), Cell::new(&failure.reason)]);
        }
        let _ = writeln!(output, "{table}\n");
    }

    let totals = format!(
        "{} exported, {} skipped, {} failed",
        report.total_exported(),
        report.total_skipped(),
        report.total_failed()
    );
    let totals = if report.total_failed() > 0 || report.aborted_flows().next().is_some() {
        failure(totals)
    } else {
        success(totals)
    };
    let _ = writeln!(output, "  {} {}", muted("Total:"), totals);

    output
}
