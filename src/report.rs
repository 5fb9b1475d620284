use std::io::{self, Write};

use crate::services::LoadReport;

/// Console narration for a finished (or planned) import.
pub fn render(report: &LoadReport) -> Vec<String> {
    let mut lines = Vec::new();

    for group in &report.groups {
        for entry in &group.records {
            let id = entry.document_id.as_deref().unwrap_or("pending");
            let code = if entry.division.is_empty() {
                entry.code.clone()
            } else {
                format!("{}-{}", entry.code, entry.division)
            };
            lines.push(format!("  + {} {} ({})", code, entry.name, id));
        }
        lines.push(format!("[{}] {} courses", group.label, group.count));
    }

    let verb = if report.committed { "Imported" } else { "Would import" };
    lines.push(format!(
        "{} {} courses into '{}' across {} groups",
        verb,
        report.total(),
        report.collection,
        report.groups.len()
    ));
    lines
}

pub fn write_report<W: Write>(report: &LoadReport, mut out: W) -> io::Result<()> {
    for line in render(report) {
        writeln!(out, "{}", line)?;
    }
    out.flush()
}
