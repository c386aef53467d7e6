//! Check report: JSON document and fixed-width table
//!
//! The JSON form is the contract between `check --json` and `update --input`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::check::ToolRecord;
use crate::color::{CYAN, GREEN, RED, YELLOW, paint};
use crate::version::checker::VersionStatus;

/// One row of the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolEntry {
    pub tool: String,
    pub current: String,
    pub latest: String,
    pub file: String,
    pub status: VersionStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub current: usize,
    pub outdated: usize,
    pub errors: usize,
    pub manual_check: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub timestamp: String,
    pub tools: Vec<ToolEntry>,
    pub summary: Summary,
    pub exit_code: i32,
}

impl Report {
    pub fn from_records(records: &[ToolRecord], now: DateTime<Utc>) -> Self {
        let tools: Vec<ToolEntry> = records
            .iter()
            .map(|r| ToolEntry {
                tool: r.name.clone(),
                current: r.current_version.clone(),
                latest: r.latest_version.clone(),
                file: r.source_file.to_string_lossy().into_owned(),
                status: r.status,
            })
            .collect();

        let mut summary = Summary {
            total: tools.len(),
            ..Summary::default()
        };
        for entry in &tools {
            match entry.status {
                VersionStatus::Current => summary.current += 1,
                VersionStatus::Outdated => summary.outdated += 1,
                VersionStatus::Error => summary.errors += 1,
                VersionStatus::Manual => summary.manual_check += 1,
                VersionStatus::Unchecked => {}
            }
        }

        Self {
            timestamp: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            tools,
            summary,
            exit_code: i32::from(summary.outdated > 0),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn has_outdated(&self) -> bool {
        self.summary.outdated > 0
    }

    pub fn outdated(&self) -> impl Iterator<Item = &ToolEntry> {
        self.tools
            .iter()
            .filter(|entry| entry.status == VersionStatus::Outdated)
    }
}

const TOOL_WIDTH: usize = 12;
const VERSION_WIDTH: usize = 14;
const FILE_WIDTH: usize = 28;

fn status_label(status: VersionStatus) -> (&'static str, &'static str) {
    match status {
        VersionStatus::Current => ("current", GREEN),
        VersionStatus::Outdated => ("OUTDATED", YELLOW),
        VersionStatus::Error => ("error", RED),
        VersionStatus::Manual => ("manual check", CYAN),
        VersionStatus::Unchecked => ("unchecked", ""),
    }
}

/// Render the report as a fixed-width table followed by a summary line
pub fn render_table(report: &Report, color: bool) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{:<TOOL_WIDTH$} {:<VERSION_WIDTH$} {:<VERSION_WIDTH$} {:<FILE_WIDTH$} STATUS\n",
        "TOOL", "CURRENT", "LATEST", "FILE"
    ));
    out.push_str(&format!(
        "{}\n",
        "-".repeat(TOOL_WIDTH + 2 * VERSION_WIDTH + FILE_WIDTH + 4 + "STATUS".len())
    ));

    for entry in &report.tools {
        let latest = if entry.latest.is_empty() {
            "-"
        } else {
            entry.latest.as_str()
        };
        let (label, code) = status_label(entry.status);
        let status = if code.is_empty() {
            label.to_string()
        } else {
            paint(color, code, label)
        };
        out.push_str(&format!(
            "{:<TOOL_WIDTH$} {:<VERSION_WIDTH$} {:<VERSION_WIDTH$} {:<FILE_WIDTH$} {}\n",
            entry.tool, entry.current, latest, entry.file, status
        ));
    }

    let s = &report.summary;
    out.push_str(&format!(
        "\n{} tools: {} current, {} outdated, {} errors, {} manual check\n",
        s.total, s.current, s.outdated, s.errors, s.manual_check
    ));

    out
}
