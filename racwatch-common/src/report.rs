//! Text and JSON renderings of a [`Snapshot`].

use crate::error::{RacError, Result};
use crate::model::Snapshot;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// Number of sessions listed individually in the text report
pub const SESSION_LIST_LIMIT: usize = 20;

const RULE_WIDTH: usize = 70;

/// Output format of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = RacError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(RacError::InvalidConfig(format!(
                "unknown report format '{other}' (expected text or json)"
            ))),
        }
    }
}

/// Render `snapshot` in the requested format
pub fn project(snapshot: &Snapshot, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(text_report(snapshot)),
        ReportFormat::Json => json_report(snapshot),
    }
}

/// Human-readable report
pub fn text_report(snapshot: &Snapshot) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut lines = vec![
        rule.clone(),
        "1C:ENTERPRISE CLUSTER STATUS REPORT".to_string(),
        format!(
            "Generated: {}",
            snapshot.generated_at().format("%Y-%m-%d %H:%M:%S")
        ),
        rule.clone(),
    ];

    section(&mut lines, "CLUSTERS");
    for cluster in snapshot.clusters() {
        lines.push(format!("  - {}", cluster.name));
        lines.push(format!("    ID: {}", cluster.id));
        lines.push(format!("    Host: {}:{}", cluster.host, cluster.port));
    }

    section(&mut lines, "WORKING SERVERS");
    for server in snapshot.servers() {
        lines.push(format!("  - {}", server.name));
        lines.push(format!("    ID: {}", server.id));
        lines.push(format!("    Host: {}:{}", server.host, server.port));
    }

    let inactive = snapshot.inactive_infobases();
    section(&mut lines, "INFOBASES");
    lines.push(format!("Total infobases: {}", snapshot.infobases().count()));
    lines.push(format!("Inactive infobases (no sessions): {}", inactive.len()));
    lines.push(String::new());
    for infobase in snapshot.infobases() {
        let status = if infobase.is_inactive {
            "[INACTIVE]"
        } else {
            "[ACTIVE]"
        };
        lines.push(format!("  {status} {}", infobase.name));
        lines.push(format!("    ID: {}", infobase.id));
        lines.push(format!("    Sessions: {}", infobase.sessions_count));
        if let Some(last) = infobase.last_session_time {
            lines.push(format!("    Last activity: {last}"));
        }
    }

    let total_sessions = snapshot.session_count();
    section(&mut lines, "ACTIVE SESSIONS");
    lines.push(format!("Total sessions: {total_sessions}"));
    for session in snapshot.sessions().take(SESSION_LIST_LIMIT) {
        lines.push(format!("  - User: {}", session.user_name));
        lines.push(format!("    Application: {}", session.app_id));
        if let Some(started) = session.started_at {
            lines.push(format!("    Started: {started}"));
        }
    }
    if total_sessions > SESSION_LIST_LIMIT {
        lines.push(format!(
            "  ... and {} more sessions",
            total_sessions - SESSION_LIST_LIMIT
        ));
    }

    if !snapshot.errors().is_empty() {
        section(&mut lines, "ERRORS");
        lines.extend(snapshot.errors().iter().map(|error| format!("  ! {error}")));
    }

    section(&mut lines, "RECOMMENDATIONS");
    if inactive.is_empty() {
        lines.push("  - All infobases are active, no action needed".to_string());
    } else {
        lines.push("  - Consider blocking the following inactive infobases:".to_string());
        lines.extend(
            inactive
                .iter()
                .map(|entry| format!("    * {}", entry.infobase.name)),
        );
    }

    lines.push(String::new());
    lines.push(rule.clone());
    lines.push("END OF REPORT".to_string());
    lines.push(rule);

    lines.join("\n")
}

/// Blank line followed by a `### TITLE ###` heading
fn section(lines: &mut Vec<String>, title: &str) {
    lines.push(String::new());
    lines.push(format!("### {title} ###"));
}

/// Machine-readable report document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonReport {
    pub generated_at: NaiveDateTime,
    pub clusters: Vec<JsonEndpoint>,
    pub servers: Vec<JsonEndpoint>,
    pub infobases: Vec<JsonInfobase>,
    pub sessions_count: usize,
    pub inactive_bases_count: usize,
    pub errors: Vec<String>,
}

/// Cluster or server entry of [`JsonReport`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonEndpoint {
    pub id: String,
    pub name: String,
    pub host: String,
    pub port: String,
}

/// Infobase entry of [`JsonReport`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonInfobase {
    pub id: String,
    pub name: String,
    pub sessions_count: usize,
    pub is_inactive: bool,
    pub last_session_time: Option<NaiveDateTime>,
}

impl From<&Snapshot> for JsonReport {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            generated_at: snapshot.generated_at(),
            clusters: snapshot
                .clusters()
                .map(|c| JsonEndpoint {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    host: c.host.clone(),
                    port: c.port.clone(),
                })
                .collect(),
            servers: snapshot
                .servers()
                .map(|s| JsonEndpoint {
                    id: s.id.clone(),
                    name: s.name.clone(),
                    host: s.host.clone(),
                    port: s.port.clone(),
                })
                .collect(),
            infobases: snapshot
                .infobases()
                .map(|ib| JsonInfobase {
                    id: ib.id.clone(),
                    name: ib.name.clone(),
                    sessions_count: ib.sessions_count,
                    is_inactive: ib.is_inactive,
                    last_session_time: ib.last_session_time,
                })
                .collect(),
            sessions_count: snapshot.session_count(),
            inactive_bases_count: snapshot.inactive_infobases().len(),
            errors: snapshot.errors().to_vec(),
        }
    }
}

/// Pretty-printed JSON report; non-ASCII text is written as is
pub fn json_report(snapshot: &Snapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(&JsonReport::from(snapshot))?)
}

/// `cluster_report_YYYYMMDD_HHMMSS.<ext>`
pub fn default_file_name(format: ReportFormat, at: NaiveDateTime) -> String {
    format!(
        "cluster_report_{}.{}",
        at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Write the report to `path`, or to a file in `dir` named after the
/// snapshot's generation time
pub fn save_report(
    snapshot: &Snapshot,
    format: ReportFormat,
    path: Option<&Path>,
    dir: &Path,
) -> Result<PathBuf> {
    let target = match path {
        Some(path) => path.to_path_buf(),
        None => dir.join(default_file_name(format, snapshot.generated_at())),
    };

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let content = project(snapshot, format)?;
    std::fs::write(&target, content)?;

    info!("Report saved: {}", target.display());
    Ok(target)
}
