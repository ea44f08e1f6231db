// src/report/store.rs
// =============================================================================
// Saved report history.
//
// Reports are stored per user as one JSON file each:
//
//   <root>/<user>/<timestamp>_<host>.json
//
// The ReportSink trait is the seam: the CLI uses the directory store, a
// web service would plug in its own database-backed sink.
//
// Directory names are a sanitized form of the user name, so two users can
// share a directory ("a b" and "a_b"). Each file records its owner and
// list() only returns files whose owner matches.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::analyzer::AnalysisResult;

/// Reports shown per page of history.
pub const HISTORY_PAGE_SIZE: usize = 10;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid user name: {0:?}")]
    InvalidUser(String),

    #[error("report store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("report serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Completed,
    Failed,
}

impl ReportStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportStatus::Completed => "completed",
            ReportStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedReport {
    pub user: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub status: ReportStatus,
    pub result: AnalysisResult,
}

impl SavedReport {
    pub fn new(user: &str, url: &str, result: AnalysisResult) -> Self {
        let status = if result.is_error() {
            ReportStatus::Failed
        } else {
            ReportStatus::Completed
        };
        Self {
            user: user.to_string(),
            url: url.to_string(),
            created_at: Utc::now(),
            status,
            result,
        }
    }
}

pub trait ReportSink {
    /// Persists a report and returns where it was written.
    fn save(&self, report: &SavedReport) -> Result<PathBuf, StoreError>;

    /// All reports for a user, newest first.
    fn list(&self, user: &str) -> Result<Vec<SavedReport>, StoreError>;
}

pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn user_dir(&self, user: &str) -> Result<PathBuf, StoreError> {
        let name = sanitize(user.trim());
        if name.is_empty() {
            return Err(StoreError::InvalidUser(user.to_string()));
        }
        Ok(self.root.join(name))
    }
}

impl ReportSink for JsonDirStore {
    fn save(&self, report: &SavedReport) -> Result<PathBuf, StoreError> {
        let dir = self.user_dir(&report.user)?;
        fs::create_dir_all(&dir)?;

        let host = url::Url::parse(&report.url)
            .ok()
            .and_then(|u| u.host_str().map(sanitize))
            .unwrap_or_else(|| "unknown".to_string());
        let file_name = format!(
            "{}_{}.json",
            report.created_at.format("%Y%m%dT%H%M%S%.3fZ"),
            host
        );

        let path = dir.join(file_name);
        fs::write(&path, serde_json::to_vec_pretty(report)?)?;
        debug!(path = %path.display(), "saved report");
        Ok(path)
    }

    fn list(&self, user: &str) -> Result<Vec<SavedReport>, StoreError> {
        let dir = self.user_dir(user)?;
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let owner = user.trim();
        let mut reports = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match read_report(&path) {
                Ok(report) if report.user.trim() == owner => reports.push(report),
                Ok(report) => {
                    debug!(path = %path.display(), owner = %report.user, "skipping report of another user");
                }
                // One corrupt file shouldn't hide the rest of the history
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable report"),
            }
        }

        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reports)
    }
}

fn read_report(path: &Path) -> Result<SavedReport, StoreError> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

// One page of `items`, pages numbered from 1 (page 0 is treated as 1).
// Pages past the end are empty.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    let start = page.saturating_sub(1).saturating_mul(per_page);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(per_page).min(items.len());
    &items[start..end]
}

// Number of pages needed for `len` items; at least one so an empty
// history still reads "page 1 of 1"
pub fn page_count(len: usize, per_page: usize) -> usize {
    len.div_ceil(per_page.max(1)).max(1)
}

// Keeps names safe to use as a single path component
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}
