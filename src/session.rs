//! Run session: directory layout and metadata for one harness invocation.
//!
//! A session owns the screenshot root (with its `baseline`, `current` and
//! `diff` directories) and the report directory. Nothing is removed when the
//! session ends; baselines and captures are kept indefinitely.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

use crate::snapshot::{ScreenshotRole, SnapshotConfig};

/// File name of the session metadata written into the report directory
pub const SESSION_FILE: &str = ".session.json";

/// Metadata recorded for a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: String,
    /// RFC 3339 creation time
    pub created: String,
    pub host: String,
    pub wordpress_url: String,
    pub selenium_hub: String,
}

/// A harness run with organized output directories
#[derive(Debug, Clone)]
pub struct Session {
    /// Unique session ID
    pub id: String,
    /// Root of the role directories
    pub screenshot_dir: PathBuf,
    /// Directory for reports and the generated fixture
    pub report_dir: PathBuf,
}

impl Session {
    /// Create a session over the given directories with a unique ID
    pub fn new(screenshot_dir: impl Into<PathBuf>, report_dir: impl Into<PathBuf>) -> Self {
        Self {
            id: generate_session_id(),
            screenshot_dir: screenshot_dir.into(),
            report_dir: report_dir.into(),
        }
    }

    /// Session over the configured directories
    pub fn from_config() -> Self {
        let cfg = crate::config::get();
        Self::new(&cfg.paths.screenshot_dir, &cfg.paths.report_dir)
    }

    pub fn snapshot_config(&self) -> SnapshotConfig {
        SnapshotConfig::new(&self.screenshot_dir)
    }

    /// Create all directories and write the session metadata
    pub fn init(&self) -> std::io::Result<SessionInfo> {
        self.snapshot_config().ensure_dirs()?;
        fs::create_dir_all(&self.report_dir)?;

        let cfg = crate::config::get();
        let info = SessionInfo {
            id: self.id.clone(),
            created: chrono::Utc::now().to_rfc3339(),
            host: host_name(),
            wordpress_url: cfg.wordpress.url.clone(),
            selenium_hub: cfg.browser.hub_url.clone(),
        };

        let metadata_path = self.report_dir.join(SESSION_FILE);
        fs::write(&metadata_path, serde_json::to_string_pretty(&info)?)?;
        debug!(path = %metadata_path.display(), "wrote session metadata");

        Ok(info)
    }

    /// Read back the metadata written by [`Session::init`]
    pub fn load_info(report_dir: &Path) -> std::io::Result<SessionInfo> {
        let raw = fs::read_to_string(report_dir.join(SESSION_FILE))?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// List all PNG files for a role, sorted by path
    pub fn list_captures(&self, role: ScreenshotRole) -> std::io::Result<Vec<PathBuf>> {
        list_pngs(&self.snapshot_config().dir(role))
    }
}

/// All PNG files directly inside `dir` (empty when it does not exist)
pub fn list_pngs(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut captures = Vec::new();
    if dir.exists() {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "png").unwrap_or(false) {
                captures.push(path);
            }
        }
    }
    captures.sort();
    Ok(captures)
}

fn host_name() -> String {
    match hostname::get() {
        Ok(name) => name.to_string_lossy().to_string(),
        Err(e) => {
            warn!("could not read hostname: {}", e);
            "unknown".to_string()
        }
    }
}

/// Generate a unique session ID
fn generate_session_id() -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let pid = std::process::id();
    format!("session_{}_{}", timestamp, pid)
}
