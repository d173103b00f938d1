//! HTML and JSON reports.
//!
//! The run report is a single self-contained file: screenshots are embedded as
//! base64 data URIs so it can be archived or attached on its own. The overview
//! page only needs the screenshot directories and can be regenerated without a
//! run.

use base64::Engine;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::runner::{CaseResult, RunResult, ScreenshotRecord};
use crate::session::list_pngs;
use crate::snapshot::{ComparisonDetail, ScreenshotRole, SnapshotConfig};
use crate::widgets::WidgetKind;

pub const RUN_REPORT_FILE: &str = "shortcode_visual_report.html";
pub const OVERVIEW_FILE: &str = "visual_test_overview.html";
pub const RESULTS_FILE: &str = "results.json";

const STYLE: &str = "body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 40px; }\n\
.header { background: #332A86; color: white; padding: 20px; border-radius: 8px; margin-bottom: 30px; }\n\
.test-section { margin: 30px 0; padding: 20px; border: 1px solid #ddd; border-radius: 8px; }\n\
.screenshot { max-width: 300px; margin: 10px; border: 1px solid #ccc; }\n\
.pass { color: #5E9732; font-weight: bold; }\n\
.fail { color: #E36F1E; font-weight: bold; }\n\
.grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(320px, 1fr)); gap: 20px; }\n\
figure { margin: 0; }\n\
figcaption { font-size: 13px; color: #555; }\n\
pre { white-space: pre-wrap; }";

/// Files written by [`write_reports`]
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub run_report: PathBuf,
    pub overview: PathBuf,
    pub results: PathBuf,
}

/// Write the run report, overview and `results.json` into `dir`
pub fn write_reports(run: &RunResult, snapshots: &SnapshotConfig, dir: &Path) -> io::Result<ReportPaths> {
    fs::create_dir_all(dir)?;
    let paths = ReportPaths {
        run_report: write_run_report(run, dir)?,
        overview: write_overview(snapshots, dir)?,
        results: write_results_json(run, dir)?,
    };
    info!(dir = %dir.display(), "reports written");
    Ok(paths)
}

pub fn write_results_json(run: &RunResult, dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(RESULTS_FILE);
    fs::write(&path, serde_json::to_string_pretty(run)?)?;
    Ok(path)
}

pub fn write_run_report(run: &RunResult, dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(RUN_REPORT_FILE);
    fs::write(&path, render_run_report(run))?;
    Ok(path)
}

pub fn write_overview(snapshots: &SnapshotConfig, dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(OVERVIEW_FILE);
    fs::write(&path, render_overview(snapshots)?)?;
    Ok(path)
}

/// Render the per-case report
pub fn render_run_report(run: &RunResult) -> String {
    let mut html = page_start("Shortcode Visual Test Report");
    let _ = write!(
        html,
        "<div class=\"header\"><h1>Shortcode Visual Test Report</h1>\
         <p>{} passed, {} failed, {} total</p>",
        run.passed(),
        run.failed(),
        run.cases.len()
    );
    if let Some(url) = &run.page_url {
        let _ = write!(html, "<p>Page: <code>{}</code></p>", escape(url));
    }
    html.push_str("</div>\n");

    if let Some(error) = &run.error {
        let _ = writeln!(
            html,
            "<div class=\"test-section\"><h2 class=\"fail\">Run aborted</h2><pre>{}</pre></div>",
            escape(error)
        );
    }

    for case in &run.cases {
        render_case(&mut html, case);
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_case(html: &mut String, case: &CaseResult) {
    let (class, label) = if case.passed { ("pass", "PASS") } else { ("fail", "FAIL") };
    let _ = write!(
        html,
        "<div class=\"test-section\" id=\"{name}\"><h2>{name} <span class=\"{class}\">{label}</span></h2>\
         <p>Group: {group} &middot; {ms} ms</p>",
        name = escape(&case.name),
        group = escape(&case.group),
        ms = case.duration_ms,
    );
    if let Some(error) = &case.error {
        let _ = write!(html, "<pre class=\"fail\">{}</pre>", escape(error));
    }

    if !case.screenshots.is_empty() {
        html.push_str("<div class=\"grid\">");
        for shot in &case.screenshots {
            render_screenshot(html, shot);
        }
        html.push_str("</div>");
    }
    html.push_str("</div>\n");
}

fn render_screenshot(html: &mut String, shot: &ScreenshotRecord) {
    html.push_str("<figure>");
    match data_uri(&shot.path) {
        Ok(uri) => {
            let _ = write!(html, "<img class=\"screenshot\" src=\"{}\" alt=\"{}\">", uri, escape(&shot.name));
        }
        Err(e) => {
            warn!(path = %shot.path.display(), "could not embed screenshot: {}", e);
            let _ = write!(html, "<p class=\"fail\">missing {}</p>", escape(&shot.path.display().to_string()));
        }
    }

    let _ = write!(html, "<figcaption>{}", escape(&shot.name));
    if let Some(cmp) = &shot.comparison {
        let class = if cmp.is_similar { "pass" } else { "fail" };
        let _ = write!(
            html,
            "<br><span class=\"{}\">similarity {:.4}</span>",
            class, cmp.similarity
        );
        match &cmp.detail {
            ComparisonDetail::DiffImage(path) => {
                let _ = write!(html, "<br>diff: <code>{}</code>", escape(&path.display().to_string()));
            }
            other => {
                let _ = write!(html, "<br>{}", escape(&other.to_string()));
            }
        }
    }
    html.push_str("</figcaption></figure>");
}

/// Render the artifact overview from the screenshot directories
pub fn render_overview(snapshots: &SnapshotConfig) -> io::Result<String> {
    let mut html = page_start("Shortcode Visual Test Overview");
    html.push_str(
        "<div class=\"header\"><h1>Shortcode Visual Test Overview</h1>\
         <p>Visual tests for every shortcode widget style and interaction</p></div>\n",
    );

    html.push_str("<div class=\"test-section\"><h2>Widget styles</h2><ul>");
    for kind in WidgetKind::ALL {
        let _ = write!(
            html,
            "<li><strong>{}:</strong> {} styles ({})</li>",
            kind.label(),
            kind.styles().len(),
            kind.styles().join(", ")
        );
    }
    html.push_str("</ul></div>\n");

    let _ = write!(
        html,
        "<div class=\"test-section\"><h2>Screenshots</h2><p>Root: <code>{}</code></p><div class=\"grid\">",
        escape(&snapshots.root.display().to_string())
    );
    for role in ScreenshotRole::ALL {
        let files = list_pngs(&snapshots.dir(role))?;
        let _ = write!(html, "<div><h3>{}/ ({})</h3><ul>", role.dir_name(), files.len());
        for file in &files {
            let name = file.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
            let _ = write!(html, "<li><code>{}</code></li>", escape(&name));
        }
        html.push_str("</ul></div>");
    }
    html.push_str("</div></div>\n");

    html.push_str(
        "<div class=\"test-section\"><h2>Running tests</h2>\
         <pre><code>shortcode-vision run</code></pre>\
         <pre><code>shortcode-vision run --filter takeaways</code></pre>\
         <pre><code>shortcode-vision run --compare --verbose</code></pre></div>\n",
    );

    html.push_str("</body>\n</html>\n");
    Ok(html)
}

fn page_start(title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>\n{}\n</style>\n</head>\n<body>\n",
        escape(title),
        STYLE
    )
}

/// PNG file as a `data:` URI
pub fn data_uri(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    ))
}

/// Escape text for HTML element and attribute content
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
