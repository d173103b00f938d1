use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use shortcode_vision::browser::BrowserOptions;
use shortcode_vision::config;
use shortcode_vision::fixture;
use shortcode_vision::harness::{HarnessConfig, run_harness};
use shortcode_vision::preflight;
use shortcode_vision::report;
use shortcode_vision::runner::RunResult;
use shortcode_vision::session::Session;
use shortcode_vision::snapshot::{ComparisonDetail, compare_screenshots};

/// Shortcode Vision - visual regression testing for shortcode widgets
#[derive(Parser, Debug)]
#[command(
    name = "shortcode-vision",
    about = "Visual regression and functional tests for WordPress shortcode widgets over WebDriver",
    after_help = "ENVIRONMENT VARIABLES:\n\
        WORDPRESS_URL                      WordPress site URL\n\
        WP_ADMIN_USER / WP_ADMIN_PASS      Admin credentials\n\
        SELENIUM_HUB                       WebDriver endpoint\n\
        SHORTCODE_VISION_SCREENSHOT_DIR    Root of baseline/current/diff\n\
        SHORTCODE_VISION_REPORT_DIR        Report output directory\n\
        SHORTCODE_VISION_TEST_PAGE         Page probed for widgets\n\
        SHORTCODE_VISION_THRESHOLD         Tolerated fraction of differing bytes\n\
        SHORTCODE_VISION_FILTER            Case filter for `run`\n\
        SHORTCODE_VISION_WAIT_TIMEOUT      Element wait timeout (seconds)\n\
        SHORTCODE_VISION_WINDOW_SIZE       Browser window size (WxH)"
)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the widget test cases against a live browser
    Run {
        /// Only run cases whose name or group contains this text
        #[arg(short, long, env = "SHORTCODE_VISION_FILTER")]
        filter: Option<String>,

        /// Skip the Selenium/WordPress reachability checks
        #[arg(long)]
        skip_checks: bool,

        /// Compare every capture against its baseline
        #[arg(long)]
        compare: bool,

        /// Tolerated fraction of differing channel bytes
        #[arg(long, value_parser = config::parse_threshold)]
        threshold: Option<f64>,

        /// Element wait timeout in seconds
        #[arg(long)]
        wait_timeout: Option<u64>,

        /// Show the browser window
        #[arg(long)]
        headed: bool,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that Selenium Grid and WordPress are reachable
    Check,

    /// Compare a screenshot against a baseline
    Compare {
        /// Baseline image (created from CURRENT when missing)
        baseline: PathBuf,

        /// Current image
        current: PathBuf,

        /// Tolerated fraction of differing channel bytes
        #[arg(long, value_parser = config::parse_threshold)]
        threshold: Option<f64>,

        /// Output result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the standalone HTML fixture
    Fixture {
        /// Output directory (default: report directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the overview report from the screenshot directories
    Report,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Some(Commands::Run {
            filter,
            skip_checks,
            compare,
            threshold,
            wait_timeout,
            headed,
            json,
        }) => {
            if !skip_checks {
                run_checks()?;
            }

            let session = Session::from_config();
            session.init()?;

            let cfg = config::get();
            let mut browser = BrowserOptions::default().headless(!headed);
            if let Some(secs) = wait_timeout {
                browser = browser.wait_timeout(Duration::from_secs(secs));
            }
            let harness_config = HarnessConfig {
                browser,
                screenshot_dir: session.screenshot_dir.clone(),
                report_dir: session.report_dir.clone(),
                filter,
                compare,
                threshold: threshold.unwrap_or(cfg.compare.threshold),
                settle: Duration::from_millis(500),
            };

            let result = match run_harness(&harness_config) {
                Ok(result) => result,
                Err(e) => RunResult::aborted(e.to_string()),
            };
            let paths = report::write_reports(&result, &session.snapshot_config(), &session.report_dir)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_summary(&result);
                println!("\nReports:");
                println!("  HTML report: {}", paths.run_report.display());
                println!("  Overview:    {}", paths.overview.display());
                println!("  Results:     {}", paths.results.display());
            }

            if let Some(error) = &result.error {
                return Err(format!("run aborted: {}", error).into());
            }
            if !result.success {
                return Err(format!("{} of {} case(s) failed", result.failed(), result.cases.len()).into());
            }
        }

        Some(Commands::Check) => {
            run_checks()?;
            println!("Environment ready");
        }

        Some(Commands::Compare {
            baseline,
            current,
            threshold,
            json,
        }) => {
            let threshold = threshold.unwrap_or(config::get().compare.threshold);
            let result = compare_screenshots(&baseline, &current, Some(threshold));

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                let verdict = if result.is_similar { "similar" } else { "different" };
                println!("{} (similarity {:.4}, threshold {})", verdict, result.similarity, threshold);
                match &result.detail {
                    ComparisonDetail::DiffImage(path) => println!("  Diff: {}", path.display()),
                    other => println!("  {}", other),
                }
            }

            if !result.is_similar {
                return Err(format!("{} differs from {}", current.display(), baseline.display()).into());
            }
        }

        Some(Commands::Fixture { output }) => {
            let dir = output.unwrap_or_else(|| config::get().paths.report_dir.clone());
            let path = fixture::write_fixture(&dir)?;
            println!("Wrote fixture: {}", path.display());
            println!("  URL: {}", fixture::file_url(&path)?);
        }

        Some(Commands::Report) => {
            let session = Session::from_config();
            let path = report::write_overview(&session.snapshot_config(), &session.report_dir)?;
            println!("Visual report generated: {}", path.display());
        }

        None => {
            println!("Shortcode Vision - visual regression testing for shortcode widgets");
            println!();
            println!("Usage: shortcode-vision <COMMAND>");
            println!();
            println!("Commands:");
            println!("  run      Run the widget test cases against a live browser");
            println!("  check    Check that Selenium Grid and WordPress are reachable");
            println!("  compare  Compare a screenshot against a baseline");
            println!("  fixture  Write the standalone HTML fixture");
            println!("  report   Write the overview report");
            println!();
            println!("Run with --help for more information.");
        }
    }

    Ok(())
}

fn run_checks() -> Result<(), Box<dyn Error>> {
    if let Err(e) = preflight::check_environment() {
        eprintln!("{}", e);
        eprintln!("{}", e.remediation());
        return Err(e.into());
    }
    Ok(())
}

fn print_summary(result: &RunResult) {
    if let Some(url) = &result.page_url {
        println!("Page: {}", url);
    }
    for case in &result.cases {
        let mark = if case.passed { "PASS" } else { "FAIL" };
        println!("  [{}] {} ({} ms)", mark, case.name, case.duration_ms);
        if let Some(error) = &case.error {
            println!("         {}", error);
        }
        for shot in &case.screenshots {
            if let Some(cmp) = &shot.comparison {
                println!("         {} similarity {:.4}", shot.name, cmp.similarity);
            }
        }
    }
    println!(
        "\n{} passed, {} failed, {} total",
        result.passed(),
        result.failed(),
        result.cases.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_flag_is_validated() {
        let args = Args::try_parse_from(["shortcode-vision", "compare", "a.png", "b.png", "--threshold", "0.05"]).unwrap();
        match args.command {
            Some(Commands::Compare { threshold, .. }) => assert_eq!(threshold, Some(0.05)),
            other => panic!("unexpected command: {:?}", other),
        }

        for bad in ["1.5", "-0.1", "NaN", "loose"] {
            let parsed = Args::try_parse_from(["shortcode-vision", "run", "--threshold", bad]);
            assert!(parsed.is_err(), "accepted threshold {}", bad);
        }
    }

    #[test]
    fn test_run_wait_timeout_flag() {
        let args = Args::try_parse_from(["shortcode-vision", "run", "--wait-timeout", "3", "--skip-checks"]).unwrap();
        match args.command {
            Some(Commands::Run {
                wait_timeout,
                skip_checks,
                ..
            }) => {
                assert_eq!(wait_timeout, Some(3));
                assert!(skip_checks);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
