//! Mirador: command-line entry for the Mirar smoke-test harness.
//!
//! ## Usage
//!
//! ```bash
//! mirador                          # Smoke-test http://localhost:5173/
//! mirador --port 8080              # Different target port
//! mirador --headed                 # Watch the simulation run
//! mirador --observe-ms 20000 -v    # Longer observation, debug logging
//! ```
//!
//! The report goes to stdout; phase narration goes to the log (stderr).
//! The exit status reflects orchestration success only: the harness has
//! no automated pass/fail verdict on the simulation itself.

mod error;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use mirar::{BrowserConfig, ScenarioConfig, ScenarioDriver};

use error::{CliError, CliResult};

/// Smoke-test a browser-rendered simulation
#[derive(Parser, Debug)]
#[command(name = "mirador", version, about)]
struct Cli {
    /// Host serving the target application
    #[arg(long, default_value = "localhost", env = "MIRAR_HOST")]
    host: String,

    /// Port serving the target application
    #[arg(long, default_value_t = 5173, env = "MIRAR_PORT")]
    port: u16,

    /// Run the browser with a visible window to watch the simulation
    #[arg(long)]
    headed: bool,

    /// Disable the Chromium sandbox (containers/CI)
    #[arg(long)]
    no_sandbox: bool,

    /// Path to the chromium binary (auto-detected when omitted)
    #[arg(long, env = "CHROMIUM_PATH")]
    chromium_path: Option<String>,

    /// Delay after navigation for client-side initialization, in ms
    #[arg(long, default_value_t = 2_000)]
    settle_ms: u64,

    /// Observation window after activating the control, in ms
    #[arg(long, default_value_t = 10_000)]
    observe_ms: u64,

    /// Navigation timeout, in ms
    #[arg(long, default_value_t = 30_000)]
    navigation_timeout_ms: u64,

    /// Directory screenshot artifacts are written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Silence log output below errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let driver = ScenarioDriver::new(build_config(&cli));

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::scenario_execution(format!("Failed to create runtime: {e}")))?;
    let outcome = rt.block_on(driver.run())?;

    let report = mirar::render(
        &outcome,
        &driver.recorder().console_events(),
        &driver.recorder().page_errors(),
    );
    println!("{report}");

    if outcome.navigation_ok {
        Ok(())
    } else {
        Err(CliError::scenario_execution(format!(
            "target application at {} could not be loaded",
            outcome.target_url
        )))
    }
}

fn init_tracing(cli: &Cli) {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> ScenarioConfig {
    let mut browser = BrowserConfig::default().with_headless(!cli.headed);
    if cli.no_sandbox {
        browser = browser.with_no_sandbox();
    }
    if let Some(ref path) = cli.chromium_path {
        browser = browser.with_chromium_path(path);
    }

    ScenarioConfig::default()
        .with_target_url(format!("http://{}:{}/", cli.host, cli.port))
        .with_browser(browser)
        .with_settle_delay(Duration::from_millis(cli.settle_ms))
        .with_observe_window(Duration::from_millis(cli.observe_ms))
        .with_navigation_timeout(Duration::from_millis(cli.navigation_timeout_ms))
        .with_output_dir(cli.output_dir.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args.iter().copied()).unwrap()
    }

    #[test]
    fn test_defaults_target_the_vite_dev_port() {
        let cli = parse(&["mirador"]);
        let config = build_config(&cli);
        assert_eq!(config.target_url, "http://localhost:5173/");
        assert!(config.browser.headless);
        assert_eq!(config.settle_delay, Duration::from_secs(2));
        assert_eq!(config.observe_window, Duration::from_secs(10));
    }

    #[test]
    fn test_host_port_flags_shape_the_url() {
        let cli = parse(&["mirador", "--host", "127.0.0.1", "--port", "8080"]);
        let config = build_config(&cli);
        assert_eq!(config.target_url, "http://127.0.0.1:8080/");
    }

    #[test]
    fn test_headed_flag_disables_headless() {
        let cli = parse(&["mirador", "--headed"]);
        let config = build_config(&cli);
        assert!(!config.browser.headless);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["mirador", "-q", "-v"]).is_err());
    }
}
