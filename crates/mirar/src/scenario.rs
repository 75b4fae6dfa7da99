//! Scenario Driver: the timed navigate / settle / capture / activate /
//! observe sequence.
//!
//! The driver owns the browser session for the whole scenario and drives
//! it through a linear phase machine with one branch:
//!
//! ```text
//! INIT -> NAVIGATED -> SETTLED -> CAPTURED_INITIAL
//!      -> { ACTIVATED -> OBSERVING -> CAPTURED_FINAL }   control found
//!       | { CAPTURED_DEBUG }                             control missing
//!      -> TERMINATED
//! ```
//!
//! Teardown runs on every exit path, including the fatal-navigation one.
//! The fixed settle and observation delays are a readiness proxy, not a
//! content-aware signal; they are injectable through [`ScenarioConfig`]
//! and are the first knob to reach for when a run is flaky.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::browser::{Browser, BrowserConfig, Page};
use crate::locator::{default_strategies, locate, Strategy};
use crate::recorder::EventRecorder;
use crate::result::MirarResult;

/// Phases of the scenario state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Session acquired, nothing driven yet
    Init,
    /// Navigation completed
    Navigated,
    /// Client-side initialization delay elapsed
    Settled,
    /// "initial" screenshot captured
    CapturedInitial,
    /// Action control activated
    Activated,
    /// Observation window running
    Observing,
    /// "simulation" screenshot captured
    CapturedFinal,
    /// "no_button" diagnostic screenshot captured
    CapturedDebug,
    /// Browser session released
    Terminated,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Navigated => "navigated",
            Self::Settled => "settled",
            Self::CapturedInitial => "captured_initial",
            Self::Activated => "activated",
            Self::Observing => "observing",
            Self::CapturedFinal => "captured_final",
            Self::CapturedDebug => "captured_debug",
            Self::Terminated => "terminated",
        };
        write!(f, "{name}")
    }
}

/// A screenshot artifact written during the scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotArtifact {
    /// Artifact label ("initial", "simulation", "no_button")
    pub label: String,
    /// Path the PNG was written to
    pub path: PathBuf,
}

/// What the scenario observed, built incrementally across phases and
/// immutable after teardown
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    /// The address the scenario navigated to
    pub target_url: String,
    /// Document title read after navigation, if any
    pub page_title: Option<String>,
    /// Whether navigation completed
    pub navigation_ok: bool,
    /// Whether the action control was located
    pub control_found: bool,
    /// Screenshots taken, in capture order
    pub screenshots: Vec<ScreenshotArtifact>,
    /// Phase transitions, in order
    pub phases: Vec<Phase>,
}

impl ScenarioOutcome {
    fn new(target_url: String) -> Self {
        Self {
            target_url,
            page_title: None,
            navigation_ok: false,
            control_found: false,
            screenshots: Vec::new(),
            phases: vec![Phase::Init],
        }
    }

    /// The last phase the scenario reached
    #[must_use]
    pub fn final_phase(&self) -> Phase {
        self.phases.last().copied().unwrap_or(Phase::Init)
    }
}

/// Scenario timing and target configuration
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    /// Address of the running target application
    pub target_url: String,
    /// Browser launch configuration
    pub browser: BrowserConfig,
    /// Delay after navigation for client-side initialization
    pub settle_delay: Duration,
    /// Delay between activation and the observation window
    pub post_activation_delay: Duration,
    /// Observation window after activation
    pub observe_window: Duration,
    /// Hard bound on navigation
    pub navigation_timeout: Duration,
    /// Directory screenshot artifacts are written to
    pub output_dir: PathBuf,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            target_url: String::from("http://localhost:5173/"),
            browser: BrowserConfig::default(),
            settle_delay: Duration::from_secs(2),
            post_activation_delay: Duration::from_secs(1),
            observe_window: Duration::from_secs(10),
            navigation_timeout: Duration::from_secs(30),
            output_dir: PathBuf::from("."),
        }
    }
}

impl ScenarioConfig {
    /// Set the target address
    #[must_use]
    pub fn with_target_url(mut self, url: impl Into<String>) -> Self {
        self.target_url = url.into();
        self
    }

    /// Set the browser configuration
    #[must_use]
    pub fn with_browser(mut self, browser: BrowserConfig) -> Self {
        self.browser = browser;
        self
    }

    /// Set the post-navigation settle delay
    #[must_use]
    pub const fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Set the delay between activation and observation
    #[must_use]
    pub const fn with_post_activation_delay(mut self, delay: Duration) -> Self {
        self.post_activation_delay = delay;
        self
    }

    /// Set the observation window
    #[must_use]
    pub const fn with_observe_window(mut self, window: Duration) -> Self {
        self.observe_window = window;
        self
    }

    /// Set the navigation timeout
    #[must_use]
    pub const fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    /// Set the artifact output directory
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}

/// Drives one scenario against one browser session
#[derive(Debug)]
pub struct ScenarioDriver {
    config: ScenarioConfig,
    strategies: Vec<Strategy>,
    recorder: EventRecorder,
}

impl ScenarioDriver {
    /// Create a driver with the default candidate strategies
    #[must_use]
    pub fn new(config: ScenarioConfig) -> Self {
        Self {
            config,
            strategies: default_strategies(),
            recorder: EventRecorder::new(),
        }
    }

    /// Override the candidate strategy list
    #[must_use]
    pub fn with_strategies(mut self, strategies: Vec<Strategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// The recorder accumulating this scenario's console/error events
    #[must_use]
    pub fn recorder(&self) -> &EventRecorder {
        &self.recorder
    }

    /// The scenario configuration
    #[must_use]
    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Launch a browser and run the scenario on it
    ///
    /// # Errors
    ///
    /// Returns error on browser launch or page-creation faults. A
    /// navigation failure is NOT an error here: it is captured in the
    /// outcome so a report can still be rendered.
    pub async fn run(&self) -> MirarResult<ScenarioOutcome> {
        let browser = Browser::launch(self.config.browser.clone()).await?;
        self.run_on(browser).await
    }

    /// Run the scenario on an already-launched browser, releasing it
    /// unconditionally afterwards
    pub async fn run_on(&self, browser: Browser) -> MirarResult<ScenarioOutcome> {
        let mut result = self.drive(&browser).await;
        if let Err(error) = browser.close().await {
            tracing::warn!(error = %error, "browser teardown failed");
        }
        if let Ok(outcome) = result.as_mut() {
            Self::enter(outcome, Phase::Terminated);
        }
        result
    }

    async fn drive(&self, browser: &Browser) -> MirarResult<ScenarioOutcome> {
        let mut outcome = ScenarioOutcome::new(self.config.target_url.clone());
        let mut page = browser.new_page().await?;

        // Handlers must be live before navigation or load-time events
        // are lost.
        page.attach_recorder(&self.recorder).await?;

        tracing::info!(url = %self.config.target_url, "loading simulation");
        let navigated = tokio::time::timeout(
            self.config.navigation_timeout,
            page.goto(&self.config.target_url),
        )
        .await;
        match navigated {
            Ok(Ok(())) => {
                outcome.navigation_ok = true;
                Self::enter(&mut outcome, Phase::Navigated);
            }
            Ok(Err(error)) => {
                tracing::error!(error = %error, "navigation failed");
                return Ok(outcome);
            }
            Err(_) => {
                tracing::error!(
                    timeout_ms = self.config.navigation_timeout.as_millis() as u64,
                    "navigation timed out"
                );
                return Ok(outcome);
            }
        }
        outcome.page_title = page.title().await;

        tokio::time::sleep(self.config.settle_delay).await;
        Self::enter(&mut outcome, Phase::Settled);

        tracing::info!("taking initial screenshot");
        self.capture(&page, "initial", &mut outcome).await;
        Self::enter(&mut outcome, Phase::CapturedInitial);

        tracing::info!("looking for the action control");
        match locate(&page, &self.strategies).await {
            Some(control) => {
                outcome.control_found = true;
                tracing::info!(text = %control.text, "activating control");
                if let Err(error) = page.click_probed().await {
                    // Contained: the observation window still has
                    // diagnostic value.
                    tracing::warn!(error = %error, "activation click failed");
                }
                Self::enter(&mut outcome, Phase::Activated);

                tokio::time::sleep(self.config.post_activation_delay).await;
                Self::enter(&mut outcome, Phase::Observing);
                tracing::info!(
                    seconds = self.config.observe_window.as_secs(),
                    "observing simulation"
                );
                tokio::time::sleep(self.config.observe_window).await;

                tracing::info!("taking simulation screenshot");
                self.capture(&page, "simulation", &mut outcome).await;
                Self::enter(&mut outcome, Phase::CapturedFinal);
            }
            None => {
                tracing::warn!("no action control found, capturing debug screenshot");
                self.capture(&page, "no_button", &mut outcome).await;
                Self::enter(&mut outcome, Phase::CapturedDebug);
            }
        }

        Ok(outcome)
    }

    /// Capture a full-page screenshot. Failures are logged and skipped;
    /// a missing artifact never aborts the scenario.
    async fn capture(&self, page: &Page, label: &str, outcome: &mut ScenarioOutcome) {
        let path = self.config.output_dir.join(format!("screenshot_{label}.png"));
        match page.screenshot().await {
            Ok(bytes) => match std::fs::write(&path, &bytes) {
                Ok(()) => {
                    tracing::info!(label, path = %path.display(), "screenshot saved");
                    outcome.screenshots.push(ScreenshotArtifact {
                        label: label.to_string(),
                        path,
                    });
                }
                Err(error) => {
                    tracing::warn!(label, error = %error, "screenshot write failed");
                }
            },
            Err(error) => {
                tracing::warn!(label, error = %error, "screenshot capture failed");
            }
        }
    }

    fn enter(outcome: &mut ScenarioOutcome, phase: Phase) {
        tracing::debug!(phase = %phase, "phase entered");
        outcome.phases.push(phase);
    }
}
