//! Mirar: browser smoke-test harness for interactive simulations.
//!
//! Mirar (Spanish: "to watch") drives a Chromium instance against a
//! running local instance of a browser-rendered simulation, exercises its
//! primary action control, observes the run over a fixed window, and
//! renders a human-readable report plus screenshot artifacts.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      MIRAR Architecture                          │
//! ├──────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐             │
//! │   │ Scenario   │───►│ Control    │───►│ Headless   │             │
//! │   │ Driver     │    │ Locator    │    │ Browser    │             │
//! │   └─────┬──────┘    └────────────┘    │ (chromium) │             │
//! │         │                             └─────┬──────┘             │
//! │   ┌─────▼──────┐    ┌────────────┐          │  async events      │
//! │   │ Report     │◄───│ Event      │◄─────────┘                    │
//! │   │ Synthesizer│    │ Recorder   │                               │
//! │   └────────────┘    └────────────┘                               │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The Scenario Driver owns the browser session and drives it through a
//! linear phase machine; the Event Recorder passively accumulates console
//! and page-error events throughout the session's lifetime; the Control
//! Locator probes candidate strategies in priority order during the
//! "find action" phase; the Report Synthesizer runs once, after teardown,
//! over the final state of both.
//!
//! With the `browser` feature enabled, browser control uses real CDP via
//! chromiumoxide. Without it, a scriptable mock backs unit tests.

#![warn(missing_docs)]

mod browser;
mod locator;
mod recorder;
mod report;
mod result;
mod scenario;

pub use browser::{Browser, BrowserConfig, Page};
#[cfg(not(feature = "browser"))]
pub use browser::{PageScript, ScriptedElement};
pub use locator::{
    default_strategies, locate, matches_action_vocabulary, LocatedControl, ProbedElement,
    Strategy, ACTION_VOCABULARY,
};
pub use recorder::{ConsoleEvent, ConsoleSeverity, EventRecorder, PageErrorEvent};
pub use report::{render, MAX_CONSOLE_SHOWN, MAX_ERRORS_SHOWN};
pub use result::{MirarError, MirarResult};
pub use scenario::{
    Phase, ScenarioConfig, ScenarioDriver, ScenarioOutcome, ScreenshotArtifact,
};
