//! Report Synthesizer: fixed-structure text summary of one scenario run.
//!
//! A pure function over the scenario outcome and the two event logs.
//! Nothing here is stored; the report is regenerated fresh each run and
//! written to stdout by the caller. The closing "Muscle Smoothing"
//! section is a reminder for the human reviewer, not a pass/fail bit,
//! since that check is inherently visual.

use std::fmt::Write as _;

use crate::recorder::{ConsoleEvent, PageErrorEvent};
use crate::scenario::ScenarioOutcome;

/// Page error messages shown verbatim before truncation
pub const MAX_ERRORS_SHOWN: usize = 5;

/// Console messages shown before truncation
pub const MAX_CONSOLE_SHOWN: usize = 10;

const BORDER: &str = "════════════════════════════════════════════════════════════";

/// Render the report for one completed scenario.
///
/// Sections appear in fixed order: load status, page errors, console
/// messages, observation summary, and the muscle-smoothing reminder.
#[must_use]
pub fn render(
    outcome: &ScenarioOutcome,
    console: &[ConsoleEvent],
    errors: &[PageErrorEvent],
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{BORDER}");
    let _ = writeln!(out, "  SIMULATION SMOKE REPORT");
    let _ = writeln!(out, "{BORDER}");

    render_load_status(&mut out, outcome);
    render_page_errors(&mut out, errors);
    render_console_messages(&mut out, console);
    render_observation(&mut out, outcome);
    render_muscle_smoothing(&mut out);

    let _ = writeln!(out);
    let _ = writeln!(out, "{BORDER}");
    let _ = writeln!(out, "  Scenario completed");
    let _ = writeln!(out, "{BORDER}");

    out
}

fn render_load_status(out: &mut String, outcome: &ScenarioOutcome) {
    let status = if outcome.navigation_ok {
        "✓ SUCCESS"
    } else {
        "✗ FAILED"
    };
    let _ = writeln!(out);
    let _ = writeln!(out, "1. PAGE LOAD STATUS: {status}");
    let _ = writeln!(out, "   - URL: {}", outcome.target_url);
    if let Some(ref title) = outcome.page_title {
        let _ = writeln!(out, "   - Page title: {title}");
    }
    if !outcome.navigation_ok {
        let _ = writeln!(out, "   - The target address could not be reached");
    }
}

fn render_page_errors(out: &mut String, errors: &[PageErrorEvent]) {
    let _ = writeln!(out);
    let _ = writeln!(out, "2. PAGE ERRORS: {}", errors.len());
    if errors.is_empty() {
        let _ = writeln!(out, "   ✓ No errors detected");
        return;
    }
    let _ = writeln!(out, "   Errors found:");
    for error in errors.iter().take(MAX_ERRORS_SHOWN) {
        let _ = writeln!(out, "     - {}", error.text);
    }
    if errors.len() > MAX_ERRORS_SHOWN {
        let _ = writeln!(out, "   ... and {} more", errors.len() - MAX_ERRORS_SHOWN);
    }
}

fn render_console_messages(out: &mut String, console: &[ConsoleEvent]) {
    let _ = writeln!(out);
    let _ = writeln!(out, "3. CONSOLE MESSAGES: {} total", console.len());
    for event in console.iter().take(MAX_CONSOLE_SHOWN) {
        let _ = writeln!(out, "   [{}] {}", event.severity, event.text);
    }
    if console.len() > MAX_CONSOLE_SHOWN {
        let _ = writeln!(out, "   ... and {} more", console.len() - MAX_CONSOLE_SHOWN);
    }
}

fn render_observation(out: &mut String, outcome: &ScenarioOutcome) {
    let _ = writeln!(out);
    let _ = writeln!(out, "4. SIMULATION OBSERVATION:");
    if outcome.screenshots.is_empty() {
        let _ = writeln!(out, "   - No screenshots were captured");
    } else {
        let _ = writeln!(out, "   - Screenshots captured:");
        for artifact in &outcome.screenshots {
            let _ = writeln!(
                out,
                "     * {} ({})",
                artifact.path.display(),
                artifact.label
            );
        }
    }
    if outcome.control_found {
        let _ = writeln!(out, "   - Check screenshots for:");
        let _ = writeln!(out, "     * Smooth vs vibrating movement");
        let _ = writeln!(out, "     * Muscle contraction/expansion");
        let _ = writeln!(out, "     * Physics stability");
    } else if outcome.navigation_ok {
        let _ = writeln!(
            out,
            "   - No Start/Run control was found; inspect the debug screenshot"
        );
    }
}

fn render_muscle_smoothing(out: &mut String) {
    let _ = writeln!(out);
    let _ = writeln!(out, "5. MUSCLE SMOOTHING:");
    let _ = writeln!(
        out,
        "   - Check the right panel 'Muscle Smoothing' slider in the screenshots"
    );
    let _ = writeln!(out, "   - Smooth movement = smoothing is working");
    let _ = writeln!(out, "   - Vibration/jitter = smoothing may need adjustment");
    let _ = writeln!(
        out,
        "   - This check requires human visual confirmation"
    );
}
