//! Control Locator: resilient search for the primary action control.
//!
//! The target application's markup is not contractually fixed, so the
//! locator trades precision for resilience: candidate strategies are
//! probed in an explicit priority order, semantic (visible text) matches
//! before structural selectors, with a catch-all button probe as the
//! final fallback net. A candidate only wins if its resolved element also
//! passes the action-verb vocabulary test, so a generic `button` match
//! with unrelated text is never accepted.

use std::fmt;

use crate::browser::Page;

/// Action verbs accepted on the primary control, tested case-insensitively
/// against the element's displayed text.
pub const ACTION_VOCABULARY: &[&str] = &["start", "run", "build", "begin", "simulate"];

/// A candidate selection strategy, evaluated against the live document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Visible-text probe over interactive elements (case-insensitive)
    Text(String),
    /// CSS selector probe
    Css(String),
    /// Catch-all probe for any `button` element
    AnyButton,
}

impl Strategy {
    /// Create a text strategy
    #[must_use]
    pub fn text(needle: impl Into<String>) -> Self {
        Self::Text(needle.into())
    }

    /// Create a CSS strategy
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Render this strategy as a JavaScript element query
    #[must_use]
    pub fn to_query(&self) -> String {
        const INTERACTIVE: &str = "button, [role=\"button\"], a, \
                                   input[type=\"button\"], input[type=\"submit\"], summary";
        match self {
            Self::Text(needle) => format!(
                "Array.from(document.querySelectorAll('{INTERACTIVE}'))\
                 .find((el) => el.textContent.toLowerCase().includes({lowered:?}))",
                lowered = needle.to_lowercase(),
            ),
            Self::Css(selector) => format!("document.querySelector({selector:?})"),
            Self::AnyButton => String::from("document.querySelector('button')"),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(needle) => write!(f, "text={needle}"),
            Self::Css(selector) => write!(f, "css={selector}"),
            Self::AnyButton => write!(f, "any-button"),
        }
    }
}

/// The fixed candidate priority order: specific text matches, then known
/// structural selectors, then the catch-all probe.
#[must_use]
pub fn default_strategies() -> Vec<Strategy> {
    vec![
        Strategy::text("Start"),
        Strategy::text("Run"),
        Strategy::text("Build Creature"),
        Strategy::text("Begin"),
        Strategy::text("Simulate"),
        Strategy::css("#btn-start-draw"),
        Strategy::css("[id*=\"start\"]"),
        Strategy::css("[id*=\"run\"]"),
        Strategy::AnyButton,
    ]
}

/// An element resolved by a single candidate probe. Transient: exists
/// only while the probing loop decides found/not-found.
#[derive(Debug, Clone)]
pub struct ProbedElement {
    /// Displayed text, if the element exposes any
    pub text: Option<String>,
}

/// The control selected by a successful locate call
#[derive(Debug, Clone)]
pub struct LocatedControl {
    /// The strategy that won
    pub strategy: Strategy,
    /// The control's displayed text
    pub text: String,
}

/// Per-candidate probe result. A `Fault` on one candidate never aborts
/// the locate call; it only disqualifies that candidate.
#[derive(Debug)]
enum ProbeOutcome {
    Matched(String),
    TextMismatch(String),
    NoElement,
    Fault(String),
}

/// Test displayed text against the action vocabulary, case-insensitively
#[must_use]
pub fn matches_action_vocabulary(text: &str) -> bool {
    let lowered = text.to_lowercase();
    ACTION_VOCABULARY.iter().any(|verb| lowered.contains(verb))
}

/// Probe the candidate strategies in priority order and return the first
/// element that both resolves and passes the vocabulary test.
///
/// Returns `None` when no candidate satisfies both conditions, even if
/// some structural selector resolved to an element with unrelated text.
pub async fn locate(page: &Page, strategies: &[Strategy]) -> Option<LocatedControl> {
    for strategy in strategies {
        let outcome = match page.probe(strategy).await {
            Ok(Some(element)) => {
                let text = element.text.unwrap_or_default();
                if matches_action_vocabulary(&text) {
                    ProbeOutcome::Matched(text)
                } else {
                    ProbeOutcome::TextMismatch(text)
                }
            }
            Ok(None) => ProbeOutcome::NoElement,
            Err(fault) => ProbeOutcome::Fault(fault.to_string()),
        };

        match outcome {
            ProbeOutcome::Matched(text) => {
                tracing::info!(strategy = %strategy, text = %text, "action control located");
                return Some(LocatedControl {
                    strategy: strategy.clone(),
                    text,
                });
            }
            ProbeOutcome::TextMismatch(text) => {
                tracing::debug!(strategy = %strategy, text = %text, "resolved element fails vocabulary test");
            }
            ProbeOutcome::NoElement => {
                tracing::trace!(strategy = %strategy, "no element for candidate");
            }
            ProbeOutcome::Fault(message) => {
                tracing::debug!(strategy = %strategy, message = %message, "candidate probe faulted");
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_is_case_insensitive() {
        assert!(matches_action_vocabulary("Start Simulation"));
        assert!(matches_action_vocabulary("RUN"));
        assert!(matches_action_vocabulary("Build Creature"));
        assert!(!matches_action_vocabulary("Settings"));
        assert!(!matches_action_vocabulary(""));
    }

    #[test]
    fn test_text_query_lowercases_needle() {
        let query = Strategy::text("Start").to_query();
        assert!(query.contains("\"start\""));
        assert!(query.contains("toLowerCase"));
    }

    #[test]
    fn test_css_query_quotes_selector() {
        let query = Strategy::css("#btn-start-draw").to_query();
        assert_eq!(query, "document.querySelector(\"#btn-start-draw\")");
    }

    #[test]
    fn test_default_strategy_order() {
        let strategies = default_strategies();
        assert_eq!(strategies.first(), Some(&Strategy::text("Start")));
        assert_eq!(strategies.last(), Some(&Strategy::AnyButton));
    }
}

#[cfg(all(test, not(feature = "browser")))]
mod mock_tests {
    use super::*;
    use crate::browser::{Browser, BrowserConfig, ScriptedElement};

    async fn page_with(elements: Vec<ScriptedElement>) -> crate::browser::Page {
        let browser = Browser::launch(BrowserConfig::default()).await.unwrap();
        browser.script_page(|script| script.elements = elements);
        browser.new_page().await.unwrap()
    }

    #[tokio::test]
    async fn test_locate_prefers_action_text_over_unrelated_buttons() {
        let page = page_with(vec![
            ScriptedElement::new("Settings").with_selector("button"),
            ScriptedElement::new("Help").with_selector("button"),
            ScriptedElement::new("Start Simulation").with_selector("button"),
        ])
        .await;

        let control = locate(&page, &default_strategies()).await.unwrap();
        assert_eq!(control.text, "Start Simulation");
        assert_eq!(control.strategy, Strategy::text("Start"));
    }

    #[tokio::test]
    async fn test_locate_rejects_document_without_action_vocabulary() {
        let page = page_with(vec![
            ScriptedElement::new("Settings").with_selector("button"),
            ScriptedElement::new("About").with_selector("button"),
        ])
        .await;

        // The catch-all button probe resolves, but its text fails the
        // vocabulary test, so the locate call reports not-found.
        assert!(locate(&page, &default_strategies()).await.is_none());
    }

    #[tokio::test]
    async fn test_locate_tie_break_follows_strategy_priority() {
        // Document order puts "Run" first; strategy order prefers "Start".
        let page = page_with(vec![
            ScriptedElement::new("Run").with_selector("button"),
            ScriptedElement::new("Start Simulation").with_selector("button"),
        ])
        .await;

        let control = locate(&page, &default_strategies()).await.unwrap();
        assert_eq!(control.text, "Start Simulation");
    }

    #[tokio::test]
    async fn test_locate_contains_single_candidate_fault() {
        let page = page_with(vec![
            ScriptedElement::new("Start Simulation")
                .with_selector("button")
                .faulty(),
            ScriptedElement::new("Run Simulation").with_selector("button"),
        ])
        .await;

        // The Text("Start") candidate faults; the Text("Run") candidate
        // still wins instead of the whole call aborting.
        let control = locate(&page, &default_strategies()).await.unwrap();
        assert_eq!(control.text, "Run Simulation");
    }

    #[tokio::test]
    async fn test_locate_falls_back_to_structural_selector() {
        // "Building..." passes the vocabulary ("build") but matches none
        // of the text probes, so the known structural selector wins.
        let page = page_with(vec![
            ScriptedElement::new("Building...").with_selector("#btn-start-draw")
        ])
        .await;

        let control = locate(&page, &default_strategies()).await.unwrap();
        assert_eq!(control.strategy, Strategy::css("#btn-start-draw"));
        assert_eq!(control.text, "Building...");
    }
}
