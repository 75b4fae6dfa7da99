//! Browser control for the smoke-test session.
//!
//! This module wraps the Chrome DevTools Protocol via chromiumoxide when
//! compiled with the `browser` feature. Without the feature it provides a
//! scriptable mock implementation so the scenario driver and control
//! locator can be unit tested without a Chrome installation.
//!
//! The session handle is a scoped resource: the scenario driver acquires
//! it at start, owns it exclusively, and releases it unconditionally in
//! teardown regardless of which branch or fault occurred.

use crate::locator::{ProbedElement, Strategy};
use crate::recorder::EventRecorder;
use crate::result::{MirarError, MirarResult};

/// Browser configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
mod cdp {
    use super::*;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
    use chromiumoxide::cdp::js_protocol::runtime::{
        ConsoleApiCalledType, EnableParams, EventConsoleApiCalled, EventExceptionThrown,
        ExceptionDetails, RemoteObject,
    };
    use chromiumoxide::page::{Page as CdpPage, ScreenshotParams};
    use futures::StreamExt;
    use serde::Deserialize;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    use crate::recorder::ConsoleSeverity;

    /// Attribute used to remember the element the last successful probe
    /// resolved, so activation clicks exactly what the locator matched.
    const PROBE_ATTR: &str = "data-mirar-probe";

    /// Wire form of one probe evaluation
    #[derive(Debug, Deserialize)]
    struct ProbeResult {
        found: bool,
        #[serde(default)]
        text: Option<String>,
    }

    /// Browser instance with a live CDP connection
    #[derive(Debug)]
    pub struct Browser {
        config: BrowserConfig,
        inner: Arc<Mutex<CdpBrowser>>,
        #[allow(dead_code)]
        handle: tokio::task::JoinHandle<()>,
    }

    impl Browser {
        /// Launch a new browser instance
        ///
        /// # Errors
        ///
        /// Returns error if the browser cannot be launched
        pub async fn launch(config: BrowserConfig) -> MirarResult<Self> {
            let mut builder = CdpConfig::builder()
                .window_size(config.viewport_width, config.viewport_height);

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder
                .build()
                .map_err(MirarError::browser_launch)?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| MirarError::browser_launch(e.to_string()))?;

            // Drive the CDP message loop until the connection drops.
            let handle = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            Ok(Self {
                config,
                inner: Arc::new(Mutex::new(browser)),
                handle,
            })
        }

        /// Create a new page
        ///
        /// # Errors
        ///
        /// Returns error if the page cannot be created
        pub async fn new_page(&self) -> MirarResult<Page> {
            let browser = self.inner.lock().await;
            let cdp_page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| MirarError::page(e.to_string()))?;

            Ok(Page {
                url: String::from("about:blank"),
                inner: Arc::new(cdp_page),
            })
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Close the browser session
        pub async fn close(self) -> MirarResult<()> {
            let mut browser = self.inner.lock().await;
            browser
                .close()
                .await
                .map_err(|e| MirarError::browser_launch(e.to_string()))?;
            Ok(())
        }
    }

    /// A browser page with a live CDP connection
    #[derive(Debug, Clone)]
    pub struct Page {
        url: String,
        inner: Arc<CdpPage>,
    }

    impl Page {
        /// Register the event recorder on this page's console and
        /// exception streams. Must be called before navigation so events
        /// emitted during load are captured.
        ///
        /// # Errors
        ///
        /// Returns error if the CDP subscriptions cannot be established
        pub async fn attach_recorder(&self, recorder: &EventRecorder) -> MirarResult<()> {
            self.inner
                .execute(EnableParams::default())
                .await
                .map_err(|e| MirarError::page(e.to_string()))?;

            let mut console_events = self
                .inner
                .event_listener::<EventConsoleApiCalled>()
                .await
                .map_err(|e| MirarError::page(e.to_string()))?;
            let console_recorder = recorder.clone();
            tokio::spawn(async move {
                while let Some(event) = console_events.next().await {
                    console_recorder
                        .on_console(severity_of(&event.r#type), format_args_text(&event.args));
                }
            });

            let mut exceptions = self
                .inner
                .event_listener::<EventExceptionThrown>()
                .await
                .map_err(|e| MirarError::page(e.to_string()))?;
            let error_recorder = recorder.clone();
            tokio::spawn(async move {
                while let Some(event) = exceptions.next().await {
                    error_recorder.on_page_error(format_exception(&event.exception_details));
                }
            });

            Ok(())
        }

        /// Navigate to a URL and block until the load completes
        ///
        /// # Errors
        ///
        /// Returns error if navigation fails
        pub async fn goto(&mut self, url: &str) -> MirarResult<()> {
            self.inner
                .goto(url)
                .await
                .map_err(|e| MirarError::navigation(url, e.to_string()))?;
            self.inner
                .wait_for_navigation()
                .await
                .map_err(|e| MirarError::navigation(url, e.to_string()))?;
            self.url = url.to_string();
            Ok(())
        }

        /// The document title, if it can be read
        pub async fn title(&self) -> Option<String> {
            let result = self.inner.evaluate("document.title").await.ok()?;
            result.into_value::<String>().ok().filter(|t| !t.is_empty())
        }

        /// Probe the current document for the given candidate strategy.
        ///
        /// Resolves at most one element, remembers it for
        /// [`click_probed`](Self::click_probed), and returns its displayed
        /// text. `Ok(None)` means the candidate matched nothing; `Err`
        /// means this candidate's resolution faulted.
        ///
        /// # Errors
        ///
        /// Returns error if evaluation of the candidate's query faults
        pub async fn probe(&self, strategy: &Strategy) -> MirarResult<Option<ProbedElement>> {
            // Always evaluates to a JSON string so the result round-trips
            // through CDP uniformly, including the not-found case.
            let expr = format!(
                "(() => {{ \
                 document.querySelectorAll('[{attr}]').forEach((el) => el.removeAttribute('{attr}')); \
                 const el = {query}; \
                 if (!el) return JSON.stringify({{ found: false }}); \
                 el.setAttribute('{attr}', '1'); \
                 const text = el.textContent === null ? '' : el.textContent.trim(); \
                 return JSON.stringify({{ found: true, text }}); \
                 }})()",
                attr = PROBE_ATTR,
                query = strategy.to_query(),
            );

            let result = self
                .inner
                .evaluate(expr)
                .await
                .map_err(|e| MirarError::probe(e.to_string()))?;
            let raw = result
                .into_value::<String>()
                .map_err(|e| MirarError::probe(e.to_string()))?;
            let probe: ProbeResult = serde_json::from_str(&raw)?;

            Ok(probe
                .found
                .then_some(ProbedElement { text: probe.text }))
        }

        /// Click the element remembered by the last successful probe
        ///
        /// # Errors
        ///
        /// Returns error if no probed element exists or the click faults
        pub async fn click_probed(&self) -> MirarResult<()> {
            let element = self
                .inner
                .find_element(format!("[{PROBE_ATTR}]"))
                .await
                .map_err(|e| MirarError::activation(e.to_string()))?;
            element
                .click()
                .await
                .map_err(|e| MirarError::activation(e.to_string()))?;
            Ok(())
        }

        /// Take a full-page PNG screenshot
        ///
        /// # Errors
        ///
        /// Returns error if the capture fails
        pub async fn screenshot(&self) -> MirarResult<Vec<u8>> {
            self.inner
                .screenshot(
                    ScreenshotParams::builder()
                        .format(CaptureScreenshotFormat::Png)
                        .full_page(true)
                        .build(),
                )
                .await
                .map_err(|e| MirarError::screenshot(e.to_string()))
        }

        /// Get current URL
        #[must_use]
        pub fn current_url(&self) -> &str {
            &self.url
        }
    }

    fn severity_of(kind: &ConsoleApiCalledType) -> ConsoleSeverity {
        match kind {
            ConsoleApiCalledType::Error | ConsoleApiCalledType::Assert => ConsoleSeverity::Error,
            ConsoleApiCalledType::Warning => ConsoleSeverity::Warning,
            ConsoleApiCalledType::Info => ConsoleSeverity::Info,
            ConsoleApiCalledType::Debug | ConsoleApiCalledType::Trace => ConsoleSeverity::Debug,
            _ => ConsoleSeverity::Log,
        }
    }

    fn format_args_text(args: &[RemoteObject]) -> String {
        args.iter()
            .map(|arg| match (&arg.value, &arg.description) {
                (Some(serde_json::Value::String(s)), _) => s.clone(),
                (Some(value), _) => value.to_string(),
                (None, Some(description)) => description.clone(),
                (None, None) => String::new(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn format_exception(details: &ExceptionDetails) -> String {
        details
            .exception
            .as_ref()
            .and_then(|e| e.description.clone())
            .unwrap_or_else(|| details.text.clone())
    }
}

// ============================================================================
// Mock Implementation (when `browser` feature is NOT enabled)
// ============================================================================

#[cfg(not(feature = "browser"))]
mod mock {
    use super::*;
    use crate::recorder::ConsoleSeverity;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// A DOM element scripted into the mock page
    #[derive(Debug, Clone)]
    pub struct ScriptedElement {
        /// Structural selectors this element answers to
        pub selectors: Vec<String>,
        /// Displayed text
        pub text: String,
        /// Whether resolving this element faults (detached node etc.)
        pub faulty: bool,
        /// Number of activation clicks received
        pub clicks: usize,
    }

    impl ScriptedElement {
        /// Create an element with the given displayed text
        #[must_use]
        pub fn new(text: impl Into<String>) -> Self {
            Self {
                selectors: Vec::new(),
                text: text.into(),
                faulty: false,
                clicks: 0,
            }
        }

        /// Add a structural selector this element matches
        #[must_use]
        pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
            self.selectors.push(selector.into());
            self
        }

        /// Mark resolution of this element as faulting
        #[must_use]
        pub const fn faulty(mut self) -> Self {
            self.faulty = true;
            self
        }
    }

    /// Scripted behavior for the mock page, shared between the test and
    /// the pages created by the mock browser
    #[derive(Debug, Default)]
    pub struct PageScript {
        /// Fail navigation with a connection error
        pub fail_navigation: bool,
        /// Fail screenshot captures
        pub fail_screenshot: bool,
        /// Document title reported after navigation
        pub title: Option<String>,
        /// Elements present in the document
        pub elements: Vec<ScriptedElement>,
    }

    /// Browser instance backed by scripted state (mock)
    #[derive(Debug)]
    pub struct Browser {
        config: BrowserConfig,
        script: Arc<Mutex<PageScript>>,
        closed: Arc<AtomicUsize>,
    }

    impl Browser {
        /// Launch a new browser instance (mock)
        pub async fn launch(config: BrowserConfig) -> MirarResult<Self> {
            Ok(Self {
                config,
                script: Arc::new(Mutex::new(PageScript::default())),
                closed: Arc::new(AtomicUsize::new(0)),
            })
        }

        /// Mutate the scripted page state
        pub fn script_page(&self, f: impl FnOnce(&mut PageScript)) {
            if let Ok(mut script) = self.script.lock() {
                f(&mut script);
            }
        }

        /// Shared handle to the scripted page state
        #[must_use]
        pub fn script_handle(&self) -> Arc<Mutex<PageScript>> {
            Arc::clone(&self.script)
        }

        /// Counter of close calls, for teardown assertions
        #[must_use]
        pub fn close_counter(&self) -> Arc<AtomicUsize> {
            Arc::clone(&self.closed)
        }

        /// Create a new page sharing this browser's scripted state
        pub async fn new_page(&self) -> MirarResult<Page> {
            Ok(Page {
                url: String::from("about:blank"),
                script: Arc::clone(&self.script),
                recorder: Arc::new(Mutex::new(None)),
                probed: Arc::new(Mutex::new(None)),
            })
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Close the browser session (mock records the call)
        pub async fn close(self) -> MirarResult<()> {
            self.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// A browser page backed by scripted state (mock)
    #[derive(Debug, Clone)]
    pub struct Page {
        url: String,
        script: Arc<Mutex<PageScript>>,
        recorder: Arc<Mutex<Option<EventRecorder>>>,
        probed: Arc<Mutex<Option<usize>>>,
    }

    impl Page {
        /// Register the event recorder (mock stores it for scripted emits)
        pub async fn attach_recorder(&self, recorder: &EventRecorder) -> MirarResult<()> {
            if let Ok(mut slot) = self.recorder.lock() {
                *slot = Some(recorder.clone());
            }
            Ok(())
        }

        /// Emit a scripted console message through the attached recorder
        pub fn emit_console(&self, severity: ConsoleSeverity, text: impl Into<String>) {
            if let Ok(slot) = self.recorder.lock() {
                if let Some(recorder) = slot.as_ref() {
                    recorder.on_console(severity, text);
                }
            }
        }

        /// Emit a scripted page error through the attached recorder
        pub fn emit_page_error(&self, text: impl Into<String>) {
            if let Ok(slot) = self.recorder.lock() {
                if let Some(recorder) = slot.as_ref() {
                    recorder.on_page_error(text);
                }
            }
        }

        /// Navigate to a URL (honors the scripted navigation outcome)
        pub async fn goto(&mut self, url: &str) -> MirarResult<()> {
            let fails = self
                .script
                .lock()
                .map(|script| script.fail_navigation)
                .unwrap_or(false);
            if fails {
                return Err(MirarError::navigation(url, "connection refused"));
            }
            self.url = url.to_string();
            Ok(())
        }

        /// The scripted document title
        pub async fn title(&self) -> Option<String> {
            self.script.lock().ok().and_then(|script| script.title.clone())
        }

        /// Probe the scripted document for the given candidate strategy
        pub async fn probe(&self, strategy: &Strategy) -> MirarResult<Option<ProbedElement>> {
            let script = self
                .script
                .lock()
                .map_err(|_| MirarError::probe("page state unavailable"))?;

            let index = script.elements.iter().position(|el| match strategy {
                Strategy::Text(needle) => {
                    el.text.to_lowercase().contains(&needle.to_lowercase())
                }
                Strategy::Css(selector) => el.selectors.iter().any(|s| s == selector),
                Strategy::AnyButton => el.selectors.iter().any(|s| s == "button"),
            });

            let Some(index) = index else {
                return Ok(None);
            };
            let element = &script.elements[index];
            if element.faulty {
                return Err(MirarError::probe("node detached during resolution"));
            }
            if let Ok(mut probed) = self.probed.lock() {
                *probed = Some(index);
            }
            Ok(Some(ProbedElement {
                text: Some(element.text.clone()),
            }))
        }

        /// Click the element remembered by the last successful probe
        pub async fn click_probed(&self) -> MirarResult<()> {
            let index = self
                .probed
                .lock()
                .ok()
                .and_then(|probed| *probed)
                .ok_or_else(|| MirarError::activation("no probed element"))?;
            let mut script = self
                .script
                .lock()
                .map_err(|_| MirarError::activation("page state unavailable"))?;
            let element = script
                .elements
                .get_mut(index)
                .ok_or_else(|| MirarError::activation("probed element vanished"))?;
            element.clicks += 1;
            Ok(())
        }

        /// Take a screenshot (mock returns a PNG signature)
        pub async fn screenshot(&self) -> MirarResult<Vec<u8>> {
            let fails = self
                .script
                .lock()
                .map(|script| script.fail_screenshot)
                .unwrap_or(false);
            if fails {
                return Err(MirarError::screenshot("capture failed"));
            }
            Ok(vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A])
        }

        /// Get current URL
        #[must_use]
        pub fn current_url(&self) -> &str {
            &self.url
        }
    }
}

// Re-export based on feature
#[cfg(feature = "browser")]
pub use cdp::{Browser, Page};

#[cfg(not(feature = "browser"))]
pub use mock::{Browser, Page, PageScript, ScriptedElement};
