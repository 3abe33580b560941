//! Browser-engine seam.
//!
//! A [`BrowserLauncher`] starts one isolated browser per call; the
//! [`BrowserSession`] it returns is owned by exactly one in-flight
//! navigation and must be closed by it.
pub mod driver;
pub mod guard;
pub mod launch_args;
pub mod page;
pub mod process;

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Keys the navigation scripts press.
///
/// The code points are the WebDriver "special key" values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Tab,
    Enter,
    Escape,
    ArrowDown,
}

impl Key {
    pub fn webdriver_char(self) -> char {
        match self {
            Key::Tab => '\u{E004}',
            Key::Enter => '\u{E007}',
            Key::Escape => '\u{E00C}',
            Key::ArrowDown => '\u{E015}',
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Key::Tab => "Tab",
            Key::Enter => "Enter",
            Key::Escape => "Escape",
            Key::ArrowDown => "ArrowDown",
        };
        f.write_str(name)
    }
}

/// Settings shared by every session a launcher starts.
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub webdriver_url: String,
    pub headless: bool,
    pub window_size: (u32, u32),
    /// Upper bound for DOM-ready waits and result lookups.
    pub dom_ready_timeout: Duration,
    /// Spawn chromedriver per session instead of connecting to `webdriver_url`.
    pub chromedriver: Option<ChromedriverSpec>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: true,
            window_size: (1920, 1080),
            dom_ready_timeout: Duration::from_secs(30),
            chromedriver: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChromedriverSpec {
    pub path: PathBuf,
    /// `0` picks a free port per launch. A fixed port allows one live session at a time.
    pub port: u16,
}

/// One open browser tab driven step by step.
#[async_trait]
pub trait BrowserSession: Send {
    /// Navigate and return once the DOM has been parsed.
    async fn goto(&mut self, url: &str) -> Result<()>;

    /// Press and release `key` on whatever element has focus.
    async fn press(&mut self, key: Key) -> Result<()>;

    /// Hold `key` down without releasing it.
    async fn key_down(&mut self, key: Key) -> Result<()>;

    /// Type `text` into the focused element.
    async fn type_text(&mut self, text: &str) -> Result<()>;

    /// Block until the current document is at least interactive.
    async fn wait_dom_ready(&mut self) -> Result<()>;

    /// Click the first element matching `css`.
    ///
    /// Returns `Ok(false)` when nothing matched in time.
    async fn click_first(&mut self, css: &str) -> Result<bool>;

    async fn current_url(&mut self) -> Result<String>;

    /// Visible text of the `<body>` element.
    async fn body_text(&mut self) -> Result<String>;

    /// Tear the browser down. Consumes the session so it cannot close twice.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Starts isolated browser sessions.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>>;
}
