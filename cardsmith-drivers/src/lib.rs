//! Driver layer for browser automation.
//!
//! This crate exposes the browser-engine seam used by the navigation
//! pipeline and a WebDriver-backed implementation of it.
//!
//! - [`browser::BrowserLauncher`] / [`browser::BrowserSession`]: the seam itself
//! - [`browser::driver::WebDriverLauncher`]: launches `fantoccini` sessions
//! - [`browser::page::WebDriverSession`]: keyboard, DOM-ready and capture helpers
//! - [`browser::guard::SessionGuard`]: closes a session exactly once
pub mod browser;
