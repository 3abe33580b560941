use super::BrowserSettings;
use serde_json::{json, Map, Value};

/// Construct Chrome command-line arguments for a session.
pub fn build_chrome_arguments(settings: &BrowserSettings) -> Vec<String> {
    let mut args = vec![
        "--disable-dev-shm-usage".to_string(),
        "--no-sandbox".to_string(),
        "--disable-extensions".to_string(),
        format!(
            "--window-size={},{}",
            settings.window_size.0, settings.window_size.1
        ),
        "--lang=en-US".to_string(),
    ];
    if settings.headless {
        args.push("--headless=new".to_string());
        args.push("--disable-gpu".to_string());
    }
    args
}

/// W3C capabilities for a Chrome session.
///
/// `pageLoadStrategy: eager` makes navigation return at DOMContentLoaded
/// instead of waiting for every subresource.
pub fn build_capabilities(settings: &BrowserSettings) -> Map<String, Value> {
    let mut caps = Map::new();
    caps.insert("browserName".to_string(), json!("chrome"));
    caps.insert("pageLoadStrategy".to_string(), json!("eager"));
    caps.insert(
        "goog:chromeOptions".to_string(),
        json!({ "args": build_chrome_arguments(settings) }),
    );
    caps
}
