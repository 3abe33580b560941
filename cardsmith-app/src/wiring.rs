use anyhow::{Context, Result};
use cardsmith_common::observability::{LogConfig, LogFormat};
use cardsmith_config::{
    BrowserConfig, CardsmithConfig, LlmProvider, LogFormatSetting, LoggingConfig, SiteConfig,
};
use cardsmith_drivers::browser::driver::WebDriverLauncher;
use cardsmith_drivers::browser::{BrowserSettings, ChromedriverSpec};
use cardsmith_llm::gemini::GeminiSettings;
use cardsmith_llm::traits::LlmClient;
use cardsmith_llm::{LlmConfig, ensure_llm_ready};
use cardsmith_pipeline::{Generator, NavigationScript, Navigator, Pipeline};
use std::sync::Arc;
use std::time::Duration;

pub fn log_config(logging: &LoggingConfig) -> LogConfig {
    LogConfig {
        app_name: "cardsmith",
        log_dir: logging.directory.clone(),
        emit_stderr: logging.emit_stderr,
        format: match logging.format {
            LogFormatSetting::Text => LogFormat::Text,
            LogFormatSetting::Json => LogFormat::Json,
        },
        default_filter: logging.filter.clone(),
    }
}

pub fn browser_settings(browser: &BrowserConfig) -> BrowserSettings {
    BrowserSettings {
        webdriver_url: browser.webdriver_url.clone(),
        headless: browser.headless,
        window_size: (browser.window_size[0], browser.window_size[1]),
        dom_ready_timeout: Duration::from_secs(browser.dom_ready_timeout_secs),
        chromedriver: browser.chromedriver_path.clone().map(|path| ChromedriverSpec {
            path,
            port: browser.chromedriver_port,
        }),
    }
}

pub fn navigation_script(site: &SiteConfig) -> NavigationScript {
    NavigationScript::search_site(
        &site.root_url,
        site.focus_presses,
        Duration::from_millis(site.settle_delay_ms),
        &site.result_selector,
    )
}

pub fn llm_config(cfg: &cardsmith_config::LlmConfig) -> LlmConfig {
    match cfg.provider {
        LlmProvider::Gemini => LlmConfig::Gemini(GeminiSettings {
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            api_key_env: cfg.api_key_env.clone(),
            request_timeout: Some(Duration::from_secs(cfg.request_timeout_secs)),
            temperature: cfg.temperature,
            max_output_tokens: cfg.max_output_tokens,
        }),
    }
}

/// Everything a command needs, built once from the loaded config.
pub struct Wiring {
    pub launcher: Arc<WebDriverLauncher>,
    pub llm: Arc<dyn LlmClient + Send + Sync>,
    pub pipeline: Pipeline,
}

pub fn build_from_config(cfg: &CardsmithConfig) -> Result<Wiring> {
    let launcher = Arc::new(
        WebDriverLauncher::new(browser_settings(&cfg.browser)).context("browser settings")?,
    );
    let llm = ensure_llm_ready(&llm_config(&cfg.llm)).context("model client")?;

    let navigator = Navigator::new(launcher.clone(), navigation_script(&cfg.site));
    let pipeline = Pipeline::new(navigator, Generator::new(llm.clone()));

    Ok(Wiring {
        launcher,
        llm,
        pipeline,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardsmith_config::CardsmithConfigLoader;
    use cardsmith_pipeline::NavStep;
    use std::path::PathBuf;

    #[test]
    fn default_site_matches_the_encyclopedia_protocol() {
        let script = navigation_script(&SiteConfig::default());
        assert_eq!(script.steps(), NavigationScript::encyclopedia().steps());
    }

    #[test]
    fn site_overrides_reach_the_script() {
        let cfg = CardsmithConfigLoader::new()
            .with_yaml_str(
                r#"
site:
  root_url: "https://example.org/"
  focus_presses: 1
  settle_delay_ms: 250
  result_selector: "a.hit"
"#,
            )
            .load()
            .unwrap();

        let script = navigation_script(&cfg.site);
        assert_eq!(
            script.steps()[0],
            NavStep::Goto("https://example.org/".to_string())
        );
        assert!(script.steps().contains(&NavStep::Pause(Duration::from_millis(250))));
        assert!(script.steps().contains(&NavStep::ClickFirst("a.hit".to_string())));
        assert_eq!(script.steps().len(), 8);
    }

    #[test]
    fn chromedriver_is_spawned_only_when_a_path_is_set() {
        let mut browser = BrowserConfig::default();
        assert!(browser_settings(&browser).chromedriver.is_none());

        browser.chromedriver_path = Some(PathBuf::from("/usr/bin/chromedriver"));
        browser.chromedriver_port = 9600;
        let spec = browser_settings(&browser).chromedriver.unwrap();
        assert_eq!(spec.path, PathBuf::from("/usr/bin/chromedriver"));
        assert_eq!(spec.port, 9600);
    }

    #[test]
    fn browser_timeouts_and_window_carry_over() {
        let settings = browser_settings(&BrowserConfig::default());
        assert_eq!(settings.dom_ready_timeout, Duration::from_secs(30));
        assert_eq!(settings.window_size, (1920, 1080));
        assert!(settings.headless);
    }

    #[test]
    fn gemini_settings_follow_config() {
        let mut llm = cardsmith_config::LlmConfig::default();
        llm.model = "gemini-2.5-flash".into();
        llm.request_timeout_secs = 45;

        match llm_config(&llm) {
            LlmConfig::Gemini(settings) => {
                assert_eq!(settings.model, "gemini-2.5-flash");
                assert_eq!(settings.api_key_env, "GEMINI_API_KEY");
                assert_eq!(settings.request_timeout, Some(Duration::from_secs(45)));
            }
            LlmConfig::None => panic!("expected gemini"),
        }
    }

    #[test]
    fn json_logging_maps_through() {
        let logging = LoggingConfig {
            format: LogFormatSetting::Json,
            ..LoggingConfig::default()
        };
        let log = log_config(&logging);
        assert_eq!(log.format, LogFormat::Json);
        assert_eq!(log.default_filter, "info");
    }

    #[test]
    fn wiring_builds_without_touching_the_network() {
        let wiring = build_from_config(&CardsmithConfig::default()).unwrap();
        assert_eq!(wiring.llm.model_name(), "gemini-2.5-pro");
        assert_eq!(
            wiring.launcher.settings().webdriver_url,
            "http://localhost:9515"
        );
    }
}
