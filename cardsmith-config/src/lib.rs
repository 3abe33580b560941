//! Loader for Cardsmith configuration with YAML + environment overlays.
//!
//! Sources are merged in this order, later ones winning:
//!
//! 1. built-in defaults (every field has one, so an empty config is valid)
//! 2. YAML files / inline YAML, in the order they were attached
//! 3. `CARDSMITH__`-prefixed environment variables, `__` separating levels
//!    (`CARDSMITH__BROWSER__HEADLESS=false`)
//!
//! String values may reference `${VAR}` placeholders; they are expanded
//! recursively after merging. The generative-service credential is never
//! stored here, only the name of the variable that holds it.
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "CARDSMITH";
/// File name probed by [`CardsmithConfigLoader::with_default_locations`].
pub const DEFAULT_CONFIG_FILE: &str = "cardsmith.yaml";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Source(#[from] ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CardsmithConfig {
    pub version: Option<String>,
    pub browser: BrowserConfig,
    pub site: SiteConfig,
    pub llm: LlmConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// Where and how the browser engine runs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub webdriver_url: String,
    pub headless: bool,
    /// When set, chromedriver is spawned from this path and killed on teardown.
    pub chromedriver_path: Option<PathBuf>,
    /// `0` (the default) gives each spawned chromedriver its own free port.
    pub chromedriver_port: u16,
    pub dom_ready_timeout_secs: u64,
    pub window_size: [u32; 2],
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".into(),
            headless: true,
            chromedriver_path: None,
            chromedriver_port: 0,
            dom_ready_timeout_secs: 30,
            window_size: [1920, 1080],
        }
    }
}

/// The reference site and the keystroke protocol used to reach its search box.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub root_url: String,
    pub focus_presses: usize,
    pub settle_delay_ms: u64,
    pub result_selector: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root_url: "https://www.encyclopedia.com/".into(),
            focus_presses: 3,
            settle_delay_ms: 1000,
            result_selector: "a.gs-title".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Gemini,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub endpoint: String,
    pub request_timeout_secs: u64,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Gemini,
            model: "gemini-2.5-pro".into(),
            api_key_env: "GEMINI_API_KEY".into(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".into(),
            request_timeout_secs: 180,
            temperature: None,
            max_output_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    /// Format id or name; unknown values fall back to Quizlet.
    ///
    /// Ids are numeric, so `default_format: 2` arrives as an integer from YAML
    /// or a parsed env var and is accepted as `"2"`.
    #[serde(deserialize_with = "string_or_integer")]
    pub default_format: String,
}

fn string_or_integer<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Signed(n) => n.to_string(),
        Raw::Unsigned(n) => n.to_string(),
    })
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            default_format: "quizlet".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormatSetting {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormatSetting,
    pub emit_stderr: bool,
    pub filter: String,
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormatSetting::Text,
            emit_stderr: false,
            filter: "info".into(),
            directory: None,
        }
    }
}

impl CardsmithConfig {
    /// Reject values that would make the navigation script meaningless.
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.site.root_url.trim().is_empty() {
            return Err(LoadError::Invalid("site.root_url must not be empty".into()));
        }
        if self.site.result_selector.trim().is_empty() {
            return Err(LoadError::Invalid(
                "site.result_selector must not be empty".into(),
            ));
        }
        if self.llm.model.trim().is_empty() {
            return Err(LoadError::Invalid("llm.model must not be empty".into()));
        }
        if self.llm.api_key_env.trim().is_empty() {
            return Err(LoadError::Invalid("llm.api_key_env must not be empty".into()));
        }
        if self.browser.dom_ready_timeout_secs == 0 {
            return Err(LoadError::Invalid(
                "browser.dom_ready_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct CardsmithConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for CardsmithConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CardsmithConfigLoader {
    /// Start from built-in defaults; environment overrides are applied on [`load`](Self::load).
    ///
    /// ```
    /// use cardsmith_config::CardsmithConfigLoader;
    ///
    /// let config = CardsmithConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.site.focus_presses, 3);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a file that must exist; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is merged only when present.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Probe `<config dir>/cardsmith/cardsmith.yaml`, then `./cardsmith.yaml`.
    pub fn with_default_locations(self) -> Self {
        let loader = match dirs::config_dir() {
            Some(dir) => self.with_optional_file(dir.join("cardsmith").join(DEFAULT_CONFIG_FILE)),
            None => self,
        };
        loader.with_optional_file(DEFAULT_CONFIG_FILE)
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use cardsmith_config::CardsmithConfigLoader;
    ///
    /// let cfg = CardsmithConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// site:
    ///   settle_delay_ms: 250
    /// llm:
    ///   model: "gemini-2.5-flash"
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.site.settle_delay_ms, 250);
    /// assert_eq!(cfg.site.result_selector, "a.gs-title");
    /// assert_eq!(cfg.llm.model, "gemini-2.5-flash");
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self.builder.add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// `${VAR}` placeholders are expanded before materialising typed structs.
    ///
    /// ```
    /// use cardsmith_config::CardsmithConfigLoader;
    ///
    /// unsafe { std::env::set_var("CARDSMITH_DOC_DRIVER", "http://grid:4444"); }
    ///
    /// let config = CardsmithConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// browser:
    ///   webdriver_url: "${CARDSMITH_DOC_DRIVER}"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.browser.webdriver_url, "http://grid:4444");
    ///
    /// unsafe { std::env::remove_var("CARDSMITH_DOC_DRIVER"); }
    /// ```
    pub fn load(self) -> Result<CardsmithConfig, LoadError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: CardsmithConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        typed.validate()?;

        Ok(typed)
    }
}
