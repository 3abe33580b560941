use super::launch_args::build_capabilities;
use super::page::WebDriverSession;
use super::process::ChromedriverProcess;
use super::{BrowserLauncher, BrowserSession, BrowserSettings};
use anyhow::{Context, Result};
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use tracing::info;
use url::Url;
use webdriver::capabilities::Capabilities;

/// Launches one fresh WebDriver session per call.
///
/// With [`BrowserSettings::chromedriver`] set, every launch also spawns its
/// own chromedriver, so concurrent runs never share a browser process.
#[derive(Debug, Clone)]
pub struct WebDriverLauncher {
    settings: BrowserSettings,
}

impl WebDriverLauncher {
    pub fn new(settings: BrowserSettings) -> Result<Self> {
        Url::parse(&settings.webdriver_url)
            .with_context(|| format!("invalid WebDriver URL: {}", settings.webdriver_url))?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &BrowserSettings {
        &self.settings
    }

    async fn connect(&self, endpoint: &str) -> Result<Client> {
        let caps: Capabilities = build_capabilities(&self.settings);
        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(endpoint)
            .await
            .with_context(|| format!("failed to open WebDriver session at {endpoint}"))?;
        Ok(client)
    }
}

#[async_trait]
impl BrowserLauncher for WebDriverLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        let process = match &self.settings.chromedriver {
            Some(spec) => Some(ChromedriverProcess::spawn(spec).await?),
            None => None,
        };
        let endpoint = process
            .as_ref()
            .map(ChromedriverProcess::endpoint)
            .unwrap_or_else(|| self.settings.webdriver_url.clone());

        // the child is killed on drop if the connect fails
        let client = self.connect(&endpoint).await?;
        info!(
            target: "browser.session",
            %endpoint,
            headless = self.settings.headless,
            "browser session started"
        );

        Ok(Box::new(WebDriverSession::new(
            client,
            self.settings.dom_ready_timeout,
            process,
        )))
    }
}
