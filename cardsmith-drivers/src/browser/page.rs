use super::process::ChromedriverProcess;
use super::{BrowserSession, Key};
use anyhow::{bail, Result};
use async_trait::async_trait;
use fantoccini::actions::{InputSource, KeyAction, KeyActions};
use fantoccini::error::CmdError;
use fantoccini::{Client, Locator};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

const READY_POLL: Duration = Duration::from_millis(100);
const READY_STATE_SCRIPT: &str = "return document.readyState";

/// A single WebDriver session (one tab) implementing [`BrowserSession`].
pub struct WebDriverSession {
    pub(crate) client: Client,
    pub(crate) dom_ready_timeout: Duration,
    pub(crate) chromedriver: Option<ChromedriverProcess>,
}

impl WebDriverSession {
    pub fn new(
        client: Client,
        dom_ready_timeout: Duration,
        chromedriver: Option<ChromedriverProcess>,
    ) -> Self {
        Self {
            client,
            dom_ready_timeout,
            chromedriver,
        }
    }

    async fn send_key_actions(&self, actions: KeyActions) -> Result<()> {
        self.client.perform_actions(actions).await?;
        Ok(())
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn goto(&mut self, url: &str) -> Result<()> {
        // `pageLoadStrategy: eager` returns at DOMContentLoaded
        self.client.goto(url).await?;
        debug!(target: "browser.session", %url, "navigated");
        Ok(())
    }

    async fn press(&mut self, key: Key) -> Result<()> {
        let value = key.webdriver_char();
        let actions = KeyActions::new("keyboard".to_string())
            .then(KeyAction::Down { value })
            .then(KeyAction::Up { value });
        self.send_key_actions(actions).await
    }

    async fn key_down(&mut self, key: Key) -> Result<()> {
        let actions = KeyActions::new("keyboard".to_string()).then(KeyAction::Down {
            value: key.webdriver_char(),
        });
        self.send_key_actions(actions).await
    }

    async fn type_text(&mut self, text: &str) -> Result<()> {
        let focused = self.client.active_element().await?;
        focused.send_keys(text).await?;
        Ok(())
    }

    async fn wait_dom_ready(&mut self) -> Result<()> {
        let deadline = Instant::now() + self.dom_ready_timeout;
        loop {
            let state = self.client.execute(READY_STATE_SCRIPT, vec![]).await?;
            if matches!(state.as_str(), Some("interactive") | Some("complete")) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                bail!("document not ready after {:?}", self.dom_ready_timeout);
            }
            sleep(READY_POLL).await;
        }
    }

    async fn click_first(&mut self, css: &str) -> Result<bool> {
        let found = self
            .client
            .wait()
            .at_most(self.dom_ready_timeout)
            .for_element(Locator::Css(css))
            .await;

        let element = match found {
            Ok(element) => element,
            Err(CmdError::WaitTimeout) => {
                info!(target: "browser.session", selector = %css, "no element matched");
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };
        element.click().await?;
        Ok(true)
    }

    async fn current_url(&mut self) -> Result<String> {
        let url = self.client.current_url().await?;
        Ok(url.to_string())
    }

    async fn body_text(&mut self) -> Result<String> {
        let body = self.client.find(Locator::Css("body")).await?;
        Ok(body.text().await?)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let WebDriverSession {
            client,
            chromedriver,
            ..
        } = *self;

        let closed = client.close().await.map_err(anyhow::Error::from);
        if let Some(process) = chromedriver {
            process.shutdown().await?;
        }
        closed?;
        debug!(target: "browser.session", "session closed");
        Ok(())
    }
}
