use crate::page::PageData;
use crate::script::{NavStep, NavigationScript};
use crate::topic::Topic;
use cardsmith_common::{CardsmithError, Result};
use cardsmith_drivers::browser::guard::SessionGuard;
use cardsmith_drivers::browser::{BrowserLauncher, BrowserSession};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Drives one fresh browser per call through a [`NavigationScript`].
///
/// The browser is closed exactly once on every exit path: explicitly after
/// the script finishes or fails, or by the session guard if the call is
/// dropped mid-flight.
#[derive(Clone)]
pub struct Navigator {
    launcher: Arc<dyn BrowserLauncher>,
    script: NavigationScript,
}

impl Navigator {
    pub fn new(launcher: Arc<dyn BrowserLauncher>, script: NavigationScript) -> Self {
        Self { launcher, script }
    }

    pub fn script(&self) -> &NavigationScript {
        &self.script
    }

    /// Open the first search result for `topic` and capture its text.
    pub async fn fetch_subject_page(&self, topic: &Topic) -> Result<PageData> {
        info!(target: "pipeline.navigator", %topic, "launching browser");
        let session = self
            .launcher
            .launch()
            .await
            .map_err(|e| CardsmithError::navigation("launch", e))?;
        let mut guard = SessionGuard::new(session);

        let outcome = self.drive(&mut guard, topic).await;

        if let Err(e) = guard.close().await {
            warn!(target: "pipeline.navigator", error = %e, "browser teardown failed");
        }

        let page = outcome?;
        info!(
            target: "pipeline.navigator",
            url = %page.url,
            chars = page.content.chars().count(),
            "captured subject page"
        );
        Ok(page)
    }

    async fn drive(&self, guard: &mut SessionGuard, topic: &Topic) -> Result<PageData> {
        let session = guard
            .session()
            .map_err(|e| CardsmithError::navigation("session", e))?;

        for step in self.script.steps() {
            run_step(&mut *session, step, topic).await?;
        }

        let url = session
            .current_url()
            .await
            .map_err(|e| CardsmithError::navigation("capture url", e))?;
        let content = session
            .body_text()
            .await
            .map_err(|e| CardsmithError::navigation("capture body", e))?;

        Ok(PageData {
            url,
            content,
            subject: topic.clone(),
        })
    }
}

async fn run_step(session: &mut dyn BrowserSession, step: &NavStep, topic: &Topic) -> Result<()> {
    debug!(target: "pipeline.navigator", %step, "step");
    let result = match step {
        NavStep::Goto(url) => session.goto(url).await,
        NavStep::Press(key) => session.press(*key).await,
        NavStep::TypeTopic => session.type_text(topic.as_str()).await,
        NavStep::Pause(delay) => {
            tokio::time::sleep(*delay).await;
            Ok(())
        }
        NavStep::KeyDown(key) => session.key_down(*key).await,
        NavStep::WaitDomReady => session.wait_dom_ready().await,
        NavStep::ClickFirst(css) => match session.click_first(css).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                return Err(CardsmithError::NoResults {
                    topic: topic.to_string(),
                })
            }
            Err(e) => Err(e),
        },
    };
    result.map_err(|e| CardsmithError::navigation(step.to_string(), e))
}
