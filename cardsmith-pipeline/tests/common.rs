#![allow(dead_code)]
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use cardsmith_common::GenerationError;
use cardsmith_drivers::browser::{BrowserLauncher, BrowserSession, Key};
use cardsmith_llm::traits::{LlmClient, LlmResponse};
use std::sync::{Arc, Mutex};

/// Everything the fake browser saw, in order.
#[derive(Default)]
pub struct BrowserLog {
    pub launches: usize,
    pub closes: usize,
    pub actions: Vec<String>,
}

/// How the fake browser should misbehave.
#[derive(Clone, Default)]
pub struct Behaviour {
    /// Fail the first action whose rendering starts with this prefix.
    pub fail_on: Option<String>,
    pub fail_launch: bool,
    pub no_results: bool,
    pub body: String,
    pub url: String,
}

#[derive(Clone)]
pub struct FakeLauncher {
    pub log: Arc<Mutex<BrowserLog>>,
    pub behaviour: Behaviour,
}

impl FakeLauncher {
    pub fn new(behaviour: Behaviour) -> Self {
        Self {
            log: Arc::new(Mutex::new(BrowserLog::default())),
            behaviour,
        }
    }

    pub fn with_page(url: &str, body: &str) -> Self {
        Self::new(Behaviour {
            url: url.to_string(),
            body: body.to_string(),
            ..Behaviour::default()
        })
    }

    pub fn launches(&self) -> usize {
        self.log.lock().unwrap().launches
    }

    pub fn closes(&self) -> usize {
        self.log.lock().unwrap().closes
    }

    pub fn actions(&self) -> Vec<String> {
        self.log.lock().unwrap().actions.clone()
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        if self.behaviour.fail_launch {
            return Err(anyhow!("chromedriver not reachable"));
        }
        self.log.lock().unwrap().launches += 1;
        Ok(Box::new(FakeSession {
            log: self.log.clone(),
            behaviour: self.behaviour.clone(),
        }))
    }
}

pub struct FakeSession {
    log: Arc<Mutex<BrowserLog>>,
    behaviour: Behaviour,
}

impl FakeSession {
    fn record(&self, action: String) -> Result<()> {
        let failing = self
            .behaviour
            .fail_on
            .as_deref()
            .is_some_and(|prefix| action.starts_with(prefix));
        self.log.lock().unwrap().actions.push(action.clone());
        if failing {
            return Err(anyhow!("timeout during {action}"));
        }
        Ok(())
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn goto(&mut self, url: &str) -> Result<()> {
        self.record(format!("goto {url}"))
    }
    async fn press(&mut self, key: Key) -> Result<()> {
        self.record(format!("press {key}"))
    }
    async fn key_down(&mut self, key: Key) -> Result<()> {
        self.record(format!("key down {key}"))
    }
    async fn type_text(&mut self, text: &str) -> Result<()> {
        self.record(format!("type {text}"))
    }
    async fn wait_dom_ready(&mut self) -> Result<()> {
        self.record("wait dom ready".to_string())
    }
    async fn click_first(&mut self, css: &str) -> Result<bool> {
        self.record(format!("click first {css}"))?;
        Ok(!self.behaviour.no_results)
    }
    async fn current_url(&mut self) -> Result<String> {
        self.record("current url".to_string())?;
        Ok(self.behaviour.url.clone())
    }
    async fn body_text(&mut self) -> Result<String> {
        self.record("body text".to_string())?;
        Ok(self.behaviour.body.clone())
    }
    async fn close(self: Box<Self>) -> Result<()> {
        self.log.lock().unwrap().closes += 1;
        Ok(())
    }
}

/// Records prompts and answers with a canned reply.
pub struct FakeLlm {
    pub prompts: Mutex<Vec<String>>,
    pub reply: std::result::Result<String, fn() -> GenerationError>,
}

impl FakeLlm {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            prompts: Mutex::new(Vec::new()),
            reply: Ok(text.to_string()),
        })
    }

    pub fn failing(err: fn() -> GenerationError) -> Arc<Self> {
        Arc::new(Self {
            prompts: Mutex::new(Vec::new()),
            reply: Err(err),
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for FakeLlm {
    async fn generate(
        &self,
        prompt: &str,
        _system_prompt: Option<&str>,
        _max_tokens: Option<u32>,
        _temperature: Option<f32>,
    ) -> cardsmith_common::Result<LlmResponse> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Ok(text) => Ok(LlmResponse {
                text: text.clone(),
                model: Some("fake".into()),
                tokens_used: None,
                finish_reason: Some("STOP".into()),
            }),
            Err(make) => Err(make().into()),
        }
    }

    async fn health_check(&self) -> cardsmith_common::Result<bool> {
        Ok(true)
    }

    fn model_name(&self) -> &str {
        "fake"
    }
}
