//! The keystroke protocol used to reach a topic's article.
//!
//! The reference site offers no stable selector for its search box, so the
//! script tabs into it. Keeping the sequence as data lets it be swapped when
//! the site changes without touching prompt construction.
use cardsmith_drivers::browser::Key;
use std::fmt;
use std::time::Duration;

pub const ENCYCLOPEDIA_ROOT: &str = "https://www.encyclopedia.com/";
/// CSS marking search-result titles on the reference site.
pub const RESULT_TITLE_SELECTOR: &str = "a.gs-title";
pub const FOCUS_PRESSES: usize = 3;
pub const SETTLE_DELAY: Duration = Duration::from_millis(1000);

/// One browser action, executed strictly after the previous one finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavStep {
    /// Navigate and wait for DOM-ready.
    Goto(String),
    Press(Key),
    /// Type the topic into whatever has focus.
    TypeTopic,
    Pause(Duration),
    KeyDown(Key),
    WaitDomReady,
    /// Click the first match; no match means the topic has no results.
    ClickFirst(String),
}

impl fmt::Display for NavStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavStep::Goto(url) => write!(f, "goto {url}"),
            NavStep::Press(key) => write!(f, "press {key}"),
            NavStep::TypeTopic => f.write_str("type topic"),
            NavStep::Pause(d) => write!(f, "pause {}ms", d.as_millis()),
            NavStep::KeyDown(key) => write!(f, "key down {key}"),
            NavStep::WaitDomReady => f.write_str("wait dom ready"),
            NavStep::ClickFirst(css) => write!(f, "click first {css}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationScript {
    steps: Vec<NavStep>,
}

impl NavigationScript {
    pub fn new(steps: Vec<NavStep>) -> Self {
        Self { steps }
    }

    /// Tab into a site's search box, search, and open the first result.
    pub fn search_site(
        root_url: &str,
        focus_presses: usize,
        settle_delay: Duration,
        result_selector: &str,
    ) -> Self {
        let mut steps = vec![NavStep::Goto(root_url.to_string())];
        steps.extend(std::iter::repeat(NavStep::Press(Key::Tab)).take(focus_presses));
        steps.extend([
            NavStep::TypeTopic,
            NavStep::Pause(settle_delay),
            NavStep::KeyDown(Key::Enter),
            NavStep::WaitDomReady,
            NavStep::ClickFirst(result_selector.to_string()),
            NavStep::WaitDomReady,
        ]);
        Self { steps }
    }

    /// The protocol for encyclopedia.com.
    ///
    /// ```
    /// use cardsmith_pipeline::{NavStep, NavigationScript};
    ///
    /// let script = NavigationScript::encyclopedia();
    /// assert_eq!(script.steps().len(), 10);
    /// assert_eq!(script.steps()[4], NavStep::TypeTopic);
    /// ```
    pub fn encyclopedia() -> Self {
        Self::search_site(
            ENCYCLOPEDIA_ROOT,
            FOCUS_PRESSES,
            SETTLE_DELAY,
            RESULT_TITLE_SELECTOR,
        )
    }

    pub fn steps(&self) -> &[NavStep] {
        &self.steps
    }
}

impl Default for NavigationScript {
    fn default() -> Self {
        Self::encyclopedia()
    }
}
