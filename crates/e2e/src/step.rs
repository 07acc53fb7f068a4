//! Browser steps and element locators
//!
//! A step is one interaction or one assertion. Assertions are executed with
//! the automation engine's own wait-until-timeout semantics; nothing here
//! retries.

use serde::{Deserialize, Serialize};

use crate::a11y::AxeConfig;

/// Attribute the application puts on every element the tests touch
pub const TEST_ID_ATTRIBUTE: &str = "data-cy";

/// CSS selector for a test identifier
pub fn test_id_selector(test_id: &str) -> String {
    format!(r#"[{}="{}"]"#, TEST_ID_ATTRIBUTE, test_id)
}

/// What a locator resolves against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
    Css { selector: String },
    /// Any element whose text matches the pattern, case-insensitively
    Text { pattern: String },
}

/// Which of the matched elements to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pick {
    First,
    Last,
    Nth(usize),
}

/// An element lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    pub target: Target,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pick: Option<Pick>,
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            target: Target::Css {
                selector: selector.into(),
            },
            has_text: None,
            pick: None,
        }
    }

    pub fn test_id(test_id: &str) -> Self {
        Self::css(test_id_selector(test_id))
    }

    pub fn text_matching(pattern: impl Into<String>) -> Self {
        Self {
            target: Target::Text {
                pattern: pattern.into(),
            },
            has_text: None,
            pick: None,
        }
    }

    /// Keep only elements containing `text`
    pub fn containing(mut self, text: impl Into<String>) -> Self {
        self.has_text = Some(text.into());
        self
    }

    pub fn first(mut self) -> Self {
        self.pick = Some(Pick::First);
        self
    }

    pub fn last(mut self) -> Self {
        self.pick = Some(Pick::Last);
        self
    }

    pub fn nth(mut self, index: usize) -> Self {
        self.pick = Some(Pick::Nth(index));
        self
    }

    /// Short human-readable form for logs and step names
    pub fn describe(&self) -> String {
        let mut out = match &self.target {
            Target::Css { selector } => selector.clone(),
            Target::Text { pattern } => format!("text=/{}/i", pattern),
        };
        if let Some(text) = &self.has_text {
            out.push_str(&format!(" >> has-text {:?}", text));
        }
        match self.pick {
            Some(Pick::First) => out.push_str(" >> first"),
            Some(Pick::Last) => out.push_str(" >> last"),
            Some(Pick::Nth(i)) => out.push_str(&format!(" >> nth={}", i)),
            None => {}
        }
        out
    }
}

/// How a URL assertion matches the current page URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "match", content = "value", rename_all = "snake_case")]
pub enum UrlMatch {
    /// URL contains the fragment
    Includes(String),
    /// URL does not contain the fragment
    Excludes(String),
    /// URL is exactly the base URL followed by this path
    Path(String),
    /// URL matches a regular expression
    Pattern(String),
}

/// A single step of a browser script
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Navigate to a path relative to the base URL
    Visit { path: String },

    Reload,

    Click { locator: Locator },

    /// Click only when the element is currently visible
    ClickIfVisible { locator: Locator },

    /// Type text key by key into an element
    Type { locator: Locator, text: String },

    /// Press a key, on an element or on the page
    Press {
        #[serde(default)]
        locator: Option<Locator>,
        key: String,
    },

    Clear { locator: Locator },

    Blur { locator: Locator },

    Focus { locator: Locator },

    /// Fixed pause (use sparingly)
    Wait { ms: u64 },

    ClearCookies,

    ClearLocalStorage,

    SetCookie { name: String, value: String },

    /// Report the context's cookies back to the scenario
    CaptureCookies { label: String },

    /// Report the page's local storage back to the scenario
    CaptureLocalStorage { label: String },

    AssertVisible { locator: Locator },

    AssertHidden { locator: Locator },

    /// Element is in the DOM, visible or not
    AssertAttached { locator: Locator },

    /// No element matches
    AssertAbsent { locator: Locator },

    AssertValue { locator: Locator, value: String },

    AssertContainsText { locator: Locator, text: String },

    AssertCount { locator: Locator, count: usize },

    AssertMinCount { locator: Locator, min: usize },

    AssertClass { locator: Locator, class: String },

    AssertChecked { locator: Locator, checked: bool },

    AssertAttribute {
        locator: Locator,
        name: String,
        #[serde(default)]
        value: Option<String>,
    },

    /// The `value` of at least one matched input equals the given value
    AssertValuesInclude { locator: Locator, value: String },

    AssertUrl { matcher: UrlMatch },

    AssertCookie { name: String, present: bool },

    /// Whatever element has focus is visible
    AssertFocusedVisible,

    /// Screenshot compared later against a visual baseline
    Checkpoint { name: String, full_page: bool },

    /// Run an axe-core audit and report its violations back
    Audit { label: String, config: AxeConfig },

    Log { message: String },
}

impl Step {
    /// Name used in logs and failure reports
    pub fn name(&self) -> String {
        match self {
            Step::Visit { path } => format!("visit:{}", path),
            Step::Reload => "reload".to_string(),
            Step::Click { locator } => format!("click:{}", locator.describe()),
            Step::ClickIfVisible { locator } => format!("click-if-visible:{}", locator.describe()),
            Step::Type { locator, .. } => format!("type:{}", locator.describe()),
            Step::Press { key, .. } => format!("press:{}", key),
            Step::Clear { locator } => format!("clear:{}", locator.describe()),
            Step::Blur { locator } => format!("blur:{}", locator.describe()),
            Step::Focus { locator } => format!("focus:{}", locator.describe()),
            Step::Wait { ms } => format!("wait:{}ms", ms),
            Step::ClearCookies => "clear-cookies".to_string(),
            Step::ClearLocalStorage => "clear-local-storage".to_string(),
            Step::SetCookie { name, .. } => format!("set-cookie:{}", name),
            Step::CaptureCookies { label } => format!("capture-cookies:{}", label),
            Step::CaptureLocalStorage { label } => format!("capture-local-storage:{}", label),
            Step::AssertVisible { locator } => format!("assert-visible:{}", locator.describe()),
            Step::AssertHidden { locator } => format!("assert-hidden:{}", locator.describe()),
            Step::AssertAttached { locator } => format!("assert-attached:{}", locator.describe()),
            Step::AssertAbsent { locator } => format!("assert-absent:{}", locator.describe()),
            Step::AssertValue { locator, .. } => format!("assert-value:{}", locator.describe()),
            Step::AssertContainsText { locator, .. } => {
                format!("assert-text:{}", locator.describe())
            }
            Step::AssertCount { locator, count } => {
                format!("assert-count:{}={}", locator.describe(), count)
            }
            Step::AssertMinCount { locator, min } => {
                format!("assert-count:{}>={}", locator.describe(), min)
            }
            Step::AssertClass { locator, class } => {
                format!("assert-class:{}.{}", locator.describe(), class)
            }
            Step::AssertChecked { locator, checked } => {
                format!("assert-checked:{}={}", locator.describe(), checked)
            }
            Step::AssertAttribute { locator, name, .. } => {
                format!("assert-attribute:{}[{}]", locator.describe(), name)
            }
            Step::AssertValuesInclude { locator, .. } => {
                format!("assert-values-include:{}", locator.describe())
            }
            Step::AssertUrl { matcher } => format!("assert-url:{:?}", matcher),
            Step::AssertCookie { name, present } => format!("assert-cookie:{}={}", name, present),
            Step::AssertFocusedVisible => "assert-focused-visible".to_string(),
            Step::Checkpoint { name, .. } => format!("checkpoint:{}", name),
            Step::Audit { label, .. } => format!("audit:{}", label),
            Step::Log { message } => {
                let end = message
                    .char_indices()
                    .nth(30)
                    .map(|(i, _)| i)
                    .unwrap_or(message.len());
                format!("log:{}", &message[..end])
            }
        }
    }

    /// Whether the step only observes the page
    pub fn is_assertion(&self) -> bool {
        matches!(
            self,
            Step::AssertVisible { .. }
                | Step::AssertHidden { .. }
                | Step::AssertAttached { .. }
                | Step::AssertAbsent { .. }
                | Step::AssertValue { .. }
                | Step::AssertContainsText { .. }
                | Step::AssertCount { .. }
                | Step::AssertMinCount { .. }
                | Step::AssertClass { .. }
                | Step::AssertChecked { .. }
                | Step::AssertAttribute { .. }
                | Step::AssertValuesInclude { .. }
                | Step::AssertUrl { .. }
                | Step::AssertCookie { .. }
                | Step::AssertFocusedVisible
        )
    }
}
