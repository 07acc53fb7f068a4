//! Scripts, the executor seam, and what an executed script reports back

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::a11y::{AuditReport, Violation};
use crate::error::{E2eError, E2eResult};
use crate::pages::{BoardPage, CardDetailPage, HomePage, LoginPage};
use crate::step::Step;

/// Ordered browser steps executed in one browser run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    pub label: String,
    pub steps: Vec<Step>,
    /// Overrides the configured viewport
    #[serde(default)]
    pub viewport: Option<(u32, u32)>,
}

impl Script {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            steps: Vec::new(),
            viewport: None,
        }
    }

    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = Some((width, height));
        self
    }

    pub fn push(&mut self, step: Step) -> &mut Self {
        self.steps.push(step);
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn has_audits(&self) -> bool {
        self.steps.iter().any(|s| matches!(s, Step::Audit { .. }))
    }

    pub fn home(&mut self) -> HomePage<'_> {
        HomePage::new(self)
    }

    pub fn board(&mut self) -> BoardPage<'_> {
        BoardPage::new(self)
    }

    pub fn card_detail(&mut self) -> CardDetailPage<'_> {
        CardDetailPage::new(self)
    }

    pub fn login(&mut self) -> LoginPage<'_> {
        LoginPage::new(self)
    }
}

/// Runs scripts against a browser (or pretends to)
#[async_trait]
pub trait ScriptExecutor: Send + Sync {
    /// Execute every step in order, stopping at the first failure
    async fn execute(&self, script: &Script) -> E2eResult<ScriptReport>;

    /// Forget cookies and storage carried over from earlier scripts
    async fn reset_session(&self) -> E2eResult<()>;

    /// Whether scripts really reach a browser
    fn is_live(&self) -> bool {
        true
    }
}

/// A cookie as the browser context reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserCookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
}

/// One line of output from a running script
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptEvent {
    Step {
        index: usize,
    },
    Failed {
        #[serde(default)]
        index: Option<usize>,
        error: String,
    },
    Audit {
        label: String,
        violations: Vec<Violation>,
    },
    Cookies {
        label: String,
        cookies: Vec<BrowserCookie>,
    },
    Storage {
        label: String,
        entries: BTreeMap<String, String>,
    },
    Screenshot {
        name: String,
        path: PathBuf,
    },
    Log {
        message: String,
    },
    Done,
}

/// Everything a script reported back
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptReport {
    pub label: String,
    pub steps_completed: usize,
    pub audits: Vec<AuditReport>,
    pub cookies: BTreeMap<String, Vec<BrowserCookie>>,
    pub storage: BTreeMap<String, BTreeMap<String, String>>,
    pub screenshots: BTreeMap<String, PathBuf>,
    pub duration_ms: u64,
}

impl ScriptReport {
    pub fn empty(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Fold a script's events into a report; a failure event becomes the error
    pub fn collect<I>(script: &Script, events: I) -> E2eResult<Self>
    where
        I: IntoIterator<Item = ScriptEvent>,
    {
        let mut report = Self::empty(&script.label);
        let mut finished = false;

        for event in events {
            match event {
                ScriptEvent::Step { index } => report.steps_completed = index + 1,
                ScriptEvent::Failed { index, error } => {
                    let index = index.unwrap_or(report.steps_completed);
                    let step = script
                        .steps
                        .get(index)
                        .map(Step::name)
                        .unwrap_or_else(|| "browser".to_string());
                    return Err(E2eError::StepFailed {
                        index,
                        step,
                        reason: error,
                    });
                }
                ScriptEvent::Audit { label, violations } => {
                    report.audits.push(AuditReport { label, violations });
                }
                ScriptEvent::Cookies { label, cookies } => {
                    report.cookies.insert(label, cookies);
                }
                ScriptEvent::Storage { label, entries } => {
                    report.storage.insert(label, entries);
                }
                ScriptEvent::Screenshot { name, path } => {
                    report.screenshots.insert(name, path);
                }
                ScriptEvent::Log { message } => {
                    tracing::info!("[{}] {}", script.label, message);
                }
                ScriptEvent::Done => finished = true,
            }
        }

        if !finished {
            return Err(E2eError::Playwright(format!(
                "script '{}' ended after {} of {} step(s) without reporting completion",
                script.label,
                report.steps_completed,
                script.steps.len()
            )));
        }

        Ok(report)
    }

    pub fn audit(&self, label: &str) -> Option<&AuditReport> {
        self.audits.iter().find(|a| a.label == label)
    }

    /// A cookie from the most recent capture that saw it
    pub fn cookie(&self, name: &str) -> Option<&BrowserCookie> {
        self.cookies
            .values()
            .flat_map(|cookies| cookies.iter())
            .filter(|c| c.name == name)
            .last()
    }

    pub fn cookies(&self, label: &str) -> &[BrowserCookie] {
        self.cookies.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn local_storage(&self, label: &str) -> Option<&BTreeMap<String, String>> {
        self.storage.get(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::Locator;

    fn script() -> Script {
        let mut script = Script::new("login");
        script
            .push(Step::Visit {
                path: "/login".to_string(),
            })
            .push(Step::Click {
                locator: Locator::test_id("login-submit"),
            });
        script
    }

    #[test]
    fn test_collect_reports_captures() {
        let events: Vec<ScriptEvent> = [
            r#"{"event":"step","index":0}"#,
            r#"{"event":"cookies","label":"after-login","cookies":[{"name":"auth_token","value":"abc","domain":"localhost","path":"/","httpOnly":false,"secure":false}]}"#,
            r#"{"event":"step","index":1}"#,
            r#"{"event":"done"}"#,
        ]
        .iter()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

        let report = ScriptReport::collect(&script(), events).unwrap();
        assert_eq!(report.steps_completed, 2);
        assert_eq!(report.cookie("auth_token").unwrap().value, "abc");
        assert!(report.cookie("missing").is_none());
    }

    #[test]
    fn test_failure_names_the_step() {
        let events = vec![
            ScriptEvent::Step { index: 0 },
            ScriptEvent::Failed {
                index: Some(1),
                error: "Timeout 5000ms exceeded".to_string(),
            },
        ];

        match ScriptReport::collect(&script(), events).unwrap_err() {
            E2eError::StepFailed { index, step, reason } => {
                assert_eq!(index, 1);
                assert!(step.contains("login-submit"));
                assert!(reason.contains("Timeout"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_done_is_an_error() {
        let events = vec![ScriptEvent::Step { index: 0 }];
        let err = ScriptReport::collect(&script(), events).unwrap_err();
        assert!(matches!(err, E2eError::Playwright(_)));
    }
}
