//! Scenarios and the context they run in
//!
//! A scenario is a named async body plus metadata: the suite it belongs to,
//! free-form tags, the setup hook the runner executes first, and whether it is
//! active, skipped, or expected to fail. Anything a setup hook produces is
//! handed to the body through [`ScenarioContext`].

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use kanban_common::{AuthPayload, UserStore};

use crate::a11y::{AuditPolicy, AxeConfig};
use crate::api::ApiClient;
use crate::config::SuiteConfig;
use crate::error::{E2eError, E2eResult};
use crate::script::{Script, ScriptExecutor, ScriptReport};
use crate::visual::{SessionResult, VisualSession, VisualTester};

/// Name of the cookie the application keeps its session token in
pub const AUTH_COOKIE: &str = "auth_token";

pub type ScenarioFn = for<'a> fn(&'a mut ScenarioContext) -> BoxFuture<'a, E2eResult<()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suite {
    Smoke,
    Regression,
    Accessibility,
    Auth,
    Visual,
}

impl Suite {
    pub const ALL: [Suite; 5] = [
        Suite::Smoke,
        Suite::Regression,
        Suite::Accessibility,
        Suite::Auth,
        Suite::Visual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Suite::Smoke => "smoke",
            Suite::Regression => "regression",
            Suite::Accessibility => "accessibility",
            Suite::Auth => "auth",
            Suite::Visual => "visual",
        }
    }
}

impl std::fmt::Display for Suite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Suite {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "smoke" => Ok(Suite::Smoke),
            "regression" => Ok(Suite::Regression),
            "accessibility" | "a11y" => Ok(Suite::Accessibility),
            "auth" => Ok(Suite::Auth),
            "visual" => Ok(Suite::Visual),
            other => Err(E2eError::Config(format!("unknown suite '{}'", other))),
        }
    }
}

/// State reset run before a scenario body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Setup {
    None,
    DeleteAllBoards,
    ResetDatabase,
    /// Make sure the test user exists; the browser session is already fresh
    ClearSession,
    /// Log the test user in through the login form
    LoginTestUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Status {
    Active,
    Skipped(String),
    ExpectedFailure(String),
}

pub struct Scenario {
    pub name: &'static str,
    pub suite: Suite,
    pub tags: Vec<&'static str>,
    pub setup: Setup,
    pub status: Status,
    pub run: ScenarioFn,
}

impl Scenario {
    pub fn new(suite: Suite, name: &'static str, run: ScenarioFn) -> Self {
        Self {
            name,
            suite,
            tags: Vec::new(),
            setup: Setup::None,
            status: Status::Active,
            run,
        }
    }

    pub fn setup(mut self, setup: Setup) -> Self {
        self.setup = setup;
        self
    }

    pub fn tags(mut self, tags: &[&'static str]) -> Self {
        self.tags.extend_from_slice(tags);
        self
    }

    pub fn skip(mut self, reason: &str) -> Self {
        self.status = Status::Skipped(reason.to_string());
        self
    }

    pub fn xfail(mut self, reason: &str) -> Self {
        self.status = Status::ExpectedFailure(reason.to_string());
        self
    }

    /// Tags match case-insensitively; the suite name counts as a tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.suite.as_str().eq_ignore_ascii_case(tag)
            || self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("suite", &self.suite)
            .field("tags", &self.tags)
            .field("setup", &self.setup)
            .field("status", &self.status)
            .finish()
    }
}

/// Everything a scenario body can reach
pub struct ScenarioContext {
    pub api: ApiClient,
    pub config: Arc<SuiteConfig>,
    executor: Arc<dyn ScriptExecutor>,
    visual: Arc<VisualTester>,
    name: String,
    batch: String,
    session: Option<VisualSession>,
    /// Token of the user logged in by the setup hook
    auth_token: Option<String>,
}

impl ScenarioContext {
    pub fn new(
        name: &str,
        api: ApiClient,
        config: Arc<SuiteConfig>,
        executor: Arc<dyn ScriptExecutor>,
        visual: Arc<VisualTester>,
        batch: &str,
    ) -> Self {
        Self {
            api,
            config,
            executor,
            visual,
            name: name.to_string(),
            batch: batch.to_string(),
            session: None,
            auth_token: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_live(&self) -> bool {
        self.executor.is_live()
    }

    /// An empty script labelled after this scenario
    pub fn script(&self, label: &str) -> Script {
        Script::new(format!("{} / {}", self.name, label))
    }

    /// An empty script at the visual checkpoint viewport
    pub fn visual_script(&self, label: &str) -> Script {
        self.script(label).with_viewport(
            self.config.visual.viewport_width,
            self.config.visual.viewport_height,
        )
    }

    pub async fn run(&self, script: Script) -> E2eResult<ScriptReport> {
        debug!("Executing '{}' ({} step(s))", script.label, script.steps.len());
        self.executor.execute(&script).await
    }

    /// Component audit configuration: known issues plus configured extras disabled
    pub fn component_audit(&self) -> AxeConfig {
        self.config.accessibility.component_audit()
    }

    /// Apply `policy` to the audit labelled `label` in `report`
    pub fn check_audit(
        &self,
        report: &ScriptReport,
        label: &str,
        config: &AxeConfig,
        policy: AuditPolicy,
    ) -> E2eResult<usize> {
        match report.audit(label) {
            Some(audit) => audit.evaluate(config, policy),
            None if self.is_live() => Err(E2eError::Playwright(format!(
                "audit '{}' did not report any results",
                label
            ))),
            None => Ok(0),
        }
    }

    /// Add a checkpoint to `script`, opening the visual session on first use
    pub fn checkpoint(&mut self, script: &mut Script, tag: &str) {
        let app_name = self.config.visual.app_name.clone();
        let session = self
            .session
            .get_or_insert_with(|| VisualSession::open(&app_name, &self.name, &self.batch));
        session.checkpoint(script, tag);
    }

    /// Compare the checkpoints taken so far; mismatches become errors
    pub fn close_visual(&mut self) -> E2eResult<Option<SessionResult>> {
        let Some(session) = self.session.take() else {
            return Ok(None);
        };

        let result = session.close(&self.visual, self.config.visual.fail_on_missing_baseline)?;

        if let Some(mismatch) = result.mismatches().next() {
            let diff_percent = match mismatch.outcome {
                crate::visual::CheckpointOutcome::Mismatched { diff_percent, .. } => diff_percent,
                _ => 0.0,
            };
            return Err(E2eError::ScreenshotMismatch {
                name: mismatch.name.clone(),
                diff_percent,
                threshold: self.visual.threshold(),
            });
        }

        Ok(Some(result))
    }

    /// Sign the test user up unless the application already knows them
    pub async fn ensure_test_user(&self) -> E2eResult<()> {
        let user = &self.config.test_user;

        if let Some(path) = &self.config.database_path {
            let store = UserStore::load(path)?;
            if self.api.ensure_user_exists(user, &store).await?.is_some() {
                info!("Signed up test user {}", user.email);
            }
            return Ok(());
        }

        match self.api.login(&user.email, &user.password).await {
            Ok(_) => Ok(()),
            Err(E2eError::ApiStatus { status, .. }) if (400..500).contains(&status) => {
                self.api.signup(&user.email, &user.password).await?;
                info!("Signed up test user {}", user.email);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Token from the session cookie a script captured
    pub fn session_token(&self, report: &ScriptReport) -> E2eResult<String> {
        match report.cookie(AUTH_COOKIE) {
            Some(cookie) => Ok(cookie.value.clone()),
            None if !self.is_live() => Ok("recorded-session".to_string()),
            None => Err(E2eError::AssertionFailed(format!(
                "cookie '{}' not found after login",
                AUTH_COOKIE
            ))),
        }
    }

    /// Token of the user the setup hook logged in
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    /// API client acting as the logged-in test user
    pub fn user_api(&self) -> E2eResult<ApiClient> {
        self.auth_token
            .as_deref()
            .map(|token| self.api.with_token(token))
            .ok_or_else(|| E2eError::AssertionFailed("no user is logged in".to_string()))
    }

    /// Log the test user in through the login form and keep the session token
    pub async fn login_test_user(&mut self) -> E2eResult<String> {
        let user = self.config.test_user.clone();

        let mut script = self.script("login");
        script.login().visit().login(&user.email, &user.password);
        script.home().assert_home_page_visible();
        script.push(crate::step::Step::CaptureCookies {
            label: "login".to_string(),
        });

        let report = self.run(script).await?;
        let token = self.session_token(&report)?;
        self.auth_token = Some(token.clone());
        Ok(token)
    }

    /// Log in through the API, for scenarios that only need a token
    pub async fn api_login(&self) -> E2eResult<AuthPayload> {
        let user = &self.config.test_user;
        self.api.login(&user.email, &user.password).await
    }

    /// Run a setup hook
    pub async fn prepare(&mut self, setup: Setup) -> E2eResult<()> {
        self.executor.reset_session().await?;

        match setup {
            Setup::None => {}
            Setup::DeleteAllBoards => self.api.delete_all_boards().await?,
            Setup::ResetDatabase => self.api.reset_database().await?,
            Setup::ClearSession => self.ensure_test_user().await?,
            Setup::LoginTestUser => {
                self.ensure_test_user().await?;
                self.login_test_user().await?;
            }
        }

        debug!("Setup {:?} done for '{}'", setup, self.name);
        Ok(())
    }
}

/// Fail unless the scenario's own expectation holds, with a readable message
pub fn expect_eq<T>(what: &str, actual: T, expected: T) -> E2eResult<()>
where
    T: PartialEq + std::fmt::Debug,
{
    if actual == expected {
        Ok(())
    } else {
        warn!("{}: expected {:?}, got {:?}", what, expected, actual);
        Err(E2eError::AssertionFailed(format!(
            "{}: expected {:?}, got {:?}",
            what, expected, actual
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
        Box::pin(async { Ok(()) })
    }

    #[test]
    fn test_suite_parses_aliases() {
        assert_eq!("a11y".parse::<Suite>().unwrap(), Suite::Accessibility);
        assert_eq!("Smoke".parse::<Suite>().unwrap(), Suite::Smoke);
        assert!("perf".parse::<Suite>().is_err());
    }

    #[test]
    fn test_suite_name_counts_as_tag() {
        let scenario = Scenario::new(Suite::Regression, "boundary", noop).tags(&["board"]);
        assert!(scenario.has_tag("regression"));
        assert!(scenario.has_tag("BOARD"));
        assert!(!scenario.has_tag("card"));
    }

    #[test]
    fn test_builders_set_status() {
        let skipped = Scenario::new(Suite::Auth, "remember me", noop).skip("not implemented");
        assert_eq!(skipped.status, Status::Skipped("not implemented".to_string()));

        let xfail = Scenario::new(Suite::Accessibility, "wcag", noop).xfail("contrast");
        assert!(matches!(xfail.status, Status::ExpectedFailure(_)));
    }

    #[test]
    fn test_expect_eq_reports_both_values() {
        assert!(expect_eq("count", 3, 3).is_ok());
        let err = expect_eq("count", 2, 3).unwrap_err();
        assert!(err.to_string().contains("expected 3, got 2"));
    }
}
