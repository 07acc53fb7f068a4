//! Test runner: attaches to the application, runs scenarios one at a time and
//! classifies each outcome

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::api::ApiClient;
use crate::config::SuiteConfig;
use crate::error::{E2eError, E2eResult};
use crate::playwright::PlaywrightHandle;
use crate::recording::RecordingExecutor;
use crate::scenario::{Scenario, ScenarioContext, Status, Suite};
use crate::scenarios;
use crate::script::ScriptExecutor;
use crate::server::ServerHandle;
use crate::visual::{CheckpointResult, SessionResult, VisualTester};

/// How a scenario ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Passed,
    Failed,
    Skipped,
    /// Expected failure that failed
    XFail,
    /// Expected failure that passed
    XPass,
}

impl Outcome {
    pub fn symbol(&self) -> &'static str {
        match self {
            Outcome::Passed => "✓",
            Outcome::Failed => "✗",
            Outcome::Skipped => "○",
            Outcome::XFail => "x",
            Outcome::XPass => "!",
        }
    }
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub suite: Suite,
    pub tags: Vec<String>,
    pub outcome: Outcome,
    pub duration_ms: u64,
    /// Skip or expected-failure reason
    pub reason: Option<String>,
    pub error: Option<String>,
    pub checkpoints: Vec<CheckpointResult>,
}

impl TestResult {
    fn new(scenario: &Scenario, outcome: Outcome) -> Self {
        Self {
            name: scenario.name.to_string(),
            suite: scenario.suite,
            tags: scenario.tags.iter().map(|t| t.to_string()).collect(),
            outcome,
            duration_ms: 0,
            reason: None,
            error: None,
            checkpoints: Vec::new(),
        }
    }
}

/// Result of running a set of scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total: usize,
    /// Includes unexpected passes
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub xfailed: usize,
    pub xpassed: usize,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

impl TestSuiteResult {
    pub fn from_results(
        started_at: DateTime<Utc>,
        duration_ms: u64,
        results: Vec<TestResult>,
    ) -> Self {
        let count = |outcome: Outcome| results.iter().filter(|r| r.outcome == outcome).count();
        let xpassed = count(Outcome::XPass);

        Self {
            started_at,
            finished_at: Utc::now(),
            total: results.len(),
            passed: count(Outcome::Passed) + xpassed,
            failed: count(Outcome::Failed),
            skipped: count(Outcome::Skipped),
            xfailed: count(Outcome::XFail),
            xpassed,
            duration_ms,
            results,
        }
    }

    pub fn success(&self) -> bool {
        self.failed == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|r| r.outcome == Outcome::Failed)
    }
}

/// Configuration for the test runner
#[derive(Debug, Clone, Default)]
pub struct RunnerConfig {
    pub suite: SuiteConfig,

    /// Record scripts instead of driving a browser
    pub dry_run: bool,

    /// Accept every captured screenshot as the new baseline
    pub update_baselines: bool,
}

/// Main E2E test runner
pub struct TestRunner {
    config: Arc<SuiteConfig>,

    /// Browser driver; created on first use unless injected
    executor: Option<Arc<dyn ScriptExecutor>>,

    visual: Arc<VisualTester>,

    /// Running (or attached) application, if any
    server: Option<ServerHandle>,

    batch: String,

    update_baselines: bool,
}

impl TestRunner {
    /// Create a runner; dry runs record scripts instead of executing them
    pub fn new(config: RunnerConfig) -> E2eResult<Self> {
        let executor: Option<Arc<dyn ScriptExecutor>> = if config.dry_run {
            Some(Arc::new(RecordingExecutor::new()))
        } else {
            None
        };
        Self::build(config, executor)
    }

    /// Create a runner that sends every script to `executor`
    pub fn with_executor(
        config: RunnerConfig,
        executor: Arc<dyn ScriptExecutor>,
    ) -> E2eResult<Self> {
        Self::build(config, Some(executor))
    }

    fn build(config: RunnerConfig, executor: Option<Arc<dyn ScriptExecutor>>) -> E2eResult<Self> {
        let mut suite = config.suite;
        suite.validate()?;
        if config.update_baselines {
            suite.visual.auto_update = true;
        }

        let visual = VisualTester::new(&suite.visual)?;
        visual.clear_run_artifacts()?;
        let batch = suite.visual.batch();

        Ok(Self {
            config: Arc::new(suite),
            executor,
            visual: Arc::new(visual),
            server: None,
            batch,
            update_baselines: config.update_baselines,
        })
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Start (or attach to) the application
    pub async fn start_server(&mut self) -> E2eResult<()> {
        if self.server.is_some() {
            return Ok(());
        }

        let server = ServerHandle::spawn(&self.config.server, &self.config.base_url).await?;
        self.server = Some(server);
        Ok(())
    }

    /// Stop the application if this runner launched it
    pub fn stop_server(&mut self) -> E2eResult<()> {
        if let Some(mut server) = self.server.take() {
            server.stop()?;
        }
        Ok(())
    }

    fn base_url(&self) -> &str {
        self.server
            .as_ref()
            .map(|s| s.base_url())
            .unwrap_or_else(|| self.config.origin())
    }

    fn executor(&mut self) -> E2eResult<Arc<dyn ScriptExecutor>> {
        if let Some(executor) = &self.executor {
            return Ok(executor.clone());
        }

        let handle = PlaywrightHandle::new(
            self.config.browser.clone(),
            self.base_url(),
            &self.config.visual.actual_dir,
        )?;
        let executor: Arc<dyn ScriptExecutor> = Arc::new(handle);
        self.executor = Some(executor.clone());
        Ok(executor)
    }

    /// Run every registered scenario
    pub async fn run_all(&mut self) -> E2eResult<TestSuiteResult> {
        self.run_scenarios(scenarios::all()).await
    }

    /// Run the scenarios of one suite
    pub async fn run_suite(&mut self, suite: Suite) -> E2eResult<TestSuiteResult> {
        self.run_scenarios(scenarios::by_suite(suite)).await
    }

    /// Run scenarios matching a tag
    pub async fn run_tagged(&mut self, tag: &str) -> E2eResult<TestSuiteResult> {
        self.run_scenarios(scenarios::by_tag(tag)).await
    }

    /// Run a specific scenario by name
    pub async fn run_test(&mut self, name: &str) -> E2eResult<TestResult> {
        let scenario =
            scenarios::find(name).ok_or_else(|| E2eError::ScenarioNotFound(name.to_string()))?;

        self.start_server().await?;
        let executor = self.executor()?;
        let api = ApiClient::new(self.base_url())?;
        Ok(self.run_scenario(&scenario, &api, executor).await)
    }

    /// Run a list of scenarios; a failing scenario never stops the rest
    pub async fn run_scenarios(&mut self, scenarios: Vec<Scenario>) -> E2eResult<TestSuiteResult> {
        let started_at = Utc::now();
        let start = Instant::now();

        self.start_server().await?;
        let executor = self.executor()?;
        let api = ApiClient::new(self.base_url())?;

        info!("Running {} scenario(s)...", scenarios.len());

        let mut results = Vec::with_capacity(scenarios.len());
        for scenario in &scenarios {
            results.push(self.run_scenario(scenario, &api, executor.clone()).await);
        }

        let summary =
            TestSuiteResult::from_results(started_at, start.elapsed().as_millis() as u64, results);

        info!("");
        info!(
            "Test Results: {} passed, {} failed, {} skipped, {} xfail, {} xpass ({} ms)",
            summary.passed,
            summary.failed,
            summary.skipped,
            summary.xfailed,
            summary.xpassed,
            summary.duration_ms
        );

        if self.update_baselines {
            let updated = self.update_baselines()?;
            info!("Updated {} baseline(s)", updated);
        }

        Ok(summary)
    }

    /// Run one scenario: setup hook, body, visual comparison, classification
    pub async fn run_scenario(
        &self,
        scenario: &Scenario,
        api: &ApiClient,
        executor: Arc<dyn ScriptExecutor>,
    ) -> TestResult {
        if let Status::Skipped(reason) = &scenario.status {
            info!("{} {} (skipped: {})", Outcome::Skipped.symbol(), scenario.name, reason);
            let mut result = TestResult::new(scenario, Outcome::Skipped);
            result.reason = Some(reason.clone());
            return result;
        }

        debug!("Running scenario: {}", scenario.name);
        let start = Instant::now();

        let mut ctx = ScenarioContext::new(
            scenario.name,
            api.clone(),
            self.config.clone(),
            executor,
            self.visual.clone(),
            &self.batch,
        );

        let run = run_body(scenario, &mut ctx).await;

        let (outcome, error, checkpoints) = match (&scenario.status, run) {
            (Status::ExpectedFailure(_), Err(e)) => (Outcome::XFail, Some(e.to_string()), vec![]),
            (Status::ExpectedFailure(_), Ok(session)) => (
                Outcome::XPass,
                None,
                session.map(|s| s.checkpoints).unwrap_or_default(),
            ),
            (_, Ok(session)) => (
                Outcome::Passed,
                None,
                session.map(|s| s.checkpoints).unwrap_or_default(),
            ),
            (_, Err(e)) => (Outcome::Failed, Some(e.to_string()), vec![]),
        };

        let mut result = TestResult::new(scenario, outcome);
        result.duration_ms = start.elapsed().as_millis() as u64;
        result.error = error;
        result.checkpoints = checkpoints;
        if let Status::ExpectedFailure(reason) = &scenario.status {
            result.reason = Some(reason.clone());
        }

        let symbol = outcome.symbol();
        match outcome {
            Outcome::Passed => info!("{} {} ({} ms)", symbol, result.name, result.duration_ms),
            Outcome::XFail => info!(
                "{} {} (expected failure: {})",
                symbol,
                result.name,
                result.reason.as_deref().unwrap_or_default()
            ),
            Outcome::XPass => warn!(
                "{} {} passed but is marked as an expected failure: {}",
                symbol,
                result.name,
                result.reason.as_deref().unwrap_or_default()
            ),
            Outcome::Failed => error!(
                "{} {} - {}",
                symbol,
                result.name,
                result.error.as_deref().unwrap_or("unknown error")
            ),
            Outcome::Skipped => {}
        }

        result
    }

    /// Copy every captured screenshot over its baseline
    pub fn update_baselines(&self) -> E2eResult<usize> {
        self.visual.update_all_baselines()
    }

    /// Write results as JSON; defaults to `<output_dir>/test-results.json`
    pub fn write_results(
        &self,
        results: &TestSuiteResult,
        path: Option<PathBuf>,
    ) -> E2eResult<PathBuf> {
        let path = path.unwrap_or_else(|| self.config.output_dir.join("test-results.json"));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

async fn run_body(
    scenario: &Scenario,
    ctx: &mut ScenarioContext,
) -> E2eResult<Option<SessionResult>> {
    ctx.prepare(scenario.setup).await?;
    (scenario.run)(ctx).await?;
    ctx.close_visual()
}

impl Drop for TestRunner {
    fn drop(&mut self) {
        let _ = self.stop_server();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Setup;
    use futures::future::BoxFuture;

    fn passing(_: &mut ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn failing(_: &mut ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
        Box::pin(async { Err(E2eError::AssertionFailed("nope".to_string())) })
    }

    fn runner(root: &std::path::Path) -> TestRunner {
        let mut suite = SuiteConfig::default();
        suite.visual.baseline_dir = root.join("baselines");
        suite.visual.actual_dir = root.join("actual");
        suite.visual.diff_dir = root.join("diffs");
        suite.output_dir = root.join("out");
        TestRunner::new(RunnerConfig {
            suite,
            dry_run: true,
            update_baselines: false,
        })
        .unwrap()
    }

    async fn run(runner: &TestRunner, scenario: Scenario) -> TestResult {
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();
        let executor: Arc<dyn ScriptExecutor> = Arc::new(RecordingExecutor::new());
        runner.run_scenario(&scenario, &api, executor).await
    }

    #[tokio::test]
    async fn test_outcome_classification() {
        let dir = tempfile::tempdir().unwrap();
        let runner = runner(dir.path());

        let passed = run(&runner, Scenario::new(Suite::Smoke, "smoke::ok", passing)).await;
        assert_eq!(passed.outcome, Outcome::Passed);

        let failed = run(&runner, Scenario::new(Suite::Smoke, "smoke::bad", failing)).await;
        assert_eq!(failed.outcome, Outcome::Failed);
        assert!(failed.error.unwrap().contains("nope"));

        let xfail =
            Scenario::new(Suite::Accessibility, "accessibility::x", failing).xfail("contrast");
        let xfail = run(&runner, xfail).await;
        assert_eq!(xfail.outcome, Outcome::XFail);
        assert_eq!(xfail.reason.as_deref(), Some("contrast"));

        let xpass =
            Scenario::new(Suite::Accessibility, "accessibility::y", passing).xfail("contrast");
        assert_eq!(run(&runner, xpass).await.outcome, Outcome::XPass);
    }

    #[tokio::test]
    async fn test_skipped_scenario_never_runs_setup() {
        let dir = tempfile::tempdir().unwrap();
        let runner = runner(dir.path());

        // The API is unreachable, so running the setup hook would fail
        let scenario = Scenario::new(Suite::Auth, "auth::later", failing)
            .setup(Setup::DeleteAllBoards)
            .skip("not implemented");
        let result = run(&runner, scenario).await;

        assert_eq!(result.outcome, Outcome::Skipped);
        assert_eq!(result.reason.as_deref(), Some("not implemented"));
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_setup_failure_fails_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let runner = runner(dir.path());

        let scenario =
            Scenario::new(Suite::Smoke, "smoke::needs_api", passing).setup(Setup::DeleteAllBoards);
        assert_eq!(run(&runner, scenario).await.outcome, Outcome::Failed);
    }

    #[test]
    fn test_summary_counts_xpass_as_passed() {
        let ok = Scenario::new(Suite::Smoke, "smoke::a", passing);
        let results = vec![
            TestResult::new(&ok, Outcome::Passed),
            TestResult::new(&ok, Outcome::XPass),
            TestResult::new(&ok, Outcome::XFail),
            TestResult::new(&ok, Outcome::Skipped),
        ];

        let summary = TestSuiteResult::from_results(Utc::now(), 5, results);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.xpassed, 1);
        assert_eq!(summary.xfailed, 1);
        assert_eq!(summary.skipped, 1);
        assert!(summary.success());
    }

    #[test]
    fn test_write_results() {
        let dir = tempfile::tempdir().unwrap();
        let runner = runner(dir.path());
        let summary = TestSuiteResult::from_results(Utc::now(), 0, vec![]);

        let path = runner.write_results(&summary, None).unwrap();
        assert_eq!(path, dir.path().join("out").join("test-results.json"));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["total"], 0);
        assert!(json["started_at"].is_string());
    }
}
