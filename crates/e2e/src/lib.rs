//! Kanban E2E Test Kit
//!
//! End-to-end, accessibility and visual tests for the kanban board
//! application, driven from Rust:
//! - Seeds state through the application's REST API ([`api`], [`fixtures`])
//! - Describes browser work as scripts built by page objects ([`pages`])
//! - Runs scripts through Playwright, or records them in a dry run
//! - Audits pages with axe-core against a known-issue allow-list ([`a11y`])
//! - Compares full-page checkpoints with baseline screenshots ([`visual`])
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    E2E Test Runner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── ServerHandle (spawn or attach, health check)         │
//! │    ├── for each Scenario:                                   │
//! │    │     ├── setup hook -> ApiClient / UserStore            │
//! │    │     ├── body -> page objects -> Script                 │
//! │    │     │            └── ScriptExecutor (Playwright | rec) │
//! │    │     └── VisualSession::close -> VisualTester::compare  │
//! │    └── classify: passed / failed / skipped / xfail / xpass  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod a11y;
pub mod api;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod pages;
pub mod playwright;
pub mod recording;
pub mod runner;
pub mod scenario;
pub mod scenarios;
pub mod script;
pub mod server;
pub mod step;
pub mod visual;

pub use api::{ApiClient, ApiResponse};
pub use config::SuiteConfig;
pub use error::{E2eError, E2eResult};
pub use recording::RecordingExecutor;
pub use runner::{Outcome, RunnerConfig, TestResult, TestRunner, TestSuiteResult};
pub use scenario::{Scenario, ScenarioContext, Setup, Status, Suite};
pub use script::{Script, ScriptExecutor, ScriptReport};
