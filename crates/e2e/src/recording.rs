//! Executor that records scripts instead of running them
//!
//! Used by `--dry-run` and by tests that check which steps a scenario would
//! send to the browser.

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::E2eResult;
use crate::script::{Script, ScriptExecutor, ScriptReport};

#[derive(Debug, Default)]
pub struct RecordingExecutor {
    scripts: Mutex<Vec<Script>>,
    session_resets: Mutex<usize>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every script executed so far, in order
    pub fn scripts(&self) -> Vec<Script> {
        self.scripts.lock().clone()
    }

    pub fn script_count(&self) -> usize {
        self.scripts.lock().len()
    }

    pub fn session_resets(&self) -> usize {
        *self.session_resets.lock()
    }

    pub fn clear(&self) {
        self.scripts.lock().clear();
    }
}

#[async_trait]
impl ScriptExecutor for RecordingExecutor {
    async fn execute(&self, script: &Script) -> E2eResult<ScriptReport> {
        debug!(
            "Recording script '{}' ({} step(s))",
            script.label,
            script.steps.len()
        );
        self.scripts.lock().push(script.clone());

        Ok(ScriptReport {
            steps_completed: script.steps.len(),
            ..ScriptReport::empty(&script.label)
        })
    }

    async fn reset_session(&self) -> E2eResult<()> {
        *self.session_resets.lock() += 1;
        Ok(())
    }

    fn is_live(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::Step;

    #[tokio::test]
    async fn test_records_in_order() {
        let executor = RecordingExecutor::new();

        let mut first = Script::new("first");
        first.push(Step::Reload);
        let second = Script::new("second");

        let report = executor.execute(&first).await.unwrap();
        executor.execute(&second).await.unwrap();
        executor.reset_session().await.unwrap();

        assert_eq!(report.steps_completed, 1);
        let labels: Vec<String> = executor.scripts().into_iter().map(|s| s.label).collect();
        assert_eq!(labels, vec!["first", "second"]);
        assert_eq!(executor.session_resets(), 1);
        assert!(!executor.is_live());
    }
}
