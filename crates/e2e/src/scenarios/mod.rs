//! Scenario registry
//!
//! Every scenario the kit knows about, grouped by suite. Names are unique and
//! path-like (`suite::area::what`) so `--name` can select one directly.

use crate::error::{E2eError, E2eResult};
use crate::fixtures::{self, data};
use crate::scenario::{Scenario, ScenarioContext, Suite};

/// Register an async scenario body under a suite
macro_rules! scenario {
    ($suite:expr, $name:expr, $body:path $(,)?) => {
        $crate::scenario::Scenario::new($suite, $name, |ctx| Box::pin($body(ctx)))
    };
}

mod accessibility;
mod auth;
mod regression;
mod smoke;
mod visual;

/// "Task Board" with the kanban lists; returns the board id and every list id
async fn task_board(ctx: &ScenarioContext) -> E2eResult<(i64, Vec<i64>)> {
    let built =
        fixtures::create_board_with_lists(&ctx.api, "Task Board", &data::KANBAN_LISTS).await?;
    if built.lists.is_empty() {
        return Err(E2eError::AssertionFailed("task board has no lists".to_string()));
    }
    Ok((built.board.id, built.lists.iter().map(|l| l.id).collect()))
}

pub fn all() -> Vec<Scenario> {
    let mut scenarios = Vec::new();
    scenarios.extend(smoke::scenarios());
    scenarios.extend(regression::scenarios());
    scenarios.extend(accessibility::scenarios());
    scenarios.extend(auth::scenarios());
    scenarios.extend(visual::scenarios());
    scenarios
}

pub fn find(name: &str) -> Option<Scenario> {
    all().into_iter().find(|s| s.name == name)
}

pub fn by_suite(suite: Suite) -> Vec<Scenario> {
    all().into_iter().filter(|s| s.suite == suite).collect()
}

pub fn by_tag(tag: &str) -> Vec<Scenario> {
    all().into_iter().filter(|s| s.has_tag(tag)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique() {
        let scenarios = all();
        let names: HashSet<&str> = scenarios.iter().map(|s| s.name).collect();
        assert_eq!(names.len(), scenarios.len());
    }

    #[test]
    fn test_names_start_with_suite() {
        for scenario in all() {
            let prefix = format!("{}::", scenario.suite);
            assert!(
                scenario.name.starts_with(&prefix),
                "{} should start with {}",
                scenario.name,
                prefix
            );
        }
    }

    #[test]
    fn test_every_suite_has_scenarios() {
        for suite in Suite::ALL {
            assert!(!by_suite(suite).is_empty(), "{} is empty", suite);
        }
    }

    #[test]
    fn test_find_and_tag_lookup() {
        assert!(find("smoke::board::create_first_board").is_some());
        assert!(find("smoke::nope").is_none());
        assert!(by_tag("card").iter().all(|s| s.has_tag("card")));
    }
}
