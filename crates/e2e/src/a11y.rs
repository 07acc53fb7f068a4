//! Accessibility audits with axe-core
//!
//! The application ships with a handful of accepted, application-wide
//! violations. They are listed in [`KNOWN_ISSUES`] and disabled in every
//! component audit, so those audits only report what the component itself
//! gets wrong. The known issues are still audited on their own, one rule at a
//! time, in report-only mode.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

/// An accepted violation, disabled in component audits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownIssue {
    pub rule: &'static str,
    pub description: &'static str,
}

pub const KNOWN_ISSUES: [KnownIssue; 4] = [
    KnownIssue {
        rule: "color-contrast",
        description: "Login button contrast",
    },
    KnownIssue {
        rule: "image-alt",
        description: "Logo and images missing alt text",
    },
    KnownIssue {
        rule: "page-has-heading-one",
        description: "Missing h1 heading",
    },
    KnownIssue {
        rule: "region",
        description: "Missing landmark regions",
    },
];

/// WCAG 2.0/2.1 A and AA
pub const WCAG_TAGS: [&str; 4] = ["wcag2a", "wcag2aa", "wcag21a", "wcag21aa"];

/// Violation severity as reported by axe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Minor,
    Moderate,
    Serious,
    Critical,
}

impl std::fmt::Display for Impact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Impact::Minor => write!(f, "minor"),
            Impact::Moderate => write!(f, "moderate"),
            Impact::Serious => write!(f, "serious"),
            Impact::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleToggle {
    pub enabled: bool,
}

/// Restrict an audit to tags or to specific rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum RunOnly {
    Tag(Vec<String>),
    Rule(Vec<String>),
}

/// Options for one axe run plus the impacts the scenario cares about
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxeConfig {
    #[serde(default)]
    pub rules: BTreeMap<String, RuleToggle>,
    #[serde(default)]
    pub run_only: Option<RunOnly>,
    /// Impacts counted as violations; empty counts everything
    #[serde(default)]
    pub included_impacts: Vec<Impact>,
    /// CSS selector limiting the audit to part of the page
    #[serde(default)]
    pub context: Option<String>,
}

impl AxeConfig {
    /// Every axe rule, every impact
    pub fn all() -> Self {
        Self::default()
    }

    /// Everything except the application-wide known issues
    pub fn exclude_known_issues() -> Self {
        KNOWN_ISSUES
            .iter()
            .fold(Self::default(), |config, issue| config.disable(issue.rule))
    }

    /// Only the given rules
    pub fn specific_rules<I, S>(rule_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            run_only: Some(RunOnly::Rule(rule_ids.into_iter().map(Into::into).collect())),
            ..Default::default()
        }
    }

    /// WCAG 2.x A/AA rules only
    pub fn wcag() -> Self {
        Self::default().tags(WCAG_TAGS)
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run_only = Some(RunOnly::Tag(tags.into_iter().map(Into::into).collect()));
        self
    }

    pub fn enable(mut self, rule: &str) -> Self {
        self.rules.insert(rule.to_string(), RuleToggle { enabled: true });
        self
    }

    pub fn disable(mut self, rule: &str) -> Self {
        self.rules.insert(rule.to_string(), RuleToggle { enabled: false });
        self
    }

    /// Disable additional rules, e.g. project-specific known issues
    pub fn disable_all<S: AsRef<str>>(self, rules: &[S]) -> Self {
        rules.iter().fold(self, |config, rule| config.disable(rule.as_ref()))
    }

    pub fn with_impacts<I: IntoIterator<Item = Impact>>(mut self, impacts: I) -> Self {
        self.included_impacts = impacts.into_iter().collect();
        self
    }

    pub fn with_context(mut self, selector: impl Into<String>) -> Self {
        self.context = Some(selector.into());
        self
    }

    pub fn is_disabled(&self, rule: &str) -> bool {
        self.rules.get(rule).map(|t| !t.enabled).unwrap_or(false)
    }

    /// The `options` object handed to `axe.run`
    pub fn axe_options(&self) -> serde_json::Value {
        let mut options = serde_json::Map::new();

        if let Some(run_only) = &self.run_only {
            options.insert(
                "runOnly".to_string(),
                serde_json::to_value(run_only).unwrap_or_default(),
            );
        }
        if !self.rules.is_empty() {
            options.insert(
                "rules".to_string(),
                serde_json::to_value(&self.rules).unwrap_or_default(),
            );
        }

        serde_json::Value::Object(options)
    }

    fn counts(&self, violation: &Violation) -> bool {
        if self.is_disabled(&violation.id) {
            return false;
        }
        if self.included_impacts.is_empty() {
            return true;
        }
        violation
            .impact
            .map(|impact| self.included_impacts.contains(&impact))
            .unwrap_or(false)
    }
}

/// Suite-wide accessibility settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct A11yConfig {
    /// Rules disabled on top of [`KNOWN_ISSUES`]
    pub extra_known_issues: Vec<String>,
}

impl A11yConfig {
    /// Component audit configuration with every known issue disabled
    pub fn component_audit(&self) -> AxeConfig {
        AxeConfig::exclude_known_issues().disable_all(&self.extra_known_issues)
    }
}

/// One rule failure reported by axe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub id: String,
    #[serde(default)]
    pub impact: Option<Impact>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub help: String,
    #[serde(default)]
    pub help_url: String,
    /// Number of affected elements
    #[serde(default)]
    pub nodes: usize,
}

/// What to do when an audit finds violations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditPolicy {
    /// Any counted violation fails the scenario
    Enforce,
    /// Log the violations and carry on
    Report,
}

/// Violations returned by one audit step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    pub label: String,
    pub violations: Vec<Violation>,
}

impl AuditReport {
    /// Violations that count under `config`
    pub fn relevant<'a>(
        &'a self,
        config: &'a AxeConfig,
    ) -> impl Iterator<Item = &'a Violation> + 'a {
        self.violations.iter().filter(move |v| config.counts(v))
    }

    pub fn violations_of<'a>(&'a self, rule: &'a str) -> impl Iterator<Item = &'a Violation> + 'a {
        self.violations.iter().filter(move |v| v.id == rule)
    }

    pub fn log_violations<'a, I>(&self, violations: I)
    where
        I: IntoIterator<Item = &'a Violation>,
    {
        for violation in violations {
            let impact = violation
                .impact
                .map(|i| i.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            warn!(
                audit = %self.label,
                rule = %violation.id,
                impact = %impact,
                nodes = violation.nodes,
                "{} ({})",
                violation.description,
                violation.help_url
            );
        }
    }

    /// Apply `policy` to the violations that count under `config`
    pub fn evaluate(&self, config: &AxeConfig, policy: AuditPolicy) -> E2eResult<usize> {
        let relevant: Vec<&Violation> = self.relevant(config).collect();

        if relevant.is_empty() {
            info!("Audit '{}' found no violations", self.label);
            return Ok(0);
        }

        self.log_violations(relevant.iter().copied());

        match policy {
            AuditPolicy::Report => Ok(relevant.len()),
            AuditPolicy::Enforce => {
                let rules: Vec<&str> = relevant.iter().map(|v| v.id.as_str()).collect();
                Err(E2eError::AccessibilityViolations {
                    label: self.label.clone(),
                    count: relevant.len(),
                    rules: rules.join(", "),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn violation(id: &str, impact: Option<Impact>) -> Violation {
        Violation {
            id: id.to_string(),
            impact,
            description: format!("{} description", id),
            help: String::new(),
            help_url: format!("https://dequeuniversity.com/rules/axe/4.8/{}", id),
            nodes: 1,
        }
    }

    fn report(violations: Vec<Violation>) -> AuditReport {
        AuditReport {
            label: "board".to_string(),
            violations,
        }
    }

    #[test]
    fn test_known_issues_are_disabled() {
        let config = AxeConfig::exclude_known_issues();
        for issue in KNOWN_ISSUES {
            assert!(config.is_disabled(issue.rule));
        }
        assert_eq!(
            config.axe_options(),
            serde_json::json!({
                "rules": {
                    "color-contrast": { "enabled": false },
                    "image-alt": { "enabled": false },
                    "page-has-heading-one": { "enabled": false },
                    "region": { "enabled": false }
                }
            })
        );
    }

    #[test]
    fn test_wcag_run_only_options() {
        assert_eq!(
            AxeConfig::wcag().axe_options(),
            serde_json::json!({
                "runOnly": { "type": "tag", "values": ["wcag2a", "wcag2aa", "wcag21a", "wcag21aa"] }
            })
        );
    }

    #[test]
    fn test_specific_rules_options() {
        assert_eq!(
            AxeConfig::specific_rules(["button-name", "label"]).axe_options(),
            serde_json::json!({ "runOnly": { "type": "rule", "values": ["button-name", "label"] } })
        );
    }

    #[test_case(Some(Impact::Critical), true ; "critical counts")]
    #[test_case(Some(Impact::Serious), false ; "serious is filtered")]
    #[test_case(None, false ; "unknown impact is filtered")]
    fn test_impact_filter(impact: Option<Impact>, counted: bool) {
        let config = AxeConfig::all().with_impacts([Impact::Critical]);
        let report = report(vec![violation("button-name", impact)]);
        assert_eq!(report.relevant(&config).count() == 1, counted);
    }

    #[test]
    fn test_enforce_ignores_known_issues() {
        let config = AxeConfig::exclude_known_issues();
        let report = report(vec![
            violation("color-contrast", Some(Impact::Serious)),
            violation("region", Some(Impact::Moderate)),
        ]);
        assert_eq!(report.evaluate(&config, AuditPolicy::Enforce).unwrap(), 0);
    }

    #[test]
    fn test_enforce_fails_on_component_violation() {
        let config = AxeConfig::exclude_known_issues();
        let report = report(vec![
            violation("image-alt", Some(Impact::Critical)),
            violation("button-name", Some(Impact::Critical)),
        ]);

        let err = report.evaluate(&config, AuditPolicy::Enforce).unwrap_err();
        match err {
            E2eError::AccessibilityViolations { count, rules, .. } => {
                assert_eq!(count, 1);
                assert_eq!(rules, "button-name");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_report_policy_counts_without_failing() {
        let config = AxeConfig::all();
        let report = report(vec![violation("color-contrast", Some(Impact::Serious))]);
        assert_eq!(report.evaluate(&config, AuditPolicy::Report).unwrap(), 1);
    }

    #[test]
    fn test_violation_parses_axe_shape() {
        let v: Violation = serde_json::from_str(
            r#"{"id":"region","impact":"moderate","description":"d","help":"h","helpUrl":"u","nodes":3}"#,
        )
        .unwrap();
        assert_eq!(v.impact, Some(Impact::Moderate));
        assert_eq!(v.nodes, 3);
    }

    #[test]
    fn test_component_audit_adds_extra_issues() {
        let config = A11yConfig {
            extra_known_issues: vec!["label".to_string()],
        }
        .component_audit();
        assert!(config.is_disabled("label"));
        assert!(config.is_disabled("region"));
    }
}
