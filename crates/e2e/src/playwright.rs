//! Playwright browser automation
//!
//! Each [`Script`] is rendered to a standalone Node program that drives one
//! browser context through the steps and prints one JSON event per line.
//! Cookies and local storage survive from one script to the next through a
//! storage-state file owned by the handle, so a scenario can log in with one
//! script, call the API, and continue in the browser with another.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tokio::process::Command as TokioCommand;
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};
use crate::script::{Script, ScriptEvent, ScriptExecutor, ScriptReport};
use crate::step::{Locator, Pick, Step, Target, UrlMatch};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaywrightConfig {
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// How long assertions keep retrying
    pub expect_timeout_ms: u64,
    /// How long actions wait for their element
    pub action_timeout_ms: u64,
    /// Upper bound for a whole script
    pub script_timeout_secs: u64,
    pub node_binary: String,
    /// `node_modules` holding playwright, @playwright/test and @axe-core/playwright
    pub node_modules: PathBuf,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 660,
            viewport_height: 550,
            expect_timeout_ms: 5000,
            action_timeout_ms: 10000,
            script_timeout_secs: 300,
            node_binary: "node".to_string(),
            node_modules: PathBuf::from("node_modules"),
        }
    }
}

/// A JavaScript string literal
fn js_str(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Regex literal source matching `fragment` anywhere
fn js_regex_containing(fragment: &str) -> String {
    format!("new RegExp({})", js_str(&regex::escape(fragment)))
}

fn absolute(path: &Path) -> E2eResult<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Renders scripts to Node programs
#[derive(Debug, Clone)]
pub struct ScriptRenderer {
    base_url: String,
    config: PlaywrightConfig,
    screenshot_dir: PathBuf,
    state_path: PathBuf,
}

impl ScriptRenderer {
    pub fn new(
        base_url: &str,
        config: PlaywrightConfig,
        screenshot_dir: PathBuf,
        state_path: PathBuf,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            config,
            screenshot_dir,
            state_path,
        }
    }

    pub fn screenshot_path(&self, name: &str) -> PathBuf {
        self.screenshot_dir.join(format!("{}.png", name))
    }

    /// Build the Node program for a script
    pub fn render(&self, script: &Script) -> String {
        let (width, height) = script
            .viewport
            .unwrap_or((self.config.viewport_width, self.config.viewport_height));

        let mut out = String::new();

        out.push_str("const fs = require('fs');\n");
        out.push_str("const { chromium, firefox, webkit } = require('playwright');\n");
        out.push_str("const { expect } = require('@playwright/test');\n");
        if script.has_audits() {
            out.push_str("const AxeBuilder = require('@axe-core/playwright').default;\n");
        }

        out.push_str(&format!(
            r#"
const emit = (event) => console.log(JSON.stringify(event));

(async () => {{
  const baseUrl = {base_url};
  const statePath = {state_path};
  const check = expect.configure({{ timeout: {expect_timeout} }});
  const browser = await {browser}.launch({{ headless: {headless} }});
  const contextOptions = {{ baseURL: baseUrl, viewport: {{ width: {width}, height: {height} }} }};
  if (fs.existsSync(statePath)) contextOptions.storageState = statePath;
  const context = await browser.newContext(contextOptions);
  context.setDefaultTimeout({action_timeout});
  const page = await context.newPage();
  let current = null;

  try {{
"#,
            base_url = js_str(&self.base_url),
            state_path = js_str(&self.state_path.to_string_lossy()),
            expect_timeout = self.config.expect_timeout_ms,
            browser = self.config.browser.as_str(),
            headless = self.config.headless,
            width = width,
            height = height,
            action_timeout = self.config.action_timeout_ms,
        ));

        for (i, step) in script.steps.iter().enumerate() {
            out.push_str(&format!("\n    // Step {}: {}\n", i + 1, comment_text(&step.name())));
            out.push_str(&format!("    current = {};\n", i));
            out.push_str(&self.step_to_js(step));
            out.push_str(&format!("\n    emit({{ event: 'step', index: {} }});\n", i));
        }

        out.push_str(
            r#"
    await context.storageState({ path: statePath });
    emit({ event: 'done' });
  } catch (error) {
    emit({ event: 'failed', index: current, error: String((error && error.message) || error) });
    process.exitCode = 1;
  } finally {
    await browser.close();
  }
})();
"#,
        );

        out
    }

    fn locator_js(&self, locator: &Locator) -> String {
        let mut js = match &locator.target {
            Target::Css { selector } => format!("page.locator({})", js_str(selector)),
            Target::Text { pattern } => {
                format!("page.getByText(new RegExp({}, 'i'))", js_str(pattern))
            }
        };
        if let Some(text) = &locator.has_text {
            js.push_str(&format!(".filter({{ hasText: {} }})", js_str(text)));
        }
        match locator.pick {
            Some(Pick::First) => js.push_str(".first()"),
            Some(Pick::Last) => js.push_str(".last()"),
            Some(Pick::Nth(i)) => js.push_str(&format!(".nth({})", i)),
            None => {}
        }
        js
    }

    fn poll(&self, probe: &str, matcher: &str) -> String {
        format!(
            "    await expect.poll({}, {{ timeout: {} }}).{};",
            probe, self.config.expect_timeout_ms, matcher
        )
    }

    /// Convert a step to JavaScript code
    fn step_to_js(&self, step: &Step) -> String {
        match step {
            Step::Visit { path } => format!("    await page.goto(baseUrl + {});", js_str(path)),
            Step::Reload => "    await page.reload();".to_string(),
            Step::Click { locator } => format!("    await {}.click();", self.locator_js(locator)),
            Step::ClickIfVisible { locator } => format!(
                "    {{\n      const target = {};\n      if (await target.isVisible()) await target.click();\n    }}",
                self.locator_js(locator)
            ),
            Step::Type { locator, text } => format!(
                "    await {}.pressSequentially({});",
                self.locator_js(locator),
                js_str(text)
            ),
            Step::Press { locator, key } => match locator {
                Some(locator) => format!(
                    "    await {}.press({});",
                    self.locator_js(locator),
                    js_str(key)
                ),
                None => format!("    await page.keyboard.press({});", js_str(key)),
            },
            Step::Clear { locator } => format!("    await {}.clear();", self.locator_js(locator)),
            Step::Blur { locator } => format!("    await {}.blur();", self.locator_js(locator)),
            Step::Focus { locator } => format!("    await {}.focus();", self.locator_js(locator)),
            Step::Wait { ms } => format!("    await page.waitForTimeout({});", ms),
            Step::ClearCookies => "    await context.clearCookies();".to_string(),
            Step::ClearLocalStorage => {
                "    await page.evaluate(() => window.localStorage.clear());".to_string()
            }
            Step::SetCookie { name, value } => format!(
                "    await context.addCookies([{{ name: {}, value: {}, url: baseUrl }}]);",
                js_str(name),
                js_str(value)
            ),
            Step::CaptureCookies { label } => format!(
                "    emit({{ event: 'cookies', label: {}, cookies: await context.cookies() }});",
                js_str(label)
            ),
            Step::CaptureLocalStorage { label } => format!(
                "    emit({{ event: 'storage', label: {}, entries: await page.evaluate(() => Object.fromEntries(Object.entries(window.localStorage))) }});",
                js_str(label)
            ),
            Step::AssertVisible { locator } => {
                format!("    await check({}).toBeVisible();", self.locator_js(locator))
            }
            Step::AssertHidden { locator } => {
                format!("    await check({}).toBeHidden();", self.locator_js(locator))
            }
            Step::AssertAttached { locator } => {
                format!("    await check({}).toBeAttached();", self.locator_js(locator))
            }
            Step::AssertAbsent { locator } => {
                format!("    await check({}).toHaveCount(0);", self.locator_js(locator))
            }
            Step::AssertValue { locator, value } => format!(
                "    await check({}).toHaveValue({});",
                self.locator_js(locator),
                js_str(value)
            ),
            Step::AssertContainsText { locator, text } => format!(
                "    await check({}).toContainText({});",
                self.locator_js(locator),
                js_str(text)
            ),
            Step::AssertCount { locator, count } => format!(
                "    await check({}).toHaveCount({});",
                self.locator_js(locator),
                count
            ),
            Step::AssertMinCount { locator, min } => self.poll(
                &format!("() => {}.count()", self.locator_js(locator)),
                &format!("toBeGreaterThanOrEqual({})", min),
            ),
            Step::AssertClass { locator, class } => {
                let pattern = format!(r"(^|\s){}(\s|$)", regex::escape(class));
                format!(
                    "    await check({}).toHaveClass(new RegExp({}));",
                    self.locator_js(locator),
                    js_str(&pattern)
                )
            }
            Step::AssertChecked { locator, checked } => format!(
                "    await check({}).toBeChecked({{ checked: {} }});",
                self.locator_js(locator),
                checked
            ),
            Step::AssertAttribute {
                locator,
                name,
                value,
            } => match value {
                Some(value) => format!(
                    "    await check({}).toHaveAttribute({}, {});",
                    self.locator_js(locator),
                    js_str(name),
                    js_str(value)
                ),
                None => format!(
                    "    await check({}).toHaveAttribute({});",
                    self.locator_js(locator),
                    js_str(name)
                ),
            },
            Step::AssertValuesInclude { locator, value } => self.poll(
                &format!(
                    "() => {}.evaluateAll((els) => els.map((el) => el.value))",
                    self.locator_js(locator)
                ),
                &format!("toContain({})", js_str(value)),
            ),
            Step::AssertUrl { matcher } => match matcher {
                UrlMatch::Includes(fragment) => format!(
                    "    await check(page).toHaveURL({});",
                    js_regex_containing(fragment)
                ),
                UrlMatch::Excludes(fragment) => format!(
                    "    await check(page).not.toHaveURL({});",
                    js_regex_containing(fragment)
                ),
                UrlMatch::Path(path) => {
                    format!("    await check(page).toHaveURL(baseUrl + {});", js_str(path))
                }
                UrlMatch::Pattern(pattern) => format!(
                    "    await check(page).toHaveURL(new RegExp({}));",
                    js_str(pattern)
                ),
            },
            Step::AssertCookie { name, present } => self.poll(
                &format!(
                    "async () => (await context.cookies()).some((c) => c.name === {})",
                    js_str(name)
                ),
                &format!("toBe({})", present),
            ),
            Step::AssertFocusedVisible => {
                "    await check(page.locator(':focus')).toBeVisible();".to_string()
            }
            Step::Checkpoint { name, full_page } => {
                let path = self.screenshot_path(name);
                format!(
                    "    {{\n      const shot = {};\n      await page.screenshot({{ path: shot, fullPage: {} }});\n      emit({{ event: 'screenshot', name: {}, path: shot }});\n    }}",
                    js_str(&path.to_string_lossy()),
                    full_page,
                    js_str(name)
                )
            }
            Step::Audit { label, config } => {
                let include = config
                    .context
                    .as_deref()
                    .map(|selector| format!(".include({})", js_str(selector)))
                    .unwrap_or_default();
                format!(
                    "    {{\n      const results = await new AxeBuilder({{ page }}).options({}){}.analyze();\n      emit({{ event: 'audit', label: {}, violations: results.violations.map((v) => ({{ id: v.id, impact: v.impact, description: v.description, help: v.help, helpUrl: v.helpUrl, nodes: v.nodes.length }})) }});\n    }}",
                    config.axe_options(),
                    include,
                    js_str(label)
                )
            }
            Step::Log { message } => {
                format!("    emit({{ event: 'log', message: {} }});", js_str(message))
            }
        }
    }
}

/// Playwright browser handle
pub struct PlaywrightHandle {
    renderer: ScriptRenderer,
    config: PlaywrightConfig,
    node_modules: PathBuf,
    /// Holds the storage-state file and rendered scripts
    work_dir: tempfile::TempDir,
}

impl PlaywrightHandle {
    /// Create a new Playwright handle, screenshots land in `screenshot_dir`
    pub fn new(config: PlaywrightConfig, base_url: &str, screenshot_dir: &Path) -> E2eResult<Self> {
        let node_modules = absolute(&config.node_modules)?;
        Self::check_playwright_installed(&config, &node_modules)?;

        std::fs::create_dir_all(screenshot_dir)?;
        let work_dir = tempfile::tempdir()?;

        let renderer = ScriptRenderer::new(
            base_url,
            config.clone(),
            absolute(screenshot_dir)?,
            work_dir.path().join("storage-state.json"),
        );

        info!(
            "Playwright ready ({}, headless: {})",
            config.browser.as_str(),
            config.headless
        );

        Ok(Self {
            renderer,
            config,
            node_modules,
            work_dir,
        })
    }

    /// Check that node can resolve the Playwright packages
    fn check_playwright_installed(config: &PlaywrightConfig, node_modules: &Path) -> E2eResult<()> {
        let status = Command::new(&config.node_binary)
            .args([
                "-e",
                "require.resolve('playwright'); require.resolve('@playwright/test')",
            ])
            .env("NODE_PATH", node_modules)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    pub fn renderer(&self) -> &ScriptRenderer {
        &self.renderer
    }

    fn state_path(&self) -> PathBuf {
        self.work_dir.path().join("storage-state.json")
    }
}

/// Parse every line that is a script event, skipping stray console output
pub fn parse_events(stdout: &str) -> Vec<ScriptEvent> {
    stdout
        .lines()
        .filter(|line| line.trim_start().starts_with('{'))
        .filter_map(|line| match serde_json::from_str::<ScriptEvent>(line) {
            Ok(event) => Some(event),
            Err(e) => {
                debug!("Ignoring script output line ({}): {}", e, line);
                None
            }
        })
        .collect()
}

#[async_trait]
impl ScriptExecutor for PlaywrightHandle {
    async fn execute(&self, script: &Script) -> E2eResult<ScriptReport> {
        let start = Instant::now();
        let source = self.renderer.render(script);

        let script_path = self
            .work_dir
            .path()
            .join(format!("script-{}.js", uuid::Uuid::new_v4()));
        std::fs::write(&script_path, source)?;

        debug!(
            "Running script '{}' ({} step(s)): {}",
            script.label,
            script.steps.len(),
            script_path.display()
        );

        let child = TokioCommand::new(&self.config.node_binary)
            .arg(&script_path)
            .current_dir(self.work_dir.path())
            .env("NODE_PATH", &self.node_modules)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = tokio::time::timeout(
            Duration::from_secs(self.config.script_timeout_secs),
            child.wait_with_output(),
        )
        .await
        .map_err(|_| {
            E2eError::Playwright(format!(
                "script '{}' timed out after {}s",
                script.label, self.config.script_timeout_secs
            ))
        })??;

        let _ = std::fs::remove_file(&script_path);

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if stderr.contains("Cannot find module") {
            return Err(E2eError::PlaywrightNotFound);
        }

        match ScriptReport::collect(script, parse_events(&stdout)) {
            Ok(mut report) => {
                report.duration_ms = start.elapsed().as_millis() as u64;
                if !output.status.success() {
                    warn!(
                        "Script '{}' completed but node exited with {}",
                        script.label, output.status
                    );
                }
                Ok(report)
            }
            Err(E2eError::Playwright(message)) => Err(E2eError::Playwright(format!(
                "{}\nstderr: {}",
                message,
                stderr.trim()
            ))),
            Err(e) => Err(e),
        }
    }

    async fn reset_session(&self) -> E2eResult<()> {
        let path = self.state_path();
        if path.exists() {
            std::fs::remove_file(&path)?;
            debug!("Cleared browser session state");
        }
        Ok(())
    }
}

/// Text safe inside a `//` comment; JS ends a line at any of these
fn comment_text(text: &str) -> String {
    text.replace(['\n', '\r', '\u{2028}', '\u{2029}'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::a11y::AxeConfig;

    fn renderer() -> ScriptRenderer {
        ScriptRenderer::new(
            "http://localhost:3000/",
            PlaywrightConfig::default(),
            PathBuf::from("/tmp/shots"),
            PathBuf::from("/tmp/state.json"),
        )
    }

    #[test]
    fn test_user_text_is_json_escaped() {
        let mut script = Script::new("escape");
        script.push(Step::Type {
            locator: Locator::test_id("new-board-input"),
            text: r#"it's a "quote" \ </script>"#.to_string(),
        });

        let js = renderer().render(&script);
        assert!(js.contains(r#"pressSequentially("it's a \"quote\" \\ </script>")"#));
        assert!(js.contains(r#"const baseUrl = "http://localhost:3000";"#));
    }

    #[test]
    fn test_step_comment_stays_on_one_line() {
        let mut script = Script::new("comments");
        script.push(Step::Click {
            locator: Locator::text_matching("a\rb\u{2028}c\u{2029}d\ne"),
        });

        let js = renderer().render(&script);
        let start = js.find("// Step 1: ").unwrap();
        let comment = js[start..].lines().next().unwrap();
        assert!(!comment.contains(['\r', '\u{2028}', '\u{2029}']));
        assert!(comment.contains("a b c d e"));
        assert!(js[start..].lines().nth(1).unwrap().contains("current = 0;"));
    }

    #[test]
    fn test_axe_is_only_required_for_audits() {
        let mut script = Script::new("plain");
        script.push(Step::Reload);
        assert!(!renderer().render(&script).contains("@axe-core/playwright"));

        script.push(Step::Audit {
            label: "home".to_string(),
            config: AxeConfig::exclude_known_issues().with_context("#app"),
        });
        let js = renderer().render(&script);
        assert!(js.contains("require('@axe-core/playwright')"));
        assert!(js.contains(r##".include("#app")"##));
        assert!(js.contains(r#""color-contrast":{"enabled":false}"#));
    }

    #[test]
    fn test_url_fragments_are_regex_escaped() {
        let step = Step::AssertUrl {
            matcher: UrlMatch::Includes("/board/1?x".to_string()),
        };
        let js = renderer().step_to_js(&step);
        assert!(js.contains(r#"new RegExp("/board/1\\?x")"#));
    }

    #[test]
    fn test_locator_filters_and_pick() {
        let locator = Locator::test_id("card").containing("Task").nth(1);
        assert_eq!(
            renderer().locator_js(&locator),
            r#"page.locator("[data-cy=\"card\"]").filter({ hasText: "Task" }).nth(1)"#
        );
        assert_eq!(
            renderer().locator_js(&Locator::text_matching("don.t have access")),
            r#"page.getByText(new RegExp("don.t have access", 'i'))"#
        );
    }

    #[test]
    fn test_class_assertion_matches_whole_class() {
        let step = Step::AssertClass {
            locator: Locator::test_id("star"),
            class: "text-yellow-300".to_string(),
        };
        let js = renderer().step_to_js(&step);
        assert!(js.contains(r#"toHaveClass(new RegExp("(^|\\s)text\\-yellow\\-300(\\s|$)"))"#));
    }

    #[test]
    fn test_script_viewport_overrides_config() {
        let script = Script::new("visual").with_viewport(1920, 1080);
        let js = renderer().render(&script);
        assert!(js.contains("viewport: { width: 1920, height: 1080 }"));
    }

    #[test]
    fn test_checkpoint_writes_into_screenshot_dir() {
        let step = Step::Checkpoint {
            name: "home-empty".to_string(),
            full_page: true,
        };
        let js = renderer().step_to_js(&step);
        assert!(js.contains(r#""/tmp/shots/home-empty.png""#));
        assert!(js.contains("fullPage: true"));
    }

    #[test]
    fn test_every_step_reports_progress() {
        let mut script = Script::new("progress");
        script.push(Step::Reload).push(Step::ClearCookies);
        let js = renderer().render(&script);
        assert!(js.contains("emit({ event: 'step', index: 0 });"));
        assert!(js.contains("emit({ event: 'step', index: 1 });"));
        assert!(js.contains("emit({ event: 'done' });"));
    }

    #[test]
    fn test_parse_events_skips_console_noise() {
        let stdout = "Debugger attached\n{\"event\":\"step\",\"index\":0}\n{not json\n{\"event\":\"done\"}\n";
        let events = parse_events(stdout);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], ScriptEvent::Done));
    }
}
