//! Application management - optionally spawning the app under test and health checking it

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

/// Handle to the application under test.
///
/// When the configuration carries a launch command the handle owns the child
/// process and stops it on drop; otherwise it only verifies that an already
/// running application answers.
pub struct ServerHandle {
    child: Option<Child>,
    pub base_url: String,
}

impl ServerHandle {
    /// Start (or attach to) the application and wait until its API answers
    pub async fn spawn(config: &ServerConfig, base_url: &str) -> E2eResult<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();

        let child = match config.command.split_first() {
            Some((program, args)) => {
                info!("Spawning application: {} {}", program, args.join(" "));

                let mut cmd = Command::new(program);
                cmd.args(args);
                if let Some(dir) = &config.working_dir {
                    cmd.current_dir(dir);
                }
                for (key, value) in &config.env {
                    cmd.env(key, value);
                }
                cmd.stdout(Stdio::null()).stderr(Stdio::inherit());

                let child = cmd.spawn().map_err(|e| {
                    E2eError::ServerStartup(format!("Failed to spawn {}: {}", program, e))
                })?;
                Some(child)
            }
            None => {
                info!("Attaching to running application at {}", base_url);
                None
            }
        };

        let handle = ServerHandle { child, base_url };

        handle
            .wait_for_healthy(Duration::from_secs(config.startup_timeout_secs))
            .await?;

        info!("Application is healthy at {}", handle.base_url);
        Ok(handle)
    }

    /// Poll the boards endpoint until it answers with a success status
    async fn wait_for_healthy(&self, timeout_duration: Duration) -> E2eResult<()> {
        let health_url = format!("{}/api/boards", self.base_url);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let start = std::time::Instant::now();
        let mut attempts = 0;

        while start.elapsed() < timeout_duration {
            attempts += 1;

            match client.get(&health_url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    return Ok(());
                }
                Ok(resp) => {
                    warn!("Health check returned {}", resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for application to start...");
                    }
                    // Connection refused is expected while the app is starting
                    if !e.is_connect() {
                        warn!("Health check error: {}", e);
                    }
                }
            }

            sleep(Duration::from_millis(250)).await;
        }

        Err(E2eError::ServerHealthCheck(attempts))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether this handle owns the application process
    pub fn is_managed(&self) -> bool {
        self.child.is_some()
    }

    /// Stop the application if this handle started it
    pub fn stop(&mut self) -> E2eResult<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        info!("Stopping application (pid: {})", child.id());

        // Try graceful shutdown first
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(child.id() as i32);
            if kill(pid, Signal::SIGTERM).is_ok() {
                std::thread::sleep(Duration::from_millis(500));
            }
        }

        let _ = child.kill();
        let _ = child.wait();

        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// How to reach (and optionally launch) the application
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Launch command, e.g. `["npm", "start"]`; empty means attach only
    pub command: Vec<String>,

    /// Directory the command runs in
    pub working_dir: Option<PathBuf>,

    /// Extra environment for the launched process
    pub env: BTreeMap<String, String>,

    /// Seconds to wait for the API to answer
    pub startup_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            working_dir: None,
            env: BTreeMap::new(),
            startup_timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_attaches_only() {
        let config = ServerConfig::default();
        assert!(config.command.is_empty());
        assert_eq!(config.startup_timeout_secs, 30);
    }

    #[tokio::test]
    async fn test_health_check_gives_up_on_unreachable_app() {
        let config = ServerConfig {
            startup_timeout_secs: 1,
            ..Default::default()
        };

        // Port 9 (discard) is not expected to serve HTTP
        let result = ServerHandle::spawn(&config, "http://127.0.0.1:9").await;
        assert!(matches!(result, Err(E2eError::ServerHealthCheck(n)) if n >= 1));
    }
}
