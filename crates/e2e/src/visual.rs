//! Visual checkpoints with screenshot comparison
//!
//! A [`VisualSession`] groups the checkpoints of one scenario. Each checkpoint
//! adds a full-page screenshot step to a script; closing the session compares
//! every captured screenshot against its baseline.

use image::{GenericImageView, Pixel, RgbaImage};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};
use crate::script::Script;
use crate::step::Step;

/// Result of a visual comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualDiff {
    /// Whether the images match (within threshold)
    pub matches: bool,

    /// Percentage of pixels that differ
    pub diff_percent: f64,

    pub diff_pixels: u64,

    pub total_pixels: u64,

    pub diff_image_path: Option<PathBuf>,

    pub actual_hash: String,

    pub baseline_hash: String,
}

/// Compares screenshots in the actual directory with their baselines
pub struct VisualTester {
    baseline_dir: PathBuf,
    actual_dir: PathBuf,
    diff_dir: PathBuf,
    /// Default threshold (0.0 - 100.0 percent)
    threshold: f64,
    /// Create missing baselines from the actual screenshot
    auto_update: bool,
}

impl VisualTester {
    pub fn new(config: &VisualConfig) -> E2eResult<Self> {
        std::fs::create_dir_all(&config.baseline_dir)?;
        std::fs::create_dir_all(&config.actual_dir)?;
        std::fs::create_dir_all(&config.diff_dir)?;

        Ok(Self {
            baseline_dir: config.baseline_dir.clone(),
            actual_dir: config.actual_dir.clone(),
            diff_dir: config.diff_dir.clone(),
            threshold: config.threshold,
            auto_update: config.auto_update,
        })
    }

    pub fn actual_path(&self, name: &str) -> PathBuf {
        self.actual_dir.join(format!("{}.png", name))
    }

    pub fn baseline_path(&self, name: &str) -> PathBuf {
        self.baseline_dir.join(format!("{}.png", name))
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Compare a screenshot against its baseline
    pub fn compare(&self, name: &str, threshold: Option<f64>) -> E2eResult<VisualDiff> {
        let threshold = threshold.unwrap_or(self.threshold);

        let actual_path = self.actual_path(name);
        let baseline_path = self.baseline_path(name);

        if !actual_path.exists() {
            return Err(E2eError::VisualRegression(format!(
                "Actual screenshot not found: {}",
                actual_path.display()
            )));
        }

        if !baseline_path.exists() {
            if self.auto_update {
                info!("Creating baseline for '{}'", name);
                std::fs::copy(&actual_path, &baseline_path)?;

                let actual_hash = hash_file(&actual_path)?;
                return Ok(VisualDiff {
                    matches: true,
                    diff_percent: 0.0,
                    diff_pixels: 0,
                    total_pixels: 0,
                    diff_image_path: None,
                    actual_hash: actual_hash.clone(),
                    baseline_hash: actual_hash,
                });
            }
            return Err(E2eError::BaselineNotFound(
                baseline_path.to_string_lossy().to_string(),
            ));
        }

        let actual_hash = hash_file(&actual_path)?;
        let baseline_hash = hash_file(&baseline_path)?;

        let actual_img = image::open(&actual_path)?;
        let (width, height) = actual_img.dimensions();
        let total_pixels = (width as u64) * (height as u64);

        if actual_hash == baseline_hash {
            debug!("Screenshot '{}' matches its baseline byte for byte", name);
            return Ok(VisualDiff {
                matches: true,
                diff_percent: 0.0,
                diff_pixels: 0,
                total_pixels,
                diff_image_path: None,
                actual_hash,
                baseline_hash,
            });
        }

        let baseline_img = image::open(&baseline_path)?;
        if actual_img.dimensions() != baseline_img.dimensions() {
            warn!(
                "Screenshot '{}' dimensions differ: actual {:?} vs baseline {:?}",
                name,
                actual_img.dimensions(),
                baseline_img.dimensions()
            );
        }

        let actual_rgba = actual_img.to_rgba8();
        let baseline_rgba = baseline_img.to_rgba8();

        let mut diff_img = RgbaImage::new(width, height);
        let mut diff_pixels = 0u64;

        for y in 0..height {
            for x in 0..width {
                let actual_pixel = actual_rgba.get_pixel(x, y);

                // Pixels outside the baseline count as changed
                let differs = if x < baseline_rgba.width() && y < baseline_rgba.height() {
                    pixels_differ(actual_pixel, baseline_rgba.get_pixel(x, y))
                } else {
                    true
                };

                if differs {
                    diff_pixels += 1;
                    diff_img.put_pixel(x, y, image::Rgba([255, 0, 0, 255]));
                } else {
                    let channels = actual_pixel.channels();
                    diff_img.put_pixel(
                        x,
                        y,
                        image::Rgba([channels[0] / 2, channels[1] / 2, channels[2] / 2, 128]),
                    );
                }
            }
        }

        let diff_percent = if total_pixels == 0 {
            0.0
        } else {
            (diff_pixels as f64 / total_pixels as f64) * 100.0
        };
        let matches = diff_percent <= threshold;

        let diff_image_path = if diff_pixels > 0 {
            let path = self.diff_dir.join(format!("{}-diff.png", name));
            diff_img.save(&path)?;
            Some(path)
        } else {
            None
        };

        if !matches {
            warn!(
                "Visual regression detected in '{}': {:.2}% pixels differ (threshold: {:.2}%)",
                name, diff_percent, threshold
            );
        }

        Ok(VisualDiff {
            matches,
            diff_percent,
            diff_pixels,
            total_pixels,
            diff_image_path,
            actual_hash,
            baseline_hash,
        })
    }

    /// Replace the baseline with the actual screenshot
    pub fn update_baseline(&self, name: &str) -> E2eResult<()> {
        let actual_path = self.actual_path(name);

        if !actual_path.exists() {
            return Err(E2eError::VisualRegression(format!(
                "Cannot update baseline: actual screenshot not found: {}",
                actual_path.display()
            )));
        }

        std::fs::copy(&actual_path, self.baseline_path(name))?;
        info!("Updated baseline for '{}'", name);

        Ok(())
    }

    /// Promote every captured screenshot to a baseline
    pub fn update_all_baselines(&self) -> E2eResult<usize> {
        let mut updated = 0;
        for name in png_stems(&self.actual_dir)? {
            self.update_baseline(&name)?;
            updated += 1;
        }
        Ok(updated)
    }

    pub fn list_baselines(&self) -> E2eResult<Vec<String>> {
        png_stems(&self.baseline_dir)
    }

    /// Remove screenshots and diff images left by earlier runs
    ///
    /// Baselines are kept. Returns the number of files removed.
    pub fn clear_run_artifacts(&self) -> E2eResult<usize> {
        let mut removed = 0;

        for name in png_stems(&self.actual_dir)? {
            std::fs::remove_file(self.actual_path(&name))?;
            removed += 1;
        }
        for entry in std::fs::read_dir(&self.diff_dir)? {
            let path = entry?.path();
            if path.is_file() {
                std::fs::remove_file(path)?;
                removed += 1;
            }
        }

        if removed > 0 {
            debug!("Removed {} screenshot(s) and diff(s) from an earlier run", removed);
        }
        Ok(removed)
    }
}

/// Small color differences come from anti-aliasing and compression
fn pixels_differ(a: &image::Rgba<u8>, b: &image::Rgba<u8>) -> bool {
    const TOLERANCE: i32 = 5;

    a.channels()
        .iter()
        .zip(b.channels())
        .any(|(x, y)| (*x as i32 - *y as i32).abs() > TOLERANCE)
}

fn hash_file(path: &Path) -> E2eResult<String> {
    let data = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

fn png_stems(dir: &Path) -> E2eResult<Vec<String>> {
    let mut names = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().map(|e| e == "png").unwrap_or(false) {
            if let Some(name) = path.file_stem() {
                names.push(name.to_string_lossy().to_string());
            }
        }
    }

    names.sort();
    Ok(names)
}

/// Baseline-safe file name for a checkpoint
pub fn checkpoint_name(test_name: &str, tag: &str) -> String {
    let mut name = String::new();
    let mut last_dash = true;

    for c in format!("{} {}", test_name, tag).chars() {
        if c.is_alphanumeric() {
            name.extend(c.to_lowercase());
            last_dash = false;
        } else if !last_dash {
            name.push('-');
            last_dash = true;
        }
    }

    name.trim_end_matches('-').to_string()
}

/// Outcome of one checkpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckpointOutcome {
    Matched { diff_percent: f64 },
    Mismatched { diff_percent: f64, diff_image: Option<PathBuf> },
    NewBaseline,
    MissingBaseline,
    /// The script never produced the screenshot (e.g. a dry run)
    NotCaptured,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointResult {
    pub tag: String,
    pub name: String,
    #[serde(flatten)]
    pub outcome: CheckpointOutcome,
}

/// Everything a closed session found
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub app_name: String,
    pub test_name: String,
    pub batch: String,
    pub checkpoints: Vec<CheckpointResult>,
}

impl SessionResult {
    pub fn mismatches(&self) -> impl Iterator<Item = &CheckpointResult> {
        self.checkpoints
            .iter()
            .filter(|c| matches!(c.outcome, CheckpointOutcome::Mismatched { .. }))
    }

    pub fn passed(&self) -> bool {
        self.mismatches().next().is_none()
    }
}

/// The checkpoints of one scenario
#[derive(Debug, Clone)]
pub struct VisualSession {
    app_name: String,
    test_name: String,
    batch: String,
    checkpoints: Vec<(String, String)>,
}

impl VisualSession {
    pub fn open(app_name: &str, test_name: &str, batch: &str) -> Self {
        debug!("Opened visual session '{}' in batch {}", test_name, batch);
        Self {
            app_name: app_name.to_string(),
            test_name: test_name.to_string(),
            batch: batch.to_string(),
            checkpoints: Vec::new(),
        }
    }

    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    /// Add a full-page screenshot of the current window to `script`
    pub fn checkpoint(&mut self, script: &mut Script, tag: &str) -> &mut Self {
        let name = checkpoint_name(&self.test_name, tag);
        script.push(Step::Checkpoint {
            name: name.clone(),
            full_page: true,
        });
        self.checkpoints.push((tag.to_string(), name));
        self
    }

    /// Compare every checkpoint with its baseline
    pub fn close(
        self,
        tester: &VisualTester,
        fail_on_missing_baseline: bool,
    ) -> E2eResult<SessionResult> {
        let mut result = SessionResult {
            app_name: self.app_name,
            test_name: self.test_name,
            batch: self.batch,
            checkpoints: Vec::with_capacity(self.checkpoints.len()),
        };

        for (tag, name) in self.checkpoints {
            let outcome = if !tester.actual_path(&name).exists() {
                debug!("Checkpoint '{}' was not captured", name);
                CheckpointOutcome::NotCaptured
            } else {
                let had_baseline = tester.baseline_path(&name).exists();
                match tester.compare(&name, None) {
                    Ok(diff) if !had_baseline => {
                        debug!("Baseline created for '{}' ({} pixels)", name, diff.total_pixels);
                        CheckpointOutcome::NewBaseline
                    }
                    Ok(diff) if diff.matches => CheckpointOutcome::Matched {
                        diff_percent: diff.diff_percent,
                    },
                    Ok(diff) => CheckpointOutcome::Mismatched {
                        diff_percent: diff.diff_percent,
                        diff_image: diff.diff_image_path,
                    },
                    Err(E2eError::BaselineNotFound(path)) => {
                        if fail_on_missing_baseline {
                            return Err(E2eError::BaselineNotFound(path));
                        }
                        warn!(
                            "No baseline for '{}', run with --update-baselines to record it",
                            name
                        );
                        CheckpointOutcome::MissingBaseline
                    }
                    Err(e) => return Err(e),
                }
            };

            result.checkpoints.push(CheckpointResult { tag, name, outcome });
        }

        info!(
            "Visual session '{}' closed: {} checkpoint(s), {} mismatch(es)",
            result.test_name,
            result.checkpoints.len(),
            result.mismatches().count()
        );

        Ok(result)
    }
}

/// Configuration for visual checkpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualConfig {
    pub baseline_dir: PathBuf,
    pub actual_dir: PathBuf,
    pub diff_dir: PathBuf,
    /// Percentage of differing pixels tolerated
    pub threshold: f64,
    pub auto_update: bool,
    pub fail_on_missing_baseline: bool,
    pub app_name: String,
    /// Batch name; a timestamped one is generated when empty
    pub batch_name: Option<String>,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            baseline_dir: PathBuf::from("test-results/baselines"),
            actual_dir: PathBuf::from("test-results/screenshots"),
            diff_dir: PathBuf::from("test-results/diffs"),
            threshold: 0.5,
            auto_update: false,
            fail_on_missing_baseline: false,
            app_name: "Trelloapp".to_string(),
            batch_name: None,
            viewport_width: 1920,
            viewport_height: 1080,
        }
    }
}

impl VisualConfig {
    pub fn batch(&self) -> String {
        self.batch_name.clone().unwrap_or_else(|| {
            format!("{}-{}", self.app_name, chrono::Utc::now().format("%Y%m%d-%H%M%S"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(root: &Path) -> VisualConfig {
        VisualConfig {
            baseline_dir: root.join("baselines"),
            actual_dir: root.join("actual"),
            diff_dir: root.join("diffs"),
            ..Default::default()
        }
    }

    fn write_png(path: &Path, width: u32, height: u32, red_pixels: u32) {
        let mut img = RgbaImage::from_pixel(width, height, image::Rgba([255, 255, 255, 255]));
        for i in 0..red_pixels {
            img.put_pixel(i % width, i / width, image::Rgba([255, 0, 0, 255]));
        }
        img.save(path).unwrap();
    }

    #[test]
    fn test_visual_config_default() {
        let config = VisualConfig::default();
        assert_eq!(config.threshold, 0.5);
        assert!(!config.auto_update);
        assert_eq!((config.viewport_width, config.viewport_height), (1920, 1080));
    }

    #[test]
    fn test_checkpoint_name_is_file_safe() {
        assert_eq!(
            checkpoint_name("Board with Special Characters", "测试 🎉 Board"),
            "board-with-special-characters-测试-board"
        );
    }

    #[test]
    fn test_identical_screenshots_match() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let tester = VisualTester::new(&config).unwrap();

        write_png(&tester.actual_path("home"), 10, 10, 0);
        write_png(&tester.baseline_path("home"), 10, 10, 0);

        let diff = tester.compare("home", None).unwrap();
        assert!(diff.matches);
        assert_eq!(diff.diff_pixels, 0);
    }

    #[test]
    fn test_difference_above_threshold_mismatches() {
        let dir = tempfile::tempdir().unwrap();
        let tester = VisualTester::new(&config(dir.path())).unwrap();

        write_png(&tester.actual_path("board"), 10, 10, 5);
        write_png(&tester.baseline_path("board"), 10, 10, 0);

        let diff = tester.compare("board", None).unwrap();
        assert!(!diff.matches);
        assert_eq!(diff.diff_pixels, 5);
        assert!((diff.diff_percent - 5.0).abs() < 1e-9);
        assert!(diff.diff_image_path.unwrap().exists());

        assert!(tester.compare("board", Some(10.0)).unwrap().matches);
    }

    #[test]
    fn test_missing_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let tester = VisualTester::new(&config(dir.path())).unwrap();
        write_png(&tester.actual_path("list"), 4, 4, 0);

        assert!(matches!(
            tester.compare("list", None),
            Err(E2eError::BaselineNotFound(_))
        ));
    }

    #[test]
    fn test_session_records_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let tester = VisualTester::new(&config(dir.path())).unwrap();

        let mut script = Script::new("visual");
        let mut session = VisualSession::open("Trelloapp", "Card Detail", "batch-1");
        session
            .checkpoint(&mut script, "Open")
            .checkpoint(&mut script, "Completed")
            .checkpoint(&mut script, "Never Shot");

        assert_eq!(script.steps().len(), 3);

        write_png(&tester.actual_path("card-detail-open"), 10, 10, 0);
        write_png(&tester.baseline_path("card-detail-open"), 10, 10, 0);
        write_png(&tester.actual_path("card-detail-completed"), 10, 10, 50);
        write_png(&tester.baseline_path("card-detail-completed"), 10, 10, 0);

        let result = session.close(&tester, false).unwrap();
        assert!(!result.passed());
        assert_eq!(result.mismatches().count(), 1);
        assert_eq!(result.checkpoints[2].outcome, CheckpointOutcome::NotCaptured);
    }

    #[test]
    fn test_clear_run_artifacts_keeps_baselines() {
        let dir = tempfile::tempdir().unwrap();
        let tester = VisualTester::new(&config(dir.path())).unwrap();

        write_png(&tester.actual_path("home"), 4, 4, 0);
        write_png(&tester.baseline_path("home"), 4, 4, 0);
        write_png(&dir.path().join("diffs").join("home-diff.png"), 4, 4, 1);

        assert_eq!(tester.clear_run_artifacts().unwrap(), 2);
        assert!(!tester.actual_path("home").exists());
        assert!(tester.baseline_path("home").exists());
        assert_eq!(tester.update_all_baselines().unwrap(), 0);
        assert_eq!(tester.clear_run_artifacts().unwrap(), 0);
    }

    #[test]
    fn test_auto_update_creates_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let tester = VisualTester::new(&VisualConfig {
            auto_update: true,
            ..config(dir.path())
        })
        .unwrap();

        let mut script = Script::new("visual");
        let mut session = VisualSession::open("Trelloapp", "Home", "batch-1");
        session.checkpoint(&mut script, "Empty");
        write_png(&tester.actual_path("home-empty"), 4, 4, 0);

        let result = session.close(&tester, true).unwrap();
        assert_eq!(result.checkpoints[0].outcome, CheckpointOutcome::NewBaseline);
        assert!(tester.baseline_path("home-empty").exists());
    }

    #[test]
    fn test_missing_baseline_can_fail_the_session() {
        let dir = tempfile::tempdir().unwrap();
        let tester = VisualTester::new(&config(dir.path())).unwrap();

        let mut script = Script::new("visual");
        let mut session = VisualSession::open("Trelloapp", "Home", "batch-1");
        session.checkpoint(&mut script, "Empty");
        write_png(&tester.actual_path("home-empty"), 4, 4, 0);

        assert!(session.clone().close(&tester, true).is_err());
        let result = session.close(&tester, false).unwrap();
        assert_eq!(result.checkpoints[0].outcome, CheckpointOutcome::MissingBaseline);
        assert!(result.passed());
    }
}
