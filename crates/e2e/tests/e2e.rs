//! E2E test harness entry point
//!
//! Runs the registered scenarios against a running kanban application.
//! Run with: cargo test --package kanban-e2e --test e2e -- --suite smoke

use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use kanban_e2e::runner::{RunnerConfig, TestSuiteResult};
use kanban_e2e::scenarios;
use kanban_e2e::{E2eResult, Scenario, Status, Suite, SuiteConfig, TestRunner};

#[derive(Parser, Debug)]
#[command(name = "kanban-e2e")]
#[command(about = "E2E, accessibility and visual test runner for the kanban board")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "KANBAN_E2E_CONFIG")]
    config: Option<PathBuf>,

    /// Run only this suite (smoke, regression, accessibility, auth, visual)
    #[arg(short, long)]
    suite: Option<Suite>,

    /// Run only scenarios carrying this tag
    #[arg(short, long)]
    tag: Option<String>,

    /// Run only a specific scenario by name
    #[arg(short, long)]
    name: Option<String>,

    /// Origin of the application under test
    #[arg(long)]
    base_url: Option<String>,

    /// Accept captured screenshots as the new baselines
    #[arg(long)]
    update_baselines: bool,

    /// Record browser scripts instead of running Playwright
    #[arg(long)]
    dry_run: bool,

    /// List the selected scenarios and exit
    #[arg(long)]
    list: bool,

    /// Results file (default: <output_dir>/test-results.json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn main() {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if args.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {}", e);
            std::process::exit(2);
        }
    };

    match rt.block_on(async_main(args)) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

fn load_config(args: &Args) -> E2eResult<SuiteConfig> {
    let mut config = match &args.config {
        Some(path) => SuiteConfig::from_file(path)?,
        None => SuiteConfig::default(),
    };
    config.apply_env()?;

    if let Some(url) = &args.base_url {
        config.base_url = url.clone();
    }
    config.validate()?;
    Ok(config)
}

fn select(args: &Args) -> Vec<Scenario> {
    let mut selected = match args.suite {
        Some(suite) => scenarios::by_suite(suite),
        None => scenarios::all(),
    };
    if let Some(tag) = &args.tag {
        selected.retain(|s| s.has_tag(tag));
    }
    if let Some(name) = &args.name {
        selected.retain(|s| s.name == name);
    }
    selected
}

fn print_list(selected: &[Scenario]) {
    for scenario in selected {
        let status = match &scenario.status {
            Status::Active => String::new(),
            Status::Skipped(reason) => format!("  [skip: {}]", reason),
            Status::ExpectedFailure(reason) => format!("  [xfail: {}]", reason),
        };
        println!("{:<14} {}{}", scenario.suite.as_str(), scenario.name, status);
    }
    println!("{} scenario(s)", selected.len());
}

async fn async_main(args: Args) -> E2eResult<bool> {
    let config = load_config(&args)?;
    let selected = select(&args);

    if args.list {
        print_list(&selected);
        return Ok(true);
    }

    let mut runner = TestRunner::new(RunnerConfig {
        suite: config,
        dry_run: args.dry_run,
        update_baselines: args.update_baselines,
    })?;

    let results = match &args.name {
        Some(name) if selected.is_empty() => {
            // Unknown name: let the runner report it
            let result = runner.run_test(name).await?;
            TestSuiteResult::from_results(Utc::now(), result.duration_ms, vec![result])
        }
        _ => runner.run_scenarios(selected).await?,
    };

    for failure in results.failures() {
        eprintln!(
            "FAILED {}: {}",
            failure.name,
            failure.error.as_deref().unwrap_or("unknown error")
        );
    }

    runner.write_results(&results, args.output.clone())?;

    Ok(results.success())
}
