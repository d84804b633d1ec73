//! Lint command - run the validation task, once or in watch mode

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use metering_demo_core::validation::{ChangeTracker, EslintChecker, ValidationTask};
use metering_demo_core::DemoConfig;

use crate::ui;

/// Options collected from the command line.
pub struct LintArgs {
    pub patterns: Vec<String>,
    pub watch: bool,
    pub fix: bool,
    pub root: Option<PathBuf>,
    pub linter: Option<String>,
}

pub async fn run(config: &DemoConfig, args: LintArgs, verbose: bool) -> Result<()> {
    let root = match args.root {
        Some(root) => root,
        None => std::env::current_dir().context("Failed to determine working directory")?,
    };
    let command = match &args.linter {
        Some(linter) => linter.split_whitespace().map(str::to_string).collect(),
        None => config.lint.command.clone(),
    };
    if command.is_empty() {
        bail!("Linter command must not be empty");
    }
    let patterns = if args.patterns.is_empty() {
        config.lint.globs.clone()
    } else {
        args.patterns
    };

    let checker = EslintChecker::new(command, &root).with_plugins(config.lint.plugins.clone());
    let task = ValidationTask::new(checker, &root, patterns).with_fix(args.fix);

    if verbose {
        ui::key_value("Root", &root.display().to_string());
        ui::key_value("Patterns", &task.patterns().join(" "));
    }
    if args.fix {
        ui::warning("Fix mode rewrites files in place");
    }

    if args.watch {
        let interval = Duration::from_millis(config.lint.poll_interval_ms.max(1));
        watch(&task, interval).await
    } else {
        run_once(&task)
    }
}

fn run_once(task: &ValidationTask<EslintChecker>) -> Result<()> {
    let files = task.files()?;
    if files.is_empty() {
        ui::warning("No files matched the lint patterns");
        return Ok(());
    }

    let spinner = ui::spinner(&format!("Linting {} file(s)...", files.len()));
    let result = tokio::task::block_in_place(|| task.check_files(&files));
    spinner.finish_and_clear();

    let report = result?;
    ui::lint_report(&report, task.fix());

    if !report.passed(task.fix()) {
        bail!("Lint failed with {} problem(s)", report.finding_count());
    }
    Ok(())
}

async fn watch(task: &ValidationTask<EslintChecker>, interval: Duration) -> Result<()> {
    let mut tracker = ChangeTracker::new();

    // Initial full pass; failures are reported, not fatal
    check_and_report(task, &mut tracker, None);
    ui::info(&format!(
        "Watching {} for changes (Ctrl+C to stop)",
        task.root().display()
    ));

    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                println!();
                ui::info("Stopped watching");
                return Ok(());
            }
            _ = ticker.tick() => {
                let files = match task.files() {
                    Ok(files) => files,
                    Err(e) => {
                        ui::error(&e.to_string());
                        continue;
                    }
                };
                let changed = tracker.changed(&files);
                if !changed.is_empty() {
                    tracing::debug!(count = changed.len(), "files changed");
                    check_and_report(task, &mut tracker, Some(changed));
                }
            }
        }
    }
}

/// Check `only` (or every matched file), then re-prime the tracker so
/// rewrites made by fix mode don't trigger another pass.
fn check_and_report(
    task: &ValidationTask<EslintChecker>,
    tracker: &mut ChangeTracker,
    only: Option<Vec<PathBuf>>,
) {
    let files = match task.files() {
        Ok(files) => files,
        Err(e) => {
            ui::error(&e.to_string());
            return;
        }
    };
    let targets = only.unwrap_or_else(|| files.clone());

    if !targets.is_empty() {
        match tokio::task::block_in_place(|| task.check_files(&targets)) {
            Ok(report) => ui::lint_report(&report, task.fix()),
            Err(e) => ui::error(&e.to_string()),
        }
    }

    tracker.prime(&files);
}
