//! Validation task: run an external linter over the demo's sources.
//!
//! The task owns pattern expansion, verdicts and change tracking. The rules
//! themselves belong to the external tool behind [`Checker`]; the shipped
//! [`EslintChecker`] shells out to ESLint and reads its JSON report.
//!
//! Fix mode lets the tool rewrite files in place. There is no backup.

use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::SystemTime;

use crate::errors::ValidationError;

/// Result alias for validation task operations.
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

/// Shown when a batch has findings and fix mode was off.
pub const FIX_HINT: &str = "Run `metering-demo lint --fix` to automatically fix some of these \
lint warnings/errors. This is a destructive operation (operates on the file system) so please \
make sure you commit before running.";

/// Severity reported by the checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A single problem reported for a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// 1-indexed line
    pub line: u32,
    /// 1-indexed column
    pub column: u32,
    pub message: String,
    pub rule_id: Option<String>,
    pub severity: Severity,
}

/// Checker verdict for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    /// Problems left after any fixing
    pub findings: Vec<Finding>,
    /// The checker rewrote the file
    pub fixed: bool,
}

impl FileReport {
    pub fn clean(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            findings: Vec::new(),
            fixed: false,
        }
    }

    pub fn passed(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Outcome of one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintReport {
    pub files: Vec<FileReport>,
}

impl LintReport {
    pub fn finding_count(&self) -> usize {
        self.files.iter().map(|f| f.findings.len()).sum()
    }

    pub fn error_count(&self) -> usize {
        self.count_severity(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count_severity(Severity::Warning)
    }

    fn count_severity(&self, severity: Severity) -> usize {
        self.files
            .iter()
            .flat_map(|f| &f.findings)
            .filter(|f| f.severity == severity)
            .count()
    }

    pub fn has_findings(&self) -> bool {
        self.finding_count() > 0
    }

    pub fn files_with_findings(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| !f.passed())
    }

    pub fn fixed_files(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| f.fixed)
    }

    /// Batch verdict.
    ///
    /// Without fix mode any finding fails the batch. In fix mode only errors
    /// the checker could not fix fail it.
    pub fn passed(&self, fix: bool) -> bool {
        if fix {
            self.error_count() == 0
        } else {
            !self.has_findings()
        }
    }

    /// Whether the fix hint applies to this batch.
    pub fn should_suggest_fix(&self, fix: bool) -> bool {
        self.has_findings() && !fix
    }
}

/// Render one file's findings the way ESLint's "stylish" formatter does.
///
/// Returns an empty string for a file without findings.
pub fn format_stylish(report: &FileReport) -> String {
    if report.findings.is_empty() {
        return String::new();
    }

    let mut out = format!("{}\n", report.path.display());
    let positions: Vec<String> = report
        .findings
        .iter()
        .map(|f| format!("{}:{}", f.line, f.column))
        .collect();
    let width = positions.iter().map(String::len).max().unwrap_or(0);

    for (finding, position) in report.findings.iter().zip(&positions) {
        let line = format!(
            "  {:<width$}  {:<7}  {}  {}",
            position,
            finding.severity.to_string(),
            finding.message,
            finding.rule_id.as_deref().unwrap_or(""),
            width = width
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// One-line totals, e.g. `2 problems (1 error, 1 warning)`.
pub fn summary_line(report: &LintReport) -> String {
    let total = report.finding_count();
    let errors = report.error_count();
    let warnings = report.warning_count();
    format!(
        "{} problem{} ({} error{}, {} warning{})",
        total,
        plural(total),
        errors,
        plural(errors),
        warnings,
        plural(warnings)
    )
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Expand glob patterns relative to `root`.
///
/// Patterns starting with `!` exclude files matched by the other patterns.
/// Only regular files are returned, sorted and de-duplicated.
pub fn expand_patterns(root: &Path, patterns: &[String]) -> ValidationResult<Vec<PathBuf>> {
    let mut includes = Vec::new();
    let mut excludes = Vec::new();

    for raw in patterns {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        match raw.strip_prefix('!') {
            Some(negated) => excludes.push(compile_pattern(negated)?),
            None => includes.push(raw),
        }
    }

    // The root is literal; only the user patterns are globs.
    let base = PathBuf::from(glob::Pattern::escape(&root.to_string_lossy()));
    let exclude_options = glob::MatchOptions {
        require_literal_separator: true,
        ..glob::MatchOptions::new()
    };

    let mut files = BTreeSet::new();
    for pattern in includes {
        let full = base.join(pattern);
        let entries = glob::glob(&full.to_string_lossy()).map_err(|e| ValidationError::Pattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        for entry in entries {
            let path = entry.map_err(|e| ValidationError::Io {
                path: e.path().to_path_buf(),
                source: e.into(),
            })?;
            if !path.is_file() {
                continue;
            }
            let relative = path.strip_prefix(root).unwrap_or(&path);
            if excludes.iter().any(|ex| ex.matches_path_with(relative, exclude_options)) {
                continue;
            }
            files.insert(path);
        }
    }

    Ok(files.into_iter().collect())
}

fn compile_pattern(pattern: &str) -> ValidationResult<glob::Pattern> {
    glob::Pattern::new(pattern).map_err(|e| ValidationError::Pattern {
        pattern: format!("!{}", pattern),
        reason: e.to_string(),
    })
}

/// External static-analysis tool.
pub trait Checker {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Check `files`, optionally letting the tool fix them in place.
    fn check(&self, files: &[PathBuf], fix: bool) -> ValidationResult<Vec<FileReport>>;
}

/// Runs ESLint with `--format json`.
#[derive(Debug, Clone)]
pub struct EslintChecker {
    command: Vec<String>,
    plugins: Vec<String>,
    working_dir: PathBuf,
}

impl EslintChecker {
    /// `command` is the program plus leading arguments, e.g. `["npx", "eslint"]`.
    pub fn new(command: Vec<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            command,
            plugins: Vec::new(),
            working_dir: working_dir.into(),
        }
    }

    pub fn with_plugins(mut self, plugins: Vec<String>) -> Self {
        self.plugins = plugins;
        self
    }

    /// Arguments passed after the program name.
    pub fn arguments(&self, files: &[PathBuf], fix: bool) -> Vec<String> {
        let mut args: Vec<String> = self.command.iter().skip(1).cloned().collect();
        args.push("--format".into());
        args.push("json".into());
        if fix {
            args.push("--fix".into());
        }
        for plugin in &self.plugins {
            args.push("--plugin".into());
            args.push(plugin.clone());
        }
        args.extend(files.iter().map(|f| f.to_string_lossy().into_owned()));
        args
    }
}

impl Checker for EslintChecker {
    fn name(&self) -> &str {
        "eslint"
    }

    fn check(&self, files: &[PathBuf], fix: bool) -> ValidationResult<Vec<FileReport>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let program = self
            .command
            .first()
            .ok_or_else(|| ValidationError::Checker("empty linter command".into()))?;

        tracing::debug!(program = %program, files = files.len(), fix, "running linter");
        let output = Command::new(program)
            .args(self.arguments(files, fix))
            .current_dir(&self.working_dir)
            .output()
            .map_err(|e| ValidationError::Checker(format!("failed to run {}: {}", program, e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        // ESLint exits 1 when it reports problems and 2 on configuration or
        // internal errors.
        if output.status.code() == Some(2) || stdout.trim().is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ValidationError::Checker(format!(
                "{} exited with {}: {}",
                program,
                output.status,
                stderr.trim()
            )));
        }

        parse_eslint_json(&stdout)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EslintFileResult {
    file_path: PathBuf,
    #[serde(default)]
    messages: Vec<EslintMessage>,
    #[serde(default)]
    output: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EslintMessage {
    #[serde(default)]
    rule_id: Option<String>,
    #[serde(default)]
    severity: u8,
    message: String,
    #[serde(default)]
    line: u32,
    #[serde(default)]
    column: u32,
}

/// Parse ESLint's JSON formatter output.
pub fn parse_eslint_json(json: &str) -> ValidationResult<Vec<FileReport>> {
    let results: Vec<EslintFileResult> = serde_json::from_str(json)
        .map_err(|e| ValidationError::Checker(format!("unreadable linter output: {}", e)))?;

    Ok(results
        .into_iter()
        .map(|result| FileReport {
            path: result.file_path,
            fixed: result.output.is_some(),
            findings: result
                .messages
                .into_iter()
                .map(|m| Finding {
                    line: m.line,
                    column: m.column,
                    message: m.message,
                    rule_id: m.rule_id,
                    severity: if m.severity >= 2 {
                        Severity::Error
                    } else {
                        Severity::Warning
                    },
                })
                .collect(),
        })
        .collect())
}

/// Pattern expansion plus a checker.
pub struct ValidationTask<C: Checker> {
    checker: C,
    root: PathBuf,
    patterns: Vec<String>,
    fix: bool,
}

impl<C: Checker> ValidationTask<C> {
    pub fn new(checker: C, root: impl Into<PathBuf>, patterns: Vec<String>) -> Self {
        Self {
            checker,
            root: root.into(),
            patterns,
            fix: false,
        }
    }

    pub fn with_fix(mut self, fix: bool) -> Self {
        self.fix = fix;
        self
    }

    pub fn fix(&self) -> bool {
        self.fix
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Files currently matched by the patterns.
    pub fn files(&self) -> ValidationResult<Vec<PathBuf>> {
        expand_patterns(&self.root, &self.patterns)
    }

    /// Expand the patterns and check every match.
    pub fn run_once(&self) -> ValidationResult<LintReport> {
        let files = self.files()?;
        self.check_files(&files)
    }

    /// Check an explicit set of files (watch mode re-checks only changes).
    pub fn check_files(&self, files: &[PathBuf]) -> ValidationResult<LintReport> {
        let mut reports = self.checker.check(files, self.fix)?;
        reports.sort_by(|a, b| a.path.cmp(&b.path));
        let report = LintReport { files: reports };

        for file in report.files_with_findings() {
            tracing::error!(
                path = %file.path.display(),
                errors = file.findings.iter().filter(|f| f.severity == Severity::Error).count(),
                problems = file.findings.len(),
                "lint problems"
            );
        }
        if report.should_suggest_fix(self.fix) {
            tracing::info!("{}", FIX_HINT);
        }
        tracing::debug!(
            checker = self.checker.name(),
            files = files.len(),
            problems = report.finding_count(),
            fixed = report.fixed_files().count(),
            "lint batch finished"
        );
        Ok(report)
    }
}

/// Polling change detector for watch mode.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    seen: HashMap<PathBuf, SystemTime>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current state of `files` without reporting anything.
    pub fn prime(&mut self, files: &[PathBuf]) {
        let _ = self.changed(files);
    }

    /// Files that are new or modified since the last call.
    ///
    /// Files no longer listed are forgotten, so a file that reappears counts
    /// as new. Files whose metadata cannot be read are skipped.
    pub fn changed(&mut self, files: &[PathBuf]) -> Vec<PathBuf> {
        let mut next = HashMap::with_capacity(files.len());
        let mut changed = Vec::new();

        for path in files {
            let Ok(modified) = std::fs::metadata(path).and_then(|m| m.modified()) else {
                continue;
            };
            if self.seen.get(path) != Some(&modified) {
                changed.push(path.clone());
            }
            next.insert(path.clone(), modified);
        }

        self.seen = next;
        changed
    }

    pub fn tracked(&self) -> usize {
        self.seen.len()
    }
}
