//! Findings shared by the stylesheet and script linters.

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ErrorDetail;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub rule: &'static str,
    pub severity: Severity,
    pub message: String,
    pub file: Option<PathBuf>,
    /// The offending code was rewritten; the finding no longer counts.
    pub fixed: bool,
}

impl Finding {
    pub fn error<M: Into<String>>(rule: &'static str, message: M) -> Self {
        Finding { rule, severity: Severity::Error, message: message.into(), file: None, fixed: false }
    }

    pub fn warning<M: Into<String>>(rule: &'static str, message: M) -> Self {
        Finding { rule, severity: Severity::Warning, message: message.into(), file: None, fixed: false }
    }

    pub fn in_file<P: Into<PathBuf>>(mut self, file: P) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn fixed(mut self) -> Self {
        self.fixed = true;
        self
    }

    fn counts_as_error(&self) -> bool {
        self.severity == Severity::Error && !self.fixed
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };

        if let Some(file) = &self.file {
            write!(f, "{}: ", file.display())?;
        }

        write!(f, "{level} [{}] {}", self.rule, self.message)?;
        if self.fixed {
            write!(f, " (fixed)")?;
        }

        Ok(())
    }
}

/// Severity threshold for one linter.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    /// The linter fails the build when it finds more errors than this.
    pub max_errors: usize,
}

#[derive(Debug, Default, Clone)]
pub struct LintReport {
    pub findings: Vec<Finding>,
}

impl LintReport {
    pub fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    pub fn extend(&mut self, other: LintReport) {
        self.findings.extend(other.findings);
    }

    /// Unfixed error-severity findings.
    pub fn error_count(&self) -> usize {
        self.findings.iter().filter(|f| f.counts_as_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.findings.iter().filter(|f| f.severity == Severity::Warning).count()
    }

    /// Logs every finding, then fails if the error count exceeds `config`.
    pub fn check(self, linter: &'static str, config: &LintConfig) -> crate::error::Result<()> {
        for finding in &self.findings {
            match finding.severity {
                _ if finding.fixed => tracing::info!(linter, "{finding}"),
                Severity::Error => tracing::error!(linter, "{finding}"),
                Severity::Warning => tracing::warn!(linter, "{finding}"),
            }
        }

        if self.error_count() > config.max_errors {
            return Err(LintFailure {
                linter,
                max_errors: config.max_errors,
                report: self,
            }.into());
        }

        Ok(())
    }
}

/// A lint pass found more errors than its configured maximum.
#[derive(Debug)]
pub struct LintFailure {
    pub linter: &'static str,
    pub max_errors: usize,
    pub report: LintReport,
}

impl fmt::Display for LintFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} found {} error(s), at most {} allowed",
            self.linter, self.report.error_count(), self.max_errors)
    }
}

impl ErrorDetail for LintFailure {
    fn context(&self) -> Vec<(Option<String>, String)> {
        self.report.findings.iter()
            .filter(|f| f.counts_as_error())
            .map(|f| (None, f.to_string()))
            .collect()
    }

    fn lint_failure(&self) -> Option<&LintFailure> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_exclusive() {
        let mut report = LintReport::default();
        report.push(Finding::error("no-debugger", "unexpected debugger"));
        report.push(Finding::warning("no-alert", "unexpected alert"));

        assert!(report.clone().check("scripts", &LintConfig { max_errors: 1 }).is_ok());

        let error = report.check("scripts", &LintConfig { max_errors: 0 }).unwrap_err();
        let failure = error.lint_failure().expect("lint failure");
        assert_eq!(failure.report.error_count(), 1);
        assert_eq!(failure.report.warning_count(), 1);
        assert!(error.to_string().contains("no-debugger"));
    }

    #[test]
    fn warnings_never_fail() {
        let mut report = LintReport::default();
        for _ in 0..10 {
            report.push(Finding::warning("declaration-no-important", "!important"));
        }

        assert!(report.check("styles", &LintConfig::default()).is_ok());
    }

    #[test]
    fn fixed_errors_are_not_counted() {
        let mut report = LintReport::default();
        report.push(Finding::error("block-no-empty", "empty block").fixed());
        assert_eq!(report.error_count(), 0);
        assert!(report.findings[0].to_string().ends_with("(fixed)"));
        assert!(report.check("styles", &LintConfig::default()).is_ok());
    }
}
