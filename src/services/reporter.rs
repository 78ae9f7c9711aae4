use std::sync::Mutex;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportLevel {
    Status,
    Success,
    Warning,
    Error,
    /// Machine-oriented payload, e.g. raw backend output kept for diagnosis.
    Diagnostic,
}

impl ReportLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportLevel::Status => "status",
            ReportLevel::Success => "success",
            ReportLevel::Warning => "warning",
            ReportLevel::Error => "error",
            ReportLevel::Diagnostic => "diagnostic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub level: ReportLevel,
    pub message: String,
}

/// Sink for user-facing progress of a run.
pub trait Reporter: Send + Sync {
    fn report(&self, level: ReportLevel, message: &str);

    fn status(&self, message: &str) {
        self.report(ReportLevel::Status, message);
    }

    fn success(&self, message: &str) {
        self.report(ReportLevel::Success, message);
    }

    fn warning(&self, message: &str) {
        self.report(ReportLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.report(ReportLevel::Error, message);
    }

    fn diagnostic(&self, message: &str) {
        self.report(ReportLevel::Diagnostic, message);
    }
}

/// Forwards every report to the `log` facade.
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, level: ReportLevel, message: &str) {
        match level {
            ReportLevel::Status | ReportLevel::Success => log::info!("{}", message),
            ReportLevel::Warning => log::warn!("{}", message),
            ReportLevel::Error => log::error!("{}", message),
            ReportLevel::Diagnostic => log::debug!("{}", message),
        }
    }
}

/// Keeps the reports of one run for display, and logs them as they arrive.
#[derive(Default)]
pub struct RunJournal {
    entries: Mutex<Vec<ReportEntry>>,
}

impl RunJournal {
    pub fn new() -> Self {
        RunJournal::default()
    }

    pub fn entries(&self) -> Vec<ReportEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Reporter for RunJournal {
    fn report(&self, level: ReportLevel, message: &str) {
        LogReporter.report(level, message);
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(ReportEntry {
                level,
                message: message.to_string(),
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn journal_keeps_reports_in_order() {
        let journal = RunJournal::new();
        journal.status("Initializing...");
        journal.warning("No specific container found");
        journal.diagnostic(r#"{"raw_content":"oops"}"#);

        let levels: Vec<ReportLevel> = journal.entries().iter().map(|e| e.level).collect();
        assert_eq!(
            levels,
            vec![
                ReportLevel::Status,
                ReportLevel::Warning,
                ReportLevel::Diagnostic
            ]
        );
        assert_eq!(journal.entries()[1].message, "No specific container found");
    }

    #[test]
    fn levels_serialize_lowercase() {
        let entry = ReportEntry {
            level: ReportLevel::Success,
            message: "done".to_string(),
        };

        assert_eq!(
            serde_json::to_string(&entry).unwrap(),
            r#"{"level":"success","message":"done"}"#
        );
    }
}
