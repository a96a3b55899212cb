use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;

use crate::analysis::{Finding, Severity};

/// JSON reporter for programmatic output
pub struct JsonReporter {
    output_path: Option<PathBuf>,
}

impl JsonReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    pub fn report(&self, findings: &[Finding]) -> Result<()> {
        let report = JsonReport::from_findings(findings);
        let json = serde_json::to_string_pretty(&report).into_diagnostic()?;

        if let Some(path) = &self.output_path {
            std::fs::write(path, &json).into_diagnostic()?;
            println!("Report written to: {}", path.display());
        } else {
            println!("{}", json);
        }

        Ok(())
    }
}

#[derive(Serialize)]
struct JsonReport {
    version: &'static str,
    total_findings: usize,
    findings: Vec<JsonFinding>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonFinding {
    issue: &'static str,
    severity: &'static str,
    reason: &'static str,
    message: String,
    file: String,
    line: usize,
    column: usize,
    symbol: Option<String>,
    required_level: u32,
    effective_min: u32,
}

#[derive(Serialize)]
struct JsonSummary {
    errors: usize,
    warnings: usize,
}

impl JsonReport {
    fn from_findings(findings: &[Finding]) -> Self {
        let mut errors = 0;
        let mut warnings = 0;

        let rendered: Vec<JsonFinding> = findings
            .iter()
            .map(|f| {
                match f.severity {
                    Severity::Error => errors += 1,
                    Severity::Warning => warnings += 1,
                    Severity::None => {}
                }

                JsonFinding {
                    issue: f.issue.id(),
                    severity: f.severity.as_str(),
                    reason: f.reason.as_str(),
                    message: f.message.clone(),
                    file: f.location.file.to_string_lossy().to_string(),
                    line: f.location.line,
                    column: f.location.column,
                    symbol: f.symbol.clone(),
                    required_level: f.required_level,
                    effective_min: f.effective_min,
                }
            })
            .collect();

        Self {
            version: "1.0",
            total_findings: findings.len(),
            findings: rendered,
            summary: JsonSummary { errors, warnings },
        }
    }
}
