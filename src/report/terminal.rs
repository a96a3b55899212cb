use colored::Colorize;
use miette::Result;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::analysis::{Finding, Severity};

/// Terminal reporter with colored output
pub struct TerminalReporter {
    /// Show the required/effective levels next to each finding
    show_levels: bool,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self { show_levels: true }
    }

    pub fn with_levels(mut self, show: bool) -> Self {
        self.show_levels = show;
        self
    }

    pub fn report(&self, findings: &[Finding]) -> Result<()> {
        if findings.is_empty() {
            println!("{}", "No compatibility issues found!".green().bold());
            return Ok(());
        }

        // Group by file
        let mut by_file: HashMap<PathBuf, Vec<&Finding>> = HashMap::new();
        for finding in findings {
            by_file
                .entry(finding.location.file.clone())
                .or_default()
                .push(finding);
        }

        println!();
        println!(
            "{}",
            format!("Found {} compatibility issues:", findings.len())
                .yellow()
                .bold()
        );
        println!();

        let mut files: Vec<_> = by_file.keys().collect();
        files.sort();

        for file in files {
            let items = &by_file[file];

            println!("{}", file.display().to_string().cyan().bold());
            for finding in items {
                self.print_finding(finding);
            }
            println!();
        }

        self.print_summary(findings);

        Ok(())
    }

    fn print_finding(&self, finding: &Finding) {
        let severity_str = match finding.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
            Severity::None => "ok".dimmed(),
        };

        let location = format!("{}:{}", finding.location.line, finding.location.column);

        let levels = if self.show_levels {
            format!(
                " [requires {}, min {}]",
                finding.required_level, finding.effective_min
            )
            .dimmed()
            .to_string()
        } else {
            String::new()
        };

        println!(
            "  {} {} [{}] {}{}",
            location.dimmed(),
            severity_str,
            finding.issue.id().magenta(),
            finding.message,
            levels
        );
    }

    fn print_summary(&self, findings: &[Finding]) {
        let errors = findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count();
        let warnings = findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
            .count();

        println!(
            "{}",
            format!("Summary: {errors} errors, {warnings} warnings").bold()
        );
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}
