//! Baseline support: record the current findings once, then only surface
//! findings that are new relative to that recording.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use thiserror::Error;

use crate::analysis::Finding;

/// Baseline errors
#[derive(Error, Debug)]
pub enum BaselineError {
    #[error("Failed to read baseline file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse baseline: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Baseline version mismatch")]
    VersionMismatch,
}

/// Current baseline format version
const BASELINE_VERSION: u32 = 1;

/// Lines may drift as unrelated edits land above a finding
const LINE_DRIFT_TOLERANCE: i64 = 10;

/// A fingerprint for a finding that can be matched across runs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FindingFingerprint {
    /// Relative file path
    pub file: String,
    /// Issue id
    pub issue: String,
    /// Qualified symbol, when the finding is about one
    pub symbol: Option<String>,
    /// Line number (approximate, may shift slightly)
    pub line: usize,
}

impl FindingFingerprint {
    pub fn from_finding(finding: &Finding, project_root: &Path) -> Self {
        Self {
            file: relative_path(finding, project_root),
            issue: finding.issue.id().to_string(),
            symbol: finding.symbol.clone(),
            line: finding.location.line,
        }
    }

    /// Check if this fingerprint matches a finding (with some tolerance)
    pub fn matches(&self, finding: &Finding, project_root: &Path) -> bool {
        if self.file != relative_path(finding, project_root) {
            return false;
        }
        if self.issue != finding.issue.id() {
            return false;
        }
        if self.symbol != finding.symbol {
            return false;
        }
        let drift = (self.line as i64 - finding.location.line as i64).abs();
        drift <= LINE_DRIFT_TOLERANCE
    }
}

fn relative_path(finding: &Finding, project_root: &Path) -> String {
    finding
        .location
        .file
        .strip_prefix(project_root)
        .unwrap_or(&finding.location.file)
        .to_string_lossy()
        .to_string()
}

/// A baseline containing known findings to ignore
#[derive(Debug, Serialize, Deserialize)]
pub struct Baseline {
    /// Baseline format version
    pub version: u32,
    /// Known findings to ignore
    pub findings: Vec<FindingFingerprint>,
    /// Total count at baseline time
    pub total_at_baseline: usize,
}

impl Baseline {
    /// Create a new baseline from the current findings
    pub fn from_findings(findings: &[Finding], project_root: &Path) -> Self {
        let fingerprints: Vec<FindingFingerprint> = findings
            .iter()
            .map(|f| FindingFingerprint::from_finding(f, project_root))
            .collect();

        Self {
            version: BASELINE_VERSION,
            total_at_baseline: fingerprints.len(),
            findings: fingerprints,
        }
    }

    /// Load a baseline from a file
    pub fn load(path: &Path) -> Result<Self, BaselineError> {
        let file = fs::File::open(path)?;
        let reader = BufReader::new(file);
        let baseline: Self = serde_json::from_reader(reader)?;

        if baseline.version != BASELINE_VERSION {
            return Err(BaselineError::VersionMismatch);
        }

        Ok(baseline)
    }

    /// Save baseline to a file
    pub fn save(&self, path: &Path) -> Result<(), BaselineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Filter out findings that are in the baseline
    pub fn filter_new<'a>(
        &self,
        findings: &'a [Finding],
        project_root: &Path,
    ) -> Vec<&'a Finding> {
        findings
            .iter()
            .filter(|f| !self.is_baselined(f, project_root))
            .collect()
    }

    /// Check if a finding is in the baseline
    pub fn is_baselined(&self, finding: &Finding, project_root: &Path) -> bool {
        self.findings.iter().any(|fp| fp.matches(finding, project_root))
    }

    /// Get statistics about baseline coverage
    pub fn stats(&self, findings: &[Finding], project_root: &Path) -> BaselineStats {
        let baselined = findings
            .iter()
            .filter(|f| self.is_baselined(f, project_root))
            .count();

        BaselineStats {
            total_in_baseline: self.findings.len(),
            baselined_found: baselined,
            new_findings: findings.len() - baselined,
        }
    }
}

/// Statistics about baseline comparison
#[derive(Debug, Clone)]
pub struct BaselineStats {
    /// Total findings recorded in baseline
    pub total_in_baseline: usize,
    /// Number of current findings that match baseline
    pub baselined_found: usize,
    /// Number of new findings not in baseline
    pub new_findings: usize,
}

impl std::fmt::Display for BaselineStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} new findings ({} baselined, {} in baseline file)",
            self.new_findings, self.baselined_found, self.total_in_baseline
        )
    }
}
