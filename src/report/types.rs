use serde::Serialize;
use std::collections::BTreeMap;

use crate::engine::{CheckKind, Issue};
use crate::pr::PullRequest;

/// PR metadata shown at the top of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrMeta {
    pub title: String,
    pub url: String,
    pub author: String,
}

impl From<&PullRequest> for PrMeta {
    fn from(pr: &PullRequest) -> Self {
        Self {
            title: pr.title.clone(),
            url: pr.url.clone(),
            author: pr.author.clone(),
        }
    }
}

/// Result of checking every file of one PR.
///
/// Only grows through [`ValidationReport::record_file`], so every issue's
/// file is always listed in `checked_files` and the count always matches.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    #[serde(rename = "prMeta")]
    pub pr: PrMeta,
    issues: Vec<Issue>,
    files_checked_count: usize,
    checked_files: Vec<String>,
}

impl ValidationReport {
    pub fn new(pr: PrMeta) -> Self {
        Self {
            pr,
            issues: Vec::new(),
            files_checked_count: 0,
            checked_files: Vec::new(),
        }
    }

    /// Record one checked file and the issues found in it.
    pub fn record_file(&mut self, filename: &str, issues: Vec<Issue>) {
        self.checked_files.push(filename.to_string());
        self.files_checked_count = self.checked_files.len();
        self.issues.extend(issues);
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn files_checked_count(&self) -> usize {
        self.files_checked_count
    }

    pub fn checked_files(&self) -> &[String] {
        &self.checked_files
    }

    pub fn passed(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issue count per check kind, in kind order.
    pub fn counts_by_kind(&self) -> BTreeMap<CheckKind, usize> {
        let mut counts = BTreeMap::new();
        for issue in &self.issues {
            *counts.entry(issue.check).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::LineNumber;

    fn issue(file: &str, check: CheckKind) -> Issue {
        Issue {
            file: file.to_string(),
            line: LineNumber::Known(1),
            snippet: "x".to_string(),
            check,
        }
    }

    fn meta() -> PrMeta {
        PrMeta {
            title: "Test PR".to_string(),
            url: "https://github.com/org/repo/pull/1".to_string(),
            author: "testuser".to_string(),
        }
    }

    #[test]
    fn test_record_file_keeps_counts_in_sync() {
        let mut report = ValidationReport::new(meta());
        report.record_file("a.ts", vec![issue("a.ts", CheckKind::GetterType)]);
        report.record_file("logo.png", vec![]);
        assert_eq!(report.files_checked_count(), 2);
        assert_eq!(report.checked_files(), &["a.ts".to_string(), "logo.png".to_string()]);
        assert!(report
            .issues()
            .iter()
            .all(|i| report.checked_files().contains(&i.file)));
        assert!(!report.passed());
    }

    #[test]
    fn test_counts_by_kind() {
        let mut report = ValidationReport::new(meta());
        report.record_file(
            "a.spec.ts",
            vec![
                issue("a.spec.ts", CheckKind::TestWithfixtures),
                issue("a.spec.ts", CheckKind::AssertionsFramework),
                issue("a.spec.ts", CheckKind::TestWithfixtures),
            ],
        );
        let counts = report.counts_by_kind();
        assert_eq!(counts[&CheckKind::TestWithfixtures], 2);
        assert_eq!(counts[&CheckKind::AssertionsFramework], 1);
        assert_eq!(counts.keys().next(), Some(&CheckKind::AssertionsFramework));
    }

    #[test]
    fn test_report_json_shape() {
        let mut report = ValidationReport::new(meta());
        report.record_file("a.ts", vec![]);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["prMeta"]["author"], "testuser");
        assert_eq!(value["filesCheckedCount"], 1);
        assert_eq!(value["checkedFiles"][0], "a.ts");
        assert!(value["issues"].as_array().unwrap().is_empty());
    }
}
