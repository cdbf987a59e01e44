pub mod fixtures;
pub mod getters;
pub mod hunks;
pub mod imports;
pub mod types;

pub use types::{CheckKind, Issue, LineNumber};

use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::RulesConfig;
use crate::pr::FileDiff;
use fixtures::FixtureScanner;
use getters::GetterTypeRule;
use hunks::PatchIndex;
use imports::{ImportPathRules, NoTsExtensionRule};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid pattern for rule {rule}: {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },
}

/// Runs the migration rules over one file's patch at a time.
///
/// Rules are compiled once from [`RulesConfig`]; checking a patch is a pure
/// function of its text, so the same engine can be shared across files and
/// threads.
pub struct DiffRuleEngine {
    framework_imports: ImportPathRules,
    no_ts: NoTsExtensionRule,
    fixture_imports: ImportPathRules,
    getters: GetterTypeRule,
    fixtures: FixtureScanner,
}

impl DiffRuleEngine {
    pub fn new(config: &RulesConfig) -> Result<Self, EngineError> {
        Ok(Self {
            framework_imports: ImportPathRules::new(
                &config.framework_path,
                &config.framework_imports,
            )?,
            no_ts: NoTsExtensionRule::new(&config.no_ts_symbols)?,
            fixture_imports: ImportPathRules::new(&config.fixtures_path, &config.fixture_imports)?,
            getters: GetterTypeRule::new(&config.getter_types)?,
            fixtures: FixtureScanner::new(&config.test_file_suffixes, &config.fixture_call)?,
        })
    }

    /// Check one changed file. Files without a patch (binary, too large) yield no issues.
    pub fn check_file(&self, file: &FileDiff) -> Vec<Issue> {
        match file.patch.as_deref() {
            Some(patch) => self.check_patch(&file.filename, patch),
            None => {
                debug!(file = %file.filename, "no patch, skipping rules");
                Vec::new()
            }
        }
    }

    /// Check a single file's unified-diff patch.
    ///
    /// Per added line, in order: framework import path, `.ts` extension,
    /// fixtures import path, getter type. Test-block issues follow, in
    /// declaration order.
    #[instrument(level = "debug", skip(self, patch), fields(patch_bytes = patch.len()))]
    pub fn check_patch(&self, filename: &str, patch: &str) -> Vec<Issue> {
        let index = PatchIndex::parse(patch);
        let mut issues = Vec::new();

        for ordinal in 0..index.added().len() {
            let Some(snippet) = index.added_text(ordinal) else {
                continue;
            };
            let mut kinds = Vec::new();
            kinds.extend(self.framework_imports.check(&index, ordinal));
            if self.no_ts.check(&index, ordinal) {
                kinds.push(CheckKind::AssertionsNoTs);
            }
            kinds.extend(self.fixture_imports.check(&index, ordinal));
            if self.getters.violates(snippet) {
                kinds.push(CheckKind::GetterType);
            }

            if kinds.is_empty() {
                continue;
            }
            let line = index.added_line_number(ordinal);
            issues.extend(kinds.into_iter().map(|check| Issue {
                file: filename.to_string(),
                line,
                snippet: snippet.to_string(),
                check,
            }));
        }

        if self.fixtures.applies_to(filename) {
            for pos in self.fixtures.missing_fixture(&index) {
                issues.push(Issue {
                    file: filename.to_string(),
                    line: index.line_number_at(pos),
                    snippet: index.lines()[pos].cleaned().to_string(),
                    check: CheckKind::TestWithfixtures,
                });
            }
        }

        debug!(issues = issues.len(), "patch checked");
        issues
    }
}
