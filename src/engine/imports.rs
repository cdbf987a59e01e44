//! Import path rules.
//!
//! A restricted symbol imported on an added line must come from a path that
//! contains a required fragment (e.g. `/framework`). Import lists are often
//! split across lines, so the path is looked up over the whole import
//! statement the line belongs to, not just the line itself.

use std::sync::LazyLock;

use regex::Regex;

use super::hunks::PatchIndex;
use super::types::CheckKind;
use super::EngineError;
use crate::config::SymbolRule;

#[allow(clippy::expect_used)]
static IMPORT_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bimport\b").expect("valid regex pattern"));

/// Start of the module-path part of an import: `from '...'`.
#[allow(clippy::expect_used)]
static FROM_CLAUSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bfrom\s*['"]"#).expect("valid regex pattern"));

#[allow(clippy::expect_used)]
static IMPORT_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:\bfrom\s*|\bimport\s*\(?\s*)['"]([^'"]+)['"]"#).expect("valid regex pattern")
});

/// A line that only lists names, e.g. `Assertions,` or `Gestures as G,`.
#[allow(clippy::expect_used)]
static NAME_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[\w$]+(?:\s+as\s+[\w$]+)?\s*,?\s*)+$").expect("valid regex pattern")
});

/// Regex matching any of `symbols` as a whole word, or `None` for an empty list.
pub(crate) fn word_pattern(rule: &str, symbols: &[String]) -> Result<Option<Regex>, EngineError> {
    symbol_pattern(rule, symbols, true)
}

/// Regex matching any of `symbols` anywhere in the text, so `AssertionsHelper`
/// and `'../utils/Gestures'` both count.
fn name_pattern(rule: &str, symbols: &[String]) -> Result<Option<Regex>, EngineError> {
    symbol_pattern(rule, symbols, false)
}

fn symbol_pattern(rule: &str, symbols: &[String], whole_word: bool) -> Result<Option<Regex>, EngineError> {
    if symbols.is_empty() {
        return Ok(None);
    }
    let alternatives: Vec<String> = symbols.iter().map(|s| regex::escape(s)).collect();
    let pattern = if whole_word {
        format!(r"\b(?:{})\b", alternatives.join("|"))
    } else {
        format!("(?:{})", alternatives.join("|"))
    };
    Regex::new(&pattern)
        .map(Some)
        .map_err(|source| EngineError::InvalidPattern {
            rule: rule.to_string(),
            source,
        })
}

fn is_import(line: &str) -> bool {
    IMPORT_KEYWORD.is_match(line)
}

fn opens_list(line: &str) -> bool {
    line.contains('{') && !line.contains('}')
}

fn closes_list(line: &str) -> bool {
    line.contains('}') && !line.contains('{')
}

/// Text a symbol is looked for in. An `import` line counts as a whole; a
/// continuation line of a brace list only counts before `from '...'`.
fn symbol_text(line: &str) -> &str {
    if is_import(line) {
        return line;
    }
    match FROM_CLAUSE.find(line) {
        Some(m) => &line[..m.start()],
        None => line,
    }
}

fn import_path(line: &str) -> Option<&str> {
    IMPORT_PATH
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Added-line ordinals `(start, end)` of the import statement containing
/// the added line `ordinal`, or `None` when the line is not part of one.
pub(crate) fn import_span(index: &PatchIndex<'_>, ordinal: usize) -> Option<(usize, usize)> {
    let line = index.added_text(ordinal)?;

    if is_import(line) {
        let end = if opens_list(line) {
            scan_forward(index, ordinal)
        } else {
            ordinal
        };
        return Some((ordinal, end));
    }

    if closes_list(line) {
        let start = scan_backward(index, ordinal)?;
        return Some((start, ordinal));
    }

    if NAME_LIST.is_match(line) {
        let start = scan_backward(index, ordinal)?;
        return Some((start, scan_forward(index, ordinal)));
    }

    None
}

/// Last ordinal of a brace list opened at `from`: the closing-brace line,
/// or the line before the next import statement.
fn scan_forward(index: &PatchIndex<'_>, from: usize) -> usize {
    let total = index.added().len();
    for ordinal in from + 1..total {
        let Some(line) = index.added_text(ordinal) else {
            break;
        };
        if is_import(line) {
            return ordinal - 1;
        }
        if line.contains('}') {
            return ordinal;
        }
    }
    total.saturating_sub(1).max(from)
}

/// Ordinal of the `import` line whose brace list is still open at `from`.
fn scan_backward(index: &PatchIndex<'_>, from: usize) -> Option<usize> {
    for ordinal in (0..from).rev() {
        let line = index.added_text(ordinal)?;
        if is_import(line) {
            return opens_list(line).then_some(ordinal);
        }
        if line.contains('}') || line.contains(';') {
            return None;
        }
    }
    None
}

fn span_contains(index: &PatchIndex<'_>, (start, end): (usize, usize), fragment: &str) -> bool {
    (start..=end)
        .filter_map(|o| index.added_text(o))
        .any(|line| line.contains(fragment))
}

struct CompiledSymbolRule {
    kind: CheckKind,
    pattern: Regex,
}

/// Symbol rules sharing one required path fragment. Reports at most one
/// issue per line: the first rule whose symbols the line imports.
pub struct ImportPathRules {
    required_path: String,
    rules: Vec<CompiledSymbolRule>,
}

impl ImportPathRules {
    pub fn new(required_path: &str, rules: &[SymbolRule]) -> Result<Self, EngineError> {
        let mut compiled = Vec::new();
        for rule in rules {
            if let Some(pattern) = name_pattern(rule.kind.as_str(), &rule.symbols)? {
                compiled.push(CompiledSymbolRule {
                    kind: rule.kind,
                    pattern,
                });
            }
        }
        Ok(Self {
            required_path: required_path.to_string(),
            rules: compiled,
        })
    }

    pub fn check(&self, index: &PatchIndex<'_>, ordinal: usize) -> Option<CheckKind> {
        let line = index.added_text(ordinal)?;
        let text = symbol_text(line);
        let rule = self.rules.iter().find(|r| r.pattern.is_match(text))?;
        let span = import_span(index, ordinal)?;
        if span_contains(index, span, &self.required_path) {
            None
        } else {
            Some(rule.kind)
        }
    }
}

/// Flags imports of the given symbols whose module path ends in `.ts`.
pub struct NoTsExtensionRule {
    symbols: Option<Regex>,
}

impl NoTsExtensionRule {
    pub fn new(symbols: &[String]) -> Result<Self, EngineError> {
        Ok(Self {
            symbols: name_pattern(CheckKind::AssertionsNoTs.as_str(), symbols)?,
        })
    }

    pub fn check(&self, index: &PatchIndex<'_>, ordinal: usize) -> bool {
        let (Some(symbols), Some(line)) = (&self.symbols, index.added_text(ordinal)) else {
            return false;
        };
        if !symbols.is_match(symbol_text(line)) {
            return false;
        }
        let Some((start, end)) = import_span(index, ordinal) else {
            return false;
        };
        (start..=end)
            .filter_map(|o| index.added_text(o))
            .find_map(import_path)
            .is_some_and(|path| path.ends_with(".ts"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;

    fn framework_rules() -> ImportPathRules {
        let config = RulesConfig::default();
        ImportPathRules::new(&config.framework_path, &config.framework_imports).unwrap()
    }

    fn fixture_rules() -> ImportPathRules {
        let config = RulesConfig::default();
        ImportPathRules::new(&config.fixtures_path, &config.fixture_imports).unwrap()
    }

    fn check_all(rules: &ImportPathRules, patch: &str) -> Vec<(usize, CheckKind)> {
        let index = PatchIndex::parse(patch);
        (0..index.added().len())
            .filter_map(|o| rules.check(&index, o).map(|k| (o, k)))
            .collect()
    }

    #[test]
    fn test_single_line_import_outside_framework() {
        let found = check_all(&framework_rules(), "+import { Assertions } from '../Assertions';");
        assert_eq!(found, vec![(0, CheckKind::AssertionsFramework)]);
    }

    #[test]
    fn test_single_line_import_from_framework() {
        let found = check_all(
            &framework_rules(),
            "+import { Assertions } from '../framework/Assertions';",
        );
        assert!(found.is_empty());
    }

    #[test]
    fn test_each_symbol_maps_to_its_kind() {
        let patch = "+import Gestures from '../../utils/Gestures';\n+import Matchers from '../../utils/Matchers';";
        let found = check_all(&framework_rules(), patch);
        assert_eq!(
            found,
            vec![(0, CheckKind::GesturesFramework), (1, CheckKind::MatchersFramework)]
        );
    }

    #[test]
    fn test_one_issue_per_line_when_symbols_co_occur() {
        let found = check_all(
            &framework_rules(),
            "+import { Assertions, Gestures, Matchers } from '../utils';",
        );
        assert_eq!(found, vec![(0, CheckKind::AssertionsFramework)]);
    }

    #[test]
    fn test_symbol_usage_is_not_an_import() {
        let found = check_all(&framework_rules(), "+await Assertions.checkIfVisible(button);");
        assert!(found.is_empty());
    }

    #[test]
    fn test_named_import_from_old_module_path() {
        let found = check_all(&framework_rules(), "+import { tap } from '../../utils/Gestures';");
        assert_eq!(found, vec![(0, CheckKind::GesturesFramework)]);
    }

    #[test]
    fn test_symbol_prefix_of_imported_name() {
        let found = check_all(
            &framework_rules(),
            "+import AssertionsHelper from '../../helpers/AssertionsHelper';",
        );
        assert_eq!(found, vec![(0, CheckKind::AssertionsFramework)]);
    }

    #[test]
    fn test_continuation_line_ignores_path_text() {
        let patch = "+import {
+  tap } from '../framework/Gestures';";
        assert!(check_all(&framework_rules(), patch).is_empty());
        let patch = "+import {
+  expectVisible,
+} from '../framework/Assertions';";
        assert!(check_all(&framework_rules(), patch).is_empty());
    }

    #[test]
    fn test_multi_line_import_resolved_forward() {
        let patch = "+import {\n+  Assertions,\n+  Gestures,\n+} from '../../framework';";
        assert!(check_all(&framework_rules(), patch).is_empty());
    }

    #[test]
    fn test_multi_line_import_opening_line_resolved_forward() {
        let patch = "+import { Assertions,\n+  Gestures } from '../../framework';";
        assert!(check_all(&framework_rules(), patch).is_empty());
    }

    #[test]
    fn test_multi_line_import_without_fragment_flags_each_line_once() {
        let patch = "+import { Assertions,\n+  Gestures,\n+} from '../../utils';";
        let found = check_all(&framework_rules(), patch);
        assert_eq!(
            found,
            vec![(0, CheckKind::AssertionsFramework), (1, CheckKind::GesturesFramework)]
        );
    }

    #[test]
    fn test_closing_line_resolved_backward() {
        let patch = "+import {\n+  Something,\n+  Matchers } from '../framework/index';";
        assert!(check_all(&framework_rules(), patch).is_empty());
        let patch = "+import {\n+  Something,\n+  Matchers } from '../helpers';";
        assert_eq!(
            check_all(&framework_rules(), patch),
            vec![(2, CheckKind::MatchersFramework)]
        );
    }

    #[test]
    fn test_forward_scan_stops_at_next_import() {
        let patch = "+import { Assertions,\n+import { x } from '../framework/x';";
        assert_eq!(
            check_all(&framework_rules(), patch),
            vec![(0, CheckKind::AssertionsFramework)]
        );
    }

    #[test]
    fn test_object_literal_is_not_an_import_list() {
        let patch = "+import { a } from 'b';\n+const helpers = {\n+  Assertions,\n+};";
        assert!(check_all(&framework_rules(), patch).is_empty());
    }

    #[test]
    fn test_fixture_import_needs_nested_path() {
        let rules = fixture_rules();
        assert_eq!(
            check_all(&rules, "+import { withFixtures } from '../framework/FixtureHelper';"),
            vec![(0, CheckKind::FixturesFramework)]
        );
        assert!(check_all(
            &rules,
            "+import { withFixtures } from '../framework/fixtures/FixtureHelper';"
        )
        .is_empty());
        assert_eq!(
            check_all(&rules, "+import { loadFixture } from '../fixture-helper';"),
            vec![(0, CheckKind::FixtureUtilsFramework)]
        );
    }

    #[test]
    fn test_no_ts_extension() {
        let rule = NoTsExtensionRule::new(&["Assertions".to_string()]).unwrap();
        let index = PatchIndex::parse("+import { Assertions } from '../Assertions.ts';");
        assert!(rule.check(&index, 0));
        let index = PatchIndex::parse("+import { Assertions } from '../framework/Assertions';");
        assert!(!rule.check(&index, 0));
        let index = PatchIndex::parse("+import { Gestures } from '../Gestures.ts';");
        assert!(!rule.check(&index, 0));
        let index = PatchIndex::parse("+import { expectVisible } from '../../utils/Assertions.ts';");
        assert!(rule.check(&index, 0));
    }

    #[test]
    fn test_no_ts_extension_multi_line() {
        let rule = NoTsExtensionRule::new(&["Assertions".to_string()]).unwrap();
        let index = PatchIndex::parse("+import {\n+  Assertions,\n+} from '../framework/Assertions.ts';");
        assert!(rule.check(&index, 1));
    }

    #[test]
    fn test_empty_symbol_list_never_matches() {
        let rule = NoTsExtensionRule::new(&[]).unwrap();
        let index = PatchIndex::parse("+import { Assertions } from '../Assertions.ts';");
        assert!(!rule.check(&index, 0));
    }
}
