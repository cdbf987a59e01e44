//! Test-block fixture check.
//!
//! Every `it(...)` block added to a spec file must call the fixture helper.
//! Block extent is found by counting parentheses and braces line by line;
//! string literals and comments are not understood, so unbalanced braces
//! inside them shift the detected boundary.
//!
//! The body ends when brace depth goes negative, and also when it drops
//! back to zero after a brace has opened. The second condition is stricter
//! than a pure negative-depth rule: a one-line `it(...{ ... });` block ends
//! on its own line, so a fixture call in the next sibling test does not
//! satisfy it.

use std::sync::LazyLock;

use regex::Regex;

use super::hunks::{LineKind, PatchIndex};
use super::EngineError;

/// `it(`, `it.only(`, `it.skip(` and other `it.<modifier>(` forms.
#[allow(clippy::expect_used)]
static TEST_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^it(?:\.\w+)?\s*\(").expect("valid regex pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    /// Declaration parens still open, e.g. `it(` followed by its arguments
    ScanningDeclaration { parens: i64 },
    ScanningBody { braces: i64, opened: bool },
    Found,
    ClosedWithoutMatch,
}

impl BlockState {
    fn is_terminal(&self) -> bool {
        matches!(self, BlockState::Found | BlockState::ClosedWithoutMatch)
    }

    /// Body scan state after the declaration line itself.
    fn enter_body(decl: &str) -> Self {
        let braces = depth_delta(decl, '{', '}');
        let opened = decl.contains('{');
        if braces < 0 || (opened && braces <= 0) {
            BlockState::ClosedWithoutMatch
        } else {
            BlockState::ScanningBody { braces, opened }
        }
    }
}

fn depth_delta(text: &str, open: char, close: char) -> i64 {
    text.chars().fold(0, |depth, c| {
        if c == open {
            depth + 1
        } else if c == close {
            depth - 1
        } else {
            depth
        }
    })
}

pub struct FixtureScanner {
    suffixes: Vec<String>,
    token: String,
    call: Option<Regex>,
}

impl FixtureScanner {
    pub fn new(suffixes: &[String], token: &str) -> Result<Self, EngineError> {
        let call = if token.is_empty() {
            None
        } else {
            let pattern = format!(r"\b{}(?:\s*\(|\.)", regex::escape(token));
            Some(Regex::new(&pattern).map_err(|source| EngineError::InvalidPattern {
                rule: "test-withfixtures".to_string(),
                source,
            })?)
        };
        Ok(Self {
            suffixes: suffixes.to_vec(),
            token: token.to_string(),
            call,
        })
    }

    pub fn applies_to(&self, filename: &str) -> bool {
        self.call.is_some() && self.suffixes.iter().any(|s| filename.ends_with(s.as_str()))
    }

    /// Positions (into `index.lines()`) of added test declarations whose
    /// block never calls the fixture helper.
    pub fn missing_fixture(&self, index: &PatchIndex<'_>) -> Vec<usize> {
        index
            .added()
            .iter()
            .copied()
            .filter(|&pos| TEST_DECL.is_match(index.lines()[pos].cleaned()))
            .filter(|&pos| self.scan_block(index, pos) == BlockState::ClosedWithoutMatch)
            .collect()
    }

    /// Runs the block state machine for the declaration at `pos` to a terminal state.
    pub fn scan_block(&self, index: &PatchIndex<'_>, pos: usize) -> BlockState {
        let Some(call) = &self.call else {
            return BlockState::Found;
        };
        let lines = index.lines();
        let decl = lines[pos].cleaned();
        if decl.contains(&self.token) {
            return BlockState::Found;
        }

        let parens = depth_delta(decl, '(', ')');
        let mut state = if parens > 0 {
            BlockState::ScanningDeclaration { parens }
        } else {
            BlockState::enter_body(decl)
        };

        // Multi-line signature: removed lines count too, the old side may
        // still hold part of the argument list.
        if let BlockState::ScanningDeclaration { mut parens } = state {
            for line in lines[pos + 1..]
                .iter()
                .filter(|l| l.kind != LineKind::HunkHeader)
            {
                let text = line.cleaned();
                if text.contains(&self.token) {
                    return BlockState::Found;
                }
                parens += depth_delta(text, '(', ')');
                if parens <= 0 {
                    break;
                }
            }
            state = BlockState::enter_body(decl);
        }

        for line in lines[pos + 1..]
            .iter()
            .filter(|l| matches!(l.kind, LineKind::Added | LineKind::Context))
        {
            let BlockState::ScanningBody { braces, opened } = state else {
                break;
            };
            let text = line.cleaned();
            if call.is_match(text) {
                return BlockState::Found;
            }
            let braces = braces + depth_delta(text, '{', '}');
            let opened = opened || text.contains('{');
            state = if braces < 0 || (opened && braces <= 0) {
                BlockState::ClosedWithoutMatch
            } else {
                BlockState::ScanningBody { braces, opened }
            };
        }

        if state.is_terminal() {
            state
        } else {
            BlockState::ClosedWithoutMatch
        }
    }
}
