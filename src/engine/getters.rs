use std::sync::LazyLock;

use regex::Regex;

use super::imports::word_pattern;
use super::types::CheckKind;
use super::EngineError;

/// `get name(`, the start of a getter-style method declaration.
#[allow(clippy::expect_used)]
static GETTER_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bget\s+[\w$]+\s*\(").expect("valid regex pattern"));

/// Return-type annotation after the getter's parameter list.
#[allow(clippy::expect_used)]
static RETURN_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bget\s+[\w$]+\s*\([^)]*\)\s*:\s*([^{;=]+)").expect("valid regex pattern")
});

#[allow(clippy::expect_used)]
static PROMISE_WRAPPER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Promise\s*<\s*(.+?)\s*>$").expect("valid regex pattern"));

/// Getters must declare one of the allowed element/matcher types.
pub struct GetterTypeRule {
    allowed: Vec<String>,
    /// Untyped fallback: an allowed type right before a `.get` style access
    access: Option<Regex>,
}

impl GetterTypeRule {
    pub fn new(allowed: &[String]) -> Result<Self, EngineError> {
        let access = match word_pattern(CheckKind::GetterType.as_str(), allowed)? {
            Some(types) => {
                let pattern = format!(
                    r#"{}(?:\.prototype\.get|\.get|\['get|\["get)"#,
                    types.as_str()
                );
                Some(
                    Regex::new(&pattern).map_err(|source| EngineError::InvalidPattern {
                        rule: CheckKind::GetterType.as_str().to_string(),
                        source,
                    })?,
                )
            }
            None => None,
        };
        Ok(Self {
            allowed: allowed.to_vec(),
            access,
        })
    }

    /// True when `line` declares a getter without an allowed return type.
    pub fn violates(&self, line: &str) -> bool {
        if !GETTER_DECL.is_match(line) {
            return false;
        }

        if let Some(annotation) = RETURN_TYPE.captures(line).and_then(|caps| caps.get(1)) {
            return !self.is_allowed(annotation.as_str().trim());
        }

        !self.access.as_ref().is_some_and(|re| re.is_match(line))
    }

    fn is_allowed(&self, annotation: &str) -> bool {
        let inner = PROMISE_WRAPPER
            .captures(annotation)
            .and_then(|caps| caps.get(1))
            .map_or(annotation, |m| m.as_str());
        self.allowed.iter().any(|t| t == inner)
    }
}
