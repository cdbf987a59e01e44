use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::engine::CheckKind;

pub const DEFAULT_CONFIG_FILE: &str = ".pr-migration-lint.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .pr-migration-lint.toml.
///
/// All fields are optional; the tool works with zero config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// GitHub-specific settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Migration rules applied to every added line
    #[serde(default)]
    pub rules: RulesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubConfig {
    /// GitHub API token. If None, falls back to GITHUB_TOKEN env var.
    pub token: Option<String>,

    /// REST API root, override for GitHub Enterprise
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: default_api_url(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

/// Symbols whose imports must come from a required path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SymbolRule {
    pub kind: CheckKind,
    pub symbols: Vec<String>,
}

impl SymbolRule {
    fn new(kind: CheckKind, symbols: &[&str]) -> Self {
        Self {
            kind,
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Path fragment every framework import must contain
    pub framework_path: String,
    pub framework_imports: Vec<SymbolRule>,

    /// More specific fragment required for fixture helpers
    pub fixtures_path: String,
    pub fixture_imports: Vec<SymbolRule>,

    /// Symbols whose import path must not end in `.ts`
    pub no_ts_symbols: Vec<String>,

    /// Return types a getter may declare (directly or inside `Promise<...>`)
    pub getter_types: Vec<String>,

    /// Only files ending in one of these get the test-block fixture check
    pub test_file_suffixes: Vec<String>,

    /// Call every `it(...)` block must contain
    pub fixture_call: String,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            framework_path: "/framework".to_string(),
            framework_imports: vec![
                SymbolRule::new(CheckKind::AssertionsFramework, &["Assertions"]),
                SymbolRule::new(CheckKind::GesturesFramework, &["Gestures"]),
                SymbolRule::new(CheckKind::MatchersFramework, &["Matchers"]),
            ],
            fixtures_path: "/framework/fixtures".to_string(),
            fixture_imports: vec![
                SymbolRule::new(CheckKind::FixturesFramework, &["FixtureBuilder", "withFixtures"]),
                SymbolRule::new(
                    CheckKind::FixtureUtilsFramework,
                    &[
                        "FixtureUtils",
                        "loadFixture",
                        "startFixtureServer",
                        "stopFixtureServer",
                        "getFixturesServerPort",
                        "getMockServerPort",
                    ],
                ),
            ],
            no_ts_symbols: vec!["Assertions".to_string()],
            getter_types: [
                "DetoxElement",
                "TypedDetoxElement",
                "DetoxMatcher",
                "WebElement",
                "NativeElement",
                "IndexableNativeElement",
                "SystemElement",
                "IndexableSystemElement",
                "NativeMatcher",
                "WebMatcher",
                "SystemMatcher",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            test_file_suffixes: [".spec.ts", ".spec.js", ".spec.tsx", ".spec.jsx"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            fixture_call: "withFixtures".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from .pr-migration-lint.toml in the
    /// current directory. Returns default config if that file doesn't exist;
    /// an explicit path that doesn't exist is an error.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::load_from(path)?
                } else {
                    Config::default()
                }
            }
        };

        if config.github.token.is_none() {
            if let Ok(token) = std::env::var("GITHUB_TOKEN") {
                config.github.token = Some(token);
            }
        }

        Ok(config)
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.github.token.is_none());
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.rules.framework_path, "/framework");
        assert_eq!(config.rules.fixture_call, "withFixtures");
        assert_eq!(config.rules.framework_imports.len(), 3);
    }

    #[test]
    fn test_parse_partial_rules_keeps_defaults() {
        let toml_str = r#"
[github]
api_url = "https://github.example.com/api/v3"

[rules]
fixture_call = "withFixtureServer"
test_file_suffixes = [".e2e.ts"]
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.github.api_url, "https://github.example.com/api/v3");
        assert_eq!(config.rules.fixture_call, "withFixtureServer");
        assert_eq!(config.rules.test_file_suffixes, vec![".e2e.ts".to_string()]);
        assert_eq!(config.rules.framework_path, "/framework");
        assert!(!config.rules.getter_types.is_empty());
    }

    #[test]
    fn test_parse_symbol_rules() {
        let toml_str = r#"
[[rules.framework_imports]]
kind = "gestures-framework"
symbols = ["Gestures", "Swipe"]
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.rules.framework_imports.len(), 1);
        assert_eq!(config.rules.framework_imports[0].kind, CheckKind::GesturesFramework);
        assert_eq!(config.rules.framework_imports[0].symbols, vec!["Gestures", "Swipe"]);
    }

    #[test]
    fn test_unknown_check_kind_is_parse_error() {
        let toml_str = r#"
[[rules.framework_imports]]
kind = "not-a-kind"
symbols = ["X"]
"#;
        assert!(toml::from_str::<Config>(toml_str).is_err());
    }

    #[test]
    fn test_load_from_missing_file() {
        let result = Config::load_from(Path::new("/nonexistent/.pr-migration-lint.toml"));
        assert!(matches!(result, Err(ConfigError::FileRead(_))));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("pr_migration_lint_config_test.toml");
        std::fs::write(&path, "[rules]\nframework_path = \"/e2e/framework\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.rules.framework_path, "/e2e/framework");
        std::fs::remove_file(&path).ok();
    }
}
