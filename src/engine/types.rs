use serde::{Deserialize, Serialize, Serializer};

/// The rule that produced an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckKind {
    AssertionsFramework,
    AssertionsNoTs,
    GesturesFramework,
    GetterType,
    FixturesFramework,
    MatchersFramework,
    TestWithfixtures,
    FixtureUtilsFramework,
}

impl CheckKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::AssertionsFramework => "assertions-framework",
            CheckKind::AssertionsNoTs => "assertions-no-ts",
            CheckKind::GesturesFramework => "gestures-framework",
            CheckKind::GetterType => "getter-type",
            CheckKind::FixturesFramework => "fixtures-framework",
            CheckKind::MatchersFramework => "matchers-framework",
            CheckKind::TestWithfixtures => "test-withfixtures",
            CheckKind::FixtureUtilsFramework => "fixture-utils-framework",
        }
    }

    /// One-line explanation shown next to each issue in reports.
    pub fn description(&self) -> &'static str {
        match self {
            CheckKind::AssertionsFramework => "Assertions must be imported from the framework directory",
            CheckKind::AssertionsNoTs => "Assertions import path must not carry a .ts extension",
            CheckKind::GesturesFramework => "Gestures must be imported from the framework directory",
            CheckKind::GetterType => "Getter is missing an allowed element/matcher return type",
            CheckKind::FixturesFramework => "Fixture helpers must be imported from framework/fixtures",
            CheckKind::MatchersFramework => "Matchers must be imported from the framework directory",
            CheckKind::TestWithfixtures => "Test block does not call withFixtures",
            CheckKind::FixtureUtilsFramework => "Fixture utilities must be imported from framework/fixtures",
        }
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Best-effort line number in the changed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineNumber {
    Known(usize),
    Unknown,
}

impl std::fmt::Display for LineNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineNumber::Known(n) => write!(f, "{}", n),
            LineNumber::Unknown => write!(f, "?"),
        }
    }
}

// Serialized as a bare integer, or the string "unknown".
impl Serialize for LineNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LineNumber::Known(n) => serializer.serialize_u64(*n as u64),
            LineNumber::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

/// A single rule violation found on an added line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Path of the file containing the violation
    pub file: String,
    /// Line in the new version of the file
    pub line: LineNumber,
    /// Offending line with the diff marker stripped and whitespace trimmed
    pub snippet: String,
    #[serde(rename = "checkKind")]
    pub check: CheckKind,
}
