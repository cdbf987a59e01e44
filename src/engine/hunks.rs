use std::sync::LazyLock;

use regex::Regex;

use super::types::LineNumber;

/// Regex for `@@ -<old>[,<len>] +<new>[,<len>] @@`, capturing the new-file start.
#[allow(clippy::expect_used)]
static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -\d+(?:,\d+)? \+(\d+)(?:,\d+)? @@").expect("valid regex pattern")
});

/// Classification of a single line of a unified-diff patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    HunkHeader,
    Added,
    Removed,
    Context,
}

#[derive(Debug, Clone)]
pub struct PatchLine<'a> {
    pub kind: LineKind,
    /// Raw line including its diff marker
    pub raw: &'a str,
}

impl<'a> PatchLine<'a> {
    fn classify(raw: &'a str) -> Self {
        let kind = if raw.starts_with("@@") {
            LineKind::HunkHeader
        } else if raw.starts_with('+') && !raw.starts_with("+++") {
            LineKind::Added
        } else if raw.starts_with('-') && !raw.starts_with("---") {
            LineKind::Removed
        } else {
            LineKind::Context
        };
        Self { kind, raw }
    }

    /// Line text with the diff marker stripped and surrounding whitespace trimmed.
    pub fn cleaned(&self) -> &'a str {
        match self.kind {
            LineKind::Added | LineKind::Removed => self.raw[1..].trim(),
            LineKind::Context => self
                .raw
                .strip_prefix(' ')
                .unwrap_or(self.raw)
                .trim(),
            LineKind::HunkHeader => self.raw.trim(),
        }
    }
}

/// Index over one file's patch: every line classified, plus the positions
/// of added lines so an added-line ordinal can be mapped back to a line
/// number in the new file.
#[derive(Debug, Clone)]
pub struct PatchIndex<'a> {
    lines: Vec<PatchLine<'a>>,
    added: Vec<usize>,
}

impl<'a> PatchIndex<'a> {
    pub fn parse(patch: &'a str) -> Self {
        let lines: Vec<PatchLine<'a>> = patch.lines().map(PatchLine::classify).collect();
        let added = lines
            .iter()
            .enumerate()
            .filter(|(_, l)| l.kind == LineKind::Added)
            .map(|(pos, _)| pos)
            .collect();
        Self { lines, added }
    }

    pub fn lines(&self) -> &[PatchLine<'a>] {
        &self.lines
    }

    /// Positions (into `lines()`) of every added line, in patch order.
    pub fn added(&self) -> &[usize] {
        &self.added
    }

    /// Cleaned text of the added line with the given ordinal.
    pub fn added_text(&self, ordinal: usize) -> Option<&'a str> {
        self.added.get(ordinal).map(|&pos| self.lines[pos].cleaned())
    }

    /// Line number of the `ordinal`-th added line.
    pub fn added_line_number(&self, ordinal: usize) -> LineNumber {
        match self.added.get(ordinal) {
            Some(&pos) => self.line_number_at(pos),
            None => LineNumber::Unknown,
        }
    }

    /// Line number of the line at `pos`, counted from the nearest preceding
    /// hunk header: `new_start + (non-removed lines up to and including pos) - 1`.
    pub fn line_number_at(&self, pos: usize) -> LineNumber {
        if pos >= self.lines.len() {
            return LineNumber::Unknown;
        }
        let Some(header_pos) = (0..pos)
            .rev()
            .find(|&i| self.lines[i].kind == LineKind::HunkHeader)
        else {
            return LineNumber::Unknown;
        };
        let Some(new_start) = parse_new_start(self.lines[header_pos].raw) else {
            return LineNumber::Unknown;
        };
        let count = self.lines[header_pos + 1..=pos]
            .iter()
            .filter(|l| l.kind != LineKind::Removed)
            .count();
        match new_start.checked_add(count).and_then(|n| n.checked_sub(1)) {
            Some(n) => LineNumber::Known(n),
            None => LineNumber::Unknown,
        }
    }
}

/// New-file start line from a hunk header, or `None` when the header is malformed.
pub fn parse_new_start(header: &str) -> Option<usize> {
    HUNK_HEADER
        .captures(header.trim())
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<usize>().ok())
}
