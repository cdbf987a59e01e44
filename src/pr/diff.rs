use super::types::FileDiff;
use super::PrError;

/// Split a full `git diff` (as produced by `git diff` or GitHub's
/// `application/vnd.github.diff` media type) into per-file patches.
///
/// Each file section starts with:
///   diff --git a/{path} b/{path}
///
/// The patch kept for a file starts at its first `@@` hunk header, matching
/// the `patch` field of GitHub's files API. Binary files and sections with
/// no hunks (pure renames, mode changes) get no patch.
pub fn split_diff(raw_diff: &str) -> Result<Vec<FileDiff>, PrError> {
    if raw_diff.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    let mut current_file: Option<FileDiff> = None;
    let mut hunk_lines: Vec<&str> = Vec::new();

    for line in raw_diff.lines() {
        if let Some(rest) = line.strip_prefix("diff --git ") {
            finish_file(&mut files, &mut current_file, &mut hunk_lines);
            let mut parts = rest.split_whitespace();
            let a_path = parts
                .next()
                .ok_or_else(|| PrError::DiffParse("Missing a/ path in diff header".to_string()))?;
            let b_path = parts
                .next()
                .ok_or_else(|| PrError::DiffParse("Missing b/ path in diff header".to_string()))?;
            let filename = b_path
                .strip_prefix("b/")
                .or_else(|| a_path.strip_prefix("a/"))
                .unwrap_or(b_path)
                .to_string();
            current_file = Some(FileDiff {
                filename,
                patch: None,
            });
            continue;
        }

        if current_file.is_none() {
            continue;
        }

        if line.starts_with("@@") || !hunk_lines.is_empty() {
            hunk_lines.push(line);
        }
    }

    finish_file(&mut files, &mut current_file, &mut hunk_lines);
    Ok(files)
}

fn finish_file(files: &mut Vec<FileDiff>, current: &mut Option<FileDiff>, lines: &mut Vec<&str>) {
    if let Some(mut file) = current.take() {
        if !lines.is_empty() {
            file.patch = Some(lines.join("\n"));
        }
        files.push(file);
    }
    lines.clear();
}
