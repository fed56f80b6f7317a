//! Virtual file store operations over [`Files`].
//!
//! These are pure functions; the tool wrappers in `builtin` turn their
//! results into text for the model.

use thiserror::Error;

use crate::state::{Files, StateUpdate};

pub const DEFAULT_READ_LIMIT: usize = 2000;
pub const MAX_LINE_CHARS: usize = 2000;
pub const EMPTY_FILE_REMINDER: &str = "System reminder: File exists but has empty contents";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileError {
    #[error("Error: File '{path}' not found")]
    NotFound { path: String },
    #[error("Error: Line offset {offset} exceeds file length ({lines} lines)")]
    OffsetOutOfRange { offset: usize, lines: usize },
}

/// Whether a write introduced a new path or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    Updated,
}

/// All paths in sorted order.
pub fn list_files(files: &Files) -> Vec<String> {
    files.keys().cloned().collect()
}

/// Read `limit` lines starting at zero-based `offset`, numbered like `cat -n`.
///
/// Only the empty string yields [`EMPTY_FILE_REMINDER`]; whitespace is
/// numbered like any other content.
pub fn read_file(
    files: &Files,
    path: &str,
    offset: usize,
    limit: usize,
) -> Result<String, FileError> {
    let content = files
        .get(path)
        .ok_or_else(|| FileError::NotFound { path: path.to_string() })?;

    if content.is_empty() {
        return Ok(EMPTY_FILE_REMINDER.to_string());
    }

    let lines = split_lines(content);
    if offset >= lines.len() {
        return Err(FileError::OffsetOutOfRange { offset, lines: lines.len() });
    }

    let end = offset.saturating_add(limit).min(lines.len());
    let rendered: Vec<String> = lines[offset..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let line: String = line.chars().take(MAX_LINE_CHARS).collect();
            format!("{:6}\t{}", offset + i + 1, line)
        })
        .collect();
    Ok(rendered.join("\n"))
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Split on every line boundary, `\r\n` counting as one.  A trailing
/// boundary does not start an extra empty line.
fn split_lines(content: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = content.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !is_line_break(c) {
            continue;
        }
        lines.push(&content[start..i]);
        start = i + c.len_utf8();
        if c == '\r' && matches!(chars.peek(), Some((_, '\n'))) {
            chars.next();
            start += 1;
        }
    }
    if start < content.len() {
        lines.push(&content[start..]);
    }
    lines
}

/// Produce the delta that stores `content` at `path`.
pub fn write_file(files: &Files, path: &str, content: &str) -> (StateUpdate, WriteOutcome) {
    let outcome = if files.contains_key(path) {
        WriteOutcome::Updated
    } else {
        WriteOutcome::Created
    };
    (StateUpdate::default().with_file(path, content), outcome)
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AgentState;

    fn store(pairs: &[(&str, &str)]) -> Files {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn list_is_sorted_and_empty_when_no_files() {
        assert!(list_files(&Files::new()).is_empty());
        let files = store(&[("b.md", ""), ("a.md", ""), ("C.md", "")]);
        assert_eq!(list_files(&files), vec!["C.md", "a.md", "b.md"]);
    }

    #[test]
    fn write_then_read_round_trip() {
        let mut state = AgentState::default();
        let (update, outcome) = write_file(&state.files, "a.md", "hello");
        assert_eq!(outcome, WriteOutcome::Created);
        state.apply(update);
        assert_eq!(read_file(&state.files, "a.md", 0, DEFAULT_READ_LIMIT).unwrap(), "     1\thello");
    }

    #[test]
    fn second_write_reports_update() {
        let files = store(&[("a.md", "v1")]);
        let (update, outcome) = write_file(&files, "a.md", "v2");
        assert_eq!(outcome, WriteOutcome::Updated);
        assert_eq!(update.files.unwrap()["a.md"], "v2");
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = read_file(&Files::new(), "nope.md", 0, 10).unwrap_err();
        assert_eq!(err.to_string(), "Error: File 'nope.md' not found");
    }

    #[test]
    fn paths_are_not_normalized() {
        let files = store(&[("./a.md", "x")]);
        assert!(matches!(read_file(&files, "a.md", 0, 10), Err(FileError::NotFound { .. })));
    }

    #[test]
    fn empty_file_returns_reminder() {
        let files = store(&[("e.md", "")]);
        assert_eq!(read_file(&files, "e.md", 0, 10).unwrap(), EMPTY_FILE_REMINDER);
        assert_eq!(read_file(&files, "e.md", 5, 10).unwrap(), EMPTY_FILE_REMINDER);
    }

    #[test]
    fn whitespace_only_content_is_numbered() {
        let files = store(&[("w.md", "   "), ("n.md", "\n")]);
        assert_eq!(read_file(&files, "w.md", 0, 10).unwrap(), "     1\t   ");
        assert_eq!(read_file(&files, "n.md", 0, 10).unwrap(), "     1\t");
        assert_eq!(
            read_file(&files, "w.md", 1, 10).unwrap_err(),
            FileError::OffsetOutOfRange { offset: 1, lines: 1 }
        );
    }

    #[test]
    fn every_line_boundary_splits() {
        let files = store(&[("f", "a\rb\r\nc\x0bd\u{2028}e\n")]);
        assert_eq!(
            read_file(&files, "f", 0, 10).unwrap(),
            "     1\ta\n     2\tb\n     3\tc\n     4\td\n     5\te"
        );
    }

    #[test]
    fn blank_lines_between_content_are_kept() {
        assert_eq!(split_lines("a\n\nb"), vec!["a", "", "b"]);
        assert_eq!(split_lines("a\r"), vec!["a"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn offset_boundary() {
        let files = store(&[("f", "l1\nl2\nl3")]);
        let err = read_file(&files, "f", 3, 2000).unwrap_err();
        assert_eq!(err.to_string(), "Error: Line offset 3 exceeds file length (3 lines)");
        assert_eq!(read_file(&files, "f", 2, 2000).unwrap(), "     3\tl3");
    }

    #[test]
    fn limit_caps_line_count() {
        let files = store(&[("f", "a\nb\nc\nd")]);
        assert_eq!(read_file(&files, "f", 1, 2).unwrap(), "     2\tb\n     3\tc");
    }

    #[test]
    fn long_lines_are_truncated_per_line() {
        let long = "é".repeat(MAX_LINE_CHARS + 50);
        let content = format!("{long}\nshort");
        let files = store(&[("f", content.as_str())]);
        let out = read_file(&files, "f", 0, 10).unwrap();
        let first = out.lines().next().unwrap();
        assert_eq!(first.split('\t').nth(1).unwrap().chars().count(), MAX_LINE_CHARS);
        assert!(out.ends_with("     2\tshort"));
    }
}
