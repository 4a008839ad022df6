use std::fmt::Write;

use similar::{ChangeTag, TextDiff};

/// Context lines kept around each hunk.
const CONTEXT: usize = 3;

/// The line diff between a committed snapshot and its replacement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotDiff {
    pub hunks: Vec<DiffHunk>,
}

impl SnapshotDiff {
    /// Returns `true` if both snapshots are identical.
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    pub fn additions(&self) -> usize {
        self.lines()
            .filter(|l| matches!(l, DiffLine::Added(_)))
            .count()
    }

    pub fn deletions(&self) -> usize {
        self.lines()
            .filter(|l| matches!(l, DiffLine::Removed(_)))
            .count()
    }

    /// No line of the old snapshot is removed.
    pub fn is_pure_addition(&self) -> bool {
        self.deletions() == 0
    }

    fn lines(&self) -> impl Iterator<Item = &DiffLine> {
        self.hunks.iter().flat_map(|h| &h.lines)
    }

    /// Unified-diff body (hunk headers and `+`/`-`/` ` lines).
    pub fn unified(&self) -> String {
        let mut out = String::new();
        for hunk in &self.hunks {
            let _ = writeln!(
                out,
                "@@ -{},{} +{},{} @@",
                hunk.old_start, hunk.old_count, hunk.new_start, hunk.new_count
            );
            for line in &hunk.lines {
                let (marker, text) = match line {
                    DiffLine::Context(t) => (' ', t),
                    DiffLine::Added(t) => ('+', t),
                    DiffLine::Removed(t) => ('-', t),
                };
                let _ = writeln!(out, "{marker}{text}");
            }
        }
        out
    }
}

/// A contiguous region of changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffHunk {
    /// 1-based.
    pub old_start: usize,
    pub old_count: usize,
    /// 1-based.
    pub new_start: usize,
    pub new_count: usize,
    pub lines: Vec<DiffLine>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffLine {
    Context(String),
    Added(String),
    Removed(String),
}

/// Diff two snapshot texts line by line.
pub fn diff_snapshots(old: &str, new: &str) -> SnapshotDiff {
    if old == new {
        return SnapshotDiff { hunks: Vec::new() };
    }
    let text_diff = TextDiff::from_lines(old, new);
    let hunks = text_diff
        .grouped_ops(CONTEXT)
        .iter()
        .map(|group| {
            let mut hunk = DiffHunk {
                old_start: group.first().map_or(0, |op| op.old_range().start + 1),
                old_count: 0,
                new_start: group.first().map_or(0, |op| op.new_range().start + 1),
                new_count: 0,
                lines: Vec::new(),
            };
            for op in group {
                for change in text_diff.iter_changes(op) {
                    let text = change.value().trim_end_matches('\n').to_string();
                    match change.tag() {
                        ChangeTag::Equal => {
                            hunk.old_count += 1;
                            hunk.new_count += 1;
                            hunk.lines.push(DiffLine::Context(text));
                        }
                        ChangeTag::Delete => {
                            hunk.old_count += 1;
                            hunk.lines.push(DiffLine::Removed(text));
                        }
                        ChangeTag::Insert => {
                            hunk.new_count += 1;
                            hunk.lines.push(DiffLine::Added(text));
                        }
                    }
                }
            }
            hunk
        })
        .collect();
    SnapshotDiff { hunks }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "# header\n\n<a>\n    <p> \"1\" ;\n.\n";

    #[test]
    fn identical_is_empty() {
        let diff = diff_snapshots(BASE, BASE);
        assert!(diff.is_empty());
        assert!(diff.is_pure_addition());
    }

    #[test]
    fn appended_subject_is_pure_addition() {
        let new = format!("{BASE}<b>\n    <p> \"2\" ;\n.\n");
        let diff = diff_snapshots(BASE, &new);
        assert!(diff.is_pure_addition());
        assert_eq!(diff.additions(), 3);
    }

    #[test]
    fn statement_inserted_mid_block_is_pure_addition() {
        let new = "# header\n\n<a>\n    <p> \"1\" ;\n    <q> \"x\" ;\n.\n";
        let diff = diff_snapshots(BASE, new);
        assert!(diff.is_pure_addition());
        assert_eq!(diff.additions(), 1);
    }

    #[test]
    fn changed_object_is_not_pure_addition() {
        let new = "# header\n\n<a>\n    <p> \"2\" ;\n.\n";
        let diff = diff_snapshots(BASE, new);
        assert!(!diff.is_pure_addition());
        assert_eq!(diff.deletions(), 1);
        let unified = diff.unified();
        assert!(unified.starts_with("@@ -"));
        assert!(unified.contains("-    <p> \"1\" ;\n"));
        assert!(unified.contains("+    <p> \"2\" ;\n"));
    }

    #[test]
    fn from_empty_is_pure_addition() {
        let diff = diff_snapshots("", BASE);
        assert!(diff.is_pure_addition());
        assert_eq!(diff.hunks[0].old_start, 1);
        assert_eq!(diff.hunks[0].new_count, 5);
    }
}
