//! Unified-diff line mapping for inline comments.
//!
//! GitHub's files endpoint returns per-file `patch` text (hunks only, no
//! `diff --git` prelude). Inline review comments may only anchor to line
//! numbers that exist in the *new* version of the file, so we reconstruct
//! the eligible set from the patch:
//! - every added line;
//! - up to two trailing context lines immediately preceding a run of
//!   deletions (lets a reviewer comment "near" a pure removal);
//! - the first context line following a deletion run.
//!
//! Malformed hunk headers are skipped silently; `\ No newline at end of
//! file` markers are ignored. This parser never fails.

/// Number of recent context lines retained around a change.
const CONTEXT_WINDOW: usize = 2;

/// Extracts the sorted, duplicate-free set of new-file line numbers that
/// may carry an inline comment, given one file's unified-diff patch text.
///
/// Empty patch → empty result. Multiple hunks re-seed the cursor at each
/// header independently; the accumulator is cumulative across hunks.
pub fn extract_valid_comment_lines(patch: &str) -> Vec<u32> {
    let mut valid: Vec<u32> = Vec::new();
    // Line number cursor in the new file; re-seeded at every hunk header.
    let mut current_line: u32 = 0;
    // Rolling window of the most recent context line numbers.
    let mut recent_context: Vec<u32> = Vec::new();
    let mut in_change_context = false;
    // Set when a removed line is followed by a context line: that context
    // line's eventual number is reserved for inclusion.
    let mut reserve_next_context = false;

    let mut lines = patch.lines().peekable();
    while let Some(line) = lines.next() {
        if line.starts_with("@@") {
            match parse_hunk_header(line) {
                Some(new_start) => {
                    current_line = new_start.saturating_sub(1);
                    in_change_context = true;
                    recent_context.clear();
                    reserve_next_context = false;
                }
                // Malformed header: skip the line, cursor state carries over.
                None => continue,
            }
        } else if line.starts_with('+') && !line.starts_with("+++") {
            current_line += 1;
            valid.push(current_line);
        } else if line.starts_with('-') && !line.starts_with("---") {
            // Removed lines do not exist in the new file; cursor stays put.
            if in_change_context {
                valid.extend_from_slice(&recent_context);
                recent_context.clear();
                if lines.peek().copied().is_some_and(is_context_line) {
                    reserve_next_context = true;
                }
            }
        } else if is_context_line(line) {
            current_line += 1;
            if reserve_next_context {
                valid.push(current_line);
                reserve_next_context = false;
            }
            if in_change_context {
                recent_context.push(current_line);
                if recent_context.len() > CONTEXT_WINDOW {
                    recent_context.remove(0);
                }
            }
        }
        // Anything else ("\ No newline at end of file", stray text) is
        // ignored and does not move the cursor.
    }

    valid.sort_unstable();
    valid.dedup();
    valid
}

/// Parses `@@ -a[,b] +c[,d] @@ ...` and returns the new-file start `c`.
/// Returns `None` for anything that does not match that shape.
fn parse_hunk_header(line: &str) -> Option<u32> {
    let rest = line.strip_prefix("@@ ")?;
    let (ranges, _) = rest.split_once(" @@")?;
    let (old, new) = ranges.split_once(' ')?;
    if !old.starts_with('-') {
        return None;
    }
    let new = new.strip_prefix('+')?;
    let start = match new.split_once(',') {
        Some((s, _)) => s,
        None => new,
    };
    start.parse().ok()
}

fn is_context_line(line: &str) -> bool {
    line.starts_with(' ') || line.is_empty()
}

/// Snaps a reported line onto the valid set.
///
/// Returns the line itself when already valid, otherwise the valid line
/// with minimal absolute distance (ties go to the smaller line), or `None`
/// when the set is empty.
pub fn snap_to_valid_line(valid: &[u32], line: u32) -> Option<u32> {
    if valid.contains(&line) {
        return Some(line);
    }
    let mut best: Option<(u32, u32)> = None;
    for &v in valid {
        let dist = v.abs_diff(line);
        // Strict `<` keeps the first (smallest) candidate on equal distance.
        if best.map_or(true, |(_, d)| dist < d) {
            best = Some((v, dist));
        }
    }
    best.map(|(v, _)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_strictly_ascending(v: &[u32]) -> bool {
        v.windows(2).all(|w| w[0] < w[1])
    }

    #[test]
    fn empty_patch_yields_empty_set() {
        assert!(extract_valid_comment_lines("").is_empty());
    }

    #[test]
    fn added_lines_and_flushed_context() {
        // Two added lines, two context lines, then a removal: the removal
        // flushes the rolling context window into the set.
        let patch = "@@ -1,4 +1,6 @@\n+let a = 1;\n+let b = 2;\n ctx one\n ctx two\n-old line\n";
        let lines = extract_valid_comment_lines(patch);
        assert_eq!(lines, vec![1, 2, 3, 4]);
    }

    #[test]
    fn added_lines_only() {
        // Context lines alone do not enter the set without a nearby removal.
        let patch = "@@ -1,4 +1,6 @@\n+let a = 1;\n+let b = 2;\n ctx one\n ctx two\n";
        assert_eq!(extract_valid_comment_lines(patch), vec![1, 2]);
    }

    #[test]
    fn pure_deletion_keeps_preceding_context() {
        let patch = "@@ -10,3 +10,2 @@\n ctx one\n ctx two\n-removed\n";
        assert_eq!(extract_valid_comment_lines(patch), vec![10, 11]);
    }

    #[test]
    fn deletion_reserves_following_context_line() {
        let patch = "@@ -5,3 +5,2 @@\n keep\n-gone\n after\n";
        // line 5 flushed from the window, line 6 reserved after the removal.
        assert_eq!(extract_valid_comment_lines(patch), vec![5, 6]);
    }

    #[test]
    fn consecutive_removals_without_trailing_context() {
        // Only the preceding context survives; nothing is synthesized for
        // the second removal.
        let patch = "@@ -3,4 +3,2 @@\n head\n-first gone\n-second gone\n";
        assert_eq!(extract_valid_comment_lines(patch), vec![3]);
    }

    #[test]
    fn rolling_window_keeps_last_two_context_lines() {
        let patch = "@@ -1,5 +1,4 @@\n one\n two\n three\n four\n-gone\n";
        // Four context lines before the removal; only 3 and 4 are retained.
        assert_eq!(extract_valid_comment_lines(patch), vec![3, 4]);
    }

    #[test]
    fn multiple_hunks_reseed_cursor() {
        let patch = "@@ -1,2 +1,3 @@\n+top\n@@ -40,2 +41,3 @@\n+bottom\n";
        assert_eq!(extract_valid_comment_lines(patch), vec![1, 41]);
    }

    #[test]
    fn malformed_header_is_ignored_and_cursor_carries_over() {
        // Second header misses the `+` group: skipped, cursor still runs
        // from the first hunk.
        let patch = "@@ -1,2 +1,3 @@\n+first\n@@ broken header @@\n+second\n";
        assert_eq!(extract_valid_comment_lines(patch), vec![1, 2]);
    }

    #[test]
    fn no_newline_marker_does_not_move_cursor() {
        let patch = "@@ -1,1 +1,1 @@\n+only\n\\ No newline at end of file\n";
        assert_eq!(extract_valid_comment_lines(patch), vec![1]);
    }

    #[test]
    fn file_markers_are_not_counted_as_changes() {
        let patch = "--- a/src/lib.rs\n+++ b/src/lib.rs\n@@ -1,1 +1,2 @@\n+added\n stays\n";
        assert_eq!(extract_valid_comment_lines(patch), vec![1]);
    }

    #[test]
    fn result_is_sorted_and_deduplicated() {
        let patch = "@@ -10,4 +10,4 @@\n a\n b\n-x\n-y\n+p\n+q\n@@ -1,2 +1,3 @@\n+early\n";
        let lines = extract_valid_comment_lines(patch);
        assert!(is_strictly_ascending(&lines));
    }

    #[test]
    fn header_without_counts_parses() {
        assert_eq!(parse_hunk_header("@@ -1 +1 @@"), Some(1));
        assert_eq!(parse_hunk_header("@@ -3,2 +7,4 @@ fn main() {"), Some(7));
        assert_eq!(parse_hunk_header("@@ -1,2 @@"), None);
        assert_eq!(parse_hunk_header("@@ garbage @@"), None);
    }

    #[test]
    fn snap_exact_hit() {
        assert_eq!(snap_to_valid_line(&[5, 10, 15], 10), Some(10));
    }

    #[test]
    fn snap_to_nearest() {
        // 12 is closer to 10 (2) than to 15 (3).
        assert_eq!(snap_to_valid_line(&[5, 10, 15], 12), Some(10));
    }

    #[test]
    fn snap_tie_breaks_to_smaller_line() {
        assert_eq!(snap_to_valid_line(&[5, 15], 10), Some(5));
    }

    #[test]
    fn snap_empty_set() {
        assert_eq!(snap_to_valid_line(&[], 7), None);
    }
}
