//! Line-level diff between two canonical line sequences.
//!
//! Uses the `similar` crate (Myers diff algorithm). Consecutive changed lines
//! of the same direction are grouped into one segment; within a replaced run
//! the removed segment comes before the added one.

use quire_types::DiffSegment;
use similar::{capture_diff_slices, Algorithm, DiffOp};

/// Diff `old` against `new`, keeping only added and removed runs in the
/// order the diff emits them.
///
/// Entries containing newlines are split first, so the comparison runs over
/// physical lines of the joined text.
pub fn diff_lines(old: &[String], new: &[String]) -> Vec<DiffSegment> {
    if old == new {
        return Vec::new();
    }
    let old = split_lines(old);
    let new = split_lines(new);

    let mut segments: Vec<DiffSegment> = Vec::new();
    // Adjacent ops of the same direction join only when no equal run sits
    // between them.
    let mut contiguous = false;
    for op in capture_diff_slices(Algorithm::Myers, &old, &new) {
        match op {
            DiffOp::Equal { .. } => contiguous = false,
            DiffOp::Delete {
                old_index, old_len, ..
            } => {
                push(&mut segments, contiguous, DiffSegment::removed(join(&old[old_index..old_index + old_len])));
                contiguous = true;
            }
            DiffOp::Insert {
                new_index, new_len, ..
            } => {
                push(&mut segments, contiguous, DiffSegment::added(join(&new[new_index..new_index + new_len])));
                contiguous = true;
            }
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                push(&mut segments, contiguous, DiffSegment::removed(join(&old[old_index..old_index + old_len])));
                segments.push(DiffSegment::added(join(&new[new_index..new_index + new_len])));
                contiguous = true;
            }
        }
    }
    segments
}

fn split_lines(lines: &[String]) -> Vec<&str> {
    lines.iter().flat_map(|l| l.split('\n')).collect()
}

fn join(lines: &[&str]) -> String {
    lines.join("\n")
}

fn push(segments: &mut Vec<DiffSegment>, contiguous: bool, segment: DiffSegment) {
    match segments.last_mut() {
        Some(last) if contiguous && last.kind == segment.kind => {
            last.text.push('\n');
            last.text.push_str(&segment.text);
        }
        _ => segments.push(segment),
    }
}
