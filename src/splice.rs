//! Byte-range edits against an XML source string.
//!
//! Edits are recorded against the *original* text (positions come from
//! `roxmltree::Node::range()` and friends) and applied in one go, back to
//! front, so earlier offsets stay valid.  Removals swallow every other edit
//! that falls inside them.

use std::ops::Range;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpliceError {
    #[error("edits at {first:?} and {second:?} overlap")]
    Overlap {
        first: Range<usize>,
        second: Range<usize>,
    },

    #[error("edit at {0:?} is outside the source or splits a character")]
    OutOfBounds(Range<usize>),
}

#[derive(Debug, Clone)]
struct Edit {
    range: Range<usize>,
    text: String,
    removal: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Splice {
    edits: Vec<Edit>,
}

impl Splice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the bytes in `range` with `text`.
    pub fn replace(&mut self, range: Range<usize>, text: impl Into<String>) {
        self.edits.push(Edit { range, text: text.into(), removal: false });
    }

    /// Insert `text` at byte offset `at`.  Several insertions at the same
    /// offset end up in the order they were recorded.
    pub fn insert(&mut self, at: usize, text: impl Into<String>) {
        self.replace(at..at, text);
    }

    /// Delete the bytes in `range` along with any edit recorded inside it.
    pub fn remove(&mut self, range: Range<usize>) {
        self.edits.push(Edit { range, text: String::new(), removal: true });
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Produce the edited text.
    ///
    /// Two edits may share a boundary but never bytes; a removal is the only
    /// edit allowed to cover others.
    pub fn apply(self, source: &str) -> Result<String, SpliceError> {
        let mut removals: Vec<Range<usize>> = self
            .edits
            .iter()
            .filter(|e| e.removal)
            .map(|e| e.range.clone())
            .collect();
        removals.sort_by_key(|r| (r.start, std::cmp::Reverse(r.end)));
        removals.dedup();

        // Outermost removals only.
        let mut outer: Vec<Range<usize>> = Vec::with_capacity(removals.len());
        for r in removals {
            match outer.last() {
                Some(last) if last.start <= r.start && r.end <= last.end => {}
                _ => outer.push(r),
            }
        }

        let mut kept: Vec<(usize, Edit)> = self
            .edits
            .into_iter()
            .filter(|e| !e.removal)
            .filter(|e| !outer.iter().any(|r| swallows(r, &e.range)))
            .enumerate()
            .collect();
        kept.extend(outer.into_iter().map(|range| {
            (usize::MAX, Edit { range, text: String::new(), removal: true })
        }));

        // Back to front; at a shared start the wider edit goes first so that
        // insertions land in front of it, and same-offset insertions are
        // applied newest first so they read in recording order.
        kept.sort_by(|(ia, a), (ib, b)| {
            b.range
                .start
                .cmp(&a.range.start)
                .then(b.range.end.cmp(&a.range.end))
                .then(ib.cmp(ia))
        });

        let mut out = source.to_string();
        let mut previous: Option<Range<usize>> = None;
        for (_, edit) in kept {
            let (start, end) = (edit.range.start, edit.range.end);
            let in_bounds = start <= end
                && end <= source.len()
                && source.is_char_boundary(start)
                && source.is_char_boundary(end);
            if !in_bounds {
                return Err(SpliceError::OutOfBounds(edit.range));
            }
            if let Some(after) = &previous {
                if end > after.start {
                    return Err(SpliceError::Overlap { first: edit.range, second: after.clone() });
                }
            }
            out.replace_range(start..end, &edit.text);
            previous = Some(edit.range);
        }
        Ok(out)
    }
}

/// `true` if `removal` deletes the region `edit` touches.  An insertion at
/// either boundary of a removal sits outside it.
fn swallows(removal: &Range<usize>, edit: &Range<usize>) -> bool {
    if edit.is_empty() {
        removal.start < edit.start && edit.start < removal.end
    } else {
        removal.start <= edit.start && edit.end <= removal.end
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_splice_returns_source() {
        assert_eq!(Splice::new().apply("abc").unwrap(), "abc");
    }

    #[test]
    fn edits_apply_against_original_offsets() {
        let mut s = Splice::new();
        s.replace(0..1, "AAA");
        s.replace(4..5, "E");
        s.insert(2, "+");
        assert_eq!(s.apply("abcde").unwrap(), "AAAb+cdE");
    }

    #[test]
    fn removal_swallows_nested_edits() {
        let mut s = Splice::new();
        s.replace(2..3, "X");
        s.insert(3, "Y");
        s.remove(1..4);
        assert_eq!(s.apply("abcdef").unwrap(), "aef");
    }

    #[test]
    fn insertion_at_removal_boundaries_survives() {
        let mut s = Splice::new();
        s.insert(1, "<");
        s.remove(1..4);
        s.insert(4, ">");
        assert_eq!(s.apply("abcdef").unwrap(), "a<>ef");
    }

    #[test]
    fn same_offset_insertions_keep_recording_order() {
        let mut s = Splice::new();
        s.insert(1, "1");
        s.insert(1, "2");
        s.insert(1, "3");
        assert_eq!(s.apply("ab").unwrap(), "a123b");
    }

    #[test]
    fn nested_and_duplicate_removals_collapse() {
        let mut s = Splice::new();
        s.remove(1..5);
        s.remove(2..3);
        s.remove(1..5);
        assert_eq!(s.apply("abcdefg").unwrap(), "afg");
    }

    #[test]
    fn overlapping_edits_are_an_error() {
        let mut s = Splice::new();
        s.replace(2..6, "X");
        s.replace(4..8, "Y");
        assert_eq!(
            s.apply("0123456789"),
            Err(SpliceError::Overlap { first: 2..6, second: 4..8 })
        );
    }

    #[test]
    fn insertion_inside_replacement_is_an_error() {
        let mut s = Splice::new();
        s.replace(1..5, "X");
        s.insert(3, "+");
        assert!(matches!(s.apply("abcdef"), Err(SpliceError::Overlap { .. })));
    }

    #[test]
    fn insertions_at_replacement_edges_are_fine() {
        let mut s = Splice::new();
        s.insert(1, "[");
        s.replace(1..3, "BC");
        s.insert(3, "]");
        assert_eq!(s.apply("abcd").unwrap(), "a[BC]d");
    }

    #[test]
    fn edit_past_the_end_is_an_error() {
        let mut s = Splice::new();
        s.replace(2..9, "X");
        assert_eq!(s.apply("abc"), Err(SpliceError::OutOfBounds(2..9)));
    }
}
