//! Cursor positions and the sort/merge/sanitize rules that keep them
//! consistent with the line grid.

/// A position within the line grid: a line index and a char index into
/// that line (not a byte offset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based char index into the line; may equal the line's length
    /// (the position just past the last char).
    pub char_index: usize,
}

impl Position {
    /// A position at the start of `line`.
    pub fn start_of(line: usize) -> Self {
        Position { line, char_index: 0 }
    }
}

/// A selection range: `start` and `end` need not be ordered — `end` is
/// where the caret actually sits, `start` where the selection began.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Selection anchor.
    pub start: Position,
    /// Caret position; equals `start` for a collapsed cursor.
    pub end: Position,
}

impl Cursor {
    /// A collapsed cursor (no selection) at `pos`.
    pub fn collapsed(pos: Position) -> Self {
        Cursor { start: pos, end: pos }
    }

    /// True if this cursor has no selection.
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// The range ordered low-to-high regardless of which endpoint is the
    /// caret.
    pub fn ordered(&self) -> (Position, Position) {
        if self.start <= self.end {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        }
    }
}

/// Clamps every cursor endpoint so `line < line_lengths.len()` and
/// `char_index <= line_lengths[line]`.
pub fn sanitize(cursors: &mut [Cursor], line_lengths: &[usize]) {
    let last_line = line_lengths.len().saturating_sub(1);
    for cursor in cursors {
        cursor.start = clamp_position(cursor.start, last_line, line_lengths);
        cursor.end = clamp_position(cursor.end, last_line, line_lengths);
    }
}

fn clamp_position(pos: Position, last_line: usize, line_lengths: &[usize]) -> Position {
    let line = pos.line.min(last_line);
    let char_index = pos.char_index.min(line_lengths[line]);
    Position { line, char_index }
}

/// Sorts cursors by their ordered start position and merges any whose
/// ranges overlap, keeping the later cursor's caret-vs-anchor orientation.
pub fn sort_and_merge(cursors: Vec<Cursor>) -> Vec<Cursor> {
    let mut ordered: Vec<(Position, Position, Cursor)> =
        cursors.into_iter().map(|c| { let (lo, hi) = c.ordered(); (lo, hi, c) }).collect();
    ordered.sort_by_key(|(lo, _, _)| *lo);

    let mut merged: Vec<(Position, Position, Cursor)> = Vec::with_capacity(ordered.len());
    for (lo, hi, cursor) in ordered {
        if let Some(last) = merged.last_mut() {
            if lo <= last.1 {
                last.1 = last.1.max(hi);
                last.2 = Cursor { start: last.0, end: last.1 };
                continue;
            }
        }
        merged.push((lo, hi, cursor));
    }
    merged.into_iter().map(|(_, _, c)| c).collect()
}
