//! Pure operations over the line grid: word boundaries, bracket matching,
//! find-next-occurrence, and the multi-cursor paste split rule.

use crate::cursor::Position;

const BRACKET_PAIRS: [(char, char); 3] = [('{', '}'), ('(', ')'), ('[', ']')];

/// A word character: UTF-8 continuation byte, alphanumeric, or underscore.
pub fn is_word_char(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric() || (ch as u32) >= 0x80
}

/// Finds the word boundary starting from `pos` in `direction` (`-1` for
/// backward, `1` for forward). Returns the position one step past the last
/// contiguous run of word characters (or non-word characters, if `pos`
/// didn't start on one), clamped to the line's bounds.
pub fn find_word_boundary(lines: &[Vec<char>], pos: Position, direction: i32) -> Position {
    let Some(line) = lines.get(pos.line) else { return pos };
    if direction < 0 {
        if pos.char_index == 0 {
            return pos;
        }
        let mut i = pos.char_index;
        let starts_word = is_word_char(line[i - 1]);
        while i > 0 && is_word_char(line[i - 1]) == starts_word && !line[i - 1].is_whitespace() {
            i -= 1;
        }
        Position { line: pos.line, char_index: i }
    } else {
        if pos.char_index >= line.len() {
            return pos;
        }
        let mut i = pos.char_index;
        let starts_word = is_word_char(line[i]);
        while i < line.len() && is_word_char(line[i]) == starts_word && !line[i].is_whitespace() {
            i += 1;
        }
        Position { line: pos.line, char_index: i }
    }
}

/// Finds the next occurrence of `needle` at or after `from`, scanning
/// forward through the grid and wrapping around to the start if not found
/// before the end.
pub fn find_next_occurrence(lines: &[Vec<char>], needle: &str, from: Position) -> Option<Position> {
    if needle.is_empty() || lines.is_empty() {
        return None;
    }
    let needle: Vec<char> = needle.chars().collect();
    let total_lines = lines.len();
    for offset in 0..=total_lines {
        let line_index = (from.line + offset) % total_lines;
        let line = &lines[line_index];
        let start_col = if offset == 0 { from.char_index } else { 0 };
        if let Some(col) = find_in_line(line, &needle, start_col) {
            return Some(Position { line: line_index, char_index: col });
        }
    }
    None
}

fn find_in_line(line: &[char], needle: &[char], start_col: usize) -> Option<usize> {
    if needle.len() > line.len() || start_col > line.len() - needle.len() {
        return None;
    }
    (start_col..=line.len() - needle.len()).find(|&col| line[col..col + needle.len()] == *needle)
}

/// Finds the bracket matching the one at `pos`, if `pos` sits on a bracket
/// character. Scans forward (for an opening bracket) or backward (for a
/// closing one) across the whole grid with a one-pass depth counter.
pub fn find_matching_bracket(lines: &[Vec<char>], pos: Position) -> Option<Position> {
    let ch = *lines.get(pos.line)?.get(pos.char_index)?;
    let (open, close) = BRACKET_PAIRS.iter().find(|(o, c)| *o == ch || *c == ch)?;
    if ch == *open {
        scan_forward(lines, pos, *open, *close)
    } else {
        scan_backward(lines, pos, *open, *close)
    }
}

fn scan_forward(lines: &[Vec<char>], from: Position, open: char, close: char) -> Option<Position> {
    let mut depth = 0i32;
    let mut line_index = from.line;
    let mut char_index = from.char_index;
    loop {
        let line = lines.get(line_index)?;
        if let Some(&ch) = line.get(char_index) {
            if ch == open {
                depth += 1;
            } else if ch == close {
                depth -= 1;
                if depth == 0 {
                    return Some(Position { line: line_index, char_index });
                }
            }
            char_index += 1;
        } else {
            line_index += 1;
            char_index = 0;
            if line_index >= lines.len() {
                return None;
            }
        }
    }
}

fn scan_backward(lines: &[Vec<char>], from: Position, open: char, close: char) -> Option<Position> {
    let mut depth = 0i32;
    let mut line_index = from.line;
    let mut char_index = from.char_index;
    loop {
        let line = &lines[line_index];
        let ch = line[char_index];
        if ch == close {
            depth += 1;
        } else if ch == open {
            depth -= 1;
            if depth == 0 {
                return Some(Position { line: line_index, char_index });
            }
        }
        if char_index == 0 {
            if line_index == 0 {
                return None;
            }
            line_index -= 1;
            char_index = lines[line_index].len().saturating_sub(1);
        } else {
            char_index -= 1;
        }
    }
}

/// Splits clipboard text for a multi-cursor paste: if it splits into
/// exactly `cursor_count` lines (on `\n`), each cursor receives one line;
/// otherwise every cursor receives the whole clipboard text verbatim.
pub fn split_for_paste(clipboard: &str, cursor_count: usize) -> Vec<String> {
    let lines: Vec<&str> = clipboard.split('\n').collect();
    if lines.len() == cursor_count {
        lines.into_iter().map(str::to_string).collect()
    } else {
        vec![clipboard.to_string(); cursor_count]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(src: &str) -> Vec<Vec<char>> {
        src.lines().map(|l| l.chars().collect()).collect()
    }

    #[test]
    fn word_boundary_forward_stops_after_identifier() {
        let lines = grid("foo bar");
        let boundary = find_word_boundary(&lines, Position { line: 0, char_index: 0 }, 1);
        assert_eq!(boundary, Position { line: 0, char_index: 3 });
    }

    #[test]
    fn word_boundary_backward_stops_before_identifier() {
        let lines = grid("foo bar");
        let boundary = find_word_boundary(&lines, Position { line: 0, char_index: 7 }, -1);
        assert_eq!(boundary, Position { line: 0, char_index: 4 });
    }

    #[test]
    fn find_next_occurrence_wraps_around() {
        let lines = grid("abc\ndef\nabc");
        let found = find_next_occurrence(&lines, "abc", Position { line: 0, char_index: 1 });
        assert_eq!(found, Some(Position { line: 2, char_index: 0 }));
    }

    #[test]
    fn find_next_occurrence_returns_none_when_absent() {
        let lines = grid("abc\ndef");
        assert_eq!(find_next_occurrence(&lines, "xyz", Position { line: 0, char_index: 0 }), None);
    }

    #[test]
    fn matching_bracket_forward_and_backward() {
        let lines = grid("f(a, (b), c)");
        let close = find_matching_bracket(&lines, Position { line: 0, char_index: 1 });
        assert_eq!(close, Some(Position { line: 0, char_index: 11 }));
        let open = find_matching_bracket(&lines, Position { line: 0, char_index: 11 });
        assert_eq!(open, Some(Position { line: 0, char_index: 1 }));
    }

    #[test]
    fn paste_splits_one_line_per_cursor_when_counts_match() {
        let pieces = split_for_paste("a\nb\nc", 3);
        assert_eq!(pieces, vec!["a", "b", "c"]);
    }

    #[test]
    fn paste_duplicates_whole_clipboard_when_counts_differ() {
        let pieces = split_for_paste("a\nb", 3);
        assert_eq!(pieces, vec!["a\nb", "a\nb", "a\nb"]);
    }
}
