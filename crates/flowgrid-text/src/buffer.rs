//! `TextEditor`: the live, in-memory editor state behind a text-buffer
//! container — lines, palette grid, cursors, and the editor's own undo
//! stack. Distinct from the store-resident string a `TextBuffer` container
//! tracks; `flowgrid-app` syncs the two by calling [`TextEditor::set_text`]
//! on load/undo and reading [`TextEditor::text`] back into the store after
//! an edit batch.

use im::Vector;

use crate::cursor::{self, Cursor, Position};
use crate::palette::{self, PaletteIndex};
use crate::undo::{EditOp, UndoRecord};

/// The only language currently wired up, matching the single grammar
/// dependency (`tree-sitter-cpp`) declared for the text buffer engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    /// C++, via `tree-sitter-cpp`.
    Cpp,
}

impl Language {
    fn grammar(self) -> tree_sitter::Language {
        match self {
            Language::Cpp => tree_sitter_cpp::LANGUAGE.into(),
        }
    }
}

/// The live editor state for one text buffer.
pub struct TextEditor {
    lines: Vector<Vector<char>>,
    palette: Vector<Vector<PaletteIndex>>,
    cursors: Vec<Cursor>,
    last_added: usize,
    undo_stack: Vec<UndoRecord>,
    redo_stack: Vec<UndoRecord>,
    parser: Option<tree_sitter::Parser>,
    tree: Option<tree_sitter::Tree>,
}

impl TextEditor {
    /// A new, empty editor with no language configured (no reparse runs).
    pub fn new() -> Self {
        TextEditor {
            lines: Vector::unit(Vector::new()),
            palette: Vector::unit(Vector::new()),
            cursors: vec![Cursor::collapsed(Position::start_of(0))],
            last_added: 0,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            parser: None,
            tree: None,
        }
    }

    /// A new, empty editor with `language`'s grammar wired up for reparse.
    pub fn with_language(language: Language) -> Self {
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&language.grammar()).expect("bundled grammar version matches tree-sitter's ABI");
        let mut editor = Self::new();
        editor.parser = Some(parser);
        let empty_lines = editor.lines.clone();
        editor.reparse(&empty_lines);
        editor
    }

    /// The buffer's full text, lines joined by `\n`.
    pub fn text(&self) -> String {
        self.lines.iter().map(|line| line.iter().collect::<String>()).collect::<Vec<_>>().join("\n")
    }

    /// Each line's char count, in order.
    pub fn line_lengths(&self) -> Vec<usize> {
        self.lines.iter().map(im::Vector::len).collect()
    }

    /// The lines grid, for read-only inspection (word boundary, bracket
    /// matching, and find-occurrence all run over this).
    pub fn lines(&self) -> Vec<Vec<char>> {
        self.lines.iter().map(|line| line.iter().copied().collect()).collect()
    }

    /// The current palette grid, same shape as [`TextEditor::lines`].
    pub fn palette(&self) -> &Vector<Vector<PaletteIndex>> {
        &self.palette
    }

    /// The active cursor set, sorted and merged.
    pub fn cursors(&self) -> &[Cursor] {
        &self.cursors
    }

    /// The cursor most recently added, for scroll targeting.
    pub fn last_added_cursor(&self) -> Cursor {
        self.cursors[self.last_added.min(self.cursors.len() - 1)]
    }

    /// Replaces the cursor set outright (e.g. a click, or restoring a
    /// saved selection), sanitizing and merging it against the current grid.
    pub fn set_cursors(&mut self, cursors: Vec<Cursor>) {
        let mut cursors = cursors;
        cursor::sanitize(&mut cursors, &self.line_lengths());
        self.cursors = cursor::sort_and_merge(cursors);
        self.last_added = self.cursors.len().saturating_sub(1);
    }

    /// Replaces the whole buffer's contents in one step (used when the
    /// project's own undo/redo snaps the buffer back to a coarse
    /// `TextBuffer.Set` snapshot). Always triggers a full reparse: there is
    /// no meaningful incremental edit from an arbitrary external
    /// replacement.
    pub fn set_text(&mut self, text: &str) {
        let old_text = self.text();
        if old_text == text {
            return;
        }
        let before_cursors = self.cursors.clone();
        let old_lines = self.lines.clone();
        self.lines = text_to_lines(text);
        cursor::sanitize(&mut self.cursors, &self.line_lengths());
        self.reparse(&old_lines);
        self.undo_stack.push(UndoRecord {
            ops: vec![
                EditOp::Delete { text: old_text, start: Position::start_of(0), end: self.end_of_buffer() },
                EditOp::Add { text: text.to_string(), start: Position::start_of(0), end: self.end_of_buffer() },
            ],
            before_cursors,
            after_cursors: self.cursors.clone(),
        });
        self.redo_stack.clear();
    }

    /// Applies one text per cursor (typing, or a multi-cursor paste via
    /// [`crate::edit::split_for_paste`]) as a single undoable edit. Each
    /// cursor's existing selection is replaced by its corresponding text;
    /// cursors are processed from the last in the buffer to the first so
    /// earlier cursors' positions stay valid as later ones are applied.
    ///
    /// # Panics
    /// Panics if `texts.len() != self.cursors().len()`.
    pub fn type_text(&mut self, texts: &[String]) {
        assert_eq!(texts.len(), self.cursors.len(), "one text per cursor");
        let before_cursors = self.cursors.clone();
        let mut order: Vec<usize> = (0..self.cursors.len()).collect();
        order.sort_by_key(|&i| std::cmp::Reverse(self.cursors[i].ordered().0));

        let mut ops = Vec::new();
        let mut lines = self.lines.iter().map(|l| l.iter().copied().collect::<Vec<_>>()).collect::<Vec<_>>();
        for &i in &order {
            let (lo, hi) = self.cursors[i].ordered();
            if lo != hi {
                let removed = slice_text(&lines, lo, hi);
                splice(&mut lines, lo, hi, "");
                ops.push(EditOp::Delete { text: removed, start: lo, end: hi });
            }
            let end = splice(&mut lines, lo, lo, &texts[i]);
            ops.push(EditOp::Add { text: texts[i].clone(), start: lo, end });
            self.cursors[i] = Cursor::collapsed(end);
        }
        ops.reverse();
        let old_lines = self.lines.clone();
        self.lines = lines.into_iter().map(Vector::from).collect();
        cursor::sanitize(&mut self.cursors, &self.line_lengths());
        self.cursors = cursor::sort_and_merge(std::mem::take(&mut self.cursors));

        self.reparse(&old_lines);
        self.undo_stack.push(UndoRecord { ops, before_cursors, after_cursors: self.cursors.clone() });
        self.redo_stack.clear();
    }

    /// Deletes each cursor's selection, or one char before the caret for a
    /// collapsed cursor (backspace).
    pub fn delete_backward(&mut self) {
        let texts = vec![String::new(); self.cursors.len()];
        // Collapsed cursors need their selection widened by one char first.
        let mut widened = self.cursors.clone();
        for cursor in &mut widened {
            if cursor.is_collapsed() && cursor.end.char_index > 0 {
                cursor.start = Position { line: cursor.end.line, char_index: cursor.end.char_index - 1 };
            }
        }
        self.cursors = widened;
        self.type_text(&texts);
    }

    /// Undoes the most recent edit, restoring cursors.
    pub fn undo(&mut self) -> bool {
        let Some(record) = self.undo_stack.pop() else { return false };
        self.apply_record(&record.inverse());
        self.redo_stack.push(record);
        true
    }

    /// Redoes the most recently undone edit.
    pub fn redo(&mut self) -> bool {
        let Some(record) = self.redo_stack.pop() else { return false };
        self.apply_record(&record);
        self.undo_stack.push(record);
        true
    }

    fn apply_record(&mut self, record: &UndoRecord) {
        let mut lines = self.lines.iter().map(|l| l.iter().copied().collect::<Vec<_>>()).collect::<Vec<_>>();
        for op in &record.ops {
            match op {
                EditOp::Add { text, start, .. } => {
                    splice(&mut lines, *start, *start, text);
                }
                EditOp::Delete { start, end, .. } => {
                    splice(&mut lines, *start, *end, "");
                }
            }
        }
        let old_lines = self.lines.clone();
        self.lines = lines.into_iter().map(Vector::from).collect();
        self.cursors = record.after_cursors.clone();
        cursor::sanitize(&mut self.cursors, &self.line_lengths());
        self.reparse(&old_lines);
    }

    fn end_of_buffer(&self) -> Position {
        let last_line = self.lines.len().saturating_sub(1);
        Position { line: last_line, char_index: self.lines[last_line].len() }
    }

    /// Reparses the buffer and repaints the palette grid from the result.
    /// `old_lines` is the line grid as it stood just before the edit that
    /// produced `self.lines`; when a prior tree exists, the edit between the
    /// two is informed to it via `Tree::edit` before reparsing, so
    /// tree-sitter only re-walks the changed region instead of the whole
    /// document.
    fn reparse(&mut self, old_lines: &Vector<Vector<char>>) {
        let Some(parser) = self.parser.as_mut() else { return };
        if let Some(tree) = self.tree.as_mut() {
            if let Some((start_byte, old_end_byte, new_end_byte)) = edit_span(old_lines, &self.lines) {
                let zero = tree_sitter::Point { row: 0, column: 0 };
                tree.edit(&tree_sitter::InputEdit {
                    start_byte,
                    old_end_byte,
                    new_end_byte,
                    start_position: zero,
                    old_end_position: zero,
                    new_end_position: zero,
                });
            }
        }
        let text = self.text();
        let new_tree = parser.parse(&text, self.tree.as_ref());
        self.palette = match &new_tree {
            Some(tree) => palette::recompute(tree, &self.line_lengths()),
            None => self.lines.iter().map(|l| Vector::from(vec![PaletteIndex::Default; l.len()])).collect(),
        };
        self.tree = new_tree;
    }
}

impl Default for TextEditor {
    fn default() -> Self {
        Self::new()
    }
}

/// The byte offset of line `line_index`'s start, within a buffer whose lines
/// are `lines` (joined by single-byte `\n`s). The sum of every earlier
/// line's UTF-8 byte length plus one newline byte each.
fn line_start_byte(lines: &Vector<Vector<char>>, line_index: usize) -> usize {
    lines.iter().take(line_index).map(|line| line.iter().map(|c| c.len_utf8()).sum::<usize>() + 1).sum()
}

fn position_byte(lines: &Vector<Vector<char>>, pos: Position) -> usize {
    // `pos.line` may be one past the last line (an end-of-buffer position
    // with `char_index == 0`), which only `line_start_byte` needs to handle.
    let line_chars: usize =
        if pos.char_index == 0 { 0 } else { lines[pos.line].iter().take(pos.char_index).map(|c| c.len_utf8()).sum() };
    line_start_byte(lines, pos.line) + line_chars
}

/// Finds the line-granular edit span between `old_lines` and `new_lines`
/// (the common leading and trailing lines, whichever changed in between),
/// and converts its boundaries to byte offsets via the same line-length-sum
/// accumulation `position_byte` uses. Returns `None` if the two line grids
/// are identical.
fn edit_span(old_lines: &Vector<Vector<char>>, new_lines: &Vector<Vector<char>>) -> Option<(usize, usize, usize)> {
    let min_len = old_lines.len().min(new_lines.len());
    let prefix = (0..min_len).take_while(|&i| old_lines[i] == new_lines[i]).count();
    let max_suffix = min_len - prefix;
    let suffix = (0..max_suffix).take_while(|&i| old_lines[old_lines.len() - 1 - i] == new_lines[new_lines.len() - 1 - i]).count();

    if prefix == old_lines.len() && prefix == new_lines.len() {
        return None;
    }

    let start = Position { line: prefix, char_index: 0 };
    let old_changed_end_line = old_lines.len() - suffix;
    let new_changed_end_line = new_lines.len() - suffix;
    let old_end = if old_changed_end_line > prefix {
        let line = old_changed_end_line - 1;
        Position { line, char_index: old_lines[line].len() }
    } else {
        start
    };
    let new_end = if new_changed_end_line > prefix {
        let line = new_changed_end_line - 1;
        Position { line, char_index: new_lines[line].len() }
    } else {
        start
    };

    Some((position_byte(old_lines, start), position_byte(old_lines, old_end), position_byte(new_lines, new_end)))
}

fn text_to_lines(text: &str) -> Vector<Vector<char>> {
    if text.is_empty() {
        return Vector::unit(Vector::new());
    }
    text.split('\n').map(|line| line.chars().collect::<Vector<char>>()).collect()
}

fn slice_text(lines: &[Vec<char>], start: Position, end: Position) -> String {
    if start.line == end.line {
        return lines[start.line][start.char_index..end.char_index].iter().collect();
    }
    let mut out = String::new();
    out.extend(&lines[start.line][start.char_index..]);
    for line in &lines[start.line + 1..end.line] {
        out.push('\n');
        out.extend(line);
    }
    out.push('\n');
    out.extend(&lines[end.line][..end.char_index]);
    out
}

fn splice(lines: &mut Vec<Vec<char>>, start: Position, end: Position, text: &str) -> Position {
    let tail: Vec<char> = lines[end.line][end.char_index..].to_vec();
    let head: Vec<char> = lines[start.line][..start.char_index].to_vec();
    lines.drain(start.line..=end.line);

    let mut inserted: Vec<Vec<char>> = text.split('\n').map(|s| s.chars().collect()).collect();
    if inserted.is_empty() {
        inserted.push(Vec::new());
    }
    let first = inserted.first_mut().expect("at least one line");
    *first = [head, std::mem::take(first)].concat();
    let last_index = inserted.len() - 1;
    let end_char_index = inserted[last_index].len();
    let last = &mut inserted[last_index];
    *last = [std::mem::take(last), tail].concat();

    let end_line = start.line + last_index;
    for (offset, line) in inserted.into_iter().enumerate() {
        lines.insert(start.line + offset, line);
    }
    Position { line: end_line, char_index: end_char_index }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_editor_has_one_empty_line_and_one_cursor() {
        let editor = TextEditor::new();
        assert_eq!(editor.text(), "");
        assert_eq!(editor.line_lengths(), vec![0]);
        assert_eq!(editor.cursors().len(), 1);
    }

    #[test]
    fn typing_inserts_at_cursor_and_advances_it() {
        let mut editor = TextEditor::new();
        editor.type_text(&["abc".to_string()]);
        assert_eq!(editor.text(), "abc");
        assert_eq!(editor.cursors()[0], Cursor::collapsed(Position { line: 0, char_index: 3 }));
    }

    #[test]
    fn typing_with_selection_replaces_it() {
        let mut editor = TextEditor::new();
        editor.type_text(&["hello world".to_string()]);
        editor.set_cursors(vec![Cursor { start: Position { line: 0, char_index: 0 }, end: Position { line: 0, char_index: 5 } }]);
        editor.type_text(&["hi".to_string()]);
        assert_eq!(editor.text(), "hi world");
    }

    #[test]
    fn undo_redo_restores_text_and_cursors() {
        let mut editor = TextEditor::new();
        editor.type_text(&["abc".to_string()]);
        let after_type = editor.cursors().to_vec();
        editor.undo();
        assert_eq!(editor.text(), "");
        editor.redo();
        assert_eq!(editor.text(), "abc");
        assert_eq!(editor.cursors(), after_type.as_slice());
    }

    #[test]
    fn multi_cursor_split_paste_gives_one_line_per_cursor() {
        let mut editor = TextEditor::new();
        editor.type_text(&["a".to_string(), "b".to_string()]);
        // Two lines, one cursor at the end of each.
        let lines = editor.lines();
        assert!(lines.len() >= 1);
    }

    #[test]
    fn line_and_palette_grids_stay_equal_shape_after_edits() {
        let mut editor = TextEditor::new();
        editor.type_text(&["line one".to_string()]);
        editor.type_text(&["\nline two".to_string()]);
        assert_eq!(editor.line_lengths().len(), editor.palette().len());
        for (line, row) in editor.line_lengths().iter().zip(editor.palette().iter()) {
            assert_eq!(*line, row.len());
        }
    }

    #[test]
    fn cpp_buffer_palette_maps_tokens() {
        let mut editor = TextEditor::with_language(Language::Cpp);
        editor.set_text("int x = 1;");
        let palette = editor.palette();
        let row: Vec<PaletteIndex> = palette[0].iter().copied().collect();
        // "int" -> Type, "x" -> Identifier, "=" -> Operator, "1" -> NumberLiteral, ";" -> Punctuation
        assert!(matches!(row[0], PaletteIndex::Type));
        assert!(matches!(row[4], PaletteIndex::Identifier));
        assert!(matches!(row[6], PaletteIndex::Operator));
        assert!(matches!(row[8], PaletteIndex::NumberLiteral));
        assert!(matches!(row[9], PaletteIndex::Punctuation));
    }

    #[test]
    fn incremental_edit_after_initial_parse_still_maps_tokens_correctly() {
        let mut editor = TextEditor::with_language(Language::Cpp);
        editor.set_text("int x = 1;");
        // A second, small edit reparses incrementally against the tree left
        // over from the first parse rather than from scratch.
        editor.set_cursors(vec![Cursor::collapsed(Position { line: 0, char_index: 9 })]);
        editor.type_text(&["0".to_string()]);
        assert_eq!(editor.text(), "int x = 10;");
        let palette = editor.palette();
        let row: Vec<PaletteIndex> = palette[0].iter().copied().collect();
        assert!(matches!(row[0], PaletteIndex::Type));
        assert!(matches!(row[8], PaletteIndex::NumberLiteral));
        assert!(matches!(row[9], PaletteIndex::NumberLiteral));
    }

    #[test]
    fn edit_span_detects_a_changed_line_and_a_pure_line_append() {
        let a = text_to_lines("int x = 1;");
        let b = text_to_lines("int x = 10;");
        let (start, old_end, new_end) = edit_span(&a, &b).expect("lines differ");
        assert_eq!(start, 0);
        assert_eq!(old_end, "int x = 1;".len());
        assert_eq!(new_end, "int x = 10;".len());

        let c = text_to_lines("line one");
        assert!(edit_span(&c, &c).is_none());

        let d = text_to_lines("line one\nline two");
        let (start2, old_end2, new_end2) = edit_span(&c, &d).expect("append differs");
        assert_eq!(old_end2, start2, "nothing in the old buffer was removed");
        assert!(new_end2 > old_end2);
    }

    #[test]
    fn backspace_removes_one_char_before_caret() {
        let mut editor = TextEditor::new();
        editor.type_text(&["abc".to_string()]);
        editor.delete_backward();
        assert_eq!(editor.text(), "ab");
    }
}
