//! The live text-editor engine behind a `TextBuffer` container field:
//! multi-cursor state, a persistent line/palette grid, tree-sitter syntax
//! highlighting, and the buffer's own undo stack. Deliberately storeless —
//! `flowgrid-app` is responsible for syncing an editor's committed text
//! into the project store and for snapping it back on project-level undo.

mod buffer;
mod cursor;
mod edit;
mod palette;
mod undo;

pub use buffer::{Language, TextEditor};
pub use cursor::{sanitize, sort_and_merge, Cursor, Position};
pub use edit::{find_matching_bracket, find_next_occurrence, find_word_boundary, is_word_char, split_for_paste};
pub use palette::{palette_for_cpp_kind, recompute as recompute_palette, PaletteIndex};
pub use undo::{EditOp, UndoRecord};
