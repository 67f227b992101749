//! Syntax palette: mapping tree-sitter node kinds to a small highlight
//! index, and recomputing the per-char palette grid from a parsed tree.

use im::Vector;

/// A highlight category assigned to each char position in the buffer.
/// Deliberately coarse — the external UI layer owns the actual colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaletteIndex {
    /// No specific mapping for this node kind.
    #[default]
    Default,
    /// A type name (`int`, `struct Foo`, ...).
    Type,
    /// A variable, function, or member name.
    Identifier,
    /// An operator token (`=`, `+`, `==`, ...).
    Operator,
    /// An integer or floating-point literal.
    NumberLiteral,
    /// A string or char literal.
    StringLiteral,
    /// Punctuation (`;`, `,`, `{`, `}`, `(`, `)`).
    Punctuation,
    /// A reserved keyword (`if`, `return`, `struct`, ...).
    Keyword,
    /// A line or block comment.
    Comment,
}

/// Maps a tree-sitter C++ grammar node kind to a palette index.
/// Unmapped kinds (grouping/expression nodes with no terminal meaning of
/// their own) fall back to `Default`.
pub fn palette_for_cpp_kind(kind: &str) -> PaletteIndex {
    match kind {
        "primitive_type" | "type_identifier" | "sized_type_specifier" | "auto" => PaletteIndex::Type,
        "identifier" | "field_identifier" | "namespace_identifier" => PaletteIndex::Identifier,
        "number_literal" => PaletteIndex::NumberLiteral,
        "string_literal" | "char_literal" | "raw_string_literal" | "system_lib_string" => {
            PaletteIndex::StringLiteral
        }
        "comment" => PaletteIndex::Comment,
        "(" | ")" | "{" | "}" | "[" | "]" | ";" | "," | "::" => PaletteIndex::Punctuation,
        "=" | "==" | "!=" | "<" | ">" | "<=" | ">=" | "+" | "-" | "*" | "/" | "%" | "&&" | "||" | "!"
        | "&" | "|" | "^" | "~" | "<<" | ">>" | "+=" | "-=" | "*=" | "/=" | "->" | "." => {
            PaletteIndex::Operator
        }
        "if" | "else" | "for" | "while" | "do" | "return" | "break" | "continue" | "struct" | "class"
        | "public" | "private" | "protected" | "namespace" | "using" | "template" | "typename"
        | "const" | "static" | "void" | "true" | "false" | "new" | "delete" | "switch" | "case"
        | "default" | "enum" | "virtual" | "override" => PaletteIndex::Keyword,
        _ => PaletteIndex::Default,
    }
}

/// Recomputes the palette grid from the parsed tree, walking it and
/// painting every covered char position for each leaf (or `comment`
/// subtree, which is treated as a single leaf and never descended into).
/// Positions not covered by any node keep `Default`.
pub fn recompute(tree: &tree_sitter::Tree, line_lengths: &[usize]) -> Vector<Vector<PaletteIndex>> {
    let mut grid: Vec<Vec<PaletteIndex>> =
        line_lengths.iter().map(|&len| vec![PaletteIndex::Default; len]).collect();
    paint_node(tree.root_node(), &mut grid);
    grid.into_iter().map(im::Vector::from).collect()
}

fn paint_node(node: tree_sitter::Node, grid: &mut [Vec<PaletteIndex>]) {
    let is_leaf = node.child_count() == 0 || node.kind() == "comment";
    if is_leaf {
        paint_range(node, grid);
        return;
    }
    let mut child_cursor = node.walk();
    for child in node.children(&mut child_cursor) {
        paint_node(child, grid);
    }
}

fn paint_range(node: tree_sitter::Node, grid: &mut [Vec<PaletteIndex>]) {
    let index = palette_for_cpp_kind(node.kind());
    if matches!(index, PaletteIndex::Default) {
        return;
    }
    let start = node.start_position();
    let end = node.end_position();
    if start.row == end.row {
        paint_line(grid, start.row, start.column, end.column, index);
    } else {
        paint_line(grid, start.row, start.column, grid.get(start.row).map_or(0, Vec::len), index);
        for row in start.row + 1..end.row {
            let len = grid.get(row).map_or(0, Vec::len);
            paint_line(grid, row, 0, len, index);
        }
        paint_line(grid, end.row, 0, end.column, index);
    }
}

fn paint_line(grid: &mut [Vec<PaletteIndex>], row: usize, from: usize, to: usize, index: PaletteIndex) {
    if let Some(line) = grid.get_mut(row) {
        let to = to.min(line.len());
        for cell in &mut line[from.min(to)..to] {
            *cell = index;
        }
    }
}
