//! CSV encoding
//!
//! Cells are joined with `,` and rows with `\n`, with no trailing newline.
//! A cell is quoted only when it contains a comma, a double quote or a
//! newline; quotes inside a quoted cell are doubled.

use tablegrab_provider::{cell_text, Cell, Row};

pub fn encode(rows: &[Row]) -> String {
    let mut out = String::new();

    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        encode_row(row, &mut out);
    }

    out
}

fn encode_row(row: &[Cell], out: &mut String) {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_field(&cell_text(cell), out);
    }
}

fn push_field(text: &str, out: &mut String) {
    if needs_quoting(text) {
        out.push('"');
        out.push_str(&text.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(text);
    }
}

pub fn needs_quoting(text: &str) -> bool {
    text.contains([',', '"', '\n'])
}
