//! Spreadsheet column designators (`A`, `B`, ..., `AA`, ...) to zero-based
//! column positions.
//!
//! A designator is interpreted as if it were the cell reference
//! `<designator>1`, so a plain column letter, or a letter followed by a row
//! number, resolves to the column it names. Anything else, including a blank
//! designator, resolves to `None`. Callers decide whether `None` is a
//! configuration error (required role) or simply an unused role.

/// Last addressable column in a worksheet (`XFD`).
pub const MAX_COLUMN: usize = 16_383;

const MAX_LETTERS: usize = 3;

pub fn column_index(designator: &str) -> Option<usize> {
    let reference = format!("{designator}1");
    let letters = reference
        .bytes()
        .take_while(|b| b.is_ascii_alphabetic())
        .count();
    if letters == 0 || letters > MAX_LETTERS {
        return None;
    }
    let (column, row) = reference.split_at(letters);
    if row.starts_with('0') || !row.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut number = 0usize;
    for letter in column.bytes() {
        number = number * 26 + usize::from(letter.to_ascii_uppercase() - b'A') + 1;
    }
    let index = number - 1;
    (index <= MAX_COLUMN).then_some(index)
}

/// Inverse of [`column_index`], used when reporting positions in logs.
pub fn column_name(index: usize) -> String {
    let mut remaining = index + 1;
    let mut letters = Vec::new();
    while remaining > 0 {
        let rem = (remaining - 1) % 26;
        letters.push(b'A' + rem as u8);
        remaining = (remaining - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}
