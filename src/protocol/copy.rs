//! COPY text-format row encoding.
//!
//! COPY IN text format: one line per row, cells joined by tab,
//! terminated by newline. NULL cells are the literal two bytes `\N`.

/// Append one COPY text-format row to `out`.
///
/// Each non-null cell is escaped with [`escape_text_cell`]; `None`
/// cells become `\N`.
pub fn encode_text_row(out: &mut Vec<u8>, cells: &[Option<&[u8]>]) {
    for (idx, cell) in cells.iter().enumerate() {
        if idx > 0 {
            out.push(b'\t');
        }
        match cell {
            None => out.extend_from_slice(b"\\N"),
            Some(bytes) => escape_text_cell(out, bytes),
        }
    }
    out.push(b'\n');
}

/// Escape a single cell for COPY text format.
///
/// Substitutes, in order: `\` → `\\`, 0x08 → `\b`, 0x0C → `\f`,
/// 0x0A → `\n`, 0x09 → `\t`, 0x0B → `\v`. All other bytes pass
/// through unchanged, so the encoding is 8-bit clean.
pub fn escape_text_cell(out: &mut Vec<u8>, bytes: &[u8]) {
    for &b in bytes {
        match b {
            b'\\' => out.extend_from_slice(b"\\\\"),
            0x08 => out.extend_from_slice(b"\\b"),
            0x0C => out.extend_from_slice(b"\\f"),
            0x0A => out.extend_from_slice(b"\\n"),
            0x09 => out.extend_from_slice(b"\\t"),
            0x0B => out.extend_from_slice(b"\\v"),
            _ => out.push(b),
        }
    }
}
