//! Extended query protocol messages.

use crate::protocol::codec::{
    frame, frame_empty, write_cstr, write_i16, write_i32, write_nullable_bytes, write_u8,
};

/// Frame a Parse message.
///
/// `name` registers the statement server-side (empty = unnamed); `sql`
/// may use $1, $2, ... placeholders. The parameter-type count is
/// always written as zero so the server infers parameter types.
pub fn write_parse(out: &mut Vec<u8>, name: &str, sql: &str) {
    frame(out, super::msg_type::PARSE, |out| {
        write_cstr(out, name);
        write_cstr(out, sql);
        write_i16(out, 0);
    });
}

/// Frame a Bind message, creating `portal` from the named statement.
///
/// `parameters` holds the raw value bytes per placeholder; `None`
/// cells are SQL NULL. Both format-code lists are written empty, so
/// every parameter and result column defaults to text.
pub fn write_bind(
    out: &mut Vec<u8>,
    portal: &str,
    statement: &str,
    parameters: &[Option<&[u8]>],
) {
    frame(out, super::msg_type::BIND, |out| {
        write_cstr(out, portal);
        write_cstr(out, statement);

        // Empty parameter format-code list: all text.
        write_i16(out, 0);

        write_i16(out, parameters.len() as i16);
        for value in parameters {
            write_nullable_bytes(out, *value);
        }

        // Empty result format-code list: all text.
        write_i16(out, 0);
    });
}

/// Frame an Execute message for `portal`, returning at most `max_rows`
/// rows (0 = unlimited).
pub fn write_execute(out: &mut Vec<u8>, portal: &str, max_rows: u32) {
    frame(out, super::msg_type::EXECUTE, |out| {
        write_cstr(out, portal);
        write_i32(out, max_rows as i32);
    });
}

/// Frame a Describe message. `target` is `b'S'` (statement) or `b'P'`
/// (portal).
pub fn write_describe(out: &mut Vec<u8>, target: u8, name: &str) {
    frame(out, super::msg_type::DESCRIBE, |out| {
        write_u8(out, target);
        write_cstr(out, name);
    });
}

/// Describe a prepared statement by name.
pub fn write_describe_statement(out: &mut Vec<u8>, name: &str) {
    write_describe(out, b'S', name);
}

/// Describe a portal by name.
pub fn write_describe_portal(out: &mut Vec<u8>, name: &str) {
    write_describe(out, b'P', name);
}

/// Frame a Close message. `target` is `b'S'` (statement) or `b'P'`
/// (portal).
pub fn write_close(out: &mut Vec<u8>, target: u8, name: &str) {
    frame(out, super::msg_type::CLOSE, |out| {
        write_u8(out, target);
        write_cstr(out, name);
    });
}

/// Release a prepared statement by name.
pub fn write_close_statement(out: &mut Vec<u8>, name: &str) {
    write_close(out, b'S', name);
}

/// Release a portal by name.
pub fn write_close_portal(out: &mut Vec<u8>, name: &str) {
    write_close(out, b'P', name);
}

/// Frame a Sync message, ending an extended-query sequence.
///
/// Outside an explicit transaction the server commits (or, after an
/// error, rolls back) and then reports ReadyForQuery.
pub fn write_sync(out: &mut Vec<u8>) {
    frame_empty(out, super::msg_type::SYNC);
}

/// Frame a Flush message, forcing the server to deliver pending
/// responses without waiting for a Sync.
pub fn write_flush(out: &mut Vec<u8>) {
    frame_empty(out, super::msg_type::FLUSH);
}
