//! Simple-protocol Query message.

use crate::protocol::codec::{frame, write_cstr};

/// Frame a Query message carrying one SQL string.
///
/// Several statements may be batched in `sql`, separated by
/// semicolons; the server answers each in turn before ReadyForQuery.
pub fn write_query(out: &mut Vec<u8>, sql: &str) {
    frame(out, super::msg_type::QUERY, |out| write_cstr(out, sql));
}
