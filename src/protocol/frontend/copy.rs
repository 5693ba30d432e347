//! COPY transfer frontend messages.

use crate::protocol::codec::{frame, frame_empty, write_bytes, write_cstr};

/// Wrap raw COPY payload bytes in a CopyData frame.
pub fn write_copy_data(out: &mut Vec<u8>, data: &[u8]) {
    frame(out, super::msg_type::COPY_DATA, |out| write_bytes(out, data));
}

/// Signal the end of the client's COPY data stream.
pub fn write_copy_done(out: &mut Vec<u8>) {
    frame_empty(out, super::msg_type::COPY_DONE);
}

/// Abort the COPY transfer, reporting `reason` to the server.
pub fn write_copy_fail(out: &mut Vec<u8>, reason: &str) {
    frame(out, super::msg_type::COPY_FAIL, |out| write_cstr(out, reason));
}
