//! Startup and termination messages.

use crate::protocol::codec::{frame_empty, frame_untyped, write_cstr, write_i32, write_u8};

/// Wire value of protocol version 3.0 (0x00030000).
pub const PROTOCOL_VERSION_3_0: i32 = 196608;

/// Magic request code of the SSLRequest frame.
pub const SSL_REQUEST_CODE: i32 = 80877103;

/// Magic request code of the CancelRequest frame.
pub const CANCEL_REQUEST_CODE: i32 = 80877102;

/// Frame an SSLRequest.
///
/// Goes out before any StartupMessage to ask for TLS; the server
/// answers with a bare 'S' (accepted) or 'N' (rejected) byte.
pub fn write_ssl_request(out: &mut Vec<u8>) {
    frame_untyped(out, |out| write_i32(out, SSL_REQUEST_CODE));
}

/// Frame a StartupMessage.
///
/// The recognized parameters are written as paired NUL-terminated
/// (name, value) strings in a fixed order, followed by a single
/// terminating zero byte. Only defined values are included.
pub fn write_startup(out: &mut Vec<u8>, user: &str, database: Option<&str>, options: Option<&str>) {
    let pairs = [
        ("user", Some(user)),
        ("database", database),
        ("options", options),
    ];

    frame_untyped(out, |out| {
        write_i32(out, PROTOCOL_VERSION_3_0);
        for (name, value) in pairs {
            if let Some(value) = value {
                write_cstr(out, name);
                write_cstr(out, value);
            }
        }
        write_u8(out, 0);
    });
}

/// Frame a CancelRequest.
///
/// Goes out on a FRESH connection to cancel a query running on another
/// one, quoting that session's BackendKeyData pid and secret. The
/// server acts on it and closes the connection without replying.
pub fn write_cancel_request(out: &mut Vec<u8>, pid: u32, secret_key: u32) {
    frame_untyped(out, |out| {
        write_i32(out, CANCEL_REQUEST_CODE);
        write_i32(out, pid as i32);
        write_i32(out, secret_key as i32);
    });
}

/// Frame a Terminate message for a clean connection shutdown.
pub fn write_terminate(out: &mut Vec<u8>) {
    frame_empty(out, super::msg_type::TERMINATE);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn built(write: impl FnOnce(&mut Vec<u8>)) -> Vec<u8> {
        let mut out = Vec::new();
        write(&mut out);
        out
    }

    #[test]
    fn test_ssl_request() {
        let request = built(write_ssl_request);

        assert_eq!(request.len(), 8);
        assert_eq!(&request[0..4], &8_i32.to_be_bytes());
        assert_eq!(&request[4..8], &SSL_REQUEST_CODE.to_be_bytes());
    }

    #[test]
    fn test_startup() {
        let startup = built(|out| write_startup(out, "postgres", Some("test"), None));

        // Self-inclusive length at the start, no type byte.
        let declared = i32::from_be_bytes([startup[0], startup[1], startup[2], startup[3]]);
        assert_eq!(declared as usize, startup.len());

        assert_eq!(&startup[4..8], &PROTOCOL_VERSION_3_0.to_be_bytes());
        assert_eq!(&startup[8..], b"user\0postgres\0database\0test\0\0");
    }

    #[test]
    fn test_startup_user_only() {
        let startup = built(|out| write_startup(out, "alice", None, None));
        assert_eq!(&startup[8..], b"user\0alice\0\0");
    }

    #[test]
    fn test_cancel_request() {
        let cancel = built(|out| write_cancel_request(out, 12345, 99));

        assert_eq!(cancel.len(), 16);
        assert_eq!(&cancel[0..4], &16_i32.to_be_bytes());
        assert_eq!(&cancel[4..8], &CANCEL_REQUEST_CODE.to_be_bytes());
        assert_eq!(&cancel[8..12], &12345_i32.to_be_bytes());
        assert_eq!(&cancel[12..16], &99_i32.to_be_bytes());
    }

    #[test]
    fn test_terminate() {
        assert_eq!(built(write_terminate), b"X\x00\x00\x00\x04");
    }
}
