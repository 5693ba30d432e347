//! Error and notice response messages.

use crate::error::{Error, NoticeFields, Result};
use crate::protocol::codec::read_cstr;

/// Parse error/notice fields from payload into a NoticeFields map.
///
/// The payload is a sequence of (1-byte tag, NUL-terminated string)
/// pairs terminated by a zero tag. An unrecognized tag is a fatal
/// protocol error.
fn parse_fields(payload: &[u8]) -> Result<NoticeFields> {
    let mut fields = NoticeFields::default();
    let mut data = payload;

    while !data.is_empty() && data[0] != 0 {
        let tag = data[0];
        data = &data[1..];

        let (value, rest) = read_cstr(data)?;
        data = rest;

        let slot = match tag {
            b'S' => &mut fields.severity,
            b'C' => &mut fields.code,
            b'M' => &mut fields.message,
            b'D' => &mut fields.detail,
            b'H' => &mut fields.hint,
            b'P' => &mut fields.position,
            b'p' => &mut fields.internal_position,
            b'q' => &mut fields.internal_query,
            b'W' => &mut fields.where_,
            b'F' => &mut fields.file,
            b'L' => &mut fields.line,
            b'R' => &mut fields.routine,
            _ => {
                return Err(Error::Protocol(format!(
                    "unknown notice field tag '{}'",
                    tag as char
                )));
            }
        };
        *slot = Some(value.to_string());
    }

    Ok(fields)
}

/// ErrorResponse message - error reported by the server.
#[derive(Debug, Clone)]
pub struct ErrorResponse(pub NoticeFields);

impl ErrorResponse {
    /// Parse an ErrorResponse message from payload bytes.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        Ok(Self(parse_fields(payload)?))
    }

    /// Get the underlying field map.
    pub fn fields(&self) -> &NoticeFields {
        &self.0
    }
}

/// NoticeResponse message - non-fatal warning/info from server.
#[derive(Debug, Clone)]
pub struct NoticeResponse(pub NoticeFields);

impl NoticeResponse {
    /// Parse a NoticeResponse message from payload bytes.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        Ok(Self(parse_fields(payload)?))
    }

    /// Get the underlying field map.
    pub fn fields(&self) -> &NoticeFields {
        &self.0
    }
}
