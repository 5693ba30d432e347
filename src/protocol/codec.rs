//! Low-level wire encoding and decoding.
//!
//! All integers are big-endian. Strings are NUL-terminated with no
//! length prefix; parameter byte blocks carry a 4-byte length where
//! -1 denotes SQL NULL.
//!
//! Messages are framed with [`frame`] / [`frame_untyped`]: the helpers
//! reserve the 4-byte self-inclusive length, run a payload closure,
//! then backfill the length.

use zerocopy::{FromBytes, IntoBytes};

use super::types::{I16BE, I32BE, U16BE, U32BE};
use crate::error::{Error, Result};

/// Length value that denotes SQL NULL in a parameter or result cell.
pub const NULL_LENGTH: i32 = -1;

/// Read one fixed-width value through its zerocopy wire wrapper.
fn read_be<'a, W: FromBytes + Copy>(data: &'a [u8], what: &'static str) -> Result<(W, &'a [u8])> {
    let width = std::mem::size_of::<W>();
    if data.len() < width {
        let have = data.len();
        return Err(Error::Protocol(format!("{what}: need {width} bytes, have {have}")));
    }
    match W::read_from_bytes(&data[..width]) {
        Ok(value) => Ok((value, &data[width..])),
        Err(_) => Err(Error::Protocol(format!("{what}: unreadable bytes"))),
    }
}

/// Declare the read/write pair for one integer width.
macro_rules! int_codec {
    ($read:ident, $write:ident, $wrapper:ident, $int:ty) => {
        #[doc = concat!(
            "Read a big-endian `", stringify!($int), "`, returning it with the remaining bytes."
        )]
        #[inline]
        pub fn $read(data: &[u8]) -> Result<($int, &[u8])> {
            let (value, rest) = read_be::<$wrapper>(data, stringify!($read))?;
            Ok((value.get(), rest))
        }

        #[doc = concat!("Append a `", stringify!($int), "` in big-endian byte order.")]
        #[inline]
        pub fn $write(out: &mut Vec<u8>, value: $int) {
            out.extend_from_slice($wrapper::new(value).as_bytes());
        }
    };
}

int_codec!(read_i16, write_i16, I16BE, i16);
int_codec!(read_u16, write_u16, U16BE, u16);
int_codec!(read_i32, write_i32, I32BE, i32);
int_codec!(read_u32, write_u32, U32BE, u32);

/// Read a single byte.
#[inline]
pub fn read_u8(data: &[u8]) -> Result<(u8, &[u8])> {
    match data.split_first() {
        Some((&byte, rest)) => Ok((byte, rest)),
        None => Err(Error::Protocol("read_u8: empty buffer".into())),
    }
}

/// Append a single byte.
#[inline]
pub fn write_u8(out: &mut Vec<u8>, value: u8) {
    out.push(value);
}

/// Read exactly `len` bytes, returning them with the remaining bytes.
#[inline]
pub fn read_bytes(data: &[u8], len: usize) -> Result<(&[u8], &[u8])> {
    if len > data.len() {
        let have = data.len();
        return Err(Error::Protocol(format!("read_bytes: need {len} bytes, have {have}")));
    }
    Ok(data.split_at(len))
}

/// Append raw bytes.
#[inline]
pub fn write_bytes(out: &mut Vec<u8>, data: &[u8]) {
    out.extend_from_slice(data);
}

/// Read a 4-byte length-prefixed byte block.
///
/// A length of -1 denotes SQL NULL and carries no payload bytes.
#[inline]
pub fn read_nullable_bytes(data: &[u8]) -> Result<(Option<&[u8]>, &[u8])> {
    let (len, rest) = read_i32(data)?;
    if len == NULL_LENGTH {
        return Ok((None, rest));
    }
    if len < 0 {
        return Err(Error::Protocol(format!("read_nullable_bytes: negative length {len}")));
    }
    let (value, rest) = read_bytes(rest, len as usize)?;
    Ok((Some(value), rest))
}

/// Append a 4-byte length-prefixed byte block; `None` writes the NULL length.
#[inline]
pub fn write_nullable_bytes(out: &mut Vec<u8>, data: Option<&[u8]>) {
    match data {
        None => write_i32(out, NULL_LENGTH),
        Some(bytes) => {
            write_i32(out, bytes.len() as i32);
            write_bytes(out, bytes);
        }
    }
}

/// Read a NUL-terminated byte string, without its terminator.
#[inline]
pub fn read_cstring(data: &[u8]) -> Result<(&[u8], &[u8])> {
    let nul = memchr::memchr(0, data)
        .ok_or_else(|| Error::Protocol("string is missing its NUL terminator".into()))?;
    Ok((&data[..nul], &data[nul + 1..]))
}

/// Read a NUL-terminated string as `&str`.
#[inline]
pub fn read_cstr(data: &[u8]) -> Result<(&str, &[u8])> {
    let (raw, rest) = read_cstring(data)?;
    match std::str::from_utf8(raw) {
        Ok(s) => Ok((s, rest)),
        Err(e) => Err(Error::Protocol(format!("string is not valid UTF-8: {e}"))),
    }
}

/// Append a byte string with its NUL terminator.
#[inline]
pub fn write_cstring(out: &mut Vec<u8>, s: &[u8]) {
    out.reserve(s.len() + 1);
    out.extend_from_slice(s);
    out.push(0);
}

/// Append a `&str` with its NUL terminator.
#[inline]
pub fn write_cstr(out: &mut Vec<u8>, s: &str) {
    write_cstring(out, s.as_bytes());
}

/// Frame one typed message: type byte, then the self-inclusive 4-byte
/// length (which excludes the type byte), then whatever `payload`
/// writes.
pub fn frame(out: &mut Vec<u8>, type_byte: u8, payload: impl FnOnce(&mut Vec<u8>)) {
    out.push(type_byte);
    frame_untyped(out, payload);
}

/// Frame an untyped message (StartupMessage, SSLRequest,
/// CancelRequest): the self-inclusive length with no type byte.
pub fn frame_untyped(out: &mut Vec<u8>, payload: impl FnOnce(&mut Vec<u8>)) {
    let base = out.len();
    out.extend_from_slice(&[0; 4]);
    payload(out);
    let declared = (out.len() - base) as i32;
    out[base..base + 4].copy_from_slice(&declared.to_be_bytes());
}

/// Frame a typed message with an empty payload.
pub fn frame_empty(out: &mut Vec<u8>, type_byte: u8) {
    frame(out, type_byte, |_| {});
}
