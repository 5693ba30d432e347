//! Password response messages and the MD5 derivation.

use md5::{Digest, Md5};

use crate::protocol::codec::{frame, write_cstr};

/// Frame a PasswordMessage carrying `password` verbatim.
///
/// For md5 authentication the caller passes the already-derived
/// [`md5_password`] value instead of the raw password.
pub fn write_password(out: &mut Vec<u8>, password: &str) {
    frame(out, super::msg_type::PASSWORD, |out| {
        write_cstr(out, password)
    });
}

/// MD5 over the concatenation of `parts`, as lowercase hex.
fn md5_hex(parts: &[&[u8]]) -> String {
    let mut digest = Md5::new();
    for part in parts {
        digest.update(part);
    }
    format!("{:x}", digest.finalize())
}

/// Derive the MD5 password response.
///
/// The wire value is `"md5" + md5(md5(password + username) + salt)`,
/// with both digests rendered as lowercase hex and the salt being the
/// exact 4 bytes from AuthenticationMD5Password.
pub fn md5_password(username: &str, password: &str, salt: &[u8; 4]) -> String {
    let credentials = md5_hex(&[password.as_bytes(), username.as_bytes()]);
    let salted = md5_hex(&[credentials.as_bytes(), salt]);
    format!("md5{salted}")
}
