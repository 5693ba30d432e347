//! Authentication and session-control backend messages.

use zerocopy::{FromBytes, Immutable, KnownLayout};

use crate::error::{Error, Result};
use crate::protocol::codec::{read_cstr, read_i32, read_u32};
use crate::protocol::types::{TransactionStatus, U32BE};

/// Authentication request sub-codes.
pub mod auth_code {
    pub const OK: i32 = 0;
    pub const KERBEROS_V5: i32 = 2;
    pub const CLEARTEXT_PASSWORD: i32 = 3;
    pub const MD5_PASSWORD: i32 = 5;
    pub const SCM_CREDENTIAL: i32 = 6;
    pub const GSS: i32 = 7;
    pub const GSS_CONTINUE: i32 = 8;
    pub const SSPI: i32 = 9;
    pub const SASL: i32 = 10;
    pub const SASL_CONTINUE: i32 = 11;
    pub const SASL_FINAL: i32 = 12;
}

/// AuthenticationRequest message from the server.
///
/// Only `Ok`, `CleartextPassword` and `Md5Password` can be satisfied;
/// the remaining variants are recognized so the session can report
/// them as unsupported rather than as garbage frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticationRequest {
    /// Authentication successful
    Ok,
    /// Cleartext password required
    CleartextPassword,
    /// MD5 password required (with 4-byte salt)
    Md5Password { salt: [u8; 4] },
    /// Kerberos V5 authentication
    KerberosV5,
    /// SCM credential authentication
    ScmCredential,
    /// GSSAPI authentication
    Gss,
    /// GSSAPI continuation data
    GssContinue,
    /// SSPI authentication
    Sspi,
    /// SASL authentication
    Sasl,
    /// SASL continuation data
    SaslContinue,
    /// SASL final data
    SaslFinal,
}

impl AuthenticationRequest {
    /// Parse an AuthenticationRequest message from payload bytes.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let (code, rest) = read_i32(payload)?;

        match code {
            auth_code::OK => Ok(AuthenticationRequest::Ok),
            auth_code::CLEARTEXT_PASSWORD => Ok(AuthenticationRequest::CleartextPassword),
            auth_code::MD5_PASSWORD => {
                if rest.len() < 4 {
                    return Err(Error::Protocol("Md5Password: missing salt".into()));
                }
                let mut salt = [0u8; 4];
                salt.copy_from_slice(&rest[..4]);
                Ok(AuthenticationRequest::Md5Password { salt })
            }
            auth_code::KERBEROS_V5 => Ok(AuthenticationRequest::KerberosV5),
            auth_code::SCM_CREDENTIAL => Ok(AuthenticationRequest::ScmCredential),
            auth_code::GSS => Ok(AuthenticationRequest::Gss),
            auth_code::GSS_CONTINUE => Ok(AuthenticationRequest::GssContinue),
            auth_code::SSPI => Ok(AuthenticationRequest::Sspi),
            auth_code::SASL => Ok(AuthenticationRequest::Sasl),
            auth_code::SASL_CONTINUE => Ok(AuthenticationRequest::SaslContinue),
            auth_code::SASL_FINAL => Ok(AuthenticationRequest::SaslFinal),
            _ => Err(Error::Protocol(format!(
                "unknown authentication request code: {}",
                code
            ))),
        }
    }

    /// Human-readable method name for diagnostics.
    pub fn method_name(self) -> &'static str {
        match self {
            AuthenticationRequest::Ok => "ok",
            AuthenticationRequest::CleartextPassword => "cleartext password",
            AuthenticationRequest::Md5Password { .. } => "md5 password",
            AuthenticationRequest::KerberosV5 => "Kerberos V5",
            AuthenticationRequest::ScmCredential => "SCM credential",
            AuthenticationRequest::Gss => "GSSAPI",
            AuthenticationRequest::GssContinue => "GSSAPI continuation",
            AuthenticationRequest::Sspi => "SSPI",
            AuthenticationRequest::Sasl => "SASL",
            AuthenticationRequest::SaslContinue => "SASL continuation",
            AuthenticationRequest::SaslFinal => "SASL final",
        }
    }
}

/// BackendKeyData message - contains process ID and secret key for cancellation.
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub struct BackendKeyData {
    /// Process ID of the backend
    pub pid: U32BE,
    /// Secret key for cancellation
    pub secret_key: U32BE,
}

impl BackendKeyData {
    /// Parse a BackendKeyData message from payload bytes.
    pub fn parse(payload: &[u8]) -> Result<&Self> {
        Self::ref_from_bytes(payload).map_err(|e| Error::Protocol(format!("BackendKeyData: {e:?}")))
    }

    /// Get the process ID.
    pub fn process_id(&self) -> u32 {
        self.pid.get()
    }

    /// Get the secret key.
    pub fn secret(&self) -> u32 {
        self.secret_key.get()
    }
}

/// ParameterStatus message - server parameter name and value.
///
/// Exactly one (name, value) pair per frame.
#[derive(Debug, Clone)]
pub struct ParameterStatus<'a> {
    /// Parameter name
    pub name: &'a str,
    /// Parameter value
    pub value: &'a str,
}

impl<'a> ParameterStatus<'a> {
    /// Parse a ParameterStatus message from payload bytes.
    pub fn parse(payload: &'a [u8]) -> Result<Self> {
        let (name, rest) = read_cstr(payload)?;
        let (value, _) = read_cstr(rest)?;
        Ok(Self { name, value })
    }
}

/// ReadyForQuery message - indicates server is ready for a new query.
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub struct ReadyForQuery {
    /// Transaction status byte
    pub status: u8,
}

impl ReadyForQuery {
    /// Parse a ReadyForQuery message from payload bytes.
    pub fn parse(payload: &[u8]) -> Result<&Self> {
        Self::ref_from_bytes(payload).map_err(|e| Error::Protocol(format!("ReadyForQuery: {e:?}")))
    }

    /// Get the transaction status.
    pub fn transaction_status(&self) -> Result<TransactionStatus> {
        TransactionStatus::from_byte(self.status).ok_or_else(|| {
            Error::Protocol(format!(
                "ReadyForQuery: unknown status byte '{}'",
                self.status as char
            ))
        })
    }
}

/// NotificationResponse message - asynchronous notification from LISTEN/NOTIFY.
#[derive(Debug, Clone)]
pub struct NotificationResponse<'a> {
    /// PID of the notifying backend
    pub pid: u32,
    /// Channel name
    pub channel: &'a str,
    /// Notification payload
    pub payload: &'a str,
}

impl<'a> NotificationResponse<'a> {
    /// Parse a NotificationResponse message from payload bytes.
    pub fn parse(payload: &'a [u8]) -> Result<Self> {
        let (pid, rest) = read_u32(payload)?;
        let (channel, rest) = read_cstr(rest)?;
        let (payload_str, _) = read_cstr(rest)?;
        Ok(Self {
            pid,
            channel,
            payload: payload_str,
        })
    }
}
