//! PostgreSQL backend (server → client) messages.

pub mod auth;
pub mod copy;
pub mod error;
pub mod extended;
pub mod query;

pub use auth::{
    AuthenticationRequest, BackendKeyData, NotificationResponse, ParameterStatus, ReadyForQuery,
};
pub use copy::{CopyBothResponse, CopyData, CopyDone, CopyInResponse, CopyOutResponse};
pub use error::{ErrorResponse, NoticeResponse};
pub use extended::{
    BindComplete, CloseComplete, FunctionCallResponse, NoData, ParameterDescription, ParseComplete,
    PortalSuspended,
};
pub use query::{
    CommandComplete, ColumnDescription, DataRow, EmptyQueryResponse, FieldDescription,
    RowDescription,
};

/// Backend message type bytes.
pub mod msg_type {
    /// AuthenticationRequest
    pub const AUTHENTICATION: u8 = b'R';
    /// BackendKeyData
    pub const BACKEND_KEY_DATA: u8 = b'K';
    /// ParameterStatus
    pub const PARAMETER_STATUS: u8 = b'S';
    /// ReadyForQuery
    pub const READY_FOR_QUERY: u8 = b'Z';
    /// RowDescription
    pub const ROW_DESCRIPTION: u8 = b'T';
    /// DataRow
    pub const DATA_ROW: u8 = b'D';
    /// CommandComplete
    pub const COMMAND_COMPLETE: u8 = b'C';
    /// EmptyQueryResponse
    pub const EMPTY_QUERY_RESPONSE: u8 = b'I';
    /// ErrorResponse
    pub const ERROR_RESPONSE: u8 = b'E';
    /// NoticeResponse
    pub const NOTICE_RESPONSE: u8 = b'N';
    /// NotificationResponse
    pub const NOTIFICATION_RESPONSE: u8 = b'A';
    /// ParseComplete
    pub const PARSE_COMPLETE: u8 = b'1';
    /// BindComplete
    pub const BIND_COMPLETE: u8 = b'2';
    /// CloseComplete
    pub const CLOSE_COMPLETE: u8 = b'3';
    /// ParameterDescription
    pub const PARAMETER_DESCRIPTION: u8 = b't';
    /// NoData
    pub const NO_DATA: u8 = b'n';
    /// PortalSuspended
    pub const PORTAL_SUSPENDED: u8 = b's';
    /// CopyInResponse
    pub const COPY_IN_RESPONSE: u8 = b'G';
    /// CopyOutResponse
    pub const COPY_OUT_RESPONSE: u8 = b'H';
    /// CopyBothResponse
    pub const COPY_BOTH_RESPONSE: u8 = b'W';
    /// CopyData
    pub const COPY_DATA: u8 = b'd';
    /// CopyDone
    pub const COPY_DONE: u8 = b'c';
    /// FunctionCallResponse
    pub const FUNCTION_CALL_RESPONSE: u8 = b'V';
}

/// Logical backend message kinds, one per known type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendMessageKind {
    AuthenticationRequest,
    BackendKeyData,
    ParameterStatus,
    ReadyForQuery,
    RowDescription,
    DataRow,
    CommandComplete,
    EmptyQueryResponse,
    ErrorResponse,
    NoticeResponse,
    NotificationResponse,
    ParseComplete,
    BindComplete,
    CloseComplete,
    ParameterDescription,
    NoData,
    PortalSuspended,
    CopyInResponse,
    CopyOutResponse,
    CopyBothResponse,
    CopyData,
    CopyDone,
    FunctionCallResponse,
}

/// Static name ↔ code table for backend messages.
pub const BACKEND_MESSAGES: &[(BackendMessageKind, &str, u8)] = &[
    (BackendMessageKind::AuthenticationRequest, "AuthenticationRequest", msg_type::AUTHENTICATION),
    (BackendMessageKind::BackendKeyData, "BackendKeyData", msg_type::BACKEND_KEY_DATA),
    (BackendMessageKind::ParameterStatus, "ParameterStatus", msg_type::PARAMETER_STATUS),
    (BackendMessageKind::ReadyForQuery, "ReadyForQuery", msg_type::READY_FOR_QUERY),
    (BackendMessageKind::RowDescription, "RowDescription", msg_type::ROW_DESCRIPTION),
    (BackendMessageKind::DataRow, "DataRow", msg_type::DATA_ROW),
    (BackendMessageKind::CommandComplete, "CommandComplete", msg_type::COMMAND_COMPLETE),
    (BackendMessageKind::EmptyQueryResponse, "EmptyQueryResponse", msg_type::EMPTY_QUERY_RESPONSE),
    (BackendMessageKind::ErrorResponse, "ErrorResponse", msg_type::ERROR_RESPONSE),
    (BackendMessageKind::NoticeResponse, "NoticeResponse", msg_type::NOTICE_RESPONSE),
    (BackendMessageKind::NotificationResponse, "NotificationResponse", msg_type::NOTIFICATION_RESPONSE),
    (BackendMessageKind::ParseComplete, "ParseComplete", msg_type::PARSE_COMPLETE),
    (BackendMessageKind::BindComplete, "BindComplete", msg_type::BIND_COMPLETE),
    (BackendMessageKind::CloseComplete, "CloseComplete", msg_type::CLOSE_COMPLETE),
    (BackendMessageKind::ParameterDescription, "ParameterDescription", msg_type::PARAMETER_DESCRIPTION),
    (BackendMessageKind::NoData, "NoData", msg_type::NO_DATA),
    (BackendMessageKind::PortalSuspended, "PortalSuspended", msg_type::PORTAL_SUSPENDED),
    (BackendMessageKind::CopyInResponse, "CopyInResponse", msg_type::COPY_IN_RESPONSE),
    (BackendMessageKind::CopyOutResponse, "CopyOutResponse", msg_type::COPY_OUT_RESPONSE),
    (BackendMessageKind::CopyBothResponse, "CopyBothResponse", msg_type::COPY_BOTH_RESPONSE),
    (BackendMessageKind::CopyData, "CopyData", msg_type::COPY_DATA),
    (BackendMessageKind::CopyDone, "CopyDone", msg_type::COPY_DONE),
    (BackendMessageKind::FunctionCallResponse, "FunctionCallResponse", msg_type::FUNCTION_CALL_RESPONSE),
];

impl BackendMessageKind {
    /// Map a type byte to its message kind. Unknown bytes are a fatal
    /// protocol error for the caller.
    pub fn from_code(code: u8) -> Option<Self> {
        BACKEND_MESSAGES
            .iter()
            .find(|(_, _, c)| *c == code)
            .map(|(kind, _, _)| *kind)
    }

    /// Look up a message kind by its logical name.
    pub fn from_name(name: &str) -> Option<Self> {
        BACKEND_MESSAGES
            .iter()
            .find(|(_, n, _)| *n == name)
            .map(|(kind, _, _)| *kind)
    }

    /// The message's type byte.
    pub fn code(self) -> u8 {
        BACKEND_MESSAGES
            .iter()
            .find(|(kind, _, _)| *kind == self)
            .map(|(_, _, c)| *c)
            .unwrap_or(0)
    }

    /// The message's logical name.
    pub fn name(self) -> &'static str {
        BACKEND_MESSAGES
            .iter()
            .find(|(kind, _, _)| *kind == self)
            .map(|(_, n, _)| *n)
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_bidirectional() {
        for (kind, name, code) in BACKEND_MESSAGES {
            assert_eq!(BackendMessageKind::from_code(*code), Some(*kind));
            assert_eq!(BackendMessageKind::from_name(name), Some(*kind));
            assert_eq!(kind.code(), *code);
            assert_eq!(kind.name(), *name);
        }
    }

    #[test]
    fn test_notification_binds_to_a() {
        assert_eq!(
            BackendMessageKind::from_code(b'A'),
            Some(BackendMessageKind::NotificationResponse)
        );
        assert_eq!(
            BackendMessageKind::from_name("NotificationResponse").map(|k| k.code()),
            Some(b'A')
        );
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(BackendMessageKind::from_code(b'v'), None);
        assert_eq!(BackendMessageKind::from_code(0), None);
    }
}
