//! Session events and handler registration.
//!
//! Every decoded backend frame, plus a handful of session-lifecycle
//! moments, is surfaced as one [`Event`] variant. Handlers are
//! registered per [`EventKind`]; events for frames decoded by a single
//! `handle_message` call fire before that call returns, so handlers
//! observe strict wire order.

use crate::error::NoticeFields;
use crate::protocol::backend::ColumnDescription;
use crate::protocol::types::{FormatCode, Oid, TransactionStatus};

/// One decoded data-row cell with the column metadata that shaped it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataCell {
    /// Column metadata from the current row description.
    pub description: ColumnDescription,
    /// Raw cell bytes; `None` is SQL NULL.
    pub value: Option<Vec<u8>>,
}

impl DataCell {
    /// Returns true for SQL NULL cells.
    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }
}

/// Closed set of session events with typed payloads.
#[derive(Debug, Clone)]
pub enum Event {
    /// A frame was built and should be written to the transport.
    SendRequest { data: Vec<u8> },
    /// AuthenticationOk was received.
    Authenticated,
    /// The server requested a password (cleartext or md5).
    Password,
    /// Fired after AuthenticationOk; the handshake tail is streaming.
    RequestReady,
    /// ReadyForQuery, with the backend transaction state.
    ReadyForQuery { status: TransactionStatus },
    /// BackendKeyData, for out-of-band cancellation.
    BackendKeyData { pid: u32, secret_key: u32 },
    /// One server parameter (name, value) pair.
    ParameterStatus { name: String, value: String },
    /// Parameter type OIDs of a described statement.
    ParameterDescription { type_oids: Vec<Oid> },
    /// A new result-set shape was installed.
    RowDescription { columns: Vec<ColumnDescription> },
    /// One result row, shaped by the current row description.
    DataRow { cells: Vec<DataCell> },
    /// A command finished, with its tag.
    CommandComplete { tag: String },
    /// The query string was empty.
    EmptyQuery,
    /// The described statement or portal returns no rows.
    NoData,
    ParseComplete,
    BindComplete,
    CloseComplete,
    /// Execute hit its row limit; the portal can be re-executed.
    PortalSuspended,
    /// Server is ready to receive COPY data.
    CopyInResponse {
        format: FormatCode,
        column_formats: Vec<FormatCode>,
    },
    /// Server is about to send COPY data.
    CopyOutResponse {
        format: FormatCode,
        column_formats: Vec<FormatCode>,
    },
    /// Server is ready for bidirectional COPY.
    CopyBothResponse {
        format: FormatCode,
        column_formats: Vec<FormatCode>,
    },
    /// COPY data received from the server.
    CopyData { data: Vec<u8> },
    /// The server finished its COPY data stream.
    CopyDone,
    /// The client aborted a COPY transfer.
    CopyFail { message: String },
    /// Asynchronous LISTEN/NOTIFY notification.
    Notification {
        pid: u32,
        channel: String,
        payload: String,
    },
    /// Informational notice from the server.
    Notice { fields: NoticeFields },
    /// Error reported by the server. Not fatal to the session; the
    /// server follows up with ReadyForQuery in error state.
    Error { fields: NoticeFields },
    /// Result of a legacy function call.
    FunctionCallResponse { value: Option<Vec<u8>> },
}

impl Event {
    /// The registration tag for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::SendRequest { .. } => EventKind::SendRequest,
            Event::Authenticated => EventKind::Authenticated,
            Event::Password => EventKind::Password,
            Event::RequestReady => EventKind::RequestReady,
            Event::ReadyForQuery { .. } => EventKind::ReadyForQuery,
            Event::BackendKeyData { .. } => EventKind::BackendKeyData,
            Event::ParameterStatus { .. } => EventKind::ParameterStatus,
            Event::ParameterDescription { .. } => EventKind::ParameterDescription,
            Event::RowDescription { .. } => EventKind::RowDescription,
            Event::DataRow { .. } => EventKind::DataRow,
            Event::CommandComplete { .. } => EventKind::CommandComplete,
            Event::EmptyQuery => EventKind::EmptyQuery,
            Event::NoData => EventKind::NoData,
            Event::ParseComplete => EventKind::ParseComplete,
            Event::BindComplete => EventKind::BindComplete,
            Event::CloseComplete => EventKind::CloseComplete,
            Event::PortalSuspended => EventKind::PortalSuspended,
            Event::CopyInResponse { .. } => EventKind::CopyInResponse,
            Event::CopyOutResponse { .. } => EventKind::CopyOutResponse,
            Event::CopyBothResponse { .. } => EventKind::CopyBothResponse,
            Event::CopyData { .. } => EventKind::CopyData,
            Event::CopyDone => EventKind::CopyDone,
            Event::CopyFail { .. } => EventKind::CopyFail,
            Event::Notification { .. } => EventKind::Notification,
            Event::Notice { .. } => EventKind::Notice,
            Event::Error { .. } => EventKind::Error,
            Event::FunctionCallResponse { .. } => EventKind::FunctionCallResponse,
        }
    }

    /// The event's public name.
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }
}

/// Registration tag for each [`Event`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    SendRequest,
    Authenticated,
    Password,
    RequestReady,
    ReadyForQuery,
    BackendKeyData,
    ParameterStatus,
    ParameterDescription,
    RowDescription,
    DataRow,
    CommandComplete,
    EmptyQuery,
    NoData,
    ParseComplete,
    BindComplete,
    CloseComplete,
    PortalSuspended,
    CopyInResponse,
    CopyOutResponse,
    CopyBothResponse,
    CopyData,
    CopyDone,
    CopyFail,
    Notification,
    Notice,
    Error,
    FunctionCallResponse,
}

/// Static table of event names, the public contract of the event surface.
pub const EVENT_NAMES: &[(EventKind, &str)] = &[
    (EventKind::SendRequest, "send_request"),
    (EventKind::Authenticated, "authenticated"),
    (EventKind::Password, "password"),
    (EventKind::RequestReady, "request_ready"),
    (EventKind::ReadyForQuery, "ready_for_query"),
    (EventKind::BackendKeyData, "backendkeydata"),
    (EventKind::ParameterStatus, "parameter_status"),
    (EventKind::ParameterDescription, "parameter_description"),
    (EventKind::RowDescription, "row_description"),
    (EventKind::DataRow, "data_row"),
    (EventKind::CommandComplete, "command_complete"),
    (EventKind::EmptyQuery, "empty_query"),
    (EventKind::NoData, "no_data"),
    (EventKind::ParseComplete, "parse_complete"),
    (EventKind::BindComplete, "bind_complete"),
    (EventKind::CloseComplete, "close_complete"),
    (EventKind::PortalSuspended, "portal_suspended"),
    (EventKind::CopyInResponse, "copy_in_response"),
    (EventKind::CopyOutResponse, "copy_out_response"),
    (EventKind::CopyBothResponse, "copy_both_response"),
    (EventKind::CopyData, "copy_data"),
    (EventKind::CopyDone, "copy_done"),
    (EventKind::CopyFail, "copy_fail"),
    (EventKind::Notification, "notification"),
    (EventKind::Notice, "notice"),
    (EventKind::Error, "error"),
    (EventKind::FunctionCallResponse, "function_call_response"),
];

impl EventKind {
    /// The event's public name.
    pub fn name(self) -> &'static str {
        EVENT_NAMES
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, name)| *name)
            .unwrap_or("")
    }

    /// Look up an event kind by its public name.
    pub fn from_name(name: &str) -> Option<Self> {
        EVENT_NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(kind, _)| *kind)
    }
}

/// Registered event handler.
pub type EventHandler = Box<dyn FnMut(&Event)>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_bidirectional() {
        for (kind, name) in EVENT_NAMES {
            assert_eq!(kind.name(), *name);
            assert_eq!(EventKind::from_name(name), Some(*kind));
        }
    }

    #[test]
    fn test_event_kind_mapping() {
        let event = Event::CommandComplete {
            tag: "SELECT 1".into(),
        };
        assert_eq!(event.kind(), EventKind::CommandComplete);
        assert_eq!(event.name(), "command_complete");
    }
}
