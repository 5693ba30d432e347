//! Session state machine over the sans-I/O codec.
//!
//! A [`Session`] owns the protocol state for one connection: the
//! message counter (the first outgoing frame is untyped), the
//! authentication flag and negotiated password mode, the backend
//! transaction state, the current row description, and the event
//! handler table. It performs no I/O: outgoing frames are returned to
//! the caller (and surfaced through the `send_request` event), and
//! received bytes are fed in through [`Session::receive`] or
//! [`Session::handle_message`].

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::event::{DataCell, Event, EventHandler, EventKind};
use crate::protocol::backend::{
    AuthenticationRequest, BackendKeyData, BackendMessageKind, ColumnDescription, CommandComplete,
    CopyBothResponse, CopyData, CopyInResponse, CopyOutResponse, DataRow, ErrorResponse,
    FunctionCallResponse, NoticeResponse, NotificationResponse, ParameterDescription,
    ParameterStatus, ReadyForQuery, RowDescription,
};
use crate::protocol::copy::encode_text_row;
use crate::protocol::frontend::{self, FrontendMessage, TargetKind};
use crate::protocol::types::TransactionStatus;
use crate::protocol::FrameBuffer;
use crate::statement::Statement;

/// Connection parameters used by the startup message and MD5 salting.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Database user name (required).
    pub user: String,
    /// Database name; the server defaults it to the user name.
    pub database: Option<String>,
    /// Command-line options forwarded to the server.
    pub options: Option<String>,
}

/// Top-level session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No frame sent yet.
    Handshake,
    /// StartupMessage sent; authentication exchange in progress.
    AuthPending,
    /// AuthenticationOk received; waiting for the first ReadyForQuery.
    Authenticated,
    /// Idle between queries.
    Ready,
    /// A query round trip is in flight.
    Busy,
    /// Server accepted a COPY FROM STDIN transfer.
    CopyIn,
    /// Server is streaming a COPY TO STDOUT transfer.
    CopyOut,
    /// Terminate was sent; the session is finished.
    Terminated,
}

/// Password mode negotiated during authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PasswordMode {
    /// No password request received yet.
    #[default]
    Unset,
    /// Server asked for a cleartext password.
    Cleartext,
    /// Server asked for an MD5-salted password.
    Md5 { salt: [u8; 4] },
}

/// Sans-I/O protocol session.
pub struct Session {
    config: SessionConfig,
    state: SessionState,
    message_count: u64,
    authenticated: bool,
    password_mode: PasswordMode,
    backend_key: Option<BackendKeyData>,
    transaction_status: TransactionStatus,
    row_description: Option<Vec<ColumnDescription>>,
    statement_descriptions: HashMap<String, Vec<ColumnDescription>>,
    pending_describe: Option<String>,
    handlers: HashMap<EventKind, EventHandler>,
    recv: FrameBuffer,
}

impl Session {
    /// Create a new session.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: SessionState::Handshake,
            message_count: 0,
            authenticated: false,
            password_mode: PasswordMode::default(),
            backend_key: None,
            transaction_status: TransactionStatus::Idle,
            row_description: None,
            statement_descriptions: HashMap::new(),
            pending_describe: None,
            handlers: HashMap::new(),
            recv: FrameBuffer::new(),
        }
    }

    /// Register a handler for one event kind, replacing any previous one.
    pub fn attach_event<F>(&mut self, kind: EventKind, handler: F)
    where
        F: FnMut(&Event) + 'static,
    {
        self.handlers.insert(kind, Box::new(handler));
    }

    /// Current top-level state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True once AuthenticationOk has been received.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Negotiated password mode.
    pub fn password_mode(&self) -> PasswordMode {
        self.password_mode
    }

    /// Latest backend transaction state.
    pub fn backend_state(&self) -> TransactionStatus {
        self.transaction_status
    }

    /// The pid/secret pair for out-of-band cancellation, once received.
    pub fn backend_key(&self) -> Option<&BackendKeyData> {
        self.backend_key.as_ref()
    }

    /// Column metadata of the current resultset.
    pub fn row_description(&self) -> Option<&[ColumnDescription]> {
        self.row_description.as_deref()
    }

    /// Number of frames built so far.
    pub fn message_count(&self) -> u64 {
        self.message_count
    }

    // ---- outgoing ----------------------------------------------------

    /// Build the StartupMessage from the session config.
    ///
    /// Fails unless it is the first frame of the session.
    pub fn initial_request(&mut self) -> Result<Vec<u8>> {
        let user = self.config.user.clone();
        let database = self.config.database.clone();
        let options = self.config.options.clone();
        self.send_message(FrontendMessage::Startup {
            user: &user,
            database: database.as_deref(),
            options: options.as_deref(),
        })
    }

    /// Build one outgoing frame from the closed message dispatch.
    ///
    /// On success the frame bytes are returned and also delivered
    /// through the `send_request` event, and the message counter is
    /// incremented.
    pub fn send_message(&mut self, message: FrontendMessage<'_>) -> Result<Vec<u8>> {
        if self.state == SessionState::Terminated {
            return Err(Error::InvalidUsage("session is terminated".into()));
        }

        let mut buf = Vec::new();
        let mut copy_fail_message = None;

        match message {
            FrontendMessage::Startup {
                user,
                database,
                options,
            } => {
                if self.message_count != 0 {
                    return Err(Error::Protocol(
                        "StartupMessage must be the first frame".into(),
                    ));
                }
                frontend::write_startup(&mut buf, user, database, options);
                self.state = SessionState::AuthPending;
            }
            FrontendMessage::Query { sql } => {
                frontend::write_query(&mut buf, sql);
                self.state = SessionState::Busy;
            }
            FrontendMessage::Parse { statement, sql } => {
                if sql.is_empty() {
                    return Err(Error::InvalidUsage("Parse requires a SQL string".into()));
                }
                frontend::write_parse(&mut buf, statement, sql);
                self.state = SessionState::Busy;
            }
            FrontendMessage::Bind {
                portal,
                statement,
                parameters,
            } => {
                frontend::write_bind(&mut buf, portal, statement, parameters);
                self.state = SessionState::Busy;
            }
            FrontendMessage::Describe(TargetKind::Statement(name)) => {
                frontend::write_describe_statement(&mut buf, name);
            }
            FrontendMessage::Describe(TargetKind::Portal(name)) => {
                frontend::write_describe_portal(&mut buf, name);
            }
            FrontendMessage::Execute { portal, max_rows } => {
                frontend::write_execute(&mut buf, portal, max_rows);
                self.state = SessionState::Busy;
            }
            FrontendMessage::Close(TargetKind::Statement(name)) => {
                frontend::write_close_statement(&mut buf, name);
            }
            FrontendMessage::Close(TargetKind::Portal(name)) => {
                frontend::write_close_portal(&mut buf, name);
            }
            FrontendMessage::Password { password } => {
                let value = match self.password_mode {
                    PasswordMode::Md5 { salt } => {
                        frontend::md5_password(&self.config.user, password, &salt)
                    }
                    PasswordMode::Cleartext | PasswordMode::Unset => password.to_string(),
                };
                frontend::write_password(&mut buf, &value);
            }
            FrontendMessage::CopyData { data } => {
                frontend::write_copy_data(&mut buf, data);
            }
            FrontendMessage::CopyDone => {
                frontend::write_copy_done(&mut buf);
                if self.state == SessionState::CopyIn {
                    self.state = SessionState::Busy;
                }
            }
            FrontendMessage::CopyFail { message } => {
                frontend::write_copy_fail(&mut buf, message);
                if self.state == SessionState::CopyIn {
                    self.state = SessionState::Busy;
                }
                copy_fail_message = Some(message.to_string());
            }
            FrontendMessage::Sync => frontend::write_sync(&mut buf),
            FrontendMessage::Flush => frontend::write_flush(&mut buf),
            FrontendMessage::Terminate => {
                frontend::write_terminate(&mut buf);
                self.state = SessionState::Terminated;
            }
        }

        let data = self.finish_send(buf);
        if let Some(message) = copy_fail_message {
            self.emit(&Event::CopyFail { message });
        }
        Ok(data)
    }

    /// Issue a simple query.
    ///
    /// Refused while the backend transaction state is `error`.
    pub fn simple_query(&mut self, sql: &str) -> Result<Vec<u8>> {
        self.ensure_writable()?;
        self.send_message(FrontendMessage::Query { sql })
    }

    /// Prepare an unnamed statement. Emits Parse immediately.
    pub fn prepare(&mut self, sql: &str) -> Result<Statement> {
        self.prepare_named("", sql)
    }

    /// Prepare a named statement. Emits Parse immediately; the name
    /// persists server-side until explicitly closed.
    pub fn prepare_named(&mut self, name: &str, sql: &str) -> Result<Statement> {
        self.ensure_writable()?;
        let statement = Statement::new(name, sql);
        self.send_message(FrontendMessage::Parse {
            statement: statement.name(),
            sql,
        })?;
        Ok(statement)
    }

    /// Build a PasswordMessage. In md5 mode the salted hash is derived
    /// from the session's user name and the server-provided salt.
    pub fn password_message(&mut self, password: &str) -> Result<Vec<u8>> {
        self.send_message(FrontendMessage::Password { password })
    }

    /// Send raw COPY data. Only valid during a COPY-IN transfer.
    pub fn copy_data(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        self.ensure_copy_in()?;
        self.send_message(FrontendMessage::CopyData { data })
    }

    /// Encode one row of cells in COPY text format and send it.
    /// `None` cells become SQL NULL (`\N`).
    pub fn send_copy_data(&mut self, cells: &[Option<&[u8]>]) -> Result<Vec<u8>> {
        self.ensure_copy_in()?;
        let mut row = Vec::new();
        encode_text_row(&mut row, cells);
        self.send_message(FrontendMessage::CopyData { data: &row })
    }

    /// Finish the client side of a COPY-IN transfer.
    pub fn copy_done(&mut self) -> Result<Vec<u8>> {
        self.ensure_copy_in()?;
        self.send_message(FrontendMessage::CopyDone)
    }

    /// Abort a COPY-IN transfer with an error message.
    pub fn copy_fail(&mut self, message: &str) -> Result<Vec<u8>> {
        self.ensure_copy_in()?;
        self.send_message(FrontendMessage::CopyFail { message })
    }

    /// End an extended-query sequence.
    pub fn sync(&mut self) -> Result<Vec<u8>> {
        self.send_message(FrontendMessage::Sync)
    }

    /// Ask the server to flush pending responses.
    pub fn flush(&mut self) -> Result<Vec<u8>> {
        self.send_message(FrontendMessage::Flush)
    }

    /// Close the session cleanly.
    pub fn terminate(&mut self) -> Result<Vec<u8>> {
        self.send_message(FrontendMessage::Terminate)
    }

    // ---- incoming ----------------------------------------------------

    /// Feed raw received bytes into the session's buffer and handle
    /// every complete frame in order. Partial tails are kept until more
    /// bytes arrive. Returns the number of frames handled.
    pub fn receive(&mut self, bytes: &[u8]) -> Result<usize> {
        self.recv.extend(bytes);
        let mut handled = 0;
        while let Some(frame) = self.recv.take_frame()? {
            self.handle_message(&frame)?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Decode one complete frame (type byte + length + payload) and
    /// fire the matching events before returning.
    pub fn handle_message(&mut self, frame: &[u8]) -> Result<()> {
        if frame.len() < 5 {
            return Err(Error::Protocol(format!(
                "frame too short: {} bytes",
                frame.len()
            )));
        }
        let type_byte = frame[0];
        let declared = i32::from_be_bytes([frame[1], frame[2], frame[3], frame[4]]);
        if declared < 4 {
            return Err(Error::Protocol(format!("invalid frame length {declared}")));
        }
        let total = 1 + declared as usize;
        if frame.len() < total {
            return Err(Error::Protocol(format!(
                "incomplete frame: {} < {} bytes",
                frame.len(),
                total
            )));
        }
        let payload = &frame[5..total];

        let kind = BackendMessageKind::from_code(type_byte).ok_or_else(|| {
            Error::Protocol(format!(
                "unknown backend message type byte 0x{type_byte:02x}"
            ))
        })?;

        #[cfg(feature = "log-verbose")]
        log::trace!("(B){}", kind.name());

        match kind {
            BackendMessageKind::AuthenticationRequest => self.on_authentication(payload),
            BackendMessageKind::BackendKeyData => self.on_backend_key_data(payload),
            BackendMessageKind::ParameterStatus => self.on_parameter_status(payload),
            BackendMessageKind::ReadyForQuery => self.on_ready_for_query(payload),
            BackendMessageKind::RowDescription => self.on_row_description(payload),
            BackendMessageKind::DataRow => self.on_data_row(payload),
            BackendMessageKind::CommandComplete => self.on_command_complete(payload),
            BackendMessageKind::EmptyQueryResponse => self.on_empty_query(payload),
            BackendMessageKind::ErrorResponse => self.on_error_response(payload),
            BackendMessageKind::NoticeResponse => self.on_notice_response(payload),
            BackendMessageKind::NotificationResponse => self.on_notification(payload),
            BackendMessageKind::ParseComplete => {
                self.emit(&Event::ParseComplete);
                Ok(())
            }
            BackendMessageKind::BindComplete => {
                self.emit(&Event::BindComplete);
                Ok(())
            }
            BackendMessageKind::CloseComplete => {
                self.emit(&Event::CloseComplete);
                Ok(())
            }
            BackendMessageKind::ParameterDescription => self.on_parameter_description(payload),
            BackendMessageKind::NoData => self.on_no_data(payload),
            BackendMessageKind::PortalSuspended => {
                self.emit(&Event::PortalSuspended);
                Ok(())
            }
            BackendMessageKind::CopyInResponse => self.on_copy_in_response(payload),
            BackendMessageKind::CopyOutResponse => self.on_copy_out_response(payload),
            BackendMessageKind::CopyBothResponse => self.on_copy_both_response(payload),
            BackendMessageKind::CopyData => self.on_copy_data(payload),
            BackendMessageKind::CopyDone => self.on_copy_done(payload),
            BackendMessageKind::FunctionCallResponse => self.on_function_call_response(payload),
        }
    }

    // ---- decode handlers ---------------------------------------------

    fn on_authentication(&mut self, payload: &[u8]) -> Result<()> {
        let request = AuthenticationRequest::parse(payload)?;

        match request {
            AuthenticationRequest::Ok => {
                self.authenticated = true;
                self.state = SessionState::Authenticated;
                self.emit(&Event::Authenticated);
                self.emit(&Event::RequestReady);
                Ok(())
            }
            AuthenticationRequest::CleartextPassword => {
                self.password_mode = PasswordMode::Cleartext;
                self.emit(&Event::Password);
                Ok(())
            }
            AuthenticationRequest::Md5Password { salt } => {
                self.password_mode = PasswordMode::Md5 { salt };
                self.emit(&Event::Password);
                Ok(())
            }
            other => Err(Error::Unsupported(format!(
                "unsupported authentication method: {}",
                other.method_name()
            ))),
        }
    }

    fn on_backend_key_data(&mut self, payload: &[u8]) -> Result<()> {
        let key = BackendKeyData::parse(payload)?;
        let (pid, secret_key) = (key.process_id(), key.secret());
        self.backend_key = Some(*key);
        self.emit(&Event::BackendKeyData { pid, secret_key });
        Ok(())
    }

    fn on_parameter_status(&mut self, payload: &[u8]) -> Result<()> {
        let status = ParameterStatus::parse(payload)?;
        let event = Event::ParameterStatus {
            name: status.name.to_string(),
            value: status.value.to_string(),
        };
        self.emit(&event);
        Ok(())
    }

    fn on_ready_for_query(&mut self, payload: &[u8]) -> Result<()> {
        let ready = ReadyForQuery::parse(payload)?;
        let status = ready.transaction_status()?;
        self.transaction_status = status;
        self.state = SessionState::Ready;
        self.emit(&Event::ReadyForQuery { status });
        Ok(())
    }

    fn on_row_description(&mut self, payload: &[u8]) -> Result<()> {
        let desc = RowDescription::parse(payload)?;
        let columns = desc.to_columns();

        if let Some(statement) = self.pending_describe.take() {
            self.statement_descriptions
                .insert(statement, columns.clone());
        }
        self.row_description = Some(columns.clone());
        self.emit(&Event::RowDescription { columns });
        Ok(())
    }

    fn on_data_row(&mut self, payload: &[u8]) -> Result<()> {
        let row = DataRow::parse(payload)?;
        let columns = self.row_description.as_ref().ok_or_else(|| {
            Error::Protocol("DataRow received without a row description".into())
        })?;
        if row.len() != columns.len() {
            return Err(Error::Protocol(format!(
                "DataRow has {} columns, row description has {}",
                row.len(),
                columns.len()
            )));
        }

        let cells: Vec<DataCell> = row
            .values()
            .iter()
            .zip(columns.iter())
            .map(|(value, description)| DataCell {
                description: description.clone(),
                value: value.map(|bytes| bytes.to_vec()),
            })
            .collect();
        self.emit(&Event::DataRow { cells });
        Ok(())
    }

    fn on_command_complete(&mut self, payload: &[u8]) -> Result<()> {
        let complete = CommandComplete::parse(payload)?;
        let event = Event::CommandComplete {
            tag: complete.tag.to_string(),
        };
        self.emit(&event);
        Ok(())
    }

    fn on_empty_query(&mut self, payload: &[u8]) -> Result<()> {
        crate::protocol::backend::EmptyQueryResponse::parse(payload)?;
        self.emit(&Event::EmptyQuery);
        self.emit(&Event::ReadyForQuery {
            status: self.transaction_status,
        });
        Ok(())
    }

    fn on_error_response(&mut self, payload: &[u8]) -> Result<()> {
        let error = ErrorResponse::parse(payload)?;
        #[cfg(feature = "log")]
        log::error!("{}", error.fields());
        self.emit(&Event::Error { fields: error.0 });
        Ok(())
    }

    fn on_notice_response(&mut self, payload: &[u8]) -> Result<()> {
        let notice = NoticeResponse::parse(payload)?;
        #[cfg(feature = "log")]
        log::warn!("{}", notice.fields());
        self.emit(&Event::Notice { fields: notice.0 });
        Ok(())
    }

    fn on_notification(&mut self, payload: &[u8]) -> Result<()> {
        let notification = NotificationResponse::parse(payload)?;
        let event = Event::Notification {
            pid: notification.pid,
            channel: notification.channel.to_string(),
            payload: notification.payload.to_string(),
        };
        self.emit(&event);
        Ok(())
    }

    fn on_parameter_description(&mut self, payload: &[u8]) -> Result<()> {
        let desc = ParameterDescription::parse(payload)?;
        self.emit(&Event::ParameterDescription {
            type_oids: desc.into_oids(),
        });
        Ok(())
    }

    fn on_no_data(&mut self, payload: &[u8]) -> Result<()> {
        crate::protocol::backend::NoData::parse(payload)?;
        if let Some(statement) = self.pending_describe.take() {
            self.statement_descriptions.remove(&statement);
        }
        self.emit(&Event::NoData);
        Ok(())
    }

    fn on_copy_in_response(&mut self, payload: &[u8]) -> Result<()> {
        let response = CopyInResponse::parse(payload)?;
        self.state = SessionState::CopyIn;
        self.emit(&Event::CopyInResponse {
            format: response.format,
            column_formats: response.column_formats,
        });
        Ok(())
    }

    fn on_copy_out_response(&mut self, payload: &[u8]) -> Result<()> {
        let response = CopyOutResponse::parse(payload)?;
        self.state = SessionState::CopyOut;
        self.emit(&Event::CopyOutResponse {
            format: response.format,
            column_formats: response.column_formats,
        });
        Ok(())
    }

    fn on_copy_both_response(&mut self, payload: &[u8]) -> Result<()> {
        let response = CopyBothResponse::parse(payload)?;
        self.emit(&Event::CopyBothResponse {
            format: response.format,
            column_formats: response.column_formats,
        });
        Ok(())
    }

    fn on_copy_data(&mut self, payload: &[u8]) -> Result<()> {
        let data = CopyData::parse(payload)?;
        let event = Event::CopyData {
            data: data.data.to_vec(),
        };
        self.emit(&event);
        Ok(())
    }

    fn on_copy_done(&mut self, payload: &[u8]) -> Result<()> {
        crate::protocol::backend::CopyDone::parse(payload)?;
        if self.state == SessionState::CopyOut {
            self.state = SessionState::Busy;
        }
        self.emit(&Event::CopyDone);
        Ok(())
    }

    fn on_function_call_response(&mut self, payload: &[u8]) -> Result<()> {
        let response = FunctionCallResponse::parse(payload)?;
        let event = Event::FunctionCallResponse {
            value: response.value.map(|bytes| bytes.to_vec()),
        };
        self.emit(&event);
        Ok(())
    }

    // ---- statement support -------------------------------------------

    pub(crate) fn statement_bind(
        &mut self,
        statement: &str,
        parameters: &[Option<&[u8]>],
    ) -> Result<Vec<u8>> {
        self.ensure_writable()?;
        self.send_message(FrontendMessage::Bind {
            portal: "",
            statement,
            parameters,
        })
    }

    pub(crate) fn statement_describe(&mut self, statement: &str) -> Result<Vec<u8>> {
        let data = self.send_message(FrontendMessage::Describe(TargetKind::Statement(statement)))?;
        self.pending_describe = Some(statement.to_string());
        Ok(data)
    }

    pub(crate) fn statement_execute(&mut self, statement: &str, max_rows: u32) -> Result<Vec<u8>> {
        self.ensure_writable()?;
        if let Some(columns) = self.statement_descriptions.get(statement) {
            self.row_description = Some(columns.clone());
        }
        self.send_message(FrontendMessage::Execute {
            portal: "",
            max_rows,
        })
    }

    pub(crate) fn statement_close(&mut self, statement: &str) -> Result<Vec<u8>> {
        self.statement_descriptions.remove(statement);
        self.send_message(FrontendMessage::Close(TargetKind::Statement(statement)))
    }

    /// Row description remembered for a statement by a Describe round trip.
    pub fn statement_description(&self, statement: &str) -> Option<&[ColumnDescription]> {
        self.statement_descriptions
            .get(statement)
            .map(|columns| columns.as_slice())
    }

    // ---- internals ---------------------------------------------------

    fn finish_send(&mut self, frame: Vec<u8>) -> Vec<u8> {
        self.message_count += 1;
        #[cfg(feature = "log-verbose")]
        log::trace!("(F){} bytes", frame.len());
        if self.handlers.contains_key(&EventKind::SendRequest) {
            self.emit(&Event::SendRequest {
                data: frame.clone(),
            });
        }
        frame
    }

    fn emit(&mut self, event: &Event) {
        if let Some(handler) = self.handlers.get_mut(&event.kind()) {
            handler(event);
        }
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.transaction_status.is_failed() {
            return Err(Error::InvalidUsage("invalid backend state".into()));
        }
        Ok(())
    }

    fn ensure_copy_in(&self) -> Result<()> {
        if self.state != SessionState::CopyIn {
            return Err(Error::InvalidUsage(
                "no COPY-IN transfer in progress".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(SessionConfig {
            user: "alice".into(),
            database: Some("db".into()),
            options: None,
        })
    }

    #[test]
    fn test_startup_must_be_first() {
        let mut session = session();
        let frame = session.initial_request().unwrap();
        // Untyped frame: self-inclusive length, then protocol version.
        assert_eq!(
            i32::from_be_bytes([frame[0], frame[1], frame[2], frame[3]]) as usize,
            frame.len()
        );
        assert_eq!(session.message_count(), 1);

        assert!(matches!(
            session.initial_request(),
            Err(Error::Protocol(_))
        ));
    }

    #[test]
    fn test_message_counter_increments() {
        let mut session = session();
        session.initial_request().unwrap();
        session.sync().unwrap();
        session.flush().unwrap();
        assert_eq!(session.message_count(), 3);
    }

    #[test]
    fn test_md5_password_uses_salt_and_user() {
        let mut session = session();
        // AuthenticationMD5Password with salt 01 02 03 04.
        session
            .handle_message(&[b'R', 0, 0, 0, 12, 0, 0, 0, 5, 1, 2, 3, 4])
            .unwrap();
        assert_eq!(
            session.password_mode(),
            PasswordMode::Md5 {
                salt: [1, 2, 3, 4]
            }
        );

        let frame = session.password_message("secret").unwrap();
        assert_eq!(frame[0], b'p');
        // "md5" + 32 hex digits + NUL
        assert_eq!(frame.len(), 5 + 36);
        assert_eq!(&frame[5..8], b"md5");
        assert_eq!(
            &frame[5..frame.len() - 1],
            frontend::md5_password("alice", "secret", &[1, 2, 3, 4]).as_bytes()
        );
    }

    #[test]
    fn test_unsupported_auth_method() {
        let mut session = session();
        // Kerberos V5
        let err = session
            .handle_message(&[b'R', 0, 0, 0, 8, 0, 0, 0, 2])
            .unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
    }

    #[test]
    fn test_unknown_type_byte_is_fatal() {
        let mut session = session();
        let err = session.handle_message(&[b'v', 0, 0, 0, 4]).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn test_error_state_rejects_queries() {
        let mut session = session();
        session.handle_message(b"Z\x00\x00\x00\x05E").unwrap();
        assert!(session.backend_state().is_failed());

        let err = session.simple_query("select 1").unwrap_err();
        assert!(matches!(err, Error::InvalidUsage(_)));

        // Sync remains available to clear the failed transaction.
        session.sync().unwrap();
        session.handle_message(b"Z\x00\x00\x00\x05I").unwrap();
        assert!(session.simple_query("select 1").is_ok());
    }

    #[test]
    fn test_copy_data_requires_copy_in() {
        let mut session = session();
        assert!(matches!(
            session.copy_data(b"x"),
            Err(Error::InvalidUsage(_))
        ));

        // CopyInResponse: text format, 1 column, text.
        session
            .handle_message(&[b'G', 0, 0, 0, 9, 0, 0, 1, 0, 0])
            .unwrap();
        assert_eq!(session.state(), SessionState::CopyIn);
        assert!(session.copy_data(b"x").is_ok());
        session.copy_done().unwrap();
        assert_eq!(session.state(), SessionState::Busy);
    }

    #[test]
    fn test_terminated_session_rejects_sends() {
        let mut session = session();
        session.terminate().unwrap();
        assert!(matches!(
            session.sync(),
            Err(Error::InvalidUsage(_))
        ));
    }

    #[test]
    fn test_empty_parse_rejected() {
        let mut session = session();
        assert!(matches!(
            session.prepare(""),
            Err(Error::InvalidUsage(_))
        ));
    }
}
