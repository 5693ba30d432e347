//! A sans-I/O PostgreSQL wire protocol (v3.0) codec and session state
//! machine.
//!
//! # Features
//!
//! - **Sans-I/O**: the library never touches a socket. Outgoing frames
//!   are returned as byte vectors (and mirrored through the
//!   `send_request` event); incoming bytes are fed in by the embedder.
//! - **Incremental framing**: [`FrameBuffer`] accepts partial buffers
//!   and yields whole frames only when complete.
//! - **Typed events**: every decoded backend frame becomes one
//!   [`Event`] variant, dispatched to handlers registered per
//!   [`EventKind`] in strict wire order.
//! - **Authentication**: cleartext and MD5-salted passwords; the other
//!   server variants are recognized and reported as unsupported.
//!
//! # Example
//!
//! ```no_run
//! use sans_postgres::{EventKind, Session, SessionConfig};
//!
//! fn main() -> sans_postgres::Result<()> {
//!     let mut session = Session::new(SessionConfig {
//!         user: "postgres".into(),
//!         database: Some("mydb".into()),
//!         ..Default::default()
//!     });
//!
//!     session.attach_event(EventKind::DataRow, |event| {
//!         println!("row: {:?}", event);
//!     });
//!
//!     // Write this frame to your transport, then feed replies back in
//!     // with `session.receive(&bytes_read)`.
//!     let startup = session.initial_request()?;
//!     let _ = startup;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod event;
pub mod protocol;
pub mod session;
pub mod statement;

pub use error::{Error, NoticeFields, Result};
pub use event::{DataCell, Event, EventHandler, EventKind, EVENT_NAMES};
pub use protocol::backend::{BackendMessageKind, ColumnDescription};
pub use protocol::frontend::{FrontendMessage, TargetKind};
pub use protocol::types::{FormatCode, Oid, TransactionStatus};
pub use protocol::{message_length, FrameBuffer};
pub use session::{PasswordMode, Session, SessionConfig, SessionState};
pub use statement::Statement;
