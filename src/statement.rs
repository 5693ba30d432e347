//! Prepared statement façade.

use crate::error::Result;
use crate::protocol::backend::ColumnDescription;
use crate::session::Session;

/// Handle for a prepared statement.
///
/// Created by [`Session::prepare`], which emits the Parse message
/// immediately. The handle does not own any session state; every
/// operation takes the session it was prepared on. Bind and Execute use
/// the unnamed portal; a non-empty statement name persists server-side
/// until [`Statement::close`].
#[derive(Debug, Clone)]
pub struct Statement {
    name: String,
    sql: String,
}

impl Statement {
    pub(crate) fn new(name: &str, sql: &str) -> Self {
        Self {
            name: name.to_string(),
            sql: sql.to_string(),
        }
    }

    /// Wire statement name (empty = unnamed).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The SQL text this statement was prepared from.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Bind parameter values to the unnamed portal.
    /// `None` cells are SQL NULL; all values use the text format.
    pub fn bind(&self, session: &mut Session, parameters: &[Option<&[u8]>]) -> Result<Vec<u8>> {
        session.statement_bind(&self.name, parameters)
    }

    /// Ask the server to describe this statement. The resulting row
    /// description is remembered by the session and reinstalled on
    /// every [`Statement::execute`].
    pub fn describe(&self, session: &mut Session) -> Result<Vec<u8>> {
        session.statement_describe(&self.name)
    }

    /// Execute the unnamed portal with no row limit.
    pub fn execute(&self, session: &mut Session) -> Result<Vec<u8>> {
        session.statement_execute(&self.name, 0)
    }

    /// Execute the unnamed portal, returning at most `max_rows` rows
    /// before the portal suspends (0 = unlimited).
    pub fn execute_limit(&self, session: &mut Session, max_rows: u32) -> Result<Vec<u8>> {
        session.statement_execute(&self.name, max_rows)
    }

    /// End the extended-query sequence with a Sync.
    pub fn finish(&self, session: &mut Session) -> Result<Vec<u8>> {
        session.sync()
    }

    /// Close the statement server-side and drop its remembered
    /// description.
    pub fn close(&self, session: &mut Session) -> Result<Vec<u8>> {
        session.statement_close(&self.name)
    }

    /// The row description remembered from the last Describe, if any.
    pub fn row_description<'a>(&self, session: &'a Session) -> Option<&'a [ColumnDescription]> {
        session.statement_description(&self.name)
    }
}
