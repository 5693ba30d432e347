//! Query-result backend messages.

use crate::error::Result;
use crate::protocol::codec::{read_cstr, read_i16, read_i32, read_nullable_bytes, read_u16, read_u32};
use crate::protocol::types::{FormatCode, Oid};

/// One column record of a RowDescription, borrowed from the frame.
#[derive(Debug, Clone)]
pub struct FieldDescription<'a> {
    /// Column name.
    pub name: &'a str,
    /// OID of the source table, or 0 when not a plain column reference.
    pub table_oid: Oid,
    /// Attribute number within the source table, or 0.
    pub column_id: i16,
    /// OID of the column's data type.
    pub type_oid: Oid,
    /// Declared data size; negative means variable-length.
    pub type_size: i16,
    /// Type-specific modifier.
    pub type_modifier: i32,
    /// Format of the cell bytes (text or binary).
    pub format: FormatCode,
}

impl<'a> FieldDescription<'a> {
    /// Decode one field record, returning it with the remaining bytes.
    fn read(data: &'a [u8]) -> Result<(Self, &'a [u8])> {
        let (name, data) = read_cstr(data)?;
        let (table_oid, data) = read_u32(data)?;
        let (column_id, data) = read_i16(data)?;
        let (type_oid, data) = read_u32(data)?;
        let (type_size, data) = read_i16(data)?;
        let (type_modifier, data) = read_i32(data)?;
        let (format, data) = read_u16(data)?;

        let field = FieldDescription {
            name,
            table_oid,
            column_id,
            type_oid,
            type_size,
            type_modifier,
            format: FormatCode::from_u16(format),
        };
        Ok((field, data))
    }

    /// Owned copy for the session's row-description registry.
    pub fn to_column(&self) -> ColumnDescription {
        ColumnDescription {
            name: self.name.to_string(),
            table_oid: self.table_oid,
            column_id: self.column_id,
            type_oid: self.type_oid,
            type_size: self.type_size,
            type_modifier: self.type_modifier,
            format: self.format,
        }
    }
}

/// Owned column metadata, held by the session between RowDescription
/// frames and attached to every decoded data-row cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescription {
    /// Column name.
    pub name: String,
    /// OID of the source table, or 0 when not a plain column reference.
    pub table_oid: Oid,
    /// Attribute number within the source table, or 0.
    pub column_id: i16,
    /// OID of the column's data type.
    pub type_oid: Oid,
    /// Declared data size; negative means variable-length.
    pub type_size: i16,
    /// Type-specific modifier.
    pub type_modifier: i32,
    /// Format of the cell bytes (text or binary).
    pub format: FormatCode,
}

/// RowDescription message - the shape of the resultset that follows.
#[derive(Debug)]
pub struct RowDescription<'a> {
    fields: Vec<FieldDescription<'a>>,
}

impl<'a> RowDescription<'a> {
    /// Decode a RowDescription payload: an int16 field count followed
    /// by that many field records.
    pub fn parse(payload: &'a [u8]) -> Result<Self> {
        let (count, mut data) = read_u16(payload)?;

        let mut fields = Vec::with_capacity(count as usize);
        while fields.len() < count as usize {
            let (field, rest) = FieldDescription::read(data)?;
            fields.push(field);
            data = rest;
        }

        Ok(Self { fields })
    }

    /// Number of columns in the resultset.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True for a zero-column resultset.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The decoded field records.
    pub fn fields(&self) -> &[FieldDescription<'a>] {
        &self.fields
    }

    /// Owned copies of all field records.
    pub fn to_columns(&self) -> Vec<ColumnDescription> {
        self.fields.iter().map(FieldDescription::to_column).collect()
    }
}

/// DataRow message - one row of the current resultset.
#[derive(Debug)]
pub struct DataRow<'a> {
    values: Vec<Option<&'a [u8]>>,
}

impl<'a> DataRow<'a> {
    /// Decode a DataRow payload: an int16 cell count, then one
    /// length-prefixed block per cell (length 0xFFFFFFFF = SQL NULL,
    /// no bytes).
    ///
    /// Every declared cell must be present; a truncated payload is a
    /// protocol error.
    pub fn parse(payload: &'a [u8]) -> Result<Self> {
        let (count, mut data) = read_u16(payload)?;

        let mut values = Vec::with_capacity(count as usize);
        while values.len() < count as usize {
            let (value, rest) = read_nullable_bytes(data)?;
            values.push(value);
            data = rest;
        }

        Ok(Self { values })
    }

    /// Number of cells in the row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True for a zero-cell row.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cell values; `None` represents SQL NULL.
    pub fn values(&self) -> &[Option<&'a [u8]>] {
        &self.values
    }
}

/// Commands whose completion tag carries an affected-row count, with
/// the whitespace-separated word index of that count. INSERT's count
/// sits after its legacy OID word.
const ROW_COUNT_TAGS: &[(&str, usize)] = &[
    ("SELECT", 1),
    ("INSERT", 2),
    ("UPDATE", 1),
    ("DELETE", 1),
    ("COPY", 1),
    ("MOVE", 1),
    ("FETCH", 1),
];

/// CommandComplete message - one finished command and its tag.
#[derive(Debug, Clone, Copy)]
pub struct CommandComplete<'a> {
    /// Completion tag, e.g. "SELECT 5", "INSERT 0 1", "UPDATE 10".
    pub tag: &'a str,
}

impl<'a> CommandComplete<'a> {
    /// Decode a CommandComplete payload: the NUL-terminated tag.
    pub fn parse(payload: &'a [u8]) -> Result<Self> {
        let (tag, _) = read_cstr(payload)?;
        Ok(Self { tag })
    }

    /// The affected-row count from the command tag, for the commands
    /// that report one.
    pub fn rows_affected(&self) -> Option<u64> {
        let command = self.command()?;
        let (_, index) = ROW_COUNT_TAGS
            .iter()
            .find(|(name, _)| *name == command)?;
        self.tag.split_whitespace().nth(*index)?.parse().ok()
    }

    /// The leading command word of the tag.
    pub fn command(&self) -> Option<&str> {
        self.tag.split_whitespace().next()
    }
}

/// EmptyQueryResponse message - the query string was empty.
#[derive(Debug, Clone, Copy)]
pub struct EmptyQueryResponse;

impl EmptyQueryResponse {
    /// Decode an EmptyQueryResponse payload (always empty).
    pub fn parse(_payload: &[u8]) -> Result<Self> {
        Ok(Self)
    }
}
