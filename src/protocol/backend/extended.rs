//! Extended query protocol backend messages.

use crate::error::Result;
use crate::protocol::codec::{read_nullable_bytes, read_u16, read_u32};
use crate::protocol::types::Oid;

/// ParseComplete message - statement parsing completed.
#[derive(Debug, Clone, Copy)]
pub struct ParseComplete;

impl ParseComplete {
    /// Parse a ParseComplete message from payload bytes.
    pub fn parse(_payload: &[u8]) -> Result<Self> {
        Ok(Self)
    }
}

/// BindComplete message - parameter binding completed.
#[derive(Debug, Clone, Copy)]
pub struct BindComplete;

impl BindComplete {
    /// Parse a BindComplete message from payload bytes.
    pub fn parse(_payload: &[u8]) -> Result<Self> {
        Ok(Self)
    }
}

/// CloseComplete message - statement/portal close completed.
#[derive(Debug, Clone, Copy)]
pub struct CloseComplete;

impl CloseComplete {
    /// Parse a CloseComplete message from payload bytes.
    pub fn parse(_payload: &[u8]) -> Result<Self> {
        Ok(Self)
    }
}

/// NoData message - query returns no data.
#[derive(Debug, Clone, Copy)]
pub struct NoData;

impl NoData {
    /// Parse a NoData message from payload bytes.
    pub fn parse(_payload: &[u8]) -> Result<Self> {
        Ok(Self)
    }
}

/// PortalSuspended message - row limit reached in Execute.
#[derive(Debug, Clone, Copy)]
pub struct PortalSuspended;

impl PortalSuspended {
    /// Parse a PortalSuspended message from payload bytes.
    pub fn parse(_payload: &[u8]) -> Result<Self> {
        Ok(Self)
    }
}

/// ParameterDescription message - describes parameters for a prepared statement.
#[derive(Debug, Clone)]
pub struct ParameterDescription {
    /// Parameter type OIDs
    param_oids: Vec<Oid>,
}

impl ParameterDescription {
    /// Parse a ParameterDescription message from payload bytes.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let (num_params, mut data) = read_u16(payload)?;

        let mut param_oids = Vec::with_capacity(num_params as usize);
        for _ in 0..num_params {
            let (oid, rest) = read_u32(data)?;
            param_oids.push(oid);
            data = rest;
        }

        Ok(Self { param_oids })
    }

    /// Get the number of parameters.
    pub fn len(&self) -> usize {
        self.param_oids.len()
    }

    /// Check if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.param_oids.is_empty()
    }

    /// Get parameter type OIDs.
    pub fn oids(&self) -> &[Oid] {
        &self.param_oids
    }

    /// Take the parameter type OIDs.
    pub fn into_oids(self) -> Vec<Oid> {
        self.param_oids
    }
}

/// FunctionCallResponse message - result of a legacy function call.
#[derive(Debug, Clone)]
pub struct FunctionCallResponse<'a> {
    /// Result value; `None` is SQL NULL.
    pub value: Option<&'a [u8]>,
}

impl<'a> FunctionCallResponse<'a> {
    /// Parse a FunctionCallResponse message from payload bytes.
    pub fn parse(payload: &'a [u8]) -> Result<Self> {
        let (value, _) = read_nullable_bytes(payload)?;
        Ok(Self { value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_description() {
        let payload = [0, 2, 0, 0, 0, 23, 0, 0, 0, 25];
        let desc = ParameterDescription::parse(&payload).unwrap();
        assert_eq!(desc.oids(), &[23, 25]);
    }

    #[test]
    fn test_function_call_response_null() {
        let payload = [0xff, 0xff, 0xff, 0xff];
        let resp = FunctionCallResponse::parse(&payload).unwrap();
        assert_eq!(resp.value, None);
    }

    #[test]
    fn test_function_call_response_value() {
        let payload = [0, 0, 0, 2, b'o', b'k'];
        let resp = FunctionCallResponse::parse(&payload).unwrap();
        assert_eq!(resp.value, Some(&b"ok"[..]));
    }
}
