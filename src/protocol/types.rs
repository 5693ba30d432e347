//! Common PostgreSQL wire protocol types.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// PostgreSQL Object Identifier (OID)
pub type Oid = u32;

/// Wire format of a value: text or binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatCode {
    /// Human-readable text encoding.
    #[default]
    Text,
    /// Type-specific packed binary encoding.
    Binary,
}

impl FormatCode {
    /// Decode a wire format code; unrecognized values fall back to text.
    pub fn from_u16(code: u16) -> Self {
        if code == 1 {
            FormatCode::Binary
        } else {
            FormatCode::Text
        }
    }

    /// The on-wire format code.
    pub fn as_u16(self) -> u16 {
        match self {
            FormatCode::Text => 0,
            FormatCode::Binary => 1,
        }
    }
}

impl From<u16> for FormatCode {
    fn from(code: u16) -> Self {
        Self::from_u16(code)
    }
}

/// Backend transaction state reported by each ReadyForQuery message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionStatus {
    /// Not inside a transaction block.
    #[default]
    Idle,
    /// Inside an open transaction block.
    InTransaction,
    /// Inside a failed transaction block; writes are rejected until rollback.
    Failed,
}

impl TransactionStatus {
    /// Map a ReadyForQuery status byte (`I`/`T`/`E`).
    pub fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            b'I' => Self::Idle,
            b'T' => Self::InTransaction,
            b'E' => Self::Failed,
            _ => return None,
        })
    }

    /// The status byte this state is reported as.
    pub fn as_byte(self) -> u8 {
        match self {
            Self::Idle => b'I',
            Self::InTransaction => b'T',
            Self::Failed => b'E',
        }
    }

    /// True inside any transaction block, open or failed.
    pub fn in_transaction(self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// True once the transaction block has failed.
    pub fn is_failed(self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// Declare a fixed-width big-endian integer wrapper usable in zerocopy
/// views of wire data.
macro_rules! be_int {
    ($name:ident, $int:ty) => {
        #[doc = concat!("Big-endian `", stringify!($int), "` stored as raw wire bytes.")]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Default, FromBytes, IntoBytes, KnownLayout, Immutable,
        )]
        #[repr(transparent)]
        pub struct $name([u8; std::mem::size_of::<$int>()]);

        impl $name {
            #[doc = concat!("Wrap a native `", stringify!($int), "`.")]
            pub const fn new(value: $int) -> Self {
                Self(value.to_be_bytes())
            }

            #[doc = concat!("Unwrap to the native `", stringify!($int), "`.")]
            pub const fn get(self) -> $int {
                <$int>::from_be_bytes(self.0)
            }
        }

        impl From<$int> for $name {
            fn from(value: $int) -> Self {
                Self::new(value)
            }
        }

        impl From<$name> for $int {
            fn from(value: $name) -> $int {
                value.get()
            }
        }
    };
}

be_int!(I16BE, i16);
be_int!(U16BE, u16);
be_int!(I32BE, i32);
be_int!(U32BE, u32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_code_fallback() {
        assert_eq!(FormatCode::from_u16(0), FormatCode::Text);
        assert_eq!(FormatCode::from_u16(1), FormatCode::Binary);
        assert_eq!(FormatCode::from_u16(7), FormatCode::Text);
        assert_eq!(FormatCode::Binary.as_u16(), 1);
    }

    #[test]
    fn test_transaction_status_bytes() {
        for byte in [b'I', b'T', b'E'] {
            let status = TransactionStatus::from_byte(byte).unwrap();
            assert_eq!(status.as_byte(), byte);
        }
        assert_eq!(TransactionStatus::from_byte(b'X'), None);
        assert!(TransactionStatus::Failed.in_transaction());
        assert!(!TransactionStatus::Idle.in_transaction());
    }

    #[test]
    fn test_be_wrappers_round_trip() {
        assert_eq!(I16BE::new(-300).get(), -300);
        assert_eq!(U16BE::new(40_000).get(), 40_000);
        assert_eq!(I32BE::new(-70_000).get(), -70_000);
        assert_eq!(U32BE::new(0xdead_beef).get(), 0xdead_beef);
    }
}
