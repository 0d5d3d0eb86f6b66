use std::io;
use thiserror::Error;

/// Reasons a crypto footer can fail to decode.
///
/// Every variant is terminal for the decode call that produced it.
#[derive(Debug, Error)]
pub enum FooterError {
    #[error("invalid magic value, expected 0x{expected:X}, got 0x{actual:X}")]
    InvalidMagic { expected: u32, actual: u32 },

    #[error("unsupported crypto footer major version, expected {expected}, got {actual}")]
    UnsupportedVersion { expected: u16, actual: u16 },

    #[error("crypto footer truncated while reading '{field}'")]
    TruncatedInput { field: &'static str },

    #[error("encrypted master key size {keysize} exceeds the maximum of {max} bytes")]
    InvalidKeySize { keysize: u32, max: u32 },

    #[error("{field} exponent {exponent} is out of range (max {max})")]
    InvalidParameter {
        field: &'static str,
        exponent: u8,
        max: u8,
    },

    #[error("i/o error while reading '{field}': {source}")]
    Io {
        field: &'static str,
        #[source]
        source: io::Error,
    },
}

impl FooterError {
    pub(crate) fn from_io(field: &'static str, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            FooterError::TruncatedInput { field }
        } else {
            FooterError::Io { field, source: err }
        }
    }

    /// Returns `true` when the bytes at the probed location are not a footer at all.
    pub fn is_missing_footer(&self) -> bool {
        matches!(self, FooterError::InvalidMagic { .. })
    }
}
