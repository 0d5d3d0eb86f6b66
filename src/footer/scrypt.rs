use crate::error::FooterError;
use serde::Serialize;
use std::fmt;

/// Largest exponent accepted for any scrypt parameter; `1 << 31` still fits a `u32`.
pub const MAX_SCRYPT_EXPONENT: u8 = 31;

/// scrypt cost parameters as stored in the footer.
///
/// On disk each parameter is a single byte exponent `e`; the value is `2^e`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScryptParams {
    n: u32,
    r: u32,
    p: u32,
}

impl ScryptParams {
    pub fn from_exponents(log2_n: u8, log2_r: u8, log2_p: u8) -> Result<Self, FooterError> {
        Ok(Self {
            n: expand("scrypt_N", log2_n)?,
            r: expand("scrypt_r", log2_r)?,
            p: expand("scrypt_p", log2_p)?,
        })
    }

    pub fn n(&self) -> u32 {
        self.n
    }

    pub fn r(&self) -> u32 {
        self.r
    }

    pub fn p(&self) -> u32 {
        self.p
    }

    pub fn log2_n(&self) -> u8 {
        self.n.trailing_zeros() as u8
    }
}

impl fmt::Display for ScryptParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N={} r={} p={}", self.n, self.r, self.p)
    }
}

fn expand(field: &'static str, exponent: u8) -> Result<u32, FooterError> {
    if exponent > MAX_SCRYPT_EXPONENT {
        return Err(FooterError::InvalidParameter {
            field,
            exponent,
            max: MAX_SCRYPT_EXPONENT,
        });
    }
    Ok(1u32 << exponent)
}
