//! Reader for the crypto footer Android full-disk encryption stores at the end
//! of an encrypted partition.
//!
//! The footer carries what a later key-derivation step needs to unwrap the
//! master key: the encrypted key, its salt and the scrypt cost parameters.
//! This crate only reads and validates it.

mod error;
pub mod footer;
pub mod source;

pub use crate::error::FooterError;
pub use crate::footer::{
    CRYPT_MNT_MAGIC, CryptFooter, DecodeLimits, ScryptParams, decode, decode_with_limits,
};
pub use crate::source::{FooterLocation, FooterSource, locate};
