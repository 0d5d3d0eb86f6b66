//! Single-pass decoder for the crypto footer layout.
//!
//! Field order is significant: every read and skip starts where the previous
//! one stopped, so the sequence below must follow the wire layout exactly.

use super::read::{read_array, read_le16, read_le32, read_le64, read_vec, skip};
use super::{
    CRYPT_MNT_MAGIC, CRYPT_TYPE_NAME_LEN, CryptFooter, DecodeLimits, EXPECTED_FOOTER_SIZE,
    KEY_TO_SALT_PADDING, PERSIST_AND_KDF_LEN, SALT_LEN, SPARE2_LEN, SUPPORTED_MAJOR_VERSION,
    ScryptParams, strip_trailing_nuls,
};
use crate::error::FooterError;
use std::io::Read;
use zeroize::Zeroizing;

/// Decodes a footer with the default [`DecodeLimits`].
///
/// The reader must be positioned at the first byte of the footer.
pub fn decode<R: Read + ?Sized>(reader: &mut R) -> Result<CryptFooter, FooterError> {
    decode_with_limits(reader, &DecodeLimits::default())
}

/// Decodes a footer, rejecting a declared key size above `limits`.
///
/// # Errors
///
/// - [`FooterError::InvalidMagic`] after reading only the 4 magic bytes
/// - [`FooterError::UnsupportedVersion`] if the major version is not 1
/// - [`FooterError::InvalidKeySize`] before any key byte is allocated
/// - [`FooterError::InvalidParameter`] for a scrypt exponent above 31
/// - [`FooterError::TruncatedInput`] if the source ends early
pub fn decode_with_limits<R: Read + ?Sized>(
    reader: &mut R,
    limits: &DecodeLimits,
) -> Result<CryptFooter, FooterError> {
    let magic = read_le32(reader, "magic")?;
    if magic != CRYPT_MNT_MAGIC {
        return Err(FooterError::InvalidMagic {
            expected: CRYPT_MNT_MAGIC,
            actual: magic,
        });
    }

    let major_version = read_le16(reader, "major_version")?;
    if major_version != SUPPORTED_MAJOR_VERSION {
        return Err(FooterError::UnsupportedVersion {
            expected: SUPPORTED_MAJOR_VERSION,
            actual: major_version,
        });
    }

    let minor_version = read_le16(reader, "minor_version")?;
    let ftr_size = read_le32(reader, "ftr_size")?;
    let flags = read_le32(reader, "flags")?;
    let keysize = read_le32(reader, "keysize")?;
    let spare1 = read_le32(reader, "spare1")?;
    let fs_size = read_le64(reader, "fs_size")?;
    let failed_decrypt_count = read_le32(reader, "failed_decrypt_count")?;

    let raw_name: [u8; CRYPT_TYPE_NAME_LEN] = read_array(reader, "crypt_type_name")?;
    let crypt_type_name = String::from_utf8_lossy(strip_trailing_nuls(&raw_name)).into_owned();

    skip(reader, SPARE2_LEN, "spare2")?;

    if keysize > limits.max_key_size() {
        return Err(FooterError::InvalidKeySize {
            keysize,
            max: limits.max_key_size(),
        });
    }
    let mut encrypted_master_key = Zeroizing::new(read_vec(
        reader,
        keysize as usize,
        "encrypted_master_key",
    )?);

    skip(reader, KEY_TO_SALT_PADDING, "key_to_salt_padding")?;
    let salt: Zeroizing<[u8; SALT_LEN]> = Zeroizing::new(read_array(reader, "salt")?);

    skip(reader, PERSIST_AND_KDF_LEN, "persist_data_and_kdf")?;
    let [log2_n] = read_array::<_, 1>(reader, "scrypt_N")?;
    let [log2_r] = read_array::<_, 1>(reader, "scrypt_r")?;
    let [log2_p] = read_array::<_, 1>(reader, "scrypt_p")?;
    let scrypt = ScryptParams::from_exponents(log2_n, log2_r, log2_p)?;

    if ftr_size != EXPECTED_FOOTER_SIZE {
        tracing::warn!(
            ftr_size,
            expected = EXPECTED_FOOTER_SIZE,
            "declared footer size differs from the nominal size"
        );
    }

    tracing::debug!(
        major_version,
        minor_version,
        keysize,
        crypt_type = %crypt_type_name,
        %scrypt,
        "decoded crypto footer"
    );

    Ok(CryptFooter {
        magic,
        major_version,
        minor_version,
        ftr_size,
        flags,
        keysize,
        spare1,
        fs_size,
        failed_decrypt_count,
        crypt_type_name,
        encrypted_master_key: std::mem::take(&mut *encrypted_master_key),
        salt: *salt,
        scrypt,
    })
}
