//! Android full-disk-encryption crypto footer (`struct crypt_mnt_ftr`).
//!
//! Wire layout, all integers little-endian:
//! ```text
//! MAGIC (4) | MAJOR (2) | MINOR (2) | FTR_SIZE (4) | FLAGS (4) | KEYSIZE (4) | SPARE1 (4)
//! | FS_SIZE (8) | FAILED_DECRYPT_COUNT (4) | CRYPT_TYPE_NAME (64) | SPARE2 (4)
//! | MASTER_KEY (KEYSIZE) | PADDING (32) | SALT (16) | PERSIST_DATA + KDF_TYPE (21)
//! | LOG2_N (1) | LOG2_R (1) | LOG2_P (1)
//! ```

use serde::{Serialize, Serializer};
use std::fmt;
use zeroize::Zeroize;

pub mod decode;
pub mod read;
pub mod scrypt;

pub use decode::{decode, decode_with_limits};
pub use scrypt::ScryptParams;

/// Magic value identifying a crypto footer.
pub const CRYPT_MNT_MAGIC: u32 = 0xD0B5B1C4;
/// The only major version this reader understands.
pub const SUPPORTED_MAJOR_VERSION: u16 = 1;
/// Nominal `sizeof(struct crypt_mnt_ftr)` for version 1.0 footers.
pub const EXPECTED_FOOTER_SIZE: u32 = 100;
/// Width of the NUL padded cipher specification field.
pub const CRYPT_TYPE_NAME_LEN: usize = 64;
/// Length of the scrypt salt.
pub const SALT_LEN: usize = 16;
/// Reserved bytes between the footer header and the master key.
pub const SPARE2_LEN: u64 = 4;
/// Reserved bytes between the master key and the salt.
pub const KEY_TO_SALT_PADDING: u64 = 32;
/// Persist data offsets (8 + 8), failure count (4) and KDF type (1).
pub const PERSIST_AND_KDF_LEN: u64 = 8 + 8 + 4 + 1;
/// Bytes of the layout that do not depend on `keysize`.
pub const FIXED_LAYOUT_LEN: u64 = 36
    + CRYPT_TYPE_NAME_LEN as u64
    + SPARE2_LEN
    + KEY_TO_SALT_PADDING
    + SALT_LEN as u64
    + PERSIST_AND_KDF_LEN
    + 3;

/// Capacity of the master key buffer in `crypt_mnt_ftr`.
pub const MAX_KEY_SIZE: u32 = 48;
/// Upper bound a caller may raise [`DecodeLimits::max_key_size`] to.
pub const HARD_MAX_KEY_SIZE: u32 = 4096;

/// Bounds applied to device-controlled lengths while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    max_key_size: u32,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_key_size: MAX_KEY_SIZE,
        }
    }
}

impl DecodeLimits {
    pub fn new(max_key_size: u32) -> anyhow::Result<Self> {
        let limits = Self { max_key_size };
        limits.validate()?;
        Ok(limits)
    }

    pub fn max_key_size(&self) -> u32 {
        self.max_key_size
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_key_size == 0 {
            anyhow::bail!("maximum key size must be >= 1");
        }
        if self.max_key_size > HARD_MAX_KEY_SIZE {
            anyhow::bail!("maximum key size must be <= {HARD_MAX_KEY_SIZE}");
        }
        Ok(())
    }
}

/// A decoded crypto footer.
///
/// Built once by [`decode`] and immutable afterwards. Key and salt bytes are
/// wiped when the value is dropped.
#[derive(Debug, Serialize)]
pub struct CryptFooter {
    magic: u32,
    major_version: u16,
    minor_version: u16,
    ftr_size: u32,
    flags: u32,
    keysize: u32,
    spare1: u32,
    fs_size: u64,
    failed_decrypt_count: u32,
    crypt_type_name: String,
    #[serde(serialize_with = "as_hex")]
    encrypted_master_key: Vec<u8>,
    #[serde(serialize_with = "as_hex")]
    salt: [u8; SALT_LEN],
    scrypt: ScryptParams,
}

impl Drop for CryptFooter {
    fn drop(&mut self) {
        self.encrypted_master_key.zeroize();
        self.salt.zeroize();
    }
}

impl CryptFooter {
    pub fn magic(&self) -> u32 {
        self.magic
    }

    pub fn major_version(&self) -> u16 {
        self.major_version
    }

    pub fn minor_version(&self) -> u16 {
        self.minor_version
    }

    /// Footer size as declared on disk. Not checked against the bytes consumed.
    pub fn ftr_size(&self) -> u32 {
        self.ftr_size
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }

    pub fn keysize(&self) -> u32 {
        self.keysize
    }

    pub fn spare1(&self) -> u32 {
        self.spare1
    }

    pub fn fs_size(&self) -> u64 {
        self.fs_size
    }

    pub fn failed_decrypt_count(&self) -> u32 {
        self.failed_decrypt_count
    }

    /// Cipher specification, e.g. `aes-cbc-essiv:sha256`, with trailing NULs removed.
    pub fn crypt_type_name(&self) -> &str {
        &self.crypt_type_name
    }

    pub fn encrypted_master_key(&self) -> &[u8] {
        &self.encrypted_master_key
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    pub fn scrypt(&self) -> &ScryptParams {
        &self.scrypt
    }

    pub fn scrypt_n(&self) -> u32 {
        self.scrypt.n()
    }

    pub fn scrypt_r(&self) -> u32 {
        self.scrypt.r()
    }

    pub fn scrypt_p(&self) -> u32 {
        self.scrypt.p()
    }

    /// Number of bytes the on-disk layout occupies for this footer.
    pub fn consumed_len(&self) -> u64 {
        FIXED_LAYOUT_LEN + u64::from(self.keysize)
    }
}

impl fmt::Display for CryptFooter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CryptFooter {{ magic=0x{:X}, major_version={}, minor_version={}, ftr_size={}, \
             flags=0x{:X}, keysize={}, spare1=0x{:X}, fs_size={}, failed_decrypt_count={}, \
             crypt_type_name=\"{}\", encrypted_master_key=0x{}, salt=0x{}, N={}, r={}, p={} }}",
            self.magic,
            self.major_version,
            self.minor_version,
            self.ftr_size,
            self.flags,
            self.keysize,
            self.spare1,
            self.fs_size,
            self.failed_decrypt_count,
            self.crypt_type_name,
            hex::encode(&self.encrypted_master_key),
            hex::encode(self.salt),
            self.scrypt.n(),
            self.scrypt.r(),
            self.scrypt.p(),
        )
    }
}

fn as_hex<T, S>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: AsRef<[u8]>,
    S: Serializer,
{
    serializer.serialize_str(&hex::encode(bytes))
}

/// Strip trailing NUL bytes only; any other trailing byte is kept.
fn strip_trailing_nuls(raw: &[u8]) -> &[u8] {
    let end = raw.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &raw[..end]
}


#[cfg(test)]
mod tests {
    use super::fixture::FooterImage;
    use super::*;
    use std::io::Cursor;

    #[test]
    fn fixed_layout_matches_field_widths() {
        assert_eq!(FIXED_LAYOUT_LEN, 176);
        let bytes = FooterImage::default().to_bytes();
        assert_eq!(bytes.len() as u64, FIXED_LAYOUT_LEN + 16);
    }

    #[test]
    fn strip_only_removes_trailing_nuls() {
        assert_eq!(strip_trailing_nuls(b"abc\0\0\0"), b"abc");
        assert_eq!(strip_trailing_nuls(b"a\0b\0"), b"a\0b");
        assert_eq!(strip_trailing_nuls(b"abc \n\0"), b"abc \n");
        assert_eq!(strip_trailing_nuls(&[0u8; 8]), b"");
    }

    #[test]
    fn display_renders_binary_fields_as_hex() {
        let image = FooterImage {
            key: vec![0xDE, 0xAD, 0xBE, 0xEF],
            keysize: 4,
            salt: [0x01; SALT_LEN],
            ..Default::default()
        };
        let footer = decode(&mut Cursor::new(image.to_bytes())).unwrap();
        let text = footer.to_string();

        assert!(text.starts_with("CryptFooter { magic=0xD0B5B1C4, major_version=1,"));
        assert!(text.contains("crypt_type_name=\"aes-cbc-essiv:sha256\""));
        assert!(text.contains("encrypted_master_key=0xdeadbeef"));
        assert!(text.contains(&format!("salt=0x{}", "01".repeat(16))));
        assert!(text.ends_with("N=16384, r=8, p=2 }"));
    }

    #[test]
    fn json_output_uses_hex_strings() {
        let footer = decode(&mut Cursor::new(FooterImage::default().to_bytes())).unwrap();
        let value = serde_json::to_value(&footer).unwrap();

        assert_eq!(value["magic"], CRYPT_MNT_MAGIC);
        assert_eq!(value["keysize"], 16);
        assert_eq!(value["encrypted_master_key"], "000102030405060708090a0b0c0d0e0f");
        assert_eq!(value["salt"], "a5".repeat(16));
        assert_eq!(value["scrypt"]["n"], 16384);
    }

    #[test]
    fn consumed_len_tracks_keysize() {
        let image = FooterImage {
            keysize: 32,
            key: vec![7; 32],
            ..Default::default()
        };
        let bytes = image.to_bytes();
        let footer = decode(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(footer.consumed_len(), bytes.len() as u64);
    }

    #[test]
    fn limits_validate_bounds() {
        assert_eq!(DecodeLimits::default().max_key_size(), MAX_KEY_SIZE);
        assert!(DecodeLimits::new(0).is_err());
        assert!(DecodeLimits::new(HARD_MAX_KEY_SIZE + 1).is_err());
        assert_eq!(DecodeLimits::new(64).unwrap().max_key_size(), 64);
    }
}
