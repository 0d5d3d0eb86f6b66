//! Footer sources: disk images, block devices and standalone metadata files.

use crate::footer::{self, CryptFooter, DecodeLimits};
use anyhow::{Context, Result, bail};
use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Size of the region reserved for the footer at the end of an encrypted partition.
pub const CRYPT_FOOTER_OFFSET: u64 = 0x4000;

/// Where in a source the footer starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FooterLocation {
    /// First byte of the file, as in a separate metadata partition.
    Start,
    /// An absolute byte offset.
    Offset(u64),
    /// The last 16 KiB of the device or image.
    #[default]
    EndOfDevice,
}

impl FromStr for FooterLocation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "start" => Ok(Self::Start),
            "end" => Ok(Self::EndOfDevice),
            other => {
                let offset = match other.strip_prefix("0x") {
                    Some(hex) => u64::from_str_radix(hex, 16),
                    None => other.parse(),
                }
                .with_context(|| format!("invalid footer location '{other}'"))?;
                Ok(Self::Offset(offset))
            }
        }
    }
}

/// A file or block device that may hold a crypto footer.
#[derive(Debug, Clone)]
pub struct FooterSource {
    path: PathBuf,
}

impl FooterSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens the source and decodes the footer at `location`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, is too small to hold a
    /// footer at the end, or the footer does not decode.
    pub fn read_footer(&self, location: FooterLocation, limits: &DecodeLimits) -> Result<CryptFooter> {
        let mut reader = self.open_at(location)?;
        let footer = footer::decode_with_limits(&mut reader, limits)
            .with_context(|| format!("failed to decode crypto footer in {}", self.path.display()))?;
        Ok(footer)
    }

    /// Like [`read_footer`](Self::read_footer), but a wrong magic value means
    /// "no footer here" and yields `Ok(None)`.
    pub fn probe(&self, location: FooterLocation, limits: &DecodeLimits) -> Result<Option<CryptFooter>> {
        let mut reader = self.open_at(location)?;
        match footer::decode_with_limits(&mut reader, limits) {
            Ok(footer) => Ok(Some(footer)),
            Err(e) if e.is_missing_footer() => {
                tracing::debug!(path = %self.path.display(), ?location, "no crypto footer: {e}");
                Ok(None)
            }
            Err(e) => Err(e).with_context(|| {
                format!("failed to decode crypto footer in {}", self.path.display())
            }),
        }
    }

    fn open_at(&self, location: FooterLocation) -> Result<BufReader<File>> {
        if !self.exists() {
            bail!("{} does not exist", self.path.display());
        }

        let mut file = File::open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;

        let offset = match location {
            FooterLocation::Start => 0,
            FooterLocation::Offset(offset) => offset,
            FooterLocation::EndOfDevice => {
                // block devices report a zero length through metadata
                let size = file.seek(SeekFrom::End(0))?;
                if size < CRYPT_FOOTER_OFFSET {
                    bail!(
                        "{} is only {size} bytes, too small to hold a crypto footer",
                        self.path.display()
                    );
                }
                size - CRYPT_FOOTER_OFFSET
            }
        };

        tracing::trace!(path = %self.path.display(), offset, "seeking to crypto footer");
        file.seek(SeekFrom::Start(offset))?;
        Ok(BufReader::new(file))
    }
}

/// Finds the footer for an encrypted partition.
///
/// The end of `device` is checked first. If no footer is there and a
/// separate `metadata` file is given, the footer is read from its start.
pub fn locate(
    device: &FooterSource,
    metadata: Option<&FooterSource>,
    limits: &DecodeLimits,
) -> Result<CryptFooter> {
    if let Some(footer) = device.probe(FooterLocation::EndOfDevice, limits)? {
        return Ok(footer);
    }

    match metadata {
        Some(meta) => {
            tracing::info!(
                device = %device.path().display(),
                metadata = %meta.path().display(),
                "no footer at end of device, reading metadata file"
            );
            meta.read_footer(FooterLocation::Start, limits)
        }
        None => bail!("no crypto footer found on {}", device.path().display()),
    }
}
