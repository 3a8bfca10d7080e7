//! Fixed-layout metadata header (component C3, the "metadata codec").
//!
//! The header is a self-describing, fixed-size, little-endian byte block
//! that prefixes every embedded payload. It is always exactly
//! [`HEADER_SIZE`] bytes and is always packed into the carrier at one bit
//! per host byte, regardless of the body's packing mode — see
//! `container::png` and `container::jpeg` for why that matters.

use binrw::{BinRead, BinWrite};
use std::io::Cursor;

use crate::error::Error;

/// Total on-wire size of a [`Header`], in bytes. Fixed forever; never vary
/// this at runtime.
pub const HEADER_SIZE: usize = 1048;

const FILENAME_SIZE: usize = 1024;

/// What kind of media the header describes. Only [`ContainerKind::Photo`]
/// is accepted by this crate today; the others are reserved so a future
/// container kind adds a dispatch arm here, not a new header layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Unknown = 0,
    Photo = 1,
    Video = 2,
    Audio = 3,
}

impl TryFrom<u8> for ContainerKind {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0 => Ok(ContainerKind::Unknown),
            1 => Ok(ContainerKind::Photo),
            2 => Ok(ContainerKind::Video),
            3 => Ok(ContainerKind::Audio),
            _ => Err(()),
        }
    }
}

/// Image container format recorded in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerExt {
    Jpeg = 0,
    Png = 1,
}

impl TryFrom<u8> for ContainerExt {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0 => Ok(ContainerExt::Jpeg),
            1 => Ok(ContainerExt::Png),
            _ => Err(()),
        }
    }
}

/// Packing density used for the payload body. The header itself is always
/// packed at `OneBit` regardless of this field's value — see §4.4/§4.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LsbMode {
    OneBit = 0,
    TwoBits = 1,
    NoUsed = 2,
}

impl TryFrom<u8> for LsbMode {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0 => Ok(LsbMode::OneBit),
            1 => Ok(LsbMode::TwoBits),
            2 => Ok(LsbMode::NoUsed),
            _ => Err(()),
        }
    }
}

/// Raw on-wire byte layout, little-endian, with no semantic validation.
/// [`Header::serialize`]/[`Header::parse`] layer validated enums and a
/// UTF-8 filename on top of this.
#[derive(Debug, BinRead, BinWrite)]
#[brw(little)]
struct RawHeader {
    container_kind: u8,
    extension: u8,
    _pad0: [u8; 6],
    write_size: u64,
    lsb_mode: u8,
    _pad1: [u8; 3],
    meta_size: u32,
    filename: [u8; FILENAME_SIZE],
}

/// The parsed, validated steganographic header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub container_kind: ContainerKind,
    pub extension: ContainerExt,
    pub write_size: u64,
    pub lsb_mode: LsbMode,
    pub filename: String,
}

impl Header {
    /// Serialize to the fixed [`HEADER_SIZE`]-byte wire layout.
    ///
    /// `filename` is truncated to at most `FILENAME_SIZE - 1` bytes on a
    /// UTF-8 char boundary (reserving the final byte for a guaranteed NUL
    /// terminator); bytes after the terminator are zero. Truncating on a
    /// raw byte offset could split a multi-byte codepoint and hand
    /// `Header::parse` invalid UTF-8.
    pub fn serialize(&self) -> [u8; HEADER_SIZE] {
        let mut filename = [0u8; FILENAME_SIZE];
        let name_bytes = self.filename.as_bytes();
        let mut copy_len = name_bytes.len().min(FILENAME_SIZE - 1);
        while copy_len > 0 && !self.filename.is_char_boundary(copy_len) {
            copy_len -= 1;
        }
        filename[..copy_len].copy_from_slice(&name_bytes[..copy_len]);

        let raw = RawHeader {
            container_kind: self.container_kind as u8,
            extension: self.extension as u8,
            _pad0: [0u8; 6],
            write_size: self.write_size,
            lsb_mode: self.lsb_mode as u8,
            _pad1: [0u8; 3],
            meta_size: HEADER_SIZE as u32,
            filename,
        };

        let mut buf = Vec::with_capacity(HEADER_SIZE);
        let mut cursor = Cursor::new(&mut buf);
        raw.write(&mut cursor)
            .expect("writing into an in-memory Vec cannot fail");

        let mut out = [0u8; HEADER_SIZE];
        out.copy_from_slice(&buf);
        out
    }

    /// Parse and validate a header from exactly [`HEADER_SIZE`] bytes.
    ///
    /// Validations run in order, matching §4.2: length, `meta_size`,
    /// `container_kind`, `extension`, `lsb_mode`, then `write_size`. The
    /// first failing check determines the error.
    pub fn parse(bytes: &[u8]) -> Result<Header, Error> {
        if bytes.len() != HEADER_SIZE {
            return Err(Error::InvalidHeader(format!(
                "expected {HEADER_SIZE} bytes, got {}",
                bytes.len()
            )));
        }

        let mut cursor = Cursor::new(bytes);
        let raw = RawHeader::read(&mut cursor)
            .map_err(|e| Error::InvalidHeader(format!("malformed header bytes: {e}")))?;

        if raw.meta_size as usize != HEADER_SIZE {
            return Err(Error::InvalidHeader(format!(
                "meta_size {} does not match header size {HEADER_SIZE}",
                raw.meta_size
            )));
        }

        let container_kind = ContainerKind::try_from(raw.container_kind)
            .map_err(|_| Error::InvalidHeader(format!("unknown container_kind {}", raw.container_kind)))?;
        if container_kind != ContainerKind::Photo {
            return Err(Error::InvalidHeader(
                "container_kind must be Photo".to_string(),
            ));
        }

        let extension = ContainerExt::try_from(raw.extension)
            .map_err(|_| Error::InvalidHeader(format!("unknown extension {}", raw.extension)))?;

        let lsb_mode = LsbMode::try_from(raw.lsb_mode)
            .map_err(|_| Error::InvalidHeader(format!("unknown lsb_mode {}", raw.lsb_mode)))?;

        if raw.write_size < HEADER_SIZE as u64 {
            return Err(Error::InvalidHeader(format!(
                "write_size {} is smaller than header size {HEADER_SIZE}",
                raw.write_size
            )));
        }

        let nul_pos = raw
            .filename
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(FILENAME_SIZE);
        let filename = String::from_utf8(raw.filename[..nul_pos].to_vec())
            .map_err(|e| Error::InvalidHeader(format!("filename is not valid UTF-8: {e}")))?;

        Ok(Header {
            container_kind,
            extension,
            write_size: raw.write_size,
            lsb_mode,
            filename,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> Header {
        Header {
            container_kind: ContainerKind::Photo,
            extension: ContainerExt::Png,
            write_size: HEADER_SIZE as u64 + 100,
            lsb_mode: LsbMode::OneBit,
            filename: "vacation.png".to_string(),
        }
    }

    #[test]
    fn serialize_has_fixed_size() {
        let bytes = sample_header().serialize();
        assert_eq!(bytes.len(), HEADER_SIZE);
    }

    #[test]
    fn parse_is_idempotent_with_serialize() {
        let header = sample_header();
        let bytes = header.serialize();
        let parsed = Header::parse(&bytes).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn parse_rejects_wrong_length() {
        let err = Header::parse(&[0u8; 10]).unwrap_err();
        assert!(matches!(err, Error::InvalidHeader(_)));
    }

    #[test]
    fn parse_rejects_garbage_with_overwhelming_probability() {
        // Scenario S6-adjacent: random bytes almost never parse as a valid
        // header because meta_size/container_kind/extension/lsb_mode pin
        // real entropy.
        let mut bytes = [0x41u8; HEADER_SIZE];
        bytes[0] = 7; // bogus container_kind
        assert!(matches!(Header::parse(&bytes), Err(Error::InvalidHeader(_))));
    }

    #[test]
    fn filename_is_nul_terminated_and_zero_padded() {
        let header = Header {
            filename: "a".repeat(2000),
            ..sample_header()
        };
        let bytes = header.serialize();
        let filename_region = &bytes[HEADER_SIZE - FILENAME_SIZE..];
        assert_eq!(filename_region[FILENAME_SIZE - 1], 0);
        let parsed = Header::parse(&bytes).unwrap();
        assert_eq!(parsed.filename.len(), FILENAME_SIZE - 1);
    }

    #[test]
    fn filename_truncation_lands_on_a_char_boundary() {
        // 1024 three-byte CJK characters is well past FILENAME_SIZE - 1;
        // a raw byte-offset cut would split the last codepoint.
        let header = Header {
            filename: "\u{6f22}".repeat(1024),
            ..sample_header()
        };
        let bytes = header.serialize();
        let parsed = Header::parse(&bytes).unwrap();
        assert!(parsed.filename.len() <= FILENAME_SIZE - 1);
        assert!(parsed.filename.chars().all(|c| c == '\u{6f22}'));
    }

    #[test]
    fn parse_rejects_meta_size_mismatch() {
        let header = sample_header();
        let mut bytes = header.serialize();
        // Corrupt meta_size (offset 16, little-endian u32) so it no longer
        // matches HEADER_SIZE.
        bytes[16] = 0xFF;
        assert!(matches!(Header::parse(&bytes), Err(Error::InvalidHeader(_))));
    }

    #[test]
    fn parse_rejects_write_size_smaller_than_header() {
        let mut header = sample_header();
        header.write_size = 10;
        let bytes = header.serialize();
        assert!(matches!(Header::parse(&bytes), Err(Error::InvalidHeader(_))));
    }
}
