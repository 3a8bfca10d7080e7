//! # stegophoto
//!
//! A steganographic hide-and-seek engine for still images: embed an
//! encrypted payload inside a PNG or JPEG's least-significant image data
//! and recover it later, without any externally visible change to the
//! carrier's dimensions or apparent format.
//!
//! ## Quick start
//!
//! ```no_run
//! use stegophoto::{embed, extract, probe, EmbedOptions, key::MachineKeySource};
//!
//! let key_source = MachineKeySource;
//! embed(b"a secret message", "cover.png", "out.png", &key_source, EmbedOptions::default())?;
//! let header = probe("out.png")?.expect("just embedded, header must be present");
//! println!("recovered filename hint: {}", header.filename);
//! let payload = extract("out.png", &key_source)?;
//! assert_eq!(payload, b"a secret message");
//! # Ok::<(), stegophoto::error::Error>(())
//! ```
//!
//! ## Design
//!
//! The crate is a thin orchestration layer (`embed`/`extract`/`probe`)
//! over five independent components: a [`key::KeySource`] that supplies
//! the symmetric key, [`cipher`] (AES-256-CBC), [`header`] (the
//! fixed-size metadata block prefixing every payload), [`bitpack`] (the
//! shared bit-level packing primitives), and the two carriers in
//! [`container`] (PNG pixel LSBs, JPEG AC-coefficient LSBs). Each module
//! can be used standalone; the facade only wires them together in the
//! documented order.

pub mod bitpack;
pub mod cipher;
pub mod container;
pub mod error;
pub mod header;
mod io;
pub mod key;
mod utils;

use std::path::Path;

use container::{detect_extension, jpeg, png};
use error::Error;
use header::{ContainerExt, ContainerKind, Header, LsbMode};
use io::{read_file, write_file};
use key::KeySource;

const FILENAME_MAX: usize = 1023;

/// Tunable knobs for [`embed`]. Nothing is exposed yet beyond what
/// spec.md's three fixed operations already call for; the struct exists
/// so a future knob (e.g. a caller-supplied filename hint) extends this
/// by adding a field, not by breaking `embed`'s signature.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EmbedOptions {}

impl EmbedOptions {
    /// The current defaults — equivalent to `EmbedOptions::default()`.
    pub fn new() -> Self {
        Self {}
    }
}

fn basename_truncated(path: &Path) -> String {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("payload");
    name.chars().take(FILENAME_MAX).collect()
}

/// Embed `payload` into the image at `in_path`, writing the result to
/// `out_path`. The container format is inferred from `in_path`'s
/// extension (`.png`, `.jpg`/`.jpeg`); anything else is
/// [`Error::UnsupportedContainer`].
///
/// Mirrors §4.6's facade contract: fills a fresh [`Header`] (container
/// kind `Photo`, extension from the path, filename truncated to 1023
/// bytes), derives a key from `key_source`, encrypts the payload, then
/// delegates the mode selection and bit packing to the matching carrier.
/// `_options` is currently unused; it exists so new knobs don't require
/// breaking this signature.
pub fn embed<P: AsRef<Path>>(
    payload: &[u8],
    in_path: P,
    out_path: P,
    key_source: &dyn KeySource,
    _options: EmbedOptions,
) -> Result<(), Error> {
    let in_path = in_path.as_ref();
    let out_path = out_path.as_ref();
    let extension = detect_extension(in_path)?;
    let carrier_data = read_file(in_path)?;

    let key = key_source.derive_key();
    let ciphertext = cipher::encrypt(payload, &key)?;

    let header = Header {
        container_kind: ContainerKind::Photo,
        extension,
        write_size: 0,
        lsb_mode: LsbMode::OneBit,
        filename: basename_truncated(in_path),
    };

    let out_bytes = match extension {
        ContainerExt::Png => png::embed(&carrier_data, header, &ciphertext)?,
        ContainerExt::Jpeg => jpeg::embed(&carrier_data, header, &ciphertext)?,
    };

    write_file(out_path, &out_bytes)?;
    Ok(())
}

/// Extract and decrypt the payload embedded in the image at `in_path`.
pub fn extract<P: AsRef<Path>>(in_path: P, key_source: &dyn KeySource) -> Result<Vec<u8>, Error> {
    let in_path = in_path.as_ref();
    let extension = detect_extension(in_path)?;
    let carrier_data = read_file(in_path)?;

    let (header, ciphertext) = match extension {
        ContainerExt::Png => png::extract(&carrier_data)?,
        ContainerExt::Jpeg => jpeg::extract(&carrier_data)?,
    };
    if header.extension != extension {
        return Err(Error::InvalidHeader(
            "header's recorded extension does not match the file's actual extension".to_string(),
        ));
    }

    let key = key_source.derive_key();
    cipher::decrypt(&ciphertext, &key).map_err(Error::from)
}

/// Parse and return the header embedded in the image at `in_path`,
/// without decrypting or returning the payload itself.
///
/// Per §4.6, only the facade-level failures (unsupported extension,
/// unreadable file) propagate as [`Error`]; a readable image with no
/// valid embedded header quietly returns `Ok(None)` rather than an error
/// — there is no reliable way to tell "nothing embedded" from "corrupted
/// header" from the bit stream alone, and the caller shouldn't have to
/// care which one it was.
pub fn probe<P: AsRef<Path>>(in_path: P) -> Result<Option<Header>, Error> {
    let in_path = in_path.as_ref();
    let extension = detect_extension(in_path)?;
    let carrier_data = read_file(in_path)?;

    let result = match extension {
        ContainerExt::Png => png::probe(&carrier_data),
        ContainerExt::Jpeg => jpeg::probe(&carrier_data),
    };

    match result {
        Ok(header) => Ok(Some(header)),
        Err(Error::InvalidHeader(_)) | Err(Error::CapacityError) | Err(Error::DecodeImage(_)) => {
            Ok(None)
        }
        Err(other) => Err(other),
    }
}
