//! Error types for the steganographic codec.
//!
//! [`Error`] is the single failure type returned by every public operation
//! in this crate. Variants mirror the taxonomy a caller actually needs to
//! branch on: capacity, format, I/O, and cipher failures are distinguished
//! because callers handle each differently (retry with a bigger image,
//! reject the input outright, surface an I/O message, ask for the right
//! key).

use std::io;
use thiserror::Error;

/// Errors produced while embedding, extracting, or probing an image.
///
/// `probe` treats any variant at or below [`Error::InvalidHeader`] severity
/// as a plain "nothing embedded here" signal and converts it to `None`
/// rather than propagating it — see the facade documentation in `lib.rs`.
#[derive(Error, Debug)]
pub enum Error {
    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input path's extension is not one of `png`, `jpg`, `jpeg`.
    #[error("unsupported container extension")]
    UnsupportedContainer,

    /// The image codec rejected the input bytes.
    #[error("failed to decode image: {0}")]
    DecodeImage(String),

    /// The image codec rejected the bytes produced during re-encode.
    #[error("failed to encode image: {0}")]
    EncodeImage(String),

    /// The payload, plus header, does not fit even at the densest packing
    /// mode the carrier supports.
    #[error("payload does not fit in the carrier's capacity")]
    CapacityError,

    /// A parsed header failed one of the invariants in the metadata codec.
    #[error("invalid or missing steganographic header: {0}")]
    InvalidHeader(String),

    /// The symmetric cipher layer failed; see [`CipherError`] for which way.
    #[error("cipher error: {0}")]
    Cipher(#[from] CipherError),

    /// A bit-count invariant the codec itself is responsible for upholding
    /// did not hold. This indicates a defect in this crate, not a bad input
    /// — capacity problems are always reported as [`Error::CapacityError`]
    /// before any bit is written.
    #[error("internal invariant violated: {0}")]
    InternalBug(String),
}

/// Failure modes of the AES-256-CBC cipher layer (component C2).
#[derive(Error, Debug)]
pub enum CipherError {
    /// The key passed to `encrypt`/`decrypt` was not exactly 32 bytes.
    #[error("key must be exactly 32 bytes, got {0}")]
    BadKeyLength(usize),

    /// `encrypt` or `decrypt` was called with zero-length input.
    #[error("cipher input must not be empty")]
    Empty,

    /// PKCS#7 unpadding failed on decrypt — wrong key or corrupted/absent
    /// ciphertext.
    #[error("invalid PKCS#7 padding")]
    Padding,
}
