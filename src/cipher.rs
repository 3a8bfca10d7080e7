//! AES-256-CBC symmetric cipher layer (component C2).
//!
//! A pure transform over `(key, data)` — no instance state, no caching.
//! This directly replaces the singleton `AES256Encryption::getInstance()`
//! pattern the codec was originally built around: every call takes its key
//! explicitly, and two calls never share state.
//!
//! Wire format: `IV (16 bytes) ‖ AES-256-CBC(PKCS#7-padded plaintext)`. No
//! authentication tag — a corrupted or tampered ciphertext is detected only
//! incidentally, by invalid padding or by the metadata codec rejecting the
//! decrypted header. See spec's design notes for why this is a documented
//! limitation rather than a bug.

use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::error::CipherError;

const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Encrypt `plaintext` under `key`, returning `IV ‖ ciphertext`.
///
/// Draws a fresh IV from the system's cryptographic RNG for every call.
pub fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, CipherError> {
    if key.len() != KEY_LEN {
        return Err(CipherError::BadKeyLength(key.len()));
    }
    if plaintext.is_empty() {
        return Err(CipherError::Empty);
    }

    let mut iv = [0u8; IV_LEN];
    getrandom::fill(&mut iv).expect("system RNG unavailable");

    let ciphertext = Aes256CbcEnc::new(key.into(), &iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut out = Vec::with_capacity(IV_LEN + ciphertext.len());
    out.extend_from_slice(&iv);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt a payload produced by [`encrypt`]: `IV ‖ ciphertext` under `key`.
pub fn decrypt(data: &[u8], key: &[u8]) -> Result<Vec<u8>, CipherError> {
    if key.len() != KEY_LEN {
        return Err(CipherError::BadKeyLength(key.len()));
    }
    if data.len() <= IV_LEN {
        return Err(CipherError::Empty);
    }

    let (iv, ciphertext) = data.split_at(IV_LEN);
    Aes256CbcDec::new(key.into(), iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CipherError::Padding)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> [u8; 32] {
        let mut k = [0u8; 32];
        for (i, b) in k.iter_mut().enumerate() {
            *b = i as u8;
        }
        k
    }

    #[test]
    fn round_trip() {
        let plaintext = b"the quick brown fox jumps over the lazy dog";
        let ciphertext = encrypt(plaintext, &key()).unwrap();
        let recovered = decrypt(&ciphertext, &key()).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn ciphertext_differs_each_call_due_to_random_iv() {
        let plaintext = b"same plaintext";
        let a = encrypt(plaintext, &key()).unwrap();
        let b = encrypt(plaintext, &key()).unwrap();
        assert_ne!(a, b);
        assert_eq!(decrypt(&a, &key()).unwrap(), plaintext);
        assert_eq!(decrypt(&b, &key()).unwrap(), plaintext);
    }

    #[test]
    fn rejects_bad_key_length() {
        let err = encrypt(b"data", &[0u8; 10]).unwrap_err();
        assert!(matches!(err, CipherError::BadKeyLength(10)));
    }

    #[test]
    fn rejects_empty_plaintext() {
        assert!(matches!(encrypt(b"", &key()), Err(CipherError::Empty)));
    }

    #[test]
    fn decrypt_rejects_wrong_key() {
        let ciphertext = encrypt(b"secret payload", &key()).unwrap();
        let mut wrong_key = key();
        wrong_key[0] ^= 0xFF;
        // Wrong key decrypts to garbage whose PKCS#7 padding is, with
        // overwhelming probability, invalid.
        assert!(matches!(
            decrypt(&ciphertext, &wrong_key),
            Err(CipherError::Padding)
        ));
    }

    #[test]
    fn decrypt_rejects_truncated_ciphertext() {
        assert!(matches!(decrypt(&[0u8; 8], &key()), Err(CipherError::Empty)));
    }
}
