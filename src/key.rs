//! Key Source (component C1, external collaborator).
//!
//! spec.md treats machine-identity key derivation as deliberately out of
//! scope — "the hard engineering" lives elsewhere. This module supplies a
//! usable default so the facade is runnable out of the box; anyone who
//! needs a different key source (a passphrase, a hardware token, a KMS
//! call) implements [`KeySource`] themselves and passes it to
//! [`crate::embed`]/[`crate::extract`].

use sha2::{Digest, Sha256};
use std::fs;

/// Produces the 32-byte symmetric key the cipher layer uses for every
/// call. Implementations are expected to be cheap to call repeatedly —
/// the facade does not cache the result.
pub trait KeySource {
    fn derive_key(&self) -> [u8; 32];
}

/// Default [`KeySource`]: derives a key from a stable machine identifier,
/// mirroring the fallback chain of the original author-key component
/// (stable machine ID → network MAC address → random, each hashed with
/// SHA-256) without reimplementing raw CPUID access, which spec.md
/// explicitly keeps out of scope.
#[derive(Debug, Default, Clone, Copy)]
pub struct MachineKeySource;

impl KeySource for MachineKeySource {
    fn derive_key(&self) -> [u8; 32] {
        let seed = machine_id()
            .or_else(first_mac_address)
            .unwrap_or_else(|| {
                #[cfg(feature = "log")]
                log::warn!("no stable machine identifier found, falling back to a random key seed");
                random_seed()
            });

        let mut hasher = Sha256::new();
        hasher.update(seed.as_bytes());
        let digest = hasher.finalize();
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        key
    }
}

fn machine_id() -> Option<String> {
    for path in ["/etc/machine-id", "/var/lib/dbus/machine-id"] {
        if let Ok(contents) = fs::read_to_string(path) {
            let trimmed = contents.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

fn first_mac_address() -> Option<String> {
    let entries = fs::read_dir("/sys/class/net").ok()?;
    for entry in entries.flatten() {
        let name = entry.file_name();
        if name == "lo" {
            continue;
        }
        let address_path = entry.path().join("address");
        if let Ok(addr) = fs::read_to_string(address_path) {
            let trimmed = addr.trim();
            if !trimmed.is_empty() && trimmed != "00:00:00:00:00:00" {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

fn random_seed() -> String {
    let mut bytes = [0u8; 16];
    getrandom::fill(&mut bytes).expect("system RNG unavailable");
    hex_encode(&bytes)
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
