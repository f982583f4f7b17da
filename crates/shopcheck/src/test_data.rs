//! Throwaway identities for signup flows.

use chrono::Utc;
use uuid::Uuid;

const ALPHABET: &[u8; 62] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Random `[A-Za-z0-9]` string of `len` characters
#[must_use]
pub fn random_string(len: usize) -> String {
    let mut out = String::with_capacity(len);
    while out.len() < len {
        let id = Uuid::new_v4();
        // bytes 6 and 8 carry the fixed version and variant bits
        let random = id
            .as_bytes()
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 6 && *i != 8)
            .map(|(_, b)| char::from(ALPHABET[usize::from(*b) % ALPHABET.len()]));
        out.extend(random.take(len - out.len()));
    }
    out
}

/// `test_{8 chars}@{domain}`
#[must_use]
pub fn random_email(domain: &str) -> String {
    format!("test_{}@{domain}", random_string(8))
}

/// `{prefix}_{unix millis}_{4 chars}`, unique across parallel runs
#[must_use]
pub fn unique_name(prefix: &str) -> String {
    format!("{prefix}_{}_{}", Utc::now().timestamp_millis(), random_string(4))
}
