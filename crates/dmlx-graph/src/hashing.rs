//! Content fingerprints for constant payloads and compiled descriptions.

use std::fmt;
use std::io;

use serde::Serialize;

const FNV1A_OFFSET: u64 = 0xcbf29ce484222325;
const FNV1A_PRIME: u64 = 0x100000001b3;

/// 64-bit FNV-1a digest. Serializes as the bare integer; displays as 16 hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Fingerprint(u64);

impl Fingerprint {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Fnv1a::default();
        hasher.update(bytes);
        hasher.finish()
    }

    /// Fingerprint of the compact JSON encoding, streamed without an intermediate buffer.
    pub fn of_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Self> {
        let mut hasher = Fnv1a::default();
        serde_json::to_writer(&mut hasher, value)?;
        Ok(hasher.finish())
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

struct Fnv1a(u64);

impl Default for Fnv1a {
    fn default() -> Self {
        Self(FNV1A_OFFSET)
    }
}

impl Fnv1a {
    fn update(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.0 ^= u64::from(*byte);
            self.0 = self.0.wrapping_mul(FNV1A_PRIME);
        }
    }

    fn finish(self) -> Fingerprint {
        Fingerprint(self.0)
    }
}

impl io::Write for Fnv1a {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.update(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_match_reference_vectors() {
        assert_eq!(Fingerprint::of_bytes(b"").value(), 0xcbf29ce484222325);
        assert_eq!(Fingerprint::of_bytes(b"a").value(), 0xaf63dc4c8601ec8c);
        assert_eq!(Fingerprint::of_bytes(b"a").to_string(), "af63dc4c8601ec8c");
    }

    #[test]
    fn streamed_json_matches_buffered_json() -> serde_json::Result<()> {
        let value = serde_json::json!({ "kind": "Gemm", "sizes": [1, 2, 3] });
        let buffered = serde_json::to_vec(&value)?;
        assert_eq!(Fingerprint::of_json(&value)?, Fingerprint::of_bytes(&buffered));
        Ok(())
    }
}
