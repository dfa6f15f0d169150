use crate::errors::CacheError;

/// Width, in bytes, of a normalized sub-key.
pub const SUB_KEY_LEN: usize = 32;

/// A fixed-width identifier of an item within a bulk.
///
/// See [`normalize`] for the padding/truncation/random-generation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubKey(pub [u8; SUB_KEY_LEN]);

impl SubKey {
    #[must_use]
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(SUB_KEY_LEN * 2);
        for b in &self.0 {
            out.push_str(&format!("{b:02x}"));
        }
        out
    }
}

impl std::fmt::Display for SubKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Normalizes a caller-supplied sub-key:
///
/// - empty input generates a random 32-byte key from the OS CSPRNG
/// - longer input is truncated to 32 bytes
/// - shorter input is right-padded with zero bytes to 32 bytes
///
/// # Errors
/// Returns [`CacheError::RandomSource`] if the OS random source cannot be
/// read. On error, no key is returned and the caller should not mutate
/// any state.
pub fn normalize(input: &[u8]) -> Result<SubKey, CacheError> {
    if input.is_empty() {
        return random_sub_key();
    }
    let mut buf = [0u8; SUB_KEY_LEN];
    let copy_len = input.len().min(SUB_KEY_LEN);
    buf[..copy_len].copy_from_slice(&input[..copy_len]);
    Ok(SubKey(buf))
}

fn random_sub_key() -> Result<SubKey, CacheError> {
    let mut buf = [0u8; SUB_KEY_LEN];
    getrandom::fill(&mut buf).map_err(|e| CacheError::RandomSource(e.to_string()))?;
    Ok(SubKey(buf))
}
