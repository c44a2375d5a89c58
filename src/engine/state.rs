use crate::error::{Rc4Error, Result};

/// Box size used by standard RC4: one byte's value range.
pub const DEFAULT_BOX_SIZE: usize = 256;

/// Size of the S-box. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoxSize(usize);

impl BoxSize {
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(Rc4Error::InvalidBoxSize(n));
        }
        Ok(Self(n))
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// True when every value of a box of this size fits in a byte.
    pub fn fits_byte(self) -> bool {
        self.0 <= DEFAULT_BOX_SIZE
    }
}

impl Default for BoxSize {
    fn default() -> Self {
        Self(DEFAULT_BOX_SIZE)
    }
}

impl TryFrom<usize> for BoxSize {
    type Error = Rc4Error;
    fn try_from(n: usize) -> Result<Self> {
        Self::new(n)
    }
}

impl std::fmt::Display for BoxSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// RC4 key: a non-empty byte sequence.
#[derive(Clone, PartialEq, Eq)]
pub struct Key(Vec<u8>);

impl Key {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(Rc4Error::InvalidKey);
        }
        Ok(Self(bytes))
    }

    /// Parse a key given as hex digits, e.g. `4b6579`.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s.trim()).map_err(|e| Rc4Error::InvalidKeyHex(e.to_string()))?;
        Self::new(bytes)
    }

    /// Caller guarantees `bytes` is non-empty.
    pub(crate) fn from_nonempty(bytes: Vec<u8>) -> Self {
        debug_assert!(!bytes.is_empty());
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Key byte used at scheduling iteration `k` (the key repeats cyclically).
    pub(crate) fn byte_at(&self, k: usize) -> u8 {
        self.0[k % self.0.len()]
    }
}

// Keys are secrets; never print their bytes.
impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Key({} bytes)", self.0.len())
    }
}

impl std::str::FromStr for Key {
    type Err = Rc4Error;
    fn from_str(s: &str) -> Result<Self> {
        Self::new(s.as_bytes())
    }
}

/// The RC4 S-box plus the generator's circular pointers `i` and `j`.
///
/// `s` is a permutation of `0..n` after every operation. Only the key
/// scheduler and the keystream generator mutate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutationState {
    pub(super) s: Vec<usize>,
    pub(super) i: usize,
    pub(super) j: usize,
}

impl PermutationState {
    /// Identity permutation `[0, 1, ..., n-1]` with both pointers at zero.
    pub fn identity(n: BoxSize) -> Self {
        Self {
            s: (0..n.get()).collect(),
            i: 0,
            j: 0,
        }
    }

    pub fn box_size(&self) -> usize {
        self.s.len()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.s
    }

    pub fn get(&self, idx: usize) -> usize {
        self.s[idx]
    }

    pub fn i(&self) -> usize {
        self.i
    }

    pub fn j(&self) -> usize {
        self.j
    }

    /// Check the bijection invariant: every value in `0..n` appears exactly once.
    pub fn is_permutation(&self) -> bool {
        let mut seen = vec![false; self.s.len()];
        for &value in &self.s {
            match seen.get_mut(value) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_size_rejects_zero() {
        assert!(matches!(BoxSize::new(0), Err(Rc4Error::InvalidBoxSize(0))));
        assert_eq!(BoxSize::new(8).unwrap().get(), 8);
        assert_eq!(BoxSize::default().get(), 256);
    }

    #[test]
    fn test_box_size_byte_range() {
        assert!(BoxSize::new(256).unwrap().fits_byte());
        assert!(BoxSize::new(1).unwrap().fits_byte());
        assert!(!BoxSize::new(257).unwrap().fits_byte());
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(Key::new(Vec::new()), Err(Rc4Error::InvalidKey)));
        assert!(matches!("".parse::<Key>(), Err(Rc4Error::InvalidKey)));
    }

    #[test]
    fn test_key_from_hex() {
        let key = Key::from_hex("4b6579").unwrap();
        assert_eq!(key.as_bytes(), b"Key");
        assert!(matches!(Key::from_hex("zz"), Err(Rc4Error::InvalidKeyHex(_))));
        assert!(matches!(Key::from_hex(""), Err(Rc4Error::InvalidKey)));
    }

    #[test]
    fn test_key_repeats_cyclically() {
        let key = Key::new(vec![1, 2, 3]).unwrap();
        let bytes: Vec<u8> = (0..7).map(|k| key.byte_at(k)).collect();
        assert_eq!(bytes, vec![1, 2, 3, 1, 2, 3, 1]);
    }

    #[test]
    fn test_key_debug_hides_bytes() {
        let key: Key = "hunter2".parse().unwrap();
        assert_eq!(format!("{:?}", key), "Key(7 bytes)");
    }

    #[test]
    fn test_identity_state() {
        let state = PermutationState::identity(BoxSize::new(5).unwrap());
        assert_eq!(state.as_slice(), &[0, 1, 2, 3, 4]);
        assert_eq!((state.i(), state.j()), (0, 0));
        assert!(state.is_permutation());
    }

    #[test]
    fn test_is_permutation_detects_duplicates() {
        let state = PermutationState {
            s: vec![0, 1, 1, 3],
            i: 0,
            j: 0,
        };
        assert!(!state.is_permutation());

        let out_of_range = PermutationState {
            s: vec![0, 4, 2, 3],
            i: 0,
            j: 0,
        };
        assert!(!out_of_range.is_permutation());
    }
}
