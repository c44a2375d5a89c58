use super::keystream::Keystream;
use super::schedule::schedule;
use super::state::{BoxSize, Key};
use crate::error::{Rc4Error, Result};

/// RC4 stream cipher. Encryption and decryption are the same operation.
///
/// Every call re-runs the key schedule from scratch, so two calls with the
/// same input always produce the same output and `crypt(crypt(m)) == m`.
#[derive(Debug, Clone)]
pub struct StreamCipher {
    key: Key,
    box_size: BoxSize,
}

impl StreamCipher {
    /// The box size must be at most 256 so every keystream value is a byte.
    pub fn new(key: Key, box_size: BoxSize) -> Result<Self> {
        if !box_size.fits_byte() {
            return Err(Rc4Error::BoxSizeExceedsByte(box_size.get()));
        }
        Ok(Self { key, box_size })
    }

    /// Standard RC4 with a 256-entry box.
    pub fn with_key(key: Key) -> Self {
        Self {
            key,
            box_size: BoxSize::default(),
        }
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn box_size(&self) -> BoxSize {
        self.box_size
    }

    /// Fresh keystream from a new key schedule.
    pub fn keystream(&self) -> Keystream {
        let (state, _) = schedule(&self.key, self.box_size);
        Keystream::new(state)
    }

    pub fn crypt(&self, message: &[u8]) -> Vec<u8> {
        let mut out = message.to_vec();
        self.crypt_in_place(&mut out);
        out
    }

    pub fn crypt_in_place(&self, buf: &mut [u8]) {
        for (byte, k) in buf.iter_mut().zip(self.keystream()) {
            // k < box_size <= 256
            *byte ^= k as u8;
        }
    }
}

/// Encrypt or decrypt `message` under `key` with an S-box of size `n`.
///
/// Fails before touching any state if the key is empty or `n` is outside
/// `1..=256`.
pub fn crypt(key: &[u8], n: usize, message: &[u8]) -> Result<Vec<u8>> {
    let cipher = StreamCipher::new(Key::new(key)?, BoxSize::new(n)?)?;
    Ok(cipher.crypt(message))
}
