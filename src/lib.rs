//! rc4lab - RC4 stream cipher and key-scheduling bias harness
//!
//! RC4 is broken as a cipher. This crate implements it for study: a working
//! encrypt/decrypt primitive plus a harness that samples the S-box during
//! key scheduling and keystream generation.
//!
//! ## Engine
//!
//! ```text
//! Key → KeyScheduler → PermutationState (+ Snapshot) → Keystream → XOR with message
//! ```
//!
//! - **KeyScheduler**: identity S-box, then `n` keyed swaps; records `S[k]`
//!   right after swap `k`
//! - **Keystream**: the PRGA, an endless iterator over values in `0..n`
//! - **StreamCipher**: reschedules on every call, so encrypting twice
//!   returns the original message
//!
//! ## Harness
//!
//! - **Randomness**: one random key, `count` keystream draws, counts per value
//! - **Swap persistence**: `count` random keys, counts per position of
//!   `S[idx] == snapshot[idx]` at the end of scheduling, compared against
//!   `(1 - 1/n)^(n - idx)`
//!
//! ## Example
//!
//! ```
//! use rc4lab::engine::crypt;
//!
//! let ciphertext = crypt(b"Key", 256, b"Plaintext").unwrap();
//! assert_eq!(hex::encode(&ciphertext), "bbf316e8d940af0ad3");
//! assert_eq!(crypt(b"Key", 256, &ciphertext).unwrap(), b"Plaintext");
//! ```

pub mod cli;
pub mod engine;
pub mod error;
pub mod harness;

pub use engine::{schedule, BoxSize, Key, Keystream, PermutationState, Snapshot, StreamCipher};
pub use error::{Rc4Error, Result};
pub use harness::{FrequencyTable, StatTester, TestKind, TrialCount};
