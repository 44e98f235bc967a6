//! Process random pool that accepts supplementary entropy.
//!
//! Architecture:
//! 1. Initial 64-byte state from SHA-512 over OS random bytes (or a fixed seed)
//! 2. `add_entropy` folds caller bytes into the state with SHA-512
//! 3. Output blocks are SHA-256(state ‖ counter ‖ fresh OS bytes)
//! 4. The state is re-keyed after every block
//! 5. Thread-safe for concurrent access
//!
//! Supplementary entropy can only help: the OS source is mixed into every
//! block, so a weak or attacker-chosen `add_entropy` input never makes the
//! output weaker than the OS generator alone.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use sha2::{Digest, Sha256, Sha512};
use zeroize::Zeroizing;

use crate::error::Result;
use crate::sink::EntropySink;

/// Internal state size.
pub const STATE_LEN: usize = 64;

/// Inputs longer than this are reduced with SHA-512 before mixing.
const MAX_DIRECT_INPUT: usize = 64;

/// Fresh OS bytes mixed into each output block.
const OS_BYTES_PER_BLOCK: usize = 32;

type State = Zeroizing<[u8; STATE_LEN]>;

/// Thread-safe random generator with an entropy-addition interface.
pub struct CryptoRandom {
    state: Mutex<State>,
    counter: Mutex<u64>,
    output_bytes: Mutex<u64>,
    entropy_additions: Mutex<u64>,
    deterministic: bool,
}

impl CryptoRandom {
    /// Create a pool seeded from the operating system.
    pub fn new() -> Result<Self> {
        let mut os_random = Zeroizing::new([0u8; STATE_LEN]);
        getrandom::fill(os_random.as_mut_slice())?;
        log::debug!("random pool seeded from OS entropy");
        Ok(Self::from_state(sha512(&[os_random.as_slice()]), false))
    }

    /// Create a pool whose output depends only on `seed` and later
    /// `add_entropy` calls. No OS bytes are mixed in. For tests and
    /// reproducible tooling only.
    pub fn with_seed(seed: &[u8]) -> Self {
        Self::from_state(sha512(&[seed]), true)
    }

    fn from_state(state: State, deterministic: bool) -> Self {
        Self {
            state: Mutex::new(state),
            counter: Mutex::new(0),
            output_bytes: Mutex::new(0),
            entropy_additions: Mutex::new(0),
            deterministic,
        }
    }

    /// Whether OS bytes are left out of output blocks.
    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    /// Return `n_bytes` of output. `0` yields an empty vector.
    pub fn get_random_bytes(&self, n_bytes: usize) -> Result<Vec<u8>> {
        let mut output = vec![0u8; n_bytes];
        self.fill_bytes(&mut output)?;
        Ok(output)
    }

    /// Fill `buf` with output.
    pub fn fill_bytes(&self, buf: &mut [u8]) -> Result<()> {
        for chunk in buf.chunks_mut(32) {
            let block = self.next_block()?;
            chunk.copy_from_slice(&block[..chunk.len()]);
        }
        *lock(&self.output_bytes) += buf.len() as u64;
        Ok(())
    }

    fn next_block(&self) -> Result<Zeroizing<[u8; 32]>> {
        let cnt = {
            let mut counter = lock(&self.counter);
            *counter += 1;
            *counter
        };

        let mut os_random = Zeroizing::new([0u8; OS_BYTES_PER_BLOCK]);
        if !self.deterministic {
            getrandom::fill(os_random.as_mut_slice())?;
        }

        let mut state = lock(&self.state);
        let mut h = Sha256::new();
        h.update(state.as_slice());
        h.update(cnt.to_le_bytes());
        h.update(os_random.as_slice());
        let block = Zeroizing::new(<[u8; 32]>::from(h.finalize()));

        *state = sha512(&[state.as_slice(), block.as_slice()]);
        Ok(block)
    }

    /// Counters describing pool usage.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            output_bytes: *lock(&self.output_bytes),
            entropy_additions: *lock(&self.entropy_additions),
            generated_blocks: *lock(&self.counter),
            deterministic: self.deterministic,
        }
    }
}

impl EntropySink for CryptoRandom {
    /// Fold `data` into the pool state. Empty input is ignored.
    fn add_entropy(&self, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        let reduced;
        let data = if data.len() > MAX_DIRECT_INPUT {
            reduced = sha512(&[data]);
            reduced.as_slice()
        } else {
            data
        };

        let mut state = lock(&self.state);
        *state = sha512(&[state.as_slice(), data]);
        drop(state);

        let mut additions = lock(&self.entropy_additions);
        *additions += 1;
        log::debug!("random pool re-keyed ({} entropy additions)", *additions);
    }
}

impl std::fmt::Debug for CryptoRandom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoRandom")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

/// Usage counters for a [`CryptoRandom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Total bytes handed out.
    pub output_bytes: u64,
    /// Number of non-empty `add_entropy` calls.
    pub entropy_additions: u64,
    /// Number of 32-byte blocks generated.
    pub generated_blocks: u64,
    pub deterministic: bool,
}

/// SHA-512 over the concatenation of `parts`.
fn sha512(parts: &[&[u8]]) -> State {
    let mut h = Sha512::new();
    for part in parts {
        h.update(part);
    }
    let mut out = Zeroizing::new([0u8; STATE_LEN]);
    out.copy_from_slice(&h.finalize());
    out
}

/// A panic while holding a lock leaves counters and state intact, so a
/// poisoned mutex is still usable.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    // -----------------------------------------------------------------------
    // Output shape
    // -----------------------------------------------------------------------

    #[test]
    fn test_various_sizes() {
        let rng = CryptoRandom::with_seed(b"test");
        for size in [0, 1, 16, 31, 32, 33, 64, 100, 256] {
            let bytes = rng.get_random_bytes(size).unwrap();
            assert_eq!(bytes.len(), size, "Expected {size} bytes");
        }
    }

    #[test]
    fn test_zero_bytes_generates_nothing() {
        let rng = CryptoRandom::with_seed(b"test");
        assert!(rng.get_random_bytes(0).unwrap().is_empty());
        assert_eq!(rng.stats().generated_blocks, 0);
    }

    #[test]
    fn test_os_seeded_pool_produces_output() {
        let rng = CryptoRandom::new().unwrap();
        assert!(!rng.is_deterministic());
        let a = rng.get_random_bytes(32).unwrap();
        let b = rng.get_random_bytes(32).unwrap();
        assert_ne!(a, b);
    }

    // -----------------------------------------------------------------------
    // Determinism / seed tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_same_seed_same_stream() {
        let a = CryptoRandom::with_seed(b"seed");
        let b = CryptoRandom::with_seed(b"seed");
        assert_eq!(a.get_random_bytes(100).unwrap(), b.get_random_bytes(100).unwrap());
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = CryptoRandom::with_seed(b"seed_a");
        let b = CryptoRandom::with_seed(b"seed_b");
        assert_ne!(a.get_random_bytes(32).unwrap(), b.get_random_bytes(32).unwrap());
    }

    #[test]
    fn test_consecutive_calls_differ() {
        let rng = CryptoRandom::with_seed(b"seed");
        assert_ne!(rng.get_random_bytes(32).unwrap(), rng.get_random_bytes(32).unwrap());
    }

    #[test]
    fn test_split_requests_match_one_request_per_block() {
        let a = CryptoRandom::with_seed(b"seed");
        let b = CryptoRandom::with_seed(b"seed");
        let whole = a.get_random_bytes(64).unwrap();
        let mut parts = b.get_random_bytes(32).unwrap();
        parts.extend(b.get_random_bytes(32).unwrap());
        assert_eq!(whole, parts);
    }

    // -----------------------------------------------------------------------
    // Entropy additions
    // -----------------------------------------------------------------------

    #[test]
    fn test_add_entropy_changes_stream() {
        let a = CryptoRandom::with_seed(b"seed");
        let b = CryptoRandom::with_seed(b"seed");
        b.add_entropy(&[7u8; 32]);
        assert_ne!(a.get_random_bytes(32).unwrap(), b.get_random_bytes(32).unwrap());
    }

    #[test]
    fn test_empty_entropy_ignored() {
        let a = CryptoRandom::with_seed(b"seed");
        let b = CryptoRandom::with_seed(b"seed");
        b.add_entropy(&[]);
        assert_eq!(b.stats().entropy_additions, 0);
        assert_eq!(a.get_random_bytes(32).unwrap(), b.get_random_bytes(32).unwrap());
    }

    #[test]
    fn test_long_input_is_reduced_first() {
        let long = vec![0x5au8; 200];
        let a = CryptoRandom::with_seed(b"seed");
        let b = CryptoRandom::with_seed(b"seed");
        a.add_entropy(&long);
        b.add_entropy(sha512(&[long.as_slice()]).as_slice());
        assert_eq!(a.get_random_bytes(32).unwrap(), b.get_random_bytes(32).unwrap());
    }

    #[test]
    fn test_usable_as_dyn_sink() {
        let rng = CryptoRandom::with_seed(b"seed");
        let sink: &dyn EntropySink = &rng;
        sink.add_entropy(b"digest");
        assert_eq!(rng.stats().entropy_additions, 1);
    }

    // -----------------------------------------------------------------------
    // Stats and concurrency
    // -----------------------------------------------------------------------

    #[test]
    fn test_stats_track_usage() {
        let rng = CryptoRandom::with_seed(b"seed");
        rng.get_random_bytes(40).unwrap();
        rng.add_entropy(b"x");
        let stats = rng.stats();
        assert_eq!(stats.output_bytes, 40);
        assert_eq!(stats.generated_blocks, 2);
        assert_eq!(stats.entropy_additions, 1);
        assert!(stats.deterministic);
    }

    #[test]
    fn test_shared_across_threads() {
        let rng = Arc::new(CryptoRandom::with_seed(b"seed"));
        std::thread::scope(|s| {
            for i in 0..4u8 {
                let rng = Arc::clone(&rng);
                s.spawn(move || {
                    rng.add_entropy(&[i; 8]);
                    assert_eq!(rng.get_random_bytes(48).unwrap().len(), 48);
                });
            }
        });
        let stats = rng.stats();
        assert_eq!(stats.output_bytes, 4 * 48);
        assert_eq!(stats.entropy_additions, 4);
        assert_eq!(stats.generated_blocks, 8);
    }
}
