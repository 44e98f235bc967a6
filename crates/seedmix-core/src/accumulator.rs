//! Incremental SHA-256 entropy accumulator.
//!
//! Folds weak randomness (a random mix-in, pointer timings and coordinates,
//! free-form text) into one 256-bit digest:
//!
//! ```text
//! SHA-256( mix-in[16] ‖ sample[16] ‖ sample[16] ‖ … ‖ utf8(text) )
//! ```
//!
//! The digest is a best-effort supplementary seed to be mixed into an
//! existing generator. It is not provable entropy and does not replace the
//! operating system's random source.
//!
//! Lifecycle: `Open` → (`Finalized` | `Cancelled`). Both closed states are
//! terminal. Every call that would feed or close a closed accumulator returns
//! [`Error::Finalized`] / [`Error::Cancelled`] and leaves the state unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::sample::{PointerSample, SampleSource};
use crate::sink::EntropySink;
use crate::summary::CollectionSummary;

/// Length of the random mix-in fed at creation.
pub const MIX_IN_LEN: usize = 16;

/// Length of the finalized digest.
pub const DIGEST_LEN: usize = 32;

/// Bit-estimate credit per accepted pointer sample.
pub const BITS_PER_SAMPLE: f64 = 0.125;

/// Reported bit estimate never exceeds this.
pub const MAX_ESTIMATED_BITS: f64 = 256.0;

/// Finalized 256-bit digest; wiped when dropped.
pub type EntropyDigest = Zeroizing<[u8; DIGEST_LEN]>;

/// Where an accumulator is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccumulatorStatus {
    Open,
    Finalized,
    Cancelled,
}

impl fmt::Display for AccumulatorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Finalized => write!(f, "finalized"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

enum State {
    Open(Box<Sha256>),
    Finalized,
    Cancelled,
}

/// Streams entropy inputs through SHA-256.
///
/// Memory use is constant: samples are hashed as they arrive, never buffered.
pub struct EntropyAccumulator {
    id: Uuid,
    state: State,
    samples: u64,
    bit_estimate: f64,
    text_supplied: bool,
}

impl EntropyAccumulator {
    /// Open an accumulator mixed with the bytes of a fresh UUID v4.
    ///
    /// The UUID comes from the platform's random source, so the mix-in only
    /// guarantees that two accumulators never hash identical input.
    pub fn new() -> Self {
        let id = Uuid::new_v4();
        Self::open(id, *id.as_bytes())
    }

    /// Open an accumulator with a caller-chosen mix-in. Used for reproducible
    /// digests in tests and for replaying recorded sessions.
    pub fn with_seed(seed: [u8; MIX_IN_LEN]) -> Self {
        Self::open(Uuid::from_bytes(seed), seed)
    }

    fn open(id: Uuid, seed: [u8; MIX_IN_LEN]) -> Self {
        let mut h = Sha256::new();
        h.update(seed);
        log::debug!("entropy accumulator {id} opened");
        Self {
            id,
            state: State::Open(Box::new(h)),
            samples: 0,
            bit_estimate: 0.0,
            text_supplied: false,
        }
    }

    /// Session identifier (the mix-in interpreted as a UUID).
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn status(&self) -> AccumulatorStatus {
        match self.state {
            State::Open(_) => AccumulatorStatus::Open,
            State::Finalized => AccumulatorStatus::Finalized,
            State::Cancelled => AccumulatorStatus::Cancelled,
        }
    }

    /// Number of pointer samples accepted so far.
    pub fn sample_count(&self) -> u64 {
        self.samples
    }

    /// Heuristic bit estimate, `min(samples * 0.125, 256)`.
    ///
    /// Display only. It does not gate finalization and says nothing about
    /// the strength of the digest.
    pub fn estimated_bits(&self) -> f64 {
        self.bit_estimate.min(MAX_ESTIMATED_BITS)
    }

    /// Feed one pointer sample (8-byte timestamp, 4-byte x, 4-byte y).
    pub fn add_pointer_sample(&mut self, timestamp: u64, x: i32, y: i32) -> Result<()> {
        self.add_sample(PointerSample::new(timestamp, x, y))
    }

    /// Feed one pointer sample.
    pub fn add_sample(&mut self, sample: PointerSample) -> Result<()> {
        let h = self.hasher("add_sample")?;
        h.update(sample.to_bytes());
        self.samples += 1;
        self.bit_estimate += BITS_PER_SAMPLE;
        Ok(())
    }

    /// Drain `source` into the hash, taking at most `limit` samples.
    ///
    /// Returns the number of samples fed. Fails without pulling anything from
    /// the source if the accumulator is closed.
    pub fn absorb<S>(&mut self, source: &mut S, limit: Option<usize>) -> Result<usize>
    where
        S: SampleSource + ?Sized,
    {
        self.ensure_open("absorb")?;
        let mut fed = 0usize;
        while limit.is_none_or(|max| fed < max) {
            let Some(sample) = source.next_sample() else {
                break;
            };
            self.add_sample(sample)?;
            fed += 1;
        }
        log::debug!(
            "accumulator {} absorbed {fed} samples from '{}'",
            self.id,
            source.name()
        );
        Ok(fed)
    }

    /// Close the hash and return the digest.
    ///
    /// Non-empty `text` is fed as UTF-8 before closing. Finalization always
    /// succeeds on an open accumulator, however few samples were collected:
    /// the mix-in and the text still contribute. Terminal: every later call
    /// fails with [`Error::Finalized`].
    pub fn finalize(&mut self, text: Option<&str>) -> Result<EntropyDigest> {
        self.ensure_open("finalize")?;
        let State::Open(mut h) = std::mem::replace(&mut self.state, State::Finalized) else {
            return Err(Error::Finalized);
        };
        if let Some(t) = text.filter(|t| !t.is_empty()) {
            h.update(t.as_bytes());
            self.text_supplied = true;
        }
        let digest = Zeroizing::new(<[u8; DIGEST_LEN]>::from(h.finalize_reset()));
        log::debug!(
            "entropy accumulator {} finalized after {} samples (~{} bits)",
            self.id,
            self.samples,
            self.estimated_bits()
        );
        Ok(digest)
    }

    /// Finalize and hand the digest to `sink`. The digest is also returned.
    pub fn finalize_into<K>(&mut self, text: Option<&str>, sink: &K) -> Result<EntropyDigest>
    where
        K: EntropySink + ?Sized,
    {
        let digest = self.finalize(text)?;
        sink.add_entropy(digest.as_slice());
        Ok(digest)
    }

    /// Discard without producing a digest. Safe to call in any state.
    ///
    /// An open accumulator becomes `Cancelled`; a closed one is unchanged.
    pub fn cancel(&mut self) {
        if let State::Open(h) = &mut self.state {
            Digest::reset(&mut **h);
            self.state = State::Cancelled;
            log::debug!("entropy accumulator {} cancelled", self.id);
        }
    }

    /// Serializable snapshot of this session.
    pub fn summary(&self) -> CollectionSummary {
        CollectionSummary {
            id: self.id.to_string(),
            status: self.status(),
            samples: self.samples,
            estimated_bits: self.estimated_bits(),
            text_supplied: self.text_supplied,
        }
    }

    fn ensure_open(&self, op: &str) -> Result<()> {
        match Error::closed(self.status()) {
            None => Ok(()),
            Some(e) => {
                log::warn!("{op} called on {} accumulator {}", self.status(), self.id);
                Err(e)
            }
        }
    }

    fn hasher(&mut self, op: &str) -> Result<&mut Sha256> {
        self.ensure_open(op)?;
        match &mut self.state {
            State::Open(h) => Ok(&mut **h),
            State::Finalized => Err(Error::Finalized),
            State::Cancelled => Err(Error::Cancelled),
        }
    }
}

impl Default for EntropyAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EntropyAccumulator {
    fn drop(&mut self) {
        // Clear intermediate hash state on every exit path.
        if let State::Open(h) = &mut self.state {
            Digest::reset(&mut **h);
        }
    }
}

impl fmt::Debug for EntropyAccumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntropyAccumulator")
            .field("id", &self.id)
            .field("status", &self.status())
            .field("samples", &self.samples)
            .field("estimated_bits", &self.estimated_bits())
            .finish()
    }
}
