//! # seedmix-core
//!
//! **Turn mouse wiggles and typed noise into a seed.**
//!
//! `seedmix-core` folds weak, user-generated randomness (pointer timings and
//! coordinates, free-form text, a random mix-in) into a single SHA-256 digest
//! and hands it to a random generator or a new key file.
//!
//! ## Quick Start
//!
//! ```
//! use seedmix_core::{CryptoRandom, EntropyAccumulator};
//!
//! let rng = CryptoRandom::new()?;
//! let mut acc = EntropyAccumulator::new();
//! acc.add_pointer_sample(1_000, 5, 5)?;
//! acc.add_pointer_sample(1_016, 6, 5)?;
//! println!("~{} bits collected", acc.estimated_bits());
//!
//! let digest = acc.finalize_into(Some("some typed noise"), &rng)?;
//! assert_eq!(digest.len(), 32);
//! # Ok::<(), seedmix_core::Error>(())
//! ```
//!
//! ## Architecture
//!
//! SampleSource → EntropyAccumulator → digest → EntropySink / KeyFile
//!
//! - [`EntropyAccumulator`]: streaming SHA-256 over a 16-byte mix-in, 16-byte
//!   pointer samples and optional UTF-8 text. Finalize and cancel are terminal.
//! - [`EntropySink`]: anything that accepts supplementary entropy. The
//!   accumulator never touches global state; the caller passes the sink.
//! - [`CryptoRandom`]: thread-safe pool that mixes added entropy with the OS
//!   random source.
//! - [`KeyFile`]: creates XML key files from pool output plus collected
//!   entropy, and loads every supported key file format.
//!
//! The digest is a best-effort supplementary seed. It is not provable
//! entropy and never replaces the operating system's random source.

pub mod accumulator;
pub mod config;
pub mod encoding;
pub mod error;
pub mod keyfile;
pub mod random;
pub mod sample;
pub mod sink;
pub mod summary;

pub use accumulator::{
    AccumulatorStatus, BITS_PER_SAMPLE, DIGEST_LEN, EntropyAccumulator, EntropyDigest,
    MAX_ESTIMATED_BITS, MIX_IN_LEN,
};
pub use config::{CollectConfig, parse_seed};
pub use error::{Error, Result};
pub use keyfile::{KEY_LEN, KeyFile, KeyFileFormat};
pub use random::{CryptoRandom, PoolStats};
pub use sample::{
    PointerSample, ReaderSource, ReplaySource, SAMPLE_LEN, SampleSource, SourceInfo, read_samples,
};
pub use sink::EntropySink;
pub use summary::{CollectionReport, CollectionSummary};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
