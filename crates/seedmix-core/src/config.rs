//! Collection settings, loadable from a JSON file.
//!
//! Every field is optional in the file; missing fields take the
//! [`Default`] values. Command-line flags are applied on top by the CLI.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::accumulator::{EntropyAccumulator, MIX_IN_LEN};
use crate::error::{Error, Result};

/// Configuration for one collection run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectConfig {
    /// Fixed mix-in as 32 hex characters. Random (UUID v4) when absent.
    pub seed: Option<String>,
    /// Text fed at finalization.
    pub text: Option<String>,
    /// Stop reading samples after this many.
    pub max_samples: Option<usize>,
    /// Mix the digest into the random pool the key file is drawn from.
    /// Has no effect without `keyfile`.
    pub feed_pool: bool,
    /// Write a new key file seeded by the digest.
    pub keyfile: Option<PathBuf>,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            seed: None,
            text: None,
            max_samples: None,
            feed_pool: true,
            keyfile: None,
        }
    }
}

impl CollectConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        log::debug!("loaded collect config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        if let Some(seed) = &config.seed {
            parse_seed(seed)?;
        }
        if config.max_samples == Some(0) {
            log::warn!("max_samples is 0; only the mix-in and text will be hashed");
        }
        Ok(config)
    }

    /// Open an accumulator using the configured seed, if any.
    pub fn open_accumulator(&self) -> Result<EntropyAccumulator> {
        match &self.seed {
            Some(seed) => Ok(EntropyAccumulator::with_seed(parse_seed(seed)?)),
            None => Ok(EntropyAccumulator::new()),
        }
    }
}

/// Parse a 16-byte mix-in written as 32 hex characters.
pub fn parse_seed(text: &str) -> Result<[u8; MIX_IN_LEN]> {
    let mut seed = [0u8; MIX_IN_LEN];
    hex::decode_to_slice(text.trim(), &mut seed)
        .map_err(|e| Error::InvalidSeed(format!("'{}': {e}", text.trim())))?;
    Ok(seed)
}
