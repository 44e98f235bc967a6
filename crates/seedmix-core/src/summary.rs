//! Serializable records describing a collection session.
//!
//! Summaries never contain digest bytes unless the caller explicitly builds
//! a [`CollectionReport`] with [`CollectionReport::with_digest`].

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::accumulator::AccumulatorStatus;

/// Snapshot of an accumulator, safe to log or print.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSummary {
    /// Session id (the mix-in as a UUID).
    pub id: String,
    pub status: AccumulatorStatus,
    pub samples: u64,
    /// Display-only estimate, capped at 256.
    pub estimated_bits: f64,
    /// Whether non-empty text was fed at finalization.
    pub text_supplied: bool,
}

/// Summary plus the outcome of a finished collection, as written by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionReport {
    pub version: u32,
    #[serde(flatten)]
    pub summary: CollectionSummary,
    /// Hex digest, present only when the caller asked for it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    /// Digest was mixed into the process random pool.
    pub fed_pool: bool,
    /// Key file written from this digest, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyfile: Option<String>,
    pub finished_at_unix: u64,
    pub seedmix_version: String,
}

impl CollectionReport {
    pub fn new(summary: CollectionSummary) -> Self {
        let finished_at_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Self {
            version: 1,
            summary,
            digest: None,
            fed_pool: false,
            keyfile: None,
            finished_at_unix,
            seedmix_version: crate::VERSION.to_string(),
        }
    }

    pub fn with_digest(mut self, digest: &[u8]) -> Self {
        self.digest = Some(hex::encode(digest));
        self
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
