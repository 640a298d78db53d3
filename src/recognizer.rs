use std::sync::{Arc, Mutex, PoisonError};

use crate::config::FingerprintConfig;
use crate::error::Result;
use crate::fingerprint::hashing::Fingerprint;
use crate::fingerprint::spectrogram::Spectrogram;
use crate::fingerprint::Fingerprinter;
use crate::index::{ReferenceIndex, SharedIndex, TrackId, TrackRecord};
use crate::matcher::MatchResult;

/// Fingerprinter plus reference library, the entry point for ingestion and
/// query callers.
///
/// Safe to share across threads: fingerprinting is pure, and the library
/// follows [`SharedIndex`]'s locking.
#[derive(Debug)]
pub struct Recognizer {
    fingerprinter: Fingerprinter,
    index: SharedIndex,
    last_spectrogram: Mutex<Option<Arc<Spectrogram>>>,
}

impl Recognizer {
    pub fn new(config: &FingerprintConfig) -> Result<Self> {
        Self::with_index(config, ReferenceIndex::new())
    }

    pub fn with_index(config: &FingerprintConfig, index: ReferenceIndex) -> Result<Self> {
        Ok(Self {
            fingerprinter: Fingerprinter::new(config)?,
            index: SharedIndex::from(index),
            last_spectrogram: Mutex::new(None),
        })
    }

    pub fn fingerprinter(&self) -> &Fingerprinter {
        &self.fingerprinter
    }

    pub fn index(&self) -> &SharedIndex {
        &self.index
    }

    /// Fingerprint of mono `samples`; the spectrogram is kept for
    /// [`last_spectrogram`](Self::last_spectrogram).
    pub fn fingerprint(&self, samples: &[f32], sample_rate: u32) -> Result<Fingerprint> {
        let analysis = self.fingerprinter.analyze(samples, sample_rate)?;
        *self
            .last_spectrogram
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(analysis.spectrogram));
        Ok(analysis.fingerprint)
    }

    pub fn add_track(&self, name: impl Into<String>) -> TrackId {
        self.index.add_track(name)
    }

    pub fn ingest(&self, track: TrackId, fingerprint: &Fingerprint) -> Result<()> {
        self.index.ingest(track, fingerprint)
    }

    pub fn best_match(&self, query: &Fingerprint) -> Option<MatchResult> {
        self.index.best_match(query)
    }

    pub fn track(&self, id: TrackId) -> Option<TrackRecord> {
        self.index.track(id)
    }

    /// Spectrogram from the most recent [`fingerprint`](Self::fingerprint) call.
    /// For display only.
    pub fn last_spectrogram(&self) -> Option<Arc<Spectrogram>> {
        self.last_spectrogram
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
