//! In-memory reference library.
//!
//! [`ReferenceIndex`] is an append-only inverted index from hash token to every
//! `(track, frame)` it was seen at. Memory grows linearly with the total number
//! of hashes ingested across all tracks; that is the dominant cost of the whole
//! system, so [`ReferenceIndex::occurrence_count`] is worth watching.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use crate::error::{RecognizerError, Result};
use crate::fingerprint::hashing::{Fingerprint, HashToken};
use crate::matcher::{best_match, MatchResult};

/// Dense id handed out by [`ReferenceIndex::add_track`], in registration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TrackId(pub u32);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TrackRecord {
    pub id: TrackId,
    pub name: String,
}

/// One place a token was seen in a reference track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Occurrence {
    pub track: TrackId,
    pub frame: usize,
}

#[derive(Debug, Default)]
pub struct ReferenceIndex {
    tracks: Vec<TrackRecord>,
    table: HashMap<HashToken, Vec<Occurrence>>,
    occurrences: usize,
}

impl ReferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_track(&mut self, name: impl Into<String>) -> TrackId {
        let id = TrackId(self.tracks.len() as u32);
        self.tracks.push(TrackRecord {
            id,
            name: name.into(),
        });
        id
    }

    /// Appends every landmark of `fingerprint` under `track`.
    ///
    /// Ingesting the same fingerprint twice duplicates its occurrences.
    pub fn ingest(&mut self, track: TrackId, fingerprint: &Fingerprint) -> Result<()> {
        if self.track(track).is_none() {
            return Err(RecognizerError::UnknownTrack(track));
        }

        for landmark in fingerprint {
            self.table.entry(landmark.token).or_default().push(Occurrence {
                track,
                frame: landmark.frame,
            });
        }
        self.occurrences += fingerprint.len();

        Ok(())
    }

    /// Occurrences of `token` in insertion order; empty when never seen.
    pub fn lookup(&self, token: HashToken) -> &[Occurrence] {
        self.table.get(&token).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn track(&self, id: TrackId) -> Option<&TrackRecord> {
        self.tracks.get(id.0 as usize)
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn token_count(&self) -> usize {
        self.table.len()
    }

    pub fn occurrence_count(&self) -> usize {
        self.occurrences
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences == 0
    }
}

/// [`ReferenceIndex`] behind a single reader-writer lock.
///
/// Lookups and matches share the read lock. Each `ingest` holds the write
/// lock for its whole fingerprint, so a track's occurrences land as one batch.
#[derive(Debug, Default)]
pub struct SharedIndex {
    inner: RwLock<ReferenceIndex>,
}

impl SharedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_track(&self, name: impl Into<String>) -> TrackId {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add_track(name)
    }

    pub fn ingest(&self, track: TrackId, fingerprint: &Fingerprint) -> Result<()> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .ingest(track, fingerprint)
    }

    pub fn best_match(&self, query: &Fingerprint) -> Option<MatchResult> {
        best_match(&self.read(), query)
    }

    pub fn track(&self, id: TrackId) -> Option<TrackRecord> {
        self.read().track(id).cloned()
    }

    pub fn read(&self) -> RwLockReadGuard<'_, ReferenceIndex> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn into_inner(self) -> ReferenceIndex {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<ReferenceIndex> for SharedIndex {
    fn from(index: ReferenceIndex) -> Self {
        Self {
            inner: RwLock::new(index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::hashing::Landmark;
    use rayon::prelude::*;

    fn fingerprint(entries: &[(usize, usize, usize, usize)]) -> Fingerprint {
        entries
            .iter()
            .map(|&(a, b, dt, frame)| Landmark {
                token: HashToken::new(a, b, dt),
                frame,
            })
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn track_ids_are_dense() {
        let mut index = ReferenceIndex::new();
        assert_eq!(index.add_track("a"), TrackId(0));
        assert_eq!(index.add_track("b"), TrackId(1));
        assert_eq!(index.add_track("a"), TrackId(2));
        assert_eq!(index.track(TrackId(1)).unwrap().name, "b");
        assert_eq!(index.track_count(), 3);
        assert!(index.track(TrackId(3)).is_none());
    }

    #[test]
    fn ingest_appends_in_order() {
        let mut index = ReferenceIndex::new();
        let a = index.add_track("a");
        let b = index.add_track("b");
        index.ingest(a, &fingerprint(&[(1, 2, 1, 0), (1, 2, 1, 7), (3, 4, 2, 1)])).unwrap();
        index.ingest(b, &fingerprint(&[(1, 2, 1, 3)])).unwrap();

        assert_eq!(
            index.lookup(HashToken::new(1, 2, 1)),
            &[
                Occurrence { track: a, frame: 0 },
                Occurrence { track: a, frame: 7 },
                Occurrence { track: b, frame: 3 },
            ]
        );
        assert_eq!(index.token_count(), 2);
        assert_eq!(index.occurrence_count(), 4);
    }

    #[test]
    fn lookup_miss_is_empty() {
        let index = ReferenceIndex::new();
        assert!(index.lookup(HashToken::new(1, 2, 3)).is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn reingesting_duplicates() {
        let mut index = ReferenceIndex::new();
        let a = index.add_track("a");
        let fp = fingerprint(&[(5, 6, 1, 2)]);
        index.ingest(a, &fp).unwrap();
        index.ingest(a, &fp).unwrap();
        assert_eq!(index.lookup(HashToken::new(5, 6, 1)).len(), 2);
    }

    #[test]
    fn rejects_unknown_track() {
        let mut index = ReferenceIndex::new();
        let err = index.ingest(TrackId(0), &fingerprint(&[(1, 1, 1, 0)])).unwrap_err();
        assert!(matches!(err, RecognizerError::UnknownTrack(TrackId(0))));
        assert!(index.is_empty());
    }

    #[test]
    fn concurrent_ingest_loses_nothing() {
        let shared = SharedIndex::new();
        let ids: Vec<TrackId> = (0..8).map(|i| shared.add_track(format!("t{}", i))).collect();
        let fp = fingerprint(&(0..100).map(|f| (9, 9, 1, f)).collect::<Vec<_>>());

        ids.par_iter().for_each(|&id| shared.ingest(id, &fp).unwrap());

        let index = shared.into_inner();
        let occurrences = index.lookup(HashToken::new(9, 9, 1));
        assert_eq!(occurrences.len(), 800);
        for id in ids {
            let frames: Vec<usize> = occurrences
                .iter()
                .filter(|o| o.track == id)
                .map(|o| o.frame)
                .collect();
            assert_eq!(frames, (0..100).collect::<Vec<_>>());
        }
    }
}
