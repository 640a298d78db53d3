//! Offset-histogram voting.
//!
//! Every query landmark that collides with a reference occurrence votes for
//! `(track, reference_frame - query_frame)`. A true match piles its votes onto
//! one offset; chance collisions scatter.

use serde::Serialize;
use std::collections::HashMap;

use crate::fingerprint::hashing::Fingerprint;
use crate::index::{ReferenceIndex, TrackId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub track: TrackId,
    /// Reference frame aligned with the start of the query.
    pub offset: i64,
    pub votes: usize,
}

/// Best `(track, offset)` for `query`, or `None` when nothing collides.
///
/// The candidate with the most votes wins; among equals, the one that
/// received its first vote earliest.
pub fn best_match(index: &ReferenceIndex, query: &Fingerprint) -> Option<MatchResult> {
    let mut slots: HashMap<(TrackId, i64), usize> = HashMap::new();
    let mut tally: Vec<((TrackId, i64), usize)> = Vec::new();
    let mut collisions = 0usize;

    for landmark in query {
        for occurrence in index.lookup(landmark.token) {
            let key = (
                occurrence.track,
                occurrence.frame as i64 - landmark.frame as i64,
            );
            let slot = *slots.entry(key).or_insert_with(|| {
                tally.push((key, 0));
                tally.len() - 1
            });
            tally[slot].1 += 1;
            collisions += 1;
        }
    }

    let mut best: Option<((TrackId, i64), usize)> = None;
    for &(key, votes) in &tally {
        if best.map_or(true, |(_, top)| votes > top) {
            best = Some((key, votes));
        }
    }

    log::debug!(
        "Matched {} query hashes: {} collisions over {} candidate alignments",
        query.len(),
        collisions,
        tally.len()
    );

    best.map(|((track, offset), votes)| MatchResult {
        track,
        offset,
        votes,
    })
}
