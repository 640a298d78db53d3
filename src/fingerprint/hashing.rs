use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

const BIN_BITS: u32 = 24;
const DELTA_BITS: u32 = 16;

/// Largest bin index a token can carry.
pub const MAX_TOKEN_BIN: usize = (1 << BIN_BITS) - 1;
/// Largest frame delta a token can carry.
pub const MAX_TOKEN_DELTA: usize = (1 << DELTA_BITS) - 1;

/// A landmark hash: anchor bin, paired bin and frame delta packed into one
/// integer as `anchor:24 | paired:24 | delta:16`.
///
/// Ordering follows the packed value, i.e. anchor first, then paired bin, then delta.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct HashToken(u64);

impl HashToken {
    pub(crate) fn new(anchor_bin: usize, paired_bin: usize, frame_delta: usize) -> Self {
        assert!(
            anchor_bin <= MAX_TOKEN_BIN && paired_bin <= MAX_TOKEN_BIN,
            "bin out of range: {}, {}",
            anchor_bin,
            paired_bin
        );
        assert!(
            frame_delta > 0 && frame_delta <= MAX_TOKEN_DELTA,
            "frame delta out of range: {}",
            frame_delta
        );
        Self(
            ((anchor_bin as u64) << (BIN_BITS + DELTA_BITS))
                | ((paired_bin as u64) << DELTA_BITS)
                | frame_delta as u64,
        )
    }

    pub fn anchor_bin(self) -> usize {
        (self.0 >> (BIN_BITS + DELTA_BITS)) as usize & MAX_TOKEN_BIN
    }

    pub fn paired_bin(self) -> usize {
        (self.0 >> DELTA_BITS) as usize & MAX_TOKEN_BIN
    }

    pub fn frame_delta(self) -> usize {
        self.0 as usize & MAX_TOKEN_DELTA
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HashToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.anchor_bin(), self.paired_bin(), self.frame_delta())
    }
}

/// A hash token anchored at the frame it was generated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Landmark {
    pub token: HashToken,
    pub frame: usize,
}

/// Ordered landmark hashes produced from one audio buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Fingerprint {
    landmarks: Vec<Landmark>,
}

impl Fingerprint {
    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Landmark> {
        self.landmarks.iter()
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn distinct_tokens(&self) -> usize {
        self.landmarks.iter().map(|l| l.token).collect::<HashSet<_>>().len()
    }
}

impl From<Vec<Landmark>> for Fingerprint {
    fn from(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }
}

impl<'a> IntoIterator for &'a Fingerprint {
    type Item = &'a Landmark;
    type IntoIter = std::slice::Iter<'a, Landmark>;

    fn into_iter(self) -> Self::IntoIter {
        self.landmarks.iter()
    }
}

/// Pairs the peaks of each frame with peaks `min_delta..=max_delta` frames later.
///
/// A peak is never paired with its own frame, so a `min_delta` of zero is
/// treated as one.
///
/// At most `fan_out` hashes are emitted per anchor frame, visiting delta,
/// then anchor peak, then candidate peak in ascending order.
pub(crate) fn hash_landmarks(
    peaks_by_frame: &[Vec<usize>],
    fan_out: usize,
    min_delta: usize,
    max_delta: usize,
) -> Fingerprint {
    let mut landmarks = Vec::new();

    for (t, anchors) in peaks_by_frame.iter().enumerate() {
        if anchors.is_empty() {
            continue;
        }

        let mut pairs = 0;
        'scan: for dt in min_delta.max(1)..=max_delta {
            let Some(candidates) = peaks_by_frame.get(t + dt) else {
                break;
            };
            for &anchor in anchors {
                for &candidate in candidates {
                    if pairs == fan_out {
                        break 'scan;
                    }
                    landmarks.push(Landmark {
                        token: HashToken::new(anchor, candidate, dt),
                        frame: t,
                    });
                    pairs += 1;
                }
            }
        }
    }

    Fingerprint::from(landmarks)
}
