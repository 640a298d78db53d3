//! Landmark-based audio identification.
//!
//! Reference recordings are reduced to landmark hashes (pairs of spectral
//! peaks and their time separation) and stored in an inverted index. A query
//! clip is hashed the same way and identified by offset-histogram voting.
//!
//! ```no_run
//! use audiomark::{FingerprintConfig, Recognizer};
//!
//! # fn load(_: &str) -> (Vec<f32>, u32) { unimplemented!() }
//! let recognizer = Recognizer::new(&FingerprintConfig::default())?;
//!
//! let (samples, rate) = load("reference.wav");
//! let id = recognizer.add_track("reference");
//! let fp = recognizer.fingerprint(&samples, rate)?;
//! recognizer.ingest(id, &fp)?;
//!
//! let (clip, rate) = load("clip.wav");
//! if let Some(found) = recognizer.best_match(&recognizer.fingerprint(&clip, rate)?) {
//!     println!("track {} at frame {} ({} votes)", found.track, found.offset, found.votes);
//! }
//! # Ok::<(), audiomark::RecognizerError>(())
//! ```

pub mod audio;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod index;
pub mod matcher;
pub mod recognizer;

pub use config::{Config, FingerprintConfig, MatchingConfig};
pub use error::{ConfigError, RecognizerError};
pub use fingerprint::hashing::{Fingerprint, HashToken, Landmark};
pub use fingerprint::spectrogram::Spectrogram;
pub use fingerprint::{Analysis, Fingerprinter};
pub use index::{ReferenceIndex, SharedIndex, TrackId, TrackRecord};
pub use matcher::{best_match, MatchResult};
pub use recognizer::Recognizer;
