//! An LSH Forest: an approximate nearest-neighbor index over fixed-length
//! integer MinHash signatures.
//!
//! The index organizes each signature into `l` bands, hashes each band's
//! slice into a per-band table, and keeps a sorted prefix index per band
//! so that queries can probe at progressively shorter prefixes until
//! enough candidates are gathered. Approximate candidates are then
//! refined by exact Jaccard-style distance.
//!
//! Usage is phase-based: insert items, then query. [`LshForest::insert`]
//! and [`LshForest::batch_insert`] mark the index dirty; every query entry
//! point transparently rebuilds the sorted prefix indexes first if
//! needed, so calling [`LshForest::rebuild_index`] yourself is an
//! optimization (batch it once before many queries) rather than a
//! requirement.
//!
//! ```
//! use lsh_forest::{LshForest, StoreConfig};
//!
//! let mut forest = LshForest::new(4, 2, StoreConfig::Memory).unwrap();
//! forest.insert(&[1, 2, 3, 4]).unwrap();
//! forest.insert(&[1, 2, 9, 9]).unwrap();
//! forest.insert(&[5, 6, 3, 4]).unwrap();
//!
//! let neighbors = forest.query(&[1, 2, 3, 4], 3).unwrap();
//! assert_eq!(neighbors.len(), 3);
//! ```

pub use error::LshForestError;
pub use graph::{Edge, PADDING_ID};
pub use index::LshForest;
pub use store::StoreConfig;

pub mod band;
pub mod distance;
mod error;
mod graph;
mod index;
mod persist;
mod query;
mod refine;
mod store;
