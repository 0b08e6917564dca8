//------------ LshForest core: insertion, rebuild, clear ------------------
//!
//! This module owns the banded hash tables, their sorted prefix indexes,
//! and the insertion/rebuild/clear lifecycle. The query engine
//! ([`crate::query`]), refinement ([`crate::refine`]), and graph builder
//! ([`crate::graph`]) are implemented as further `impl LshForest` blocks
//! in their own modules, all operating on the fields defined here.

pub(crate) mod table;

use log::{debug, trace};
use rayon::prelude::*;

use crate::band::{band_key, BandParams};
use crate::error::LshForestError;
use crate::store::{self, SignatureStore, StoreConfig};
use table::BandTable;

/// A banded Locality-Sensitive Hashing Forest: an approximate
/// nearest-neighbor index over fixed-width integer MinHash signatures.
///
/// See the crate-level documentation for the overall algorithm. The
/// supported usage pattern is phase-based: insert items, call
/// [`rebuild_index`](LshForest::rebuild_index) (or let a query
/// auto-rebuild for you), then query. Every public entry point that
/// consults the sorted prefix index takes `&mut self`, because it may
/// need to rebuild that index first if dirty; bulk read-only operations
/// that don't probe the index (`get_signature`, `knn_graph`,
/// `all_distances`) take `&self` once the index is known to be clean.
pub struct LshForest {
    params: BandParams,
    tables: Vec<BandTable>,
    sorted: Vec<Vec<usize>>,
    store_config: StoreConfig,
    store: Option<Box<dyn SignatureStore>>,
    size: u32,
    clean: bool,
}

impl LshForest {
    /// Builds a new, empty index with signature width `d` and `l` bands.
    ///
    /// Fails with [`LshForestError::InvalidParameter`] if `l > d`, or if
    /// either is zero.
    pub fn new(d: u32, l: u32, store: StoreConfig) -> Result<Self, LshForestError> {
        let params = BandParams::new(d, l)?;
        debug!(
            "constructing LshForest: d={d}, l={l}, band_width={}",
            params.band_width()
        );

        let l = l as usize;
        Ok(LshForest {
            params,
            tables: (0..l).map(|_| BandTable::new()).collect(),
            sorted: vec![Vec::new(); l],
            store: store::build(&store)?,
            store_config: store,
            size: 0,
            clean: true,
        })
    }

    pub fn d(&self) -> u32 {
        self.params.d()
    }

    pub fn l(&self) -> u32 {
        self.params.l()
    }

    /// `k_` in spec terms: the width in words of a single band.
    pub fn band_width(&self) -> u32 {
        self.params.band_width()
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn is_clean(&self) -> bool {
        self.clean
    }

    pub(crate) fn params(&self) -> &BandParams {
        &self.params
    }

    pub(crate) fn tables(&self) -> &[BandTable] {
        &self.tables
    }

    pub(crate) fn sorted(&self) -> &[Vec<usize>] {
        &self.sorted
    }

    fn require_store(&self) -> Result<&dyn SignatureStore, LshForestError> {
        self.store
            .as_deref()
            .ok_or(LshForestError::StoreDisabled)
    }

    fn check_signature_len(&self, signature: &[u32]) -> Result<(), LshForestError> {
        if signature.len() != self.params.d() as usize {
            return Err(LshForestError::DimensionMismatch {
                expected: self.params.d(),
                actual: signature.len(),
            });
        }
        Ok(())
    }

    /// Fetches the signature stored for `id`. Requires the index to have
    /// been constructed with a [`StoreConfig`] other than `Disabled`.
    pub fn get_signature(&self, id: u32) -> Result<Vec<u32>, LshForestError> {
        let store = self.require_store()?;
        Ok(store.get(id, self.params.d()))
    }

    /// Inserts a single signature, returning its newly allocated id.
    ///
    /// `signature` must have exactly `d` words; a mismatched length
    /// returns [`LshForestError::DimensionMismatch`].
    pub fn insert(&mut self, signature: &[u32]) -> Result<u32, LshForestError> {
        self.check_signature_len(signature)?;
        let id = self.size;

        if let Some(store) = self.store.as_mut() {
            store.put(id, signature)?;
        }

        for (band, table) in self.tables.iter_mut().enumerate() {
            let key = band_key(&self.params, signature, band as u32, self.params.band_width());
            table.insert(key, id);
        }

        self.size += 1;
        self.clean = false;
        Ok(id)
    }

    /// Inserts many signatures at once, allocating contiguous ids up
    /// front and computing band keys in parallel across bands (the inner
    /// loop over new signatures stays sequential within a single band's
    /// table, so no band table is ever mutated from more than one thread).
    pub fn batch_insert(&mut self, signatures: &[Vec<u32>]) -> Result<Vec<u32>, LshForestError> {
        for sig in signatures {
            self.check_signature_len(sig)?;
        }

        let first_id = self.size;
        let ids: Vec<u32> = (0..signatures.len() as u32).map(|i| first_id + i).collect();
        debug!(
            "batch_insert: {} signatures starting at id {first_id}",
            signatures.len()
        );

        if let Some(store) = self.store.as_mut() {
            for (sig, &id) in signatures.iter().zip(ids.iter()) {
                store.put(id, sig)?;
            }
        }

        let params = &self.params;
        self.tables
            .par_iter_mut()
            .enumerate()
            .for_each(|(band, table)| {
                for (sig, &id) in signatures.iter().zip(ids.iter()) {
                    let key = band_key(params, sig, band as u32, params.band_width());
                    table.insert(key, id);
                }
            });

        self.size = first_id + signatures.len() as u32;
        self.clean = false;
        Ok(ids)
    }

    /// Rebuilds every band's sorted prefix index from its current hash
    /// table. Bands are independent and are rebuilt in parallel.
    pub fn rebuild_index(&mut self) {
        trace!("rebuilding sorted prefix indexes for {} bands", self.tables.len());
        self.sorted = self
            .tables
            .par_iter()
            .map(|table| {
                let mut order: Vec<usize> = (0..table.bucket_count()).collect();
                order.sort_unstable_by(|&a, &b| table.key(a).cmp(table.key(b)));
                order
            })
            .collect();
        self.clean = true;
    }

    /// Rebuilds the sorted prefix indexes if they're currently stale.
    /// Called automatically at the start of every query entry point.
    pub(crate) fn ensure_clean(&mut self) {
        if !self.clean {
            self.rebuild_index();
        }
    }

    /// Drops all indexed data: band tables, sorted indexes, and (if
    /// configured) stored signatures. The index returns to its
    /// just-constructed state.
    pub fn clear(&mut self) -> Result<(), LshForestError> {
        for table in self.tables.iter_mut() {
            table.clear();
        }
        self.sorted = vec![Vec::new(); self.tables.len()];
        if let Some(store) = self.store.as_mut() {
            store.clear()?;
        }
        self.size = 0;
        self.clean = true;
        Ok(())
    }

    /// The [`StoreConfig`] this index was constructed with.
    pub fn store_config(&self) -> &StoreConfig {
        &self.store_config
    }

    pub(crate) fn has_store(&self) -> bool {
        self.store.is_some()
    }

    pub(crate) fn store_ref(&self) -> Option<&dyn SignatureStore> {
        self.store.as_deref()
    }

    pub(crate) fn store_mut(&mut self) -> Option<&mut Box<dyn SignatureStore>> {
        self.store.as_mut()
    }

    pub(crate) fn set_size(&mut self, size: u32) {
        self.size = size;
    }

    pub(crate) fn tables_mut(&mut self) -> &mut Vec<BandTable> {
        &mut self.tables
    }
}
