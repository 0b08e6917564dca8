//------------ Query engine: variable-prefix probe ------------------------

use std::collections::BTreeSet;

use crate::band::band_key;
use crate::error::LshForestError;
use crate::index::LshForest;

impl LshForest {
    /// Returns up to `k` candidate ids whose signature shares a band
    /// prefix with `signature`, probing from the full band width down to
    /// a single word until enough candidates are gathered.
    ///
    /// Rebuilds the sorted prefix indexes first if the index is currently
    /// dirty, so this takes `&mut self` rather than `&self`.
    pub fn query(&mut self, signature: &[u32], k: usize) -> Result<Vec<u32>, LshForestError> {
        self.query_exclude(signature, &[], k)
    }

    /// As [`query`](Self::query), but ids in `exclude` are never added to
    /// the result set. `exclude` is expected to be small; membership is a
    /// linear scan.
    pub fn query_exclude(
        &mut self,
        signature: &[u32],
        exclude: &[u32],
        k: usize,
    ) -> Result<Vec<u32>, LshForestError> {
        if signature.len() != self.d() as usize {
            return Err(LshForestError::DimensionMismatch {
                expected: self.d(),
                actual: signature.len(),
            });
        }
        self.ensure_clean();

        let mut results = BTreeSet::new();
        let band_width = self.band_width();
        for r in (1..=band_width).rev() {
            self.probe(signature, r, exclude, &mut results, k);
            if results.len() >= k {
                break;
            }
        }
        Ok(results.into_iter().take(k).collect())
    }

    /// As [`query`](Self::query), but the query signature is fetched from
    /// the signature store by id rather than supplied directly. Requires
    /// the index to have been built with a signature store.
    pub fn query_by_id(&mut self, id: u32, k: usize) -> Result<Vec<u32>, LshForestError> {
        let signature = self.get_signature(id)?;
        self.query(&signature, k)
    }

    /// As [`query_exclude`](Self::query_exclude), with the query signature
    /// looked up by id.
    pub fn query_exclude_by_id(
        &mut self,
        id: u32,
        exclude: &[u32],
        k: usize,
    ) -> Result<Vec<u32>, LshForestError> {
        let signature = self.get_signature(id)?;
        self.query_exclude(&signature, exclude, k)
    }

    /// Runs [`query`](Self::query) for every signature in `signatures`, in
    /// order. Rebuilds the sorted prefix indexes at most once, before the
    /// first query, rather than once per call.
    pub fn batch_query(
        &mut self,
        signatures: &[Vec<u32>],
        k: usize,
    ) -> Result<Vec<Vec<u32>>, LshForestError> {
        self.ensure_clean();
        signatures.iter().map(|sig| self.query(sig, k)).collect()
    }

    /// [`query_exclude`](Self::query_exclude) without the auto-rebuild
    /// check, for callers (the k-NN graph builder) that have already
    /// ensured the index is clean and want to probe read-only from
    /// multiple rayon tasks at once.
    pub(crate) fn query_exclude_readonly(&self, signature: &[u32], exclude: &[u32], k: usize) -> Vec<u32> {
        let mut results = BTreeSet::new();
        let band_width = self.band_width();
        for r in (1..=band_width).rev() {
            self.probe(signature, r, exclude, &mut results, k);
            if results.len() >= k {
                break;
            }
        }
        results.into_iter().take(k).collect()
    }

    /// One round of the variable-prefix probe at prefix length `r` words,
    /// across every band. Matching ids (minus anything in `exclude`) are
    /// folded into `results`; the walk within a band stops as soon as
    /// `results` reaches `k`, but other bands at this same `r` are still
    /// probed (a later, lexicographically larger bucket in one band might
    /// still be the only source of a candidate another band lacks).
    fn probe(&self, signature: &[u32], r: u32, exclude: &[u32], results: &mut BTreeSet<u32>, k: usize) {
        let params = self.params();
        let prefix_bytes = (r * 4) as usize;

        for (band, table) in self.tables().iter().enumerate() {
            if results.len() >= k {
                return;
            }
            let order = &self.sorted()[band];
            let prefix = band_key(params, signature, band as u32, r);

            let mut j = order.partition_point(|&bucket| table.key(bucket)[..prefix_bytes] < *prefix);
            while j < order.len() && table.key(order[j])[..prefix_bytes] == *prefix {
                for &id in table.bucket(order[j]) {
                    if !exclude.contains(&id) {
                        results.insert(id);
                    }
                }
                if results.len() >= k {
                    break;
                }
                j += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::store::StoreConfig;

    #[test]
    fn end_to_end_scenario_one() {
        let mut forest = super::LshForest::new(4, 2, StoreConfig::Memory).unwrap();
        forest.insert(&[1, 2, 3, 4]).unwrap();
        forest.insert(&[1, 2, 9, 9]).unwrap();
        forest.insert(&[5, 6, 3, 4]).unwrap();
        forest.rebuild_index();

        let mut results = forest.query(&[1, 2, 3, 4], 3).unwrap();
        results.sort_unstable();
        assert_eq!(results, vec![0, 1, 2]);
    }

    #[test]
    fn end_to_end_scenario_four() {
        let mut forest = super::LshForest::new(4, 2, StoreConfig::Memory).unwrap();
        for _ in 0..3 {
            forest.insert(&[0, 0, 0, 0]).unwrap();
        }
        forest.rebuild_index();

        let mut results = forest.query(&[0, 0, 0, 0], 10).unwrap();
        results.sort_unstable();
        assert_eq!(results, vec![0, 1, 2]);
    }

    #[test]
    fn query_auto_rebuilds_dirty_index() {
        let mut forest = super::LshForest::new(4, 2, StoreConfig::Memory).unwrap();
        forest.insert(&[1, 2, 3, 4]).unwrap();
        assert!(!forest.is_clean());
        let results = forest.query(&[1, 2, 3, 4], 1).unwrap();
        assert!(forest.is_clean());
        assert_eq!(results, vec![0]);
    }

    #[test]
    fn query_exclude_omits_listed_ids() {
        let mut forest = super::LshForest::new(4, 1, StoreConfig::Memory).unwrap();
        forest.insert(&[1, 2, 3, 4]).unwrap();
        forest.insert(&[1, 2, 3, 4]).unwrap();
        forest.rebuild_index();

        let results = forest.query_exclude(&[1, 2, 3, 4], &[0], 5).unwrap();
        assert_eq!(results, vec![1]);
    }

    #[test]
    fn query_under_fill_is_not_an_error() {
        let mut forest = super::LshForest::new(4, 2, StoreConfig::Memory).unwrap();
        forest.insert(&[1, 2, 3, 4]).unwrap();
        forest.rebuild_index();

        let results = forest.query(&[1, 2, 3, 4], 10).unwrap();
        assert_eq!(results, vec![0]);
    }

    #[test]
    fn query_by_id_rejects_disabled_store() {
        let mut forest = super::LshForest::new(4, 2, StoreConfig::Disabled).unwrap();
        forest.insert(&[1, 2, 3, 4]).unwrap();
        forest.rebuild_index();
        assert!(matches!(
            forest.query_by_id(0, 1),
            Err(crate::error::LshForestError::StoreDisabled)
        ));
    }

    #[test]
    fn dimension_mismatch_on_query() {
        let mut forest = super::LshForest::new(4, 2, StoreConfig::Memory).unwrap();
        let err = forest.query(&[1, 2, 3], 1).unwrap_err();
        assert!(matches!(
            err,
            crate::error::LshForestError::DimensionMismatch { .. }
        ));
    }
}
