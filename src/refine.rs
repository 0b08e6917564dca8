//------------ Linear-scan refinement --------------------------------------

use rayon::prelude::*;

use crate::distance::distance;
use crate::error::LshForestError;
use crate::index::LshForest;

impl LshForest {
    /// Scores every id in `candidates` against `signature` and returns the
    /// `k` closest, sorted ascending by `(distance, id)`. `k == 0`, or `k`
    /// greater than the candidate count, returns every scored candidate.
    pub fn linear_scan(
        &self,
        signature: &[u32],
        candidates: &[u32],
        k: usize,
        weighted: bool,
    ) -> Result<Vec<(f32, u32)>, LshForestError> {
        let mut scored = self.score_candidates(signature, candidates, weighted)?;
        scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap().then(a.1.cmp(&b.1)));
        let take = if k == 0 { scored.len() } else { k.min(scored.len()) };
        scored.truncate(take);
        Ok(scored)
    }

    /// As [`linear_scan`](Self::linear_scan), but skips the final sort and
    /// returns unsorted parallel arrays `(ids, weights)` instead of a
    /// sorted vector of pairs, left in candidate order. Useful when the
    /// caller only needs the raw scores, not an ordered top-`k` (e.g. for
    /// further aggregation). `k == 0`, or `k` greater than the candidate
    /// count, scores every candidate; otherwise only the first `k`
    /// candidates are scored.
    pub fn fast_linear_scan(
        &self,
        signature: &[u32],
        candidates: &[u32],
        k: usize,
        weighted: bool,
    ) -> Result<(Vec<u32>, Vec<f32>), LshForestError> {
        let take = if k == 0 { candidates.len() } else { k.min(candidates.len()) };
        let scored = self.score_candidates(signature, &candidates[..take], weighted)?;
        Ok(scored.into_iter().map(|(weight, id)| (id, weight)).unzip())
    }

    /// Probes the index for `k * kc` approximate candidates, then refines
    /// to the top `k` by linear scan. `kc` is the over-fetch multiplier:
    /// larger values trade latency for recall.
    pub fn query_linear_scan(
        &mut self,
        signature: &[u32],
        k: usize,
        kc: usize,
        weighted: bool,
    ) -> Result<Vec<(f32, u32)>, LshForestError> {
        self.query_linear_scan_exclude(signature, &[], k, kc, weighted)
    }

    /// As [`query_linear_scan`](Self::query_linear_scan), excluding `exclude`
    /// from both the candidate probe and the refined result.
    pub fn query_linear_scan_exclude(
        &mut self,
        signature: &[u32],
        exclude: &[u32],
        k: usize,
        kc: usize,
        weighted: bool,
    ) -> Result<Vec<(f32, u32)>, LshForestError> {
        let candidates = self.query_exclude(signature, exclude, k * kc.max(1))?;
        self.linear_scan(signature, &candidates, k, weighted)
    }

    /// As [`query_linear_scan`](Self::query_linear_scan), with the query
    /// signature looked up by id; `id` itself is excluded from its own
    /// result (an item is never its own nearest neighbor in the output).
    pub fn query_linear_scan_by_id(
        &mut self,
        id: u32,
        k: usize,
        kc: usize,
        weighted: bool,
    ) -> Result<Vec<(f32, u32)>, LshForestError> {
        self.query_linear_scan_exclude_by_id(id, &[], k, kc, weighted)
    }

    /// As [`query_linear_scan_exclude`](Self::query_linear_scan_exclude),
    /// with the query signature looked up by id; `id` is implicitly added
    /// to `exclude`.
    pub fn query_linear_scan_exclude_by_id(
        &mut self,
        id: u32,
        exclude: &[u32],
        k: usize,
        kc: usize,
        weighted: bool,
    ) -> Result<Vec<(f32, u32)>, LshForestError> {
        let signature = self.get_signature(id)?;
        let mut exclude_self: Vec<u32> = exclude.to_vec();
        exclude_self.push(id);
        self.query_linear_scan_exclude(&signature, &exclude_self, k, kc, weighted)
    }

    /// Distance between two stored signatures, looked up by id.
    pub fn distance_by_id(&self, a: u32, b: u32) -> Result<f32, LshForestError> {
        let sig_a = self.get_signature(a)?;
        let sig_b = self.get_signature(b)?;
        Ok(distance(&sig_a, &sig_b, false))
    }

    /// Weighted-Jaccard distance between two stored signatures, looked up
    /// by id.
    pub fn weighted_distance_by_id(&self, a: u32, b: u32) -> Result<f32, LshForestError> {
        let sig_a = self.get_signature(a)?;
        let sig_b = self.get_signature(b)?;
        Ok(distance(&sig_a, &sig_b, true))
    }

    /// Computes the distance from `signature` to every currently indexed
    /// item, in id order. Rows are independent, so the scan runs across
    /// rayon's thread pool.
    pub fn all_distances(&self, signature: &[u32], weighted: bool) -> Result<Vec<f32>, LshForestError> {
        if signature.len() != self.d() as usize {
            return Err(LshForestError::DimensionMismatch {
                expected: self.d(),
                actual: signature.len(),
            });
        }
        if !self.has_store() {
            return Err(LshForestError::StoreDisabled);
        }
        Ok((0..self.size())
            .into_par_iter()
            .map(|id| distance(signature, &self.get_signature(id).unwrap(), weighted))
            .collect())
    }

    fn score_candidates(
        &self,
        signature: &[u32],
        candidates: &[u32],
        weighted: bool,
    ) -> Result<Vec<(f32, u32)>, LshForestError> {
        if !self.has_store() {
            return Err(LshForestError::StoreDisabled);
        }
        candidates
            .iter()
            .map(|&id| {
                let candidate_sig = self.get_signature(id)?;
                Ok((distance(signature, &candidate_sig, weighted), id))
            })
            .collect()
    }
}
