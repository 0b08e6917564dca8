//------------ k-NN graph builder ------------------------------------------

use rayon::prelude::*;

use crate::error::LshForestError;
use crate::index::LshForest;

/// Sentinel written into `to`/`weight` when a row has fewer than `k`
/// neighbors, so every row has exactly `k` entries instead of a ragged
/// trailing gap.
pub const PADDING_ID: u32 = u32::MAX;

/// A single `(from, to, weight)` edge of the k-NN graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub from: u32,
    pub to: u32,
    pub weight: f32,
}

impl LshForest {
    /// Builds the k-NN graph: for every indexed item, its `k` nearest
    /// neighbors by linear-scan-refined distance. Rows are independent and
    /// computed across rayon's thread pool; ragged rows (fewer than `k`
    /// neighbors found) are padded with `(to: u32::MAX, weight: f32::INFINITY)`
    /// sentinel edges so every row has exactly `k` entries.
    ///
    /// Rebuilds the sorted prefix index first if dirty, then the
    /// per-row scan only reads shared state.
    pub fn knn_graph(&mut self, k: usize, kc: usize, weighted: bool) -> Result<Vec<Edge>, LshForestError> {
        if !self.has_store() {
            return Err(LshForestError::StoreDisabled);
        }
        self.ensure_clean();

        let size = self.size();
        let this: &Self = self;
        let rows: Vec<Vec<Edge>> = (0..size)
            .into_par_iter()
            .map(|i| this.knn_row(i, k, kc, weighted))
            .collect::<Result<_, _>>()?;

        Ok(rows.into_iter().flatten().collect())
    }

    fn knn_row(&self, from: u32, k: usize, kc: usize, weighted: bool) -> Result<Vec<Edge>, LshForestError> {
        let signature = self.get_signature(from)?;
        let mut row: Vec<Edge> = self
            .query_linear_scan_row(&signature, from, k, kc, weighted)?
            .into_iter()
            .map(|(weight, to)| Edge { from, to, weight })
            .collect();

        while row.len() < k {
            row.push(Edge { from, to: PADDING_ID, weight: f32::INFINITY });
        }
        Ok(row)
    }

    /// `query_linear_scan_exclude_by_id`-equivalent that avoids requiring
    /// `&mut self`: the graph builder already guaranteed a clean index
    /// before fanning out, so rows can probe the (now immutable) sorted
    /// index directly without re-checking the dirty flag.
    fn query_linear_scan_row(
        &self,
        signature: &[u32],
        exclude_id: u32,
        k: usize,
        kc: usize,
        weighted: bool,
    ) -> Result<Vec<(f32, u32)>, LshForestError> {
        let candidates = self.query_exclude_readonly(signature, &[exclude_id], k * kc.max(1));
        self.linear_scan(signature, &candidates, k, weighted)
    }
}
