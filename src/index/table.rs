//------------ BandTable -----------------------------------------------

use std::collections::HashMap;

/// One band's hash table: a `key -> ordered list of ids` mapping, stored
/// as a side vector of buckets addressed by `usize` index rather than a
/// plain `HashMap<Box<[u8]>, Vec<u32>>`.
///
/// The sorted prefix index built over this table (see
/// [`LshForest::rebuild_index`](super::LshForest::rebuild_index)) holds
/// bucket indices rather than keys directly, which stay valid across any
/// number of insertions (new buckets are only ever pushed, never moved)
/// and don't require copying a key a second time.
#[derive(Debug, Default)]
pub(crate) struct BandTable {
    keys: Vec<Box<[u8]>>,
    buckets: Vec<Vec<u32>>,
    index: HashMap<Box<[u8]>, usize>,
}

impl BandTable {
    pub(crate) fn new() -> Self {
        BandTable {
            keys: Vec::new(),
            buckets: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Appends `id` to the bucket for `key`, creating a new bucket if this
    /// is the first id to collide under `key`.
    pub(crate) fn insert(&mut self, key: Box<[u8]>, id: u32) {
        match self.index.get(&key) {
            Some(&bucket) => self.buckets[bucket].push(id),
            None => {
                let bucket = self.keys.len();
                self.index.insert(key.clone(), bucket);
                self.keys.push(key);
                self.buckets.push(vec![id]);
            }
        }
    }

    pub(crate) fn key(&self, bucket: usize) -> &[u8] {
        &self.keys[bucket]
    }

    pub(crate) fn bucket(&self, bucket: usize) -> &[u32] {
        &self.buckets[bucket]
    }

    pub(crate) fn bucket_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn clear(&mut self) {
        self.keys = Vec::new();
        self.buckets = Vec::new();
        self.index = HashMap::new();
    }

    /// Every `(key, ids)` pair in this table, in bucket-creation order.
    /// Used by persistence, which doesn't care about sort order (the
    /// sorted prefix index is rebuilt after restore, never persisted).
    pub(crate) fn entries(&self) -> impl Iterator<Item = (&[u8], &[u32])> {
        self.keys
            .iter()
            .map(|k| &**k)
            .zip(self.buckets.iter().map(|b| b.as_slice()))
    }

    pub(crate) fn from_entries(entries: Vec<(Box<[u8]>, Vec<u32>)>) -> Self {
        let mut table = BandTable::new();
        for (key, ids) in entries {
            let bucket = table.keys.len();
            table.index.insert(key.clone(), bucket);
            table.keys.push(key);
            table.buckets.push(ids);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colliding_keys_accumulate_in_insertion_order() {
        let mut table = BandTable::new();
        table.insert(Box::from([1u8, 2]), 0);
        table.insert(Box::from([1u8, 2]), 1);
        table.insert(Box::from([3u8, 4]), 2);

        assert_eq!(table.bucket_count(), 2);
        assert_eq!(table.bucket(0), &[0, 1]);
        assert_eq!(table.bucket(1), &[2]);
    }

    #[test]
    fn from_entries_round_trips() {
        let mut table = BandTable::new();
        table.insert(Box::from([9u8]), 7);
        let entries: Vec<_> = table
            .entries()
            .map(|(k, v)| (Box::from(k), v.to_vec()))
            .collect();

        let restored = BandTable::from_entries(entries);
        assert_eq!(restored.bucket_count(), 1);
        assert_eq!(restored.bucket(0), &[7]);
    }
}
