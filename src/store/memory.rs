//------------ MemoryStore -------------------------------------------------

use crate::error::LshForestError;
use crate::store::SignatureStore;

/// Holds every inserted signature as a contiguous, owned sequence indexed
/// by id. Simplest and fastest back end; memory use is proportional to
/// `size * d * 4` bytes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Vec<Vec<u32>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore { data: Vec::new() }
    }
}

impl SignatureStore for MemoryStore {
    fn put(&mut self, id: u32, signature: &[u32]) -> Result<(), LshForestError> {
        debug_assert_eq!(id as usize, self.data.len());
        self.data.push(signature.to_vec());
        Ok(())
    }

    fn get(&self, id: u32, _d: u32) -> Vec<u32> {
        self.data[id as usize].clone()
    }

    fn clear(&mut self) -> Result<(), LshForestError> {
        self.data = Vec::new();
        Ok(())
    }

    fn raw_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            self.data.iter().map(|s| s.len() * 4).sum(),
        );
        for sig in &self.data {
            for word in sig {
                out.extend_from_slice(&word.to_le_bytes());
            }
        }
        out
    }

    fn load_raw_bytes(&mut self, bytes: &[u8], d: u32) -> Result<(), LshForestError> {
        let stride = d as usize * 4;
        self.data = bytes
            .chunks_exact(stride)
            .map(|record| {
                record
                    .chunks_exact(4)
                    .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
                    .collect()
            })
            .collect();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_round_trips() {
        let mut store = MemoryStore::new();
        store.put(0, &[1, 2, 3, 4]).unwrap();
        store.put(1, &[5, 6, 7, 8]).unwrap();
        assert_eq!(store.get(0, 4), vec![1, 2, 3, 4]);
        assert_eq!(store.get(1, 4), vec![5, 6, 7, 8]);
    }

    #[test]
    fn raw_bytes_round_trip() {
        let mut store = MemoryStore::new();
        store.put(0, &[1, 2]).unwrap();
        store.put(1, &[3, 4]).unwrap();
        let bytes = store.raw_bytes();

        let mut restored = MemoryStore::new();
        restored.load_raw_bytes(&bytes, 2).unwrap();
        assert_eq!(restored.get(0, 2), vec![1, 2]);
        assert_eq!(restored.get(1, 2), vec![3, 4]);
    }
}
