//------------ FileStore ----------------------------------------------------

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use memmap2::Mmap;

use crate::error::LshForestError;
use crate::store::SignatureStore;

/// Append-only, memory-mapped signature store.
///
/// Signatures are written as tightly packed little-endian 32-bit words;
/// record `id` occupies byte range `[id * d * 4, (id + 1) * d * 4)`. Reads
/// are served from a memory map that is lazily (re-)established whenever
/// the file has grown since it was last mapped.
pub struct FileStore {
    path: PathBuf,
    file: File,
    len_bytes: AtomicU64,
    map: Mutex<Option<Mmap>>,
}

impl std::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("FileStore").field("path", &self.path).finish()
    }
}

impl FileStore {
    pub fn open(path: PathBuf) -> Result<Self, LshForestError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        let len_bytes = file.metadata()?.len();
        Ok(FileStore {
            path,
            file,
            len_bytes: AtomicU64::new(len_bytes),
            map: Mutex::new(None),
        })
    }

    /// Ensures the cached memory map covers the current file length,
    /// re-mapping if the file has grown since the last map, then hands
    /// the mapped bytes (or an empty slice, if the file is still empty)
    /// to `f`.
    fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        let mut guard = self.map.lock().unwrap();
        let current_len = self.len_bytes.load(Ordering::Acquire);

        if current_len == 0 {
            return f(&[]);
        }

        let needs_remap = match guard.as_ref() {
            Some(m) => (m.len() as u64) < current_len,
            None => true,
        };
        if needs_remap {
            // Safety: the file is exclusively owned by this FileStore for
            // the lifetime of the map; no other process is expected to
            // mutate it concurrently (single-process access is a
            // documented precondition of file-backed mode).
            let mmap = unsafe { Mmap::map(&self.file) }
                .expect("failed to mmap signature store file");
            *guard = Some(mmap);
        }
        f(guard.as_ref().expect("map populated above"))
    }
}

impl SignatureStore for FileStore {
    fn put(&mut self, _id: u32, signature: &[u32]) -> Result<(), LshForestError> {
        self.file.seek(SeekFrom::End(0))?;
        let mut buf = Vec::with_capacity(signature.len() * 4);
        for word in signature {
            buf.extend_from_slice(&word.to_le_bytes());
        }
        self.file.write_all(&buf)?;
        self.file.flush()?;
        self.len_bytes.fetch_add(buf.len() as u64, Ordering::AcqRel);
        Ok(())
    }

    fn get(&self, id: u32, d: u32) -> Vec<u32> {
        let stride = d as usize * 4;
        let start = id as usize * stride;
        self.with_bytes(|bytes| {
            let record = &bytes[start..start + stride];
            record
                .chunks_exact(4)
                .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
                .collect()
        })
    }

    fn clear(&mut self) -> Result<(), LshForestError> {
        self.file.set_len(0)?;
        self.file.seek(SeekFrom::Start(0))?;
        self.len_bytes.store(0, Ordering::Release);
        *self.map.lock().unwrap() = None;
        Ok(())
    }

    fn raw_bytes(&self) -> Vec<u8> {
        let mut file = self.file.try_clone().expect("failed to clone store file handle");
        let mut buf = Vec::new();
        file.seek(SeekFrom::Start(0)).expect("failed to seek store file");
        file.read_to_end(&mut buf).expect("failed to read store file");
        buf
    }

    fn load_raw_bytes(&mut self, bytes: &[u8], _d: u32) -> Result<(), LshForestError> {
        self.clear()?;
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(bytes)?;
        self.file.flush()?;
        self.len_bytes.store(bytes.len() as u64, Ordering::Release);
        Ok(())
    }
}
