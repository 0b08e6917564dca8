//------------ Persistence ---------------------------------------------------

use std::io::Write;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::LshForestError;
use crate::index::LshForest;
use crate::index::table::BandTable;

#[derive(Serialize, Deserialize)]
struct Dump {
    d: u32,
    l: u32,
    store_enabled: bool,
    size: u32,
    /// Per-band `(key, ids)` pairs, in the band's bucket-creation order.
    /// The sorted prefix index is rebuilt after restore rather than
    /// persisted (it is pure derived state).
    bands: Vec<Vec<(Vec<u8>, Vec<u32>)>>,
    store_bytes: Vec<u8>,
}

impl LshForest {
    /// Writes a self-describing binary dump of the full index state to
    /// `path`: every band's hash table, the signature store's raw bytes
    /// (empty if disabled), and `d`/`l`/`size`. The sorted prefix indexes
    /// are not persisted; `restore` rebuilds them.
    ///
    /// Written via a temp file in the same directory followed by an
    /// atomic rename, so a failure partway through never corrupts an
    /// existing dump at `path`.
    pub fn store(&self, path: impl AsRef<Path>) -> Result<(), LshForestError> {
        let path = path.as_ref();
        let dump = Dump {
            d: self.d(),
            l: self.l(),
            store_enabled: self.has_store(),
            size: self.size(),
            bands: self
                .tables()
                .iter()
                .map(|table| {
                    table
                        .entries()
                        .map(|(key, ids)| (key.to_vec(), ids.to_vec()))
                        .collect()
                })
                .collect(),
            store_bytes: self.store_ref().map(|s| s.raw_bytes()).unwrap_or_default(),
        };

        let bytes = bincode::serialize(&dump)?;
        debug!("store: serialized {} bytes to a temp file next to {}", bytes.len(), path.display());

        let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| LshForestError::Io(e.error))?;

        info!("store: wrote index of {} items to {}", self.size(), path.display());
        Ok(())
    }

    /// Clears the current state and replaces it with the dump at `path`,
    /// then rebuilds the sorted prefix indexes (they are never persisted).
    /// After a successful restore, `is_clean()` is true.
    ///
    /// The `d`, `l`, and store-enabled-ness of the dump must match this
    /// index's construction parameters; a mismatch returns
    /// `InvalidParameter`.
    pub fn restore(&mut self, path: impl AsRef<Path>) -> Result<(), LshForestError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let dump: Dump = bincode::deserialize(&bytes)?;

        if dump.d != self.d() || dump.l != self.l() {
            return Err(LshForestError::InvalidParameter(format!(
                "dump has d={}, l={} but this index was constructed with d={}, l={}",
                dump.d, dump.l, self.d(), self.l()
            )));
        }
        if dump.store_enabled != self.has_store() {
            return Err(LshForestError::InvalidParameter(
                "dump's signature-store configuration does not match this index".into(),
            ));
        }

        self.clear()?;

        let tables: Vec<BandTable> = dump
            .bands
            .into_iter()
            .map(|entries| {
                BandTable::from_entries(
                    entries
                        .into_iter()
                        .map(|(key, ids)| (key.into_boxed_slice(), ids))
                        .collect(),
                )
            })
            .collect();
        *self.tables_mut() = tables;

        if let Some(store) = self.store_mut() {
            store.load_raw_bytes(&dump.store_bytes, dump.d)?;
        }
        self.set_size(dump.size);

        self.rebuild_index();
        info!("restore: loaded index of {} items from {}", self.size(), path.display());
        Ok(())
    }
}
