//! # Snapshot Document & Store
//!
//! The persisted form of a register: `{ items, sales }` as one JSON
//! document under a fixed storage key.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Atomic Save                                      │
//! │                                                                         │
//! │  save(snapshot)                                                         │
//! │     │                                                                   │
//! │     ├── 1. ensure the data directory exists                             │
//! │     ├── 2. serialize to JSON                                            │
//! │     ├── 3. write ALL bytes to <key>.tmp                                 │
//! │     └── 4. rename <key>.tmp → <key>                                     │
//! │                                                                         │
//! │  A crash before step 4 leaves the previous snapshot untouched.         │
//! │  A crash after step 4 leaves the new snapshot complete.                │
//! │  There is no moment where the key names a half-written file.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart is absent from the document: a draft order does not survive
//! a restart (pricing is frozen per line at add time, so an abandoned
//! draft is worthless, not dangerous).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use snack_core::register::Register;
use snack_core::types::{Item, Sale};

use crate::error::{StoreError, StoreResult};

/// Fixed storage key: the snapshot's file name inside the data directory.
/// The `v1` suffix is the document version; a future incompatible format
/// gets a new key instead of corrupting old installs.
pub const STORAGE_KEY: &str = "snack_pos_simple_v1";

// =============================================================================
// Snapshot Document
// =============================================================================

/// The persisted state of one register.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// The catalog at save time.
    #[serde(default)]
    pub items: Vec<Item>,

    /// The sale history at save time.
    #[serde(default)]
    pub sales: Vec<Sale>,
}

impl Snapshot {
    /// Captures the persistable parts of a register.
    pub fn of_register(register: &Register) -> Self {
        Snapshot {
            items: register.items().to_vec(),
            sales: register.sales().to_vec(),
        }
    }

    /// Rebuilds a register from this snapshot (fresh cart, recomputed
    /// derived totals; see [`Register::from_parts`]).
    pub fn into_register(self) -> Register {
        Register::from_parts(self.items, self.sales)
    }

    /// True when there is nothing worth keeping.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.sales.is_empty()
    }
}

// =============================================================================
// Snapshot Store
// =============================================================================

/// Reads and writes the snapshot document for one data directory.
///
/// ## Example
/// ```rust,no_run
/// use snack_store::{Snapshot, SnapshotStore};
///
/// let store = SnapshotStore::new("/var/lib/snack-pos");
/// let snapshot = store.load()?.unwrap_or_default();
/// // ... mutate the register, then:
/// store.save(&snapshot)?;
/// # Ok::<(), snack_store::StoreError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    /// Full path of the snapshot file (`<data_dir>/<STORAGE_KEY>`).
    path: PathBuf,
}

impl SnapshotStore {
    /// Creates a store rooted at the given data directory.
    /// Nothing is touched on disk until the first load/save.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        SnapshotStore {
            path: data_dir.into().join(STORAGE_KEY),
        }
    }

    /// Full path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the snapshot, if one exists.
    ///
    /// ## Returns
    /// * `Ok(Some(snapshot))` - A snapshot was read and parsed
    /// * `Ok(None)` - No snapshot on disk (first run); not an error
    /// * `Err(StoreError)` - The file exists but could not be read/parsed
    pub fn load(&self) -> StoreResult<Option<Snapshot>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No snapshot on disk");
                return Ok(None);
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let snapshot: Snapshot =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?;

        info!(
            path = %self.path.display(),
            items = snapshot.items.len(),
            sales = snapshot.sales.len(),
            "Snapshot loaded"
        );
        Ok(Some(snapshot))
    }

    /// Writes the snapshot atomically (full write to a temp file, then
    /// rename over the key). Creates the data directory if needed.
    pub fn save(&self, snapshot: &Snapshot) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let bytes =
            serde_json::to_vec_pretty(snapshot).map_err(|e| StoreError::Encode(e.to_string()))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &bytes).map_err(|e| StoreError::Io {
            path: tmp.display().to_string(),
            source: e,
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;

        debug!(
            path = %self.path.display(),
            bytes = bytes.len(),
            "Snapshot saved"
        );
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use snack_core::types::{PaymentMethod, SaleChannel};

    fn register_with_history() -> Register {
        let mut register = Register::with_default_catalog();
        register.add_to_cart("munchie-bags", None).unwrap();
        register.add_to_cart("chips", Some("Hot Funyuns")).unwrap();
        register
            .checkout(PaymentMethod::Cash, None, SaleChannel::Attended)
            .unwrap();
        register
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());

        let register = register_with_history();
        let saved = Snapshot::of_register(&register);
        store.save(&saved).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, saved);

        // The rebuilt register resumes with the same books and a fresh cart.
        let rebuilt = loaded.into_register();
        assert_eq!(rebuilt.items(), register.items());
        assert_eq!(rebuilt.sales(), register.sales());
        assert!(rebuilt.cart().is_empty());
    }

    #[test]
    fn test_save_creates_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("deep").join("data");
        let store = SnapshotStore::new(&nested);

        store.save(&Snapshot::default()).unwrap();
        assert!(store.path().exists());
        assert_eq!(store.path(), nested.join(STORAGE_KEY));
    }

    #[test]
    fn test_save_overwrites_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());

        store.save(&Snapshot::default()).unwrap();
        let register = register_with_history();
        store.save(&Snapshot::of_register(&register)).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.sales.len(), 1);
        assert!(!store.path().with_extension("tmp").exists());
    }

    #[test]
    fn test_corrupt_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());

        fs::write(store.path(), b"{ not json").unwrap();
        let err = store.load().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn test_missing_fields_default_empty() {
        // A document from a build that only knew about items still loads.
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());

        fs::write(store.path(), br#"{"items": []}"#).unwrap();
        let snapshot = store.load().unwrap().unwrap();
        assert!(snapshot.is_empty());
    }
}
