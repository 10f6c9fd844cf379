/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/07/26
******************************************************************************/

//! File-backed table of explicitly created groups.
//!
//! The in-memory table is authoritative for the process lifetime; persistence
//! failures are logged and absorbed, never surfaced to the caller.

use crate::config::StorageConfig;
use crate::model::GroupRecord;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, error, warn};

/// Authoritative store of created/updated group descriptors
pub struct GroupStore {
    path: PathBuf,
    baseline: Option<PathBuf>,
    // Writers hold this for the whole mutate+persist sequence, so readers
    // never observe a half-written table.
    table: RwLock<HashMap<String, GroupRecord>>,
}

impl GroupStore {
    /// Creates a store over the configured backing files; call [`load`] next
    ///
    /// [`load`]: GroupStore::load
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            path: PathBuf::from(&config.store_file),
            baseline: config.baseline_file.as_ref().map(PathBuf::from),
            table: RwLock::new(HashMap::new()),
        }
    }

    fn read_table(path: &Path) -> Option<HashMap<String, GroupRecord>> {
        match fs::read_to_string(path) {
            Ok(json) if !json.trim().is_empty() => match serde_json::from_str(&json) {
                Ok(table) => Some(table),
                Err(e) => {
                    warn!("Failed to parse group table {}: {e}", path.display());
                    None
                }
            },
            Ok(_) => None,
            Err(e) => {
                debug!("Group table {} not readable: {e}", path.display());
                None
            }
        }
    }

    /// Loads the backing file, bootstrapping from the baseline catalogue on
    /// first run. Never fails: any error resets to an empty table.
    pub fn load(&self) {
        let mut table = self.table.write().expect("group table lock poisoned");
        table.clear();

        if let Some(stored) = Self::read_table(&self.path) {
            debug!("Loaded {} created groups from file", stored.len());
            table.extend(stored);
            return;
        }

        // First run: merge the baseline without overwriting anything already
        // present, then persist the merged table.
        if let Some(baseline_path) = &self.baseline {
            if let Some(baseline) = Self::read_table(baseline_path) {
                let count = baseline.len();
                for (name, record) in baseline {
                    table.entry(name).or_insert(record);
                }
                debug!("Loaded {count} baseline groups from {}", baseline_path.display());
                self.persist(&table);
            }
        }
    }

    /// Case-sensitive exact lookup
    pub fn get(&self, name: &str) -> Option<GroupRecord> {
        self.table
            .read()
            .expect("group table lock poisoned")
            .get(name)
            .cloned()
    }

    /// Snapshot of every stored descriptor
    pub fn get_all(&self) -> Vec<GroupRecord> {
        self.table
            .read()
            .expect("group table lock poisoned")
            .values()
            .cloned()
            .collect()
    }

    /// Case-insensitive membership check, used by duplicate detection
    pub fn contains_name(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.table
            .read()
            .expect("group table lock poisoned")
            .keys()
            .any(|k| k.to_lowercase() == lower)
    }

    /// Inserts or replaces by name and persists the full table
    pub fn put(&self, record: GroupRecord) {
        let mut table = self.table.write().expect("group table lock poisoned");
        table.insert(record.name.clone(), record);
        self.persist(&table);
    }

    fn persist(&self, table: &HashMap<String, GroupRecord>) {
        match serde_json::to_string_pretty(table) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.path, json) {
                    error!("Failed to save group table {}: {e}", self.path.display());
                } else {
                    debug!("Saved {} groups to {}", table.len(), self.path.display());
                }
            }
            Err(e) => error!("Failed to serialize group table: {e}"),
        }
    }
}
