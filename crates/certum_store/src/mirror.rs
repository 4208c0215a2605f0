//! Persisted local mirror of the certificate list.
//!
//! The mirror is a single slot holding the whole JSON-encoded list. Every
//! save overwrites it wholesale.

use crate::error::MirrorResult;
use certum_core::Certificate;
use redb::{Database, ReadableTable, TableDefinition, TableError};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

const MIRROR_TABLE: TableDefinition<&str, &str> = TableDefinition::new("certificate_mirror");
const MIRROR_KEY: &str = "certificates";

/// Local key-value slot for the certificate list
pub trait CertificateMirror: Send + Sync {
    /// Read the stored list; an empty slot loads as an empty list
    ///
    /// # Errors
    ///
    /// Returns error if the slot cannot be read or decoded
    fn load(&self) -> MirrorResult<Vec<Certificate>>;

    /// Overwrite the slot with `records`
    ///
    /// # Errors
    ///
    /// Returns error if the slot cannot be written
    fn save(&self, records: &[Certificate]) -> MirrorResult<()>;
}

/// Mirror backed by a redb database file
pub struct RedbMirror {
    db: Database,
    path: PathBuf,
}

impl RedbMirror {
    /// Open or create the mirror database at `path`
    ///
    /// # Errors
    ///
    /// Returns error if the database cannot be opened
    pub fn open(path: impl AsRef<Path>) -> MirrorResult<Self> {
        let path = path.as_ref().to_path_buf();
        let db = Database::create(&path)?;
        tracing::debug!(path = %path.display(), "opened certificate mirror");
        Ok(Self { db, path })
    }

    /// Database file location
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CertificateMirror for RedbMirror {
    fn load(&self) -> MirrorResult<Vec<Certificate>> {
        let txn = self.db.begin_read()?;
        let table = match txn.open_table(MIRROR_TABLE) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        match table.get(MIRROR_KEY)? {
            Some(raw) => Ok(serde_json::from_str(raw.value())?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, records: &[Certificate]) -> MirrorResult<()> {
        let encoded = serde_json::to_string(records)?;
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(MIRROR_TABLE)?;
            table.insert(MIRROR_KEY, encoded.as_str())?;
        }
        txn.commit()?;
        tracing::debug!(records = records.len(), "certificate mirror saved");
        Ok(())
    }
}

/// Mirror held in memory, stored in the same JSON shape as [`RedbMirror`]
#[derive(Debug, Default)]
pub struct MemoryMirror {
    slot: Mutex<Option<String>>,
}

impl MemoryMirror {
    /// Create an empty mirror
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw JSON currently stored
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CertificateMirror for MemoryMirror {
    fn load(&self) -> MirrorResult<Vec<Certificate>> {
        match self.raw() {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, records: &[Certificate]) -> MirrorResult<()> {
        let encoded = serde_json::to_string(records)?;
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(encoded);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use certum_core::{Address, CertificateId};
    use chrono::NaiveDate;

    fn cert(id: &str) -> Certificate {
        Certificate::new(
            CertificateId::new(id),
            "Ada",
            Address::from_bytes([1; 20]),
            "Degree",
            "Uni",
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        )
    }

    #[test]
    fn test_redb_mirror_empty_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = RedbMirror::open(dir.path().join("mirror.redb")).unwrap();
        assert!(mirror.load().unwrap().is_empty());
    }

    #[test]
    fn test_redb_mirror_overwrites_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = RedbMirror::open(dir.path().join("mirror.redb")).unwrap();

        mirror.save(&[cert("1"), cert("2")]).unwrap();
        mirror.save(&[cert("3")]).unwrap();
        assert_eq!(mirror.load().unwrap(), vec![cert("3")]);
    }

    #[test]
    fn test_redb_mirror_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mirror.redb");
        {
            let mirror = RedbMirror::open(&path).unwrap();
            mirror.save(&[cert("7").as_nft(None)]).unwrap();
        }
        let reopened = RedbMirror::open(&path).unwrap();
        let loaded = reopened.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded[0].is_nft);
        assert_eq!(reopened.path(), path.as_path());
    }

    #[test]
    fn test_memory_mirror_uses_camel_case_json() {
        let mirror = MemoryMirror::new();
        assert!(mirror.load().unwrap().is_empty());
        mirror.save(&[cert("1")]).unwrap();
        let raw = mirror.raw().unwrap();
        assert!(raw.contains("\"recipientName\":\"Ada\""));
        assert_eq!(mirror.load().unwrap(), vec![cert("1")]);
    }

    #[test]
    fn test_memory_mirror_rejects_corrupt_slot() {
        let mirror = MemoryMirror::new();
        *mirror.slot.lock().unwrap() = Some("not json".to_string());
        assert!(matches!(
            mirror.load(),
            Err(crate::MirrorError::Encoding(_))
        ));
    }
}
