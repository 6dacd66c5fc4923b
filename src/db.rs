// src/db.rs

use crate::error::{Result, StoolError};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// A durable key-value store holding whole serialized values under named slots.
pub trait Storage {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn read(&self, key: &str) -> Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        (**self).write(key, value)
    }
}

/// 获取数据库文件的标准路径 (~/.config/stoollog/stoollog.db)
pub fn default_db_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or(StoolError::HomeDirNotFound)?;
    Ok(home_dir.join(".config/stoollog/stoollog.db"))
}

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// 打开数据库，必要时创建目录和表
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(db_path)?;
        Self::with_connection(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS slots (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        tracing::debug!("storage ready");
        Ok(Self { conn })
    }
}

impl Storage for SqliteStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM slots WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// 整体覆盖写入
    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO slots (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

/// Stands in for a database that could not be opened. Every access fails
/// with the reason the open failed.
pub struct UnavailableStorage {
    reason: String,
}

impl Storage for UnavailableStorage {
    fn read(&self, _key: &str) -> Result<Option<String>> {
        Err(StoolError::StorageUnavailable(self.reason.clone()))
    }

    fn write(&self, _key: &str, _value: &str) -> Result<()> {
        Err(StoolError::StorageUnavailable(self.reason.clone()))
    }
}

/// 打开存储；`required` 为 false 时，打开失败只记警告，按空数据处理
pub fn open_storage(db_path: &Path, required: bool) -> Result<Box<dyn Storage>> {
    match SqliteStorage::open(db_path) {
        Ok(storage) => Ok(Box::new(storage)),
        Err(e) if !required => {
            tracing::warn!(path = %db_path.display(), error = %e, "cannot open database, showing no data");
            Ok(Box::new(UnavailableStorage {
                reason: e.to_string(),
            }))
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_slot_reads_as_none() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        assert_eq!(storage.read("stool-logs").unwrap(), None);
    }

    #[test]
    fn write_overwrites_whole_slot() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        storage.write("stool-logs", "[1]").unwrap();
        storage.write("stool-logs", "[1,2]").unwrap();
        assert_eq!(storage.read("stool-logs").unwrap().as_deref(), Some("[1,2]"));
        assert_eq!(storage.read("other").unwrap(), None);
    }

    #[test]
    fn unopenable_database_reads_as_empty_unless_required() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.db");
        std::fs::write(&path, vec![b'x'; 4096]).unwrap();

        let storage = open_storage(&path, false).unwrap();
        assert!(matches!(
            storage.read("stool-logs"),
            Err(StoolError::StorageUnavailable(_))
        ));
        let store = crate::store::EntryStore::open(storage, "stool-logs");
        assert!(store.entries().is_empty());

        assert!(open_storage(&path, true).is_err());
    }

    #[test]
    fn open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/stoollog.db");
        {
            let storage = SqliteStorage::open(&path).unwrap();
            storage.write("k", "v").unwrap();
        }
        let reopened = SqliteStorage::open(&path).unwrap();
        assert_eq!(reopened.read("k").unwrap().as_deref(), Some("v"));
    }
}
