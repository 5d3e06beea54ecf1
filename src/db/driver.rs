use std::path::Path;

use anyhow::Result;
use bincode::{
    config::{BigEndian, WithOtherEndian},
    DefaultOptions, Options,
};
use serde::{de::DeserializeOwned, Serialize};
use sled::Db as Sled;

pub struct Db {
    handle: Sled,
    encoder: WithOtherEndian<DefaultOptions, BigEndian>,
}
impl Db {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let handle = sled::open(path)?;
        Ok(Self::from_handle(handle))
    }
    // in-memory database, removed on drop
    pub fn temporary() -> Result<Self> {
        let handle = sled::Config::new().temporary(true).open()?;
        Ok(Self::from_handle(handle))
    }
    fn from_handle(handle: Sled) -> Self {
        let encoder = bincode::options().with_big_endian();
        Self { handle, encoder }
    }

    // CRUD
    pub fn next_id(&self) -> Result<u64> {
        let id = self.handle.generate_id()?;
        Ok(id)
    }
    pub fn insert<T: Serialize, K: AsRef<str>>(&self, key: K, value: &T) -> Result<()> {
        let key = key.as_ref();
        let value = self.encoder.serialize(value)?;
        self.handle.insert(key, value)?;
        Ok(())
    }
    pub fn get<T: DeserializeOwned, K: AsRef<str>>(&self, key: K) -> Result<Option<T>> {
        let key = key.as_ref();
        let value = self.handle.get(key)?;
        let value = match value {
            Some(value) => value,
            None => return Ok(None),
        };
        let value = self.encoder.deserialize(&value)?;
        Ok(Some(value))
    }
    // returns whether the key was present
    pub fn remove<K: AsRef<str>>(&self, key: K) -> Result<bool> {
        let key = key.as_ref();
        let old = self.handle.remove(key)?;
        Ok(old.is_some())
    }
    /// Remove every key starting with `prefix` in one atomic batch.
    pub fn remove_prefix(&self, prefix: &str) -> Result<usize> {
        let mut batch = sled::Batch::default();
        let mut removed = 0;
        for key in self.handle.scan_prefix(prefix).keys() {
            batch.remove(key?);
            removed += 1;
        }
        self.handle.apply_batch(batch)?;
        Ok(removed)
    }
    pub fn flush(&self) -> Result<()> {
        self.handle.flush()?;
        Ok(())
    }

    // Iterators
    pub fn iter_prefix<'a, T: DeserializeOwned + 'a>(
        &'a self,
        prefix: &str,
    ) -> Result<impl Iterator<Item = Result<(String, T)>> + 'a> {
        let iter = self.handle.scan_prefix(prefix).map(move |item| {
            let (key, value) = item?;
            let key = String::from_utf8(key.to_vec())?;
            let value = self.encoder.deserialize(&value)?;
            Ok((key, value))
        });
        Ok(iter)
    }
}

// Required Debug implementation for `Db`
impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db").finish()
    }
}

// Tests
#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Record {
        id: u64,
        name: String,
    }

    fn record(id: u64, name: &str) -> Record {
        Record {
            id,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_open_on_disk() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let db = Db::open(dir.path().join("db"))?;
        db.insert("rec:1", &record(1, "one"))?;
        db.flush()?;
        drop(db);

        let db = Db::open(dir.path().join("db"))?;
        let rec = db.get::<Record, _>("rec:1")?;
        assert_eq!(rec.unwrap().name, "one");
        Ok(())
    }

    #[test]
    fn test_next_id_is_monotonic() -> Result<()> {
        let db = Db::temporary()?;
        let first = db.next_id()?;
        let second = db.next_id()?;
        assert!(second > first);
        Ok(())
    }

    #[test]
    fn test_insert_and_get() -> Result<()> {
        let db = Db::temporary()?;
        db.insert("rec:0", &record(0, "test"))?;
        let rec = db.get::<Record, _>("rec:0")?;
        assert_eq!(rec.unwrap().name, "test");
        assert!(db.get::<Record, _>("rec:1")?.is_none());
        Ok(())
    }

    #[test]
    fn test_remove() -> Result<()> {
        let db = Db::temporary()?;
        db.insert("rec:0", &record(0, "test"))?;
        assert!(db.remove("rec:0")?);
        assert!(!db.remove("rec:0")?);
        assert!(db.get::<Record, _>("rec:0")?.is_none());
        Ok(())
    }

    #[test]
    fn test_insert_as_update() -> Result<()> {
        let db = Db::temporary()?;
        db.insert("rec:0", &record(0, "test"))?;
        db.insert("rec:0", &record(0, "test2"))?;
        let rec = db.get::<Record, _>("rec:0")?;
        assert_eq!(rec.unwrap().name, "test2");
        Ok(())
    }

    #[test]
    fn test_iter_prefix_excludes() -> Result<()> {
        let db = Db::temporary()?;
        db.insert("rec:0", &record(0, "a"))?;
        db.insert("rec:1", &record(1, "b"))?;
        db.insert("other:0", &record(0, "c"))?;

        let names = db
            .iter_prefix::<Record>("rec:")?
            .map(|item| item.map(|(_, rec)| rec.name))
            .collect::<Result<Vec<_>>>()?;
        assert_eq!(names, vec!["a", "b"]);
        Ok(())
    }

    #[test]
    fn test_remove_prefix() -> Result<()> {
        let db = Db::temporary()?;
        db.insert("rec:0", &record(0, "a"))?;
        db.insert("rec:1", &record(1, "b"))?;
        db.insert("other:0", &record(0, "c"))?;

        assert_eq!(db.remove_prefix("rec:")?, 2);
        assert_eq!(db.iter_prefix::<Record>("rec:")?.count(), 0);
        assert!(db.get::<Record, _>("other:0")?.is_some());
        assert_eq!(db.remove_prefix("rec:")?, 0);
        Ok(())
    }
}
