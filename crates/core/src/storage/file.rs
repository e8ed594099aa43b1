use crate::storage::KeyValueStorage;
use anyhow::Context;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// One `<key>.json` file per namespace under a data directory.
///
/// Writes go to a sibling temp file that is then renamed over the target, so a
/// crash mid-write leaves the previous blob intact.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn open(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create data dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> anyhow::Result<PathBuf> {
        anyhow::ensure!(
            !key.is_empty()
                && !key.starts_with('.')
                && key
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')),
            "invalid storage key {key:?} (allowed: ASCII letters, digits, '-', '_', '.')"
        );
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStorage for JsonFileStorage {
    fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(blob) => Ok(Some(blob)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("failed to remove {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::open(dir.path()).unwrap();
        assert_eq!(storage.load("part-prices").unwrap(), None);
    }

    #[test]
    fn save_load_remove() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonFileStorage::open(dir.path().join("nested")).unwrap();

        storage.save("part-prices", "[]").unwrap();
        assert_eq!(storage.load("part-prices").unwrap().as_deref(), Some("[]"));
        assert!(storage.dir().join("part-prices.json").exists());
        assert!(!storage.dir().join("part-prices.json.tmp").exists());

        storage.save("part-prices", "[1]").unwrap();
        assert_eq!(storage.load("part-prices").unwrap().as_deref(), Some("[1]"));

        storage.remove("part-prices").unwrap();
        assert_eq!(storage.load("part-prices").unwrap(), None);
        storage.remove("part-prices").unwrap();
    }

    #[test]
    fn rejects_keys_that_escape_the_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonFileStorage::open(dir.path()).unwrap();
        assert!(storage.save("../evil", "x").is_err());
        assert!(storage.save("a/b", "x").is_err());
        assert!(storage.load("").is_err());
        assert!(storage.load(".hidden").is_err());
    }
}
