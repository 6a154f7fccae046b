use std::io::ErrorKind;
use std::path::PathBuf;

use super::KeyValueStore;
use crate::error::StorageError;

/// Stores each key as `<key>.json` inside one directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.directory)?;
        let path = self.path_for(key);
        // Write beside the target and rename over it so a crash never leaves half a document.
        let tmp = self.directory.join(format!(".{}.json.tmp", key));
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}
