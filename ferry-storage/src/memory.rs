//! In-memory backend.
//!
//! Satisfies the same contract as [`LocalStorage`](crate::LocalStorage) with
//! all objects held in a shared map; used by the contract test battery and
//! by engine tests that should not touch disk.

use std::collections::BTreeMap;
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::error::StorageError;
use crate::storage::{normalize_relative, Storage, UploadStream};
use crate::types::StoreEntry;

#[derive(Debug, Clone)]
enum MemObject {
    Directory,
    File {
        data: Vec<u8>,
        modified: Option<DateTime<Utc>>,
    },
}

type Objects = Arc<Mutex<BTreeMap<PathBuf, MemObject>>>;

/// A storage backend held entirely in memory.
///
/// The root directory always exists and is addressed by `.` or the empty
/// path. Cloning shares the underlying objects.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    objects: Objects,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<PathBuf, MemObject>> {
        self.objects.lock().expect("memory storage lock poisoned")
    }
}

fn not_a_directory(path: &Path) -> StorageError {
    StorageError::Io {
        path: path.to_path_buf(),
        source: io::Error::other("not a directory"),
    }
}

impl Storage for MemoryStorage {
    fn list(&self, path: &Path) -> Result<Vec<StoreEntry>, StorageError> {
        let dir = normalize_relative(path)?;
        let objects = self.lock();
        if dir != PathBuf::new() {
            match objects.get(&dir) {
                Some(MemObject::Directory) => {}
                Some(MemObject::File { .. }) => return Err(not_a_directory(&dir)),
                None => return Err(StorageError::NotFound { path: dir }),
            }
        }

        let mut entries = Vec::new();
        for (key, object) in objects.iter() {
            if key.parent() != Some(dir.as_path()) {
                continue;
            }
            let name = key
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            entries.push(match object {
                MemObject::Directory => StoreEntry {
                    is_dir: true,
                    modified: None,
                    name,
                    size: 0,
                },
                MemObject::File { data, modified } => StoreEntry {
                    is_dir: false,
                    modified: *modified,
                    name,
                    size: data.len() as u64,
                },
            });
        }
        Ok(entries)
    }

    fn download(&self, path: &Path) -> Result<Box<dyn Read>, StorageError> {
        let key = normalize_relative(path)?;
        match self.lock().get(&key) {
            Some(MemObject::File { data, .. }) => Ok(Box::new(Cursor::new(data.clone()))),
            Some(MemObject::Directory) => Err(StorageError::IsDirectory { path: key }),
            None => Err(StorageError::NotFound { path: key }),
        }
    }

    fn upload(
        &self,
        path: &Path,
        modified: Option<DateTime<Utc>>,
    ) -> Result<Box<dyn UploadStream>, StorageError> {
        let key = normalize_relative(path)?;
        let objects = self.lock();
        if let Some(MemObject::Directory) = objects.get(&key) {
            return Err(StorageError::IsDirectory { path: key });
        }
        if let Some(parent) = key.parent() {
            if parent != Path::new("") && !matches!(objects.get(parent), Some(MemObject::Directory))
            {
                return Err(StorageError::NotFound {
                    path: parent.to_path_buf(),
                });
            }
        }
        drop(objects);
        Ok(Box::new(MemoryUpload {
            buf: Vec::new(),
            key,
            modified,
            objects: Arc::clone(&self.objects),
        }))
    }

    fn mkdir(&self, path: &Path) -> Result<(), StorageError> {
        let dir = normalize_relative(path)?;
        let mut objects = self.lock();
        let mut prefix = PathBuf::new();
        for component in dir.components() {
            prefix.push(component);
            match objects.get(&prefix) {
                Some(MemObject::Directory) => {}
                Some(MemObject::File { .. }) => return Err(not_a_directory(&prefix)),
                None => {
                    objects.insert(prefix.clone(), MemObject::Directory);
                }
            }
        }
        Ok(())
    }

    fn rename(&self, src: &Path, dst: &Path) -> Result<(), StorageError> {
        let src_key = normalize_relative(src)?;
        let dst_key = normalize_relative(dst)?;
        let mut objects = self.lock();
        match objects.get(&src_key) {
            Some(MemObject::Directory) => Err(StorageError::IsDirectory { path: src_key }),
            Some(MemObject::File { .. }) => {
                let object = objects.remove(&src_key).expect("checked above");
                objects.insert(dst_key, object);
                Ok(())
            }
            None => Err(StorageError::NotFound { path: src_key }),
        }
    }

    fn remove(&self, path: &Path) -> Result<(), StorageError> {
        let key = normalize_relative(path)?;
        let mut objects = self.lock();
        match objects.get(&key) {
            Some(MemObject::Directory) => {
                let occupied = objects.keys().any(|k| k.parent() == Some(key.as_path()));
                if occupied {
                    return Err(StorageError::Io {
                        path: key,
                        source: io::Error::other("directory not empty"),
                    });
                }
                objects.remove(&key);
                Ok(())
            }
            Some(MemObject::File { .. }) => {
                objects.remove(&key);
                Ok(())
            }
            None => Err(StorageError::NotFound { path: key }),
        }
    }
}

/// Buffering upload stream; the object becomes visible on `close`.
struct MemoryUpload {
    buf: Vec<u8>,
    key: PathBuf,
    modified: Option<DateTime<Utc>>,
    objects: Objects,
}

impl Write for MemoryUpload {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl UploadStream for MemoryUpload {
    fn close(self: Box<Self>) -> io::Result<()> {
        let MemoryUpload {
            buf,
            key,
            modified,
            objects,
        } = *self;
        let modified = modified.or_else(|| Some(Utc::now()));
        objects
            .lock()
            .map_err(|_| io::Error::other("memory storage lock poisoned"))?
            .insert(key, MemObject::File { data: buf, modified });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_file(storage: &MemoryStorage, path: &str, data: &[u8]) {
        let mut stream = storage.upload(Path::new(path), None).unwrap();
        stream.write_all(data).unwrap();
        stream.close().unwrap();
    }

    #[test]
    fn root_always_listable() {
        let storage = MemoryStorage::new();
        assert!(storage.list(Path::new(".")).unwrap().is_empty());
    }

    #[test]
    fn upload_into_missing_directory_fails() {
        let storage = MemoryStorage::new();
        assert!(matches!(
            storage.upload(Path::new("no_dir/file"), None),
            Err(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn upload_is_invisible_until_close() {
        let storage = MemoryStorage::new();
        let mut stream = storage.upload(Path::new("pending"), None).unwrap();
        stream.write_all(b"data").unwrap();
        assert!(storage.list(Path::new(".")).unwrap().is_empty());
        stream.close().unwrap();
        assert_eq!(storage.list(Path::new(".")).unwrap().len(), 1);
    }

    #[test]
    fn clones_share_objects() {
        let storage = MemoryStorage::new();
        let alias = storage.clone();
        write_file(&storage, "shared", b"x");
        assert_eq!(alias.list(Path::new(".")).unwrap().len(), 1);
    }

    #[test]
    fn remove_refuses_occupied_directory() {
        let storage = MemoryStorage::new();
        storage.mkdir(Path::new("d")).unwrap();
        write_file(&storage, "d/f", b"x");
        assert!(storage.remove(Path::new("d")).is_err());
        storage.remove(Path::new("d/f")).unwrap();
        storage.remove(Path::new("d")).unwrap();
    }
}
