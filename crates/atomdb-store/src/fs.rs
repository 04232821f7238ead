use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};

use atomdb_types::ChunkHash;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::ChunkStore;

/// Filesystem chunk store with a git-style fan-out layout.
///
/// A chunk with hash `h` lives at `<root>/<h[0..2]>/<h[2..]>`, its contents
/// exactly the codec-emitted bytes, no sidecar metadata. Directories are
/// created lazily. Writes go to a temp file in the target directory and are
/// renamed into place, so a reader never observes partial content and a
/// `put` is durable once the rename has returned. Concurrent writers racing
/// on the same hash are carrying the same bytes, so whichever rename lands
/// last changes nothing.
pub struct FsChunkStore {
    root: PathBuf,
    temp_seq: AtomicU64,
}

impl FsChunkStore {
    /// Open (or create) a store rooted at the given directory.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            temp_seq: AtomicU64::new(0),
        })
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn chunk_path(&self, hash: &ChunkHash) -> PathBuf {
        let hex = hash.to_hex();
        self.root.join(&hex[..2]).join(&hex[2..])
    }

    fn temp_path(&self, dir: &Path) -> PathBuf {
        let seq = self.temp_seq.fetch_add(1, Ordering::Relaxed);
        dir.join(format!(".tmp-{}-{seq}", process::id()))
    }
}

impl ChunkStore for FsChunkStore {
    fn put(&self, bytes: &[u8]) -> StoreResult<ChunkHash> {
        let hash = ChunkHash::of_bytes(bytes);
        let path = self.chunk_path(&hash);
        if path.exists() {
            return Ok(hash);
        }

        let dir = path.parent().expect("chunk path has a fan-out parent");
        fs::create_dir_all(dir)?;

        let tmp = self.temp_path(dir);
        let mut file = File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp, &path)?;

        debug!(hash = %hash.short_hex(), len = bytes.len(), "chunk written");
        Ok(hash)
    }

    fn get(&self, hash: &ChunkHash) -> StoreResult<Option<Vec<u8>>> {
        let path = self.chunk_path(hash);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        // Chunk files are immutable; bytes that no longer match their name
        // mean on-disk corruption.
        let computed = ChunkHash::of_bytes(&bytes);
        if computed != *hash {
            return Err(StoreError::HashMismatch {
                expected: *hash,
                computed,
            });
        }
        Ok(Some(bytes))
    }

    fn contains(&self, hash: &ChunkHash) -> StoreResult<bool> {
        Ok(self.chunk_path(hash).exists())
    }
}

impl std::fmt::Debug for FsChunkStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsChunkStore")
            .field("root", &self.root)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_and_get_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsChunkStore::open(dir.path()).unwrap();
        let hash = store.put(b"on disk").unwrap();
        assert_eq!(store.get(&hash).unwrap().as_deref(), Some(b"on disk".as_slice()));
    }

    #[test]
    fn fan_out_layout_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsChunkStore::open(dir.path()).unwrap();
        let bytes = b"layout check";
        let hash = store.put(bytes).unwrap();

        let hex = hash.to_hex();
        let path = dir.path().join(&hex[..2]).join(&hex[2..]);
        assert!(path.exists());
        assert_eq!(fs::read(&path).unwrap(), bytes);
    }

    #[test]
    fn put_is_idempotent_and_keeps_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsChunkStore::open(dir.path()).unwrap();
        let h1 = store.put(b"twice").unwrap();
        let h2 = store.put(b"twice").unwrap();
        assert_eq!(h1, h2);

        let hex = h1.to_hex();
        let fan_out = dir.path().join(&hex[..2]);
        let entries: Vec<_> = fs::read_dir(&fan_out).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn put_returns_hash_for_already_present_chunk() {
        // A put that finds the file already on disk must still return the
        // computed hash, not nothing.
        let dir = tempfile::tempdir().unwrap();
        let store = FsChunkStore::open(dir.path()).unwrap();
        let first = store.put(b"present").unwrap();
        let second = store.put(b"present").unwrap();
        assert_eq!(first, second);
        assert_eq!(second, ChunkHash::of_bytes(b"present"));
    }

    #[test]
    fn get_missing_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsChunkStore::open(dir.path()).unwrap();
        assert!(store.get(&ChunkHash::of_bytes(b"nope")).unwrap().is_none());
    }

    #[test]
    fn contains_without_reading() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsChunkStore::open(dir.path()).unwrap();
        let hash = store.put(b"here").unwrap();
        assert!(store.contains(&hash).unwrap());
        assert!(!store.contains(&ChunkHash::of_bytes(b"gone")).unwrap());
    }

    #[test]
    fn reopen_sees_existing_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let hash = {
            let store = FsChunkStore::open(dir.path()).unwrap();
            store.put(b"durable").unwrap()
        };
        let reopened = FsChunkStore::open(dir.path()).unwrap();
        assert_eq!(
            reopened.get(&hash).unwrap().as_deref(),
            Some(b"durable".as_slice())
        );
    }

    #[test]
    fn corrupted_file_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsChunkStore::open(dir.path()).unwrap();
        let hash = store.put(b"pristine").unwrap();

        let hex = hash.to_hex();
        let path = dir.path().join(&hex[..2]).join(&hex[2..]);
        fs::write(&path, b"tampered").unwrap();

        assert!(matches!(
            store.get(&hash),
            Err(StoreError::HashMismatch { .. })
        ));
    }

    #[test]
    fn no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsChunkStore::open(dir.path()).unwrap();
        for i in 0..10u8 {
            store.put(&[i]).unwrap();
        }
        let leftovers: Vec<_> = walk(dir.path())
            .into_iter()
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(".tmp-"))
            })
            .collect();
        assert!(leftovers.is_empty(), "temp files left: {leftovers:?}");
    }

    #[test]
    fn concurrent_writers_of_same_chunk() {
        use std::sync::Arc;
        use std::thread;

        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FsChunkStore::open(dir.path()).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.put(b"contended bytes").unwrap())
            })
            .collect();
        let hashes: Vec<ChunkHash> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(hashes.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(
            store.get(&hashes[0]).unwrap().as_deref(),
            Some(b"contended bytes".as_slice())
        );
    }

    fn walk(dir: &Path) -> Vec<PathBuf> {
        let mut out = Vec::new();
        if let Ok(entries) = fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    out.extend(walk(&path));
                } else {
                    out.push(path);
                }
            }
        }
        out
    }
}
