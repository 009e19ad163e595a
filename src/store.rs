//! Flat-file storage behind a trait.
//!
//! The publisher only needs four things from a filesystem: make sure a
//! directory exists, list a directory's direct entries, read a file, and
//! write a file. [`FileStore`] captures exactly that so the pipeline can run
//! against [`FsStore`] in production and an in-memory store in tests.
//!
//! Every error carries the path that failed; all of them are fatal to a run.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("non UTF-8 file name in {}: {name}", .dir.display())]
    InvalidName { dir: PathBuf, name: String },
}

impl StoreError {
    fn io(op: &'static str, path: &Path, source: io::Error) -> Self {
        StoreError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A direct child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub is_dir: bool,
}

pub trait FileStore: Sync {
    /// Create `dir` and any missing parents. Succeeds if it already exists.
    fn ensure_dir(&self, dir: &Path) -> Result<(), StoreError>;

    /// Direct entries of `dir`, sorted by name.
    fn list(&self, dir: &Path) -> Result<Vec<Entry>, StoreError>;

    fn read(&self, path: &Path) -> Result<Vec<u8>, StoreError>;

    /// Write `bytes` to `path`, replacing any existing file.
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), StoreError>;
}

/// The real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStore;

impl FileStore for FsStore {
    fn ensure_dir(&self, dir: &Path) -> Result<(), StoreError> {
        std::fs::create_dir_all(dir).map_err(|e| StoreError::io("create", dir, e))
    }

    fn list(&self, dir: &Path) -> Result<Vec<Entry>, StoreError> {
        let read_dir = std::fs::read_dir(dir).map_err(|e| StoreError::io("list", dir, e))?;
        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| StoreError::io("list", dir, e))?;
            // Symlinks are not followed.
            let file_type = entry
                .file_type()
                .map_err(|e| StoreError::io("stat", &entry.path(), e))?;
            let name = entry
                .file_name()
                .into_string()
                .map_err(|raw| StoreError::InvalidName {
                    dir: dir.to_path_buf(),
                    name: raw.to_string_lossy().into_owned(),
                })?;
            entries.push(Entry {
                name,
                is_dir: file_type.is_dir(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, StoreError> {
        std::fs::read(path).map_err(|e| StoreError::io("read", path, e))
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        std::fs::write(path, bytes).map_err(|e| StoreError::io("write", path, e))
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::{Mutex, MutexGuard};
    use tempfile::TempDir;

    #[derive(Debug, Clone)]
    enum Node {
        File(Vec<u8>),
        Dir,
    }

    /// In-memory store keyed by path. Directories are implied by the files
    /// under them or created explicitly with [`FileStore::ensure_dir`].
    /// Reads and writes under a chosen prefix can be made to fail.
    #[derive(Debug, Default)]
    pub struct MemoryStore {
        nodes: Mutex<BTreeMap<PathBuf, Node>>,
        read_only: bool,
        deny_reads: Option<PathBuf>,
        deny_writes: Option<PathBuf>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// A store whose `write` and `ensure_dir` always fail with
        /// `PermissionDenied`.
        pub fn read_only(self) -> Self {
            Self {
                read_only: true,
                ..self
            }
        }

        /// Fail `read` of any path under `prefix`; listing still succeeds.
        pub fn deny_reads_under(self, prefix: impl Into<PathBuf>) -> Self {
            Self {
                deny_reads: Some(prefix.into()),
                ..self
            }
        }

        /// Fail `write` of any path under `prefix`; `ensure_dir` still succeeds.
        pub fn deny_writes_under(self, prefix: impl Into<PathBuf>) -> Self {
            Self {
                deny_writes: Some(prefix.into()),
                ..self
            }
        }

        pub fn insert(&self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) {
            self.lock().insert(path.into(), Node::File(bytes.into()));
        }

        pub fn insert_dir(&self, path: impl Into<PathBuf>) {
            self.lock().insert(path.into(), Node::Dir);
        }

        /// Contents of the file at `path`, if any.
        pub fn get(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
            match self.lock().get(path.as_ref()) {
                Some(Node::File(bytes)) => Some(bytes.clone()),
                _ => None,
            }
        }

        /// All files directly under `dir`, by name.
        pub fn files_in(&self, dir: impl AsRef<Path>) -> BTreeMap<String, Vec<u8>> {
            let dir = dir.as_ref();
            self.lock()
                .iter()
                .filter_map(|(path, node)| match node {
                    Node::File(bytes) if path.parent() == Some(dir) => Some((
                        path.file_name()?.to_string_lossy().into_owned(),
                        bytes.clone(),
                    )),
                    _ => None,
                })
                .collect()
        }

        fn lock(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Node>> {
            self.nodes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
        }

        fn dir_exists(nodes: &BTreeMap<PathBuf, Node>, dir: &Path) -> bool {
            matches!(nodes.get(dir), Some(Node::Dir))
                || nodes.keys().any(|p| p != dir && p.starts_with(dir))
        }

        fn denied(op: &'static str, path: &Path) -> StoreError {
            StoreError::io(
                op,
                path,
                io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
            )
        }

        fn not_found(op: &'static str, path: &Path) -> StoreError {
            StoreError::io(op, path, io::Error::from(io::ErrorKind::NotFound))
        }
    }

    impl FileStore for MemoryStore {
        fn ensure_dir(&self, dir: &Path) -> Result<(), StoreError> {
            if self.read_only {
                return Err(Self::denied("create", dir));
            }
            let mut nodes = self.lock();
            if let Some(Node::File(_)) = nodes.get(dir) {
                return Err(StoreError::io(
                    "create",
                    dir,
                    io::Error::from(io::ErrorKind::AlreadyExists),
                ));
            }
            nodes.insert(dir.to_path_buf(), Node::Dir);
            Ok(())
        }

        fn list(&self, dir: &Path) -> Result<Vec<Entry>, StoreError> {
            let nodes = self.lock();
            if !Self::dir_exists(&nodes, dir) {
                return Err(Self::not_found("list", dir));
            }
            let mut children: BTreeMap<String, bool> = BTreeMap::new();
            for (path, node) in nodes.iter() {
                let Ok(rest) = path.strip_prefix(dir) else {
                    continue;
                };
                let mut components = rest.components();
                let Some(first) = components.next() else {
                    continue;
                };
                let name = first.as_os_str().to_string_lossy().into_owned();
                let is_dir = components.next().is_some() || matches!(node, Node::Dir);
                *children.entry(name).or_default() |= is_dir;
            }
            Ok(children
                .into_iter()
                .map(|(name, is_dir)| Entry { name, is_dir })
                .collect())
        }

        fn read(&self, path: &Path) -> Result<Vec<u8>, StoreError> {
            if self.deny_reads.as_ref().is_some_and(|p| path.starts_with(p)) {
                return Err(Self::denied("read", path));
            }
            match self.lock().get(path) {
                Some(Node::File(bytes)) => Ok(bytes.clone()),
                _ => Err(Self::not_found("read", path)),
            }
        }

        fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
            let denied = self.deny_writes.as_ref().is_some_and(|p| path.starts_with(p));
            if self.read_only || denied {
                return Err(Self::denied("write", path));
            }
            let mut nodes = self.lock();
            let parent_missing = path
                .parent()
                .is_some_and(|p| !p.as_os_str().is_empty() && !Self::dir_exists(&nodes, p));
            if parent_missing {
                return Err(Self::not_found("write", path));
            }
            nodes.insert(path.to_path_buf(), Node::File(bytes.to_vec()));
            Ok(())
        }
    }

    // =========================================================================
    // FsStore
    // =========================================================================

    #[test]
    fn fs_list_marks_directories_and_sorts() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("zed.png"), b"z").unwrap();
        std::fs::write(tmp.path().join("amy.jpg"), b"a").unwrap();
        std::fs::create_dir(tmp.path().join("nested")).unwrap();

        let entries = FsStore.list(tmp.path()).unwrap();
        assert_eq!(
            entries,
            vec![
                Entry {
                    name: "amy.jpg".into(),
                    is_dir: false
                },
                Entry {
                    name: "nested".into(),
                    is_dir: true
                },
                Entry {
                    name: "zed.png".into(),
                    is_dir: false
                },
            ]
        );
    }

    #[test]
    fn fs_list_missing_dir_reports_path() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("avatar");
        let err = FsStore.list(&missing).unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("list "), "{msg}");
        assert!(msg.contains("avatar"), "{msg}");
    }

    #[test]
    fn fs_write_overwrites_and_ensure_dir_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("gravatar");
        FsStore.ensure_dir(&out).unwrap();
        FsStore.ensure_dir(&out).unwrap();

        let file = out.join("x");
        FsStore.write(&file, b"first").unwrap();
        FsStore.write(&file, b"second").unwrap();
        assert_eq!(FsStore.read(&file).unwrap(), b"second");
    }

    // =========================================================================
    // MemoryStore
    // =========================================================================

    #[test]
    fn memory_list_implies_directories() {
        let store = MemoryStore::new();
        store.insert("avatar/bob.png", b"b".to_vec());
        store.insert("avatar/team/eve.png", b"e".to_vec());
        store.insert_dir("avatar/empty");

        let entries = store.list(Path::new("avatar")).unwrap();
        let summary: Vec<(&str, bool)> = entries
            .iter()
            .map(|e| (e.name.as_str(), e.is_dir))
            .collect();
        assert_eq!(
            summary,
            vec![("bob.png", false), ("empty", true), ("team", true)]
        );
    }

    #[test]
    fn memory_list_missing_dir_errors() {
        let store = MemoryStore::new();
        assert!(store.list(Path::new("avatar")).is_err());
    }

    #[test]
    fn memory_write_requires_parent() {
        let store = MemoryStore::new();
        assert!(store.write(Path::new("gravatar/a"), b"x").is_err());
        store.ensure_dir(Path::new("gravatar")).unwrap();
        store.write(Path::new("gravatar/a"), b"x").unwrap();
        assert_eq!(store.get("gravatar/a").unwrap(), b"x");
        assert_eq!(store.files_in("gravatar").len(), 1);
    }

    #[test]
    fn memory_read_only_rejects_writes() {
        let store = MemoryStore::new().read_only();
        let err = store.ensure_dir(Path::new("gravatar")).unwrap_err();
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn memory_denied_writes_leave_ensure_dir_working() {
        let store = MemoryStore::new().deny_writes_under("gravatar");
        store.ensure_dir(Path::new("gravatar")).unwrap();
        store.ensure_dir(Path::new("other")).unwrap();
        store.write(Path::new("other/a"), b"x").unwrap();
        let err = store.write(Path::new("gravatar/a"), b"x").unwrap_err();
        assert!(matches!(err, StoreError::Io { op: "write", .. }));
    }

    #[test]
    fn memory_denied_reads_still_list() {
        let store = MemoryStore::new().deny_reads_under("avatar/bob.png");
        store.insert("avatar/bob.png", b"b".to_vec());
        store.insert("avatar/amy.png", b"a".to_vec());
        assert_eq!(store.list(Path::new("avatar")).unwrap().len(), 2);
        assert_eq!(store.read(Path::new("avatar/amy.png")).unwrap(), b"a");
        assert!(store.read(Path::new("avatar/bob.png")).is_err());
    }
}
