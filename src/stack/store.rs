//! Byte-addressable backing stores
//!
//! A store only needs positioned single-byte reads and writes. The byte
//! at position `i` is the `i`-th stack element; there is no header and
//! no framing, so the file can be inspected with any hex viewer.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Random-access byte store used as stack memory.
///
/// Implementations are owned by exactly one stack and are never shared,
/// so methods take `&mut self` and no internal locking is needed.
pub trait AddressableStore: Send {
    /// Writes `byte` at `offset`, growing the store if needed.
    fn write_at(&mut self, offset: u64, byte: u8) -> io::Result<()>;

    /// Reads the byte at `offset`.
    ///
    /// Reading a position that was never written is an error.
    fn read_at(&mut self, offset: u64) -> io::Result<u8>;

    /// Short name used in logs.
    fn kind(&self) -> &'static str;
}

impl<S: AddressableStore + ?Sized> AddressableStore for Box<S> {
    fn write_at(&mut self, offset: u64, byte: u8) -> io::Result<()> {
        (**self).write_at(offset, byte)
    }

    fn read_at(&mut self, offset: u64) -> io::Result<u8> {
        (**self).read_at(offset)
    }

    fn kind(&self) -> &'static str {
        (**self).kind()
    }
}

/// File-backed store.
///
/// Every write is a seek followed by a one-byte write; with
/// `sync_writes` the data is also flushed to disk before returning.
/// All calls block the current thread, so async callers should drive it
/// from the blocking pool.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    file: File,
    sync_writes: bool,
}

impl FileStore {
    /// Creates (or truncates) the store file at `path`.
    ///
    /// Parent directories are created if missing. Any previous contents
    /// are discarded since a fresh engine always starts at offset 0.
    pub fn create(path: impl AsRef<Path>, sync_writes: bool) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(true)
            .open(&path)?;

        Ok(Self {
            path,
            file,
            sync_writes,
        })
    }

    /// Returns the path of the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AddressableStore for FileStore {
    fn write_at(&mut self, offset: u64, byte: u8) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(&[byte])?;
        if self.sync_writes {
            self.file.sync_data()?;
        }
        Ok(())
    }

    fn read_at(&mut self, offset: u64) -> io::Result<u8> {
        let mut cell = [0u8; 1];
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(&mut cell)?;
        Ok(cell[0])
    }

    fn kind(&self) -> &'static str {
        "file"
    }
}

/// In-memory store backed by a growable vector.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    cells: Vec<u8>,
}

impl MemoryStore {
    /// Create an empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw view of every cell ever written, including stale ones.
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }
}

impl AddressableStore for MemoryStore {
    fn write_at(&mut self, offset: u64, byte: u8) -> io::Result<()> {
        let index = usize::try_from(offset).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "offset exceeds address space")
        })?;
        if index >= self.cells.len() {
            self.cells.resize(index + 1, 0);
        }
        self.cells[index] = byte;
        Ok(())
    }

    fn read_at(&mut self, offset: u64) -> io::Result<u8> {
        usize::try_from(offset)
            .ok()
            .and_then(|index| self.cells.get(index).copied())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("offset {} was never written", offset),
                )
            })
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store_write_then_read() {
        let mut store = MemoryStore::new();
        store.write_at(0, b'[').unwrap();
        store.write_at(1, b'{').unwrap();

        assert_eq!(store.read_at(0).unwrap(), b'[');
        assert_eq!(store.read_at(1).unwrap(), b'{');
        assert_eq!(store.cells(), b"[{");
    }

    #[test]
    fn test_memory_store_overwrites_in_place() {
        let mut store = MemoryStore::new();
        store.write_at(0, b'[').unwrap();
        store.write_at(0, b'(').unwrap();

        assert_eq!(store.read_at(0).unwrap(), b'(');
        assert_eq!(store.cells().len(), 1);
    }

    #[test]
    fn test_memory_store_read_unwritten_fails() {
        let mut store = MemoryStore::new();
        let err = store.read_at(3).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_file_store_point_io() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stack.bin");
        let mut store = FileStore::create(&path, false).unwrap();

        store.write_at(0, b'[').unwrap();
        store.write_at(1, b'{').unwrap();
        store.write_at(2, b'(').unwrap();
        store.write_at(1, b'<').unwrap();

        assert_eq!(store.read_at(1).unwrap(), b'<');
        assert_eq!(store.read_at(2).unwrap(), b'(');
        assert_eq!(fs::read(&path).unwrap(), b"[<(");
    }

    #[test]
    fn test_file_store_truncates_previous_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stack.bin");
        fs::write(&path, b"stale").unwrap();

        let mut store = FileStore::create(&path, true).unwrap();
        assert!(store.read_at(0).is_err());
        assert_eq!(store.path(), path.as_path());
    }

    #[test]
    fn test_file_store_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/stack.bin");

        let mut store = FileStore::create(&path, false).unwrap();
        store.write_at(0, b']').unwrap();
        assert!(path.exists());
    }
}
