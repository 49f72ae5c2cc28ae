//! LIFO stack over an addressable store
//!
//! The stack keeps only its `offset` in memory. Cells `[0, offset)` of
//! the store are the live stack, bottom to top; anything past `offset`
//! is stale and gets overwritten by later pushes.

use super::errors::{StackError, StackResult};
use super::store::AddressableStore;

/// Storage-backed stack of bytes.
pub struct AddressableStack<S: AddressableStore> {
    /// Next free write position; equals the number of live elements
    offset: u64,
    store: S,
}

impl<S: AddressableStore> AddressableStack<S> {
    /// Wraps `store` as an empty stack.
    ///
    /// Existing bytes in the store are treated as stale.
    pub fn new(store: S) -> Self {
        Self { offset: 0, store }
    }

    /// Pushes `byte` and returns the address it was written to.
    ///
    /// Performs exactly one store write and no reads. The offset only
    /// advances once the write succeeded.
    pub fn push(&mut self, byte: u8) -> StackResult<u64> {
        let address = self.offset;
        self.store
            .write_at(address, byte)
            .map_err(|e| StackError::write_failed(address, e))?;
        self.offset += 1;
        Ok(address)
    }

    /// Pops the top byte.
    ///
    /// The offset is decremented before the read, so depth stays correct
    /// even when the caller discards the value or the read fails.
    ///
    /// # Errors
    ///
    /// `BRACE_STACK_EMPTY` when the stack is empty, or
    /// `BRACE_STORAGE_IO_ERROR` when the read fails.
    pub fn pop(&mut self) -> StackResult<u8> {
        if self.offset == 0 {
            return Err(StackError::empty());
        }
        self.offset -= 1;
        self.store
            .read_at(self.offset)
            .map_err(|e| StackError::read_failed(self.offset, e))
    }

    /// Current depth (number of live elements).
    #[inline]
    pub fn depth(&self) -> u64 {
        self.offset
    }

    /// Returns true when nothing is on the stack.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.offset == 0
    }

    /// Drops every element. Stale bytes are left in the store.
    pub fn reset(&mut self) {
        self.offset = 0;
    }

    /// Reads the live stack, bottom to top.
    pub fn contents(&mut self) -> StackResult<Vec<u8>> {
        (0..self.offset)
            .map(|address| {
                self.store
                    .read_at(address)
                    .map_err(|e| StackError::read_failed(address, e))
            })
            .collect()
    }

    /// Borrow the backing store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::{FileStore, MemoryStore};
    use std::io;
    use tempfile::tempdir;

    /// Store that fails every operation once armed.
    struct FailingStore {
        inner: MemoryStore,
        fail_reads: bool,
        fail_writes: bool,
    }

    impl AddressableStore for FailingStore {
        fn write_at(&mut self, offset: u64, byte: u8) -> io::Result<()> {
            if self.fail_writes {
                return Err(io::Error::new(io::ErrorKind::Other, "write refused"));
            }
            self.inner.write_at(offset, byte)
        }

        fn read_at(&mut self, offset: u64) -> io::Result<u8> {
            if self.fail_reads {
                return Err(io::Error::new(io::ErrorKind::Other, "read refused"));
            }
            self.inner.read_at(offset)
        }

        fn kind(&self) -> &'static str {
            "failing"
        }
    }

    #[test]
    fn test_push_returns_sequential_addresses() {
        let mut stack = AddressableStack::new(MemoryStore::new());

        assert_eq!(stack.push(b'[').unwrap(), 0);
        assert_eq!(stack.push(b'{').unwrap(), 1);
        assert_eq!(stack.push(b'(').unwrap(), 2);
        assert_eq!(stack.depth(), 3);
    }

    #[test]
    fn test_pop_is_lifo() {
        let mut stack = AddressableStack::new(MemoryStore::new());
        stack.push(b'[').unwrap();
        stack.push(b'{').unwrap();

        assert_eq!(stack.pop().unwrap(), b'{');
        assert_eq!(stack.pop().unwrap(), b'[');
        assert!(stack.is_empty());
    }

    #[test]
    fn test_pop_empty_fails() {
        let mut stack = AddressableStack::new(MemoryStore::new());
        let err = stack.pop().unwrap_err();
        assert!(err.is_empty_stack());
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_reset_leaves_stale_bytes_and_push_overwrites() {
        let mut stack = AddressableStack::new(MemoryStore::new());
        stack.push(b'[').unwrap();
        stack.push(b'{').unwrap();
        stack.reset();

        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.store().cells(), b"[{");

        stack.push(b'(').unwrap();
        assert_eq!(stack.store().cells(), b"({");
        assert_eq!(stack.contents().unwrap(), b"(");
    }

    #[test]
    fn test_contents_bottom_to_top() {
        let mut stack = AddressableStack::new(MemoryStore::new());
        for byte in b"[{(" {
            stack.push(*byte).unwrap();
        }
        stack.pop().unwrap();

        assert_eq!(stack.contents().unwrap(), b"[{");
    }

    #[test]
    fn test_failed_write_does_not_advance() {
        let mut stack = AddressableStack::new(FailingStore {
            inner: MemoryStore::new(),
            fail_reads: false,
            fail_writes: true,
        });

        let err = stack.push(b'[').unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_failed_read_still_decrements() {
        let mut stack = AddressableStack::new(FailingStore {
            inner: MemoryStore::new(),
            fail_reads: true,
            fail_writes: false,
        });
        stack.push(b'[').unwrap();
        stack.push(b'[').unwrap();

        let err = stack.pop().unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_file_backed_stack_is_inspectable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("buffer.txt");
        let mut stack = AddressableStack::new(FileStore::create(&path, false).unwrap());

        stack.push(b'[').unwrap();
        stack.push(b'{').unwrap();
        stack.push(b'(').unwrap();
        assert_eq!(stack.pop().unwrap(), b'(');

        // Any observer can rebuild the stack from the file and the depth
        let on_disk = std::fs::read(&path).unwrap();
        assert_eq!(&on_disk[..stack.depth() as usize], b"[{");
        assert_eq!(stack.contents().unwrap(), b"[{");
    }

    #[test]
    fn test_deep_stack_round_trip() {
        let mut stack = AddressableStack::new(MemoryStore::new());
        for i in 0..10_000u32 {
            stack.push((i % 3) as u8).unwrap();
        }
        for i in (0..10_000u32).rev() {
            assert_eq!(stack.pop().unwrap(), (i % 3) as u8);
        }
        assert!(stack.is_empty());
    }
}
