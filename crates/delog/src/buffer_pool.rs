use std::ops::Deref;
use std::ops::DerefMut;

use parking_lot::Mutex;

/// The maximum number of buffers kept for reuse, extra buffers are freed.
const MAX_RETAINED_BUFFERS: usize = 64;

/// A pool of byte buffers that are reused between logging calls, so that a
/// line buffer keeps its capacity.
///
/// # Details
///
/// Neither checking out nor returning a buffer ever waits for the lock of the
/// pool. When the lock is contended a checkout allocates a new buffer instead,
/// and a returned buffer is simply freed.
pub struct BufferPool {
    buffers: Mutex<Vec<Vec<u8>>>,

    /// The capacity of a newly allocated buffer.
    capacity: usize,
}

impl BufferPool {
    /// Creates an empty pool that allocates buffers with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffers: Mutex::new(Vec::new()),
            capacity,
        }
    }

    /// Returns an empty buffer, which is returned to the pool when the guard is dropped.
    pub fn checkout(&self) -> PooledBuffer<'_> {
        let mut bytes = self
            .buffers
            .try_lock()
            .and_then(|mut buffers| buffers.pop())
            .unwrap_or_else(|| Vec::with_capacity(self.capacity));

        bytes.clear();
        PooledBuffer { pool: self, bytes }
    }

    fn release(&self, mut bytes: Vec<u8>) {
        bytes.clear();

        if let Some(mut buffers) = self.buffers.try_lock() {
            if buffers.len() < MAX_RETAINED_BUFFERS {
                buffers.push(bytes);
            }
        }
    }

    /// Returns the capacities of the buffers that are currently in the pool.
    #[cfg(test)]
    pub(crate) fn capacities(&self) -> Vec<usize> {
        self.buffers.lock().iter().map(Vec::capacity).collect()
    }
}

/// A buffer checked out from a [BufferPool]. It is owned by a single caller
/// and goes back to the pool on drop, also when the caller panics.
#[must_use = "Dropping the buffer returns it to the pool immediately"]
pub struct PooledBuffer<'a> {
    pool: &'a BufferPool,
    bytes: Vec<u8>,
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.bytes
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.bytes
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.bytes));
    }
}
