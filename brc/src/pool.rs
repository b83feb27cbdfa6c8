//! Reusable read buffers shared by the partition workers.

use parking_lot::Mutex;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Checkout/checkin pool of fixed-size byte buffers.
///
/// Purely a memory-pressure device: a worker that finds the pool empty
/// simply allocates a fresh buffer.
#[derive(Debug)]
pub struct BufferPool {
    idle: Mutex<Vec<Vec<u8>>>,
    buffer_capacity: usize,
    max_idle: usize,
}

impl BufferPool {
    pub fn new(buffer_capacity: usize, max_idle: usize) -> Arc<Self> {
        Arc::new(Self {
            idle: Mutex::new(Vec::with_capacity(max_idle)),
            buffer_capacity,
            max_idle,
        })
    }

    pub fn checkout(self: &Arc<Self>) -> PooledBuffer {
        let buf = self
            .idle
            .lock()
            .pop()
            .unwrap_or_else(|| vec![0; self.buffer_capacity]);
        PooledBuffer {
            buf,
            pool: Arc::clone(self),
        }
    }

    fn checkin(&self, buf: Vec<u8>) {
        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            idle.push(buf);
        }
    }

    pub fn idle(&self) -> usize {
        self.idle.lock().len()
    }

    pub fn buffer_capacity(&self) -> usize {
        self.buffer_capacity
    }
}

/// A buffer checked out of a [`BufferPool`]; returned on drop.
pub struct PooledBuffer {
    buf: Vec<u8>,
    pool: Arc<BufferPool>,
}

impl Deref for PooledBuffer {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.buf
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        self.pool.checkin(std::mem::take(&mut self.buf));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_allocates_full_length() {
        let pool = BufferPool::new(64, 2);
        let buf = pool.checkout();
        assert_eq!(buf.len(), 64);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_buffer_returns_on_drop_and_is_reused() {
        let pool = BufferPool::new(16, 2);
        {
            let mut buf = pool.checkout();
            buf[0] = 7;
        }
        assert_eq!(pool.idle(), 1);

        let buf = pool.checkout();
        assert_eq!(buf[0], 7);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_idle_list_is_bounded() {
        let pool = BufferPool::new(8, 1);
        let a = pool.checkout();
        let b = pool.checkout();
        drop(a);
        drop(b);
        assert_eq!(pool.idle(), 1);
    }
}
