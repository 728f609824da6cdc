//! dictionary/accountant.rs
//! Memory budget shared with the block cache.
//!
//! Sample buffering is charged against an accountant passed in by the caller.
//! Several sessions may share one accountant; a charge is only a counter
//! against a ceiling, so no ordering between sessions is implied.
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// External memory budget. Both calls must be atomic with respect to
/// other sessions sharing the accountant.
pub trait MemoryAccountant: Send + Sync {
    /// Reserve `bytes`; `false` means denied and nothing was reserved.
    fn try_charge(&self, bytes: usize) -> bool;

    /// Return `bytes` previously granted by `try_charge`.
    fn release(&self, bytes: usize);
}

/// Fixed-capacity accountant, the usual stand-in for a block cache's
/// reservation manager.
pub struct CacheMemoryAccountant {
    capacity: usize,
    used: AtomicUsize,
}

impl CacheMemoryAccountant {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, used: AtomicUsize::new(0) }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn used(&self) -> usize {
        self.used.load(Ordering::Acquire)
    }

    pub fn available(&self) -> usize {
        self.capacity.saturating_sub(self.used())
    }
}

impl MemoryAccountant for CacheMemoryAccountant {
    fn try_charge(&self, bytes: usize) -> bool {
        loop {
            let current = self.used.load(Ordering::Acquire);
            let next = match current.checked_add(bytes) {
                Some(n) if n <= self.capacity => n,
                _ => return false,
            };
            match self.used.compare_exchange(current, next, Ordering::Release, Ordering::Acquire) {
                Ok(_) => return true,
                Err(_) => continue,
            }
        }
    }

    fn release(&self, bytes: usize) {
        // Saturating so a double release cannot wrap the counter.
        let _ = self
            .used
            .fetch_update(Ordering::Release, Ordering::Acquire, |cur| Some(cur.saturating_sub(bytes)));
    }
}

impl fmt::Debug for CacheMemoryAccountant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheMemoryAccountant")
            .field("capacity", &self.capacity)
            .field("used", &self.used())
            .finish()
    }
}

/// Grants everything. For callers without a cache budget.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnlimitedAccountant;

impl MemoryAccountant for UnlimitedAccountant {
    fn try_charge(&self, _bytes: usize) -> bool {
        true
    }

    fn release(&self, _bytes: usize) {}
}

/// Bytes currently reserved by one sampler. Everything still held is
/// returned to the accountant on drop.
pub struct MemoryCharge {
    accountant: Arc<dyn MemoryAccountant>,
    charged: usize,
}

impl MemoryCharge {
    pub fn new(accountant: Arc<dyn MemoryAccountant>) -> Self {
        Self { accountant, charged: 0 }
    }

    /// Extend the reservation by `bytes`. On denial the ticket is unchanged.
    pub fn try_grow(&mut self, bytes: usize) -> bool {
        if bytes == 0 {
            return true;
        }
        if !self.accountant.try_charge(bytes) {
            return false;
        }
        self.charged += bytes;
        true
    }

    pub fn charged(&self) -> usize {
        self.charged
    }

    pub fn release_all(&mut self) {
        if self.charged > 0 {
            self.accountant.release(self.charged);
            self.charged = 0;
        }
    }
}

impl Drop for MemoryCharge {
    fn drop(&mut self) {
        self.release_all();
    }
}

impl fmt::Debug for MemoryCharge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCharge").field("charged", &self.charged).finish()
    }
}
