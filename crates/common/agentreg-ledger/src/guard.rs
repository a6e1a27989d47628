use agentreg_types::RegistryError;
use std::sync::{Mutex, PoisonError};
use std::thread::{self, ThreadId};

/// Marks which thread is currently inside a registry transaction.
///
/// Subscribers run inside the transaction; one that calls back into the
/// registry from the same thread must be turned away instead of deadlocking
/// on the service lock.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    holder: Mutex<Option<ThreadId>>,
}

/// Clears the holder when dropped.
#[must_use]
pub struct Held<'a> {
    guard: &'a ReentrancyGuard,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the call if the current thread is already inside a transaction.
    /// Must be called before taking the service lock.
    pub fn check(&self) -> Result<(), RegistryError> {
        if self.is_held_by_current_thread() {
            Err(RegistryError::Reentrant)
        } else {
            Ok(())
        }
    }

    /// Record the current thread as the holder. Call only with the service lock taken.
    pub fn hold(&self) -> Held<'_> {
        *self.holder.lock().unwrap_or_else(PoisonError::into_inner) = Some(thread::current().id());
        Held { guard: self }
    }

    pub fn is_held_by_current_thread(&self) -> bool {
        *self.holder.lock().unwrap_or_else(PoisonError::into_inner) == Some(thread::current().id())
    }
}

impl Drop for Held<'_> {
    fn drop(&mut self) {
        *self
            .guard
            .holder
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}
