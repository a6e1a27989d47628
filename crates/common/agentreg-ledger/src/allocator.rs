use agentreg_types::{AgentId, RegistryError};

/// Hands out agent identifiers densely: 0, 1, 2, …
///
/// Owned by `AgentStore`; there is no process-wide counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierAllocator {
    next: AgentId,
}

impl IdentifierAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume after `next` identifiers have already been issued.
    pub fn starting_at(next: AgentId) -> Self {
        Self { next }
    }

    /// Issue the next identifier and advance.
    ///
    /// Running out of identifiers is a capacity failure, never a normal error.
    pub fn next(&mut self) -> Result<AgentId, RegistryError> {
        let id = self.next;
        self.next = id
            .checked_add(1)
            .ok_or(RegistryError::IdentifierSpaceExhausted)?;
        Ok(id)
    }

    /// The identifier the next call to `next` would return, which is also the
    /// number of identifiers issued so far.
    pub fn peek(&self) -> AgentId {
        self.next
    }
}
