//! Context for the entry being backed up
//!

use core::fmt;

/// Context for the current entry. Used for prefixing logs.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    /// The entry's name.
    pub entry_name: &'a str,
}

impl<'a> Context<'a> {
    /// Create the context for an entry.
    pub fn new(entry_name: &'a str) -> Self {
        Self { entry_name }
    }
}

impl fmt::Display for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.entry_name)
    }
}
